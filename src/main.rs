use clap::{Parser, Subcommand};
use sigtrim::config::{self, AppConfig};
use sigtrim::diagnostics::{Diagnostics, DiagnosticsGuard, FileStore, KeyValueStore, load_persisted};
use sigtrim::feed::{self, ChannelFeed, FeedSource};
use sigtrim::imaging::{self, Dimensions, ImageBackend, RustBackend, TrimJob};
use sigtrim::output;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sigtrim")]
#[command(about = "Trim transparent borders from signatures and logos")]
#[command(long_about = "\
Trim transparent borders from signatures and logos

Every image is cropped to the smallest rectangle holding all of its
non-transparent pixels. Fully transparent images are written back unchanged.

Diagnostics from every run are kept in a small store next to config.toml;
'sigtrim logs' shows them. 'sigtrim tail' renders a realtime log feed read
as JSON event lines from stdin.

Run 'sigtrim gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Directory holding config.toml and the diagnostics store
    #[arg(long, default_value = ".", global = true)]
    config_dir: PathBuf,

    /// Show debug output on stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Crop images to their opaque content
    Trim {
        /// Images to trim
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        /// Output path (single input only; default: <stem><suffix>.png)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Suffix for default output names (overrides [trim] suffix)
        #[arg(long)]
        suffix: Option<String>,
    },
    /// Print the bounding box of an image's opaque content
    Bbox {
        input: PathBuf,
    },
    /// Show diagnostics persisted by earlier runs
    Logs {
        /// Delete the persisted entries instead
        #[arg(long)]
        clear: bool,
    },
    /// Render a realtime log feed from JSON event lines on stdin
    Tail {
        /// Table to follow (overrides [feed] table)
        #[arg(long)]
        table: Option<String>,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if let Command::GenConfig = cli.command {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }

    let config = config::load_config(&cli.config_dir)?;
    let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(
        cli.config_dir.join(&config.diagnostics.store_path),
    ));

    let mut guard = Diagnostics::new(&config.diagnostics, Arc::clone(&store))
        .install(console_filter(cli.verbose));
    guard.capture_panics();
    match guard.restore() {
        Ok(n) => tracing::debug!("Restored {n} log entries"),
        Err(e) => tracing::warn!("Could not restore log entries: {e}"),
    }

    // Logged while `guard` is still installed so the failure is persisted.
    let result = run(cli.command, &config, &guard, store.as_ref());
    if let Err(e) = &result {
        tracing::error!("{e}");
    }
    result
}

fn run(
    command: Command,
    config: &AppConfig,
    diagnostics: &DiagnosticsGuard,
    store: &dyn KeyValueStore,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::Trim {
            inputs,
            output: out_path,
            suffix,
        } => {
            if out_path.is_some() && inputs.len() > 1 {
                return Err("--output can only be used with a single input".into());
            }
            if let Some(suffix) = &suffix {
                config::validate_suffix(suffix)?;
            }
            warn_unknown_extensions(&inputs);
            let suffix = suffix.as_deref().unwrap_or(&config.trim.suffix);
            let jobs: Vec<TrimJob> = match out_path {
                Some(out) => vec![TrimJob::new(inputs[0].clone(), out)],
                None => inputs
                    .into_iter()
                    .map(|input| {
                        let out = imaging::plan_output_path(&input, suffix);
                        TrimJob::new(input, out)
                    })
                    .collect(),
            };
            imaging::check_jobs(&jobs)?;

            init_thread_pool(&config.processing);
            let backend = RustBackend::new();
            let results = imaging::trim_files(&backend, &jobs);
            output::print_trim_batch(jobs.iter().map(|j| j.source.as_path()).zip(&results));

            let failed = results.iter().filter(|r| r.is_err()).count();
            if failed > 0 {
                return Err(format!("{failed} of {} images failed", jobs.len()).into());
            }
        }
        Command::Bbox { input } => {
            let backend = RustBackend::new();
            let image = backend.load(&input)?.to_rgba8();
            let bbox = imaging::bounding_box(&image);
            output::print_bbox(&input, Dimensions::of(&image), bbox);
        }
        Command::Logs { clear } => {
            if clear {
                diagnostics.clear();
                println!("Cleared log entries");
            } else {
                let entries = load_persisted(store, &config.diagnostics.storage_key)?;
                output::print_log_entries(&entries);
            }
        }
        Command::Tail { table } => {
            let table = table.unwrap_or_else(|| config.feed.table.clone());
            let hub = ChannelFeed::new();
            let subscription = hub.subscribe(&table)?;
            let pump = spawn_stdin_pump(hub.clone());

            let rendered = feed::listen(subscription, config.feed.show_details, |line| {
                println!("{}", line);
            });
            let published = pump.join().map_err(|_| "stdin reader panicked")?;
            tracing::info!(table = %table, published, rendered, "Feed ended");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Inputs are decoded by content, so an odd extension is only worth a warning.
fn warn_unknown_extensions(inputs: &[PathBuf]) {
    let known = imaging::rust_backend::supported_input_extensions();
    for input in inputs {
        let ext = input
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        if !known.contains(&ext.as_str()) {
            tracing::warn!("{} does not look like a supported image", input.display());
        }
    }
}

/// Console filter: `RUST_LOG` when set, otherwise `warn` (`debug` with -v).
fn console_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }))
}

/// Initialize the rayon thread pool based on processing config.
///
/// Never more threads than CPU cores; `max_processes` can only lower it.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}

/// Read JSON event lines from stdin into `hub` until EOF, then close it.
fn spawn_stdin_pump(hub: ChannelFeed) -> std::thread::JoinHandle<usize> {
    let dispatch = tracing::dispatcher::get_default(|d| d.clone());
    std::thread::spawn(move || {
        tracing::dispatcher::with_default(&dispatch, || {
            feed::pump_lines(std::io::stdin().lock(), &hub)
        })
    })
}
