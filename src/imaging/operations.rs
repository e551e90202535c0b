//! High-level file operations.
//!
//! These functions combine the pure trim with backend I/O: load a file,
//! trim it, write the result.

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::bbox::BoundingBox;
use super::params::{OutputFormat, TrimJob};
use super::trim::{Trimmed, trim};
use rayon::prelude::*;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// What happened to one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrimOutcome {
    pub source: PathBuf,
    pub output: PathBuf,
    pub source_dims: Dimensions,
    pub output_dims: Dimensions,
    /// Region of the source that was kept; `None` when the image was
    /// written back untrimmed (fully transparent).
    pub bbox: Option<BoundingBox>,
}

impl TrimOutcome {
    pub fn was_trimmed(&self) -> bool {
        self.bbox.is_some() && self.output_dims != self.source_dims
    }
}

/// Default output path: `<stem><suffix>.png` next to the source.
pub fn plan_output_path(source: &Path, suffix: &str) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    source.with_file_name(format!("{stem}{suffix}.{}", OutputFormat::Png.extension()))
}

/// Reject job lists that would overwrite a source or write one output twice.
///
/// Paths are compared after resolving them on disk where they exist, so
/// `./a.png` and `a.png` count as the same file.
pub fn check_jobs(jobs: &[TrimJob]) -> Result<()> {
    let sources: HashSet<PathBuf> = jobs.iter().map(|j| resolve(&j.source)).collect();
    let mut outputs = HashSet::new();
    for job in jobs {
        let output = resolve(&job.output);
        if sources.contains(&output) {
            return Err(BackendError::InvalidJob(format!(
                "{} would overwrite an input",
                job.output.display()
            )));
        }
        if !outputs.insert(output) {
            return Err(BackendError::InvalidJob(format!(
                "{} is the output of more than one input",
                job.output.display()
            )));
        }
    }
    Ok(())
}

/// Canonical form of `path`, or of its parent joined with the file name
/// when the file does not exist yet.
fn resolve(path: &Path) -> PathBuf {
    if let Ok(canonical) = path.canonicalize() {
        return canonical;
    }
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) => {
            let parent = if parent.as_os_str().is_empty() {
                Path::new(".")
            } else {
                parent
            };
            parent
                .canonicalize()
                .map(|p| p.join(name))
                .unwrap_or_else(|_| path.to_path_buf())
        }
        _ => path.to_path_buf(),
    }
}

/// Trim a single file.
///
/// The output is always written, even when nothing was cropped, so callers
/// can rely on `job.output` existing afterwards.
pub fn trim_file(backend: &impl ImageBackend, job: &TrimJob) -> Result<TrimOutcome> {
    let image = backend.load(&job.source)?;
    let source_dims = Dimensions {
        width: image.width(),
        height: image.height(),
    };

    let (output_dims, bbox) = match trim(&image) {
        Trimmed::Cropped { image: cropped, bbox } => {
            backend.save(&cropped, &job.output)?;
            (Dimensions::of(&cropped), Some(bbox))
        }
        Trimmed::Unchanged(original) => {
            tracing::debug!("{} has no opaque pixels", job.source.display());
            backend.save(&original.to_rgba8(), &job.output)?;
            (source_dims, None)
        }
    };

    tracing::info!(
        source = %job.source.display(),
        output = %job.output.display(),
        "Trimmed {}x{} -> {}x{}",
        source_dims.width,
        source_dims.height,
        output_dims.width,
        output_dims.height
    );

    Ok(TrimOutcome {
        source: job.source.clone(),
        output: job.output.clone(),
        source_dims,
        output_dims,
        bbox,
    })
}

/// Trim many files in parallel on the rayon pool.
///
/// Results come back in job order. One failing file does not stop the
/// others. Workers log through the caller's current dispatcher.
pub fn trim_files<B: ImageBackend>(backend: &B, jobs: &[TrimJob]) -> Vec<Result<TrimOutcome>> {
    let dispatch = tracing::dispatcher::get_default(|d| d.clone());
    jobs.par_iter()
        .map(|job| {
            tracing::dispatcher::with_default(&dispatch, || {
                trim_file(backend, job).inspect_err(|e| {
                    tracing::error!(source = %job.source.display(), "Failed to trim: {e}");
                })
            })
        })
        .collect()
}
