//! The diagnostics service and its scoped installation.
//!
//! ```text
//! Diagnostics::new(config, store)      construct; nothing global yet
//!     .restore()                       pull entries persisted by earlier runs
//!     .install(console_filter)         fmt sink + capture sink become the
//!                                      thread's default subscriber
//!         -> DiagnosticsGuard
//!              .capture_panics()       panics land in the buffer too
//!              drop                    persist newest entries, restore the
//!                                      previous subscriber and panic hook
//! ```

use super::capture::{CaptureBuffer, CaptureLayer};
use super::entry::LogEntry;
use super::store::{KeyValueStore, StoreError};
use crate::config::DiagnosticsConfig;
use std::ops::Deref;
use std::panic::{self, PanicHookInfo};
use std::sync::Arc;
use tracing::level_filters::LevelFilter;
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::layer::{Layer, SubscriberExt};
use tracing_subscriber::{EnvFilter, fmt};

type PanicHook = Box<dyn Fn(&PanicHookInfo<'_>) + Send + Sync + 'static>;

/// Explicitly constructed log capture service.
///
/// Owns the capture buffer and knows where and how much to persist. Parts
/// of the program that need captured entries receive a reference to it;
/// nothing is reachable through a global.
pub struct Diagnostics {
    buffer: CaptureBuffer,
    store: Arc<dyn KeyValueStore>,
    storage_key: String,
    persist_limit: usize,
    capture_level: LevelFilter,
}

impl Diagnostics {
    pub fn new(config: &DiagnosticsConfig, store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            buffer: CaptureBuffer::new(config.capacity),
            store,
            storage_key: config.storage_key.clone(),
            persist_limit: config.persist_limit,
            capture_level: config.level.parse().unwrap_or(LevelFilter::INFO),
        }
    }

    /// A capture sink writing into this service's buffer.
    ///
    /// Each call returns a new layer sharing the same buffer, so the service
    /// can be registered with more than one subscriber.
    pub fn layer(&self) -> CaptureLayer {
        CaptureLayer::new(self.buffer.clone())
    }

    pub fn buffer(&self) -> &CaptureBuffer {
        &self.buffer
    }

    /// Buffered entries, oldest first.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.buffer.entries()
    }

    /// Load entries persisted by an earlier session into the buffer, ahead
    /// of anything captured so far. Returns how many were restored.
    pub fn restore(&self) -> Result<usize, StoreError> {
        let older = load_persisted(self.store.as_ref(), &self.storage_key)?;
        let count = older.len();
        self.buffer.prepend(older);
        Ok(count)
    }

    /// Write the newest `persist_limit` entries to the store.
    ///
    /// Failures (quota, I/O, serialization) are ignored.
    pub fn persist(&self) {
        let recent = self.buffer.recent(self.persist_limit);
        let Ok(json) = serde_json::to_string(&recent) else {
            return;
        };
        let _ = self.store.set(&self.storage_key, &json);
    }

    /// Drop buffered entries and the persisted copy.
    pub fn clear(&self) {
        self.buffer.clear();
        let _ = self.store.remove(&self.storage_key);
    }

    /// Register a stderr fmt sink (filtered by `console`) and the capture
    /// sink (filtered by the configured capture level) as this thread's
    /// default subscriber until the returned guard is dropped.
    pub fn install(self, console: EnvFilter) -> DiagnosticsGuard {
        let console_sink = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .without_time()
            .with_filter(console);
        let capture_sink = self.layer().with_filter(self.capture_level);

        let subscriber = tracing_subscriber::registry()
            .with(console_sink)
            .with(capture_sink);
        let default = tracing::subscriber::set_default(subscriber);

        DiagnosticsGuard {
            diagnostics: self,
            previous_hook: None,
            _default: default,
        }
    }
}

/// Read entries persisted under `key`. A missing key yields an empty list.
pub fn load_persisted(store: &dyn KeyValueStore, key: &str) -> Result<Vec<LogEntry>, StoreError> {
    match store.get(key)? {
        Some(json) => Ok(serde_json::from_str(&json)?),
        None => Ok(Vec::new()),
    }
}

/// Keeps [`Diagnostics`] installed. See the [module docs](self) for the
/// lifecycle.
pub struct DiagnosticsGuard {
    diagnostics: Diagnostics,
    previous_hook: Option<Arc<PanicHook>>,
    // Dropped after `Drop::drop` runs, restoring the previous subscriber.
    _default: DefaultGuard,
}

impl DiagnosticsGuard {
    /// Record panics as error entries. The previously installed hook still
    /// runs afterwards, so the usual panic message is printed as well.
    pub fn capture_panics(&mut self) {
        if self.previous_hook.is_some() {
            return;
        }
        let previous: Arc<PanicHook> = Arc::new(panic::take_hook());
        let chained = Arc::clone(&previous);
        let buffer = self.diagnostics.buffer.clone();
        panic::set_hook(Box::new(move |info| {
            buffer.push(LogEntry::panic(info.to_string()));
            chained(info);
        }));
        self.previous_hook = Some(previous);
    }

    fn restore_panic_hook(&mut self) {
        let Some(previous) = self.previous_hook.take() else {
            return;
        };
        // The hook API panics when used from a panicking thread.
        if std::thread::panicking() {
            return;
        }
        drop(panic::take_hook());
        panic::set_hook(Box::new(move |info| previous(info)));
    }
}

impl Deref for DiagnosticsGuard {
    type Target = Diagnostics;

    fn deref(&self) -> &Diagnostics {
        &self.diagnostics
    }
}

impl Drop for DiagnosticsGuard {
    fn drop(&mut self) {
        self.restore_panic_hook();
        self.diagnostics.persist();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::entry::{Origin, Severity};
    use crate::diagnostics::store::MemoryStore;

    fn config(capacity: usize, persist_limit: usize) -> DiagnosticsConfig {
        DiagnosticsConfig {
            capacity,
            persist_limit,
            ..DiagnosticsConfig::default()
        }
    }

    fn quiet() -> EnvFilter {
        EnvFilter::new("off")
    }

    #[test]
    fn install_captures_until_guard_dropped() {
        let store = Arc::new(MemoryStore::new());
        let diagnostics = Diagnostics::new(&DiagnosticsConfig::default(), store.clone());
        let buffer = diagnostics.buffer().clone();

        {
            let guard = diagnostics.install(quiet());
            tracing::info!("inside");
            assert_eq!(guard.entries().len(), 1);
        }
        tracing::info!("after teardown");

        assert_eq!(buffer.len(), 1);
    }

    #[test]
    fn capture_level_filters_events() {
        let store = Arc::new(MemoryStore::new());
        let config = DiagnosticsConfig {
            level: "warn".into(),
            ..DiagnosticsConfig::default()
        };
        let guard = Diagnostics::new(&config, store).install(quiet());
        tracing::info!("skipped");
        tracing::warn!("kept");

        let entries = guard.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].level, Severity::Warn);
    }

    #[test]
    fn guard_drop_persists_newest_entries() {
        let store = Arc::new(MemoryStore::new());
        {
            let _guard = Diagnostics::new(&config(100, 50), store.clone()).install(quiet());
            for i in 0..120 {
                tracing::info!("event {i}");
            }
        }

        let persisted = load_persisted(store.as_ref(), "debug_logs").unwrap();
        assert_eq!(persisted.len(), 50);
        assert_eq!(persisted[0].message, "event 70");
        assert_eq!(persisted[49].message, "event 119");
    }

    #[test]
    fn persist_swallows_quota_errors() {
        let store = Arc::new(MemoryStore::with_quota(16));
        let diagnostics = Diagnostics::new(&DiagnosticsConfig::default(), store.clone());
        diagnostics
            .buffer()
            .push(LogEntry::new(Severity::Error, "t", "far too long for the quota"));

        diagnostics.persist();

        assert_eq!(store.get("debug_logs").unwrap(), None);
        assert_eq!(diagnostics.entries().len(), 1);
    }

    #[test]
    fn restore_prepends_previous_session() {
        let store = Arc::new(MemoryStore::new());
        let first = Diagnostics::new(&DiagnosticsConfig::default(), store.clone());
        first
            .buffer()
            .push(LogEntry::new(Severity::Info, "t", "yesterday"));
        first.persist();

        let second = Diagnostics::new(&DiagnosticsConfig::default(), store.clone());
        second
            .buffer()
            .push(LogEntry::new(Severity::Info, "t", "today"));
        assert_eq!(second.restore().unwrap(), 1);

        let messages: Vec<String> = second.entries().into_iter().map(|e| e.message).collect();
        assert_eq!(messages, ["yesterday", "today"]);
    }

    #[test]
    fn restore_with_nothing_stored() {
        let diagnostics =
            Diagnostics::new(&DiagnosticsConfig::default(), Arc::new(MemoryStore::new()));
        assert_eq!(diagnostics.restore().unwrap(), 0);
    }

    #[test]
    fn clear_empties_buffer_and_store() {
        let store = Arc::new(MemoryStore::new());
        let diagnostics = Diagnostics::new(&DiagnosticsConfig::default(), store.clone());
        diagnostics
            .buffer()
            .push(LogEntry::new(Severity::Info, "t", "x"));
        diagnostics.persist();
        assert!(store.get("debug_logs").unwrap().is_some());

        diagnostics.clear();
        assert!(diagnostics.entries().is_empty());
        assert_eq!(store.get("debug_logs").unwrap(), None);
    }

    #[test]
    fn second_layer_shares_buffer() {
        let diagnostics =
            Diagnostics::new(&DiagnosticsConfig::default(), Arc::new(MemoryStore::new()));
        let subscriber = tracing_subscriber::registry().with(diagnostics.layer());
        tracing::subscriber::with_default(subscriber, || tracing::error!("via extra sink"));

        assert_eq!(diagnostics.entries()[0].message, "via extra sink");
    }

    #[test]
    fn panics_are_captured() {
        let store = Arc::new(MemoryStore::new());
        let mut guard = Diagnostics::new(&DiagnosticsConfig::default(), store).install(quiet());
        guard.capture_panics();

        let result = std::panic::catch_unwind(|| panic!("signature pad exploded"));
        assert!(result.is_err());

        let entries = guard.entries();
        assert!(
            entries
                .iter()
                .any(|e| e.origin == Origin::Panic && e.message.contains("signature pad exploded")),
            "entries: {entries:?}"
        );
    }
}
