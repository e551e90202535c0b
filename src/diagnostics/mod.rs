//! Diagnostic log capture.
//!
//! Call sites log with `tracing` macros. [`Diagnostics`] is one sink among
//! the subscriber's layers: it keeps the most recent entries in memory
//! ([`CaptureBuffer`]) and persists the newest of them to a
//! [`KeyValueStore`] when its guard is dropped.
//!
//! | Piece | Role |
//! |---|---|
//! | [`LogEntry`] | captured event: level, UTC timestamp, target, message, origin |
//! | [`CaptureBuffer`] | bounded ring buffer shared by the service and its layers |
//! | [`CaptureLayer`] | `tracing_subscriber::Layer` feeding the buffer |
//! | [`KeyValueStore`] | durable storage: [`FileStore`], [`MemoryStore`] |
//! | [`Diagnostics`] / [`DiagnosticsGuard`] | construction, scoped install, persistence |

mod capture;
mod entry;
mod service;
mod store;

pub use capture::{CaptureBuffer, CaptureLayer};
pub use entry::{LogEntry, Origin, Severity};
pub use service::{Diagnostics, DiagnosticsGuard, load_persisted};
pub use store::{FileStore, KeyValueStore, MemoryStore, StoreError};
