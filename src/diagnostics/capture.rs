//! Bounded in-memory buffer of recent log entries, plus the `tracing`
//! layer that fills it.

use super::entry::{LogEntry, Origin, Severity};
use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex};
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

/// Shared ring buffer. Clones point at the same storage.
#[derive(Clone)]
pub struct CaptureBuffer {
    entries: Arc<Mutex<VecDeque<LogEntry>>>,
    capacity: usize,
}

impl CaptureBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append an entry, dropping the oldest ones past capacity.
    pub fn push(&self, entry: LogEntry) {
        // A poisoned lock only means another thread panicked mid-push; the
        // deque itself is still consistent.
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.push_back(entry);
        while entries.len() > self.capacity {
            entries.pop_front();
        }
    }

    /// Append older entries in front of what is already buffered.
    pub fn prepend(&self, older: Vec<LogEntry>) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        for entry in older.into_iter().rev() {
            entries.push_front(entry);
        }
        while entries.len() > self.capacity {
            entries.pop_front();
        }
    }

    /// All buffered entries, oldest first.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.recent(usize::MAX)
    }

    /// The newest `n` entries, oldest first.
    pub fn recent(&self, n: usize) -> Vec<LogEntry> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let skip = entries.len().saturating_sub(n);
        entries.iter().skip(skip).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }
}

/// Collects the `message` field and renders the remaining fields as
/// `key=value` pairs after it.
#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: Vec<String>,
    origin: Origin,
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            "message" => self.message = value.to_string(),
            "origin" if value == "panic" => self.origin = Origin::Panic,
            name => self.fields.push(format!("{name}={value}")),
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        match field.name() {
            "message" => self.message = format!("{:?}", value),
            name => self.fields.push(format!("{name}={:?}", value)),
        }
    }
}

impl MessageVisitor {
    fn into_message(self, target: &str) -> String {
        let mut message = if self.message.is_empty() {
            target.to_string()
        } else {
            self.message
        };
        if !self.fields.is_empty() {
            message.push(' ');
            message.push_str(&self.fields.join(" "));
        }
        message
    }
}

/// `tracing` layer writing every event it sees into a [`CaptureBuffer`].
///
/// Register it next to other sinks (a fmt layer, a file writer); it does
/// not replace them.
pub struct CaptureLayer {
    buffer: CaptureBuffer,
}

impl CaptureLayer {
    pub fn new(buffer: CaptureBuffer) -> Self {
        Self { buffer }
    }
}

impl<S> Layer<S> for CaptureLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        let origin = visitor.origin;
        let message = visitor.into_message(metadata.target());

        let mut entry = LogEntry::new(Severity::from(metadata.level()), metadata.target(), message);
        entry.origin = origin;
        self.buffer.push(entry);
    }
}
