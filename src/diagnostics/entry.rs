//! Captured log entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of a captured entry. Mirrors `tracing::Level` but is
/// serializable so entries survive persistence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<&tracing::Level> for Severity {
    fn from(level: &tracing::Level) -> Self {
        match *level {
            tracing::Level::TRACE => Severity::Trace,
            tracing::Level::DEBUG => Severity::Debug,
            tracing::Level::INFO => Severity::Info,
            tracing::Level::WARN => Severity::Warn,
            tracing::Level::ERROR => Severity::Error,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Trace => "TRACE",
            Severity::Debug => "DEBUG",
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
        };
        f.pad(s)
    }
}

/// How an entry reached the capture buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    /// A regular `tracing` event.
    #[default]
    Log,
    /// A panic caught by the diagnostics panic hook.
    Panic,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub level: Severity,
    pub timestamp: DateTime<Utc>,
    pub target: String,
    pub message: String,
    #[serde(default)]
    pub origin: Origin,
}

impl LogEntry {
    pub fn new(level: Severity, target: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level,
            timestamp: Utc::now(),
            target: target.into(),
            message: message.into(),
            origin: Origin::Log,
        }
    }

    pub fn panic(message: impl Into<String>) -> Self {
        Self {
            origin: Origin::Panic,
            ..Self::new(Severity::Error, "panic", message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_from_tracing_level() {
        assert_eq!(Severity::from(&tracing::Level::WARN), Severity::Warn);
        assert_eq!(Severity::from(&tracing::Level::TRACE), Severity::Trace);
        assert!(Severity::Error > Severity::Info);
    }

    #[test]
    fn severity_display_pads() {
        assert_eq!(format!("{:<5}", Severity::Info), "INFO ");
    }

    #[test]
    fn entry_json_shape() {
        let entry = LogEntry::new(Severity::Warn, "sigtrim::feed", "slow consumer");
        let json: serde_json::Value = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["level"], "warn");
        assert_eq!(json["origin"], "log");
        assert_eq!(json["target"], "sigtrim::feed");
    }

    #[test]
    fn origin_defaults_to_log_when_missing() {
        let json = r#"{"level":"info","timestamp":"2026-03-01T10:00:00Z","target":"t","message":"m"}"#;
        let entry: LogEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.origin, Origin::Log);
    }

    #[test]
    fn panic_entries_are_errors() {
        let entry = LogEntry::panic("boom");
        assert_eq!(entry.level, Severity::Error);
        assert_eq!(entry.origin, Origin::Panic);
    }
}
