//! Feed records and the change events that carry them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One row of the server-side log table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedRecord {
    pub process_name: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

impl FeedRecord {
    pub fn new(process_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            process_name: process_name.into(),
            message: message.into(),
            details: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

/// A change on `table`, as delivered to subscribers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedEvent {
    pub table: String,
    pub kind: ChangeKind,
    pub record: FeedRecord,
}

impl FeedEvent {
    pub fn insert(table: impl Into<String>, record: FeedRecord) -> Self {
        Self {
            table: table.into(),
            kind: ChangeKind::Insert,
            record,
        }
    }
}
