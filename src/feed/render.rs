//! Turning feed events into console lines.

use super::hub::{FeedError, Subscription};
use super::record::{ChangeKind, FeedEvent, FeedRecord};
use chrono::Local;

/// `HH:MM:SS [process] message` in local time, followed by indented pretty
/// JSON details when present and `show_details` is set.
pub fn render_record(record: &FeedRecord, show_details: bool) -> String {
    let mut line = format!(
        "{} [{}] {}",
        record.created_at.with_timezone(&Local).format("%H:%M:%S"),
        record.process_name,
        record.message
    );
    if show_details && let Some(details) = &record.details {
        let pretty = serde_json::to_string_pretty(details).unwrap_or_else(|_| details.to_string());
        for detail_line in pretty.lines() {
            line.push_str("\n    ");
            line.push_str(detail_line);
        }
    }
    line
}

/// Render an event if it is an insert; other change kinds are not shown.
pub fn render_event(event: &FeedEvent, show_details: bool) -> Option<String> {
    match event.kind {
        ChangeKind::Insert => Some(render_record(&event.record, show_details)),
        ChangeKind::Update | ChangeKind::Delete => None,
    }
}

/// Decode one JSON event line.
pub fn parse_event_line(line: &str) -> Result<FeedEvent, FeedError> {
    Ok(serde_json::from_str(line.trim())?)
}

/// Drain `subscription` until its source closes, handing each rendered
/// insert to `sink`. Returns how many lines were rendered.
///
/// Takes the subscription by value: it is released when this returns.
pub fn listen(subscription: Subscription, show_details: bool, mut sink: impl FnMut(&str)) -> usize {
    let table = subscription.table().to_string();
    let mut rendered = 0;
    for event in subscription {
        match render_event(&event, show_details) {
            Some(line) => {
                sink(&line);
                rendered += 1;
            }
            None => tracing::trace!(table = %table, kind = ?event.kind, "Ignoring non-insert event"),
        }
    }
    tracing::debug!(table = %table, rendered, "Feed closed");
    rendered
}
