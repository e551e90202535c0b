//! Feeding a hub from a line-oriented reader.

use super::hub::ChannelFeed;
use super::render::parse_event_line;
use std::io::BufRead;

/// Closes the hub when dropped, so listeners stop even if reading panics.
struct CloseOnDrop<'a>(&'a ChannelFeed);

impl Drop for CloseOnDrop<'_> {
    fn drop(&mut self) {
        self.0.close();
    }
}

/// Publish every JSON event line from `reader` to `hub`, then close the hub.
///
/// Blank lines are skipped, malformed ones are logged at `warn` and skipped.
/// A read error ends the pump. Returns how many events were published.
pub fn pump_lines(reader: impl BufRead, hub: &ChannelFeed) -> usize {
    let _close = CloseOnDrop(hub);
    let mut published = 0;
    for (n, line) in reader.lines().enumerate() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!("Stopped reading events: {e}");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        match parse_event_line(&line) {
            Ok(event) => {
                hub.publish(event);
                published += 1;
            }
            Err(e) => tracing::warn!(line = n + 1, "Skipping event: {e}"),
        }
    }
    published
}
