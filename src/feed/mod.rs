//! Realtime log feed consumer.
//!
//! The transport is left abstract behind [`FeedSource`]; [`ChannelFeed`] is
//! the in-process implementation used by the `tail` command and the tests.
//! [`pump_lines`] fills it from JSON event lines.
//! Records are rendered to console lines with [`render_record`]; only
//! insert events are shown.

mod hub;
mod pump;
mod record;
mod render;

pub use hub::{ChannelFeed, FeedError, FeedSource, Subscription};
pub use pump::pump_lines;
pub use record::{ChangeKind, FeedEvent, FeedRecord};
pub use render::{listen, parse_event_line, render_event, render_record};
