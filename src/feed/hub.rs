//! Subscriptions and the in-process feed hub.
//!
//! A [`Subscription`] owns its receiving end and a release action. Dropping
//! it runs the release, so the subscription is given back on every way out
//! of the scope that holds it: normal return, `?`, or unwinding.

use super::record::FeedEvent;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FeedError {
    #[error("Feed is closed")]
    Closed,
    #[error("Malformed feed event: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Anything that can deliver change events for a table.
pub trait FeedSource {
    fn subscribe(&self, table: &str) -> Result<Subscription, FeedError>;
}

/// Live subscription. Released when dropped.
pub struct Subscription {
    table: String,
    receiver: Receiver<FeedEvent>,
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    /// Wrap a receiver together with the action that unsubscribes it.
    pub fn new(
        table: impl Into<String>,
        receiver: Receiver<FeedEvent>,
        release: impl FnOnce() + Send + 'static,
    ) -> Self {
        Self {
            table: table.into(),
            receiver,
            release: Some(Box::new(release)),
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Block for the next event. `None` once the source has gone away.
    pub fn recv(&self) -> Option<FeedEvent> {
        self.receiver.recv().ok()
    }

    pub fn try_recv(&self) -> Option<FeedEvent> {
        self.receiver.try_recv().ok()
    }

    /// Like [`recv`](Self::recv) with a deadline. `Ok(None)` on timeout,
    /// `Err(Closed)` when the source has gone away.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<Option<FeedEvent>, FeedError> {
        match self.receiver.recv_timeout(timeout) {
            Ok(event) => Ok(Some(event)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(FeedError::Closed),
        }
    }
}

impl Iterator for Subscription {
    type Item = FeedEvent;

    fn next(&mut self) -> Option<FeedEvent> {
        self.recv()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            tracing::debug!(table = %self.table, "Unsubscribing");
            release();
        }
    }
}

struct Slot {
    table: String,
    sender: Sender<FeedEvent>,
}

#[derive(Default)]
struct HubState {
    next_id: AtomicU64,
    closed: AtomicBool,
    slots: Mutex<HashMap<u64, Slot>>,
}

impl HubState {
    fn slots(&self) -> std::sync::MutexGuard<'_, HashMap<u64, Slot>> {
        self.slots.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// In-process feed: [`publish`](Self::publish) fans each event out to the
/// current subscribers of its table. Clones share the same hub.
#[derive(Clone, Default)]
pub struct ChannelFeed {
    state: Arc<HubState>,
}

impl ChannelFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver `event` to every subscriber of `event.table`. Returns how many
    /// received it. Subscribers whose receiver is gone are pruned.
    pub fn publish(&self, event: FeedEvent) -> usize {
        let mut slots = self.state.slots();
        let mut dead = Vec::new();
        let mut delivered = 0;
        for (id, slot) in slots.iter() {
            if slot.table != event.table {
                continue;
            }
            if slot.sender.send(event.clone()).is_ok() {
                delivered += 1;
            } else {
                dead.push(*id);
            }
        }
        for id in dead {
            slots.remove(&id);
        }
        delivered
    }

    pub fn subscriber_count(&self) -> usize {
        self.state.slots().len()
    }

    /// Stop accepting subscribers and disconnect the existing ones; their
    /// `recv` returns `None` once drained.
    pub fn close(&self) {
        self.state.closed.store(true, Ordering::SeqCst);
        self.state.slots().clear();
    }

    pub fn is_closed(&self) -> bool {
        self.state.closed.load(Ordering::SeqCst)
    }
}

impl FeedSource for ChannelFeed {
    fn subscribe(&self, table: &str) -> Result<Subscription, FeedError> {
        if self.is_closed() {
            return Err(FeedError::Closed);
        }
        let (sender, receiver) = mpsc::channel();
        let id = self.state.next_id.fetch_add(1, Ordering::Relaxed);
        self.state.slots().insert(
            id,
            Slot {
                table: table.to_string(),
                sender,
            },
        );
        tracing::debug!(table, id, "Subscribed");

        let state = Arc::clone(&self.state);
        Ok(Subscription::new(table, receiver, move || {
            state.slots().remove(&id);
        }))
    }
}
