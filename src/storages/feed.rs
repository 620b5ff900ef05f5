//! Change feed: full-snapshot broadcast to registry subscribers.
//!
//! Every mutation of a store publishes the complete current record set (not
//! a diff), so a consumer never has to reconcile deltas — its latest received
//! snapshot IS the registry. Delivery is fire-and-forget: publishing never
//! waits on a subscriber.

use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::task::{Context, Poll};

use dashmap::DashMap;
use tokio::sync::mpsc;
use tracing::debug;

use super::models::LinkRecord;

/// The full current set of link records at a point in time, newest first.
pub type Snapshot = Vec<LinkRecord>;

/// Canonical snapshot ordering: creation time descending, id as tiebreak.
pub fn order_snapshot(mut records: Vec<LinkRecord>) -> Snapshot {
    records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
    records
}

#[derive(Clone, Default)]
pub struct ChangeFeed {
    subscribers: Arc<DashMap<u64, mpsc::UnboundedSender<Snapshot>>>,
    next_id: Arc<AtomicU64>,
}

impl ChangeFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscriber. The current snapshot is queued before the
    /// subscription is handed back, so the consumer always starts from a
    /// complete view and only then sees mutation-triggered emissions.
    pub fn subscribe(&self, initial: Snapshot) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);

        // 新订阅者先收到当前快照
        let _ = tx.send(initial);
        self.subscribers.insert(id, tx);
        debug!("Change feed: subscriber {} registered", id);

        Subscription {
            id,
            subscribers: Arc::clone(&self.subscribers),
            receiver: rx,
        }
    }

    /// Fan the snapshot out to every live subscriber. Unbounded sends cannot
    /// block the mutating path; receivers that have gone away are pruned.
    pub fn publish(&self, snapshot: Snapshot) {
        let mut dead = Vec::new();

        for entry in self.subscribers.iter() {
            if entry.value().send(snapshot.clone()).is_err() {
                dead.push(*entry.key());
            }
        }

        for id in dead {
            self.subscribers.remove(&id);
            debug!("Change feed: pruned closed subscriber {}", id);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

/// Handle to an active change-feed subscription. Dropping it (or calling
/// [`Subscription::unsubscribe`]) stops further delivery; emissions already
/// queued may still be drained.
pub struct Subscription {
    id: u64,
    subscribers: Arc<DashMap<u64, mpsc::UnboundedSender<Snapshot>>>,
    receiver: mpsc::UnboundedReceiver<Snapshot>,
}

impl Subscription {
    /// Wait for the next snapshot. `None` once unsubscribed and drained.
    pub async fn recv(&mut self) -> Option<Snapshot> {
        self.receiver.recv().await
    }

    pub fn try_recv(&mut self) -> Option<Snapshot> {
        self.receiver.try_recv().ok()
    }

    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.subscribers.remove(&self.id);
    }
}

impl futures_util::Stream for Subscription {
    type Item = Snapshot;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}
