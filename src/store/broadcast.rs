//! Derived event broadcaster
//!
//! Some events make the store synthesize further events (a `notify` message
//! for an unknown conversation creates that conversation). Those are applied
//! to the store and then published here so the embedding application sees
//! the same change.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::types::StoreEvent;

/// A derived event with its publication metadata
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StoreNotice {
    #[serde(flatten)]
    pub event: StoreEvent,

    /// Monotonically increasing sequence ID for gap detection
    pub sequence_id: u64,

    /// Unix timestamp when the event was published
    pub timestamp: i64,
}

/// Event broadcaster for derived store events
pub struct EventBroadcaster {
    tx: broadcast::Sender<StoreNotice>,
    sequence_counter: AtomicU64,
}

impl EventBroadcaster {
    /// Create a new broadcaster with the given channel capacity
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self {
            tx,
            sequence_counter: AtomicU64::new(0),
        }
    }

    /// Broadcast an event to all subscribers
    pub fn broadcast(&self, event: StoreEvent) {
        let seq = self.sequence_counter.fetch_add(1, Ordering::SeqCst);
        let notice = StoreNotice {
            event,
            sequence_id: seq,
            timestamp: chrono::Utc::now().timestamp(),
        };
        // No receivers is fine
        let _ = self.tx.send(notice);
    }

    /// Get the next sequence ID to be assigned
    pub fn current_sequence_id(&self) -> u64 {
        self.sequence_counter.load(Ordering::SeqCst)
    }

    /// Subscribe to derived events
    pub fn subscribe(&self) -> broadcast::Receiver<StoreNotice> {
        self.tx.subscribe()
    }
}
