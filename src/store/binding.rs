//! Binding the store to an event source

use std::sync::Arc;

use futures::{Stream, StreamExt};
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, info};

use crate::types::StoreEvent;

use super::ChatStore;

/// A running subscription of a store to an event stream.
///
/// Dropping the binding leaves the task running; call [`Binding::unbind`] to
/// stop consuming events.
#[derive(Debug)]
pub struct Binding {
    handle: JoinHandle<usize>,
}

impl Binding {
    /// Stop consuming events. Events already applied stay applied.
    pub fn unbind(&self) {
        self.handle.abort();
    }

    /// True once the stream has ended or the binding was aborted
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the stream to end and return how many events were applied.
    ///
    /// Dropping the returned future early leaves the binding running. Must not
    /// be awaited again once it has completed.
    pub async fn finished(&mut self) -> Result<usize, JoinError> {
        (&mut self.handle).await
    }
}

impl ChatStore {
    /// Apply every event from `events` in order until the stream ends
    pub fn bind<S>(self: &Arc<Self>, events: S) -> Binding
    where
        S: Stream<Item = StoreEvent> + Send + 'static,
    {
        let store = Arc::clone(self);
        let handle = tokio::spawn(async move {
            let mut events = std::pin::pin!(events);
            let mut applied = 0usize;
            while let Some(event) = events.next().await {
                debug!(event = event.name(), "received event");
                store.apply(event);
                applied += 1;
            }
            info!(applied, "event stream ended");
            applied
        });
        Binding { handle }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Chat, ChatUpdate};
    use tokio::sync::mpsc;
    use tokio_stream::wrappers::UnboundedReceiverStream;

    #[tokio::test]
    async fn test_bind_applies_in_order() {
        let store = Arc::new(ChatStore::offline());
        let events = tokio_stream::iter(vec![
            StoreEvent::ChatsUpsert(vec![Chat::new("a")]),
            StoreEvent::ChatsUpdate(vec![ChatUpdate::new("a").unread(2)]),
            StoreEvent::ChatsUpdate(vec![ChatUpdate::new("a").unread(3)]),
        ]);

        let applied = store.bind(events).finished().await.unwrap();
        assert_eq!(applied, 3);
        assert_eq!(store.chat("a").unwrap().unread_count, 5);
    }

    #[tokio::test]
    async fn test_unbind_stops_consuming() {
        let store = Arc::new(ChatStore::offline());
        let (tx, rx) = mpsc::unbounded_channel();
        let mut binding = store.bind(UnboundedReceiverStream::new(rx));

        tx.send(StoreEvent::ChatsUpsert(vec![Chat::new("a")])).unwrap();
        while store.chat("a").is_none() {
            tokio::task::yield_now().await;
        }

        assert!(!binding.is_finished());
        binding.unbind();
        let result = binding.finished().await;
        assert!(result.unwrap_err().is_cancelled());

        let _ = tx.send(StoreEvent::ChatsUpsert(vec![Chat::new("b")]));
        tokio::task::yield_now().await;
        assert!(store.chat("b").is_none());
    }
}
