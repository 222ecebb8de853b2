//! Integration tests for cache-aware history pagination

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Notify;

use chat_store::types::MessageDeletion;
use chat_store::{ChatStore, HistoryFetcher, Message, MessageCursor, MessageKey, StoreEvent, UpsertKind};

const JID: &str = "1@s.whatsapp.net";

fn msg(i: u64) -> Message {
    Message::new(MessageKey::new(JID, format!("m{i}")), i)
}

fn ids(messages: &[Message]) -> Vec<String> {
    messages.iter().map(|m| m.id().to_string()).collect()
}

fn range(from: u64, to: u64) -> Vec<String> {
    (from..=to).map(|i| format!("m{i}")).collect()
}

/// Serves a fixed remote history of `m1..=m{len}` and records every request
struct ScriptedFetcher {
    remote: Vec<Message>,
    calls: Mutex<Vec<(usize, Option<MessageCursor>)>>,
    /// Extra messages returned beyond what was asked for
    overshoot: usize,
    gate: Option<(Arc<Notify>, Arc<Notify>)>,
}

impl ScriptedFetcher {
    fn new(len: u64) -> Self {
        Self {
            remote: (1..=len).map(msg).collect(),
            calls: Mutex::new(Vec::new()),
            overshoot: 0,
            gate: None,
        }
    }

    fn calls(&self) -> Vec<(usize, Option<MessageCursor>)> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl HistoryFetcher for ScriptedFetcher {
    async fn fetch_historical_messages(
        &self,
        _jid: &str,
        count: usize,
        cursor: Option<&MessageCursor>,
    ) -> Vec<Message> {
        self.calls.lock().push((count, cursor.cloned()));
        if let Some((started, release)) = &self.gate {
            started.notify_one();
            release.notified().await;
        }

        let count = count + self.overshoot;
        let position = |key: &MessageKey| self.remote.iter().position(|m| m.key.id == key.id);
        let slice: &[Message] = match cursor {
            None => {
                let end = self.remote.len();
                &self.remote[end.saturating_sub(count)..end]
            }
            Some(MessageCursor::Before(key)) => match position(key) {
                Some(end) => &self.remote[end.saturating_sub(count)..end],
                None => &[],
            },
            Some(MessageCursor::After(key)) => match position(key) {
                Some(pos) => {
                    let start = pos + 1;
                    &self.remote[start..(start + count).min(self.remote.len())]
                }
                None => &[],
            },
        };
        slice.to_vec()
    }
}

fn seeded(fetcher: Arc<ScriptedFetcher>, from: u64, to: u64) -> Arc<ChatStore> {
    let store = Arc::new(ChatStore::new(fetcher));
    store.apply(StoreEvent::MessagesUpsert {
        messages: (from..=to).map(msg).collect(),
        kind: UpsertKind::Append,
    });
    store
}

#[tokio::test]
async fn test_fully_cached_page_does_not_fetch() {
    let fetcher = Arc::new(ScriptedFetcher::new(10));
    let store = seeded(fetcher.clone(), 6, 10);

    let page = store.load_messages(JID, 3, None).await;
    assert_eq!(ids(&page), range(8, 10));
    assert!(fetcher.calls().is_empty());
}

#[tokio::test]
async fn test_deficit_is_fetched_before_oldest_and_kept() {
    let fetcher = Arc::new(ScriptedFetcher::new(10));
    let store = seeded(fetcher.clone(), 9, 10);

    let page = store.load_messages(JID, 5, None).await;
    assert_eq!(ids(&page), range(6, 10));
    assert_eq!(
        fetcher.calls(),
        vec![(3, Some(MessageCursor::Before(MessageKey::new(JID, "m9"))))]
    );
    assert_eq!(ids(&store.messages(JID)), range(6, 10));

    // The same page again comes from cache
    let again = store.load_messages(JID, 5, None).await;
    assert_eq!(ids(&again), range(6, 10));
    assert_eq!(fetcher.calls().len(), 1);
}

#[tokio::test]
async fn test_before_cursor_in_cache() {
    let fetcher = Arc::new(ScriptedFetcher::new(10));
    let store = seeded(fetcher.clone(), 6, 10);

    let cursor = MessageCursor::Before(MessageKey::new(JID, "m7"));
    let page = store.load_messages(JID, 3, Some(cursor)).await;
    assert_eq!(ids(&page), range(4, 6));
    assert_eq!(
        fetcher.calls(),
        vec![(2, Some(MessageCursor::Before(MessageKey::new(JID, "m6"))))]
    );
    assert_eq!(ids(&store.messages(JID)), range(4, 10));
}

#[tokio::test]
async fn test_after_and_unknown_cursors_delegate() {
    let fetcher = Arc::new(ScriptedFetcher::new(10));
    let store = seeded(fetcher.clone(), 6, 10);

    let after = MessageCursor::After(MessageKey::new(JID, "m6"));
    let page = store.load_messages(JID, 2, Some(after.clone())).await;
    assert_eq!(ids(&page), range(7, 8));

    let unknown = MessageCursor::Before(MessageKey::new(JID, "m3"));
    let page = store.load_messages(JID, 2, Some(unknown.clone())).await;
    assert_eq!(ids(&page), range(1, 2));

    assert_eq!(fetcher.calls(), vec![(2, Some(after)), (2, Some(unknown))]);
    // Delegated results are not cached
    assert_eq!(ids(&store.messages(JID)), range(6, 10));
}

#[tokio::test]
async fn test_empty_conversation_and_zero_count() {
    let fetcher = Arc::new(ScriptedFetcher::new(4));
    let store = Arc::new(ChatStore::new(fetcher.clone()));

    assert!(store.load_messages(JID, 0, None).await.is_empty());
    assert!(fetcher.calls().is_empty());

    let page = store.load_messages(JID, 10, None).await;
    assert_eq!(ids(&page), range(1, 4));
    assert_eq!(fetcher.calls(), vec![(10, None)]);
    assert_eq!(ids(&store.messages(JID)), range(1, 4));
}

#[tokio::test]
async fn test_oversized_fetch_is_trimmed() {
    let mut fetcher = ScriptedFetcher::new(10);
    fetcher.overshoot = 2;
    let fetcher = Arc::new(fetcher);
    let store = seeded(fetcher.clone(), 9, 10);

    let page = store.load_messages(JID, 4, None).await;
    assert_eq!(ids(&page), range(7, 10));
    assert_eq!(ids(&store.messages(JID)), range(7, 10));
}

#[tokio::test]
async fn test_events_during_fetch_are_respected() {
    let started = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());
    let mut fetcher = ScriptedFetcher::new(12);
    fetcher.gate = Some((started.clone(), release.clone()));
    let store = seeded(Arc::new(fetcher), 9, 10);

    let loader = {
        let store = Arc::clone(&store);
        tokio::spawn(async move { store.load_messages(JID, 5, None).await })
    };

    started.notified().await;
    store.apply(StoreEvent::MessagesUpsert {
        messages: vec![msg(11)],
        kind: UpsertKind::Append,
    });
    release.notify_one();

    let page = loader.await.unwrap();
    assert_eq!(ids(&page), range(6, 10));
    assert_eq!(ids(&store.messages(JID)), range(6, 11));
}

#[tokio::test]
async fn test_anchor_deleted_during_fetch() {
    let started = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());
    let mut fetcher = ScriptedFetcher::new(10);
    fetcher.gate = Some((started.clone(), release.clone()));
    let store = seeded(Arc::new(fetcher), 9, 10);

    let loader = {
        let store = Arc::clone(&store);
        tokio::spawn(async move { store.load_messages(JID, 5, None).await })
    };

    started.notified().await;
    store.apply(StoreEvent::MessagesDelete(MessageDeletion::Keys(vec![
        MessageKey::new(JID, "m9"),
    ])));
    release.notify_one();

    let page = loader.await.unwrap();
    assert_eq!(ids(&page), vec!["m6", "m7", "m8", "m10"]);
    assert_eq!(ids(&store.messages(JID)), vec!["m6", "m7", "m8", "m10"]);
}
