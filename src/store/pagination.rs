//! Cache-aware message history pagination
//!
//! A page request is planned against the cached list under the lock, the lock
//! is dropped for the fetch, and the fetched history is spliced in afterwards
//! against whatever the list looks like by then.

use std::collections::HashSet;

use tracing::debug;

use crate::collections::OrderedList;
use crate::types::jid::normalize_jid;
use crate::types::{Message, MessageCursor};

use super::ChatStore;

/// What serving a page requires
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum PagePlan {
    /// Cache is not authoritative: ask the fetcher with the original request
    Delegate,
    /// Fully served from cache
    Cached(Vec<Message>),
    /// Cache holds `cached`; `deficit` older messages must be fetched
    Deficit {
        cached: Vec<Message>,
        deficit: usize,
        fetch_cursor: Option<MessageCursor>,
    },
}

/// Decide how to serve `count` messages relative to `cursor` from `list`
pub(crate) fn plan_page(
    list: &OrderedList<Message>,
    count: usize,
    cursor: Option<&MessageCursor>,
) -> PagePlan {
    let before_id = match cursor {
        Some(MessageCursor::After(_)) => return PagePlan::Delegate,
        Some(MessageCursor::Before(key)) => Some(key.id.as_str()),
        None => None,
    };
    let Some(prefix) = list.before(before_id) else {
        return PagePlan::Delegate;
    };

    let available = prefix.len();
    if available >= count {
        return PagePlan::Cached(prefix.skip(available - count).cloned().collect());
    }

    let cached: Vec<Message> = prefix.cloned().collect();
    let fetch_cursor = match cached.first() {
        Some(oldest) => Some(MessageCursor::Before(oldest.key.clone())),
        None => cursor.cloned(),
    };
    PagePlan::Deficit {
        cached,
        deficit: count - available,
        fetch_cursor,
    }
}

impl ChatStore {
    /// Load up to `count` messages of `jid` relative to `cursor`, oldest first.
    ///
    /// With no cursor or a `Before` cursor found in cache, cached messages are
    /// used and only the shortfall is fetched; fetched history is kept for
    /// later requests. `After` cursors and unknown cursors go straight to the
    /// fetcher and nothing is cached.
    pub async fn load_messages(
        &self,
        jid: &str,
        count: usize,
        cursor: Option<MessageCursor>,
    ) -> Vec<Message> {
        if count == 0 {
            return Vec::new();
        }
        let jid = normalize_jid(jid);

        let plan = {
            let mut state = self.state.lock();
            plan_page(state.message_list_mut(&jid), count, cursor.as_ref())
        };

        match plan {
            PagePlan::Cached(page) => page,
            PagePlan::Delegate => {
                debug!(jid = %jid, count, ?cursor, "cursor not served from cache, delegating");
                self.fetcher
                    .fetch_historical_messages(&jid, count, cursor.as_ref())
                    .await
            }
            PagePlan::Deficit {
                cached,
                deficit,
                fetch_cursor,
            } => {
                debug!(jid = %jid, cached = cached.len(), deficit, "fetching missing history");
                let fetched = self
                    .fetcher
                    .fetch_historical_messages(&jid, deficit, fetch_cursor.as_ref())
                    .await;
                self.splice_history(&jid, cached, fetched, deficit, fetch_cursor.as_ref())
            }
        }
    }

    /// Persist fetched history before the anchor and assemble the page.
    ///
    /// The anchor is looked up again here because events may have reshaped
    /// the list while the fetch was outstanding.
    fn splice_history(
        &self,
        jid: &str,
        cached: Vec<Message>,
        mut fetched: Vec<Message>,
        deficit: usize,
        fetch_cursor: Option<&MessageCursor>,
    ) -> Vec<Message> {
        if fetched.len() > deficit {
            fetched.drain(..fetched.len() - deficit);
        }
        let cached_ids: HashSet<&str> = cached.iter().map(Message::id).collect();
        fetched.retain(|m| !cached_ids.contains(m.id()));

        let anchor = fetch_cursor.map(|c| c.key().id.as_str());
        let mut state = self.state.lock();
        for msg in &fetched {
            state.forget_lookaside(jid, msg.id());
        }
        let list = state.message_list_mut(jid);
        let inserted = list.splice_before(anchor, fetched.clone());
        debug!(jid = %jid, fetched = fetched.len(), inserted, "spliced history");

        let still_cached = cached.into_iter().filter(|m| list.contains(m.id()));
        fetched.into_iter().chain(still_cached).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collections::InsertMode;
    use crate::types::MessageKey;

    fn list(n: usize) -> OrderedList<Message> {
        (1..=n)
            .map(|i| Message::new(MessageKey::new("c", format!("m{i}")), i as u64))
            .collect()
    }

    fn ids(messages: &[Message]) -> Vec<&str> {
        messages.iter().map(Message::id).collect()
    }

    #[test]
    fn test_plan_served_from_cache() {
        let list = list(5);
        match plan_page(&list, 3, None) {
            PagePlan::Cached(page) => assert_eq!(ids(&page), vec!["m3", "m4", "m5"]),
            other => panic!("unexpected plan {other:?}"),
        }

        let cursor = MessageCursor::Before(MessageKey::new("c", "m4"));
        match plan_page(&list, 2, Some(&cursor)) {
            PagePlan::Cached(page) => assert_eq!(ids(&page), vec!["m2", "m3"]),
            other => panic!("unexpected plan {other:?}"),
        }
    }

    #[test]
    fn test_plan_deficit_uses_oldest_cached() {
        let list = list(2);
        match plan_page(&list, 5, None) {
            PagePlan::Deficit {
                cached,
                deficit,
                fetch_cursor,
            } => {
                assert_eq!(ids(&cached), vec!["m1", "m2"]);
                assert_eq!(deficit, 3);
                assert_eq!(
                    fetch_cursor,
                    Some(MessageCursor::Before(MessageKey::new("c", "m1")))
                );
            }
            other => panic!("unexpected plan {other:?}"),
        }
    }

    #[test]
    fn test_plan_empty_prefix_keeps_original_cursor() {
        let list = list(3);
        let cursor = MessageCursor::Before(MessageKey::new("c", "m1"));
        match plan_page(&list, 2, Some(&cursor)) {
            PagePlan::Deficit {
                cached,
                deficit,
                fetch_cursor,
            } => {
                assert!(cached.is_empty());
                assert_eq!(deficit, 2);
                assert_eq!(fetch_cursor, Some(cursor));
            }
            other => panic!("unexpected plan {other:?}"),
        }
    }

    #[test]
    fn test_plan_delegates_after_and_unknown() {
        let mut list = list(3);
        let after = MessageCursor::After(MessageKey::new("c", "m1"));
        assert_eq!(plan_page(&list, 2, Some(&after)), PagePlan::Delegate);

        let unknown = MessageCursor::Before(MessageKey::new("c", "zz"));
        assert_eq!(plan_page(&list, 2, Some(&unknown)), PagePlan::Delegate);

        list.upsert(Message::new(MessageKey::new("c", "zz"), 9), InsertMode::Append);
        assert!(matches!(
            plan_page(&list, 2, Some(&unknown)),
            PagePlan::Cached(_)
        ));
    }
}
