//! Read-with-fallback lookups
//!
//! Each lookup answers from cache when it can; on a miss it asks the fetcher
//! and caches what came back.

use tracing::debug;

use crate::collections::InsertMode;
use crate::types::jid::normalize_jid;
use crate::types::{GroupMetadata, Message, MessageInfo, MessageKey, ProfileImage};

use super::ChatStore;

impl ChatStore {
    /// One message by id.
    ///
    /// Fetched messages are cached beside the conversation's list rather than
    /// in it: their place in the history is unknown.
    pub async fn load_message(&self, jid: &str, id: &str) -> Option<Message> {
        let jid = normalize_jid(jid);
        {
            let state = self.state.lock();
            let cached = state
                .messages
                .get(&jid)
                .and_then(|list| list.get(id))
                .or_else(|| state.lookaside.get(&jid).and_then(|m| m.get(id)));
            if let Some(msg) = cached {
                return Some(msg.clone());
            }
        }

        let fetched = self.fetcher.fetch_single_message(&jid, id).await?;
        self.state
            .lock()
            .lookaside
            .entry(jid)
            .or_default()
            .insert(id.to_string(), fetched.clone());
        Some(fetched)
    }

    /// Newest message of a conversation.
    ///
    /// A fetched message is appended only if the list is still empty when it
    /// arrives.
    pub async fn most_recent_message(&self, jid: &str) -> Option<Message> {
        let jid = normalize_jid(jid);
        {
            let state = self.state.lock();
            if let Some(last) = state.messages.get(&jid).and_then(|list| list.last()) {
                return Some(last.clone());
            }
        }

        let fetched = self.fetcher.fetch_most_recent_message(&jid).await?;
        let mut state = self.state.lock();
        if state.message_list_mut(&jid).is_empty() {
            state.forget_lookaside(&jid, fetched.id());
            state
                .message_list_mut(&jid)
                .upsert(fetched.clone(), InsertMode::Append);
        }
        Some(fetched)
    }

    /// Profile picture URL of a contact.
    ///
    /// Known contacts remember the answer, including "has no picture", so the
    /// fetcher is asked at most once per contact. Unknown contacts are fetched
    /// every time.
    pub async fn profile_picture_url(&self, jid: &str) -> Option<String> {
        let known = self.state.lock().contacts.get(jid).map(|c| c.img_url.clone());

        match known {
            Some(ProfileImage::Present(url)) => Some(url),
            Some(ProfileImage::Absent) => None,
            Some(ProfileImage::NotFetched) => {
                let url = self.fetcher.fetch_profile_image_url(jid).await;
                let mut state = self.state.lock();
                if let Some(contact) = state.contacts.get_mut(jid) {
                    if contact.img_url.is_not_fetched() {
                        contact.img_url = ProfileImage::from(url.clone());
                    }
                }
                url
            }
            None => {
                debug!(jid, "profile picture for unknown contact, not caching");
                self.fetcher.fetch_profile_image_url(jid).await
            }
        }
    }

    /// Group metadata, fetched and stored on a miss
    pub async fn group_metadata(&self, jid: &str) -> Option<GroupMetadata> {
        if let Some(group) = self.cached_group(jid) {
            return Some(group);
        }
        let fetched = self.fetcher.fetch_group_metadata(jid).await?;
        Some(self.store_group(fetched))
    }

    /// Broadcast list metadata, fetched and stored on a miss
    pub async fn broadcast_list_info(&self, jid: &str) -> Option<GroupMetadata> {
        if let Some(group) = self.cached_group(jid) {
            return Some(group);
        }
        let fetched = self.fetcher.fetch_broadcast_list_metadata(jid).await?;
        Some(self.store_group(fetched))
    }

    /// Receipt info of a message, fetched and stored on a miss
    pub async fn message_receipts(&self, key: &MessageKey) -> Option<MessageInfo> {
        if let Some(info) = self.message_info(&key.id) {
            return Some(info);
        }
        let fetched = self.fetcher.fetch_message_receipt_info(key).await?;
        let mut state = self.state.lock();
        Some(
            state
                .message_info
                .entry(key.id.clone())
                .or_insert(fetched)
                .clone(),
        )
    }

    fn cached_group(&self, jid: &str) -> Option<GroupMetadata> {
        self.state.lock().groups.get(jid).cloned()
    }

    /// Keep metadata that arrived through events while the fetch was running
    fn store_group(&self, fetched: GroupMetadata) -> GroupMetadata {
        let mut state = self.state.lock();
        state
            .groups
            .entry(fetched.id.clone())
            .or_insert(fetched)
            .clone()
    }
}
