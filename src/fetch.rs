//! Remote fetch collaborator
//!
//! The store never talks to the network itself. On a cache miss it asks a
//! [`HistoryFetcher`]; an empty or `None` answer means "no data", never an
//! error. Retries and timeouts are the implementor's business.

use async_trait::async_trait;

use crate::types::{GroupMetadata, Message, MessageCursor, MessageInfo, MessageKey};

/// Remote source the store falls back to on a cache miss
#[async_trait]
pub trait HistoryFetcher: Send + Sync {
    /// Up to `count` messages adjacent to `cursor`, oldest first
    async fn fetch_historical_messages(
        &self,
        _jid: &str,
        _count: usize,
        _cursor: Option<&MessageCursor>,
    ) -> Vec<Message> {
        Vec::new()
    }

    async fn fetch_single_message(&self, _jid: &str, _id: &str) -> Option<Message> {
        None
    }

    async fn fetch_most_recent_message(&self, _jid: &str) -> Option<Message> {
        None
    }

    async fn fetch_profile_image_url(&self, _jid: &str) -> Option<String> {
        None
    }

    async fn fetch_group_metadata(&self, _jid: &str) -> Option<GroupMetadata> {
        None
    }

    async fn fetch_broadcast_list_metadata(&self, _jid: &str) -> Option<GroupMetadata> {
        None
    }

    async fn fetch_message_receipt_info(&self, _key: &MessageKey) -> Option<MessageInfo> {
        None
    }
}

/// Fetcher that never finds anything; the store then serves cache only
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopFetcher;

#[async_trait]
impl HistoryFetcher for NoopFetcher {}
