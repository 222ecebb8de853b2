//! Conversation types and their merge rules

use std::cmp::Reverse;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{is_false, is_zero, Keyed, Sorted};

/// A conversation (chat thread)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chat {
    pub id: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub pinned: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub archived: bool,
    #[serde(rename = "conversationTimestamp", default, skip_serializing_if = "is_zero")]
    pub conversation_timestamp: u64,
    #[serde(rename = "unreadCount", default)]
    pub unread_count: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Fields the store does not interpret, kept and merged opaquely
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Chat {
    /// Create an empty conversation
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            pinned: false,
            archived: false,
            conversation_timestamp: 0,
            unread_count: 0,
            name: None,
            extra: Map::new(),
        }
    }

    /// Set the conversation timestamp
    pub fn with_timestamp(mut self, timestamp: u64) -> Self {
        self.conversation_timestamp = timestamp;
        self
    }

    /// Set the unread count
    pub fn with_unread(mut self, unread: i64) -> Self {
        self.unread_count = unread;
        self
    }

    pub fn pinned(mut self, pinned: bool) -> Self {
        self.pinned = pinned;
        self
    }

    pub fn archived(mut self, archived: bool) -> Self {
        self.archived = archived;
        self
    }

    /// Apply a partial update.
    ///
    /// A positive `unreadCount` is a delta added to the current count; zero or
    /// a negative value replaces it. Every other present field overwrites.
    pub fn merge(&mut self, update: &ChatUpdate) {
        if let Some(unread) = update.unread_count {
            if unread > 0 {
                self.unread_count += unread;
            } else {
                self.unread_count = unread;
            }
        }
        if let Some(pinned) = update.pinned {
            self.pinned = pinned;
        }
        if let Some(archived) = update.archived {
            self.archived = archived;
        }
        if let Some(ts) = update.conversation_timestamp {
            self.conversation_timestamp = ts;
        }
        if let Some(name) = &update.name {
            self.name = Some(name.clone());
        }
        for (k, v) in &update.extra {
            self.extra.insert(k.clone(), v.clone());
        }
    }
}

impl Keyed for Chat {
    fn key(&self) -> &str {
        &self.id
    }
}

/// Ordering key for conversations, compared descending.
///
/// Equivalent to the string key `[pinned][!archived][hex timestamp][id]`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ChatSortKey {
    pub pinned: bool,
    pub unarchived: bool,
    pub timestamp: u64,
    pub id: String,
}

impl Sorted for Chat {
    type SortKey = Reverse<ChatSortKey>;

    fn sort_key(&self) -> Self::SortKey {
        Reverse(ChatSortKey {
            pinned: self.pinned,
            unarchived: !self.archived,
            timestamp: self.conversation_timestamp,
            id: self.id.clone(),
        })
    }
}

/// Partial conversation update
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatUpdate {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pinned: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived: Option<bool>,
    #[serde(rename = "conversationTimestamp", default, skip_serializing_if = "Option::is_none")]
    pub conversation_timestamp: Option<u64>,
    #[serde(rename = "unreadCount", default, skip_serializing_if = "Option::is_none")]
    pub unread_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ChatUpdate {
    /// Create an update touching no fields
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// Unread delta (positive) or replacement (zero or negative)
    pub fn unread(mut self, unread: i64) -> Self {
        self.unread_count = Some(unread);
        self
    }

    /// Set the conversation timestamp
    pub fn timestamp(mut self, timestamp: u64) -> Self {
        self.conversation_timestamp = Some(timestamp);
        self
    }

    pub fn pinned(mut self, pinned: bool) -> Self {
        self.pinned = Some(pinned);
        self
    }

    pub fn archived(mut self, archived: bool) -> Self {
        self.archived = Some(archived);
        self
    }
}
