//! Persisted store document

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{Chat, Contact, Message};

/// Whole-store snapshot: `{ conversations, contacts, messages }`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreDocument {
    /// Conversations in collection order
    #[serde(rename = "conversations", alias = "chats", default)]
    pub chats: Vec<Chat>,
    #[serde(default)]
    pub contacts: HashMap<String, Contact>,
    /// Conversation JID -> messages in list order
    #[serde(default)]
    pub messages: HashMap<String, Vec<Message>>,
}

impl StoreDocument {
    /// Check if the document carries nothing to merge
    pub fn is_empty(&self) -> bool {
        self.chats.is_empty() && self.contacts.is_empty() && self.messages.is_empty()
    }

    /// Total messages across conversations
    pub fn message_count(&self) -> usize {
        self.messages.values().map(Vec::len).sum()
    }
}
