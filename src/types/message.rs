//! Message types and their merge rules

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{is_false, is_zero, Keyed};

/// Identity of a message: conversation JID plus message id
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageKey {
    #[serde(rename = "remoteJid")]
    pub remote_jid: String,
    #[serde(rename = "fromMe", default, skip_serializing_if = "is_false")]
    pub from_me: bool,
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub participant: Option<String>,
}

impl MessageKey {
    /// Key of a message received in `remote_jid`
    pub fn new(remote_jid: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            remote_jid: remote_jid.into(),
            from_me: false,
            id: id.into(),
            participant: None,
        }
    }

    /// Mark the message as sent by this account
    pub fn from_me(mut self) -> Self {
        self.from_me = true;
        self
    }
}

/// Delivery status, ordered by progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageStatus {
    Error,
    Pending,
    ServerAck,
    DeliveryAck,
    Read,
    Played,
}

/// A message as held in a conversation's list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub key: MessageKey,
    #[serde(rename = "messageTimestamp", default, skip_serializing_if = "is_zero")]
    pub message_timestamp: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<MessageStatus>,
    #[serde(rename = "pushName", default, skip_serializing_if = "Option::is_none")]
    pub push_name: Option<String>,
    /// Participant JID -> receipt timestamp
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub receipts: HashMap<String, u64>,
    /// Message content and any other fields, kept opaquely
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Message {
    /// Create a message without content
    pub fn new(key: MessageKey, timestamp: u64) -> Self {
        Self {
            key,
            message_timestamp: timestamp,
            status: None,
            push_name: None,
            receipts: HashMap::new(),
            extra: Map::new(),
        }
    }

    /// Convenience constructor carrying a plain text body
    pub fn text(key: MessageKey, timestamp: u64, body: impl Into<String>) -> Self {
        let mut msg = Self::new(key, timestamp);
        msg.extra.insert(
            "message".to_string(),
            serde_json::json!({ "conversation": body.into() }),
        );
        msg
    }

    /// Message id from the key
    pub fn id(&self) -> &str {
        &self.key.id
    }

    /// Merge a partial update into this message.
    ///
    /// Status only moves forward. Receipts merge per participant. Opaque
    /// fields holding objects on both sides merge one level deep.
    pub fn merge(&mut self, patch: &MessagePatch) {
        if let Some(status) = patch.status {
            if self.status.map_or(true, |current| status > current) {
                self.status = Some(status);
            }
        }
        if let Some(ts) = patch.message_timestamp {
            self.message_timestamp = ts;
        }
        if let Some(name) = &patch.push_name {
            self.push_name = Some(name.clone());
        }
        if let Some(receipts) = &patch.receipts {
            for (participant, ts) in receipts {
                self.receipts.insert(participant.clone(), *ts);
            }
        }
        for (k, v) in &patch.extra {
            match (self.extra.get_mut(k), v) {
                (Some(Value::Object(existing)), Value::Object(incoming)) => {
                    for (ik, iv) in incoming {
                        existing.insert(ik.clone(), iv.clone());
                    }
                }
                _ => {
                    self.extra.insert(k.clone(), v.clone());
                }
            }
        }
    }
}

impl Keyed for Message {
    fn key(&self) -> &str {
        &self.key.id
    }
}

/// Partial message content for `messages.update`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessagePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<MessageStatus>,
    #[serde(rename = "messageTimestamp", default, skip_serializing_if = "Option::is_none")]
    pub message_timestamp: Option<u64>,
    #[serde(rename = "pushName", default, skip_serializing_if = "Option::is_none")]
    pub push_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipts: Option<HashMap<String, u64>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MessagePatch {
    /// Patch carrying only a status
    pub fn status(status: MessageStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }
}

/// A keyed message update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageUpdate {
    pub key: MessageKey,
    pub update: MessagePatch,
}

/// Pagination cursor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MessageCursor {
    Before(MessageKey),
    After(MessageKey),
}

impl MessageCursor {
    /// Key the cursor points at
    pub fn key(&self) -> &MessageKey {
        match self {
            MessageCursor::Before(key) | MessageCursor::After(key) => key,
        }
    }
}
