//! Store events
//!
//! Every change the store accepts arrives as one [`StoreEvent`]. The set is
//! closed: the reconciler matches on it exhaustively, so adding a variant is a
//! compile error until it has a handler.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{
    Chat, ChatUpdate, ConnectionState, Contact, GroupMetadataUpdate, Message, MessageInfoUpdate,
    MessageKey, MessageUpdate, ParticipantAction, PresenceData,
};

/// How a batch of upserted messages reached the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpsertKind {
    /// Sent from this device or synced from another of the user's devices
    Append,
    /// New incoming message the user should be told about
    Notify,
    /// Anything else; accepted and ignored
    #[serde(other)]
    Other,
}

/// Target of a `messages.delete` event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MessageDeletion {
    /// Specific messages, possibly spread over several conversations
    Keys(Vec<MessageKey>),
    /// Every message of one conversation
    All { jid: String },
}

/// Event kinds consumed by the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum StoreEvent {
    #[serde(rename = "connection.update")]
    ConnectionUpdate(ConnectionState),

    #[serde(rename = "chats.set")]
    ChatsSet {
        chats: Vec<Chat>,
        #[serde(rename = "isLatest", default)]
        is_latest: bool,
    },

    #[serde(rename = "contacts.set")]
    ContactsSet { contacts: Vec<Contact> },

    #[serde(rename = "messages.set")]
    MessagesSet {
        messages: Vec<Message>,
        #[serde(rename = "isLatest", default)]
        is_latest: bool,
    },

    #[serde(rename = "contacts.update")]
    ContactsUpdate(Vec<Contact>),

    #[serde(rename = "chats.upsert")]
    ChatsUpsert(Vec<Chat>),

    #[serde(rename = "chats.update")]
    ChatsUpdate(Vec<ChatUpdate>),

    #[serde(rename = "presence.update")]
    PresenceUpdate {
        id: String,
        presences: HashMap<String, PresenceData>,
    },

    #[serde(rename = "chats.delete")]
    ChatsDelete(Vec<String>),

    #[serde(rename = "messages.upsert")]
    MessagesUpsert {
        messages: Vec<Message>,
        #[serde(rename = "type")]
        kind: UpsertKind,
    },

    #[serde(rename = "messages.update")]
    MessagesUpdate(Vec<MessageUpdate>),

    #[serde(rename = "messages.delete")]
    MessagesDelete(MessageDeletion),

    #[serde(rename = "groups.update")]
    GroupsUpdate(Vec<GroupMetadataUpdate>),

    #[serde(rename = "group-participants.update")]
    GroupParticipantsUpdate {
        id: String,
        participants: Vec<String>,
        action: ParticipantAction,
    },

    #[serde(rename = "message-info.update")]
    MessageInfoUpdate(Vec<MessageInfoUpdate>),
}

impl StoreEvent {
    /// Wire name of the event, used in diagnostics
    pub fn name(&self) -> &'static str {
        match self {
            StoreEvent::ConnectionUpdate(_) => "connection.update",
            StoreEvent::ChatsSet { .. } => "chats.set",
            StoreEvent::ContactsSet { .. } => "contacts.set",
            StoreEvent::MessagesSet { .. } => "messages.set",
            StoreEvent::ContactsUpdate(_) => "contacts.update",
            StoreEvent::ChatsUpsert(_) => "chats.upsert",
            StoreEvent::ChatsUpdate(_) => "chats.update",
            StoreEvent::PresenceUpdate { .. } => "presence.update",
            StoreEvent::ChatsDelete(_) => "chats.delete",
            StoreEvent::MessagesUpsert { .. } => "messages.upsert",
            StoreEvent::MessagesUpdate(_) => "messages.update",
            StoreEvent::MessagesDelete(_) => "messages.delete",
            StoreEvent::GroupsUpdate(_) => "groups.update",
            StoreEvent::GroupParticipantsUpdate { .. } => "group-participants.update",
            StoreEvent::MessageInfoUpdate(_) => "message-info.update",
        }
    }

    /// Parse one line of a JSONL event log
    pub fn from_json_line(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }

    /// Serialize as one JSONL line
    pub fn to_json_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl std::fmt::Display for StoreEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
