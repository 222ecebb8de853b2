//! Data types for the chat store
//!
//! This module contains the entities the store reconciles, the events that
//! mutate them, and the persisted document shape.

mod chat;
mod connection;
mod contact;
mod event;
mod group;
pub mod jid;
mod message;
mod presence;
mod receipt;
mod snapshot;

pub use chat::{Chat, ChatSortKey, ChatUpdate};
pub use connection::{ConnectionState, ConnectionStatus, LastDisconnect};
pub use contact::{Contact, ProfileImage};
pub use event::{MessageDeletion, StoreEvent, UpsertKind};
pub use group::{GroupMetadata, GroupMetadataUpdate, GroupParticipant, ParticipantAction};
pub use message::{Message, MessageCursor, MessageKey, MessagePatch, MessageStatus, MessageUpdate};
pub use presence::{PresenceData, PresenceKind};
pub use receipt::{MessageInfo, MessageInfoPatch, MessageInfoUpdate};
pub use snapshot::StoreDocument;

/// An item with a unique string key inside its collection
pub trait Keyed {
    fn key(&self) -> &str;
}

/// An item whose position in a sorted collection is derived from its fields
pub trait Sorted: Keyed {
    /// Ascending order of this key is iteration order
    type SortKey: Ord + Clone;

    fn sort_key(&self) -> Self::SortKey;
}

/// Check if flag is unset (for skip_serializing_if)
pub fn is_false(val: &bool) -> bool {
    !*val
}

/// Check if value is zero (for skip_serializing_if)
pub fn is_zero(val: &u64) -> bool {
    *val == 0
}
