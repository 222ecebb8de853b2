//! Presence types

use serde::{Deserialize, Serialize};

/// Presence as reported by a participant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresenceKind {
    Unavailable,
    Available,
    Composing,
    Recording,
    Paused,
}

/// Latest presence of one participant in one conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceData {
    #[serde(rename = "lastKnownPresence")]
    pub last_known_presence: PresenceKind,
    #[serde(rename = "lastSeen", default, skip_serializing_if = "Option::is_none")]
    pub last_seen: Option<u64>,
}

impl PresenceData {
    /// Presence without a last-seen time
    pub fn new(kind: PresenceKind) -> Self {
        Self {
            last_known_presence: kind,
            last_seen: None,
        }
    }
}
