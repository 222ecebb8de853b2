//! Group metadata types

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{is_false, Keyed};

/// A group member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupParticipant {
    pub id: String,
    #[serde(rename = "isAdmin", default, skip_serializing_if = "is_false")]
    pub is_admin: bool,
    #[serde(rename = "isSuperAdmin", default, skip_serializing_if = "is_false")]
    pub is_super_admin: bool,
}

impl GroupParticipant {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            is_admin: false,
            is_super_admin: false,
        }
    }
}

/// Participant change requested by `group-participants.update`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticipantAction {
    Add,
    Remove,
    Promote,
    Demote,
}

/// Group (or broadcast list) metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupMetadata {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation: Option<u64>,
    #[serde(default)]
    pub participants: Vec<GroupParticipant>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl GroupMetadata {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// Set plain (non-admin) participants
    pub fn with_participants(mut self, ids: &[&str]) -> Self {
        self.participants = ids.iter().map(|id| GroupParticipant::new(*id)).collect();
        self
    }

    /// Find a participant by JID
    pub fn participant(&self, id: &str) -> Option<&GroupParticipant> {
        self.participants.iter().find(|p| p.id == id)
    }

    /// Merge an update: present fields overwrite
    pub fn merge(&mut self, update: &GroupMetadataUpdate) {
        if let Some(subject) = &update.subject {
            self.subject = Some(subject.clone());
        }
        if let Some(owner) = &update.owner {
            self.owner = Some(owner.clone());
        }
        if let Some(desc) = &update.desc {
            self.desc = Some(desc.clone());
        }
        if let Some(creation) = update.creation {
            self.creation = Some(creation);
        }
        if let Some(participants) = &update.participants {
            self.participants = participants.clone();
        }
        for (k, v) in &update.extra {
            self.extra.insert(k.clone(), v.clone());
        }
    }

    /// Apply a participant action. Added members start without admin rights;
    /// ids already in the group are not added twice.
    pub fn apply_participants(&mut self, ids: &[String], action: ParticipantAction) {
        match action {
            ParticipantAction::Add => {
                let mut known: HashSet<String> =
                    self.participants.iter().map(|p| p.id.clone()).collect();
                for id in ids {
                    if known.insert(id.clone()) {
                        self.participants.push(GroupParticipant::new(id.clone()));
                    }
                }
            }
            ParticipantAction::Remove => {
                let gone: HashSet<&str> = ids.iter().map(String::as_str).collect();
                self.participants.retain(|p| !gone.contains(p.id.as_str()));
            }
            ParticipantAction::Promote | ParticipantAction::Demote => {
                let targets: HashSet<&str> = ids.iter().map(String::as_str).collect();
                let admin = action == ParticipantAction::Promote;
                for p in self
                    .participants
                    .iter_mut()
                    .filter(|p| targets.contains(p.id.as_str()))
                {
                    p.is_admin = admin;
                }
            }
        }
    }
}

impl Keyed for GroupMetadata {
    fn key(&self) -> &str {
        &self.id
    }
}

/// Partial group metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupMetadataUpdate {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub participants: Option<Vec<GroupParticipant>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
