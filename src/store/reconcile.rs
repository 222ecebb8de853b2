//! Event reconciliation
//!
//! One handler per [`StoreEvent`] variant. Handlers only mutate the state they
//! are given and return the events they derive; references to unknown
//! entities on update-only events are logged and skipped.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::collections::InsertMode;
use crate::types::jid::normalize_jid;
use crate::types::{
    Chat, ChatUpdate, Contact, GroupMetadataUpdate, Message, MessageDeletion, MessageInfoUpdate,
    MessageUpdate, ParticipantAction, PresenceData, StoreEvent, UpsertKind,
};

use super::StoreState;

/// Apply `event` to `state`; returns derived events the caller must apply next
pub fn apply(state: &mut StoreState, event: StoreEvent) -> Vec<StoreEvent> {
    let mut derived = Vec::new();

    match event {
        StoreEvent::ConnectionUpdate(update) => state.connection.merge(&update),
        StoreEvent::ChatsSet { chats, is_latest } => chats_set(state, chats, is_latest),
        StoreEvent::ContactsSet { contacts } => contacts_set(state, contacts),
        StoreEvent::MessagesSet {
            messages,
            is_latest,
        } => messages_set(state, messages, is_latest),
        StoreEvent::ContactsUpdate(updates) => contacts_update(state, updates),
        StoreEvent::ChatsUpsert(chats) => {
            state.chats.upsert(chats);
        }
        StoreEvent::ChatsUpdate(updates) => chats_update(state, updates),
        StoreEvent::PresenceUpdate { id, presences } => presence_update(state, id, presences),
        StoreEvent::ChatsDelete(ids) => {
            for id in ids {
                state.chats.delete(&id);
            }
        }
        StoreEvent::MessagesUpsert { messages, kind } => {
            derived.extend(messages_upsert(state, messages, kind))
        }
        StoreEvent::MessagesUpdate(updates) => messages_update(state, updates),
        StoreEvent::MessagesDelete(target) => messages_delete(state, target),
        StoreEvent::GroupsUpdate(updates) => groups_update(state, updates),
        StoreEvent::GroupParticipantsUpdate {
            id,
            participants,
            action,
        } => group_participants_update(state, &id, &participants, action),
        StoreEvent::MessageInfoUpdate(updates) => message_info_update(state, updates),
    }

    derived
}

/// Catch-up sync: never clobbers conversations already known
fn chats_set(state: &mut StoreState, chats: Vec<Chat>, is_latest: bool) {
    if is_latest {
        state.chats.clear();
    }
    let inserted = state.chats.insert_if_absent(chats);
    debug!(inserted, is_latest, "synced chats");
}

/// Replace the contact set by diff: ids missing from `contacts` are removed,
/// listed ones are merged or created
pub(crate) fn contacts_set(state: &mut StoreState, contacts: Vec<Contact>) {
    let incoming: HashSet<String> = contacts.iter().map(|c| c.id.clone()).collect();
    let before = state.contacts.len();
    state.contacts.retain(|id, _| incoming.contains(id));
    let deleted = before - state.contacts.len();

    for contact in contacts {
        match state.contacts.get_mut(&contact.id) {
            Some(existing) => existing.merge(&contact),
            None => {
                state.contacts.insert(contact.id.clone(), contact);
            }
        }
    }
    debug!(deleted, total = state.contacts.len(), "synced contacts");
}

fn messages_set(state: &mut StoreState, messages: Vec<Message>, is_latest: bool) {
    if is_latest {
        for list in state.messages.values_mut() {
            list.clear();
        }
        state.lookaside.clear();
    }
    let count = messages.len();
    for msg in messages {
        let jid = normalize_jid(&msg.key.remote_jid);
        state.forget_lookaside(&jid, msg.id());
        state.message_list_mut(&jid).upsert(msg, InsertMode::Prepend);
    }
    debug!(count, is_latest, "synced messages");
}

fn contacts_update(state: &mut StoreState, updates: Vec<Contact>) {
    for update in updates {
        match state.contacts.get_mut(&update.id) {
            Some(existing) => existing.merge(&update),
            None => debug!(id = %update.id, "got update for non-existent contact"),
        }
    }
}

fn chats_update(state: &mut StoreState, updates: Vec<ChatUpdate>) {
    for update in updates {
        if !state.chats.update(&update.id, |chat| chat.merge(&update)) {
            debug!(id = %update.id, "got update for non-existent chat");
        }
    }
}

fn presence_update(state: &mut StoreState, id: String, presences: HashMap<String, PresenceData>) {
    state.presences.entry(id).or_default().extend(presences);
}

fn messages_upsert(state: &mut StoreState, messages: Vec<Message>, kind: UpsertKind) -> Vec<StoreEvent> {
    if kind == UpsertKind::Other {
        debug!(count = messages.len(), "ignoring messages upsert of unhandled kind");
        return Vec::new();
    }

    // Several messages in one batch may open the same conversation
    let mut new_chats: Vec<Chat> = Vec::new();
    for msg in messages {
        let jid = normalize_jid(&msg.key.remote_jid);
        if kind == UpsertKind::Notify {
            if !state.chats.contains(&jid) {
                match new_chats.iter_mut().find(|c| c.id == jid) {
                    Some(chat) => {
                        chat.conversation_timestamp =
                            chat.conversation_timestamp.max(msg.message_timestamp)
                    }
                    None => new_chats.push(
                        Chat::new(jid.clone())
                            .with_timestamp(msg.message_timestamp)
                            .with_unread(1),
                    ),
                }
            }
            state.message_info.entry(msg.key.id.clone()).or_default();
        }
        state.forget_lookaside(&jid, msg.id());
        state.message_list_mut(&jid).upsert(msg, InsertMode::Append);
    }

    if new_chats.is_empty() {
        Vec::new()
    } else {
        debug!(count = new_chats.len(), "creating chats for incoming messages");
        vec![StoreEvent::ChatsUpsert(new_chats)]
    }
}

fn messages_update(state: &mut StoreState, updates: Vec<MessageUpdate>) {
    for MessageUpdate { key, update } in updates {
        let jid = normalize_jid(&key.remote_jid);
        let in_list = state
            .messages
            .get_mut(&jid)
            .is_some_and(|list| list.update_assign(&key.id, &update));
        if in_list {
            continue;
        }
        // Individually fetched messages live beside the list
        if let Some(cached) = state.lookaside.get_mut(&jid).and_then(|m| m.get_mut(&key.id)) {
            cached.merge(&update);
        } else {
            debug!(jid = %jid, id = %key.id, "got update for non-existent message");
        }
    }
}

fn messages_delete(state: &mut StoreState, target: MessageDeletion) {
    match target {
        MessageDeletion::All { jid } => {
            let jid = normalize_jid(&jid);
            if let Some(list) = state.messages.get_mut(&jid) {
                list.clear();
            }
            state.lookaside.remove(&jid);
        }
        MessageDeletion::Keys(keys) => {
            let mut by_chat: HashMap<String, HashSet<String>> = HashMap::new();
            for key in keys {
                by_chat
                    .entry(normalize_jid(&key.remote_jid))
                    .or_default()
                    .insert(key.id);
            }
            for (jid, ids) in by_chat {
                if let Some(list) = state.messages.get_mut(&jid) {
                    let removed = list.retain(|m| !ids.contains(m.id()));
                    debug!(jid = %jid, removed, "deleted messages");
                }
                for id in &ids {
                    state.forget_lookaside(&jid, id);
                }
            }
        }
    }
}

fn groups_update(state: &mut StoreState, updates: Vec<GroupMetadataUpdate>) {
    for update in updates {
        match state.groups.get_mut(&update.id) {
            Some(group) => group.merge(&update),
            None => debug!(id = %update.id, "got update for non-existent group metadata"),
        }
    }
}

fn group_participants_update(
    state: &mut StoreState,
    id: &str,
    participants: &[String],
    action: ParticipantAction,
) {
    match state.groups.get_mut(id) {
        Some(group) => group.apply_participants(participants, action),
        None => debug!(id, ?action, "got participants update for unknown group"),
    }
}

fn message_info_update(state: &mut StoreState, updates: Vec<MessageInfoUpdate>) {
    for MessageInfoUpdate { key, update } in updates {
        match state.message_info.get_mut(&key.id) {
            Some(info) => info.merge(&update),
            None => debug!(id = %key.id, "got receipt info for unknown message"),
        }
    }
}
