//! Integration tests for event reconciliation

use std::sync::Arc;

use async_trait::async_trait;

use chat_store::types::{
    ChatUpdate, GroupMetadata, MessageDeletion, MessagePatch, MessageStatus, MessageUpdate,
    ParticipantAction,
};
use chat_store::{Chat, ChatStore, HistoryFetcher, Message, MessageKey, StoreEvent, UpsertKind};

fn ids(chats: &[Chat]) -> Vec<&str> {
    chats.iter().map(|c| c.id.as_str()).collect()
}

fn message_ids(store: &ChatStore, jid: &str) -> Vec<String> {
    store
        .messages(jid)
        .iter()
        .map(|m| m.id().to_string())
        .collect()
}

#[test]
fn test_upsert_is_idempotent() {
    let store = ChatStore::offline();
    let chats = vec![
        Chat::new("a@s.whatsapp.net").with_timestamp(10),
        Chat::new("b@s.whatsapp.net").with_timestamp(20),
    ];

    store.apply(StoreEvent::ChatsUpsert(chats.clone()));
    let once = store.chats();
    store.apply(StoreEvent::ChatsUpsert(chats));
    assert_eq!(store.chats(), once);
    assert_eq!(once.len(), 2);
}

#[test]
fn test_conversation_order() {
    let store = ChatStore::offline();
    store.apply(StoreEvent::ChatsUpsert(vec![
        Chat::new("old").with_timestamp(100),
        Chat::new("new").with_timestamp(300),
        Chat::new("archived").with_timestamp(500).archived(true),
        Chat::new("pinned").with_timestamp(1).pinned(true),
    ]));
    assert_eq!(ids(&store.chats()), vec!["pinned", "new", "old", "archived"]);

    // An update that moves the timestamp re-sorts
    store.apply(StoreEvent::ChatsUpdate(vec![ChatUpdate::new("old").timestamp(400)]));
    assert_eq!(ids(&store.chats()), vec!["pinned", "old", "new", "archived"]);

    store.apply(StoreEvent::ChatsUpdate(vec![ChatUpdate::new("pinned").pinned(false)]));
    assert_eq!(ids(&store.chats()), vec!["old", "new", "pinned", "archived"]);
}

#[test]
fn test_timestamps_beyond_32_bits_sort() {
    let store = ChatStore::offline();
    store.apply(StoreEvent::ChatsUpsert(vec![
        Chat::new("small").with_timestamp(0xFFFF_FFFF),
        Chat::new("large").with_timestamp(0x1_0000_0000),
    ]));
    assert_eq!(ids(&store.chats()), vec!["large", "small"]);
}

#[test]
fn test_unread_accumulation() {
    let store = ChatStore::offline();
    store.apply(StoreEvent::ChatsUpsert(vec![Chat::new("a").with_unread(3)]));

    store.apply(StoreEvent::ChatsUpdate(vec![ChatUpdate::new("a").unread(2)]));
    assert_eq!(store.chat("a").unwrap().unread_count, 5);

    store.apply(StoreEvent::ChatsUpdate(vec![ChatUpdate::new("a").unread(0)]));
    assert_eq!(store.chat("a").unwrap().unread_count, 0);

    store.apply(StoreEvent::ChatsUpdate(vec![ChatUpdate::new("a").unread(-1)]));
    assert_eq!(store.chat("a").unwrap().unread_count, -1);
}

#[test]
fn test_update_for_unknown_chat_is_dropped() {
    let store = ChatStore::offline();
    store.apply(StoreEvent::ChatsUpdate(vec![ChatUpdate::new("ghost").unread(4)]));
    assert!(store.chats().is_empty());
}

#[test]
fn test_message_dedup_and_order() {
    let store = ChatStore::offline();
    let jid = "1@s.whatsapp.net";
    let upsert = |id: &str, ts: u64| StoreEvent::MessagesUpsert {
        messages: vec![Message::new(MessageKey::new(jid, id), ts)],
        kind: UpsertKind::Append,
    };

    store.apply(upsert("m1", 1));
    store.apply(upsert("m2", 2));
    store.apply(upsert("m1", 1));
    assert_eq!(message_ids(&store, jid), vec!["m1", "m2"]);

    // Device-suffixed and legacy JIDs land in the same conversation
    store.apply(StoreEvent::MessagesUpsert {
        messages: vec![Message::new(MessageKey::new("1:7@c.us", "m3"), 3)],
        kind: UpsertKind::Append,
    });
    assert_eq!(message_ids(&store, jid), vec!["m1", "m2", "m3"]);
}

#[test]
fn test_message_status_never_regresses() {
    let store = ChatStore::offline();
    let key = MessageKey::new("1@s.whatsapp.net", "m1").from_me();
    store.apply(StoreEvent::MessagesUpsert {
        messages: vec![Message::new(key.clone(), 1)],
        kind: UpsertKind::Append,
    });

    let status_update = |status| {
        StoreEvent::MessagesUpdate(vec![MessageUpdate {
            key: key.clone(),
            update: MessagePatch::status(status),
        }])
    };
    store.apply(status_update(MessageStatus::Read));
    store.apply(status_update(MessageStatus::DeliveryAck));

    let stored = &store.messages("1@s.whatsapp.net")[0];
    assert_eq!(stored.status, Some(MessageStatus::Read));
}

#[test]
fn test_delete_messages() {
    let store = ChatStore::offline();
    let jid = "1@s.whatsapp.net";
    store.apply(StoreEvent::MessagesUpsert {
        messages: (1..=4)
            .map(|i| Message::new(MessageKey::new(jid, format!("m{i}")), i))
            .collect(),
        kind: UpsertKind::Append,
    });

    store.apply(StoreEvent::MessagesDelete(MessageDeletion::Keys(vec![
        MessageKey::new(jid, "m2"),
        MessageKey::new(jid, "missing"),
    ])));
    assert_eq!(message_ids(&store, jid), vec!["m1", "m3", "m4"]);

    store.apply(StoreEvent::MessagesDelete(MessageDeletion::All {
        jid: jid.to_string(),
    }));
    assert!(store.messages(jid).is_empty());
}

#[test]
fn test_event_log_lines_apply() {
    let store = ChatStore::offline();
    let lines = [
        r#"{"event":"chats.upsert","data":[{"id":"a@s.whatsapp.net","conversationTimestamp":5}]}"#,
        r#"{"event":"chats.update","data":[{"id":"a@s.whatsapp.net","unreadCount":2}]}"#,
        r#"{"event":"chats.delete","data":["a@s.whatsapp.net"]}"#,
    ];
    for line in lines {
        store.apply(StoreEvent::from_json_line(line).unwrap());
    }
    assert!(store.chats().is_empty());
}

struct GroupFetcher;

#[async_trait]
impl HistoryFetcher for GroupFetcher {
    async fn fetch_group_metadata(&self, jid: &str) -> Option<GroupMetadata> {
        Some(GroupMetadata::new(jid).with_participants(&["a", "b"]))
    }
}

#[tokio::test]
async fn test_group_participant_actions() {
    let store = ChatStore::new(Arc::new(GroupFetcher));
    let gid = "123@g.us";
    store.group_metadata(gid).await.unwrap();

    let action = |ids: &[&str], action| StoreEvent::GroupParticipantsUpdate {
        id: gid.to_string(),
        participants: ids.iter().map(|s| s.to_string()).collect(),
        action,
    };

    store.apply(action(&["c", "a"], ParticipantAction::Add));
    store.apply(action(&["c"], ParticipantAction::Promote));
    store.apply(action(&["b"], ParticipantAction::Remove));

    let group = store.groups().remove(gid).unwrap();
    let members: Vec<&str> = group.participants.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(members, vec!["a", "c"]);
    assert!(group.participant("c").unwrap().is_admin);
    assert!(!group.participant("a").unwrap().is_admin);

    store.apply(action(&["c"], ParticipantAction::Demote));
    let group = store.groups().remove(gid).unwrap();
    assert!(!group.participant("c").unwrap().is_admin);
}

#[tokio::test]
async fn test_notify_batch_opens_one_chat_per_conversation() {
    let store = ChatStore::offline();
    let mut rx = store.subscribe();

    store.apply(StoreEvent::MessagesUpsert {
        messages: vec![
            Message::new(MessageKey::new("1@s.whatsapp.net", "m1"), 10),
            Message::new(MessageKey::new("1@s.whatsapp.net", "m2"), 30),
            Message::new(MessageKey::new("2@s.whatsapp.net", "m3"), 20),
        ],
        kind: UpsertKind::Notify,
    });

    let chat = store.chat("1@s.whatsapp.net").unwrap();
    assert_eq!(chat.unread_count, 1);
    assert_eq!(chat.conversation_timestamp, 30);
    assert!(store.chat("2@s.whatsapp.net").is_some());
    assert!(store.message_info("m1").is_some());

    let notice = rx.recv().await.unwrap();
    match notice.event {
        StoreEvent::ChatsUpsert(chats) => assert_eq!(chats.len(), 2),
        other => panic!("unexpected event {other}"),
    }
}
