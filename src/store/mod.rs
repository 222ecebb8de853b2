//! Chat store - the owned aggregate of all collections
//!
//! # Architecture
//!
//! ```text
//! Write Path:
//! ┌──────────────┐    ┌────────────────┐    ┌────────────────────┐
//! │ event stream │───►│ reconcile::    │───►│ derived events are │
//! │ (bind/apply) │    │ apply (locked) │    │ applied, broadcast │
//! └──────────────┘    └────────────────┘    └────────────────────┘
//!
//! Read Path:
//! ┌──────────────┐    hit    ┌──────────┐
//! │ load_* /     │──────────►│ return   │
//! │ lookups      │   miss    └──────────┘
//! │              │──────────► HistoryFetcher ──► cache ──► return
//! └──────────────┘
//! ```
//!
//! All mutation goes through one `parking_lot::Mutex`, so handlers never see a
//! half-applied change. The lock is never held across a fetch.

mod binding;
mod broadcast;
mod lookup;
mod pagination;
pub mod reconcile;
mod snapshot;

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::trace;

use crate::collections::{OrderedList, SortedCollection};
use crate::config::StoreConfig;
use crate::fetch::{HistoryFetcher, NoopFetcher};
use crate::types::{
    Chat, ConnectionState, Contact, GroupMetadata, Message, MessageInfo, PresenceData, StoreEvent,
};

pub use binding::Binding;
pub use broadcast::{EventBroadcaster, StoreNotice};

/// Every collection the store maintains
#[derive(Debug, Clone)]
pub struct StoreState {
    /// Conversations, pinned first then newest first
    pub chats: SortedCollection<Chat>,
    pub contacts: HashMap<String, Contact>,
    /// Conversation JID -> messages in arrival order
    pub messages: HashMap<String, OrderedList<Message>>,
    /// Group and broadcast list metadata by JID
    pub groups: HashMap<String, GroupMetadata>,
    /// Receipt info by message id
    pub message_info: HashMap<String, MessageInfo>,
    /// Conversation JID -> participant JID -> presence
    pub presences: HashMap<String, HashMap<String, PresenceData>>,
    pub connection: ConnectionState,
    /// Individually fetched messages whose place in history is unknown
    pub(crate) lookaside: HashMap<String, HashMap<String, Message>>,
}

impl StoreState {
    /// Create an empty state
    pub fn new() -> Self {
        Self {
            chats: SortedCollection::new(),
            contacts: HashMap::new(),
            messages: HashMap::new(),
            groups: HashMap::new(),
            message_info: HashMap::new(),
            presences: HashMap::new(),
            connection: ConnectionState::closed(),
            lookaside: HashMap::new(),
        }
    }

    /// Message list for a (normalized) JID, created empty if missing
    pub fn message_list_mut(&mut self, jid: &str) -> &mut OrderedList<Message> {
        self.messages.entry(jid.to_string()).or_default()
    }

    /// Drop the lookaside copy of a message, if any
    pub(crate) fn forget_lookaside(&mut self, jid: &str, id: &str) {
        if let Some(cached) = self.lookaside.get_mut(jid) {
            cached.remove(id);
            if cached.is_empty() {
                self.lookaside.remove(jid);
            }
        }
    }
}

impl Default for StoreState {
    fn default() -> Self {
        Self::new()
    }
}

/// In-memory chat store fed by events and backed by a [`HistoryFetcher`]
pub struct ChatStore {
    pub(crate) state: Mutex<StoreState>,
    pub(crate) fetcher: Arc<dyn HistoryFetcher>,
    broadcaster: EventBroadcaster,
    config: StoreConfig,
}

impl ChatStore {
    /// Create a store with default config and the given fetch collaborator
    pub fn new(fetcher: Arc<dyn HistoryFetcher>) -> Self {
        Self::with_config(StoreConfig::default(), fetcher)
    }

    /// Create a store with explicit config and fetch collaborator
    pub fn with_config(config: StoreConfig, fetcher: Arc<dyn HistoryFetcher>) -> Self {
        Self {
            state: Mutex::new(StoreState::new()),
            fetcher,
            broadcaster: EventBroadcaster::new(config.broadcast_capacity),
            config,
        }
    }

    /// Store that answers from cache only
    pub fn offline() -> Self {
        Self::new(Arc::new(NoopFetcher))
    }

    /// Get the store configuration
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Apply one event, then any events it derives, atomically.
    ///
    /// Derived events are published to subscribers after the lock is released.
    pub fn apply(&self, event: StoreEvent) {
        let name = event.name();
        let derived = {
            let mut state = self.state.lock();
            let mut emitted = Vec::new();
            let mut queue = VecDeque::from([event]);
            while let Some(next) = queue.pop_front() {
                for extra in reconcile::apply(&mut state, next) {
                    emitted.push(extra.clone());
                    queue.push_back(extra);
                }
            }
            emitted
        };
        trace!(event = name, derived = derived.len(), "applied event");

        for event in derived {
            self.broadcaster.broadcast(event);
        }
    }

    /// Subscribe to events the store derives while reconciling
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<StoreNotice> {
        self.broadcaster.subscribe()
    }

    /// Run `f` against a consistent view of the whole state
    pub fn read<R>(&self, f: impl FnOnce(&StoreState) -> R) -> R {
        f(&self.state.lock())
    }

    /// Conversations in display order
    pub fn chats(&self) -> Vec<Chat> {
        self.state.lock().chats.to_vec()
    }

    /// Get a conversation by id
    pub fn chat(&self, id: &str) -> Option<Chat> {
        self.state.lock().chats.get(id).cloned()
    }

    /// All contacts by id
    pub fn contacts(&self) -> HashMap<String, Contact> {
        self.state.lock().contacts.clone()
    }

    /// Get a contact by id
    pub fn contact(&self, id: &str) -> Option<Contact> {
        self.state.lock().contacts.get(id).cloned()
    }

    /// Cached messages of a conversation, oldest first
    pub fn messages(&self, jid: &str) -> Vec<Message> {
        let jid = crate::types::jid::normalize_jid(jid);
        self.state
            .lock()
            .messages
            .get(&jid)
            .map(OrderedList::to_vec)
            .unwrap_or_default()
    }

    /// All group and broadcast list metadata by JID
    pub fn groups(&self) -> HashMap<String, GroupMetadata> {
        self.state.lock().groups.clone()
    }

    /// Receipt info of a message by id
    pub fn message_info(&self, id: &str) -> Option<MessageInfo> {
        self.state.lock().message_info.get(id).cloned()
    }

    /// Participant presences in a conversation
    pub fn presences(&self, jid: &str) -> HashMap<String, PresenceData> {
        self.state
            .lock()
            .presences
            .get(jid)
            .cloned()
            .unwrap_or_default()
    }

    /// Current connection record
    pub fn connection_state(&self) -> ConnectionState {
        self.state.lock().connection.clone()
    }
}

impl Default for ChatStore {
    fn default() -> Self {
        Self::offline()
    }
}
