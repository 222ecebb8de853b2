//! Chat Store
//!
//! An in-memory, event-sourced store for messaging clients. The store keeps
//! conversations, contacts, messages, group metadata, presence and receipts
//! consistent with a live event stream, and serves message history from cache
//! before falling back to a remote fetcher.
//!
//! # Features
//!
//! - **Event reconciliation**: Idempotent handlers for every connection event
//! - **Ordered collections**: Conversations sorted pinned-first then newest
//! - **History pagination**: Only the cache shortfall is fetched, then kept
//! - **Snapshots**: JSON export and additive import, atomic file writes
//! - **Notifications**: Derived events broadcast to subscribers
//!
//! # Modules
//!
//! - `types`: Domain records and the `StoreEvent` wire format
//! - `collections`: Keyed sorted collection and ordered item list
//! - `store`: The `ChatStore` aggregate, reconciliation, pagination, snapshots
//! - `fetch`: The `HistoryFetcher` collaborator seam
//! - `config`, `logging`, `error`: Ambient setup
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use chat_store::{ChatStore, NoopFetcher, StoreEvent};
//! use chat_store::types::Chat;
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = Arc::new(ChatStore::new(Arc::new(NoopFetcher)));
//!     store.apply(StoreEvent::ChatsUpsert(vec![Chat::new("1@s.whatsapp.net")]));
//!     let page = store.load_messages("1@s.whatsapp.net", 20, None).await;
//!     println!("{} chats, {} messages", store.chats().len(), page.len());
//! }
//! ```

pub mod collections;
pub mod config;
pub mod error;
pub mod fetch;
pub mod logging;
pub mod store;
pub mod types;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::StoreConfig;
pub use error::{StoreError, StoreResult};
pub use fetch::{HistoryFetcher, NoopFetcher};
pub use store::{Binding, ChatStore, EventBroadcaster, StoreNotice, StoreState};
pub use types::{
    Chat, ChatUpdate, Contact, GroupMetadata, Message, MessageCursor, MessageKey, StoreDocument,
    StoreEvent, UpsertKind,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
