//! Collections backing the store
//!
//! - `SortedCollection`: keyed, kept in a derived sort order (conversations)
//! - `OrderedList`: keyed, kept in arrival order (one per conversation's messages)

mod ordered;
mod sorted;

pub use ordered::{InsertMode, OrderedList};
pub use sorted::SortedCollection;
