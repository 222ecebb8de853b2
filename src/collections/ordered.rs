//! Insertion-ordered list keyed by item id

use std::collections::{vec_deque, HashSet, VecDeque};

use crate::types::{Keyed, Message, MessagePatch};

/// Where a brand-new item goes in an [`OrderedList`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertMode {
    /// Oldest end, used for history
    Prepend,
    /// Newest end, used for live traffic
    Append,
}

/// Items in logical arrival order, unique by key.
///
/// Re-upserting a known key replaces the item where it already sits; only new
/// keys are placed according to [`InsertMode`].
#[derive(Debug, Clone)]
pub struct OrderedList<T: Keyed> {
    items: VecDeque<T>,
    ids: HashSet<String>,
}

impl<T: Keyed> OrderedList<T> {
    /// Create an empty list
    pub fn new() -> Self {
        Self {
            items: VecDeque::new(),
            ids: HashSet::new(),
        }
    }

    /// Number of items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the list holds no items
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Check if an item with `id` is present
    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Index of the item with `id`
    pub fn position(&self, id: &str) -> Option<usize> {
        if !self.ids.contains(id) {
            return None;
        }
        self.items.iter().position(|item| item.key() == id)
    }

    /// Get an item by key
    pub fn get(&self, id: &str) -> Option<&T> {
        self.position(id).map(|pos| &self.items[pos])
    }

    /// Oldest item
    pub fn first(&self) -> Option<&T> {
        self.items.front()
    }

    /// Newest item
    pub fn last(&self) -> Option<&T> {
        self.items.back()
    }

    /// Insert or replace in place; returns true when the key was new
    pub fn upsert(&mut self, item: T, mode: InsertMode) -> bool {
        if let Some(pos) = self.position(item.key()) {
            self.items[pos] = item;
            return false;
        }
        self.ids.insert(item.key().to_string());
        match mode {
            InsertMode::Prepend => self.items.push_front(item),
            InsertMode::Append => self.items.push_back(item),
        }
        true
    }

    /// Mutate the item with `id` in place; returns whether it existed
    pub fn update_with<F: FnOnce(&mut T)>(&mut self, id: &str, mutator: F) -> bool {
        match self.position(id) {
            Some(pos) => {
                mutator(&mut self.items[pos]);
                true
            }
            None => false,
        }
    }

    /// Keep only items matching `keep`, in their original order.
    /// Returns the number removed.
    pub fn retain<F: FnMut(&T) -> bool>(&mut self, mut keep: F) -> usize {
        let before = self.items.len();
        let ids = &mut self.ids;
        self.items.retain(|item| {
            let kept = keep(item);
            if !kept {
                ids.remove(item.key());
            }
            kept
        });
        before - self.items.len()
    }

    /// Remove every item
    pub fn clear(&mut self) {
        self.items.clear();
        self.ids.clear();
    }

    /// Iterate front to back
    pub fn iter(&self) -> vec_deque::Iter<'_, T> {
        self.items.iter()
    }

    /// Items strictly before `id`, or the whole list when `id` is `None`.
    /// Returns `None` when `id` is not in the list.
    pub fn before(&self, id: Option<&str>) -> Option<vec_deque::Iter<'_, T>> {
        match id {
            None => Some(self.items.iter()),
            Some(id) => self.position(id).map(|pos| self.items.range(..pos)),
        }
    }

    /// Insert `items`, in order, directly before `anchor`.
    ///
    /// When the anchor is `None` or no longer present the items go to the
    /// front. Keys already in the list are replaced in place and do not move.
    /// Returns the number of new keys.
    pub fn splice_before(&mut self, anchor: Option<&str>, items: Vec<T>) -> usize {
        let mut at = anchor.and_then(|id| self.position(id)).unwrap_or(0);
        let mut inserted = 0;
        for item in items {
            if let Some(pos) = self.position(item.key()) {
                self.items[pos] = item;
                continue;
            }
            self.ids.insert(item.key().to_string());
            self.items.insert(at, item);
            at += 1;
            inserted += 1;
        }
        inserted
    }

    /// Clone the items in list order
    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.items.iter().cloned().collect()
    }
}

impl OrderedList<Message> {
    /// Merge a partial update into the message with `id`
    pub fn update_assign(&mut self, id: &str, patch: &MessagePatch) -> bool {
        self.update_with(id, |msg| msg.merge(patch))
    }
}

impl<T: Keyed> Default for OrderedList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Keyed> FromIterator<T> for OrderedList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut list = Self::new();
        for item in iter {
            list.upsert(item, InsertMode::Append);
        }
        list
    }
}
