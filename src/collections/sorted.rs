//! Keyed collection kept in derived sort order

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use crate::types::Sorted;

/// Collection keyed by [`Keyed::key`](crate::types::Keyed::key) and iterated
/// in ascending [`Sorted::sort_key`] order.
///
/// The sort key is recomputed on every mutation, so callers never maintain it.
/// Operations on unknown keys are silent no-ops.
pub struct SortedCollection<T: Sorted> {
    items: HashMap<String, T>,
    order: BTreeSet<(T::SortKey, String)>,
}

impl<T: Sorted> SortedCollection<T> {
    /// Create an empty collection
    pub fn new() -> Self {
        Self {
            items: HashMap::new(),
            order: BTreeSet::new(),
        }
    }

    /// Number of items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the collection holds no items
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Check if an item with `id` is present
    pub fn contains(&self, id: &str) -> bool {
        self.items.contains_key(id)
    }

    /// Get an item by key
    pub fn get(&self, id: &str) -> Option<&T> {
        self.items.get(id)
    }

    /// Insert only items whose key is not present yet; returns how many went in
    pub fn insert_if_absent<I: IntoIterator<Item = T>>(&mut self, items: I) -> usize {
        let mut inserted = 0;
        for item in items {
            if !self.items.contains_key(item.key()) {
                self.insert_new(item);
                inserted += 1;
            }
        }
        inserted
    }

    /// Insert or fully replace; returns how many keys were new
    pub fn upsert<I: IntoIterator<Item = T>>(&mut self, items: I) -> usize {
        let mut created = 0;
        for item in items {
            if self.remove_entry(item.key()).is_none() {
                created += 1;
            }
            self.insert_new(item);
        }
        created
    }

    /// Mutate an item in place and re-position it.
    ///
    /// The mutator must not change the item's key. Returns whether `id` existed.
    pub fn update<F: FnOnce(&mut T)>(&mut self, id: &str, mutator: F) -> bool {
        let Some(item) = self.items.get_mut(id) else {
            return false;
        };
        let before = item.sort_key();
        mutator(item);
        debug_assert_eq!(item.key(), id, "mutator changed the item key");
        let after = item.sort_key();

        if before != after {
            self.order.remove(&(before, id.to_string()));
            self.order.insert((after, id.to_string()));
        }
        true
    }

    /// Remove an item by key, returning it
    pub fn delete(&mut self, id: &str) -> Option<T> {
        self.remove_entry(id)
    }

    /// Remove every item
    pub fn clear(&mut self) {
        self.items.clear();
        self.order.clear();
    }

    /// Items in sort order
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + '_ {
        self.order.iter().filter_map(|(_, id)| self.items.get(id))
    }

    /// Keys in collection order
    pub fn ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.order.iter().map(|(_, id)| id.as_str())
    }

    /// Clone the items in collection order
    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.iter().cloned().collect()
    }

    fn insert_new(&mut self, item: T) {
        let id = item.key().to_string();
        self.order.insert((item.sort_key(), id.clone()));
        self.items.insert(id, item);
    }

    fn remove_entry(&mut self, id: &str) -> Option<T> {
        let item = self.items.remove(id)?;
        self.order.remove(&(item.sort_key(), id.to_string()));
        Some(item)
    }
}

impl<T: Sorted> Default for SortedCollection<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Sorted + Clone> Clone for SortedCollection<T> {
    fn clone(&self) -> Self {
        Self {
            items: self.items.clone(),
            order: self.order.clone(),
        }
    }
}

impl<T: Sorted + fmt::Debug> fmt::Debug for SortedCollection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}
