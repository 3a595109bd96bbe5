//! Favorites list mirrored to a `KvStore` slot

use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::Result;
use crate::model::CatRecord;
use crate::storage::KvStore;

/// Slot holding the serialized favorites array
pub const FAVORITES_KEY: &str = "favorites";

/// User-curated list of cat records.
///
/// Insertion order is preserved and duplicates are allowed. Every mutation
/// rewrites the whole list into the backing slot before returning.
pub struct Favorites {
    store: Arc<KvStore>,
    items: RwLock<Vec<CatRecord>>,
}

impl Favorites {
    /// Load the favorites list from the store.
    ///
    /// A missing or unreadable slot starts an empty list.
    pub fn open(store: Arc<KvStore>) -> Self {
        let items: Vec<CatRecord> = store.get(FAVORITES_KEY).unwrap_or_default();
        Self {
            store,
            items: RwLock::new(items),
        }
    }

    /// Append a record and persist the list
    pub fn add(&self, record: CatRecord) -> Result<()> {
        let mut items = self.items.write();
        items.push(record);
        self.store.set(FAVORITES_KEY, &*items)
    }

    /// Remove every entry structurally equal to `record` and persist the list
    ///
    /// # Returns
    /// * `Result<usize>` - Number of entries removed
    pub fn remove(&self, record: &CatRecord) -> Result<usize> {
        let mut items = self.items.write();
        let before = items.len();
        items.retain(|r| r != record);
        let removed = before - items.len();
        self.store.set(FAVORITES_KEY, &*items)?;
        Ok(removed)
    }

    /// Add `record` unless its id is already a favorite, otherwise remove it
    ///
    /// # Returns
    /// * `Result<bool>` - Whether the id is a favorite afterwards
    pub fn toggle(&self, record: CatRecord) -> Result<bool> {
        let mut items = self.items.write();
        let now = if items.iter().any(|r| r.id == record.id) {
            items.retain(|r| *r != record);
            items.iter().any(|r| r.id == record.id)
        } else {
            items.push(record);
            true
        };
        self.store.set(FAVORITES_KEY, &*items)?;
        Ok(now)
    }

    /// Check whether any favorite has the given id
    pub fn contains_id(&self, id: &str) -> bool {
        self.items.read().iter().any(|r| r.id == id)
    }

    /// Find the first favorite with the given id
    pub fn find(&self, id: &str) -> Option<CatRecord> {
        self.items.read().iter().find(|r| r.id == id).cloned()
    }

    /// Replace the in-memory list with what the store holds
    pub fn reload(&self) {
        let items: Vec<CatRecord> = self.store.get(FAVORITES_KEY).unwrap_or_default();
        *self.items.write() = items;
    }

    /// Snapshot of the list in insertion order
    pub fn list(&self) -> Vec<CatRecord> {
        self.items.read().clone()
    }

    /// Number of entries, duplicates included
    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    /// Check if the list is empty
    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }
}
