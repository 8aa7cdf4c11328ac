//! The item store: the ordered to-do list and every operation on it.
//!
//! [`ItemStore`] owns the list for one session. Mutations run synchronously
//! and, when they actually change something, hand a snapshot to the
//! write-through worker without waiting for it. Invalid input (empty text,
//! unknown key, out-of-range position) is a silent no-op: nothing changes and
//! nothing is written. Storage failures are logged and never surface here.

use crate::gateway::{DEFAULT_STORAGE_KEY, Gateway};
use crate::model::{Item, ItemCounts, ItemKey, KeyAllocator, SortDirection};
use crate::query::{self, ItemQuery};
use crate::writer::{WriteReport, WriteThrough};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// In-memory to-do list mirrored to a [`Gateway`].
#[derive(Debug)]
pub struct ItemStore {
    items: Vec<Item>,
    sort: Option<SortDirection>,
    keys: KeyAllocator,
    gateway: Arc<dyn Gateway>,
    storage_key: String,
    writer: WriteThrough,
}

impl ItemStore {
    /// An empty store writing to the default `TODO_LIST` slot.
    ///
    /// Must be called inside a tokio runtime; the write-through worker is
    /// spawned here.
    #[must_use]
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self::with_key(gateway, DEFAULT_STORAGE_KEY)
    }

    /// An empty store writing to `storage_key`.
    #[must_use]
    pub fn with_key(gateway: Arc<dyn Gateway>, storage_key: impl Into<String>) -> Self {
        let storage_key = storage_key.into();
        let writer = WriteThrough::spawn(Arc::clone(&gateway), storage_key.clone());
        Self {
            items: Vec::new(),
            sort: None,
            keys: KeyAllocator::new(),
            gateway,
            storage_key,
            writer,
        }
    }

    /// Create a store for `storage_key` and [`load`](Self::load) it.
    pub async fn open(gateway: Arc<dyn Gateway>, storage_key: impl Into<String>) -> Self {
        let mut store = Self::with_key(gateway, storage_key);
        store.load().await;
        store
    }

    /// Replace the in-memory list with the persisted one.
    ///
    /// A missing slot or a failed read leaves the store empty; failures are
    /// logged, never returned. Duplicate keys in the loaded data are re-keyed
    /// and the repaired list is written back.
    pub async fn load(&mut self) {
        let loaded = match self.gateway.get(&self.storage_key).await {
            Ok(Some(items)) => items,
            Ok(None) => {
                debug!(key = %self.storage_key, "no persisted list; starting empty");
                Vec::new()
            }
            Err(err) => {
                warn!(
                    key = %self.storage_key,
                    code = %err.code(),
                    error = %err,
                    "failed to load persisted list; starting empty"
                );
                Vec::new()
            }
        };

        self.items = loaded;
        self.keys.observe(self.items.iter().map(|item| &item.key));
        let repaired = repair_duplicate_keys(&mut self.items, &mut self.keys);
        info!(
            key = %self.storage_key,
            items = self.items.len(),
            repaired,
            "loaded item list"
        );
        if repaired > 0 {
            warn!(repaired, "re-keyed items with duplicate keys");
            self.persist();
        }
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    /// Insert a new unchecked item at the head of the list.
    ///
    /// Returns the new key, or `None` when `text` is empty or whitespace.
    pub fn add(&mut self, text: impl Into<String>) -> Option<ItemKey> {
        let text = text.into();
        if text.trim().is_empty() {
            debug!("ignoring add with empty text");
            return None;
        }
        let key = self.keys.allocate(self.items.iter().map(|item| &item.key));
        self.items.insert(0, Item::new(key, text));
        debug!(%key, "added item");
        self.persist();
        Some(key)
    }

    /// Remove the item with `key`. Returns `false` if no such item exists.
    pub fn remove(&mut self, key: ItemKey) -> bool {
        let Some(index) = self.position(key) else {
            debug!(%key, "ignoring remove of unknown key");
            return false;
        };
        self.items.remove(index);
        debug!(%key, index, "removed item");
        self.persist();
        true
    }

    /// Replace the text of the item with `key`, keeping its position and flag.
    ///
    /// Returns `false` for an unknown key or empty replacement text.
    pub fn edit_text(&mut self, key: ItemKey, new_text: impl Into<String>) -> bool {
        let new_text = new_text.into();
        if new_text.trim().is_empty() {
            debug!(%key, "ignoring edit with empty text");
            return false;
        }
        let Some(item) = self.items.iter_mut().find(|item| item.key == key) else {
            debug!(%key, "ignoring edit of unknown key");
            return false;
        };
        item.text = new_text;
        debug!(%key, "edited item text");
        self.persist();
        true
    }

    /// Set the completion flag of the item with `key`.
    ///
    /// Returns `false` for an unknown key.
    pub fn toggle_checked(&mut self, key: ItemKey, checked: bool) -> bool {
        let Some(item) = self.items.iter_mut().find(|item| item.key == key) else {
            debug!(%key, "ignoring toggle of unknown key");
            return false;
        };
        item.checked = checked;
        debug!(%key, checked, "set completion flag");
        self.persist();
        true
    }

    /// Move the item at `from` to `to`, shifting the items in between.
    ///
    /// Returns `false` (and changes nothing) when either index is out of
    /// range or the two are equal.
    pub fn reorder(&mut self, from: usize, to: usize) -> bool {
        let len = self.items.len();
        if from >= len || to >= len {
            debug!(from, to, len, "ignoring reorder with out-of-range index");
            return false;
        }
        if from == to {
            return false;
        }
        let item = self.items.remove(from);
        self.items.insert(to, item);
        debug!(from, to, "reordered item");
        self.persist();
        true
    }

    /// Advance the sort direction and sort the whole list by text.
    ///
    /// The sort is stable and byte-wise: no case folding, no locale. The
    /// sorted order replaces the manual order and is persisted.
    pub fn toggle_sort(&mut self) -> SortDirection {
        let direction = SortDirection::next(self.sort);
        self.sort = Some(direction);
        match direction {
            SortDirection::Ascending => self.items.sort_by(|a, b| a.text.cmp(&b.text)),
            SortDirection::Descending => self.items.sort_by(|a, b| b.text.cmp(&a.text)),
        }
        debug!(%direction, items = self.items.len(), "sorted item list");
        self.persist();
        direction
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// The full list in its current order.
    #[must_use]
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Items whose text contains `keyword` (case-sensitive), in list order.
    #[must_use]
    pub fn filter_by_keyword(&self, keyword: &str) -> Vec<&Item> {
        query::filter_by_keyword(&self.items, keyword)
    }

    /// Items matching `query`, in list order.
    #[must_use]
    pub fn query(&self, query: &ItemQuery) -> Vec<&Item> {
        let matches = query.matcher();
        self.items.iter().filter(|item| matches(item)).collect()
    }

    #[must_use]
    pub fn get(&self, key: ItemKey) -> Option<&Item> {
        self.items.iter().find(|item| item.key == key)
    }

    /// Index of the item with `key`.
    #[must_use]
    pub fn position(&self, key: ItemKey) -> Option<usize> {
        self.items.iter().position(|item| item.key == key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn counts(&self) -> ItemCounts {
        let completed = self.items.iter().filter(|item| item.checked).count();
        ItemCounts {
            total: self.items.len(),
            completed,
            pending: self.items.len() - completed,
        }
    }

    /// Direction of the last sort, or `None` if the list was never sorted.
    #[must_use]
    pub const fn sort_direction(&self) -> Option<SortDirection> {
        self.sort
    }

    #[must_use]
    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Wait until the last mutation has been handed to the gateway.
    pub async fn flush(&self) {
        self.writer.flush().await;
    }

    /// Write counters so far.
    #[must_use]
    pub fn write_report(&self) -> WriteReport {
        self.writer.report()
    }

    /// Flush pending writes, stop the worker, and report how writes went.
    pub async fn close(self) -> WriteReport {
        let report = self.writer.close().await;
        info!(
            key = %self.storage_key,
            attempted = report.attempted,
            failed = report.failed,
            "closed item store"
        );
        report
    }

    fn persist(&mut self) {
        self.writer.publish(&self.items);
    }
}

/// Give every item whose key was already seen earlier in the list a fresh
/// key. Returns how many items were re-keyed.
fn repair_duplicate_keys(items: &mut [Item], keys: &mut KeyAllocator) -> usize {
    let mut taken: HashSet<ItemKey> = items.iter().map(|item| item.key).collect();
    let mut seen = HashSet::with_capacity(items.len());
    let mut repaired = 0;
    for item in items.iter_mut() {
        if !seen.insert(item.key) {
            let fresh = keys.allocate(taken.iter());
            warn!(old = %item.key, new = %fresh, "duplicate item key");
            item.key = fresh;
            taken.insert(fresh);
            seen.insert(fresh);
            repaired += 1;
        }
    }
    repaired
}
