//! Ordered item collection and its shared, change-signalling owner

use std::ops::Range;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use bitvec::prelude::*;
use parking_lot::RwLock;
use tracing::trace;

use super::point::Item;
use super::signal::{Signal, SubscriptionId};

/// ItemSet is a plain ordered collection of items
///
/// Insertion order matters: the point-based algorithm anchors each cluster
/// on the first item that reaches it.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemSet<T> {
    items: Vec<Item<T>>,
}

impl<T> Default for ItemSet<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T> From<Vec<Item<T>>> for ItemSet<T> {
    fn from(items: Vec<Item<T>>) -> Self {
        Self { items }
    }
}

impl<T> FromIterator<Item<T>> for ItemSet<T> {
    fn from_iter<I: IntoIterator<Item = Item<T>>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl<T> ItemSet<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Item<T>> {
        self.items.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Item<T>> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[Item<T>] {
        &self.items
    }

    pub fn push(&mut self, item: Item<T>) {
        self.items.push(item);
    }

    pub fn extend<I: IntoIterator<Item = Item<T>>>(&mut self, items: I) {
        self.items.extend(items);
    }

    pub fn remove(&mut self, index: usize) -> Option<Item<T>> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }

    /// Removes every listed index in one sweep, ignoring out-of-range and
    /// repeated entries. Returns how many items were removed.
    pub fn remove_indices(&mut self, indices: &[usize]) -> usize {
        let mut doomed = bitvec![0; self.items.len()];
        for &i in indices {
            if i < doomed.len() {
                doomed.set(i, true);
            }
        }

        let removed = doomed.count_ones();
        if removed > 0 {
            let mut position = 0;
            self.items.retain(|_| {
                let keep = !doomed[position];
                position += 1;
                keep
            });
        }
        removed
    }

    pub fn retain<F: FnMut(&Item<T>) -> bool>(&mut self, keep: F) {
        self.items.retain(keep);
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Replaces `range` (clamped to the current length) with `items`.
    /// Returns `(removed, inserted)`.
    pub fn replace_range<I>(&mut self, range: Range<usize>, items: I) -> (usize, usize)
    where
        I: IntoIterator<Item = Item<T>>,
    {
        let end = range.end.min(self.items.len());
        let start = range.start.min(end);
        let before = self.items.len();
        let removed = self.items.splice(start..end, items).count();
        let inserted = self.items.len() + removed - before;
        (removed, inserted)
    }
}

impl<'a, T> IntoIterator for &'a ItemSet<T> {
    type Item = &'a Item<T>;
    type IntoIter = std::slice::Iter<'a, Item<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Event raised once per batch mutation of an [`ItemStore`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemsChanged {
    /// Monotonic revision after the mutation
    pub revision: u64,
    /// Item count after the mutation
    pub len: usize,
}

/// ItemStore owns the shared item set
///
/// Every mutating call applies its whole batch under one write lock and then
/// raises exactly one [`ItemsChanged`]; calls that change nothing raise
/// none. Readers take cheap copy-on-write snapshots, so a running pass
/// never observes a half-applied batch.
pub struct ItemStore<T> {
    items: RwLock<Arc<ItemSet<T>>>,
    revision: AtomicU64,
    changed: Signal<ItemsChanged>,
}

impl<T> Default for ItemStore<T> {
    fn default() -> Self {
        Self::from_set(ItemSet::new())
    }
}

impl<T> ItemStore<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_set(items: ItemSet<T>) -> Self {
        Self {
            items: RwLock::new(Arc::new(items)),
            revision: AtomicU64::new(0),
            changed: Signal::new(),
        }
    }

    /// Consistent view of the items as of now
    pub fn snapshot(&self) -> Arc<ItemSet<T>> {
        Arc::clone(&self.items.read())
    }

    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::Acquire)
    }

    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&ItemsChanged) + Send + Sync + 'static,
    {
        self.changed.subscribe(listener)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.changed.unsubscribe(id)
    }
}

impl<T: Clone> ItemStore<T> {
    pub fn add(&self, item: Item<T>) {
        self.mutate(|set| {
            set.push(item);
            ((), true)
        })
    }

    /// Appends all items as one batch
    pub fn add_all<I: IntoIterator<Item = Item<T>>>(&self, items: I) -> usize {
        self.mutate(|set| {
            let before = set.len();
            set.extend(items);
            let added = set.len() - before;
            (added, added > 0)
        })
    }

    pub fn remove_at(&self, index: usize) -> Option<Item<T>> {
        self.mutate(|set| {
            let removed = set.remove(index);
            let changed = removed.is_some();
            (removed, changed)
        })
    }

    pub fn remove_indices(&self, indices: &[usize]) -> usize {
        self.mutate(|set| {
            let removed = set.remove_indices(indices);
            (removed, removed > 0)
        })
    }

    /// Removes every item matching `doomed`, returning how many went
    pub fn remove_where<F: FnMut(&Item<T>) -> bool>(&self, mut doomed: F) -> usize {
        self.mutate(|set| {
            let before = set.len();
            set.retain(|item| !doomed(item));
            let removed = before - set.len();
            (removed, removed > 0)
        })
    }

    pub fn clear(&self) {
        self.mutate(|set| {
            let changed = !set.is_empty();
            set.clear();
            ((), changed)
        })
    }

    pub fn replace_range<I>(&self, range: Range<usize>, items: I) -> (usize, usize)
    where
        I: IntoIterator<Item = Item<T>>,
    {
        self.mutate(|set| {
            let (removed, inserted) = set.replace_range(range, items);
            ((removed, inserted), removed + inserted > 0)
        })
    }

    /// Swaps the whole content for `items`
    pub fn replace_all<I: IntoIterator<Item = Item<T>>>(&self, items: I) {
        self.mutate(|set| {
            let had_items = !set.is_empty();
            set.clear();
            set.extend(items);
            ((), had_items || !set.is_empty())
        })
    }

    fn mutate<R, F>(&self, apply: F) -> R
    where
        F: FnOnce(&mut ItemSet<T>) -> (R, bool),
    {
        let (result, event) = {
            let mut guard = self.items.write();
            let (result, changed) = apply(Arc::make_mut(&mut *guard));
            let event = changed.then(|| ItemsChanged {
                revision: self.revision.fetch_add(1, Ordering::AcqRel) + 1,
                len: guard.len(),
            });
            (result, event)
        };

        if let Some(event) = event {
            trace!(revision = event.revision, len = event.len, "items changed");
            self.changed.emit(&event);
        }
        result
    }
}
