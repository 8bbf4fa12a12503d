//! Contiguous key index.
//!
//! Each [`Entry`] pairs an owned key with the slot of its value in the
//! [`ValueStore`](crate::values::ValueStore). The index may or may not be in
//! key order; callers pass the map's `sorted` flag to pick binary search or a
//! linear scan.

use std::collections::TryReserveError;

use crate::sort;

#[derive(Clone)]
pub(crate) struct Entry<K> {
    pub(crate) key: K,
    /// Position of the value in the value store.
    pub(crate) slot: usize,
}

#[derive(Clone)]
pub(crate) struct KeyIndex<K> {
    entries: Vec<Entry<K>>,
}

impl<K> KeyIndex<K> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn reserve(&mut self, additional: usize) {
        self.entries.reserve(additional);
    }

    pub(crate) fn try_reserve(&mut self, additional: usize) -> Result<(), TryReserveError> {
        self.entries.try_reserve(additional)
    }

    pub(crate) fn shrink_to_fit(&mut self) {
        self.entries.shrink_to_fit();
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    pub(crate) fn entries(&self) -> &[Entry<K>] {
        &self.entries
    }

    pub(crate) fn entries_mut(&mut self) -> &mut [Entry<K>] {
        &mut self.entries
    }

    #[inline]
    pub(crate) fn slot(&self, pos: usize) -> usize {
        self.entries[pos].slot
    }

    #[inline]
    pub(crate) fn set_slot(&mut self, pos: usize, slot: usize) {
        self.entries[pos].slot = slot;
    }

    pub(crate) fn push(&mut self, key: K, slot: usize) {
        self.entries.push(Entry { key, slot });
    }

    pub(crate) fn pop(&mut self) -> Option<Entry<K>> {
        self.entries.pop()
    }

    /// Removes the entry at `pos`, shifting the tail left.
    pub(crate) fn remove(&mut self, pos: usize) -> Entry<K> {
        self.entries.remove(pos)
    }

    /// Removes the entry at `pos` and moves the last entry into its place.
    pub(crate) fn swap_remove(&mut self, pos: usize) -> Entry<K> {
        self.entries.swap_remove(pos)
    }

    pub(crate) fn truncate(&mut self, len: usize) {
        self.entries.truncate(len);
    }

    /// Position of the entry whose value lives in `slot`.
    pub(crate) fn position_of_slot(&self, slot: usize) -> Option<usize> {
        self.entries.iter().position(|e| e.slot == slot)
    }

    /// Slots in index order.
    pub(crate) fn slots(&self) -> impl Iterator<Item = usize> + '_ {
        self.entries.iter().map(|e| e.slot)
    }

    /// Points entry `i` at slot `i` for every `i >= from`.
    pub(crate) fn relink_positional(&mut self, from: usize) {
        for (i, entry) in self.entries.iter_mut().enumerate().skip(from) {
            entry.slot = i;
        }
    }

    /// Rewrites every slot through `remap` (old slot to new slot).
    pub(crate) fn remap_slots(&mut self, remap: &[usize]) {
        for entry in &mut self.entries {
            entry.slot = remap[entry.slot];
        }
    }

    pub(crate) fn memory_usage(&self) -> usize {
        self.entries.capacity() * std::mem::size_of::<Entry<K>>()
    }
}

impl<K: Ord> KeyIndex<K> {
    /// Finds the first entry with `key`.
    ///
    /// Uses binary search when `sorted` is set, a linear scan otherwise.
    pub(crate) fn find(&self, key: &K, sorted: bool) -> Option<usize> {
        if sorted {
            let pos = self.entries.partition_point(|e| e.key < *key);
            (pos < self.entries.len() && self.entries[pos].key == *key).then_some(pos)
        } else {
            self.entries.iter().position(|e| e.key == *key)
        }
    }

    /// Inserts after every entry whose key is not greater than `key`,
    /// shifting the tail right. The index must be sorted.
    pub(crate) fn insert_sorted(&mut self, key: K, slot: usize) -> usize {
        let pos = self.entries.partition_point(|e| e.key <= key);
        self.entries.insert(pos, Entry { key, slot });
        pos
    }

    pub(crate) fn sort(&mut self) {
        sort::sort_by(&mut self.entries, |a, b| a.key < b.key);
    }

    pub(crate) fn is_ordered(&self) -> bool {
        self.entries.windows(2).all(|w| w[0].key <= w[1].key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index(keys: &[u32]) -> KeyIndex<u32> {
        let mut idx = KeyIndex::with_capacity(keys.len());
        for (slot, k) in keys.iter().enumerate() {
            idx.push(*k, slot);
        }
        idx
    }

    fn keys_of(idx: &KeyIndex<u32>) -> Vec<u32> {
        idx.entries().iter().map(|e| e.key).collect()
    }

    #[test]
    fn test_find_sorted_and_linear() {
        let idx = index(&[1, 3, 3, 8]);
        assert_eq!(idx.find(&3, true), Some(1));
        assert_eq!(idx.find(&8, true), Some(3));
        assert_eq!(idx.find(&4, true), None);
        assert_eq!(idx.find(&9, true), None);

        let idx = index(&[8, 1, 3]);
        assert_eq!(idx.find(&3, false), Some(2));
        assert_eq!(idx.find(&2, false), None);
    }

    #[test]
    fn test_insert_sorted_after_equal() {
        let mut idx = index(&[1, 3, 5]);
        assert_eq!(idx.insert_sorted(3, 10), 2);
        assert_eq!(idx.insert_sorted(0, 11), 0);
        assert_eq!(idx.insert_sorted(9, 12), 5);
        assert_eq!(keys_of(&idx), vec![0, 1, 3, 3, 5, 9]);
        assert_eq!(idx.slot(3), 10);
        assert!(idx.is_ordered());
    }

    #[test]
    fn test_sort_moves_slots_with_keys() {
        let mut idx = index(&[4, 2, 9, 1]);
        idx.sort();
        assert_eq!(keys_of(&idx), vec![1, 2, 4, 9]);
        assert_eq!(idx.slots().collect::<Vec<_>>(), vec![3, 1, 0, 2]);
    }

    #[test]
    fn test_relink_and_remap() {
        let mut idx = index(&[4, 2, 9]);
        idx.sort();
        idx.relink_positional(1);
        assert_eq!(idx.slots().collect::<Vec<_>>(), vec![1, 1, 2]);
        idx.remap_slots(&[5, 6, 7]);
        assert_eq!(idx.slots().collect::<Vec<_>>(), vec![6, 6, 7]);
        assert_eq!(idx.position_of_slot(7), Some(2));
        assert_eq!(idx.position_of_slot(0), None);
    }
}
