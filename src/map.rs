//! The split map façade.

use std::fmt;
use std::ops;

use tracing::{debug, trace};

use crate::config::MapConfig;
use crate::error::{Error, Result};
use crate::iter::{Iter, Keys};
use crate::keys::KeyIndex;
use crate::values::ValueStore;

/// An ordered map that keeps keys and values in two separate contiguous
/// arrays.
///
/// The key index holds `(key, slot)` pairs and is what every search and sort
/// touches; values sit in their own buffer and are only read on a hit. Two
/// flags track how far the arrays are from fully ordered:
///
/// - `sorted`: the key index is in ascending key order, so lookups can
///   binary search.
/// - `deep_sorted`: value `i` belongs to key index entry `i`, so the value
///   buffer can be walked in key order.
///
/// A flag that an operation cannot keep true is cleared, never left stale.
#[derive(Clone)]
pub struct SplitMap<K, V> {
    keys: KeyIndex<K>,
    values: ValueStore<V>,
    sorted: bool,
    deep_sorted: bool,
    unique: bool,
}

// =============================================================================
// Construction & accessors
// =============================================================================

impl<K, V> SplitMap<K, V> {
    pub fn new() -> Self {
        Self::with_config(MapConfig::default())
    }

    /// Creates an empty map with room for `capacity` entries in both arrays.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_config(MapConfig::default().with_initial_capacity(capacity))
    }

    pub fn with_config(config: MapConfig) -> Self {
        Self {
            keys: KeyIndex::with_capacity(config.initial_capacity),
            values: ValueStore::with_capacity(config.initial_capacity),
            sorted: true,
            deep_sorted: true,
            unique: config.unique_keys,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Whether the key index is currently in ascending key order.
    #[inline]
    pub fn is_sorted(&self) -> bool {
        self.sorted
    }

    /// Whether the value buffer currently mirrors key index order.
    #[inline]
    pub fn is_deep_sorted(&self) -> bool {
        self.deep_sorted
    }

    /// Whether inserting an existing key overwrites instead of duplicating.
    #[inline]
    pub fn is_unique(&self) -> bool {
        self.unique
    }

    /// Number of values the value buffer holds before it must grow.
    pub fn capacity(&self) -> usize {
        self.values.capacity()
    }

    /// Heap bytes held by both arrays.
    pub fn memory_usage(&self) -> usize {
        self.keys.memory_usage() + self.values.memory_usage()
    }

    pub fn shrink_to_fit(&mut self) {
        self.keys.shrink_to_fit();
        self.values.shrink_to_fit();
    }

    pub fn clear(&mut self) {
        self.keys.clear();
        self.values.clear();
        self.sorted = true;
        self.deep_sorted = true;
    }

    /// Reserves room for `additional` more entries.
    ///
    /// If the value buffer has to grow, values are first realigned to key
    /// index order so that the grown buffer starts out deep-sorted.
    pub fn reserve(&mut self, additional: usize) {
        self.reconcile_for_growth(additional);
        self.keys.reserve(additional);
        self.values.reserve(additional);
    }

    /// Fallible [`reserve`](Self::reserve). On error the map keeps all of its
    /// entries and only the capacity request is lost.
    pub fn try_reserve(&mut self, additional: usize) -> Result<()> {
        let grows = self.values.needs_growth(additional);
        self.keys.try_reserve(additional)?;
        self.values.try_reserve(additional)?;
        // Slots stay valid across the move, so realigning afterwards is safe
        // and a failed allocation leaves the value order untouched.
        if grows {
            self.reconcile();
        }
        Ok(())
    }

    fn reconcile_for_growth(&mut self, additional: usize) {
        if self.values.needs_growth(additional) {
            self.reconcile();
        }
    }

    fn reconcile(&mut self) {
        if self.deep_sorted {
            return;
        }
        debug!(
            len = self.values.len(),
            capacity = self.values.capacity(),
            "realigning values for growth"
        );
        self.deep_sort();
    }

    /// Rebuilds the value buffer so that value `i` belongs to key index
    /// entry `i`. Key order is left alone.
    pub fn deep_sort(&mut self) {
        if self.deep_sorted {
            return;
        }
        let order: Vec<usize> = self.keys.slots().collect();
        self.values.permute(&order);
        self.keys.relink_positional(0);
        self.deep_sorted = true;
    }

    /// Iterates `(&K, &V)` in key index order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(self.keys.entries(), &self.values)
    }

    pub fn keys(&self) -> Keys<'_, K> {
        Keys::new(self.keys.entries())
    }

    /// Iterates values in their physical storage order.
    ///
    /// Matches key index order only while the map is deep-sorted.
    pub fn values(&self) -> std::slice::Iter<'_, V> {
        self.values.as_slice().iter()
    }

    /// Mutable [`values`](Self::values).
    pub fn values_mut(&mut self) -> std::slice::IterMut<'_, V> {
        self.values.as_mut_slice().iter_mut()
    }

    /// First entry in key index order.
    pub fn first(&self) -> Option<(&K, &V)> {
        self.iter().next()
    }

    /// Last entry in key index order.
    pub fn last(&self) -> Option<(&K, &V)> {
        self.iter().next_back()
    }
}

// =============================================================================
// Lookup
// =============================================================================

impl<K: Ord, V> SplitMap<K, V> {
    pub fn get(&self, key: &K) -> Option<&V> {
        let pos = self.keys.find(key, self.sorted)?;
        Some(self.values.value(self.keys.slot(pos)))
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let pos = self.keys.find(key, self.sorted)?;
        Some(self.values.value_mut(self.keys.slot(pos)))
    }

    /// Like [`get`](Self::get), reporting a miss as [`Error::NotFound`].
    pub fn lookup(&self, key: &K) -> Result<&V> {
        self.get(key).ok_or(Error::NotFound)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.keys.find(key, self.sorted).is_some()
    }

    /// Returns the value for `key`, inserting `V::default()` first on a miss.
    pub fn get_or_insert_default(&mut self, key: K) -> &mut V
    where
        V: Default,
    {
        let slot = match self.keys.find(&key, self.sorted) {
            Some(pos) => self.keys.slot(pos),
            None => {
                self.reserve(1);
                self.insert_new(key, V::default())
            }
        };
        self.values.value_mut(slot)
    }
}

impl<K, V: PartialEq> SplitMap<K, V> {
    /// Linear scan of the value buffer.
    pub fn contains_value(&self, value: &V) -> bool {
        self.values.as_slice().contains(value)
    }
}

// =============================================================================
// Insertion
// =============================================================================

impl<K: Ord, V> SplitMap<K, V> {
    /// Inserts keeping the key index sorted.
    ///
    /// With unique keys, an existing key has its value replaced in place and
    /// the old value is returned. A new key is shifted into position when the
    /// index is sorted; otherwise it is appended and the index re-sorted.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        match self.overwrite(&key, value) {
            Ok(old) => {
                self.after_insert_overwrite();
                Some(old)
            }
            Err(value) => {
                self.reserve(1);
                self.insert_new(key, value);
                None
            }
        }
    }

    /// Fallible [`insert`](Self::insert).
    pub fn try_insert(&mut self, key: K, value: V) -> Result<Option<V>> {
        match self.overwrite(&key, value) {
            Ok(old) => {
                self.after_insert_overwrite();
                Ok(Some(old))
            }
            Err(value) => {
                self.try_reserve(1)?;
                self.insert_new(key, value);
                Ok(None)
            }
        }
    }

    /// Appends to the tail of both arrays without sorting.
    ///
    /// With unique keys an existing key is overwritten in place instead.
    /// Clears the sorted flag either way.
    pub fn append(&mut self, key: K, value: V) -> Option<V> {
        match self.overwrite(&key, value) {
            Ok(old) => {
                self.sorted = false;
                Some(old)
            }
            Err(value) => {
                self.reserve(1);
                self.push_new(key, value);
                None
            }
        }
    }

    /// Fallible [`append`](Self::append).
    pub fn try_append(&mut self, key: K, value: V) -> Result<Option<V>> {
        match self.overwrite(&key, value) {
            Ok(old) => {
                self.sorted = false;
                Ok(Some(old))
            }
            Err(value) => {
                self.try_reserve(1)?;
                self.push_new(key, value);
                Ok(None)
            }
        }
    }

    /// Inserts every pair, sorting once at the end.
    ///
    /// Same result as calling [`insert`](Self::insert) for each pair: with
    /// unique keys the last value given for a key wins, and a key already in
    /// the map keeps its entry.
    pub fn batch_insert<I>(&mut self, pairs: I)
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let pairs = pairs.into_iter();
        self.reserve(pairs.size_hint().0);
        let before = self.len();
        for (key, value) in pairs {
            self.reserve(1);
            let slot = self.values.push(value);
            self.keys.push(key, slot);
        }
        let added = self.len() > before;
        if added {
            self.sorted = false;
        }
        self.sort();
        if added && self.unique {
            self.collapse_duplicates();
        }
    }

    /// [`batch_insert`](Self::batch_insert) over parallel key and value
    /// sequences of equal length.
    pub fn batch_insert_parallel<IK, IV>(&mut self, keys: IK, values: IV) -> Result<()>
    where
        IK: IntoIterator<Item = K>,
        IK::IntoIter: ExactSizeIterator,
        IV: IntoIterator<Item = V>,
        IV::IntoIter: ExactSizeIterator,
    {
        let (keys, values) = Self::check_parallel(keys, values)?;
        self.try_reserve(keys.len())?;
        self.batch_insert(keys.zip(values));
        Ok(())
    }

    /// Appends every pair. Same result as calling [`append`](Self::append)
    /// for each pair.
    pub fn batch_append<I>(&mut self, pairs: I)
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let pairs = pairs.into_iter();
        self.reserve(pairs.size_hint().0);
        for (key, value) in pairs {
            self.append(key, value);
        }
    }

    /// [`batch_append`](Self::batch_append) over parallel key and value
    /// sequences of equal length.
    pub fn batch_append_parallel<IK, IV>(&mut self, keys: IK, values: IV) -> Result<()>
    where
        IK: IntoIterator<Item = K>,
        IK::IntoIter: ExactSizeIterator,
        IV: IntoIterator<Item = V>,
        IV::IntoIter: ExactSizeIterator,
    {
        let (keys, values) = Self::check_parallel(keys, values)?;
        self.try_reserve(keys.len())?;
        self.batch_append(keys.zip(values));
        Ok(())
    }

    /// Builds a map from pairs via [`batch_insert`](Self::batch_insert).
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let mut map = Self::new();
        map.batch_insert(pairs);
        map
    }

    /// Builds a map from parallel key and value sequences.
    pub fn from_parallel<IK, IV>(keys: IK, values: IV) -> Result<Self>
    where
        IK: IntoIterator<Item = K>,
        IK::IntoIter: ExactSizeIterator,
        IV: IntoIterator<Item = V>,
        IV::IntoIter: ExactSizeIterator,
    {
        let mut map = Self::new();
        map.batch_insert_parallel(keys, values)?;
        Ok(map)
    }

    /// Stable-sorts the key index. Values are not moved, so this clears the
    /// deep-sorted flag unless the index was already sorted.
    pub fn sort(&mut self) {
        if self.sorted {
            return;
        }
        trace!(len = self.len(), "sorting key index");
        self.keys.sort();
        debug_assert!(self.keys.is_ordered());
        self.sorted = true;
        self.deep_sorted = false;
    }

    fn check_parallel<IK, IV>(keys: IK, values: IV) -> Result<(IK::IntoIter, IV::IntoIter)>
    where
        IK: IntoIterator<Item = K>,
        IK::IntoIter: ExactSizeIterator,
        IV: IntoIterator<Item = V>,
        IV::IntoIter: ExactSizeIterator,
    {
        let keys = keys.into_iter();
        let values = values.into_iter();
        if keys.len() != values.len() {
            return Err(Error::LengthMismatch {
                keys: keys.len(),
                values: values.len(),
            });
        }
        Ok((keys, values))
    }

    /// Replaces the value of an existing key when keys are unique. Hands the
    /// value back if nothing was replaced.
    fn overwrite(&mut self, key: &K, value: V) -> std::result::Result<V, V> {
        if !self.unique {
            return Err(value);
        }
        match self.keys.find(key, self.sorted) {
            Some(pos) => {
                trace!(pos, "replacing existing value");
                Ok(self.values.replace(self.keys.slot(pos), value))
            }
            None => Err(value),
        }
    }

    fn after_insert_overwrite(&mut self) {
        if !self.sorted {
            self.sort();
        }
        self.deep_sorted = false;
    }

    /// Stores a new entry at its sorted position and returns its slot.
    /// Capacity must already be reserved.
    fn insert_new(&mut self, key: K, value: V) -> usize {
        let slot = self.values.push(value);
        if self.sorted {
            self.keys.insert_sorted(key, slot);
        } else {
            self.keys.push(key, slot);
            self.sort();
        }
        self.deep_sorted = false;
        slot
    }

    /// Stores a new entry at the tail of both arrays. Capacity must already
    /// be reserved.
    fn push_new(&mut self, key: K, value: V) {
        // Both tails grow together, so positional mirroring survives.
        let slot = self.values.push(value);
        self.keys.push(key, slot);
        self.sorted = false;
    }

    /// Collapses runs of equal keys in a sorted index down to the first
    /// entry of each run, carrying the last value of the run into it.
    fn collapse_duplicates(&mut self) {
        debug_assert!(self.sorted);
        let mut dead = vec![false; self.values.len()];
        let mut collapsed = 0usize;
        let entries = self.keys.entries_mut();
        let mut w = 0usize;
        for r in 1..entries.len() {
            if entries[r].key == entries[w].key {
                self.values.swap(entries[w].slot, entries[r].slot);
                dead[entries[r].slot] = true;
                collapsed += 1;
            } else {
                w += 1;
                entries.swap(w, r);
            }
        }
        if collapsed == 0 {
            return;
        }
        trace!(collapsed, "collapsing duplicate keys");
        self.keys.truncate(w + 1);
        let remap = self.values.compact(&dead);
        self.keys.remap_slots(&remap);
        self.deep_sorted = false;
    }
}

// =============================================================================
// Removal
// =============================================================================

impl<K: Ord, V> SplitMap<K, V> {
    /// Removes `key` and returns its value.
    ///
    /// The strategy depends on the flags:
    ///
    /// | sorted | deep-sorted | strategy                                         |
    /// |--------|-------------|--------------------------------------------------|
    /// | yes    | yes         | shift both arrays left; both flags kept          |
    /// | yes    | no          | move last value into the freed slot, shift keys  |
    /// | no     | yes         | swap-with-last in both arrays                    |
    /// | no     | no          | move last value into the freed slot, swap keys   |
    ///
    /// Removing the last key index entry just pops it and fills its value
    /// slot from the tail of the value buffer.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let pos = self.keys.find(key, self.sorted)?;
        let removed = if pos + 1 == self.keys.len() {
            trace!(pos, "remove: key index tail");
            let entry = self.keys.pop()?;
            self.release_slot(entry.slot)
        } else {
            match (self.sorted, self.deep_sorted) {
                (true, true) => {
                    trace!(pos, "remove: shift both arrays");
                    self.keys.remove(pos);
                    let value = self.values.remove(pos);
                    self.keys.relink_positional(pos);
                    value
                }
                (true, false) => {
                    trace!(pos, "remove: refill slot, shift keys");
                    let value = self.release_slot(self.keys.slot(pos));
                    self.keys.remove(pos);
                    value
                }
                (false, true) => {
                    trace!(pos, "remove: swap with last");
                    self.keys.swap_remove(pos);
                    self.keys.set_slot(pos, pos);
                    self.values.swap_remove(pos)
                }
                (false, false) => {
                    trace!(pos, "remove: refill slot, swap keys");
                    let value = self.release_slot(self.keys.slot(pos));
                    self.keys.swap_remove(pos);
                    value
                }
            }
        };

        if self.keys.is_empty() {
            self.sorted = true;
            self.deep_sorted = true;
        }
        Some(removed)
    }

    /// Takes the value out of `slot`, moving the last value into it and
    /// repointing whichever entry referred to the last slot.
    fn release_slot(&mut self, slot: usize) -> V {
        let last = self.values.len() - 1;
        if slot != last {
            let owner = self.keys.position_of_slot(last);
            debug_assert!(owner.is_some(), "value slot {last} has no key");
            if let Some(owner) = owner {
                self.keys.set_slot(owner, slot);
            }
        }
        self.values.swap_remove(slot)
    }
}

// =============================================================================
// Trait impls
// =============================================================================

impl<K, V> Default for SplitMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for SplitMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: Ord, V> Extend<(K, V)> for SplitMap<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        self.batch_insert(iter);
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for SplitMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::from_pairs(iter)
    }
}

impl<K: Ord, V> ops::Index<&K> for SplitMap<K, V> {
    type Output = V;

    fn index(&self, key: &K) -> &V {
        match self.get(key) {
            Some(value) => value,
            None => panic!("key not found"),
        }
    }
}

impl<'a, K, V> IntoIterator for &'a SplitMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}

// =============================================================================
// Invariant checks
// =============================================================================

#[cfg(test)]
impl<K: Ord + fmt::Debug, V> SplitMap<K, V> {
    /// Panics unless both arrays are consistent with each other and with the
    /// flags.
    pub(crate) fn assert_invariants(&self) {
        let n = self.values.len();
        assert_eq!(self.keys.len(), n, "key index and value store lengths differ");

        let mut seen = vec![false; n];
        for (i, entry) in self.keys.entries().iter().enumerate() {
            assert!(entry.slot < n, "entry {i} points past the value store");
            assert!(!seen[entry.slot], "slot {} referenced twice", entry.slot);
            seen[entry.slot] = true;
        }

        if self.sorted {
            assert!(self.keys.is_ordered(), "sorted flag set on unsorted index");
        }
        if self.deep_sorted {
            for (i, entry) in self.keys.entries().iter().enumerate() {
                assert_eq!(entry.slot, i, "deep-sorted flag set but entry {i} is displaced");
            }
        }
        if self.unique {
            let mut keys: Vec<&K> = self.keys().collect();
            keys.sort();
            for w in keys.windows(2) {
                assert_ne!(w[0], w[1], "duplicate key with unique keys enabled");
            }
        }
    }
}
