//! Contiguous value storage.
//!
//! Entries in the key index refer to values by slot (position in this store),
//! so a relocation of the backing buffer never invalidates them. Slots only
//! move when the map asks for it: a permutation ([`ValueStore::permute`]), a
//! removal, or a compaction.

use std::collections::TryReserveError;

#[derive(Clone)]
pub(crate) struct ValueStore<V> {
    values: Vec<V>,
}

impl<V> ValueStore<V> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            values: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.values.capacity()
    }

    /// Whether storing `additional` more values would reallocate the buffer.
    #[inline]
    pub(crate) fn needs_growth(&self, additional: usize) -> bool {
        self.values.capacity() - self.values.len() < additional
    }

    pub(crate) fn reserve(&mut self, additional: usize) {
        self.values.reserve(additional);
    }

    pub(crate) fn try_reserve(&mut self, additional: usize) -> Result<(), TryReserveError> {
        self.values.try_reserve(additional)
    }

    pub(crate) fn shrink_to_fit(&mut self) {
        self.values.shrink_to_fit();
    }

    pub(crate) fn clear(&mut self) {
        self.values.clear();
    }

    /// Appends a value and returns its slot.
    #[inline]
    pub(crate) fn push(&mut self, value: V) -> usize {
        self.values.push(value);
        self.values.len() - 1
    }

    #[inline]
    pub(crate) fn value(&self, slot: usize) -> &V {
        &self.values[slot]
    }

    #[inline]
    pub(crate) fn value_mut(&mut self, slot: usize) -> &mut V {
        &mut self.values[slot]
    }

    pub(crate) fn replace(&mut self, slot: usize, value: V) -> V {
        std::mem::replace(&mut self.values[slot], value)
    }

    pub(crate) fn swap(&mut self, a: usize, b: usize) {
        self.values.swap(a, b);
    }

    /// Removes `slot`, shifting every later value down by one.
    pub(crate) fn remove(&mut self, slot: usize) -> V {
        self.values.remove(slot)
    }

    /// Removes `slot` and moves the last value into it.
    pub(crate) fn swap_remove(&mut self, slot: usize) -> V {
        self.values.swap_remove(slot)
    }

    /// Reorders values in place so that afterwards position `i` holds the
    /// value previously at `order[i]`.
    ///
    /// `order` must be a permutation of `0..len`.
    pub(crate) fn permute(&mut self, order: &[usize]) {
        debug_assert_eq!(order.len(), self.values.len());
        let mut visited = vec![false; order.len()];
        for start in 0..order.len() {
            if visited[start] {
                continue;
            }
            // Walk the cycle through `start`; each swap settles one position.
            let mut i = start;
            loop {
                visited[i] = true;
                let src = order[i];
                if src == start {
                    break;
                }
                self.values.swap(i, src);
                i = src;
            }
        }
    }

    /// Drops every value whose slot is marked in `dead` and closes the gaps.
    ///
    /// Returns the old-slot to new-slot mapping for surviving values.
    pub(crate) fn compact(&mut self, dead: &[bool]) -> Vec<usize> {
        debug_assert_eq!(dead.len(), self.values.len());
        let mut remap = Vec::with_capacity(dead.len());
        let mut next = 0usize;
        for &is_dead in dead {
            remap.push(next);
            if !is_dead {
                next += 1;
            }
        }

        let mut slot = 0usize;
        self.values.retain(|_| {
            let keep = !dead[slot];
            slot += 1;
            keep
        });
        remap
    }

    pub(crate) fn as_slice(&self) -> &[V] {
        &self.values
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [V] {
        &mut self.values
    }

    pub(crate) fn memory_usage(&self) -> usize {
        self.values.capacity() * std::mem::size_of::<V>()
    }
}
