use std::iter::FusedIterator;
use std::slice;

use crate::keys::Entry;
use crate::values::ValueStore;

/// Iterator over `(&K, &V)` in key index order.
///
/// Yields keys in ascending order only while the map is sorted.
pub struct Iter<'a, K, V> {
    entries: slice::Iter<'a, Entry<K>>,
    values: &'a ValueStore<V>,
}

impl<'a, K, V> Iter<'a, K, V> {
    pub(crate) fn new(entries: &'a [Entry<K>], values: &'a ValueStore<V>) -> Self {
        Self {
            entries: entries.iter(),
            values,
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let values = self.values;
        self.entries
            .next()
            .map(|e| (&e.key, values.value(e.slot)))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entries.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Iter<'_, K, V> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        let values = self.values;
        self.entries
            .next_back()
            .map(|e| (&e.key, values.value(e.slot)))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
            values: self.values,
        }
    }
}

/// Iterator over keys in key index order.
pub struct Keys<'a, K> {
    entries: slice::Iter<'a, Entry<K>>,
}

impl<'a, K> Keys<'a, K> {
    pub(crate) fn new(entries: &'a [Entry<K>]) -> Self {
        Self {
            entries: entries.iter(),
        }
    }
}

impl<'a, K> Iterator for Keys<'a, K> {
    type Item = &'a K;

    #[inline]
    fn next(&mut self) -> Option<&'a K> {
        self.entries.next().map(|e| &e.key)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entries.size_hint()
    }
}

impl<K> DoubleEndedIterator for Keys<'_, K> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        self.entries.next_back().map(|e| &e.key)
    }
}

impl<K> ExactSizeIterator for Keys<'_, K> {}

impl<K> FusedIterator for Keys<'_, K> {}
