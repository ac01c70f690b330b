//! Weakly consistent snapshot iteration and the live key/value/entry views.

use std::borrow::Borrow;
use std::fmt;
use std::hash::{BuildHasher, Hash};
use std::ptr;
use std::sync::atomic::Ordering;

use crossbeam_epoch::{self as epoch, Atomic, Guard};
use foldhash::fast::FixedState;

use crate::hashmap::{Entry, HashMap, Table};

/// Why an iterator-side removal was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IterRemoveError {
    /// `remove_current` was called before the iterator produced an entry.
    NeverAdvanced,
    /// The last produced entry was already deleted.
    AlreadyDeleted,
}

impl fmt::Display for IterRemoveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IterRemoveError::NeverAdvanced => {
                write!(f, "iterator has not produced an entry yet")
            }
            IterRemoveError::AlreadyDeleted => {
                write!(f, "the last produced entry was already deleted")
            }
        }
    }
}

impl std::error::Error for IterRemoveError {}

/// Cursor over the chains of the table observed at creation.
///
/// The guard is pinned before the table pointer is read and held for the
/// cursor's whole lifetime, so every pointer it hands out stays valid even
/// if the entries are unlinked or the table is superseded mid-walk.
///
/// Only entries that are live at visit time are yielded. Concurrent
/// mutation may hide or expose individual entries, but the bucket index
/// only moves forward and chains are acyclic, so the walk terminates and
/// never yields the same entry twice.
pub(crate) struct RawIter<K, V> {
    guard: Guard,
    table: *const Table<K, V>,
    bucket: usize,
    next_entry: *const Entry<K, V>,
    last_returned: *const Entry<K, V>,
}

impl<K, V> RawIter<K, V> {
    pub(crate) fn new(data: &Atomic<Table<K, V>>) -> Self {
        let guard = epoch::pin();
        let table = data.load(Ordering::Acquire, &guard).as_raw();
        let mut iter = Self {
            guard,
            table,
            bucket: 0,
            next_entry: ptr::null(),
            last_returned: ptr::null(),
        };
        iter.advance();
        iter
    }

    fn advance(&mut self) {
        let table = unsafe { &*self.table };
        // Continue in the current chain, stepping over tombstones.
        if !self.next_entry.is_null() {
            let mut next = unsafe { &*self.next_entry }
                .next
                .load(Ordering::Acquire, &self.guard);
            while let Some(entry) = unsafe { next.as_ref() } {
                if !entry.is_deleted() {
                    self.next_entry = next.as_raw();
                    return;
                }
                next = entry.next.load(Ordering::Acquire, &self.guard);
            }
        }
        // Hunt for the next bucket with a live entry, skipping leading
        // tombstones.
        while self.bucket < table.len() {
            let mut current = table.bucket(self.bucket).load(Ordering::Acquire, &self.guard);
            self.bucket += 1;
            while let Some(entry) = unsafe { current.as_ref() } {
                if !entry.is_deleted() {
                    self.next_entry = current.as_raw();
                    return;
                }
                current = entry.next.load(Ordering::Acquire, &self.guard);
            }
        }
        self.next_entry = ptr::null();
    }

    pub(crate) fn next_entry(&mut self) -> Option<*const Entry<K, V>> {
        if self.next_entry.is_null() {
            return None;
        }
        self.last_returned = self.next_entry;
        self.advance();
        Some(self.last_returned)
    }

    fn last_returned(&self) -> Option<&Entry<K, V>> {
        unsafe { self.last_returned.as_ref() }
    }

    fn clear_last_returned(&mut self) {
        self.last_returned = ptr::null();
    }
}

/// Removes the cursor's last produced entry through the map, shared by the
/// `remove_current` methods of all three iterators.
fn remove_last<K, V, S>(
    map: &HashMap<K, V, S>,
    raw: &mut RawIter<K, V>,
) -> Result<(), IterRemoveError>
where
    K: Hash + Eq + Clone + 'static,
    V: Clone + 'static,
    S: BuildHasher,
{
    let Some(entry) = raw.last_returned() else {
        return Err(IterRemoveError::NeverAdvanced);
    };
    if entry.is_deleted() {
        return Err(IterRemoveError::AlreadyDeleted);
    }
    map.remove(&entry.key);
    raw.clear_last_returned();
    Ok(())
}

/// Iterator over the entries of a map, yielding key/value clones.
pub struct Iter<'a, K, V, S = FixedState> {
    map: &'a HashMap<K, V, S>,
    raw: RawIter<K, V>,
}

impl<'a, K, V, S> Iter<'a, K, V, S>
where
    K: Hash + Eq + Clone + 'static,
    V: Clone + 'static,
    S: BuildHasher,
{
    pub(crate) fn new(map: &'a HashMap<K, V, S>) -> Self {
        Self {
            map,
            raw: map.raw_iter(),
        }
    }

    /// Removes the entry most recently produced by `next` from the map.
    pub fn remove_current(&mut self) -> Result<(), IterRemoveError> {
        remove_last(self.map, &mut self.raw)
    }
}

impl<K, V, S> Iterator for Iter<'_, K, V, S>
where
    K: Clone,
    V: Clone,
{
    type Item = (K, V);

    fn next(&mut self) -> Option<(K, V)> {
        self.raw.next_entry().map(|entry| {
            let entry = unsafe { &*entry };
            (entry.key.clone(), entry.value.clone())
        })
    }
}

/// Iterator over the keys of a map.
pub struct Keys<'a, K, V, S = FixedState> {
    map: &'a HashMap<K, V, S>,
    raw: RawIter<K, V>,
}

impl<'a, K, V, S> Keys<'a, K, V, S>
where
    K: Hash + Eq + Clone + 'static,
    V: Clone + 'static,
    S: BuildHasher,
{
    pub(crate) fn new(map: &'a HashMap<K, V, S>) -> Self {
        Self {
            map,
            raw: map.raw_iter(),
        }
    }

    /// Removes the key most recently produced by `next` from the map.
    pub fn remove_current(&mut self) -> Result<(), IterRemoveError> {
        remove_last(self.map, &mut self.raw)
    }
}

impl<K, V, S> Iterator for Keys<'_, K, V, S>
where
    K: Clone,
{
    type Item = K;

    fn next(&mut self) -> Option<K> {
        self.raw
            .next_entry()
            .map(|entry| unsafe { &*entry }.key.clone())
    }
}

/// Iterator over the values of a map.
pub struct Values<'a, K, V, S = FixedState> {
    map: &'a HashMap<K, V, S>,
    raw: RawIter<K, V>,
}

impl<'a, K, V, S> Values<'a, K, V, S>
where
    K: Hash + Eq + Clone + 'static,
    V: Clone + 'static,
    S: BuildHasher,
{
    pub(crate) fn new(map: &'a HashMap<K, V, S>) -> Self {
        Self {
            map,
            raw: map.raw_iter(),
        }
    }

    /// Removes the entry whose value was most recently produced by `next`.
    pub fn remove_current(&mut self) -> Result<(), IterRemoveError> {
        remove_last(self.map, &mut self.raw)
    }
}

impl<K, V, S> Iterator for Values<'_, K, V, S>
where
    V: Clone,
{
    type Item = V;

    fn next(&mut self) -> Option<V> {
        self.raw
            .next_entry()
            .map(|entry| unsafe { &*entry }.value.clone())
    }
}

impl<'a, K, V, S> IntoIterator for &'a HashMap<K, V, S>
where
    K: Hash + Eq + Clone + 'static,
    V: Clone + 'static,
    S: BuildHasher,
{
    type Item = (K, V);
    type IntoIter = Iter<'a, K, V, S>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Live view of a map's keys. Changes to the map are immediately visible
/// through the view, and removals through the view hit the map.
pub struct KeysView<'a, K, V, S = FixedState> {
    map: &'a HashMap<K, V, S>,
}

impl<'a, K, V, S> KeysView<'a, K, V, S>
where
    K: Hash + Eq + Clone + 'static,
    V: Clone + 'static,
    S: BuildHasher,
{
    pub(crate) fn new(map: &'a HashMap<K, V, S>) -> Self {
        Self { map }
    }

    /// Number of keys in the map.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if the map holds no entries.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Returns `true` if the key is present.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.contains_key(key)
    }

    /// Removes the key from the map. Returns `true` if it was present.
    pub fn remove<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.remove(key).is_some()
    }

    /// Empties the map.
    pub fn clear(&self) {
        self.map.clear();
    }

    /// An iterator over the keys.
    pub fn iter(&self) -> Keys<'a, K, V, S> {
        Keys::new(self.map)
    }
}

impl<'a, K, V, S> IntoIterator for &KeysView<'a, K, V, S>
where
    K: Hash + Eq + Clone + 'static,
    V: Clone + 'static,
    S: BuildHasher,
{
    type Item = K;
    type IntoIter = Keys<'a, K, V, S>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Live view of a map's values.
pub struct ValuesView<'a, K, V, S = FixedState> {
    map: &'a HashMap<K, V, S>,
}

impl<'a, K, V, S> ValuesView<'a, K, V, S>
where
    K: Hash + Eq + Clone + 'static,
    V: Clone + 'static,
    S: BuildHasher,
{
    pub(crate) fn new(map: &'a HashMap<K, V, S>) -> Self {
        Self { map }
    }

    /// Number of entries in the map.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if the map holds no entries.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Returns `true` if some live entry carries an equal value.
    pub fn contains(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.map.contains_value(value)
    }

    /// Removes the first live entry carrying an equal value. Returns
    /// `true` if one was found.
    pub fn remove(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        let mut raw = self.map.raw_iter();
        while let Some(entry) = raw.next_entry() {
            let entry = unsafe { &*entry };
            if !entry.is_deleted() && entry.value == *value {
                self.map.remove(&entry.key);
                return true;
            }
        }
        false
    }

    /// Empties the map.
    pub fn clear(&self) {
        self.map.clear();
    }

    /// An iterator over the values.
    pub fn iter(&self) -> Values<'a, K, V, S> {
        Values::new(self.map)
    }
}

impl<'a, K, V, S> IntoIterator for &ValuesView<'a, K, V, S>
where
    K: Hash + Eq + Clone + 'static,
    V: Clone + 'static,
    S: BuildHasher,
{
    type Item = V;
    type IntoIter = Values<'a, K, V, S>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Live view of a map's key/value pairs.
pub struct EntriesView<'a, K, V, S = FixedState> {
    map: &'a HashMap<K, V, S>,
}

impl<'a, K, V, S> EntriesView<'a, K, V, S>
where
    K: Hash + Eq + Clone + 'static,
    V: Clone + 'static,
    S: BuildHasher,
{
    pub(crate) fn new(map: &'a HashMap<K, V, S>) -> Self {
        Self { map }
    }

    /// Number of entries in the map.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if the map holds no entries.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Returns `true` if the key is currently mapped to an equal value.
    pub fn contains<Q>(&self, key: &Q, value: &V) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: PartialEq,
    {
        self.map.get(key).map_or(false, |current| current == *value)
    }

    /// Removes the pair only if the key currently maps to an equal value.
    pub fn remove<Q>(&self, key: &Q, value: &V) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: PartialEq,
    {
        self.map.remove_if_equals(key, value)
    }

    /// Empties the map.
    pub fn clear(&self) {
        self.map.clear();
    }

    /// An iterator over the pairs, yielding key/value clones.
    pub fn iter(&self) -> Iter<'a, K, V, S> {
        Iter::new(self.map)
    }
}

impl<'a, K, V, S> IntoIterator for &EntriesView<'a, K, V, S>
where
    K: Hash + Eq + Clone + 'static,
    V: Clone + 'static,
    S: BuildHasher,
{
    type Item = (K, V);
    type IntoIter = Iter<'a, K, V, S>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
