//! Lock-free hash map core: entries, bucket tables, and the CAS protocols
//! for insertion, lookup, removal and resizing.

use std::borrow::Borrow;
use std::hash::{BuildHasher, Hash};
use std::sync::atomic::{AtomicBool, AtomicIsize, AtomicU32, AtomicUsize, Ordering};

use crossbeam_epoch::{self as epoch, Atomic, Guard, Owned, Shared};
use foldhash::fast::FixedState;

use crate::iter::{EntriesView, Iter, KeysView, RawIter, ValuesView};

/// Smallest bucket-array length the map will allocate.
pub const MINIMAL_CAPACITY: usize = 16;

/// Lower clamp for the resize factor.
pub const MINIMAL_LOAD_FACTOR: f32 = 0.5;

/// Bucket-array length used by [`HashMap::new`].
pub const DEFAULT_INITIAL_CAPACITY: usize = 128;

/// Fraction of the capacity at which the table doubles.
pub const DEFAULT_LOAD_FACTOR: f32 = 0.65;

/// Preallocated capacity for maps expected to hold millions of entries;
/// pass it to [`HashMap::with_capacity`] to avoid growth entirely.
pub const LARGE_INITIAL_CAPACITY: usize = 4_194_304;

/// Exponential backoff for contended CAS loops, capped at 64 spins.
struct Backoff {
    step: u32,
}

impl Backoff {
    #[inline(always)]
    fn new() -> Self {
        Self { step: 0 }
    }

    #[inline(always)]
    fn spin(&mut self) {
        for _ in 0..(1 << self.step.min(6)) {
            std::hint::spin_loop();
        }
        if self.step <= 6 {
            self.step += 1;
        }
    }
}

/// Avalanche transform (Wang/Jenkins) over the folded 64-bit hash.
///
/// The result is masked to 31 bits so it stays non-negative under any
/// later signed arithmetic; table lengths are powers of two, so the low
/// bits index the bucket.
#[inline]
pub(crate) fn mix(hash: u64) -> u32 {
    let mut h = ((hash >> 32) ^ hash) as u32;
    h = h.wrapping_add((h << 15) ^ 0xffff_cd7d);
    h ^= h >> 10;
    h = h.wrapping_add(h << 3);
    h ^= h >> 6;
    h = h.wrapping_add((h << 2).wrapping_add(h << 14));
    h ^= h >> 16;
    h & 0x7fff_ffff
}

/// Chain node. `hash`, `key` and `value` never change after publication;
/// replacing a value allocates a fresh entry and tombstones this one, so a
/// reader always observes at least one live copy of a key being replaced.
pub(crate) struct Entry<K, V> {
    pub(crate) hash: u32,
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) next: Atomic<Entry<K, V>>,
    deleted: AtomicBool,
}

impl<K, V> Entry<K, V> {
    fn new(hash: u32, key: K, value: V) -> Self {
        Self {
            hash,
            key,
            value,
            next: Atomic::null(),
            deleted: AtomicBool::new(false),
        }
    }

    #[inline]
    pub(crate) fn is_deleted(&self) -> bool {
        self.deleted.load(Ordering::Acquire)
    }

    /// Tombstone this entry. `false` means another thread got there first.
    #[inline]
    fn mark_deleted(&self) -> bool {
        self.deleted
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

/// A fixed-length, power-of-two array of chain heads.
pub(crate) struct Table<K, V> {
    buckets: Box<[Atomic<Entry<K, V>>]>,
}

impl<K, V> Table<K, V> {
    fn new(capacity: usize) -> Self {
        let mut buckets = Vec::with_capacity(capacity);
        for _ in 0..capacity {
            buckets.push(Atomic::null());
        }
        Self {
            buckets: buckets.into_boxed_slice(),
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.buckets.len()
    }

    #[inline]
    pub(crate) fn bucket(&self, index: usize) -> &Atomic<Entry<K, V>> {
        unsafe { self.buckets.get_unchecked(index) }
    }

    #[inline]
    pub(crate) fn index(&self, hash: u32) -> usize {
        (hash as usize) & (self.buckets.len() - 1)
    }
}

impl<K, V> Drop for Table<K, V> {
    fn drop(&mut self) {
        // Entries unlinked during operation were retired individually;
        // whatever is still chained belongs to this table alone.
        unsafe {
            let guard = epoch::unprotected();
            for bucket in self.buckets.iter() {
                let mut current = bucket.load(Ordering::Relaxed, guard);
                while let Some(entry) = current.as_ref() {
                    let next = entry.next.load(Ordering::Relaxed, guard);
                    drop(current.into_owned());
                    current = next;
                }
            }
        }
    }
}

/// A lock-free concurrent hash map with transparent dynamic resizing.
///
/// By default the map starts with a capacity of 128 buckets and doubles
/// once it holds 65% of its capacity. Growth is performed by exactly one
/// thread at a time while readers and other writers proceed; see
/// [`HashMap::with_options`] to tune or disable it.
///
/// All operations take `&self`; share the map behind an `Arc` to use it
/// from several threads.
pub struct HashMap<K, V, S = FixedState> {
    data: Atomic<Table<K, V>>,
    data_new: Atomic<Table<K, V>>,
    count: AtomicIsize,
    resize_lock: AtomicU32,
    resize_threshold: AtomicUsize,
    initial_capacity: usize,
    load_factor: f32,
    resizable: bool,
    hasher: S,
}

impl<K, V> HashMap<K, V, FixedState>
where
    K: Hash + Eq + Clone + 'static,
    V: Clone + 'static,
{
    /// Creates a map with default capacity and resize factor.
    pub fn new() -> Self {
        Self::with_options(DEFAULT_INITIAL_CAPACITY, DEFAULT_LOAD_FACTOR, true)
    }

    /// Creates a map with the given capacity, rounded up to a power of two.
    pub fn with_capacity(initial_capacity: usize) -> Self {
        Self::with_options(initial_capacity, DEFAULT_LOAD_FACTOR, true)
    }

    /// Creates a map with the given capacity and resize factor; pass
    /// `resizable = false` to pin the table to its initial capacity.
    pub fn with_options(initial_capacity: usize, load_factor: f32, resizable: bool) -> Self {
        Self::with_options_and_hasher(initial_capacity, load_factor, resizable, FixedState::default())
    }
}

impl<K, V> Default for HashMap<K, V, FixedState>
where
    K: Hash + Eq + Clone + 'static,
    V: Clone + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> HashMap<K, V, S>
where
    K: Hash + Eq + Clone + 'static,
    V: Clone + 'static,
    S: BuildHasher,
{
    /// Creates a map with default options and a custom hasher.
    pub fn with_hasher(hasher: S) -> Self {
        Self::with_options_and_hasher(DEFAULT_INITIAL_CAPACITY, DEFAULT_LOAD_FACTOR, true, hasher)
    }

    /// Creates a map with full control over capacity, resize factor,
    /// resizability and hashing.
    ///
    /// The capacity is rounded up to the next power of two with a floor of
    /// [`MINIMAL_CAPACITY`]; resize factors outside `[0.5, 1.0]` fall back
    /// to [`MINIMAL_LOAD_FACTOR`].
    pub fn with_options_and_hasher(
        initial_capacity: usize,
        load_factor: f32,
        resizable: bool,
        hasher: S,
    ) -> Self {
        let mut capacity = MINIMAL_CAPACITY;
        while capacity < initial_capacity {
            capacity <<= 1;
        }
        let load_factor = if (MINIMAL_LOAD_FACTOR..=1.0).contains(&load_factor) {
            load_factor
        } else {
            MINIMAL_LOAD_FACTOR
        };

        Self {
            data: Atomic::new(Table::new(capacity)),
            data_new: Atomic::null(),
            count: AtomicIsize::new(0),
            resize_lock: AtomicU32::new(0),
            resize_threshold: AtomicUsize::new((capacity as f32 * load_factor) as usize),
            initial_capacity: capacity,
            load_factor,
            resizable,
            hasher,
        }
    }

    #[inline]
    fn hash_of<Q>(&self, key: &Q) -> u32
    where
        Q: Hash + ?Sized,
    {
        mix(self.hasher.hash_one(key))
    }

    /// Looks up a value. Returns a clone of the first live entry matching
    /// the key, or `None`.
    ///
    /// While a resize is in flight the lookup probes the target table, the
    /// source table, and the target once more, so a key whose migration
    /// straddles the commit is still found.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = self.hash_of(key);
        let guard = epoch::pin();

        let data_new = self.data_new.load(Ordering::Acquire, &guard);
        let mut resizing = !data_new.is_null() && self.resize_lock.load(Ordering::Acquire) == 1;
        let mut table = if resizing {
            data_new
        } else {
            self.data.load(Ordering::Acquire, &guard)
        };

        for probe in 0..3 {
            let table_ref = unsafe { table.deref() };
            let mut current = table_ref
                .bucket(table_ref.index(hash))
                .load(Ordering::Acquire, &guard);
            while let Some(entry) = unsafe { current.as_ref() } {
                if !entry.is_deleted() && entry.hash == hash && entry.key.borrow() == key {
                    return Some(entry.value.clone());
                }
                current = entry.next.load(Ordering::Acquire, &guard);
            }

            if !resizing {
                return None;
            } else if probe == 0 {
                table = self.data.load(Ordering::Acquire, &guard);
            } else if probe == 1 {
                let data_new = self.data_new.load(Ordering::Acquire, &guard);
                table = if data_new.is_null() {
                    self.data.load(Ordering::Acquire, &guard)
                } else {
                    data_new
                };
                resizing = false;
            }
        }
        None
    }

    /// Returns `true` if the key is present.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get(key).is_some()
    }

    /// Scans every chain for a live entry carrying an equal value.
    pub fn contains_value(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        let guard = epoch::pin();
        let table = unsafe { self.data.load(Ordering::Acquire, &guard).deref() };
        for i in 0..table.len() {
            let mut current = table.bucket(i).load(Ordering::Acquire, &guard);
            while let Some(entry) = unsafe { current.as_ref() } {
                if !entry.is_deleted() && entry.value == *value {
                    return true;
                }
                current = entry.next.load(Ordering::Acquire, &guard);
            }
        }
        false
    }

    /// Inserts a key/value pair, replacing and returning any previous
    /// value for the key.
    pub fn insert(&self, key: K, value: V) -> Option<V> {
        let guard = epoch::pin();
        let hash = self.hash_of(&key);
        let entry = Box::into_raw(Box::new(Entry::new(hash, key, value)));
        self.do_insert(&guard, hash, entry, false, false, None, false)
    }

    /// Inserts only if the key is absent. Returns the existing value when
    /// there is one, leaving the map unchanged.
    pub fn insert_if_absent(&self, key: K, value: V) -> Option<V> {
        let guard = epoch::pin();
        let hash = self.hash_of(&key);
        let entry = Box::into_raw(Box::new(Entry::new(hash, key, value)));
        self.do_insert(&guard, hash, entry, true, false, None, false)
    }

    /// Inserts every pair from the iterator. The pairs are inserted one by
    /// one; the bulk operation is not atomic.
    pub fn insert_all<I>(&self, entries: I)
    where
        I: IntoIterator<Item = (K, V)>,
    {
        for (key, value) in entries {
            self.insert(key, value);
        }
    }

    /// Replaces the value of an existing key, returning the previous
    /// value; absent keys are left absent.
    pub fn replace(&self, key: K, value: V) -> Option<V> {
        let guard = epoch::pin();
        let hash = self.hash_of(&key);
        let entry = Box::into_raw(Box::new(Entry::new(hash, key, value)));
        self.do_insert(&guard, hash, entry, false, true, None, false)
    }

    /// Replaces the value of `key` with `value` only if the current value
    /// equals `expected`. Returns `true` if the replacement happened.
    pub fn replace_if_equals(&self, key: K, expected: &V, value: V) -> bool
    where
        V: PartialEq,
    {
        let guard = epoch::pin();
        let hash = self.hash_of(&key);
        let entry = Box::into_raw(Box::new(Entry::new(hash, key, value)));
        let matches = |current: &V| *current == *expected;
        self.do_insert(&guard, hash, entry, false, true, Some(&matches), false)
            .map_or(false, |previous| previous == *expected)
    }

    /// Single CAS protocol behind the whole insert family.
    ///
    /// Walks the selected table's bucket in three phases: claim or clean
    /// the head, walk the chain (compacting tombstones on the way) and
    /// append at the tail, then tombstone the superseded entry. The new
    /// entry is always published before the old one is deleted.
    ///
    /// Takes ownership of `new_entry` and frees it on every path that does
    /// not publish it.
    fn do_insert(
        &self,
        guard: &Guard,
        hash: u32,
        new_entry: *mut Entry<K, V>,
        only_if_absent: bool,
        only_replace: bool,
        expected: Option<&dyn Fn(&V) -> bool>,
        is_resize: bool,
    ) -> Option<V> {
        if self.resizable {
            self.check_resize(guard);
        }

        // Writers land in the resize target while a migration is running.
        let data_new = self.data_new.load(Ordering::Acquire, guard);
        let table = if !data_new.is_null() && self.resize_lock.load(Ordering::Acquire) == 1 {
            data_new
        } else {
            self.data.load(Ordering::Acquire, guard)
        };
        let table = unsafe { table.deref() };
        let bucket = table.bucket(table.index(hash));

        let new_shared = Shared::from(new_entry as *const Entry<K, V>);
        let new_ref = unsafe { &*new_entry };
        let mut backoff = Backoff::new();
        let mut old_entry: Option<&Entry<K, V>> = None;

        // Phase 1: the bucket head.
        let mut current;
        loop {
            current = bucket.load(Ordering::Acquire, guard);
            let Some(mut head) = (unsafe { current.as_ref() }) else {
                if only_replace {
                    // Nothing to replace in an empty bucket.
                    drop(unsafe { Box::from_raw(new_entry) });
                    return None;
                }
                if bucket
                    .compare_exchange(
                        Shared::null(),
                        new_shared,
                        Ordering::Release,
                        Ordering::Relaxed,
                        guard,
                    )
                    .is_err()
                {
                    backoff.spin();
                    continue;
                }
                if !is_resize {
                    self.count.fetch_add(1, Ordering::AcqRel);
                }
                return None;
            };

            if head.is_deleted() {
                let next = head.next.load(Ordering::Acquire, guard);
                if next.is_null() {
                    // Lone tombstone: take its slot.
                    if bucket
                        .compare_exchange(
                            current,
                            new_shared,
                            Ordering::Release,
                            Ordering::Relaxed,
                            guard,
                        )
                        .is_err()
                    {
                        backoff.spin();
                        continue;
                    }
                    unsafe { guard.defer_destroy(current) };
                    if !is_resize {
                        self.count.fetch_add(1, Ordering::AcqRel);
                    }
                    return None;
                }
                // Unlink the dead head and continue from its successor.
                if bucket
                    .compare_exchange(current, next, Ordering::Release, Ordering::Relaxed, guard)
                    .is_err()
                {
                    backoff.spin();
                    continue;
                }
                unsafe { guard.defer_destroy(current) };
                current = next;
                head = unsafe { next.deref() };
            }

            if !head.is_deleted() && head.hash == hash && head.key == new_ref.key {
                old_entry = Some(head);
                if only_if_absent || expected.map_or(false, |eq| !eq(&head.value)) {
                    let previous = head.value.clone();
                    drop(unsafe { Box::from_raw(new_entry) });
                    return Some(previous);
                }
            }
            break;
        }

        // Phase 2: the chain.
        let mut current_ref = unsafe { current.deref() };
        let mut published = false;
        loop {
            let next = current_ref.next.load(Ordering::Acquire, guard);
            let Some(next_ref) = (unsafe { next.as_ref() }) else {
                if !only_replace || old_entry.is_some() {
                    match current_ref.next.compare_exchange(
                        Shared::null(),
                        new_shared,
                        Ordering::Release,
                        Ordering::Relaxed,
                        guard,
                    ) {
                        Ok(_) => {
                            if old_entry.is_none() && !is_resize {
                                self.count.fetch_add(1, Ordering::AcqRel);
                            }
                            published = true;
                            break;
                        }
                        Err(_) => {
                            backoff.spin();
                            continue;
                        }
                    }
                }
                break;
            };

            let prev = current_ref;
            current = next;
            current_ref = next_ref;
            if current_ref.is_deleted() {
                // Compact in passing; a lost race here is fine, somebody
                // else unlinked it.
                let after = current_ref.next.load(Ordering::Acquire, guard);
                if !after.is_null()
                    && prev
                        .next
                        .compare_exchange(current, after, Ordering::Release, Ordering::Relaxed, guard)
                        .is_ok()
                {
                    unsafe { guard.defer_destroy(current) };
                }
            } else if current_ref.hash == hash && current_ref.key == new_ref.key {
                old_entry = Some(current_ref);
                if only_if_absent || expected.map_or(false, |eq| !eq(&current_ref.value)) {
                    let previous = current_ref.value.clone();
                    drop(unsafe { Box::from_raw(new_entry) });
                    return Some(previous);
                }
            }
        }

        if !published {
            drop(unsafe { Box::from_raw(new_entry) });
        }

        // Phase 3: tombstone the superseded entry.
        if let Some(old) = old_entry {
            let previous = old.value.clone();
            // A lost race means another thread already deleted it.
            old.mark_deleted();
            return Some(previous);
        }
        None
    }

    /// Removes a key, returning its value.
    pub fn remove<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = self.hash_of(key);
        let guard = epoch::pin();
        self.do_remove(&guard, hash, key, None)
    }

    /// Removes a key only if its current value equals `value`. Returns
    /// `true` if the entry was removed.
    pub fn remove_if_equals<Q>(&self, key: &Q, value: &V) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: PartialEq,
    {
        let hash = self.hash_of(key);
        let guard = epoch::pin();
        let matches = |current: &V| *current == *value;
        self.do_remove(&guard, hash, key, Some(&matches)).is_some()
    }

    /// Tombstones the first live match in the current `data` chain.
    /// Removal never consults the resize target, so a remove racing the
    /// migration of its key can miss; callers that mix removes with
    /// growth-heavy workloads should expect that window.
    fn do_remove<Q>(
        &self,
        guard: &Guard,
        hash: u32,
        key: &Q,
        expected: Option<&dyn Fn(&V) -> bool>,
    ) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        let table = unsafe { self.data.load(Ordering::Acquire, guard).deref() };
        let mut current = table
            .bucket(table.index(hash))
            .load(Ordering::Acquire, guard);

        while let Some(entry) = unsafe { current.as_ref() } {
            if !entry.is_deleted()
                && entry.hash == hash
                && entry.key.borrow() == key
                && expected.map_or(true, |eq| eq(&entry.value))
            {
                if entry.mark_deleted() {
                    self.count.fetch_sub(1, Ordering::AcqRel);
                    return Some(entry.value.clone());
                }
                // Lost the race to another remover.
                return None;
            }
            current = entry.next.load(Ordering::Acquire, guard);
        }
        None
    }

    /// Number of entries in the map. Approximate while writers are active;
    /// exact in a quiescent state.
    pub fn len(&self) -> usize {
        self.count.load(Ordering::Acquire).max(0) as usize
    }

    /// Returns `true` if the map holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of insertions left before the next resize; zero once the
    /// threshold is reached.
    pub fn next_resize(&self) -> usize {
        let remaining = self.resize_threshold.load(Ordering::Acquire) as isize
            - self.count.load(Ordering::Acquire);
        remaining.max(0) as usize
    }

    /// Current bucket-array length.
    pub fn capacity(&self) -> usize {
        let guard = epoch::pin();
        unsafe { self.data.load(Ordering::Acquire, &guard).deref() }.len()
    }

    /// The hasher the map was built with.
    pub fn hasher(&self) -> &S {
        &self.hasher
    }

    /// Doubles the table once the threshold is reached. Exactly one thread
    /// migrates; losers of the flag race carry on with their own write.
    fn check_resize(&self, guard: &Guard) {
        if (self.resize_threshold.load(Ordering::Acquire) as isize)
            > self.count.load(Ordering::Acquire)
        {
            return;
        }
        if self.resize_lock.load(Ordering::Acquire) != 0 {
            return;
        }
        if self
            .resize_lock
            .compare_exchange(0, 1, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return;
        }
        // Somebody may have finished growing while we raced for the flag.
        if (self.resize_threshold.load(Ordering::Acquire) as isize)
            > self.count.load(Ordering::Acquire)
        {
            self.resize_lock.store(0, Ordering::Release);
            return;
        }

        let old = self.data.load(Ordering::Acquire, guard);
        let old_ref = unsafe { old.deref() };
        let new_capacity = old_ref.len() * 2;
        self.resize_threshold.store(
            (new_capacity as f32 * self.load_factor) as usize,
            Ordering::Release,
        );
        let new_table = Owned::new(Table::new(new_capacity)).into_shared(guard);
        self.data_new.store(new_table, Ordering::Release);

        // Migrate: copy each entry into the target, then tombstone the
        // source copy so late readers of the old table skip it. Keys that
        // raced ahead into the target win; the absent-only insert leaves
        // them alone.
        let mut entries = self.raw_iter();
        while let Some(entry) = entries.next_entry() {
            let entry = unsafe { &*entry };
            let copy = Box::into_raw(Box::new(Entry::new(
                entry.hash,
                entry.key.clone(),
                entry.value.clone(),
            )));
            self.do_insert(guard, entry.hash, copy, true, false, None, true);
            entry.mark_deleted();
        }

        self.data.store(new_table, Ordering::Release);
        // Readers pinned before the swing may still traverse the old
        // table; free it once they are gone.
        unsafe { guard.defer_destroy(old) };
        self.resize_lock.store(0, Ordering::Release);
    }

    /// Empties the map and resets the table to its initial capacity.
    ///
    /// Not atomic with respect to concurrent writers: insertions in flight
    /// may survive into the fresh table or be dropped with the old one.
    /// Must not run concurrently with a resize.
    pub fn clear(&self) {
        let guard = epoch::pin();
        let fresh = Owned::new(Table::new(self.initial_capacity)).into_shared(&guard);
        let old = self.data.swap(fresh, Ordering::AcqRel, &guard);
        let old_target = self.data_new.swap(Shared::null(), Ordering::AcqRel, &guard);
        unsafe {
            if !old.is_null() {
                guard.defer_destroy(old);
            }
            if !old_target.is_null() && old_target.as_raw() != old.as_raw() {
                guard.defer_destroy(old_target);
            }
        }
        let snapshot = self.count.load(Ordering::Acquire);
        self.count.fetch_sub(snapshot, Ordering::AcqRel);
    }

    /// An iterator over the entries, yielding key/value clones.
    ///
    /// The iteration is weakly consistent: it binds to the table observed
    /// at creation, never blocks writers, and reflects concurrent updates
    /// only partially.
    pub fn iter(&self) -> Iter<'_, K, V, S> {
        Iter::new(self)
    }

    /// A live view of the keys.
    pub fn keys(&self) -> KeysView<'_, K, V, S> {
        KeysView::new(self)
    }

    /// A live view of the values.
    pub fn values(&self) -> ValuesView<'_, K, V, S> {
        ValuesView::new(self)
    }

    /// A live view of the key/value pairs.
    pub fn entries(&self) -> EntriesView<'_, K, V, S> {
        EntriesView::new(self)
    }

    pub(crate) fn raw_iter(&self) -> RawIter<K, V> {
        RawIter::new(&self.data)
    }
}

impl<K, V, S> Drop for HashMap<K, V, S> {
    fn drop(&mut self) {
        unsafe {
            let guard = epoch::unprotected();
            let data = self.data.load(Ordering::Relaxed, guard);
            let data_new = self.data_new.load(Ordering::Relaxed, guard);
            // After a completed resize both fields alias the same table.
            if !data_new.is_null() && data_new.as_raw() != data.as_raw() {
                drop(data_new.into_owned());
            }
            if !data.is_null() {
                drop(data.into_owned());
            }
        }
    }
}
