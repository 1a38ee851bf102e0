//! ChainedHashMap: map façade driving the entry log and bucket index in
//! lock-step, plus the doubling rehash policy.

use crate::bucket_index::BucketIndex;
use crate::entry_log::{Entry, EntryLog};
use crate::reentrancy::DebugReentrancy;
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use slotmap::DefaultKey;
use std::collections::hash_map::RandomState;

/// Stable handle to one map entry.
///
/// Wraps a generational slot key: it stays valid until its own entry is
/// erased or the map is cleared or dropped, regardless of inserts, erases,
/// and rehashes affecting other keys. Once its entry is gone the handle
/// resolves to `None`; it never aliases a later entry placed in the reused
/// slot.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct EntryRef(DefaultKey);

impl EntryRef {
    pub(crate) fn new(slot: DefaultKey) -> Self {
        EntryRef(slot)
    }

    pub fn key<'a, K, V, S>(&self, map: &'a ChainedHashMap<K, V, S>) -> Option<&'a K> {
        map.slot_key(self.0)
    }

    pub fn value<'a, K, V, S>(&self, map: &'a ChainedHashMap<K, V, S>) -> Option<&'a V> {
        map.slot_value(self.0)
    }

    pub fn value_mut<'a, K, V, S>(&self, map: &'a mut ChainedHashMap<K, V, S>) -> Option<&'a mut V> {
        map.slot_value_mut(self.0)
    }
}

/// Error returned by [`ChainedHashMap::at`] when the key is absent. The only
/// caller-visible failure in the crate; every other operation is total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutOfRange;

impl fmt::Display for OutOfRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("no entry for key")
    }
}

impl std::error::Error for OutOfRange {}

/// Hash map with chained collision resolution and stable entry handles.
///
/// Entries live in a slot arena (the entry log); an explicit bucket array of
/// chains indexes them by `cached_hash % capacity`. Capacity starts at 16
/// and doubles whenever an insert would reach load factor 1/2, so after
/// every completed operation `2 * len() < capacity()` holds. Capacity never
/// shrinks; erasing does not rehash.
pub struct ChainedHashMap<K, V, S = RandomState> {
    hasher: S,
    log: EntryLog<K, V>,
    index: BucketIndex,
    reentrancy: DebugReentrancy,
}

impl<K, V> ChainedHashMap<K, V>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self::with_hasher(Default::default())
    }
}

impl<K, V> Default for ChainedHashMap<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over immutable entries, in entry-log slot order.
pub struct Iter<'a, K, V> {
    it: slotmap::basic::Iter<'a, DefaultKey, Entry<K, V>>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (EntryRef, &'a K, &'a V);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it
            .next()
            .map(|(slot, e)| (EntryRef::new(slot), &e.key, &e.value))
    }
}

/// Iterator over entries with mutable value access, in entry-log slot order.
pub struct IterMut<'a, K, V> {
    it: slotmap::basic::IterMut<'a, DefaultKey, Entry<K, V>>,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (EntryRef, &'a K, &'a mut V);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it
            .next()
            .map(|(slot, e)| (EntryRef::new(slot), &e.key, &mut e.value))
    }
}

// Operations that never hash or compare keys.
impl<K, V, S> ChainedHashMap<K, V, S> {
    pub fn len(&self) -> usize {
        self.log.len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.is_empty()
    }

    /// Current bucket count. Always a power of two, at least 16, and more
    /// than twice `len()` outside a running insert.
    pub fn capacity(&self) -> usize {
        self.index.capacity()
    }

    /// The configured hashing strategy.
    pub fn hasher(&self) -> &S {
        &self.hasher
    }

    /// Drop every entry and reset capacity to its initial value.
    pub fn clear(&mut self) {
        let _g = self.reentrancy.enter();
        self.log.clear();
        self.index.reset();
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            it: self.log.iter(),
        }
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            it: self.log.iter_mut(),
        }
    }

    pub(crate) fn slot_key(&self, slot: DefaultKey) -> Option<&K> {
        let _g = self.reentrancy.enter();
        self.log.get(slot).map(|e| &e.key)
    }

    pub(crate) fn slot_value(&self, slot: DefaultKey) -> Option<&V> {
        let _g = self.reentrancy.enter();
        self.log.get(slot).map(|e| &e.value)
    }

    pub(crate) fn slot_value_mut(&mut self, slot: DefaultKey) -> Option<&mut V> {
        let _g = self.reentrancy.enter();
        self.log.get_mut(slot).map(|e| &mut e.value)
    }
}

impl<K, V, S> ChainedHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    pub fn with_hasher(hasher: S) -> Self {
        Self {
            hasher,
            log: EntryLog::new(),
            index: BucketIndex::new(),
            reentrancy: DebugReentrancy::new(),
        }
    }

    fn make_hash<Q>(&self, q: &Q) -> u64
    where
        Q: ?Sized + Hash,
    {
        self.hasher.hash_one(q)
    }

    fn find_slot<Q>(&self, hash: u64, q: &Q) -> Option<DefaultKey>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        self.index.find(hash, |slot| {
            self.log
                .get(slot)
                .map(|e| e.key.borrow() == q)
                .unwrap_or(false)
        })
    }

    // Load invariant: `2 * len < capacity` must hold when an insert returns.
    // Doubling once always restores it, since at most one entry was added
    // since the invariant last held. Takes the fields directly so callers
    // can invoke it while the reentrancy guard is live.
    fn rehash_if_needed(log: &EntryLog<K, V>, index: &mut BucketIndex) {
        if log.len() * 2 < index.capacity() {
            return;
        }
        let new_capacity = index.capacity() * 2;
        index.rebuild(new_capacity, log.hashes());
    }

    pub fn find<Q>(&self, q: &Q) -> Option<EntryRef>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter();
        let hash = self.make_hash(q);
        self.find_slot(hash, q).map(EntryRef::new)
    }

    pub fn contains_key<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter();
        let hash = self.make_hash(q);
        self.find_slot(hash, q).is_some()
    }

    /// Insert `(key, value)` and return a handle to the stored entry.
    ///
    /// Idempotent on duplicates: if `key` is already present the stored
    /// value is kept, `value` is dropped, and the existing entry's handle is
    /// returned. A fresh insert may double capacity before returning.
    pub fn insert(&mut self, key: K, value: V) -> EntryRef {
        let _g = self.reentrancy.enter();
        let hash = self.make_hash(&key);
        if let Some(slot) = self.find_slot(hash, &key) {
            return EntryRef::new(slot);
        }
        let slot = self.log.push(key, value, hash);
        self.index.insert(hash, slot);
        Self::rehash_if_needed(&self.log, &mut self.index);
        EntryRef::new(slot)
    }

    /// Remove the entry for `q`, returning its `(key, value)` pair, or
    /// `None` if the key is absent. Never shrinks capacity.
    pub fn erase<Q>(&mut self, q: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter();
        let hash = self.make_hash(q);
        let slot = self.find_slot(hash, q)?;
        let unlinked = self.index.remove(hash, slot);
        debug_assert!(unlinked, "indexed entry must be in its chain");
        let entry = self.log.remove(slot)?;
        Some((entry.key, entry.value))
    }

    /// Read-only value access. Fails with [`OutOfRange`] when `q` is absent.
    pub fn at<Q>(&self, q: &Q) -> Result<&V, OutOfRange>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter();
        let hash = self.make_hash(q);
        self.find_slot(hash, q)
            .and_then(|slot| self.log.get(slot))
            .map(|e| &e.value)
            .ok_or(OutOfRange)
    }

    /// Mutable value access by key, inserting `V::default()` first when the
    /// key is absent. Never fails. Single lookup: a miss registers the new
    /// entry directly instead of searching again.
    pub fn or_default(&mut self, key: K) -> &mut V
    where
        V: Default,
    {
        let _g = self.reentrancy.enter();
        let hash = self.make_hash(&key);
        let slot = match self.find_slot(hash, &key) {
            Some(slot) => slot,
            None => {
                let slot = self.log.push(key, V::default(), hash);
                self.index.insert(hash, slot);
                Self::rehash_if_needed(&self.log, &mut self.index);
                slot
            }
        };
        let entry = self.log.get_mut(slot).expect("indexed slot is live");
        &mut entry.value
    }
}

impl<K, V, S> Clone for ChainedHashMap<K, V, S>
where
    K: Clone,
    V: Clone,
    S: Clone,
{
    /// Deep, independent copy preserving the source's hasher and capacity.
    /// Entries are re-registered from their cached hashes, so `K: Hash` is
    /// not re-invoked; handles from the source do not resolve in the clone.
    fn clone(&self) -> Self {
        let mut log = EntryLog::new();
        let mut index = BucketIndex::with_capacity(self.index.capacity());
        for (_, e) in self.log.iter() {
            let slot = log.push(e.key.clone(), e.value.clone(), e.hash);
            index.insert(e.hash, slot);
        }
        Self {
            hasher: self.hasher.clone(),
            log,
            index,
            reentrancy: DebugReentrancy::new(),
        }
    }
}

impl<K, V, S> Extend<(K, V)> for ChainedHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            let _ = self.insert(key, value);
        }
    }
}

impl<K, V, S> FromIterator<(K, V)> for ChainedHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::with_hasher(S::default());
        map.extend(iter);
        map
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for ChainedHashMap<K, V>
where
    K: Eq + Hash,
{
    fn from(pairs: [(K, V); N]) -> Self {
        Self::from_iter(pairs)
    }
}
