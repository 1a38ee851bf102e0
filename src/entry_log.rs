//! EntryLog: slot arena owning every map entry.

use slotmap::{DefaultKey, SlotMap};

/// One stored entry. The key is fixed at creation; the value may be mutated
/// in place. `hash` is computed once when the entry is created, so index
/// rebuilds never call back into the user's `Hash` impl.
#[derive(Debug)]
pub(crate) struct Entry<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) hash: u64,
}

/// Ordered arena of entries behind generational slot keys.
///
/// Appending or removing one entry never moves or invalidates another, which
/// is the stability contract the bucket index and all `EntryRef` handles rely
/// on. A removed slot may later be reused, but only under a bumped
/// generation, so a stale key misses instead of aliasing the new occupant.
#[derive(Debug)]
pub(crate) struct EntryLog<K, V> {
    slots: SlotMap<DefaultKey, Entry<K, V>>,
}

impl<K, V> EntryLog<K, V> {
    pub(crate) fn new() -> Self {
        Self {
            slots: SlotMap::with_key(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Append an entry. Caller guarantees no live entry holds an equal key.
    pub(crate) fn push(&mut self, key: K, value: V, hash: u64) -> DefaultKey {
        self.slots.insert(Entry { key, value, hash })
    }

    pub(crate) fn remove(&mut self, slot: DefaultKey) -> Option<Entry<K, V>> {
        self.slots.remove(slot)
    }

    pub(crate) fn get(&self, slot: DefaultKey) -> Option<&Entry<K, V>> {
        self.slots.get(slot)
    }

    pub(crate) fn get_mut(&mut self, slot: DefaultKey) -> Option<&mut Entry<K, V>> {
        self.slots.get_mut(slot)
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
    }

    pub(crate) fn iter(&self) -> slotmap::basic::Iter<'_, DefaultKey, Entry<K, V>> {
        self.slots.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> slotmap::basic::IterMut<'_, DefaultKey, Entry<K, V>> {
        self.slots.iter_mut()
    }

    /// Slot and cached hash of every live entry, for index rebuilds.
    pub(crate) fn hashes(&self) -> impl Iterator<Item = (DefaultKey, u64)> + '_ {
        self.slots.iter().map(|(slot, e)| (slot, e.hash))
    }
}
