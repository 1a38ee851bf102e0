//! BucketIndex: chained bucket array mapping hashes to entry slots.

use slotmap::DefaultKey;

/// Bucket count every index starts from; all later capacities are reached by
/// doubling, so capacity stays a power of two.
pub(crate) const INITIAL_CAPACITY: usize = 16;

/// Array of chains, one per bucket. A chain holds the slot key of every live
/// entry whose cached hash lands in that bucket under the current capacity.
///
/// The index never owns entries and never compares keys itself; callers pass
/// an equality predicate over slot keys, so no user code runs here beyond
/// that closure.
#[derive(Debug)]
pub(crate) struct BucketIndex {
    chains: Vec<Vec<DefaultKey>>,
}

impl BucketIndex {
    pub(crate) fn new() -> Self {
        Self::with_capacity(INITIAL_CAPACITY)
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        debug_assert!(capacity.is_power_of_two());
        Self {
            chains: vec![Vec::new(); capacity],
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.chains.len()
    }

    fn bucket_of(&self, hash: u64) -> usize {
        (hash % self.chains.len() as u64) as usize
    }

    /// Scan the chain for `hash` and return the first slot `eq` accepts.
    /// Worst case O(chain length); expected O(1) under the load invariant.
    pub(crate) fn find(
        &self,
        hash: u64,
        mut eq: impl FnMut(DefaultKey) -> bool,
    ) -> Option<DefaultKey> {
        self.chains[self.bucket_of(hash)]
            .iter()
            .copied()
            .find(|&slot| eq(slot))
    }

    /// Register `slot` under `hash`. Caller guarantees no indexed entry holds
    /// an equal key.
    pub(crate) fn insert(&mut self, hash: u64, slot: DefaultKey) {
        let bucket = self.bucket_of(hash);
        self.chains[bucket].push(slot);
    }

    /// Unlink `slot` from the chain for `hash`. Returns whether it was found.
    pub(crate) fn remove(&mut self, hash: u64, slot: DefaultKey) -> bool {
        let bucket = self.bucket_of(hash);
        let chain = &mut self.chains[bucket];
        match chain.iter().position(|&s| s == slot) {
            Some(at) => {
                // Chain order carries no meaning, so O(1) removal is fine.
                chain.swap_remove(at);
                true
            }
            None => false,
        }
    }

    /// Discard every chain and re-bucket each `(slot, hash)` pair at
    /// `new_capacity`. The only bulk-rebuild path; used by rehash.
    pub(crate) fn rebuild(
        &mut self,
        new_capacity: usize,
        entries: impl Iterator<Item = (DefaultKey, u64)>,
    ) {
        debug_assert!(new_capacity.is_power_of_two());
        self.chains.clear();
        self.chains.resize(new_capacity, Vec::new());
        for (slot, hash) in entries {
            let bucket = self.bucket_of(hash);
            self.chains[bucket].push(slot);
        }
    }

    /// Back to the empty initial-capacity state.
    pub(crate) fn reset(&mut self) {
        self.chains.clear();
        self.chains.resize(INITIAL_CAPACITY, Vec::new());
    }
}
