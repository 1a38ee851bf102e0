//! chained-hashmap: a single-threaded hash map with chained collision
//! resolution, stable entry handles, and amortized-doubling growth.
//!
//! Internal design:
//!
//! Summary
//! - Goal: keep the two cooperating structures of a chained table in safe,
//!   independently checkable layers.
//! - Layers:
//!   - EntryLog<K, V>: slot arena owning every `(key, value)` entry plus its
//!     cached hash; generational slot keys give stable O(1) access that no
//!     mutation of other entries can invalidate.
//!   - BucketIndex: explicit array of chains, one per bucket, holding slot
//!     keys; bucket selection is `cached_hash % capacity`. Capacity starts
//!     at 16 and only ever doubles.
//!   - ChainedHashMap<K, V, S>: public façade updating both structures in
//!     lock-step and running the rehash policy: when an insert reaches load
//!     factor 1/2, capacity doubles and the index rebuilds over the full log
//!     before the call returns.
//!
//! Constraints
//! - Single-threaded: the map is `!Send`/`!Sync` by design.
//! - Reference stability: an [`EntryRef`] stays valid until its own entry is
//!   erased or the map is cleared or dropped; inserts, erasures, and rehashes
//!   of other keys never invalidate it. Stale handles miss rather than alias
//!   a reused slot.
//! - Idempotent insert: a duplicate key is a no-op that keeps the stored
//!   value; duplicate keys can never coexist.
//! - Capacity is monotonic: erasing never rehashes and nothing shrinks.
//!
//! Hasher and rehashing invariants
//! - Each entry caches its `u64` hash at insert and every index operation
//!   uses the cached hash; `K: Hash` is never invoked after insertion, so
//!   rehash and clone never call into user code.
//!
//! Error handling
//! - [`ChainedHashMap::at`] returns [`OutOfRange`] for a missing key; every
//!   other operation is total (duplicate insert and missing erase are silent
//!   no-ops, `or_default` inserts a default value on a miss).
//!
//! Reentrancy
//! - Probing runs user `Eq`/`Hash` code while the log and index may be out
//!   of step, so each public method holds a debug-only reentrancy guard;
//!   nested entry panics in debug builds and costs nothing in release.

mod bucket_index;
mod chained_hash_map;
mod chained_hash_map_proptest;
mod entry_log;
mod reentrancy;

// Public surface
pub use chained_hash_map::{ChainedHashMap, EntryRef, Iter, IterMut, OutOfRange};
