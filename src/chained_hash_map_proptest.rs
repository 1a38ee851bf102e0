#![cfg(test)]

// Property tests for ChainedHashMap kept inside the crate so they can sit
// next to the implementation without feature gates.

use crate::{ChainedHashMap, EntryRef, OutOfRange};
use proptest::prelude::*;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::hash::{BuildHasher, Hasher};

// Key newtype with Borrow<str> to exercise borrowed lookup.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
struct Key(String);
impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
impl std::borrow::Borrow<str> for Key {
    fn borrow(&self) -> &str {
        &self.0
    }
}

// Pool-indexed operations for good shrinking: indices shrink toward earlier
// keys and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Insert(usize, i32),
    Erase(usize),
    Find(usize),
    Contains(String),
    OrDefaultAdd(usize, i32),
    At(usize),
    MutateViaHandle(usize, i32),
    Iterate,
    Clear,
}

fn key_from(pool: &[String], i: usize) -> Key {
    Key(pool[i].clone())
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    proptest::collection::vec("[a-z]{0,5}", 1..=8).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let contains_pool = proptest::sample::select(pool.clone());
        let op = prop_oneof![
            4 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Insert(i, v)),
            3 => idx.clone().prop_map(OpI::Erase),
            2 => idx.clone().prop_map(OpI::Find),
            2 => prop_oneof![
                contains_pool.prop_map(|s: String| s),
                "[a-z]{0,5}".prop_map(|s| s)
            ]
            .prop_map(OpI::Contains),
            2 => (idx.clone(), any::<i32>()).prop_map(|(i, d)| OpI::OrDefaultAdd(i, d)),
            2 => idx.clone().prop_map(OpI::At),
            2 => (idx.clone(), any::<i32>()).prop_map(|(i, d)| OpI::MutateViaHandle(i, d)),
            1 => Just(OpI::Iterate),
            1 => Just(OpI::Clear),
        ];
        proptest::collection::vec(op, 1..80).prop_map(move |ops| (pool.clone(), ops))
    })
}

// State-machine equivalence against std::collections::HashMap, checked
// after every op:
// - insert is idempotent and returns the existing handle on a duplicate;
// - erase returns the removed pair exactly when the model holds the key;
// - find/contains/at agree with the model; live handles stay stable and
//   stale handles (erased or cleared) never resolve;
// - or_default creates a zero value on a miss and aliases the entry on a hit;
// - size parity, the load invariant `2 * len < capacity`, and power-of-two
//   capacity hold throughout; clear resets capacity to 16.
fn run_scenario<S>(pool: Vec<String>, ops: Vec<OpI>) -> Result<(), TestCaseError>
where
    S: BuildHasher + Default,
{
    let mut sut: ChainedHashMap<Key, i32, S> = ChainedHashMap::with_hasher(S::default());
    let mut model: HashMap<Key, i32> = HashMap::new();
    let mut live: HashMap<Key, EntryRef> = HashMap::new();
    let mut stale: Vec<EntryRef> = Vec::new();

    for op in ops {
        match op {
            OpI::Insert(i, v) => {
                let k = key_from(&pool, i);
                let already = model.contains_key(&k);
                let h = sut.insert(k.clone(), v);
                if already {
                    // Idempotent: stored value untouched, same handle back.
                    prop_assert_eq!(Some(&h), live.get(&k));
                    prop_assert_eq!(h.value(&sut), model.get(&k));
                } else {
                    let prev = live.insert(k.clone(), h);
                    prop_assert!(prev.is_none());
                    model.insert(k, v);
                }
            }
            OpI::Erase(i) => {
                let k = key_from(&pool, i);
                match sut.erase(&k) {
                    Some((kk, vv)) => {
                        prop_assert!(kk == k);
                        let mv = model.remove(&kk);
                        prop_assert_eq!(Some(vv), mv);
                        let h = live.remove(&k).expect("live handle tracked");
                        stale.push(h);
                    }
                    None => {
                        prop_assert!(!model.contains_key(&k));
                    }
                }
            }
            OpI::Find(i) => {
                let k = key_from(&pool, i);
                let found = sut.find(&k);
                prop_assert_eq!(found.is_some(), model.contains_key(&k));
                if let Some(h) = found {
                    prop_assert_eq!(Some(&h), live.get(&k));
                    prop_assert_eq!(h.key(&sut), Some(&k));
                }
            }
            OpI::Contains(s) => {
                let has = sut.contains_key(s.as_str());
                let has_model = model.keys().any(|k| k.0 == s);
                prop_assert_eq!(has, has_model);
            }
            OpI::OrDefaultAdd(i, d) => {
                let k = key_from(&pool, i);
                let was_present = model.contains_key(&k);
                let v = sut.or_default(k.clone());
                if !was_present {
                    prop_assert_eq!(*v, 0, "miss must insert the default value");
                }
                *v = v.saturating_add(d);
                let mv = model.entry(k.clone()).or_insert(0);
                *mv = mv.saturating_add(d);
                let h = sut.find(&k).expect("entry exists after or_default");
                if was_present {
                    prop_assert_eq!(Some(&h), live.get(&k));
                } else {
                    live.insert(k, h);
                }
            }
            OpI::At(i) => {
                let k = key_from(&pool, i);
                match model.get(&k) {
                    Some(v) => prop_assert_eq!(sut.at(&k), Ok(v)),
                    None => prop_assert_eq!(sut.at(&k), Err(OutOfRange)),
                }
            }
            OpI::MutateViaHandle(i, d) => {
                let k = key_from(&pool, i);
                if let Some(&h) = live.get(&k) {
                    let vr = h.value_mut(&mut sut).expect("live handle resolves");
                    *vr = vr.saturating_add(d);
                    let mv = model.get_mut(&k).expect("present in model");
                    *mv = mv.saturating_add(d);
                }
            }
            OpI::Iterate => {
                let s_pairs: BTreeSet<(Key, i32)> =
                    sut.iter().map(|(_, k, v)| (k.clone(), *v)).collect();
                let m_pairs: BTreeSet<(Key, i32)> =
                    model.iter().map(|(k, v)| (k.clone(), *v)).collect();
                prop_assert_eq!(s_pairs, m_pairs);
            }
            OpI::Clear => {
                sut.clear();
                model.clear();
                stale.extend(live.drain().map(|(_, h)| h));
                prop_assert_eq!(sut.capacity(), 16, "clear must reset capacity");
            }
        }

        // Post-conditions after each op.
        for &h in &stale {
            prop_assert!(h.value(&sut).is_none(), "stale handle must not resolve");
        }
        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
        prop_assert!(
            2 * sut.len() < sut.capacity(),
            "load invariant violated: len={} capacity={}",
            sut.len(),
            sut.capacity()
        );
        prop_assert!(sut.capacity().is_power_of_two() && sut.capacity() >= 16);
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        run_scenario::<std::collections::hash_map::RandomState>(pool, ops)?;
    }
}

// Constant hasher: every key lands in one chain, stressing equality probing
// and chain removal under worst-case collisions.
#[derive(Clone, Default)]
struct ConstBuildHasher;
struct ConstHasher;
impl BuildHasher for ConstBuildHasher {
    type Hasher = ConstHasher;
    fn build_hasher(&self) -> Self::Hasher {
        ConstHasher
    }
}
impl Hasher for ConstHasher {
    fn write(&mut self, _bytes: &[u8]) {}
    fn finish(&self) -> u64 {
        0
    }
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario()) {
        run_scenario::<ConstBuildHasher>(pool, ops)?;
    }
}
