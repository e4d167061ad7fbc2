#![cfg(test)]

// Property tests for PackedI64Map kept inside the crate, next to the
// engine, so they share its test helpers' view of the resize policy.

use crate::{
    I64Map, KeyNotFound, PackedI64Map, MAX_LOAD_FACTOR, MINIMUM_CAPACITY, MIN_LOAD_FACTOR,
};
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use std::collections::{BTreeMap, HashMap};
use std::hash::{BuildHasher, Hasher};

#[derive(Clone, Debug)]
enum Op {
    Insert(i64, i64),
    Remove(i64),
    Get(i64),
    Contains(i64),
    Iterate,
}

// Mostly a small key pool so removals and overwrites hit live keys, with
// the occasional arbitrary key for misses and extreme values.
fn arb_key() -> impl Strategy<Value = i64> {
    prop_oneof![
        8 => -40i64..40,
        1 => any::<i64>(),
    ]
}

fn arb_ops() -> impl Strategy<Value = Vec<Op>> {
    proptest::collection::vec(
        prop_oneof![
            4 => (arb_key(), any::<i64>()).prop_map(|(k, v)| Op::Insert(k, v)),
            3 => arb_key().prop_map(Op::Remove),
            2 => arb_key().prop_map(Op::Get),
            1 => arb_key().prop_map(Op::Contains),
            1 => Just(Op::Iterate),
        ],
        1..400,
    )
}

/// Hash strategy that ignores the key and always yields `H`.
#[derive(Clone, Default)]
struct ConstBuildHasher<const H: i64>;
struct ConstHasher<const H: i64>;
impl<const H: i64> BuildHasher for ConstBuildHasher<H> {
    type Hasher = ConstHasher<H>;
    fn build_hasher(&self) -> Self::Hasher {
        ConstHasher
    }
}
impl<const H: i64> Hasher for ConstHasher<H> {
    fn write(&mut self, _bytes: &[u8]) {}
    fn finish(&self) -> u64 {
        H as u64
    }
}

/// Structural invariants that must hold after every operation on a map that
/// started at `MINIMUM_CAPACITY`.
fn check_structure<S>(sut: &PackedI64Map<S>) -> Result<(), TestCaseError> {
    let capacity = sut.capacity();
    let used = sut.len() + sut.tombstones();
    prop_assert!(used <= capacity);
    prop_assert!(used as f64 <= capacity as f64 * MAX_LOAD_FACTOR);
    prop_assert!(capacity >= MINIMUM_CAPACITY);
    prop_assert_eq!(sut.storage_capacity(), capacity);
    // Either dense enough, or a shrink would not change the capacity.
    prop_assert!(
        sut.len() as f64 >= capacity as f64 * MIN_LOAD_FACTOR
            || capacity == (sut.len() * 2).max(MINIMUM_CAPACITY)
    );
    Ok(())
}

// State-machine equivalence against std::collections::HashMap, driven
// through the shared `I64Map` interface.
fn run_state_machine<S: BuildHasher>(
    mut sut: PackedI64Map<S>,
    ops: Vec<Op>,
) -> Result<(), TestCaseError> {
    let mut model: HashMap<i64, i64> = HashMap::new();

    for op in ops {
        match op {
            Op::Insert(k, v) => {
                prop_assert_eq!(
                    I64Map::insert(&mut sut, k, v),
                    I64Map::insert(&mut model, k, v)
                );
            }
            Op::Remove(k) => {
                let got = I64Map::remove(&mut sut, k);
                prop_assert_eq!(got, I64Map::remove(&mut model, k));
                if got.is_err() {
                    prop_assert_eq!(got, Err(KeyNotFound { key: k }));
                }
            }
            Op::Get(k) => {
                prop_assert_eq!(I64Map::get(&sut, k), I64Map::get(&model, k));
            }
            Op::Contains(k) => {
                prop_assert_eq!(sut.contains_key(k), model.contains_key(&k));
            }
            Op::Iterate => {
                let seen: BTreeMap<i64, i64> = sut.iter().collect();
                let expected: BTreeMap<i64, i64> =
                    model.iter().map(|(&k, &v)| (k, v)).collect();
                prop_assert_eq!(seen, expected);
            }
        }

        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
        check_structure(&sut)?;
    }

    // Draining leaves the table at its floor with no over-allocation.
    let keys: Vec<i64> = model.keys().copied().collect();
    for k in keys {
        prop_assert_eq!(sut.remove(k), Ok(model[&k]));
        check_structure(&sut)?;
    }
    prop_assert!(sut.is_empty());
    prop_assert_eq!(sut.capacity(), MINIMUM_CAPACITY);
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]

    #[test]
    fn prop_state_machine(ops in arb_ops()) {
        run_state_machine(PackedI64Map::new(), ops)?;
    }

    // Worst-case collisions: every key starts its probe at the same cell,
    // which stresses tombstone skipping along one long chain.
    #[test]
    fn prop_state_machine_with_collisions(ops in arb_ops()) {
        run_state_machine(PackedI64Map::with_hasher(ConstBuildHasher::<28>), ops)?;
    }

    // Same as above with a hash that reads as negative once signed.
    #[test]
    fn prop_state_machine_with_negative_hash(ops in arb_ops()) {
        run_state_machine(PackedI64Map::with_hasher(ConstBuildHasher::<{ -100 }>), ops)?;
    }
}
