//! packed-i64-map: a single-threaded `i64 -> i64` hash map tuned for a
//! small, predictable memory footprint.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: hold millions of integer mappings at close to the 16 payload
//!   bytes per entry, without per-entry allocations or pointers.
//! - Layers:
//!   - `cell`: codec for one fixed-width slot (1 header byte, 8 key bytes,
//!     8 value bytes, little-endian, unpadded) inside a shared `[u8]`.
//!   - `PackedI64Map<S>`: open addressing with linear probing over one
//!     contiguous buffer of cells, plus the grow/shrink policy.
//!
//! Constraints
//! - Single-threaded: `!Send`/`!Sync` (via the reentrancy guard marker).
//! - Keys and values are plain `i64`; no generic key/value types.
//! - Capacity never drops below `MINIMUM_CAPACITY` once a rebuild happens.
//! - Every rebuild allocates a buffer of exactly `capacity * CELL_SIZE`
//!   bytes; the old buffer is dropped as a whole.
//!
//! Probing and tombstones
//! - The start cell is `hash(key) mod capacity`, with the hash read as a
//!   signed integer and the remainder normalised to be non-negative.
//! - A probe stops at the first `Empty` cell or at the first non-empty cell
//!   storing the key. Removed cells become `Deleted` tombstones that keep
//!   their key: they never stop a probe for another key and are never
//!   handed to a different key, only purged in bulk by a rebuild.
//!
//! Resize policy
//! - After every successful mutation: if `used > capacity * 0.75` the table
//!   is rebuilt (even at unchanged capacity, to purge tombstones); else if
//!   `len < capacity * 0.25` and the target capacity differs, it shrinks.
//! - Target capacity is `max(2 * len, MINIMUM_CAPACITY)`.
//!
//! Reentrancy policy
//! - The hash strategy is the only user code the map runs. Each public
//!   method takes a debug-only guard, so a strategy that calls back into the
//!   same map panics in debug builds.
//!
//! Notes and non-goals
//! - No thread safety, no persistence, no iteration order.
//! - `insert` reports "no previous value" as `None` instead of reserving a
//!   payload value as a sentinel; all `i64` values are storable.

pub mod cell;
mod error;
mod packed_i64_map;
mod packed_i64_map_proptest;
mod reentrancy;

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

// Public surface
pub use cell::CELL_SIZE;
pub use error::{KeyNotFound, Result};
pub use packed_i64_map::{
    Iter, PackedI64Map, MAX_LOAD_FACTOR, MINIMUM_CAPACITY, MIN_LOAD_FACTOR,
};

/// Minimal `i64 -> i64` map interface: lookups and removals of absent keys
/// fail with `KeyNotFound`, inserts report the value they replaced.
pub trait I64Map {
    fn get(&self, key: i64) -> Result<i64>;
    fn insert(&mut self, key: i64, value: i64) -> Option<i64>;
    fn remove(&mut self, key: i64) -> Result<i64>;
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<S: BuildHasher> I64Map for PackedI64Map<S> {
    fn get(&self, key: i64) -> Result<i64> {
        PackedI64Map::get(self, key)
    }
    fn insert(&mut self, key: i64, value: i64) -> Option<i64> {
        PackedI64Map::insert(self, key, value)
    }
    fn remove(&mut self, key: i64) -> Result<i64> {
        PackedI64Map::remove(self, key)
    }
    fn len(&self) -> usize {
        PackedI64Map::len(self)
    }
}

impl<S: BuildHasher> I64Map for HashMap<i64, i64, S> {
    fn get(&self, key: i64) -> Result<i64> {
        HashMap::get(self, &key).copied().ok_or(KeyNotFound { key })
    }
    fn insert(&mut self, key: i64, value: i64) -> Option<i64> {
        HashMap::insert(self, key, value)
    }
    fn remove(&mut self, key: i64) -> Result<i64> {
        HashMap::remove(self, &key).ok_or(KeyNotFound { key })
    }
    fn len(&self) -> usize {
        HashMap::len(self)
    }
}

impl I64Map for BTreeMap<i64, i64> {
    fn get(&self, key: i64) -> Result<i64> {
        BTreeMap::get(self, &key).copied().ok_or(KeyNotFound { key })
    }
    fn insert(&mut self, key: i64, value: i64) -> Option<i64> {
        BTreeMap::insert(self, key, value)
    }
    fn remove(&mut self, key: i64) -> Result<i64> {
        BTreeMap::remove(self, &key).ok_or(KeyNotFound { key })
    }
    fn len(&self) -> usize {
        BTreeMap::len(self)
    }
}
