//! PackedI64Map: open-addressing, linear-probing `i64 -> i64` map stored in
//! one contiguous byte buffer.

use crate::cell::{self, Status, CELL_SIZE};
use crate::error::{KeyNotFound, Result};
use crate::reentrancy::DebugReentrancy;
use core::hash::BuildHasher;
use rustc_hash::FxBuildHasher;

/// Below this ratio of live entries to capacity the table shrinks.
pub const MIN_LOAD_FACTOR: f64 = 0.25;
/// Above this ratio of used cells (live + tombstones) to capacity the table
/// is rebuilt.
pub const MAX_LOAD_FACTOR: f64 = 0.75;
/// Capacity floor for every rebuilt table.
pub const MINIMUM_CAPACITY: usize = 32;

/// Buffer plus counters. Knows nothing about resizing triggers; the map
/// decides when to call `rebuild`.
struct Table {
    buf: Vec<u8>,
    capacity: usize,
    /// Cells with status `Occupied`.
    occupied: usize,
    /// Cells with status `Occupied` or `Deleted`.
    used: usize,
}

impl Table {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: vec![0u8; cell::buffer_len(capacity)],
            capacity,
            occupied: 0,
            used: 0,
        }
    }

    /// Index of the cell holding `key`, or of the `Empty` cell that ends its
    /// probe chain. Tombstones still carry their old key, so a tombstone of
    /// `key` also ends the scan.
    fn locate<S: BuildHasher>(&self, key: i64, hasher: &S) -> usize {
        // Signed reduction: strategies may produce "negative" hashes.
        let hash = hasher.hash_one(key) as i64;
        let mut index = hash.rem_euclid(self.capacity as i64) as usize;
        loop {
            match cell::status(&self.buf, index) {
                Status::Empty => return index,
                _ if cell::key(&self.buf, index) == key => return index,
                _ => index = (index + 1) % self.capacity,
            }
        }
    }

    fn get<S: BuildHasher>(&self, key: i64, hasher: &S) -> Option<i64> {
        let index = self.locate(key, hasher);
        match cell::status(&self.buf, index) {
            Status::Occupied => Some(cell::value(&self.buf, index)),
            Status::Empty | Status::Deleted => None,
        }
    }

    /// Insert without evaluating the resize policy.
    fn put<S: BuildHasher>(&mut self, key: i64, value: i64, hasher: &S) -> Option<i64> {
        let index = self.locate(key, hasher);
        let previous = match cell::status(&self.buf, index) {
            Status::Occupied => Some(cell::value(&self.buf, index)),
            Status::Empty => {
                self.occupied += 1;
                self.used += 1;
                None
            }
            Status::Deleted => {
                self.occupied += 1;
                None
            }
        };
        cell::write_occupied(&mut self.buf, index, key, value);
        previous
    }

    /// Tombstone `key` without evaluating the resize policy.
    fn take<S: BuildHasher>(&mut self, key: i64, hasher: &S) -> Option<i64> {
        let index = self.locate(key, hasher);
        match cell::status(&self.buf, index) {
            Status::Empty | Status::Deleted => None,
            Status::Occupied => {
                let value = cell::value(&self.buf, index);
                cell::set_status(&mut self.buf, index, Status::Deleted);
                self.occupied -= 1;
                Some(value)
            }
        }
    }

    fn target_capacity(&self) -> usize {
        (self.occupied * 2).max(MINIMUM_CAPACITY)
    }

    /// Rebuild when the used ratio exceeds `MAX_LOAD_FACTOR` (always, to purge
    /// tombstones) or when the live ratio drops under `MIN_LOAD_FACTOR` and
    /// the target capacity actually differs.
    fn resize_if_needed<S: BuildHasher>(&mut self, hasher: &S) {
        let capacity = self.capacity as f64;
        if self.used as f64 > capacity * MAX_LOAD_FACTOR {
            self.rebuild(self.target_capacity(), hasher);
        } else if (self.occupied as f64) < capacity * MIN_LOAD_FACTOR {
            let target = self.target_capacity();
            if target != self.capacity {
                self.rebuild(target, hasher);
            }
        }
    }

    /// Re-insert every live cell, in old index order, into a fresh table of
    /// `capacity` cells and take it over. The old buffer is dropped.
    fn rebuild<S: BuildHasher>(&mut self, capacity: usize, hasher: &S) {
        let mut fresh = Table::with_capacity(capacity);
        for index in 0..self.capacity {
            if cell::status(&self.buf, index) == Status::Occupied {
                fresh.put(
                    cell::key(&self.buf, index),
                    cell::value(&self.buf, index),
                    hasher,
                );
            }
        }
        debug_assert_eq!(fresh.occupied, self.occupied);
        debug_assert_eq!(fresh.used, fresh.occupied);

        log::trace!(
            "rebuilt table: capacity {} -> {}, {} live entries, {} tombstones purged",
            self.capacity,
            capacity,
            self.occupied,
            self.used - self.occupied,
        );
        *self = fresh;
    }
}

/// Compact `i64 -> i64` hash map.
///
/// Every entry costs `CELL_SIZE` (17) bytes of buffer, and the buffer is kept
/// between 25% and 75% full, shrinking as entries are removed.
///
/// The hash strategy `S` is any `BuildHasher`; its 64-bit output is read as a
/// signed integer and reduced modulo the capacity with a non-negative result.
///
/// `insert` returns `Option<i64>` rather than reserving a payload value as an
/// "absent" marker, so every `i64` is a legal value.
pub struct PackedI64Map<S = FxBuildHasher> {
    table: Table,
    hasher: S,
    reentrancy: DebugReentrancy,
}

impl PackedI64Map {
    pub fn new() -> Self {
        Self::with_hasher(FxBuildHasher)
    }
}

impl Default for PackedI64Map {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: BuildHasher> PackedI64Map<S> {
    pub fn with_hasher(hasher: S) -> Self {
        Self::with_capacity_and_hasher(MINIMUM_CAPACITY, hasher)
    }

    /// Start with exactly `capacity` cells (at least one). The
    /// `MINIMUM_CAPACITY` floor only applies once the table is rebuilt,
    /// which makes small tables handy for collision tests.
    ///
    /// Panics with "capacity overflow" if `capacity * CELL_SIZE` bytes does
    /// not fit in `usize`.
    pub fn with_capacity_and_hasher(capacity: usize, hasher: S) -> Self {
        Self {
            table: Table::with_capacity(capacity.max(1)),
            hasher,
            reentrancy: DebugReentrancy::new(),
        }
    }

    /// Value stored under `key`.
    pub fn get(&self, key: i64) -> Result<i64> {
        let _g = self.reentrancy.enter();
        self.table
            .get(key, &self.hasher)
            .ok_or(KeyNotFound { key })
    }

    pub fn contains_key(&self, key: i64) -> bool {
        let _g = self.reentrancy.enter();
        self.table.get(key, &self.hasher).is_some()
    }

    /// Map `key` to `value`, returning the value it replaced.
    pub fn insert(&mut self, key: i64, value: i64) -> Option<i64> {
        let _g = self.reentrancy.enter();
        let previous = self.table.put(key, value, &self.hasher);
        self.table.resize_if_needed(&self.hasher);
        previous
    }

    /// Remove `key`, returning the value it held.
    pub fn remove(&mut self, key: i64) -> Result<i64> {
        let _g = self.reentrancy.enter();
        let value = self
            .table
            .take(key, &self.hasher)
            .ok_or(KeyNotFound { key })?;
        self.table.resize_if_needed(&self.hasher);
        Ok(value)
    }

    pub fn hasher(&self) -> &S {
        &self.hasher
    }
}

impl<S> PackedI64Map<S> {
    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.table.occupied
    }

    pub fn is_empty(&self) -> bool {
        self.table.occupied == 0
    }

    /// Number of cells in the table.
    pub fn capacity(&self) -> usize {
        self.table.capacity
    }

    /// Number of cells the allocated buffer can actually hold. Always equal
    /// to `capacity()`; the buffer is never over-allocated.
    pub fn storage_capacity(&self) -> usize {
        self.table.buf.len() / CELL_SIZE
    }

    /// Size of the cell buffer in bytes.
    pub fn allocated_bytes(&self) -> usize {
        self.table.buf.len()
    }

    /// Cells marked deleted that still sit in probe chains.
    pub fn tombstones(&self) -> usize {
        self.table.used - self.table.occupied
    }

    /// Live `(key, value)` pairs in buffer order. The order is unspecified and
    /// changes across rebuilds.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            buf: &self.table.buf,
            index: 0,
            remaining: self.table.occupied,
        }
    }
}

impl<S> core::fmt::Debug for PackedI64Map<S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<'a, S> IntoIterator for &'a PackedI64Map<S> {
    type Item = (i64, i64);
    type IntoIter = Iter<'a>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over live entries of a `PackedI64Map`.
pub struct Iter<'a> {
    buf: &'a [u8],
    index: usize,
    remaining: usize,
}

impl Iterator for Iter<'_> {
    type Item = (i64, i64);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let cells = self.buf.len() / CELL_SIZE;
        while self.remaining > 0 && self.index < cells {
            let index = self.index;
            self.index += 1;
            if cell::status(self.buf, index) == Status::Occupied {
                self.remaining -= 1;
                return Some((cell::key(self.buf, index), cell::value(self.buf, index)));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Iter<'_> {}
