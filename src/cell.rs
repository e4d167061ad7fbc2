//! Packed cell codec: fixed-width layout of one table slot inside the
//! map's byte buffer.
//!
//! Layout of cell `i`, starting at byte `i * CELL_SIZE`:
//!
//! ```text
//! +--------+----------------+----------------+
//! | status |  key (i64 LE)  | value (i64 LE) |
//! | 1 byte |    8 bytes     |    8 bytes     |
//! +--------+----------------+----------------+
//! ```
//!
//! No padding and no alignment: a cell is only ever a view into a slice of
//! the owning buffer. Callers guarantee the index is in bounds.

use byteorder::{ByteOrder, LittleEndian};

const STATUS_BYTES: usize = 1;
const KEY_BYTES: usize = 8;
const VALUE_BYTES: usize = 8;

/// Size in bytes of one encoded cell.
pub const CELL_SIZE: usize = STATUS_BYTES + KEY_BYTES + VALUE_BYTES;

const STATUS_OFFSET: usize = 0;
const KEY_OFFSET: usize = STATUS_OFFSET + STATUS_BYTES;
const VALUE_OFFSET: usize = KEY_OFFSET + KEY_BYTES;

/// Header tag of a cell.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u8)]
pub enum Status {
    /// Never written since the buffer was allocated; terminates probes.
    Empty = 0,
    /// Holds a live key/value pair.
    Occupied = 1,
    /// Tombstone. Keeps the last key it held and stays in probe chains
    /// until the next rebuild.
    Deleted = 2,
}

impl Status {
    #[inline]
    fn from_byte(b: u8) -> Self {
        match b {
            0 => Status::Empty,
            1 => Status::Occupied,
            2 => Status::Deleted,
            other => unreachable!("corrupt cell header byte {other}"),
        }
    }
}

/// Byte offset of cell `index` in the buffer.
#[inline]
pub const fn cell_offset(index: usize) -> usize {
    index * CELL_SIZE
}

/// Buffer length in bytes needed for `cells` cells.
///
/// Panics if the length does not fit in `usize`.
#[inline]
pub const fn buffer_len(cells: usize) -> usize {
    match cells.checked_mul(CELL_SIZE) {
        Some(len) => len,
        None => panic!("capacity overflow"),
    }
}

#[inline]
pub fn status(buf: &[u8], index: usize) -> Status {
    Status::from_byte(buf[cell_offset(index) + STATUS_OFFSET])
}

#[inline]
pub fn set_status(buf: &mut [u8], index: usize, status: Status) {
    buf[cell_offset(index) + STATUS_OFFSET] = status as u8;
}

#[inline]
pub fn key(buf: &[u8], index: usize) -> i64 {
    let at = cell_offset(index) + KEY_OFFSET;
    LittleEndian::read_i64(&buf[at..at + KEY_BYTES])
}

#[inline]
pub fn set_key(buf: &mut [u8], index: usize, key: i64) {
    let at = cell_offset(index) + KEY_OFFSET;
    LittleEndian::write_i64(&mut buf[at..at + KEY_BYTES], key);
}

#[inline]
pub fn value(buf: &[u8], index: usize) -> i64 {
    let at = cell_offset(index) + VALUE_OFFSET;
    LittleEndian::read_i64(&buf[at..at + VALUE_BYTES])
}

#[inline]
pub fn set_value(buf: &mut [u8], index: usize, value: i64) {
    let at = cell_offset(index) + VALUE_OFFSET;
    LittleEndian::write_i64(&mut buf[at..at + VALUE_BYTES], value);
}

/// Write a full occupied cell in one go.
#[inline]
pub fn write_occupied(buf: &mut [u8], index: usize, k: i64, v: i64) {
    set_status(buf, index, Status::Occupied);
    set_key(buf, index, k);
    set_value(buf, index, v);
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    /// Invariant: a freshly zeroed buffer decodes as all-`Empty` cells.
    #[test]
    fn zeroed_buffer_is_empty() {
        let buf = vec![0u8; buffer_len(4)];
        for i in 0..4 {
            assert_eq!(status(&buf, i), Status::Empty);
        }
    }

    /// Invariant: key and value are stored little-endian, right after the
    /// one-byte header, with no padding between cells.
    #[test]
    fn layout_is_packed_little_endian() {
        let mut buf = vec![0u8; buffer_len(2)];
        write_occupied(&mut buf, 1, 0x0102_0304_0506_0708, -2);

        let base = cell_offset(1);
        assert_eq!(base, 17);
        assert_eq!(buf[base], Status::Occupied as u8);
        assert_eq!(
            &buf[base + 1..base + 9],
            &[0x08, 0x07, 0x06, 0x05, 0x04, 0x03, 0x02, 0x01]
        );
        assert_eq!(
            &buf[base + 9..base + 17],
            &[0xfe, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]
        );
        // Cell 0 untouched.
        assert!(buf[..base].iter().all(|&b| b == 0));
    }

    /// Invariant: extreme values survive encode/decode, and writing one cell
    /// never bleeds into its neighbours.
    #[test]
    fn extremes_and_neighbour_isolation() {
        let mut buf = vec![0u8; buffer_len(3)];
        write_occupied(&mut buf, 0, i64::MIN, i64::MAX);
        write_occupied(&mut buf, 2, i64::MAX, i64::MIN);
        write_occupied(&mut buf, 1, -1, 0);

        assert_eq!((key(&buf, 0), value(&buf, 0)), (i64::MIN, i64::MAX));
        assert_eq!((key(&buf, 1), value(&buf, 1)), (-1, 0));
        assert_eq!((key(&buf, 2), value(&buf, 2)), (i64::MAX, i64::MIN));
    }

    /// Invariant: tombstoning a cell only flips the header; the key stays
    /// readable.
    #[test]
    fn tombstone_keeps_key() {
        let mut buf = vec![0u8; buffer_len(1)];
        write_occupied(&mut buf, 0, 42, 7);
        set_status(&mut buf, 0, Status::Deleted);
        assert_eq!(status(&buf, 0), Status::Deleted);
        assert_eq!(key(&buf, 0), 42);
    }

    #[test]
    fn buffer_len_at_usize_limit() {
        let max_cells = usize::MAX / CELL_SIZE;
        assert_eq!(buffer_len(max_cells), max_cells * CELL_SIZE);
    }

    #[test]
    #[should_panic(expected = "capacity overflow")]
    fn buffer_len_overflow_panics() {
        let _ = buffer_len(usize::MAX / CELL_SIZE + 1);
    }

    #[test]
    #[should_panic(expected = "corrupt cell header")]
    fn unknown_header_byte_panics() {
        let mut buf = vec![0u8; buffer_len(1)];
        buf[0] = 3;
        let _ = status(&buf, 0);
    }
}
