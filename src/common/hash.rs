//! Hashing and table sizing helpers shared by the open addressing tables.
//!
//! Everything here is a pure function: there is no seed and no hidden state, so
//! a table holding the same keys always lays them out the same way.

/// The default number of slots of a newly created table.
pub const DEFAULT_INITIAL_SIZE: usize = 16;

/// The default load factor of a table.
pub const DEFAULT_LOAD_FACTOR: f64 = 0.75;

/// A load factor trading memory for shorter probe sequences.
pub const FAST_LOAD_FACTOR: f64 = 0.5;

/// A load factor for lookup-heavy tables where memory is cheap.
pub const VERY_FAST_LOAD_FACTOR: f64 = 0.25;

/// The largest number of slots a flat (single array) table may have.
pub const MAX_FLAT_CAPACITY: u64 = 1 << 30;

/// The default segment shift of the big tables: segments of 2^27 slots.
pub const DEFAULT_SEGMENT_SHIFT: u32 = 27;

// 2^64 divided by the golden ratio.
const INV_PHI: u64 = 0x9e37_79b9_7f4a_7c15;

// Tables never go beyond 2^62 slots, so doubling a size never overflows.
const MAX_TABLE_SIZE: u64 = 1 << 62;

/// Scrambles the bit pattern of a key so that keys differing only in their
/// high or low bits spread over the whole table.
///
/// The multiplication by the inverse golden ratio pushes entropy towards the
/// high bits, and the two xor-shifts fold it back down, where the table mask
/// picks it up.
#[inline]
pub fn mix(bits: u64) -> u64 {
    let h = bits.wrapping_mul(INV_PHI);
    let h = h ^ (h >> 32);
    h ^ (h >> 16)
}

/// Returns the number of live entries a table of `n` slots may hold before
/// it has to grow.
///
/// This is `floor(n * load_factor)`, capped at `n - 1` so that at least one
/// slot stays empty and probe sequences always terminate.
///
/// `n` must be a power of two.
#[inline]
pub fn fill_threshold(n: u64, load_factor: f64) -> u64 {
    debug_assert!(n.is_power_of_two());
    let fill = (n as f64 * load_factor).floor() as u64;
    fill.min(n - 1)
}

/// Returns the smallest power of two `n >= 2` whose
/// [`fill_threshold`](fn.fill_threshold.html) is at least `expected`, or
/// `None` if no such table size is representable.
pub fn checked_table_size_for(expected: u64, load_factor: f64) -> Option<u64> {
    debug_assert!(load_factor > 0.0 && load_factor <= 1.0);
    let ideal = (expected as f64 / load_factor).ceil();
    if !(ideal <= MAX_TABLE_SIZE as f64) {
        return None;
    }
    let mut n = (ideal as u64).max(2).checked_next_power_of_two()?;
    // Rounding in the float math may leave us one step short.
    while fill_threshold(n, load_factor) < expected {
        if n >= MAX_TABLE_SIZE {
            return None;
        }
        n <<= 1;
    }
    Some(n)
}

/// Returns the smallest power of two `n >= 2` whose
/// [`fill_threshold`](fn.fill_threshold.html) is at least `expected`.
///
/// # Panics
///
/// Panics if the table size would exceed 2^62 slots.
pub fn table_size_for(expected: u64, load_factor: f64) -> u64 {
    match checked_table_size_for(expected, load_factor) {
        Some(n) => n,
        None => panic!("capacity overflow"),
    }
}

/// Same as [`table_size_for`](fn.table_size_for.html), but limited to
/// [`MAX_FLAT_CAPACITY`](constant.MAX_FLAT_CAPACITY.html) slots.
pub(crate) fn checked_flat_table_size_for(expected: u64, load_factor: f64) -> Option<usize> {
    checked_table_size_for(expected, load_factor)
        .filter(|n| *n <= MAX_FLAT_CAPACITY)
        .map(|n| n as usize)
}

pub(crate) fn flat_table_size_for(expected: u64, load_factor: f64) -> usize {
    match checked_flat_table_size_for(expected, load_factor) {
        Some(n) => n,
        None => panic!("capacity overflow"),
    }
}

/// Returns `true` if `slot` lies cyclically in `(last, pos]`, i.e. an entry
/// whose ideal slot is `slot`, found at `pos`, must stay where it is when the
/// slot `last` is freed.
///
/// Both the flat and the big tables decide backward shifts with this.
#[inline]
pub(crate) fn stays_behind_gap(last: u64, slot: u64, pos: u64) -> bool {
    if last <= pos {
        last < slot && slot <= pos
    } else {
        last < slot || slot <= pos
    }
}
