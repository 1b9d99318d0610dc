//! Segmented two-level arrays.
//!
//! A `BigArray` is a logical array of `2^k` elements stored as a number of
//! equally sized inner segments. Each segment holds at most `2^segment_shift`
//! elements, so a logical index is split into a segment number (the high bits)
//! and an offset within that segment (the low bits). Arrays smaller than one
//! full segment are stored as a single, shorter segment.

/// A position in a `BigArray`, already split into segment and offset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Pos {
    pub(crate) segment: usize,
    pub(crate) offset: usize,
}

pub(crate) struct BigArray<T> {
    segments: Box<[Box<[T]>]>,
    segment_shift: u32,
    // Length of a segment minus one.
    segment_mask: u64,
    // Number of segments minus one.
    base_mask: u64,
}

impl<T> BigArray<T> {
    /// Creates an array of `len` elements, `len` being a power of two.
    pub(crate) fn with_fn(len: u64, segment_shift: u32, mut f: impl FnMut() -> T) -> Self {
        debug_assert!(len.is_power_of_two());
        let segment_len = len.min(1 << segment_shift);
        let num_segments = len / segment_len;

        let segments = (0..num_segments)
            .map(|_| {
                (0..segment_len)
                    .map(|_| f())
                    .collect::<Vec<_>>()
                    .into_boxed_slice()
            })
            .collect::<Vec<_>>()
            .into_boxed_slice();

        Self {
            segments,
            segment_shift,
            segment_mask: segment_len - 1,
            base_mask: num_segments - 1,
        }
    }

    pub(crate) fn len(&self) -> u64 {
        (self.base_mask + 1) * (self.segment_mask + 1)
    }

    pub(crate) fn num_segments(&self) -> usize {
        self.segments.len()
    }

    #[cfg(test)]
    pub(crate) fn segment_len(&self) -> u64 {
        self.segment_mask + 1
    }

    #[inline]
    pub(crate) fn pos(&self, index: u64) -> Pos {
        debug_assert!(index < self.len());
        Pos {
            segment: (index >> self.segment_shift) as usize,
            offset: (index & self.segment_mask) as usize,
        }
    }

    #[inline]
    pub(crate) fn index_of(&self, pos: Pos) -> u64 {
        ((pos.segment as u64) << self.segment_shift) | pos.offset as u64
    }

    /// Returns the position following `pos`, wrapping from the end of the last
    /// segment to the start of the first one.
    #[inline]
    pub(crate) fn next_pos(&self, pos: Pos) -> Pos {
        let offset = ((pos.offset as u64 + 1) & self.segment_mask) as usize;
        let segment = if offset == 0 {
            ((pos.segment as u64 + 1) & self.base_mask) as usize
        } else {
            pos.segment
        };
        Pos { segment, offset }
    }

    #[inline]
    pub(crate) fn at(&self, pos: Pos) -> &T {
        &self.segments[pos.segment][pos.offset]
    }

    #[inline]
    pub(crate) fn at_mut(&mut self, pos: Pos) -> &mut T {
        &mut self.segments[pos.segment][pos.offset]
    }

    #[inline]
    pub(crate) fn get(&self, index: u64) -> &T {
        self.at(self.pos(index))
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, index: u64) -> &mut T {
        let pos = self.pos(index);
        self.at_mut(pos)
    }

    #[inline]
    pub(crate) fn set(&mut self, index: u64, value: T) {
        *self.get_mut(index) = value;
    }

    pub(crate) fn segments(&self) -> &[Box<[T]>] {
        &self.segments
    }

    pub(crate) fn segments_mut(&mut self) -> &mut [Box<[T]>] {
        &mut self.segments
    }

    pub(crate) fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + '_ {
        self.segments.iter().flat_map(|s| s.iter())
    }

    pub(crate) fn iter_mut(&mut self) -> impl DoubleEndedIterator<Item = &mut T> + '_ {
        self.segments.iter_mut().flat_map(|s| s.iter_mut())
    }
}

impl<T: Default> BigArray<T> {
    pub(crate) fn new(len: u64, segment_shift: u32) -> Self {
        Self::with_fn(len, segment_shift, T::default)
    }

    #[inline]
    pub(crate) fn take(&mut self, index: u64) -> T {
        std::mem::take(self.get_mut(index))
    }
}

impl<T: Clone> Clone for BigArray<T> {
    fn clone(&self) -> Self {
        Self {
            segments: self.segments.clone(),
            segment_shift: self.segment_shift,
            segment_mask: self.segment_mask,
            base_mask: self.base_mask,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{BigArray, Pos};

    #[test]
    fn small_array_is_one_short_segment() {
        let a = BigArray::<u8>::new(8, 4);
        assert_eq!(a.num_segments(), 1);
        assert_eq!(a.segment_len(), 8);
        assert_eq!(a.len(), 8);
        assert_eq!(a.pos(7), Pos { segment: 0, offset: 7 });
        assert_eq!(a.next_pos(a.pos(7)), Pos { segment: 0, offset: 0 });
    }

    #[test]
    fn index_decomposition() {
        let a = BigArray::<u32>::new(64, 3);
        assert_eq!(a.num_segments(), 8);
        assert_eq!(a.segment_len(), 8);
        for i in 0..64 {
            let p = a.pos(i);
            assert_eq!(p.segment as u64, i >> 3);
            assert_eq!(p.offset as u64, i & 7);
            assert_eq!(a.index_of(p), i);
        }
    }

    #[test]
    fn next_pos_rolls_over_segments() {
        let a = BigArray::<u32>::new(16, 2);
        // Last offset of a segment moves to the first offset of the next one.
        assert_eq!(a.next_pos(Pos { segment: 1, offset: 3 }), Pos { segment: 2, offset: 0 });
        // Last slot of the array wraps to the first.
        assert_eq!(a.next_pos(Pos { segment: 3, offset: 3 }), Pos { segment: 0, offset: 0 });
        let mut p = a.pos(0);
        for i in 1..=32u64 {
            p = a.next_pos(p);
            assert_eq!(a.index_of(p), i & 15);
        }
    }

    #[test]
    fn set_get_take() {
        let mut a = BigArray::<Option<String>>::new(32, 2);
        a.set(4, Some("four".to_string()));
        a.set(31, Some("last".to_string()));
        assert_eq!(a.get(4).as_deref(), Some("four"));
        assert_eq!(a.take(31).as_deref(), Some("last"));
        assert_eq!(a.get(31), &None);
        assert_eq!(a.iter().filter(|v| v.is_some()).count(), 1);
    }
}
