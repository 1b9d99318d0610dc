/// The error type for invalid collection configurations.
///
/// Returned by the `try_*` constructors and
/// [`TableBuilder::try_build`][try-build]. The panicking constructors panic with
/// the same message.
///
/// [try-build]: ../struct.TableBuilder.html#method.try_build
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// The load factor is not within `(0.0, 1.0]`.
    #[error("load factor must be greater than 0.0 and at most 1.0, got {0}")]
    InvalidLoadFactor(f64),

    /// The requested number of entries cannot fit in a table of this kind.
    #[error("a table for {expected} entries with load factor {load_factor} exceeds the maximum capacity")]
    CapacityOverflow {
        /// The requested number of entries.
        expected: u64,
        /// The requested load factor.
        load_factor: f64,
    },

    /// The segment shift of a big table is not within `1..=30`.
    #[error("segment shift must be between 1 and 30, got {0}")]
    InvalidSegmentShift(u32),
}

/// The error type for mutations through a bounded view of a sorted map.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeError {
    /// The key lies outside the bounds of the view.
    #[error("key out of range")]
    KeyOutOfRange,

    /// The lower bound of a range is greater than its upper bound.
    #[error("start key is greater than end key")]
    InvalidRange,

    /// The bounds of a nested view are not contained in the enclosing view.
    #[error("bounds are outside of the enclosing view")]
    BoundsOutsideView,
}

/// The error type for the cursors of the collections.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorError {
    /// `remove` was called before the first `next`, or twice for the same
    /// element.
    #[error("no current element; call next() before remove()")]
    NoCurrentElement,

    /// The collection was structurally modified by something other than this
    /// cursor since the cursor was created.
    #[error("the collection was modified outside of this cursor")]
    ConcurrentModification,
}
