use crate::{
    common::{
        builder_utils,
        error::ConfigError,
        hash::{DEFAULT_LOAD_FACTOR, DEFAULT_SEGMENT_SHIFT},
        key::PrimitiveKey,
    },
    policy::{ShrinkPolicy, TablePolicy},
    BigOpenHashMap, BigOpenHashSet, OpenHashMap, OpenHashSet,
};

use std::marker::PhantomData;

/// Builds a hash table with various configuration knobs.
///
/// A builder is obtained from the `builder` associated function of the table
/// type to build, which fixes the type. Settings that do not apply to that
/// type (such as the segment shift of the flat tables) are not available.
///
/// # Examples
///
/// ```rust
/// use primcoll::{OpenHashMap, ShrinkPolicy};
///
/// let mut map = OpenHashMap::<u32, f32>::builder(10_000)
///     // Trade memory for shorter probe sequences.
///     .load_factor(0.5)
///     // Keep the memory after bulk removals; call `trim` to release it.
///     .shrink_policy(ShrinkPolicy::Never)
///     .build();
///
/// map.insert(1, 0.5);
/// assert_eq!(map.capacity(), 32_768);
/// ```
///
/// The big tables can also be given the size of their segments:
///
/// ```rust
/// use primcoll::BigOpenHashSet;
///
/// let set = BigOpenHashSet::<i64>::builder(1 << 20)
///     .segment_shift(16)
///     .build();
/// assert_eq!(set.num_segments(), 32);
/// ```
///
/// Invalid settings are reported by `try_build`, and make `build` panic:
///
/// ```rust
/// use primcoll::{ConfigError, OpenHashSet};
///
/// let result = OpenHashSet::<u8>::builder(10).load_factor(1.5).try_build();
/// assert_eq!(result.err(), Some(ConfigError::InvalidLoadFactor(1.5)));
/// ```
#[must_use]
pub struct TableBuilder<C> {
    expected_size: u64,
    load_factor: f64,
    shrink_policy: ShrinkPolicy,
    segment_shift: u32,
    table_type: PhantomData<C>,
}

impl<C> TableBuilder<C> {
    pub(crate) fn new(expected_size: u64) -> Self {
        Self {
            expected_size,
            load_factor: DEFAULT_LOAD_FACTOR,
            shrink_policy: ShrinkPolicy::default(),
            segment_shift: DEFAULT_SEGMENT_SHIFT,
            table_type: PhantomData,
        }
    }

    /// Sets the load factor of the table. It must be within `(0.0, 1.0]`.
    pub fn load_factor(self, load_factor: f64) -> Self {
        Self {
            load_factor,
            ..self
        }
    }

    /// Sets when the table gives memory back after removals.
    pub fn shrink_policy(self, shrink_policy: ShrinkPolicy) -> Self {
        Self {
            shrink_policy,
            ..self
        }
    }

    fn policy(&self) -> Result<TablePolicy, ConfigError> {
        TablePolicy::new(self.load_factor, self.shrink_policy)
    }
}

impl<K: PrimitiveKey, V> TableBuilder<OpenHashMap<K, V>> {
    /// Builds an `OpenHashMap<K, V>`.
    ///
    /// # Panics
    ///
    /// Panics if the configuration is invalid. See
    /// [`try_build`](#method.try_build).
    pub fn build(self) -> OpenHashMap<K, V> {
        builder_utils::or_panic(self.try_build())
    }

    /// Builds an `OpenHashMap<K, V>`, or returns an error if the load factor
    /// is invalid or the table would exceed the maximum flat capacity.
    pub fn try_build(self) -> Result<OpenHashMap<K, V>, ConfigError> {
        OpenHashMap::try_with_policy(self.expected_size, self.policy()?)
    }
}

impl<K: PrimitiveKey> TableBuilder<OpenHashSet<K>> {
    /// Builds an `OpenHashSet<K>`.
    ///
    /// # Panics
    ///
    /// Panics if the configuration is invalid.
    pub fn build(self) -> OpenHashSet<K> {
        builder_utils::or_panic(self.try_build())
    }

    /// Builds an `OpenHashSet<K>`, or returns an error if the configuration is
    /// invalid.
    pub fn try_build(self) -> Result<OpenHashSet<K>, ConfigError> {
        OpenHashSet::try_with_policy(self.expected_size, self.policy()?)
    }
}

impl<K: PrimitiveKey, V> TableBuilder<BigOpenHashMap<K, V>> {
    /// Sets the base-2 logarithm of the segment length. It must be within
    /// `1..=30`; the default is 27.
    pub fn segment_shift(self, segment_shift: u32) -> Self {
        Self {
            segment_shift,
            ..self
        }
    }

    /// Builds a `BigOpenHashMap<K, V>`.
    ///
    /// # Panics
    ///
    /// Panics if the configuration is invalid.
    pub fn build(self) -> BigOpenHashMap<K, V> {
        builder_utils::or_panic(self.try_build())
    }

    /// Builds a `BigOpenHashMap<K, V>`, or returns an error if the
    /// configuration is invalid.
    pub fn try_build(self) -> Result<BigOpenHashMap<K, V>, ConfigError> {
        BigOpenHashMap::try_with_policy(
            self.expected_size,
            self.policy()?,
            self.segment_shift,
        )
    }
}

impl<K: PrimitiveKey> TableBuilder<BigOpenHashSet<K>> {
    /// Sets the base-2 logarithm of the segment length. It must be within
    /// `1..=30`; the default is 27.
    pub fn segment_shift(self, segment_shift: u32) -> Self {
        Self {
            segment_shift,
            ..self
        }
    }

    /// Builds a `BigOpenHashSet<K>`.
    ///
    /// # Panics
    ///
    /// Panics if the configuration is invalid.
    pub fn build(self) -> BigOpenHashSet<K> {
        builder_utils::or_panic(self.try_build())
    }

    /// Builds a `BigOpenHashSet<K>`, or returns an error if the configuration
    /// is invalid.
    pub fn try_build(self) -> Result<BigOpenHashSet<K>, ConfigError> {
        BigOpenHashSet::try_with_policy(
            self.expected_size,
            self.policy()?,
            self.segment_shift,
        )
    }
}
