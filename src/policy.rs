use crate::common::{
    builder_utils,
    error::ConfigError,
    hash::{DEFAULT_INITIAL_SIZE, DEFAULT_LOAD_FACTOR},
};

/// When a hash table gives memory back after removals.
///
/// A table never shrinks below the capacity it was created with, and never
/// below [`DEFAULT_INITIAL_SIZE`][default-size] slots. Removals through a
/// cursor (including `retain`) never shrink the table either.
///
/// [default-size]: ./hash/constant.DEFAULT_INITIAL_SIZE.html
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShrinkPolicy {
    /// Never shrink automatically. Use `trim` to release memory.
    Never,
    /// Halve the table when the number of entries drops below
    /// `fill_threshold / divisor`.
    BelowFraction(u32),
}

impl Default for ShrinkPolicy {
    fn default() -> Self {
        Self::BelowFraction(4)
    }
}

impl ShrinkPolicy {
    pub(crate) fn should_shrink(self, n: u64, min_n: u64, size: u64, max_fill: u64) -> bool {
        match self {
            Self::Never => false,
            Self::BelowFraction(0) => false,
            Self::BelowFraction(divisor) => {
                n > min_n && n > DEFAULT_INITIAL_SIZE as u64 && size < max_fill / divisor as u64
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
/// The sizing policy of a hash table.
pub struct TablePolicy {
    load_factor: f64,
    shrink_policy: ShrinkPolicy,
}

impl Default for TablePolicy {
    fn default() -> Self {
        Self {
            load_factor: DEFAULT_LOAD_FACTOR,
            shrink_policy: ShrinkPolicy::default(),
        }
    }
}

impl TablePolicy {
    pub(crate) fn new(load_factor: f64, shrink_policy: ShrinkPolicy) -> Result<Self, ConfigError> {
        builder_utils::ensure_load_factor(load_factor)?;
        Ok(Self {
            load_factor,
            shrink_policy,
        })
    }

    /// Returns the load factor of the table.
    pub fn load_factor(&self) -> f64 {
        self.load_factor
    }

    /// Returns the shrink policy of the table.
    pub fn shrink_policy(&self) -> ShrinkPolicy {
        self.shrink_policy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_shrinks_below_a_quarter() {
        let p = ShrinkPolicy::default();
        // 64 slots, 48 fill threshold, created with 16 slots.
        assert!(p.should_shrink(64, 16, 11, 48));
        assert!(!p.should_shrink(64, 16, 12, 48));
        // Never below the initial capacity.
        assert!(!p.should_shrink(64, 64, 0, 48));
        // Never below the absolute floor.
        assert!(!p.should_shrink(16, 2, 0, 12));
    }

    #[test]
    fn never_shrinks() {
        assert!(!ShrinkPolicy::Never.should_shrink(1 << 20, 2, 0, 1 << 19));
        assert!(!ShrinkPolicy::BelowFraction(0).should_shrink(1 << 20, 2, 0, 1 << 19));
    }

    #[test]
    fn rejects_bad_load_factor() {
        assert!(TablePolicy::new(0.5, ShrinkPolicy::Never).is_ok());
        assert_eq!(
            TablePolicy::new(1.5, ShrinkPolicy::Never),
            Err(ConfigError::InvalidLoadFactor(1.5))
        );
    }
}
