use std::{cmp::Ordering, fmt::Debug};

/// A primitive type usable as a key of the collections in this crate.
///
/// Keys are compared and hashed by their raw bit pattern. The all-zero bit
/// pattern ([`PrimitiveKey::NULL`]) is reserved by the hash tables to mark an
/// empty slot; a live `NULL` key is tracked out-of-band, so it is still a
/// perfectly valid key from the caller's point of view.
///
/// Floating point keys use the IEEE-754 bit pattern with every NaN collapsed
/// into one canonical NaN. This means `0.0` and `-0.0` are different keys,
/// while all NaNs are the same key.
pub trait PrimitiveKey: Copy + Debug {
    /// The key whose bit pattern is all zeros.
    const NULL: Self;

    /// Returns the raw bit pattern of this key, widened to 64 bits.
    fn key_bits(self) -> u64;

    /// Compares two keys by their natural ordering.
    ///
    /// Floating point keys are totally ordered: `-0.0 < 0.0`, and NaN is
    /// equal to itself and greater than any other value.
    fn natural_cmp(self, other: Self) -> Ordering;

    /// Returns `true` for the key whose bit pattern is all zeros.
    #[inline]
    fn is_null(self) -> bool {
        self.key_bits() == 0
    }

    /// Returns `true` if both keys have the same bit pattern.
    #[inline]
    fn same_key(self, other: Self) -> bool {
        self.key_bits() == other.key_bits()
    }
}

macro_rules! impl_integer_key {
    ($($t:ty),* $(,)?) => {
        $(
            impl PrimitiveKey for $t {
                const NULL: Self = 0;

                #[inline]
                fn key_bits(self) -> u64 {
                    self as u64
                }

                #[inline]
                fn natural_cmp(self, other: Self) -> Ordering {
                    self.cmp(&other)
                }
            }
        )*
    };
}

impl_integer_key!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

macro_rules! impl_float_key {
    ($t:ty, $bits:ty, $signed:ty, $canonical_nan:expr) => {
        impl PrimitiveKey for $t {
            const NULL: Self = 0.0;

            #[inline]
            fn key_bits(self) -> u64 {
                let bits: $bits = if self.is_nan() {
                    $canonical_nan
                } else {
                    self.to_bits()
                };
                bits as u64
            }

            fn natural_cmp(self, other: Self) -> Ordering {
                if self < other {
                    Ordering::Less
                } else if self > other {
                    Ordering::Greater
                } else {
                    // Equal, signed zeros or NaN. The signed view of the bit
                    // pattern puts -0.0 below 0.0 and the canonical NaN on top.
                    let a = self.key_bits() as $bits as $signed;
                    let b = other.key_bits() as $bits as $signed;
                    a.cmp(&b)
                }
            }
        }
    };
}

impl_float_key!(f32, u32, i32, 0x7fc0_0000);
impl_float_key!(f64, u64, i64, 0x7ff8_0000_0000_0000);

impl PrimitiveKey for bool {
    const NULL: Self = false;

    #[inline]
    fn key_bits(self) -> u64 {
        self as u64
    }

    #[inline]
    fn natural_cmp(self, other: Self) -> Ordering {
        self.cmp(&other)
    }
}

impl PrimitiveKey for char {
    const NULL: Self = '\0';

    #[inline]
    fn key_bits(self) -> u64 {
        self as u64
    }

    #[inline]
    fn natural_cmp(self, other: Self) -> Ordering {
        self.cmp(&other)
    }
}
