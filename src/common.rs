pub(crate) mod big_array;
pub(crate) mod builder_utils;
pub(crate) mod error;
pub(crate) mod generation;
pub mod hash;
pub(crate) mod key;

#[cfg(test)]
pub(crate) mod test_utils;
