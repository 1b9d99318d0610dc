use super::error::ConfigError;

pub(crate) const MAX_SEGMENT_SHIFT: u32 = 30;

pub(crate) fn ensure_load_factor(load_factor: f64) -> Result<(), ConfigError> {
    // Written so that NaN is rejected too.
    if load_factor > 0.0 && load_factor <= 1.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidLoadFactor(load_factor))
    }
}

pub(crate) fn ensure_segment_shift(segment_shift: u32) -> Result<(), ConfigError> {
    if (1..=MAX_SEGMENT_SHIFT).contains(&segment_shift) {
        Ok(())
    } else {
        Err(ConfigError::InvalidSegmentShift(segment_shift))
    }
}

pub(crate) fn or_panic<T>(result: Result<T, ConfigError>) -> T {
    match result {
        Ok(value) => value,
        Err(e) => panic!("{e}"),
    }
}
