use std::sync::atomic::{AtomicU32, Ordering};

static NEXT_INSTANCE: AtomicU32 = AtomicU32::new(0);

const COUNT_MASK: u64 = 0xffff_ffff;

/// The structural modification stamp of one collection.
///
/// The high 32 bits identify the collection instance and the low 32 bits count
/// its structural changes. A cursor compares stamps, so a cursor created for
/// one collection does not validate against another one. Cloning a collection
/// gives the clone a fresh instance.
#[derive(Debug)]
pub(crate) struct Generation(u64);

impl Generation {
    pub(crate) fn new() -> Self {
        let instance = NEXT_INSTANCE.fetch_add(1, Ordering::Relaxed);
        Self(u64::from(instance) << 32)
    }

    #[inline]
    pub(crate) fn bump(&mut self) {
        self.0 = (self.0 & !COUNT_MASK) | (self.0.wrapping_add(1) & COUNT_MASK);
    }

    #[inline]
    pub(crate) fn stamp(&self) -> u64 {
        self.0
    }
}

impl Default for Generation {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for Generation {
    fn clone(&self) -> Self {
        Self::new()
    }
}
