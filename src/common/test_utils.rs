use rand::{rngs::StdRng, SeedableRng};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

/// Counts how many `Tracked` values sharing it were dropped.
#[derive(Debug, Default)]
pub(crate) struct DropCounter {
    dropped: AtomicUsize,
}

impl DropCounter {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn dropped(&self) -> usize {
        self.dropped.load(Ordering::Acquire)
    }
}

/// A map value that reports its drop to a `DropCounter`.
#[derive(Debug)]
pub(crate) struct Tracked {
    counter: Arc<DropCounter>,
    pub(crate) id: u32,
}

impl Tracked {
    pub(crate) fn new(counter: &Arc<DropCounter>, id: u32) -> Self {
        Self {
            counter: Arc::clone(counter),
            id,
        }
    }
}

impl Drop for Tracked {
    fn drop(&mut self) {
        self.counter.dropped.fetch_add(1, Ordering::AcqRel);
    }
}

/// Returns a generator for randomized operation sequences, seeded from the
/// OS. The seed is printed so that a failing run can be replayed with
/// `StdRng::seed_from_u64`.
pub(crate) fn random_rng() -> StdRng {
    let mut buf = [0; 8];
    getrandom::getrandom(&mut buf).unwrap();
    let seed = u64::from_le_bytes(buf);
    println!("rng seed: {seed:#018x}");
    StdRng::seed_from_u64(seed)
}
