//! Injectable source of random choices.
//!
//! Round start is the only place the reducer needs randomness. Taking the
//! source as an argument keeps [`apply`](crate::apply) a pure function:
//! the coordinator passes a live generator, tests pass a stub.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Picks indices uniformly at random.
pub trait RandomSource {
    /// Returns an index in `0..len`. `len` is always greater than zero.
    fn pick_index(&mut self, len: usize) -> usize;
}

impl<T: RandomSource + ?Sized> RandomSource for &mut T {
    fn pick_index(&mut self, len: usize) -> usize {
        (**self).pick_index(len)
    }
}

/// A [`RandomSource`] backed by [`StdRng`].
#[derive(Debug, Clone)]
pub struct SeededRandom(StdRng);

impl SeededRandom {
    /// Seeds from the operating system. Not reproducible.
    pub fn from_os() -> Self {
        Self(StdRng::from_os_rng())
    }

    /// A reproducible generator for a fixed seed.
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl RandomSource for SeededRandom {
    fn pick_index(&mut self, len: usize) -> usize {
        self.0.random_range(0..len)
    }
}
