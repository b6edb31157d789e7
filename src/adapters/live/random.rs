//! Live random source backed by the thread-local RNG.

use rand::Rng;

use crate::ports::RandomSource;

/// Draws from `rand::thread_rng`.
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn choose(&self, len: usize) -> usize {
        if len <= 1 {
            return 0;
        }
        rand::thread_rng().gen_range(0..len)
    }
}
