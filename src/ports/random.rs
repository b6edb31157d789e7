//! Random source port for picking among template variants.

/// Picks an index uniformly at random.
pub trait RandomSource: Send + Sync {
    /// Returns an index in `0..len`. Callers never pass `len == 0`.
    fn choose(&self, len: usize) -> usize;
}
