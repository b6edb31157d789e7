//! Deterministic adapters for tests and transcript replay.

pub mod clock;
pub mod id_gen;
pub mod random;

pub use clock::FixedClock;
pub use id_gen::SequentialIdGenerator;
pub use random::SeededRandom;
