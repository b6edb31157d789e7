//! Port traits for the engine's outside dependencies.
//!
//! The core never reads the system clock, draws random numbers, or mints
//! identifiers directly. It goes through these traits so that tests and
//! transcript replay can substitute deterministic implementations.
//! Implementations live in `src/adapters/`.

pub mod clock;
pub mod id_gen;
pub mod random;

pub use clock::Clock;
pub use id_gen::IdGenerator;
pub use random::RandomSource;
