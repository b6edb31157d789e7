//! Live adapters backed by the system clock, thread RNG, and UUIDs.

pub mod clock;
pub mod id_gen;
pub mod random;

pub use clock::LiveClock;
pub use id_gen::LiveIdGenerator;
pub use random::ThreadRandom;
