//! Service context bundling the port trait objects a conversation uses.

use chrono::NaiveDateTime;

use crate::adapters::live::{LiveClock, LiveIdGenerator, ThreadRandom};
use crate::adapters::seeded::{FixedClock, SeededRandom, SequentialIdGenerator};
use crate::ports::clock::Clock;
use crate::ports::id_gen::IdGenerator;
use crate::ports::random::RandomSource;

/// Bundles all port trait objects into a single context.
///
/// Constructors wire up live or deterministic adapters. One context may serve
/// many conversations.
pub struct ServiceContext {
    /// Clock for relative date/time answers.
    pub clock: Box<dyn Clock>,
    /// Random source for template variant choice.
    pub random: Box<dyn RandomSource>,
    /// ID generator for conversation ids.
    pub id_gen: Box<dyn IdGenerator>,
}

impl ServiceContext {
    /// Creates a live context: local clock, thread RNG, and UUID ids.
    #[must_use]
    pub fn live() -> Self {
        Self {
            clock: Box::new(LiveClock),
            random: Box::new(ThreadRandom),
            id_gen: Box::new(LiveIdGenerator),
        }
    }

    /// Creates a fully deterministic context.
    ///
    /// Used by tests and transcript replay: template choices follow `seed`,
    /// the clock is frozen at `now`, and ids count up from `conv-1`.
    #[must_use]
    pub fn deterministic(seed: u64, now: NaiveDateTime) -> Self {
        Self {
            clock: Box::new(FixedClock::new(now)),
            random: Box::new(SeededRandom::new(seed)),
            id_gen: Box::new(SequentialIdGenerator::new()),
        }
    }

    /// A seeded random source on the live clock.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            random: Box::new(SeededRandom::new(seed)),
            ..Self::live()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn deterministic_context_is_repeatable() {
        let now = NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let a = ServiceContext::deterministic(42, now);
        let b = ServiceContext::deterministic(42, now);
        assert_eq!(a.clock.now(), now);
        assert_eq!(a.id_gen.generate_id(), b.id_gen.generate_id());
        let left: Vec<usize> = (0..10).map(|_| a.random.choose(4)).collect();
        let right: Vec<usize> = (0..10).map(|_| b.random.choose(4)).collect();
        assert_eq!(left, right);
    }

    #[test]
    fn live_context_mints_uuids() {
        let ctx = ServiceContext::live();
        assert_eq!(ctx.id_gen.generate_id().len(), 36);
    }
}
