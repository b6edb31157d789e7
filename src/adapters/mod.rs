//! Implementations of the [`crate::ports`] traits.
//!
//! `live` talks to the operating system; `seeded` is fully deterministic and
//! is what tests and transcript replay run on.

pub mod live;
pub mod seeded;
