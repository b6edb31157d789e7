//! Recorded conversations and replaying them against a form.
//!
//! A transcript stores the seed and frozen clock a session ran with, so a
//! replay under the same deterministic context must reproduce every reply.

pub mod format;
pub mod recorder;
pub mod replayer;

pub use format::{Transcript, TurnRecord};
pub use recorder::TranscriptRecorder;
pub use replayer::{replay, Mismatch, ReplayReport};
