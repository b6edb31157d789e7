//! Replays a transcript's inputs and compares the replies.

use std::sync::Arc;

use tracing::{debug, warn};

use super::format::Transcript;
use crate::context::ServiceContext;
use crate::conversation::Conversation;
use crate::error::FormError;
use crate::form::{Form, FormValues};

/// A turn whose reply changed.
#[derive(Debug, Clone, PartialEq)]
pub struct Mismatch {
    /// Sequence number of the turn.
    pub seq: u64,
    /// The recorded input.
    pub input: Option<String>,
    /// The recorded reply.
    pub expected: String,
    /// The reply now; `None` if the conversation had already ended.
    pub actual: Option<String>,
}

/// Outcome of a replay.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayReport {
    /// Turns replayed.
    pub turns: usize,
    /// Turns whose reply differs from the recording.
    pub mismatches: Vec<Mismatch>,
}

impl ReplayReport {
    /// Whether every reply matched.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.mismatches.is_empty()
    }
}

/// Re-runs the recorded inputs against `form` under the recorded seed and
/// clock.
///
/// A turn without input (re)starts the conversation. Turns after the
/// conversation has ended are reported as mismatches.
///
/// # Errors
///
/// Returns a [`FormError`] if the form fails to render, or
/// [`FormError::NotStarted`] if the transcript does not open with a prompt.
pub fn replay(form: Arc<Form>, transcript: &Transcript) -> Result<ReplayReport, FormError> {
    let ctx = ServiceContext::deterministic(transcript.seed, transcript.clock);
    let mut conversation = Conversation::new(&ctx, form);
    let mut mismatches = Vec::new();

    for turn in &transcript.turns {
        let actual = match turn.input.as_deref() {
            None => Some(conversation.start(&ctx, FormValues::new())?),
            Some(_) if conversation.is_done() => None,
            Some(input) => Some(conversation.respond(&ctx, input)?),
        };
        if actual.as_deref() == Some(turn.output.as_str()) {
            debug!(seq = turn.seq, "turn matches");
            continue;
        }
        warn!(seq = turn.seq, input = ?turn.input, "reply differs from transcript");
        mismatches.push(Mismatch {
            seq: turn.seq,
            input: turn.input.clone(),
            expected: turn.output.clone(),
            actual,
        });
    }

    Ok(ReplayReport {
        turns: transcript.turns.len(),
        mismatches,
    })
}
