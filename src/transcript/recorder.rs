//! Records conversation turns into a transcript file.

use std::path::PathBuf;

use chrono::{NaiveDateTime, Utc};

use super::format::{Transcript, TurnRecord};
use crate::error::TranscriptError;

/// Collects turns and writes them as a YAML transcript.
#[derive(Debug)]
pub struct TranscriptRecorder {
    path: PathBuf,
    name: String,
    form: String,
    seed: u64,
    clock: NaiveDateTime,
    turns: Vec<TurnRecord>,
    next_seq: u64,
}

impl TranscriptRecorder {
    /// Creates a recorder that will write to `path`.
    ///
    /// `seed` and `clock` must be the ones the conversation's context uses,
    /// or the transcript will not replay.
    pub fn new(
        path: impl Into<PathBuf>,
        name: impl Into<String>,
        form: impl Into<String>,
        seed: u64,
        clock: NaiveDateTime,
    ) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            form: form.into(),
            seed,
            clock,
            turns: Vec::new(),
            next_seq: 0,
        }
    }

    /// Records a turn. The `seq` field is assigned automatically.
    pub fn record(&mut self, input: Option<&str>, output: &str) {
        self.turns.push(TurnRecord {
            seq: self.next_seq,
            input: input.map(str::to_string),
            output: output.to_string(),
        });
        self.next_seq += 1;
    }

    /// Number of turns recorded so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Whether nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Finishes recording and writes the transcript to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn finish(self) -> Result<PathBuf, TranscriptError> {
        let transcript = Transcript {
            name: self.name,
            recorded_at: Utc::now(),
            form: self.form,
            seed: self.seed,
            clock: self.clock,
            turns: self.turns,
        };
        let yaml = transcript.to_yaml()?;
        std::fs::write(&self.path, yaml).map_err(|source| TranscriptError::Io {
            path: self.path.display().to_string(),
            source,
        })?;
        Ok(self.path)
    }
}
