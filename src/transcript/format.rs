//! Transcript data structures.

use std::path::Path;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TranscriptError;

/// One turn: the user's line and the engine's reply.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TurnRecord {
    /// Sequence number (assigned automatically by the recorder).
    pub seq: u64,
    /// What the user typed; `None` for the opening prompt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,
    /// What was shown.
    pub output: String,
}

/// A recorded conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transcript {
    /// Human-readable name.
    pub name: String,
    /// Form definition the session ran, as given on the command line.
    pub form: String,
    /// When the transcript was written.
    pub recorded_at: DateTime<Utc>,
    /// Seed of the random source.
    pub seed: u64,
    /// The frozen clock relative dates were read against.
    pub clock: NaiveDateTime,
    /// Turns in order.
    pub turns: Vec<TurnRecord>,
}

impl Transcript {
    /// Parses a transcript from YAML.
    ///
    /// # Errors
    ///
    /// Returns [`TranscriptError::Format`] if the YAML is not a transcript.
    pub fn from_yaml(text: &str) -> Result<Self, TranscriptError> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Serializes to YAML.
    ///
    /// # Errors
    ///
    /// Returns [`TranscriptError::Format`] if serialization fails.
    pub fn to_yaml(&self) -> Result<String, TranscriptError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Reads a transcript file.
    ///
    /// # Errors
    ///
    /// Returns a [`TranscriptError`] if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, TranscriptError> {
        let text = std::fs::read_to_string(path).map_err(|source| TranscriptError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&text)
    }
}
