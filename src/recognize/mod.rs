//! Recognition of free-text answers against term sets.
//!
//! [`recognize`] turns raw input into scored [`Candidate`]s plus the input
//! words nothing claimed. [`RecognitionResult::classify`] reduces that to the
//! four outcomes the navigation engine acts on. Recognition never touches
//! form state.

pub mod command;
mod matcher;
pub mod primitive;

use std::collections::BTreeMap;
use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::terms::TermSet;

pub use command::{is_keep_current, parse_command, Command};
pub use matcher::{position_number, recognize};

/// One thing the input may refer to.
#[derive(Debug, Clone, Copy)]
pub struct Choice<'a> {
    /// Caller-defined identifier returned in candidates.
    pub label: usize,
    /// Phrases and patterns that name this choice.
    pub terms: &'a TermSet,
    /// 1-based position for numeric entry; `None` disables numbers for it.
    pub position: Option<usize>,
}

/// Tunables for fuzzy matching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchOptions {
    /// Try misspelling-tolerant matching on words left over after exact matching.
    pub fuzzy: bool,
    /// Fraction of a phrase's words that must be found; the count must exceed it.
    pub min_coverage: f64,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            fuzzy: true,
            min_coverage: 0.5,
        }
    }
}

/// How sure the recognizer is about a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Confidence {
    /// Approximate match on some of a phrase's words.
    Low,
    /// Exact phrase, pattern, or numeric match.
    High,
}

/// A possible interpretation of part of the input.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Label of the matched [`Choice`].
    pub label: usize,
    /// Exact or approximate.
    pub confidence: Confidence,
    /// Coverage score in `0.0..=1.0`.
    pub score: f64,
    /// Token indices the candidate consumes.
    pub span: Range<usize>,
    /// The consumed input, verbatim.
    pub text: String,
}

/// All candidates for one input plus the words nothing matched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecognitionResult {
    /// Candidates ordered by span start.
    pub candidates: Vec<Candidate>,
    /// Unclaimed input fragments, verbatim, filler words removed.
    pub unmatched: Vec<String>,
}

/// Several choices competing for the same words.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ambiguity {
    /// The contested input, verbatim.
    pub text: String,
    /// Competing labels in choice order.
    pub labels: Vec<usize>,
}

/// What the engine should do with a recognition result.
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    /// Nothing matched.
    NotUnderstood,
    /// Every meaningful word was claimed by exactly one choice.
    Match {
        /// Resolved labels, first occurrence order, deduplicated.
        labels: Vec<usize>,
        /// Whether any resolution was approximate.
        approximate: bool,
    },
    /// Some words matched and some did not.
    Partial {
        /// Resolved labels.
        labels: Vec<usize>,
        /// Unclaimed fragments, verbatim.
        unmatched: Vec<String>,
    },
    /// At least one span matched more than one choice.
    Ambiguous {
        /// Labels resolved without conflict.
        resolved: Vec<usize>,
        /// Contested spans, in input order.
        ambiguities: Vec<Ambiguity>,
        /// Unclaimed fragments, verbatim.
        unmatched: Vec<String>,
    },
}

impl RecognitionResult {
    /// Reduces candidates to an outcome.
    ///
    /// With `many == false` the answer must be a single choice: when spans
    /// name more than one value, every resolved and contested label is folded
    /// into one ambiguity so the user picks among all of them.
    #[must_use]
    pub fn classify(&self, many: bool) -> Classification {
        if self.candidates.is_empty() {
            return Classification::NotUnderstood;
        }

        let mut spans: BTreeMap<(usize, usize), (String, Vec<usize>)> = BTreeMap::new();
        for candidate in &self.candidates {
            let entry = spans
                .entry((candidate.span.start, candidate.span.end))
                .or_insert_with(|| (candidate.text.clone(), Vec::new()));
            if !entry.1.contains(&candidate.label) {
                entry.1.push(candidate.label);
            }
        }

        let mut texts = Vec::new();
        let mut resolved = Vec::new();
        let mut ambiguities = Vec::new();
        for (text, labels) in spans.into_values() {
            texts.push(text.clone());
            if let [label] = labels.as_slice() {
                if !resolved.contains(label) {
                    resolved.push(*label);
                }
            } else {
                ambiguities.push(Ambiguity { text, labels });
            }
        }

        if !many && resolved.len() + ambiguities.len() > 1 {
            let mut labels = std::mem::take(&mut resolved);
            for ambiguity in ambiguities.drain(..) {
                for label in ambiguity.labels {
                    if !labels.contains(&label) {
                        labels.push(label);
                    }
                }
            }
            labels.sort_unstable();
            ambiguities.push(Ambiguity {
                text: texts.join(" "),
                labels,
            });
        }

        if !ambiguities.is_empty() {
            return Classification::Ambiguous {
                resolved,
                ambiguities,
                unmatched: self.unmatched.clone(),
            };
        }
        if !self.unmatched.is_empty() {
            return Classification::Partial {
                labels: resolved,
                unmatched: self.unmatched.clone(),
            };
        }
        let approximate = self.candidates.iter().any(|c| c.confidence == Confidence::Low);
        Classification::Match {
            labels: resolved,
            approximate,
        }
    }
}
