//! Per-conversation state: answers, the navigation step, and history.

use super::{ClarificationContext, FormValues};

/// Where the conversation currently is.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Asking for the field at this index.
    AskingField(usize),
    /// Asking which candidate an ambiguous answer meant.
    Clarifying {
        /// Index of the field being answered.
        field: usize,
        /// Contested spans and what is already resolved.
        context: ClarificationContext,
    },
    /// Showing the summary and asking for a yes/no.
    Confirming,
    /// Asking which field to change.
    ChangingSelection,
    /// The user confirmed. Terminal.
    Completed,
    /// The user quit. Terminal.
    Cancelled,
}

impl Step {
    /// Whether no further input is accepted.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Step::Completed | Step::Cancelled)
    }

    /// Index of the field being asked or clarified.
    #[must_use]
    pub fn field(&self) -> Option<usize> {
        match self {
            Step::AskingField(field) | Step::Clarifying { field, .. } => Some(*field),
            _ => None,
        }
    }
}

/// A point `back` can return to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    /// Asking the field at this index.
    Field(usize),
    /// The confirmation summary.
    Confirm,
}

/// Everything one conversation owns.
///
/// `values` holds every committed answer, including answers to fields that
/// are currently inactive; those are hidden from prompts, status, and the
/// result until the field becomes active again.
#[derive(Debug, Clone, PartialEq)]
pub struct FormState {
    pub(super) values: FormValues,
    pub(super) step: Step,
    pub(super) history: Vec<Position>,
    pub(super) baseline: FormValues,
}

impl FormState {
    pub(super) fn new(initial: FormValues) -> Self {
        Self {
            values: initial.clone(),
            step: Step::AskingField(0),
            history: Vec::new(),
            baseline: initial,
        }
    }

    /// Committed answers, inactive fields included.
    #[must_use]
    pub fn values(&self) -> &FormValues {
        &self.values
    }

    /// Current navigation step.
    #[must_use]
    pub fn step(&self) -> &Step {
        &self.step
    }

    /// Positions `back` will return to, most recent last.
    #[must_use]
    pub fn history(&self) -> &[Position] {
        &self.history
    }

    /// Answers `reset` restores.
    #[must_use]
    pub fn baseline(&self) -> &FormValues {
        &self.baseline
    }

    /// Whether the conversation has ended.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.step.is_terminal()
    }
}
