use crate::terms::TermSet;

/// One admissible value of an enumerated field.
#[derive(Debug, Clone)]
pub struct ValueSpec {
    pub(super) name: String,
    pub(super) description: String,
    pub(super) terms: TermSet,
    pub(super) ordinal: usize,
}

impl ValueSpec {
    /// Identifier stored in [`crate::form::Value`].
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Display text.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Terms that name this value.
    #[must_use]
    pub fn terms(&self) -> &TermSet {
        &self.terms
    }

    /// Zero-based position; drives numbering and display order.
    #[must_use]
    pub fn ordinal(&self) -> usize {
        self.ordinal
    }
}
