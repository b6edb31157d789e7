//! Pattern rendering: parsed templates, the usage table, and the renderer.
//!
//! Every message the engine emits comes from a [`TemplateUsage`]. A form may
//! register several patterns per usage; one is picked at random per render
//! through the injected [`crate::ports::RandomSource`]. Field-level overrides
//! take precedence over the form table, which takes precedence over the
//! built-in defaults.

mod defaults;
pub mod options;
pub mod pattern;
pub mod render;

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{SchemaError, TemplateError};

pub use options::{ChoiceStyle, FeedbackPolicy, TemplateOptions};
pub use pattern::{Element, Format, Pattern};
pub use render::{Renderer, Scope};

/// A named slot in the template table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TemplateUsage {
    /// Prompt for a yes/no field.
    Bool,
    /// Help line for a yes/no field.
    BoolHelp,
    /// Asks which of several candidates was meant. `{0}` is the contested text.
    Clarify,
    /// Summary shown before completing.
    Confirmation,
    /// Suffix naming the current value.
    CurrentChoice,
    /// Prompt for a date/time field.
    DateTime,
    /// Help line for a date/time field.
    DateTimeHelp,
    /// Prompt for a floating-point field. `{0}`/`{1}` are the limits.
    Double,
    /// Help line for a floating-point field.
    DoubleHelp,
    /// Help line for a single-choice field with numbers. `{0}`-`{1}` range, `{2}` choices.
    EnumOneNumberHelp,
    /// Help line for a multi-choice field with numbers.
    EnumManyNumberHelp,
    /// Help line for a single-choice field without numbers.
    EnumOneWordHelp,
    /// Help line for a multi-choice field without numbers.
    EnumManyWordHelp,
    /// Prompt for a single-choice field.
    EnumSelectOne,
    /// Prompt for a multi-choice field.
    EnumSelectMany,
    /// Echo of an accepted answer. `{0}` lists words not understood.
    Feedback,
    /// Help while answering a field. `{0}` field help, `{1}` commands, `{2}` navigation.
    Help,
    /// Help while clarifying.
    HelpClarify,
    /// Help while confirming.
    HelpConfirm,
    /// Help while choosing a field to change.
    HelpNavigation,
    /// Prompt for an integer field. `{0}`/`{1}` are the limits.
    Integer,
    /// Help line for an integer field.
    IntegerHelp,
    /// Asks which field to change.
    Navigation,
    /// Help line listing reachable fields. `{0}` is the list.
    NavigationCommandHelp,
    /// One entry of the navigation list.
    NavigationFormat,
    /// Help line while choosing a field to change.
    NavigationHelp,
    /// Display text of the "no preference" value.
    NoPreference,
    /// Rejection of an answer. `{0}` is the input.
    NotUnderstood,
    /// Notice for `back` with nothing to go back to.
    NoPrevious,
    /// Rejection of an answer outside the field's limits. `{0}` value, `{1}`/`{2}` limits.
    OutOfRange,
    /// Response to the `status` command.
    Status,
    /// One line of a status block.
    StatusFormat,
    /// Prompt for a text field.
    String,
    /// Help line for a text field. `{0}`/`{1}` are the length limits.
    StringHelp,
    /// Display text of a field with no value.
    Unspecified,
    /// Help line listing commands. `{0}` is the list.
    CommandHelp,
    /// Farewell after `quit`.
    Cancelled,
    /// Farewell after confirming.
    Completed,
}

impl TemplateUsage {
    /// Every usage, in declaration order.
    pub const ALL: [TemplateUsage; 38] = [
        Self::Bool,
        Self::BoolHelp,
        Self::Clarify,
        Self::Confirmation,
        Self::CurrentChoice,
        Self::DateTime,
        Self::DateTimeHelp,
        Self::Double,
        Self::DoubleHelp,
        Self::EnumOneNumberHelp,
        Self::EnumManyNumberHelp,
        Self::EnumOneWordHelp,
        Self::EnumManyWordHelp,
        Self::EnumSelectOne,
        Self::EnumSelectMany,
        Self::Feedback,
        Self::Help,
        Self::HelpClarify,
        Self::HelpConfirm,
        Self::HelpNavigation,
        Self::Integer,
        Self::IntegerHelp,
        Self::Navigation,
        Self::NavigationCommandHelp,
        Self::NavigationFormat,
        Self::NavigationHelp,
        Self::NoPreference,
        Self::NotUnderstood,
        Self::NoPrevious,
        Self::OutOfRange,
        Self::Status,
        Self::StatusFormat,
        Self::String,
        Self::StringHelp,
        Self::Unspecified,
        Self::CommandHelp,
        Self::Cancelled,
        Self::Completed,
    ];

    /// Usages rendered with no field in scope.
    #[must_use]
    pub fn is_form_level(self) -> bool {
        matches!(
            self,
            Self::Confirmation
                | Self::Navigation
                | Self::NoPrevious
                | Self::Status
                | Self::CommandHelp
                | Self::Cancelled
                | Self::Completed
                | Self::HelpConfirm
                | Self::HelpNavigation
                | Self::NavigationHelp
                | Self::NavigationCommandHelp
                | Self::BoolHelp
        )
    }
}

impl fmt::Display for TemplateUsage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Patterns registered per usage.
#[derive(Debug, Clone, Default)]
pub struct TemplateTable {
    entries: BTreeMap<TemplateUsage, Vec<Pattern>>,
}

impl TemplateTable {
    /// An empty table, used for per-field overrides.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A table holding the built-in pattern for every usage.
    ///
    /// # Errors
    ///
    /// Returns a [`SchemaError::Template`] if a built-in pattern fails to parse.
    pub fn with_defaults() -> Result<Self, SchemaError> {
        let mut table = Self::new();
        for usage in TemplateUsage::ALL {
            let patterns = parse_all(defaults::default_patterns(usage)).map_err(|source| {
                SchemaError::Template {
                    usage: usage.to_string(),
                    scope: "defaults".into(),
                    source,
                }
            })?;
            table.set(usage, patterns);
        }
        Ok(table)
    }

    /// Replaces the patterns for a usage. An empty list is ignored.
    pub fn set(&mut self, usage: TemplateUsage, patterns: Vec<Pattern>) {
        if !patterns.is_empty() {
            self.entries.insert(usage, patterns);
        }
    }

    /// Patterns registered for a usage.
    #[must_use]
    pub fn get(&self, usage: TemplateUsage) -> Option<&[Pattern]> {
        self.entries.get(&usage).map(Vec::as_slice)
    }

    /// Every registered usage and its patterns.
    pub fn iter(&self) -> impl Iterator<Item = (TemplateUsage, &[Pattern])> {
        self.entries.iter().map(|(usage, patterns)| (*usage, patterns.as_slice()))
    }

    /// Whether no usage is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Parses a list of pattern sources.
///
/// # Errors
///
/// Returns the first [`TemplateError`].
pub fn parse_all<S: AsRef<str>>(sources: &[S]) -> Result<Vec<Pattern>, TemplateError> {
    sources.iter().map(|s| Pattern::parse(s.as_ref())).collect()
}
