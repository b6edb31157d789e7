use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::ValueSpec;
use crate::form::FormValues;
use crate::template::{Pattern, TemplateOptions, TemplateTable};
use crate::terms::TermSet;

/// Decides from the current answers whether a field is asked.
pub type ActivePredicate = Arc<dyn Fn(&FormValues) -> bool + Send + Sync>;

/// The kind of answer a field takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// One of a fixed set of values.
    Enum,
    /// Any number of a fixed set of values.
    EnumList,
    /// Whole number.
    Integer,
    /// Decimal number.
    Float,
    /// Free text.
    Text,
    /// Date and time.
    DateTime,
    /// Yes or no.
    Bool,
}

impl FieldKind {
    /// Whether answers are picked from declared values.
    #[must_use]
    pub fn is_enumerated(self) -> bool {
        matches!(self, Self::Enum | Self::EnumList)
    }

    /// Whether answers are picked from a numbered list.
    #[must_use]
    pub fn has_choices(self) -> bool {
        matches!(self, Self::Enum | Self::EnumList | Self::Bool)
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Enum => "enum",
            Self::EnumList => "enum_list",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Text => "text",
            Self::DateTime => "date_time",
            Self::Bool => "bool",
        };
        f.write_str(name)
    }
}

/// Inclusive bounds: numeric range for numbers, character count for text,
/// selection count for multi-choice fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Lower bound.
    pub min: Option<f64>,
    /// Upper bound.
    pub max: Option<f64>,
}

impl Limits {
    /// Whether `value` lies within the bounds.
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        self.min.is_none_or(|min| value >= min) && self.max.is_none_or(|max| value <= max)
    }

    /// Whether neither bound is set.
    #[must_use]
    pub fn is_unbounded(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }
}

/// One slot of a form. Built by [`super::FormBuilder`]; immutable afterwards.
pub struct FieldSpec {
    pub(super) name: String,
    pub(super) kind: FieldKind,
    pub(super) description: String,
    pub(super) optional: bool,
    pub(super) active: Option<ActivePredicate>,
    pub(super) limits: Limits,
    pub(super) prompt: Vec<Pattern>,
    pub(super) templates: TemplateTable,
    pub(super) terms: TermSet,
    pub(super) values: Vec<ValueSpec>,
    pub(super) options: Option<TemplateOptions>,
}

impl FieldSpec {
    /// Unique field name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Answer kind.
    #[must_use]
    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    /// Display text.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Whether "no preference" is accepted.
    #[must_use]
    pub fn is_optional(&self) -> bool {
        self.optional
    }

    /// Whether the field is asked given the current answers.
    #[must_use]
    pub fn is_active(&self, values: &FormValues) -> bool {
        self.active.as_ref().is_none_or(|predicate| predicate(values))
    }

    /// Whether an active predicate is attached.
    #[must_use]
    pub fn is_conditional(&self) -> bool {
        self.active.is_some()
    }

    /// Bounds on the answer.
    #[must_use]
    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Custom prompt patterns; empty means the kind's default usage.
    #[must_use]
    pub fn prompt(&self) -> &[Pattern] {
        &self.prompt
    }

    /// Per-field template overrides.
    #[must_use]
    pub fn templates(&self) -> &TemplateTable {
        &self.templates
    }

    /// Terms that name this field, for jumping to it.
    #[must_use]
    pub fn terms(&self) -> &TermSet {
        &self.terms
    }

    /// Declared values, in ordinal order.
    #[must_use]
    pub fn values(&self) -> &[ValueSpec] {
        &self.values
    }

    /// Looks up a declared value by name.
    #[must_use]
    pub fn value(&self, name: &str) -> Option<&ValueSpec> {
        self.values.iter().find(|v| v.name() == name)
    }

    /// Per-field rendering options, if overridden.
    #[must_use]
    pub fn options(&self) -> Option<&TemplateOptions> {
        self.options.as_ref()
    }
}

impl fmt::Debug for FieldSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldSpec")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("optional", &self.optional)
            .field("conditional", &self.active.is_some())
            .field("values", &self.values.len())
            .finish_non_exhaustive()
    }
}
