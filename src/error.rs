//! Error types for schema construction, template handling, conversations,
//! and transcripts.
//!
//! Recognition outcomes (no match, partial, ambiguous) are not errors; they
//! are reported through [`crate::recognize::Classification`] and always lead
//! to a re-prompt.

use thiserror::Error;

/// What went wrong with a single template element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateErrorKind {
    /// An opening `{` has no matching `}`.
    Unterminated,
    /// A `}` appeared without an opening `{`.
    UnexpectedClose,
    /// The element body is not part of the pattern language.
    UnknownElement,
    /// The format specifier after `:` is not supported.
    BadFormat(String),
    /// A positional argument was referenced but not supplied.
    MissingArgument(usize),
    /// A field reference names no field of the form.
    UnknownField(String),
    /// A field element was used where no field is in scope.
    NoFieldInScope,
}

/// A malformed or unresolvable pattern element.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("template element `{element}` at byte {position}: {kind}")]
pub struct TemplateError {
    /// The offending element text, including braces where available.
    pub element: String,
    /// Byte offset of the element within the pattern.
    pub position: usize,
    /// The failure category.
    pub kind: TemplateErrorKind,
}

impl TemplateError {
    /// Creates a new template error.
    pub fn new(element: impl Into<String>, position: usize, kind: TemplateErrorKind) -> Self {
        Self {
            element: element.into(),
            position,
            kind,
        }
    }
}

impl std::fmt::Display for TemplateErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unterminated => write!(f, "unterminated element"),
            Self::UnexpectedClose => write!(f, "unexpected `}}`"),
            Self::UnknownElement => write!(f, "unknown element"),
            Self::BadFormat(spec) => write!(f, "unsupported format `{spec}`"),
            Self::MissingArgument(n) => write!(f, "argument {n} was not supplied"),
            Self::UnknownField(name) => write!(f, "unknown field `{name}`"),
            Self::NoFieldInScope => write!(f, "no field in scope"),
        }
    }
}

/// A form declaration that cannot be built.
///
/// Raised while building a [`crate::form::Form`]; never produced per turn.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Two fields share a name.
    #[error("duplicate field name `{0}`")]
    DuplicateField(String),
    /// Two values of one field share a name or description.
    #[error("field `{field}` has conflicting values `{value}`")]
    ConflictingValue {
        /// Owning field.
        field: String,
        /// Name or description that collides.
        value: String,
    },
    /// An enumerated field declares no values.
    #[error("field `{0}` is enumerated but has no values")]
    NoValues(String),
    /// A field or value ended up with an empty term set.
    #[error("`{0}` has no terms to match against")]
    NoTerms(String),
    /// A regular-expression term failed to compile.
    #[error("invalid pattern term `{pattern}` on `{owner}`: {source}")]
    BadPattern {
        /// Field or value owning the term.
        owner: String,
        /// The pattern text.
        pattern: String,
        /// Regex compiler error.
        #[source]
        source: regex::Error,
    },
    /// Minimum above maximum.
    #[error("field `{0}` has limits with min greater than max")]
    InvertedLimits(String),
    /// A template failed to parse or references something unknown.
    #[error("template {usage} for {scope}: {source}")]
    Template {
        /// The usage or prompt the pattern was registered for.
        usage: String,
        /// `form` or the owning field name.
        scope: String,
        /// Underlying template error.
        #[source]
        source: TemplateError,
    },
    /// An active condition names a field that does not exist.
    #[error("active condition on `{field}` references unknown field `{reference}`")]
    UnknownConditionField {
        /// Field carrying the condition.
        field: String,
        /// Missing field.
        reference: String,
    },
    /// The form has no fields at all.
    #[error("form `{0}` declares no fields")]
    Empty(String),
    /// The definition file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// File path.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The YAML definition could not be parsed.
    #[error("failed to parse form definition: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// An unexpected failure while stepping one conversation.
#[derive(Debug, Error)]
pub enum FormError {
    /// The state refers to a field index the form does not have.
    #[error("state references unknown field index {0}")]
    UnknownField(usize),
    /// A template could not be rendered against the live state.
    #[error("render failed: {0}")]
    Render(#[from] TemplateError),
    /// The conversation already reached a terminal state.
    #[error("conversation is already finished")]
    Finished,
    /// Input arrived before the conversation was started.
    #[error("conversation has not been started")]
    NotStarted,
}

/// A transcript that cannot be read or written.
#[derive(Debug, Error)]
pub enum TranscriptError {
    /// The file could not be read or written.
    #[error("transcript {path}: {source}")]
    Io {
        /// File path.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The YAML could not be parsed or produced.
    #[error("transcript format: {0}")]
    Format(#[from] serde_yaml::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_error_names_element_and_position() {
        let err = TemplateError::new("{%}", 7, TemplateErrorKind::UnknownElement);
        assert_eq!(err.to_string(), "template element `{%}` at byte 7: unknown element");
    }

    #[test]
    fn schema_error_wraps_template_error() {
        let err = SchemaError::Template {
            usage: "EnumSelectOne".into(),
            scope: "Size".into(),
            source: TemplateError::new("{Nope}", 0, TemplateErrorKind::UnknownField("Nope".into())),
        };
        let text = err.to_string();
        assert!(text.contains("EnumSelectOne"));
        assert!(text.contains("unknown field `Nope`"));
    }
}
