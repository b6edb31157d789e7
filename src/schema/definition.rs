//! YAML form definitions.
//!
//! ```yaml
//! name: Pizza
//! options:
//!   choice_style: per_line
//! templates:
//!   NotUnderstood: ["Sorry, \"{0}\" isn't on the menu."]
//! fields:
//!   - name: Size
//!     kind: enum
//!     values: [Small, Medium, Large]
//!   - name: Crust
//!     kind: enum
//!     values:
//!       - name: ThinCrust
//!         terms: [crispy]
//!       - ThickCrust
//!   - name: Address
//!     kind: text
//!     active_when: { field: Delivery, equals: true }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use super::{Condition, FieldBuilder, FieldKind, FormBuilder, Limits, ValueBuilder};
use crate::error::SchemaError;
use crate::form::Form;
use crate::recognize::MatchOptions;
use crate::template::{TemplateOptions, TemplateUsage};
use crate::terms::TermOptions;

/// One pattern or several.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Patterns {
    /// A single pattern.
    One(String),
    /// Several patterns, picked among at random.
    Many(Vec<String>),
}

impl Patterns {
    fn into_vec(self) -> Vec<String> {
        match self {
            Patterns::One(pattern) => vec![pattern],
            Patterns::Many(patterns) => patterns,
        }
    }
}

/// A whole form.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FormDefinition {
    /// Form name.
    pub name: String,
    /// Form-wide rendering options.
    #[serde(default)]
    pub options: TemplateOptions,
    /// Fuzzy matching options.
    #[serde(default)]
    pub matching: MatchOptions,
    /// Form-wide template overrides.
    #[serde(default)]
    pub templates: BTreeMap<TemplateUsage, Patterns>,
    /// Fields in the order they are asked.
    pub fields: Vec<FieldDefinition>,
}

/// One field.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldDefinition {
    /// Unique name.
    pub name: String,
    /// Answer kind.
    pub kind: FieldKind,
    /// Display text; defaults to the name split into words.
    #[serde(default)]
    pub description: Option<String>,
    /// Accept "no preference".
    #[serde(default)]
    pub optional: bool,
    /// Ask only while this holds.
    #[serde(default)]
    pub active_when: Option<Condition>,
    /// Bounds on the answer.
    #[serde(default)]
    pub limits: Limits,
    /// Custom prompt.
    #[serde(default)]
    pub prompt: Option<Patterns>,
    /// Per-field template overrides.
    #[serde(default)]
    pub templates: BTreeMap<TemplateUsage, Patterns>,
    /// Extra phrases naming the field.
    #[serde(default)]
    pub terms: Vec<String>,
    /// Regular expressions naming the field.
    #[serde(default)]
    pub patterns: Vec<String>,
    /// Term generation options.
    #[serde(default)]
    pub term_options: TermOptions,
    /// Values of an enumerated field.
    #[serde(default)]
    pub values: Vec<ValueDefinition>,
    /// Per-field rendering options; replace the form's options for this field.
    #[serde(default)]
    pub options: Option<TemplateOptions>,
}

/// A value given by name alone or in full.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ValueDefinition {
    /// Just the name.
    Name(String),
    /// Name plus description and terms.
    Full(ValueDetails),
}

/// A fully specified value.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ValueDetails {
    /// Identifier.
    pub name: String,
    /// Display text.
    #[serde(default)]
    pub description: Option<String>,
    /// Extra phrases.
    #[serde(default)]
    pub terms: Vec<String>,
    /// Regular expressions.
    #[serde(default)]
    pub patterns: Vec<String>,
    /// Term generation options; defaults to the field's.
    #[serde(default)]
    pub term_options: Option<TermOptions>,
}

impl From<ValueDefinition> for ValueBuilder {
    fn from(definition: ValueDefinition) -> Self {
        match definition {
            ValueDefinition::Name(name) => ValueBuilder::new(name),
            ValueDefinition::Full(details) => {
                let mut value = ValueBuilder::new(details.name).terms(details.terms);
                if let Some(description) = details.description {
                    value = value.describe(description);
                }
                for pattern in details.patterns {
                    value = value.pattern(pattern);
                }
                if let Some(options) = details.term_options {
                    value = value.term_options(options);
                }
                value
            }
        }
    }
}

impl From<FieldDefinition> for FieldBuilder {
    fn from(definition: FieldDefinition) -> Self {
        let mut field = FieldBuilder::new(definition.name, definition.kind)
            .limits(definition.limits)
            .terms(definition.terms)
            .term_options(definition.term_options)
            .values(definition.values);
        if let Some(description) = definition.description {
            field = field.describe(description);
        }
        if definition.optional {
            field = field.optional();
        }
        if let Some(condition) = definition.active_when {
            field = field.condition(condition);
        }
        for prompt in definition.prompt.map(Patterns::into_vec).unwrap_or_default() {
            field = field.prompt(prompt);
        }
        for (usage, patterns) in definition.templates {
            field = field.template(usage, patterns.into_vec());
        }
        for pattern in definition.patterns {
            field = field.pattern(pattern);
        }
        if let Some(options) = definition.options {
            field = field.options(options);
        }
        field
    }
}

impl FormDefinition {
    /// Parses a definition from YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Parse`] on malformed YAML or unknown keys.
    pub fn from_yaml(text: &str) -> Result<Self, SchemaError> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Reads and parses a definition file.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Io`] if the file cannot be read, or
    /// [`SchemaError::Parse`] if it is not a valid definition.
    pub fn load(path: &Path) -> Result<Self, SchemaError> {
        let text = std::fs::read_to_string(path).map_err(|source| SchemaError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&text)
    }

    /// Converts the definition into a builder.
    #[must_use]
    pub fn into_builder(self) -> FormBuilder {
        let mut builder = FormBuilder::new(self.name)
            .options(self.options)
            .matching(self.matching);
        for (usage, patterns) in self.templates {
            builder = builder.template(usage, patterns.into_vec());
        }
        for field in self.fields {
            builder = builder.field(field.into());
        }
        builder
    }

    /// Validates and builds the form.
    ///
    /// # Errors
    ///
    /// Returns any [`SchemaError`] raised by [`FormBuilder::build`].
    pub fn build(self) -> Result<Form, SchemaError> {
        self.into_builder().build()
    }
}
