//! The read-only form declaration: fields, values, templates, and options.
//!
//! A [`Schema`] is built once, validated, and then shared by every
//! conversation running the form.

pub mod builder;
pub mod condition;
pub mod definition;
mod field;
mod value;

pub use builder::{FieldBuilder, FormBuilder, ValueBuilder};
pub use condition::{Condition, FieldTest};
pub use definition::FormDefinition;
pub use field::{ActivePredicate, FieldKind, FieldSpec, Limits};
pub use value::ValueSpec;

use crate::recognize::MatchOptions;
use crate::template::{TemplateOptions, TemplateTable};

/// A validated form declaration.
#[derive(Debug)]
pub struct Schema {
    name: String,
    fields: Vec<FieldSpec>,
    templates: TemplateTable,
    options: TemplateOptions,
    matching: MatchOptions,
}

impl Schema {
    /// Form name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fields in the order they are asked.
    #[must_use]
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Looks up a field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name() == name)
    }

    /// Position of a field by name.
    #[must_use]
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name() == name)
    }

    /// Form-wide templates, defaults included.
    #[must_use]
    pub fn templates(&self) -> &TemplateTable {
        &self.templates
    }

    /// Form-wide rendering options.
    #[must_use]
    pub fn options(&self) -> &TemplateOptions {
        &self.options
    }

    /// Rendering options for a field: its override or the form's.
    #[must_use]
    pub fn options_for<'a>(&'a self, field: Option<&'a FieldSpec>) -> &'a TemplateOptions {
        field.and_then(FieldSpec::options).unwrap_or(&self.options)
    }

    /// Fuzzy matching options.
    #[must_use]
    pub fn matching(&self) -> &MatchOptions {
        &self.matching
    }
}
