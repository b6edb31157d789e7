//! Builder API for declaring forms in code.
//!
//! ```
//! use formtalk::schema::{FieldBuilder, FormBuilder};
//!
//! let form = FormBuilder::new("Pizza")
//!     .field(FieldBuilder::enumeration("Size", ["Small", "Large"]))
//!     .field(FieldBuilder::list("Topping", ["Cheese", "Pepperoni"]))
//!     .build()
//!     .unwrap();
//! assert_eq!(form.schema().fields().len(), 2);
//! ```

use std::collections::HashSet;

use tracing::debug;

use super::{ActivePredicate, Condition, FieldKind, FieldSpec, Limits, Schema, ValueSpec};
use crate::error::{SchemaError, TemplateError, TemplateErrorKind};
use crate::form::Form;
use crate::language::describe;
use crate::recognize::MatchOptions;
use crate::template::{parse_all, Pattern, TemplateOptions, TemplateTable, TemplateUsage};
use crate::terms::{TermOptions, TermSet};

/// Declares one value of an enumerated field.
#[derive(Debug, Clone)]
pub struct ValueBuilder {
    name: String,
    description: Option<String>,
    terms: Vec<String>,
    patterns: Vec<String>,
    term_options: Option<TermOptions>,
}

impl ValueBuilder {
    /// A value named `name`; its description defaults to the name split into words.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            terms: Vec::new(),
            patterns: Vec::new(),
            term_options: None,
        }
    }

    /// Sets the display text.
    #[must_use]
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Adds literal phrases that name this value.
    #[must_use]
    pub fn terms<I, S>(mut self, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.terms.extend(terms.into_iter().map(Into::into));
        self
    }

    /// Adds a regular expression that names this value.
    #[must_use]
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.patterns.push(pattern.into());
        self
    }

    /// Overrides term generation for this value.
    #[must_use]
    pub fn term_options(mut self, options: TermOptions) -> Self {
        self.term_options = Some(options);
        self
    }
}

impl From<&str> for ValueBuilder {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for ValueBuilder {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

/// Declares one field.
pub struct FieldBuilder {
    name: String,
    kind: FieldKind,
    description: Option<String>,
    optional: bool,
    active: Option<ActivePredicate>,
    condition_refs: Vec<String>,
    limits: Limits,
    prompt: Vec<String>,
    templates: Vec<(TemplateUsage, Vec<String>)>,
    terms: Vec<String>,
    patterns: Vec<String>,
    term_options: TermOptions,
    values: Vec<ValueBuilder>,
    options: Option<TemplateOptions>,
}

impl FieldBuilder {
    /// A required field of the given kind.
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            description: None,
            optional: false,
            active: None,
            condition_refs: Vec::new(),
            limits: Limits::default(),
            prompt: Vec::new(),
            templates: Vec::new(),
            terms: Vec::new(),
            patterns: Vec::new(),
            term_options: TermOptions::default(),
            values: Vec::new(),
            options: None,
        }
    }

    /// A single-choice field.
    pub fn enumeration<I, V>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<ValueBuilder>,
    {
        Self::new(name, FieldKind::Enum).values(values)
    }

    /// A multi-choice field.
    pub fn list<I, V>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<ValueBuilder>,
    {
        Self::new(name, FieldKind::EnumList).values(values)
    }

    /// A whole-number field.
    pub fn integer(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Integer)
    }

    /// A decimal field.
    pub fn float(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Float)
    }

    /// A free-text field.
    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Text)
    }

    /// A date/time field.
    pub fn datetime(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::DateTime)
    }

    /// A yes/no field.
    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Bool)
    }

    /// Sets the display text.
    #[must_use]
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Accepts "no preference" as an answer.
    #[must_use]
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Asks the field only while `predicate` holds.
    #[must_use]
    pub fn active_when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&crate::form::FormValues) -> bool + Send + Sync + 'static,
    {
        self.active = Some(std::sync::Arc::new(predicate));
        self.condition_refs.clear();
        self
    }

    /// Asks the field only while a declarative condition holds.
    #[must_use]
    pub fn condition(mut self, condition: Condition) -> Self {
        self.condition_refs = condition
            .references()
            .into_iter()
            .map(String::from)
            .collect();
        self.active = Some(condition.into_predicate());
        self
    }

    /// Sets both bounds.
    #[must_use]
    pub fn limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Sets the lower bound.
    #[must_use]
    pub fn min(mut self, min: f64) -> Self {
        self.limits.min = Some(min);
        self
    }

    /// Sets the upper bound.
    #[must_use]
    pub fn max(mut self, max: f64) -> Self {
        self.limits.max = Some(max);
        self
    }

    /// Adds a custom prompt pattern; several are picked among at random.
    #[must_use]
    pub fn prompt(mut self, pattern: impl Into<String>) -> Self {
        self.prompt.push(pattern.into());
        self
    }

    /// Overrides a template usage for this field.
    #[must_use]
    pub fn template<I, S>(mut self, usage: TemplateUsage, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let patterns = patterns.into_iter().map(Into::into).collect();
        self.templates.push((usage, patterns));
        self
    }

    /// Adds literal phrases that name this field.
    #[must_use]
    pub fn terms<I, S>(mut self, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.terms.extend(terms.into_iter().map(Into::into));
        self
    }

    /// Adds a regular expression that names this field.
    #[must_use]
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.patterns.push(pattern.into());
        self
    }

    /// Controls term generation for the field and, unless overridden, its values.
    #[must_use]
    pub fn term_options(mut self, options: TermOptions) -> Self {
        self.term_options = options;
        self
    }

    /// Adds one value.
    #[must_use]
    pub fn value(mut self, value: impl Into<ValueBuilder>) -> Self {
        self.values.push(value.into());
        self
    }

    /// Adds several values.
    #[must_use]
    pub fn values<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<ValueBuilder>,
    {
        self.values.extend(values.into_iter().map(Into::into));
        self
    }

    /// Overrides rendering options for this field.
    #[must_use]
    pub fn options(mut self, options: TemplateOptions) -> Self {
        self.options = Some(options);
        self
    }
}

/// Declares a form: an ordered list of fields plus form-wide templates and options.
pub struct FormBuilder {
    name: String,
    fields: Vec<FieldBuilder>,
    templates: Vec<(TemplateUsage, Vec<String>)>,
    options: TemplateOptions,
    matching: MatchOptions,
}

impl FormBuilder {
    /// An empty form.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            templates: Vec::new(),
            options: TemplateOptions::default(),
            matching: MatchOptions::default(),
        }
    }

    /// Appends a field; fields are asked in declaration order.
    #[must_use]
    pub fn field(mut self, field: FieldBuilder) -> Self {
        self.fields.push(field);
        self
    }

    /// Replaces the default patterns of a usage for the whole form.
    #[must_use]
    pub fn template<I, S>(mut self, usage: TemplateUsage, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let patterns = patterns.into_iter().map(Into::into).collect();
        self.templates.push((usage, patterns));
        self
    }

    /// Sets form-wide rendering options.
    #[must_use]
    pub fn options(mut self, options: TemplateOptions) -> Self {
        self.options = options;
        self
    }

    /// Sets fuzzy matching options.
    #[must_use]
    pub fn matching(mut self, matching: MatchOptions) -> Self {
        self.matching = matching;
        self
    }

    /// Validates the declaration and builds the form.
    ///
    /// # Errors
    ///
    /// Returns the first [`SchemaError`] found: duplicate or conflicting
    /// names, enumerated fields without values, empty term sets, invalid
    /// regular expressions, inverted limits, malformed templates or templates
    /// naming unknown fields, and conditions naming unknown fields.
    pub fn build(self) -> Result<Form, SchemaError> {
        if self.fields.is_empty() {
            return Err(SchemaError::Empty(self.name));
        }
        let mut names = HashSet::new();
        for field in &self.fields {
            if !names.insert(field.name.clone()) {
                return Err(SchemaError::DuplicateField(field.name.clone()));
            }
        }

        let mut table = TemplateTable::with_defaults()?;
        for (usage, sources) in &self.templates {
            let patterns = compile_patterns(sources, &names, &usage.to_string(), "form")?;
            if usage.is_form_level() {
                if let Some(pattern) = patterns.iter().find(|p| p.requires_field()) {
                    return Err(SchemaError::Template {
                        usage: usage.to_string(),
                        scope: "form".into(),
                        source: TemplateError::new(
                            pattern.source(),
                            0,
                            TemplateErrorKind::NoFieldInScope,
                        ),
                    });
                }
            }
            table.set(*usage, patterns);
        }

        let mut fields = Vec::with_capacity(self.fields.len());
        for field in self.fields {
            fields.push(build_field(field, &names)?);
        }
        debug!(form = %self.name, fields = fields.len(), "built form schema");

        Ok(Form::new(Schema {
            name: self.name,
            fields,
            templates: table,
            options: self.options,
            matching: self.matching,
        }))
    }
}

fn compile_patterns(
    sources: &[String],
    names: &HashSet<String>,
    usage: &str,
    scope: &str,
) -> Result<Vec<Pattern>, SchemaError> {
    let wrap = |source: TemplateError| SchemaError::Template {
        usage: usage.into(),
        scope: scope.into(),
        source,
    };
    let patterns = parse_all(sources).map_err(wrap)?;
    for pattern in &patterns {
        let unknown = pattern
            .field_references()
            .into_iter()
            .find(|name| !names.contains(*name));
        if let Some(unknown) = unknown {
            let position = pattern
                .source()
                .find(unknown)
                .map_or(0, |p| p.saturating_sub(1));
            return Err(wrap(TemplateError::new(
                format!("{{{unknown}}}"),
                position,
                TemplateErrorKind::UnknownField(unknown.to_string()),
            )));
        }
    }
    Ok(patterns)
}

fn build_terms(
    owner: &str,
    name: &str,
    description: &str,
    options: &TermOptions,
    phrases: Vec<String>,
    patterns: Vec<String>,
) -> Result<TermSet, SchemaError> {
    let terms = TermSet::generated(name, description, options)
        .with_phrases(phrases)
        .with_patterns(patterns)
        .map_err(|(pattern, source)| SchemaError::BadPattern {
            owner: owner.to_string(),
            pattern,
            source,
        })?;
    if terms.is_empty() {
        return Err(SchemaError::NoTerms(owner.to_string()));
    }
    Ok(terms)
}

fn build_field(field: FieldBuilder, names: &HashSet<String>) -> Result<FieldSpec, SchemaError> {
    let name = field.name;
    if let (Some(min), Some(max)) = (field.limits.min, field.limits.max) {
        if min > max {
            return Err(SchemaError::InvertedLimits(name));
        }
    }
    if field.kind.is_enumerated() && field.values.is_empty() {
        return Err(SchemaError::NoValues(name));
    }
    let unknown = field
        .condition_refs
        .iter()
        .find(|r| !names.contains(r.as_str()));
    if let Some(reference) = unknown {
        return Err(SchemaError::UnknownConditionField {
            field: name,
            reference: reference.clone(),
        });
    }

    let description = field.description.unwrap_or_else(|| describe(&name));
    let terms = build_terms(
        &name,
        &name,
        &description,
        &field.term_options,
        field.terms,
        field.patterns,
    )?;

    let mut values = Vec::with_capacity(field.values.len());
    let mut seen = HashSet::new();
    for (ordinal, value) in field.values.into_iter().enumerate() {
        let value_description = value.description.unwrap_or_else(|| describe(&value.name));
        let keys: HashSet<String> =
            [value.name.to_lowercase(), value_description.to_lowercase()].into();
        for key in keys {
            if !seen.insert(key) {
                return Err(SchemaError::ConflictingValue {
                    field: name,
                    value: value.name,
                });
            }
        }
        let owner = format!("{name}.{}", value.name);
        let options = value.term_options.as_ref().unwrap_or(&field.term_options);
        let value_terms = build_terms(
            &owner,
            &value.name,
            &value_description,
            options,
            value.terms,
            value.patterns,
        )?;
        values.push(ValueSpec {
            name: value.name,
            description: value_description,
            terms: value_terms,
            ordinal,
        });
    }

    let prompt = compile_patterns(&field.prompt, names, "prompt", &name)?;
    let mut templates = TemplateTable::new();
    for (usage, sources) in &field.templates {
        templates.set(*usage, compile_patterns(sources, names, &usage.to_string(), &name)?);
    }

    Ok(FieldSpec {
        name,
        kind: field.kind,
        description,
        optional: field.optional,
        active: field.active,
        limits: field.limits,
        prompt,
        templates,
        terms,
        values,
        options: field.options,
    })
}
