//! Evaluation of parsed patterns against the live answers.
//!
//! A [`Renderer`] borrows the schema, the effective answers, and a random
//! source; it never mutates anything. Output is normalized after
//! substitution: doubled spaces collapse and `a`/`an` are corrected.

use std::fmt::Write as _;

use chrono::{NaiveDateTime, Timelike};
use tracing::debug;

use super::options::ChoiceStyle;
use super::{Element, Format, Pattern, TemplateOptions, TemplateUsage};
use crate::error::{TemplateError, TemplateErrorKind};
use crate::form::{FormValues, Value};
use crate::language::{apply_case, build_list, collapse_whitespace, fix_articles};
use crate::ports::RandomSource;
use crate::schema::{FieldKind, FieldSpec, Schema};

/// What a pattern is rendered against besides the answers.
#[derive(Debug, Clone, Default)]
pub struct Scope<'a> {
    field: Option<&'a FieldSpec>,
    args: Vec<String>,
    choices: Option<Vec<String>>,
    unset_placeholder: bool,
}

impl<'a> Scope<'a> {
    /// No current field.
    #[must_use]
    pub fn form() -> Self {
        Self::default()
    }

    /// `field` is the current field for `{}`, `{&}`, and `{||}`.
    #[must_use]
    pub fn field(field: &'a FieldSpec) -> Self {
        Self {
            field: Some(field),
            ..Self::default()
        }
    }

    /// Positional arguments for `{0}`, `{1}`, ...
    #[must_use]
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Replaces the field's own values in `{||}` with these items.
    #[must_use]
    pub fn with_choices(mut self, choices: Vec<String>) -> Self {
        self.choices = Some(choices);
        self
    }

    /// The current field, if any.
    #[must_use]
    pub fn current_field(&self) -> Option<&'a FieldSpec> {
        self.field
    }

    fn status_line(field: &'a FieldSpec) -> Self {
        Self {
            field: Some(field),
            unset_placeholder: true,
            ..Self::default()
        }
    }
}

/// Renders patterns against one form's answers.
pub struct Renderer<'a> {
    schema: &'a Schema,
    values: &'a FormValues,
    random: &'a dyn RandomSource,
}

impl<'a> Renderer<'a> {
    /// Creates a renderer. `values` should already have inactive fields
    /// removed.
    #[must_use]
    pub fn new(schema: &'a Schema, values: &'a FormValues, random: &'a dyn RandomSource) -> Self {
        Self {
            schema,
            values,
            random,
        }
    }

    /// The patterns in effect for a usage: the field's override, else the
    /// form table.
    #[must_use]
    pub fn patterns(&self, usage: TemplateUsage, field: Option<&FieldSpec>) -> &'a [Pattern] {
        let overridden = field
            .and_then(|f| self.schema.field(f.name()))
            .and_then(|f| f.templates().get(usage));
        overridden
            .or_else(|| self.schema.templates().get(usage))
            .unwrap_or_default()
    }

    /// Renders the pattern registered for `usage`, picking a variant at random
    /// when several are registered.
    ///
    /// # Errors
    ///
    /// Returns a [`TemplateError`] if an element cannot be resolved, such as a
    /// missing argument outside a conditional.
    pub fn render_usage(
        &self,
        usage: TemplateUsage,
        scope: &Scope<'_>,
    ) -> Result<String, TemplateError> {
        let patterns = self.patterns(usage, scope.field);
        if patterns.len() > 1 {
            debug!(%usage, variants = patterns.len(), "choosing template variant");
        }
        self.render_one_of(patterns, scope)
    }

    /// Renders one of `patterns`, chosen at random. An empty list renders as
    /// empty text.
    ///
    /// # Errors
    ///
    /// See [`Renderer::render_usage`].
    pub fn render_one_of(
        &self,
        patterns: &[Pattern],
        scope: &Scope<'_>,
    ) -> Result<String, TemplateError> {
        match patterns {
            [] => Ok(String::new()),
            [only] => self.render(only, scope),
            several => {
                let index = self.random.choose(several.len()).min(several.len() - 1);
                self.render(&several[index], scope)
            }
        }
    }

    /// Renders a single pattern and normalizes the result.
    ///
    /// # Errors
    ///
    /// See [`Renderer::render_usage`].
    pub fn render(&self, pattern: &Pattern, scope: &Scope<'_>) -> Result<String, TemplateError> {
        let mut out = String::new();
        for element in pattern.elements() {
            out.push_str(&self.element(element, scope)?);
        }
        Ok(fix_articles(&collapse_whitespace(&out)))
    }

    fn options<'s>(&'s self, field: Option<&'s FieldSpec>) -> &'s TemplateOptions {
        self.schema.options_for(field)
    }

    fn element(&self, element: &Element, scope: &Scope<'_>) -> Result<String, TemplateError> {
        match element {
            Element::Literal(text) => Ok(text.clone()),
            Element::CurrentValue(format) => {
                let field = require_field(scope, element)?;
                match self.values.get(field.name()) {
                    Some(value) => self.format_value(field, value, format.as_ref()),
                    None if scope.unset_placeholder => {
                        self.render_usage(TemplateUsage::Unspecified, &Scope::form())
                    }
                    None => Ok(String::new()),
                }
            }
            Element::CurrentDescription => {
                let field = require_field(scope, element)?;
                Ok(self.describe(field))
            }
            Element::FieldValue { field, format } => {
                let spec = self.lookup(field, element)?;
                match self.values.get(field) {
                    Some(value) => self.format_value(spec, value, format.as_ref()),
                    None => Ok(String::new()),
                }
            }
            Element::FieldDescription(field) => {
                let spec = self.lookup(field, element)?;
                Ok(self.describe(spec))
            }
            Element::Choices => self.choices(scope, element),
            Element::ListJoin(items) => {
                let mut texts = Vec::new();
                for item in items {
                    let text = self.element(item, scope)?;
                    if !text.trim().is_empty() {
                        texts.push(text);
                    }
                }
                let options = self.options(scope.field);
                Ok(build_list(&texts, &options.separator, &options.last_separator))
            }
            Element::Status { filled_only } => self.status(*filled_only),
            Element::Argument { index, format } => {
                let arg = scope.args.get(*index).ok_or_else(|| {
                    TemplateError::new(
                        element_text(element),
                        0,
                        TemplateErrorKind::MissingArgument(*index),
                    )
                })?;
                Ok(format_argument(arg, format.as_ref()))
            }
            Element::Conditional(inner) => self.conditional(inner, scope),
        }
    }

    fn conditional(&self, inner: &[Element], scope: &Scope<'_>) -> Result<String, TemplateError> {
        let mut out = String::new();
        for element in inner {
            let text = match self.element(element, scope) {
                Ok(text) => text,
                Err(err)
                    if matches!(
                        err.kind,
                        TemplateErrorKind::MissingArgument(_) | TemplateErrorKind::NoFieldInScope
                    ) =>
                {
                    return Ok(String::new());
                }
                Err(err) => return Err(err),
            };
            let optional = matches!(element, Element::Literal(_) | Element::Conditional(_));
            if !optional && text.trim().is_empty() {
                return Ok(String::new());
            }
            out.push_str(&text);
        }
        Ok(out)
    }

    fn lookup(&self, name: &str, element: &Element) -> Result<&'a FieldSpec, TemplateError> {
        self.schema.field(name).ok_or_else(|| {
            TemplateError::new(
                element_text(element),
                0,
                TemplateErrorKind::UnknownField(name.to_string()),
            )
        })
    }

    fn describe(&self, field: &FieldSpec) -> String {
        apply_case(field.description(), self.options(Some(field)).field_case)
    }

    fn describe_value(&self, field: &FieldSpec, name: &str) -> String {
        let text = field.value(name).map_or(name, |v| v.description());
        apply_case(text, self.options(Some(field)).value_case)
    }

    fn no_preference(&self, field: Option<&FieldSpec>) -> Result<String, TemplateError> {
        let scope = Scope::form();
        self.render_one_of(self.patterns(TemplateUsage::NoPreference, field), &scope)
    }

    /// Display text for a committed answer.
    ///
    /// # Errors
    ///
    /// Fails only if the `NoPreference` pattern fails to render.
    pub fn format_value(
        &self,
        field: &FieldSpec,
        value: &Value,
        format: Option<&Format>,
    ) -> Result<String, TemplateError> {
        let options = self.options(Some(field));
        let text = match value {
            Value::Choice(name) => self.describe_value(field, name),
            Value::Choices(names) => {
                let described: Vec<String> = names
                    .iter()
                    .map(|n| self.describe_value(field, n))
                    .collect();
                build_list(&described, &options.separator, &options.last_separator)
            }
            #[allow(clippy::cast_precision_loss)]
            Value::Integer(n) => match format {
                Some(Format::Fixed(_) | Format::Grouped(_)) => format_number(*n as f64, format),
                _ => n.to_string(),
            },
            Value::Float(x) => format_number(*x, format),
            Value::Text(text) => text.clone(),
            Value::DateTime(at) => format_datetime(*at, format),
            Value::Bool(yes) => apply_case(if *yes { "Yes" } else { "No" }, options.value_case),
            Value::NoPreference => self.no_preference(Some(field))?,
        };
        Ok(match format {
            Some(Format::Lower) => text.to_lowercase(),
            Some(Format::Upper) => text.to_uppercase(),
            _ => text,
        })
    }

    fn choices(&self, scope: &Scope<'_>, element: &Element) -> Result<String, TemplateError> {
        let options = self.options(scope.field);
        let mut items = match &scope.choices {
            Some(items) => items.clone(),
            None => {
                let field = require_field(scope, element)?;
                self.field_choices(field)?
            }
        };
        items.retain(|item| !item.is_empty());

        let mut out = String::new();
        if !items.is_empty() {
            let style = options.style_for(items.len());
            let numbered = options.allow_numbers
                && !matches!(style, ChoiceStyle::InlineNoNumbers | ChoiceStyle::Bulleted);
            let entries: Vec<String> = items
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    if numbered {
                        options
                            .choice_format
                            .replace("{0}", &(i + 1).to_string())
                            .replace("{1}", item)
                    } else {
                        item.clone()
                    }
                })
                .collect();
            match style {
                ChoiceStyle::PerLine | ChoiceStyle::Auto => {
                    for entry in &entries {
                        let _ = write!(out, "\n  {entry}");
                    }
                }
                ChoiceStyle::Bulleted => {
                    for entry in &entries {
                        let _ = write!(out, "\n  * {entry}");
                    }
                }
                ChoiceStyle::Inline | ChoiceStyle::InlineNoNumbers => {
                    let list = build_list(
                        &entries,
                        &options.choice_separator,
                        &options.choice_last_separator,
                    );
                    let _ = write!(out, "({list})");
                }
            }
        }

        if let (None, Some(field)) = (&scope.choices, scope.field) {
            if options.allow_default && self.values.contains(field.name()) {
                let current =
                    self.render_usage(TemplateUsage::CurrentChoice, &Scope::field(field))?;
                if !current.is_empty() {
                    out.push(if out.contains('\n') { '\n' } else { ' ' });
                    out.push_str(&current);
                }
            }
        }
        Ok(out)
    }

    /// The labels `{||}` lists for a field, in numbering order.
    ///
    /// # Errors
    ///
    /// Fails only if the `NoPreference` pattern fails to render.
    pub fn field_choices(&self, field: &FieldSpec) -> Result<Vec<String>, TemplateError> {
        let mut items: Vec<String> = match field.kind() {
            FieldKind::Enum | FieldKind::EnumList => field
                .values()
                .iter()
                .map(|v| self.describe_value(field, v.name()))
                .collect(),
            FieldKind::Bool => {
                let casing = self.options(Some(field)).value_case;
                vec![apply_case("Yes", casing), apply_case("No", casing)]
            }
            _ => return Ok(Vec::new()),
        };
        if field.is_optional() {
            items.push(self.no_preference(Some(field))?);
        }
        Ok(items)
    }

    fn status(&self, filled_only: bool) -> Result<String, TemplateError> {
        let mut lines = Vec::new();
        for field in self.schema.fields() {
            let unfilled = !self.values.contains(field.name());
            if !field.is_active(self.values) || (filled_only && unfilled) {
                continue;
            }
            let line = self.render_usage(TemplateUsage::StatusFormat, &Scope::status_line(field))?;
            lines.push(line);
        }
        Ok(lines.join("\n"))
    }
}

fn require_field<'s>(
    scope: &Scope<'s>,
    element: &Element,
) -> Result<&'s FieldSpec, TemplateError> {
    scope.field.ok_or_else(|| {
        TemplateError::new(element_text(element), 0, TemplateErrorKind::NoFieldInScope)
    })
}

/// Reconstructs an element's source for error messages.
fn element_text(element: &Element) -> String {
    match element {
        Element::Literal(text) => text.clone(),
        Element::CurrentValue(_) => "{}".into(),
        Element::CurrentDescription => "{&}".into(),
        Element::FieldValue { field, .. } => format!("{{{field}}}"),
        Element::FieldDescription(field) => format!("{{&{field}}}"),
        Element::Choices => "{||}".into(),
        Element::ListJoin(_) => "{[...]}".into(),
        Element::Status { filled_only: false } => "{*}".into(),
        Element::Status { filled_only: true } => "{*filled}".into(),
        Element::Argument { index, .. } => format!("{{{index}}}"),
        Element::Conditional(_) => "{?...}".into(),
    }
}

fn format_argument(arg: &str, format: Option<&Format>) -> String {
    match format {
        None | Some(Format::DateTime(_)) => arg.to_string(),
        Some(Format::Lower) => arg.to_lowercase(),
        Some(Format::Upper) => arg.to_uppercase(),
        Some(Format::Fixed(_) | Format::Grouped(_)) => match arg.trim().parse::<f64>() {
            Ok(x) => format_number(x, format),
            Err(_) => arg.to_string(),
        },
    }
}

fn format_number(x: f64, format: Option<&Format>) -> String {
    match format {
        Some(Format::Fixed(decimals)) => format!("{x:.decimals$}"),
        Some(Format::Grouped(decimals)) => group_thousands(x, *decimals),
        _ => x.to_string(),
    }
}

fn group_thousands(x: f64, decimals: usize) -> String {
    let fixed = format!("{:.decimals$}", x.abs());
    let (whole, fraction) = fixed
        .split_once('.')
        .map_or((fixed.as_str(), None), |(w, f)| (w, Some(f)));
    let mut grouped = String::new();
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    if let Some(fraction) = fraction {
        grouped.push('.');
        grouped.push_str(fraction);
    }
    if x < 0.0 && fixed.chars().any(|c| c.is_ascii_digit() && c != '0') {
        grouped.insert(0, '-');
    }
    grouped
}

fn format_datetime(at: NaiveDateTime, format: Option<&Format>) -> String {
    let default = if at.time().num_seconds_from_midnight() == 0 {
        "%Y-%m-%d"
    } else {
        "%Y-%m-%d %H:%M"
    };
    let spec = match format {
        Some(Format::DateTime(spec)) => spec.as_str(),
        _ => default,
    };
    let mut out = String::new();
    if write!(out, "{}", at.format(spec)).is_err() {
        out.clear();
        let _ = write!(out, "{}", at.format(default));
    }
    out
}
