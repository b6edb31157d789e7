//! Which usage and arguments each field kind is prompted and helped with.

use crate::schema::{FieldKind, FieldSpec, Limits};
use crate::template::{TemplateOptions, TemplateUsage};

/// Usage rendered when asking for a field without a custom prompt.
pub(super) fn prompt_usage(kind: FieldKind) -> TemplateUsage {
    match kind {
        FieldKind::Enum => TemplateUsage::EnumSelectOne,
        FieldKind::EnumList => TemplateUsage::EnumSelectMany,
        FieldKind::Integer => TemplateUsage::Integer,
        FieldKind::Float => TemplateUsage::Double,
        FieldKind::Text => TemplateUsage::String,
        FieldKind::DateTime => TemplateUsage::DateTime,
        FieldKind::Bool => TemplateUsage::Bool,
    }
}

/// Usage and arguments for the kind-specific help line.
///
/// `choices` is the field's choice labels already joined for display.
pub(super) fn help_usage(
    field: &FieldSpec,
    options: &TemplateOptions,
    choices: &str,
) -> (TemplateUsage, Vec<String>) {
    let count = field.values().len() + usize::from(field.is_optional());
    let range = vec!["1".to_string(), count.to_string(), choices.to_string()];
    let limits = limit_args(field.limits()).to_vec();
    let words = vec![String::new(), String::new(), choices.to_string()];
    match field.kind() {
        FieldKind::Enum if options.allow_numbers => (TemplateUsage::EnumOneNumberHelp, range),
        FieldKind::Enum => (TemplateUsage::EnumOneWordHelp, words),
        FieldKind::EnumList if options.allow_numbers => (TemplateUsage::EnumManyNumberHelp, range),
        FieldKind::EnumList => (TemplateUsage::EnumManyWordHelp, words),
        FieldKind::Integer => (TemplateUsage::IntegerHelp, limits),
        FieldKind::Float => (TemplateUsage::DoubleHelp, limits),
        FieldKind::Text => (TemplateUsage::StringHelp, limits),
        FieldKind::DateTime => (TemplateUsage::DateTimeHelp, Vec::new()),
        FieldKind::Bool => (TemplateUsage::BoolHelp, Vec::new()),
    }
}

/// `[min, max]` for display; an absent bound is empty so conditionals drop it.
pub(super) fn limit_args(limits: &Limits) -> [String; 2] {
    [
        limits.min.map(format_bound).unwrap_or_default(),
        limits.max.map(format_bound).unwrap_or_default(),
    ]
}

/// Prompt arguments: limits for kinds that have them.
pub(super) fn prompt_args(field: &FieldSpec) -> Vec<String> {
    match field.kind() {
        FieldKind::Integer | FieldKind::Float | FieldKind::Text => {
            limit_args(field.limits()).to_vec()
        }
        _ => Vec::new(),
    }
}

fn format_bound(bound: f64) -> String {
    if bound.fract() == 0.0 && bound.abs() < 1e15 {
        format!("{bound:.0}")
    } else {
        bound.to_string()
    }
}
