use serde::{Deserialize, Serialize};

use crate::language::Casing;

/// How a choice list is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChoiceStyle {
    /// Inline for short lists, one per line otherwise.
    #[default]
    Auto,
    /// `(1. Small, 2. Medium, or 3. Large)`.
    Inline,
    /// `(Small, Medium, or Large)`.
    InlineNoNumbers,
    /// One numbered choice per line.
    PerLine,
    /// One bulleted choice per line.
    Bulleted,
}

/// When to echo back what was understood.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackPolicy {
    /// After every accepted answer.
    Always,
    /// Only when the answer was partial or matched approximately.
    #[default]
    Auto,
    /// Never, except to name words that were not understood.
    Never,
}

/// Rendering preferences shared by every template of a form or field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateOptions {
    /// Layout of `{||}` choice lists.
    pub choice_style: ChoiceStyle,
    /// Format of one numbered choice; `{0}` is the number, `{1}` the description.
    pub choice_format: String,
    /// Separator between inline choices.
    pub choice_separator: String,
    /// Separator before the last inline choice.
    pub choice_last_separator: String,
    /// Separator between joined values.
    pub separator: String,
    /// Separator before the last joined value.
    pub last_separator: String,
    /// Casing of field descriptions.
    pub field_case: Casing,
    /// Casing of value descriptions.
    pub value_case: Casing,
    /// Number the choices and accept numbers as answers.
    pub allow_numbers: bool,
    /// Show the current value and accept "current choice" to keep it.
    pub allow_default: bool,
    /// When to echo back what was understood.
    pub feedback: FeedbackPolicy,
}

/// Lists up to this long render inline under [`ChoiceStyle::Auto`].
pub const AUTO_INLINE_MAX: usize = 4;

impl Default for TemplateOptions {
    fn default() -> Self {
        Self {
            choice_style: ChoiceStyle::Auto,
            choice_format: "{0}. {1}".into(),
            choice_separator: ", ".into(),
            choice_last_separator: ", or ".into(),
            separator: ", ".into(),
            last_separator: ", and ".into(),
            field_case: Casing::Default,
            value_case: Casing::Default,
            allow_numbers: true,
            allow_default: true,
            feedback: FeedbackPolicy::Auto,
        }
    }
}

impl TemplateOptions {
    /// Resolves [`ChoiceStyle::Auto`] for a list of `count` choices.
    #[must_use]
    pub fn style_for(&self, count: usize) -> ChoiceStyle {
        match self.choice_style {
            ChoiceStyle::Auto if count <= AUTO_INLINE_MAX => ChoiceStyle::Inline,
            ChoiceStyle::Auto => ChoiceStyle::PerLine,
            style => style,
        }
    }
}
