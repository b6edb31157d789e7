//! Declarative active conditions for form definitions.
//!
//! ```yaml
//! active_when: { field: Delivery, equals: true }
//! active_when:
//!   all:
//!     - { field: Size, any_of: [Large, ExtraLarge] }
//!     - { field: Toppings, is_set: true }
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::ActivePredicate;
use crate::form::{FormValues, Value};

/// A condition over the current answers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Condition {
    /// Every nested condition holds.
    All {
        /// Nested conditions.
        all: Vec<Condition>,
    },
    /// At least one nested condition holds.
    Any {
        /// Nested conditions.
        any: Vec<Condition>,
    },
    /// The nested condition does not hold.
    Not {
        /// Negated condition.
        not: Box<Condition>,
    },
    /// Tests on one field's value.
    Field(FieldTest),
}

/// Tests on one field. Every test present must hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldTest {
    /// Field under test.
    pub field: String,
    /// Whether the field holds an answer other than "no preference".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_set: Option<bool>,
    /// The value equals this scalar.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equals: Option<serde_yaml::Value>,
    /// The value is unset or differs from this scalar.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub not_equals: Option<serde_yaml::Value>,
    /// The value equals one of these scalars.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub any_of: Option<Vec<serde_yaml::Value>>,
}

impl FieldTest {
    fn evaluate(&self, values: &FormValues) -> bool {
        let value = values.get(&self.field);
        let matches =
            |literal: &serde_yaml::Value| value.is_some_and(|v| v.matches_literal(literal));
        let answered = value.is_some_and(|v| *v != Value::NoPreference);

        self.is_set.is_none_or(|want| want == answered)
            && self.equals.as_ref().is_none_or(matches)
            && self.not_equals.as_ref().is_none_or(|literal| !matches(literal))
            && self.any_of.as_ref().is_none_or(|list| list.iter().any(matches))
    }
}

impl Condition {
    /// Evaluates the condition.
    #[must_use]
    pub fn evaluate(&self, values: &FormValues) -> bool {
        match self {
            Condition::All { all } => all.iter().all(|c| c.evaluate(values)),
            Condition::Any { any } => any.iter().any(|c| c.evaluate(values)),
            Condition::Not { not } => !not.evaluate(values),
            Condition::Field(test) => test.evaluate(values),
        }
    }

    /// Every field name the condition reads.
    #[must_use]
    pub fn references(&self) -> Vec<&str> {
        match self {
            Condition::All { all: list } | Condition::Any { any: list } => {
                list.iter().flat_map(Condition::references).collect()
            }
            Condition::Not { not } => not.references(),
            Condition::Field(test) => vec![test.field.as_str()],
        }
    }

    /// Turns the condition into an active predicate.
    #[must_use]
    pub fn into_predicate(self) -> ActivePredicate {
        Arc::new(move |values: &FormValues| self.evaluate(values))
    }
}
