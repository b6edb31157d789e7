use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::Serialize;

/// A committed answer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Name of the chosen value of a single-choice field.
    Choice(String),
    /// Names of the chosen values of a multi-choice field, in declaration order.
    Choices(Vec<String>),
    /// Whole number.
    Integer(i64),
    /// Decimal number.
    Float(f64),
    /// Free text.
    Text(String),
    /// Date and time.
    DateTime(NaiveDateTime),
    /// Yes or no.
    Bool(bool),
    /// The user declined to answer an optional field.
    NoPreference,
}

impl Value {
    /// Compares against a scalar from a form definition. Choice names and text
    /// compare case-insensitively; lists match if they contain the scalar.
    #[must_use]
    pub fn matches_literal(&self, literal: &serde_yaml::Value) -> bool {
        use serde_yaml::Value as Y;
        match (self, literal) {
            (Value::Choice(name) | Value::Text(name), Y::String(s)) => {
                name.eq_ignore_ascii_case(s)
            }
            (Value::Choices(names), Y::String(s)) => {
                names.iter().any(|n| n.eq_ignore_ascii_case(s))
            }
            (Value::Integer(n), Y::Number(m)) => m.as_i64() == Some(*n),
            (Value::Float(x), Y::Number(m)) => m
                .as_f64()
                .is_some_and(|y| (x - y).abs() < f64::EPSILON),
            (Value::Bool(b), Y::Bool(c)) => b == c,
            (Value::NoPreference, Y::Null) => true,
            _ => false,
        }
    }
}

/// Committed answers keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FormValues(BTreeMap<String, Value>);

impl FormValues {
    /// An empty mapping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The value of a field, if set.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Whether the field holds a value.
    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Sets a field's value, returning the previous one.
    pub fn set(&mut self, field: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(field.into(), value)
    }

    /// Clears a field.
    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.0.remove(field)
    }

    /// Builder-style [`FormValues::set`].
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: Value) -> Self {
        self.set(field, value);
        self
    }

    /// Fields and values in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of fields holding a value.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no field holds a value.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_plain_json() {
        let values = FormValues::new()
            .with("Size", Value::Choice("Large".into()))
            .with("Topping", Value::Choices(vec!["Cheese".into(), "Pepperoni".into()]))
            .with("Tip", Value::NoPreference);
        let json = serde_json::to_string(&values).unwrap();
        assert_eq!(
            json,
            r#"{"Size":"Large","Tip":null,"Topping":["Cheese","Pepperoni"]}"#
        );
    }

    #[test]
    fn literal_comparison() {
        let yaml = |s: &str| serde_yaml::from_str::<serde_yaml::Value>(s).unwrap();
        assert!(Value::Choice("Large".into()).matches_literal(&yaml("large")));
        assert!(Value::Choices(vec!["Cheese".into()]).matches_literal(&yaml("Cheese")));
        assert!(Value::Bool(true).matches_literal(&yaml("true")));
        assert!(Value::Integer(3).matches_literal(&yaml("3")));
        assert!(!Value::Integer(3).matches_literal(&yaml("\"3\"")));
        assert!(Value::NoPreference.matches_literal(&yaml("null")));
    }
}
