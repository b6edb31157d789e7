//! Parsing of pattern strings into elements.
//!
//! Literal text passes through; everything in braces is an element:
//!
//! | Element            | Renders                                              |
//! |--------------------|------------------------------------------------------|
//! | `{}` `{:fmt}`      | value of the current field                           |
//! | `{&}`              | description of the current field                     |
//! | `{Field:fmt}`      | value of a named field                               |
//! | `{&Field}`         | description of a named field                         |
//! | `{\|\|}`           | choice list of the current field                     |
//! | `{[ ... ]}`        | non-empty nested elements joined as a list           |
//! | `{*}` `{*filled}`  | status of every active (or every filled) field       |
//! | `{0}` `{1:fmt}`    | positional argument                                  |
//! | `{? ... }`         | nested content, or nothing if any element is empty   |
//!
//! Formats are `F<n>` (fixed decimals), `N<n>` (grouped thousands), `lower`,
//! `upper`, or a chrono `%` strftime string for dates.

use chrono::format::{Item, StrftimeItems};

use crate::error::{TemplateError, TemplateErrorKind};

/// A formatting directive attached to a value or argument element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Format {
    /// Fixed number of decimals.
    Fixed(usize),
    /// Thousands separators and a fixed number of decimals.
    Grouped(usize),
    /// Lower-case text.
    Lower,
    /// Upper-case text.
    Upper,
    /// strftime-style date format.
    DateTime(String),
}

impl Format {
    fn parse(spec: &str) -> Option<Self> {
        let digits = |rest: &str| {
            if rest.is_empty() {
                Some(2)
            } else {
                rest.parse().ok()
            }
        };
        match spec {
            "lower" => Some(Self::Lower),
            "upper" => Some(Self::Upper),
            s if s.starts_with('%') => {
                let valid = StrftimeItems::new(s).all(|item| !matches!(item, Item::Error));
                valid.then(|| Self::DateTime(s.to_string()))
            }
            s => {
                let mut chars = s.chars();
                match chars.next()? {
                    'F' | 'f' => digits(chars.as_str()).map(Self::Fixed),
                    'N' | 'n' => digits(chars.as_str()).map(Self::Grouped),
                    _ => None,
                }
            }
        }
    }
}

/// One parsed piece of a pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    /// Text emitted verbatim.
    Literal(String),
    /// `{}` / `{:fmt}`.
    CurrentValue(Option<Format>),
    /// `{&}`.
    CurrentDescription,
    /// `{Field:fmt}`.
    FieldValue {
        /// Referenced field name.
        field: String,
        /// Optional format.
        format: Option<Format>,
    },
    /// `{&Field}`.
    FieldDescription(String),
    /// `{||}`.
    Choices,
    /// `{[ ... ]}`.
    ListJoin(Vec<Element>),
    /// `{*}` / `{*filled}`.
    Status {
        /// Only fields holding a value.
        filled_only: bool,
    },
    /// `{n:fmt}`.
    Argument {
        /// Zero-based argument index.
        index: usize,
        /// Optional format.
        format: Option<Format>,
    },
    /// `{? ... }`.
    Conditional(Vec<Element>),
}

/// A parsed pattern string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    source: String,
    elements: Vec<Element>,
}

impl Pattern {
    /// Parses a pattern string.
    ///
    /// # Errors
    ///
    /// Returns a [`TemplateError`] naming the first malformed element and its
    /// byte offset.
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        let elements = parse_sequence(source, 0)?;
        Ok(Self {
            source: source.to_string(),
            elements,
        })
    }

    /// The original pattern text.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Parsed elements in order.
    #[must_use]
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Every field named by `{Field}` or `{&Field}`, at any depth.
    #[must_use]
    pub fn field_references(&self) -> Vec<&str> {
        let mut names = Vec::new();
        collect_references(&self.elements, &mut names);
        names
    }

    /// Whether the pattern reads the current field's value or description
    /// outside any conditional.
    #[must_use]
    pub fn requires_field(&self) -> bool {
        fn needs(elements: &[Element]) -> bool {
            elements.iter().any(|e| match e {
                Element::CurrentValue(_) | Element::CurrentDescription => true,
                Element::ListJoin(inner) => needs(inner),
                _ => false,
            })
        }
        needs(&self.elements)
    }
}

fn collect_references<'a>(elements: &'a [Element], names: &mut Vec<&'a str>) {
    for element in elements {
        match element {
            Element::FieldValue { field, .. } | Element::FieldDescription(field) => {
                names.push(field);
            }
            Element::ListJoin(inner) | Element::Conditional(inner) => {
                collect_references(inner, names);
            }
            _ => {}
        }
    }
}

fn parse_sequence(source: &str, offset: usize) -> Result<Vec<Element>, TemplateError> {
    let mut elements = Vec::new();
    let mut literal = String::new();
    let mut rest = source;
    let mut pos = 0;

    while let Some(found) = rest.find(['{', '}']) {
        literal.push_str(&rest[..found]);
        let open = pos + found;
        if rest.as_bytes()[found] == b'}' {
            return Err(TemplateError::new(
                "}",
                offset + open,
                TemplateErrorKind::UnexpectedClose,
            ));
        }
        let close = matching_close(source, open).ok_or_else(|| {
            TemplateError::new(&source[open..], offset + open, TemplateErrorKind::Unterminated)
        })?;
        if !literal.is_empty() {
            elements.push(Element::Literal(std::mem::take(&mut literal)));
        }
        elements.push(parse_element(&source[open..=close], offset + open)?);
        pos = close + 1;
        rest = &source[pos..];
    }
    literal.push_str(rest);
    if !literal.is_empty() {
        elements.push(Element::Literal(literal));
    }
    Ok(elements)
}

fn matching_close(source: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, byte) in source.bytes().enumerate().skip(open) {
        match byte {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

fn is_field_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(|c| c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '.')
}

/// Parses one `{...}` element; `element` includes the braces.
fn parse_element(element: &str, position: usize) -> Result<Element, TemplateError> {
    let body = &element[1..element.len() - 1];
    let unknown = || TemplateError::new(element, position, TemplateErrorKind::UnknownElement);
    let format = |spec: Option<&str>| -> Result<Option<Format>, TemplateError> {
        match spec {
            None => Ok(None),
            Some(spec) => Format::parse(spec).map(Some).ok_or_else(|| {
                TemplateError::new(element, position, TemplateErrorKind::BadFormat(spec.into()))
            }),
        }
    };

    if let Some(inner) = body.strip_prefix('?') {
        return parse_sequence(inner, position + 2).map(Element::Conditional);
    }
    if let Some(inner) = body.strip_prefix('[').and_then(|b| b.strip_suffix(']')) {
        let inner_elements = parse_sequence(inner, position + 2)?;
        let mut items = Vec::new();
        for e in inner_elements {
            match e {
                Element::Literal(text) if text.trim().is_empty() => {}
                Element::Literal(_) => return Err(unknown()),
                other => items.push(other),
            }
        }
        return Ok(Element::ListJoin(items));
    }

    match body {
        "" => return Ok(Element::CurrentValue(None)),
        "&" => return Ok(Element::CurrentDescription),
        "||" => return Ok(Element::Choices),
        "*" => return Ok(Element::Status { filled_only: false }),
        "*filled" => return Ok(Element::Status { filled_only: true }),
        _ => {}
    }
    if let Some(spec) = body.strip_prefix(':') {
        return format(Some(spec)).map(Element::CurrentValue);
    }
    if let Some(name) = body.strip_prefix('&') {
        return if is_field_name(name) {
            Ok(Element::FieldDescription(name.to_string()))
        } else {
            Err(unknown())
        };
    }

    let (head, spec) = match body.split_once(':') {
        Some((head, spec)) => (head, Some(spec)),
        None => (body, None),
    };
    if head.chars().all(|c| c.is_ascii_digit()) {
        let index = head.parse().map_err(|_| unknown())?;
        return Ok(Element::Argument {
            index,
            format: format(spec)?,
        });
    }
    if is_field_name(head) {
        return Ok(Element::FieldValue {
            field: head.to_string(),
            format: format(spec)?,
        });
    }
    Err(unknown())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(text: &str) -> Element {
        Element::Literal(text.into())
    }

    fn field(name: &str) -> Element {
        Element::FieldValue {
            field: name.into(),
            format: None,
        }
    }

    fn argument(index: usize, format: Option<Format>) -> Element {
        Element::Argument { index, format }
    }

    #[test]
    fn parses_every_element_kind() {
        let pattern =
            Pattern::parse("{} {:F1} {&} {Size} {&Size} {||} {*} {*filled} {0} {1:N0}").unwrap();
        let kinds: Vec<&Element> = pattern
            .elements()
            .iter()
            .filter(|e| !matches!(e, Element::Literal(_)))
            .collect();
        assert_eq!(
            kinds,
            vec![
                &Element::CurrentValue(None),
                &Element::CurrentValue(Some(Format::Fixed(1))),
                &Element::CurrentDescription,
                &field("Size"),
                &Element::FieldDescription("Size".into()),
                &Element::Choices,
                &Element::Status { filled_only: false },
                &Element::Status { filled_only: true },
                &argument(0, None),
                &argument(1, Some(Format::Grouped(0))),
            ]
        );
    }

    #[test]
    fn nested_conditional_and_list() {
        let pattern = Pattern::parse("Wanted {?a {Size} pizza}{[{Size} {Crust}]}").unwrap();
        assert_eq!(
            pattern.elements(),
            &[
                lit("Wanted "),
                Element::Conditional(vec![
                    lit("a "),
                    field("Size"),
                    lit(" pizza"),
                ]),
                Element::ListJoin(vec![field("Size"), field("Crust")]),
            ]
        );
        assert_eq!(pattern.field_references(), vec!["Size", "Size", "Crust"]);
    }

    #[test]
    fn literal_text_is_preserved() {
        let pattern = Pattern::parse("Plain text: no elements.").unwrap();
        assert_eq!(pattern.elements(), &[lit("Plain text: no elements.")]);
        assert_eq!(pattern.source(), "Plain text: no elements.");
    }

    #[test]
    fn errors_carry_element_and_position() {
        let err = Pattern::parse("Hello {%bad}").unwrap_err();
        assert_eq!(err.position, 6);
        assert_eq!(err.element, "{%bad}");
        assert_eq!(err.kind, TemplateErrorKind::UnknownElement);

        let err = Pattern::parse("Oops {Size").unwrap_err();
        assert_eq!(err.kind, TemplateErrorKind::Unterminated);
        assert_eq!(err.position, 5);

        let err = Pattern::parse("stray } brace").unwrap_err();
        assert_eq!(err.kind, TemplateErrorKind::UnexpectedClose);
        assert_eq!(err.position, 6);
    }

    #[test]
    fn nested_error_position_is_absolute() {
        let err = Pattern::parse("ab{?cd {!}}").unwrap_err();
        assert_eq!(err.element, "{!}");
        assert_eq!(err.position, 7);
    }

    #[test]
    fn bad_formats_are_rejected() {
        let err = Pattern::parse("{Size:Q}").unwrap_err();
        assert_eq!(err.kind, TemplateErrorKind::BadFormat("Q".into()));
        assert!(Pattern::parse("{When:%Y-%m-%d}").is_ok());
        assert!(Pattern::parse("{When:%Q}").is_err());
    }

    #[test]
    fn list_join_rejects_stray_text() {
        assert!(Pattern::parse("{[{Size}, {Crust}]}").is_err());
    }

    #[test]
    fn requires_field_ignores_conditionals() {
        let requires = |source: &str| Pattern::parse(source).unwrap().requires_field();
        assert!(requires("Pick a {&}"));
        assert!(!requires("Sorry{? about {&}}."));
        assert!(!requires("{*}"));
        assert!(!requires("Change what?\n{||}"));
    }
}
