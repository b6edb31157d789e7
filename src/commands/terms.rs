//! `formtalk terms` command.

use std::fmt::Write as _;
use std::path::Path;

use crate::form::Form;
use crate::terms::TermSet;

/// Execute the `terms` command.
///
/// # Errors
///
/// Returns an error string if the form does not build or `field` names no
/// field of it.
pub fn run(form_path: &Path, field: Option<&str>) -> Result<(), String> {
    let form = super::load_form(form_path)?;
    print!("{}", listing(&form, field)?);
    Ok(())
}

fn listing(form: &Form, only: Option<&str>) -> Result<String, String> {
    let schema = form.schema();
    let fields: Vec<_> = match only {
        Some(name) => vec![schema.field(name).ok_or_else(|| format!("no field named `{name}`"))?],
        None => schema.fields().iter().collect(),
    };

    let mut out = String::new();
    for field in fields {
        let _ = writeln!(out, "{}: {}", field.name(), describe(field.terms()));
        for value in field.values() {
            let _ = writeln!(out, "  {}: {}", value.name(), describe(value.terms()));
        }
    }
    Ok(out)
}

/// Phrases, then patterns between slashes.
fn describe(terms: &TermSet) -> String {
    let mut parts = terms.phrase_texts();
    parts.extend(terms.pattern_texts().into_iter().map(|p| format!("/{p}/")));
    parts.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> Form {
        Form::from_yaml(
            r"
name: Pizza
fields:
  - name: Size
    kind: enum
    values:
      - Small
      - name: ExtraLarge
        terms: [huge]
  - name: Count
    kind: integer
    patterns: ['^how many']
",
        )
        .unwrap()
    }

    #[test]
    fn lists_field_and_value_terms() {
        let text = listing(&form(), None).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].starts_with("Size: "));
        assert!(lines[0].contains("size"));
        assert!(lines[2].starts_with("  ExtraLarge: "));
        assert!(lines[2].contains("extra large"));
        assert!(lines[2].contains("huge"));
        assert!(lines[3].contains("/^how many/"));
    }

    #[test]
    fn filters_to_one_field() {
        let text = listing(&form(), Some("Count")).unwrap();
        assert_eq!(text.lines().count(), 1);
    }

    #[test]
    fn unknown_field_is_an_error() {
        assert_eq!(listing(&form(), Some("Crust")).unwrap_err(), "no field named `Crust`");
    }
}
