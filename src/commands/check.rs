//! `formtalk check` command.

use std::fmt::Write as _;
use std::path::Path;

use crate::form::Form;

/// Execute the `check` command.
///
/// # Errors
///
/// Returns an error string naming the file if the form does not build.
pub fn run(form_path: &Path) -> Result<(), String> {
    let form = super::load_form(form_path)?;
    print!("{}", summarize(&form));
    Ok(())
}

/// One line per field: kind, value count, and flags.
fn summarize(form: &Form) -> String {
    let schema = form.schema();
    let mut out = String::new();
    let count = schema.fields().len();
    let _ = writeln!(
        out,
        "Form `{}`: {count} field{}",
        schema.name(),
        if count == 1 { "" } else { "s" }
    );

    for field in schema.fields() {
        let mut notes = vec![field.kind().to_string()];
        if field.kind().is_enumerated() {
            notes.push(format!("{} values", field.values().len()));
        }
        let limits = field.limits();
        if !limits.is_unbounded() {
            let bound = |b: Option<f64>| b.map(|v| v.to_string()).unwrap_or_default();
            notes.push(format!("limits {}..{}", bound(limits.min), bound(limits.max)));
        }
        if field.is_optional() {
            notes.push("optional".into());
        }
        if field.is_conditional() {
            notes.push("conditional".into());
        }
        let _ = writeln!(out, "  {}: {}", field.name(), notes.join(", "));
    }
    out.push_str("ok\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summarizes_fields() {
        let form = Form::from_yaml(
            r"
name: Pizza
fields:
  - name: Size
    kind: enum
    values: [Small, Medium, Large]
  - name: Count
    kind: integer
    limits: { min: 1, max: 5 }
  - name: Note
    kind: text
    optional: true
    active_when: { field: Size, equals: Large }
",
        )
        .unwrap();
        let text = summarize(&form);
        assert_eq!(
            text,
            "Form `Pizza`: 3 fields\n  Size: enum, 3 values\n  Count: integer, limits 1..5\n  \
             Note: text, optional, conditional\nok\n"
        );
    }

    #[test]
    fn invalid_form_is_an_error() {
        let dir = std::env::temp_dir().join("formtalk_check_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("bad.yaml");
        std::fs::write(&path, "name: Bad\nfields:\n  - name: Size\n    kind: enum\n").unwrap();

        let err = run(&path).unwrap_err();
        assert!(err.contains("bad.yaml"));
        assert!(err.contains("no values"));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
