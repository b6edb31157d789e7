//! `formtalk replay` command.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::transcript::{replay, ReplayReport, Transcript};

/// Execute the `replay` command.
///
/// The form defaults to the path stored in the transcript.
///
/// # Errors
///
/// Returns an error string if the transcript or form cannot be loaded, the
/// form fails to render, or any reply differs from the recording.
pub fn run(transcript_path: &Path, form_path: Option<&Path>) -> Result<(), String> {
    let transcript = Transcript::load(transcript_path)
        .map_err(|e| format!("{}: {e}", transcript_path.display()))?;
    let form_path = form_path.map_or_else(|| PathBuf::from(&transcript.form), Path::to_path_buf);
    let form = Arc::new(super::load_form(&form_path)?);

    let report = replay(form, &transcript).map_err(|e| format!("replay failed: {e}"))?;
    print!("{}", render_report(&report));
    if report.is_clean() {
        Ok(())
    } else {
        Err(format!("{} of {} replies differ", report.mismatches.len(), report.turns))
    }
}

fn render_report(report: &ReplayReport) -> String {
    let mut out = String::new();
    for mismatch in &report.mismatches {
        match &mismatch.input {
            Some(input) => {
                let _ = writeln!(out, "turn {} (input {input:?}):", mismatch.seq);
            }
            None => {
                let _ = writeln!(out, "turn {} (opening prompt):", mismatch.seq);
            }
        }
        let _ = writeln!(out, "  expected: {:?}", mismatch.expected);
        match &mismatch.actual {
            Some(actual) => {
                let _ = writeln!(out, "  actual:   {actual:?}");
            }
            None => out.push_str("  actual:   (conversation had ended)\n"),
        }
    }
    if report.is_clean() {
        let _ = writeln!(out, "Replayed {} turns: all replies match", report.turns);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::Mismatch;

    #[test]
    fn clean_report() {
        let report = ReplayReport {
            turns: 4,
            mismatches: Vec::new(),
        };
        assert_eq!(render_report(&report), "Replayed 4 turns: all replies match\n");
    }

    #[test]
    fn mismatches_show_both_replies() {
        let report = ReplayReport {
            turns: 3,
            mismatches: vec![
                Mismatch {
                    seq: 1,
                    input: Some("large".into()),
                    expected: "a".into(),
                    actual: Some("b".into()),
                },
                Mismatch {
                    seq: 2,
                    input: Some("yes".into()),
                    expected: "c".into(),
                    actual: None,
                },
            ],
        };
        let text = render_report(&report);
        assert!(text.contains("turn 1 (input \"large\"):\n  expected: \"a\"\n  actual:   \"b\"\n"));
        assert!(text.contains("(conversation had ended)"));
        assert!(!text.contains("all replies match"));
    }

    #[test]
    fn missing_transcript_is_an_error() {
        let err = run(Path::new("/nonexistent/t.yaml"), None).unwrap_err();
        assert!(err.contains("/nonexistent/t.yaml"));
    }
}
