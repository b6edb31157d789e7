//! `formtalk run` command.

use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::adapters::live::LiveClock;
use crate::context::ServiceContext;
use crate::conversation::{Conversation, ConversationLoop};
use crate::form::{Form, FormValues};
use crate::ports::Clock;
use crate::transcript::TranscriptRecorder;

/// Execute the `run` command over stdin and stdout.
///
/// With `record`, the clock is frozen at the start of the session and a seed
/// is always chosen, so the transcript replays exactly.
///
/// # Errors
///
/// Returns an error string if the form is invalid, I/O fails, or the
/// transcript cannot be written.
pub fn run(
    form_path: &Path,
    seed: Option<u64>,
    record: Option<&Path>,
    json: bool,
) -> Result<(), String> {
    let form = Arc::new(super::load_form(form_path)?);
    let stdin = io::stdin();
    let stdout = io::stdout();

    let transcript = match record {
        Some(path) => {
            let seed = seed.unwrap_or_else(rand::random);
            let now = LiveClock.now();
            let ctx = ServiceContext::deterministic(seed, now);
            let recorder = TranscriptRecorder::new(
                path,
                form.schema().name(),
                form_path.display().to_string(),
                seed,
                now,
            );
            run_with(&ctx, form, stdin.lock(), stdout.lock(), Some(recorder), json)?
        }
        None => {
            let ctx = seed.map_or_else(ServiceContext::live, ServiceContext::seeded);
            run_with(&ctx, form, stdin.lock(), stdout.lock(), None, json)?
        }
    };

    if let Some(path) = transcript {
        eprintln!("Transcript saved to: {}", path.display());
    }
    Ok(())
}

/// Runs one conversation and, once confirmed, writes the answers as YAML
/// or JSON. Returns the transcript path when recording.
fn run_with<R: BufRead, W: Write>(
    ctx: &ServiceContext,
    form: Arc<Form>,
    reader: R,
    mut writer: W,
    recorder: Option<TranscriptRecorder>,
    json: bool,
) -> Result<Option<std::path::PathBuf>, String> {
    let conversation = Conversation::new(ctx, form);
    let mut driver = ConversationLoop::new(conversation, reader, &mut writer);
    if let Some(recorder) = recorder {
        driver = driver.with_recorder(recorder);
    }
    let outcome = driver.run(ctx, FormValues::new())?;

    match &outcome.result {
        Some(values) => {
            info!(id = %outcome.id, fields = values.len(), "form submitted");
            let text = if json {
                serde_json::to_string_pretty(values)
                    .map(|t| t + "\n")
                    .map_err(|e| e.to_string())
            } else {
                serde_yaml::to_string(values).map_err(|e| e.to_string())
            }
            .map_err(|e| format!("failed to serialize answers: {e}"))?;
            write!(writer, "\n{text}").map_err(|e| format!("write error: {e}"))?;
        }
        None => info!(id = %outcome.id, "no answers submitted"),
    }
    Ok(outcome.transcript)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::io::Cursor;

    const ORDER: &str = "\
name: Order
fields:
  - name: Size
    kind: enum
    values: [Small, Large]
  - name: Quantity
    kind: integer
";

    fn ctx() -> ServiceContext {
        let now = NaiveDate::from_ymd_opt(2024, 6, 15)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        ServiceContext::deterministic(1, now)
    }

    #[test]
    fn prints_answers_after_confirmation() {
        let form = Arc::new(Form::from_yaml(ORDER).unwrap());
        let mut out = Vec::new();
        let input = Cursor::new("large\n2\nyes\n");
        let transcript = run_with(&ctx(), form, input, &mut out, None, false).unwrap();
        assert!(transcript.is_none());

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Quantity: 2"));
        assert!(text.contains("Size: Large"));
    }

    #[test]
    fn prints_no_answers_when_cancelled() {
        let form = Arc::new(Form::from_yaml(ORDER).unwrap());
        let mut out = Vec::new();
        run_with(&ctx(), form, Cursor::new("quit\n"), &mut out, None, false).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(!text.contains("Size: "));
    }

    #[test]
    fn prints_json_when_asked() {
        let form = Arc::new(Form::from_yaml(ORDER).unwrap());
        let mut out = Vec::new();
        let input = Cursor::new("small\n12\nyes\n");
        run_with(&ctx(), form, input, &mut out, None, true).unwrap();
        let text = String::from_utf8(out).unwrap();
        let json = &text[text.find('{').unwrap()..];
        let parsed: serde_json::Value = serde_json::from_str(json).unwrap();
        assert_eq!(parsed["Size"], "Small");
        assert_eq!(parsed["Quantity"], 12);
    }

    #[test]
    fn missing_form_file_is_reported() {
        let err = run(Path::new("/nonexistent/form.yaml"), None, None, false).unwrap_err();
        assert!(err.contains("/nonexistent/form.yaml"));
    }
}
