//! Record-replay round trip.
//!
//! 1. Run a scripted conversation with a `TranscriptRecorder` attached.
//! 2. Replay the transcript against the same form and expect no differences.
//! 3. Replay against a form with a changed template and expect the
//!    affected turns to be reported.
//! 4. Do the same through the binary with `run --record` and `replay`.

use std::io::{Cursor, Write};
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::Arc;

use chrono::NaiveDate;

use formtalk::context::ServiceContext;
use formtalk::conversation::{Conversation, ConversationLoop};
use formtalk::form::{Form, FormValues};
use formtalk::transcript::{replay, Transcript, TranscriptRecorder};

const ORDER: &str = r"
name: Order
templates:
  NotUnderstood:
    - 'Sorry, I did not get {0}.'
    - 'Hmm, {0} is not something I know.'
fields:
  - name: Size
    kind: enum
    values: [Small, Medium, Large]
  - name: Quantity
    kind: integer
    limits: { min: 1, max: 9 }
  - name: When
    kind: date_time
";

fn record(path: &Path, form: Arc<Form>, input: &str) {
    let seed = 21;
    let now = NaiveDate::from_ymd_opt(2024, 6, 15)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap();
    let ctx = ServiceContext::deterministic(seed, now);
    let recorder = TranscriptRecorder::new(path, "order", "order.yaml", seed, now);
    let conversation = Conversation::new(&ctx, form);
    let outcome = ConversationLoop::new(conversation, Cursor::new(input.to_string()), Vec::new())
        .with_recorder(recorder)
        .run(&ctx, FormValues::new())
        .unwrap();
    assert!(outcome.result.is_some());
}

#[test]
fn recorded_session_replays_identically() {
    let dir = std::env::temp_dir().join("formtalk_transcript_roundtrip");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("order.transcript.yaml");

    let form = Arc::new(Form::from_yaml(ORDER).unwrap());
    record(&path, Arc::clone(&form), "pizza\nmedium\n12\n3\ntomorrow at 6:30 pm\nyes\n");

    let transcript = Transcript::load(&path).unwrap();
    assert_eq!(transcript.turns.len(), 7);
    assert_eq!(transcript.seed, 21);

    let report = replay(Arc::clone(&form), &transcript).unwrap();
    assert_eq!(report.turns, 7);
    assert!(report.is_clean(), "{:#?}", report.mismatches);

    let again = replay(form, &transcript).unwrap();
    assert_eq!(again, report);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn changed_template_shows_up_in_replay() {
    let dir = std::env::temp_dir().join("formtalk_transcript_changed");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("order.transcript.yaml");

    let form = Arc::new(Form::from_yaml(ORDER).unwrap());
    record(&path, form, "pizza\nlarge\n2\ntoday\nyes\n");
    let transcript = Transcript::load(&path).unwrap();

    let changed = ORDER
        .replace("Sorry, I did not get", "Nope, not")
        .replace("Hmm,", "Nope,");
    let report = replay(Arc::new(Form::from_yaml(&changed).unwrap()), &transcript).unwrap();

    assert_eq!(report.mismatches.len(), 1);
    let mismatch = &report.mismatches[0];
    assert_eq!(mismatch.seq, 1);
    assert_eq!(mismatch.input.as_deref(), Some("pizza"));
    assert!(mismatch.actual.as_deref().unwrap().contains("Nope"));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn binary_records_and_replays() {
    let dir = std::env::temp_dir().join("formtalk_transcript_cli");
    std::fs::create_dir_all(&dir).unwrap();
    let form_path = dir.join("order.yaml");
    let transcript_path = dir.join("order.transcript.yaml");
    std::fs::write(&form_path, ORDER).unwrap();

    let bin = env!("CARGO_BIN_EXE_formtalk");
    let mut child = Command::new(bin)
        .args([
            "run",
            form_path.to_str().unwrap(),
            "--seed",
            "5",
            "--record",
            transcript_path.to_str().unwrap(),
        ])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"small\n4\nnow\nyes\n")
        .unwrap();
    let output = child.wait_with_output().unwrap();
    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(String::from_utf8_lossy(&output.stderr).contains("Transcript saved to:"));

    let transcript = Transcript::load(&transcript_path).unwrap();
    assert_eq!(transcript.seed, 5);
    assert_eq!(transcript.form, form_path.to_str().unwrap());

    let replayed = Command::new(bin)
        .args(["replay", transcript_path.to_str().unwrap()])
        .output()
        .unwrap();
    let stdout = String::from_utf8_lossy(&replayed.stdout);
    assert!(
        replayed.status.success(),
        "{}",
        String::from_utf8_lossy(&replayed.stderr)
    );
    assert!(stdout.contains("Replayed 5 turns: all replies match"));

    let _ = std::fs::remove_dir_all(&dir);
}
