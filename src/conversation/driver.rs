//! Line-oriented loop running one conversation over a reader and a writer.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use super::Conversation;
use crate::context::ServiceContext;
use crate::form::FormValues;
use crate::recognize::command::Command;
use crate::transcript::TranscriptRecorder;

/// How a loop ended.
#[derive(Debug, Clone, PartialEq)]
pub struct LoopOutcome {
    /// Conversation id.
    pub id: String,
    /// Confirmed answers; `None` when the user quit.
    pub result: Option<FormValues>,
    /// Where the transcript was written, when recording.
    pub transcript: Option<PathBuf>,
}

/// State for the interactive loop.
pub struct ConversationLoop<R: BufRead, W: Write> {
    conversation: Conversation,
    reader: R,
    writer: W,
    recorder: Option<TranscriptRecorder>,
}

impl<R: BufRead, W: Write> ConversationLoop<R, W> {
    /// Creates a loop around an unstarted conversation.
    pub fn new(conversation: Conversation, reader: R, writer: W) -> Self {
        Self {
            conversation,
            reader,
            writer,
            recorder: None,
        }
    }

    /// Records every turn into `recorder`, written out when the loop ends.
    #[must_use]
    pub fn with_recorder(mut self, recorder: TranscriptRecorder) -> Self {
        self.recorder = Some(recorder);
        self
    }

    /// Runs until the user confirms or quits.
    ///
    /// End of input counts as quitting.
    ///
    /// # Errors
    ///
    /// Returns an error if the form fails to render, I/O fails, or the
    /// transcript cannot be written.
    pub fn run(mut self, ctx: &ServiceContext, initial: FormValues) -> Result<LoopOutcome, String> {
        let output = self.conversation.start(ctx, initial).map_err(|e| e.to_string())?;
        self.present(None, &output)?;

        while !self.conversation.is_done() {
            let input = self.read_line()?.unwrap_or_else(|| Command::Quit.keyword().to_string());
            let output = self.conversation.respond(ctx, &input).map_err(|e| e.to_string())?;
            self.present(Some(&input), &output)?;
        }

        let transcript = match self.recorder {
            Some(recorder) => Some(recorder.finish().map_err(|e| e.to_string())?),
            None => None,
        };
        Ok(LoopOutcome {
            id: self.conversation.id().to_string(),
            result: self.conversation.result().cloned(),
            transcript,
        })
    }

    fn present(&mut self, input: Option<&str>, output: &str) -> Result<(), String> {
        if let Some(recorder) = self.recorder.as_mut() {
            recorder.record(input, output);
        }
        writeln!(self.writer, "{output}").map_err(|e| format!("write error: {e}"))?;
        if !self.conversation.is_done() {
            write!(self.writer, "> ").map_err(|e| format!("write error: {e}"))?;
        }
        self.writer.flush().map_err(|e| format!("flush error: {e}"))?;
        Ok(())
    }

    /// Reads one line without its terminator; `None` at end of input.
    fn read_line(&mut self) -> Result<Option<String>, String> {
        let mut line = String::new();
        let read = self.reader.read_line(&mut line).map_err(|e| format!("read error: {e}"))?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\n', '\r']).to_string()))
    }
}
