//! Command dispatch and handlers.

pub mod check;
pub mod replay;
pub mod run;
pub mod terms;

use std::path::Path;

use crate::cli::Command;
use crate::form::Form;

/// Dispatch a parsed command to its handler.
///
/// # Errors
///
/// Returns an error string if the selected command handler fails.
pub fn dispatch(command: &Command) -> Result<(), String> {
    match command {
        Command::Run {
            form,
            seed,
            record,
            json,
        } => run::run(form, *seed, record.as_deref(), *json),
        Command::Check { form } => check::run(form),
        Command::Terms { form, field } => terms::run(form, field.as_deref()),
        Command::Replay { transcript, form } => replay::run(transcript, form.as_deref()),
    }
}

/// Loads a form definition, naming the file in any error.
fn load_form(path: &Path) -> Result<Form, String> {
    Form::load(path).map_err(|e| format!("{}: {e}", path.display()))
}
