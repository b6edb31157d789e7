//! Conversational form filling.
//!
//! A form is a list of typed fields. [`form::Form::step`] consumes one line of
//! free text at a time: it recognizes values, field names, and navigation
//! commands in the input, updates the answers, and renders the next prompt
//! from the form's templates.
//!
//! - [`terms`] generates the phrases fields and values are recognized by.
//! - [`recognize`] finds those phrases (and numbers, dates, yes/no) in input.
//! - [`template`] parses and renders prompt patterns.
//! - [`schema`] declares forms in code or YAML.
//! - [`form`] holds conversation state and the step function.
//! - [`conversation`] and [`transcript`] drive forms over line I/O.

pub mod adapters;
pub mod cli;
pub mod commands;
pub mod context;
pub mod conversation;
pub mod error;
pub mod form;
pub mod language;
pub mod ports;
pub mod recognize;
pub mod schema;
pub mod template;
pub mod terms;
pub mod transcript;

use clap::Parser;

/// Run the CLI with the provided arguments.
///
/// # Errors
///
/// Returns an error string when argument parsing fails or command execution fails.
pub fn run<I, T>(args: I) -> Result<(), String>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = cli::Cli::try_parse_from(args).map_err(|err| err.to_string())?;
    commands::dispatch(&cli.command)
}

#[cfg(test)]
mod tests {
    use super::run;

    #[test]
    fn run_errors_on_unknown_subcommand() {
        let result = run(["formtalk", "unknown"]);
        assert!(result.is_err());
    }

    #[test]
    fn run_errors_on_missing_form() {
        let result = run(["formtalk", "check", "/nonexistent/form.yaml"]);
        assert!(result.is_err());
    }
}
