//! Global command keywords.
//!
//! Commands are recognized only when the whole answer is a command phrase, so
//! a value that merely contains `back` or `help` is still matched as a value.

use std::fmt;

use crate::language::normalize_input;

/// A navigation command available in every state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Return to the previous question.
    Back,
    /// Explain what can be entered.
    Help,
    /// Abandon the form.
    Quit,
    /// Restore the initial values and start over.
    Reset,
    /// Show everything entered so far.
    Status,
}

impl Command {
    /// Every command in display order.
    pub const ALL: [Command; 5] = [
        Command::Back,
        Command::Help,
        Command::Quit,
        Command::Reset,
        Command::Status,
    ];

    /// Phrases that trigger this command.
    #[must_use]
    pub fn phrases(self) -> &'static [&'static str] {
        match self {
            Command::Back => &["back", "go back", "previous"],
            Command::Help => &["help", "?"],
            Command::Quit => &["quit", "exit", "cancel", "stop"],
            Command::Reset => &["reset", "start over", "restart"],
            Command::Status => &["status", "progress", "summary"],
        }
    }

    /// The keyword shown in help text.
    #[must_use]
    pub fn keyword(self) -> &'static str {
        self.phrases()[0]
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

const KEEP_CURRENT: &[&str] = &[
    "c",
    "current",
    "current choice",
    "keep",
    "keep current",
    "same",
];

/// Words that choose "no preference" for an optional field.
pub const NO_PREFERENCE: &[&str] = &[
    "none",
    "no preference",
    "skip",
    "any",
    "whatever",
    "don't care",
];

fn strip_punctuation(text: &str) -> String {
    let normalized = normalize_input(text);
    let trimmed = normalized.trim_end_matches(['.', '!']);
    if trimmed == "?" {
        trimmed.to_string()
    } else {
        trimmed.trim_end_matches('?').to_string()
    }
}

/// Returns the command when the entire input is a command phrase.
#[must_use]
pub fn parse_command(input: &str) -> Option<Command> {
    let text = strip_punctuation(input);
    Command::ALL
        .into_iter()
        .find(|command| command.phrases().contains(&text.as_str()))
}

/// Whether the input asks to keep the field's current value.
#[must_use]
pub fn is_keep_current(input: &str) -> bool {
    KEEP_CURRENT.contains(&strip_punctuation(input).as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_each_command_case_insensitively() {
        assert_eq!(parse_command("back"), Some(Command::Back));
        assert_eq!(parse_command("Go Back"), Some(Command::Back));
        assert_eq!(parse_command("?"), Some(Command::Help));
        assert_eq!(parse_command("HELP"), Some(Command::Help));
        assert_eq!(parse_command("quit."), Some(Command::Quit));
        assert_eq!(parse_command("start  over"), Some(Command::Reset));
        assert_eq!(parse_command(" status "), Some(Command::Status));
    }

    #[test]
    fn commands_must_be_the_whole_input() {
        assert_eq!(parse_command("back bacon"), None);
        assert_eq!(parse_command("help me choose"), None);
        assert_eq!(parse_command(""), None);
    }

    #[test]
    fn keep_current_phrases() {
        assert!(is_keep_current("c"));
        assert!(is_keep_current("Current choice"));
        assert!(!is_keep_current("cheese"));
    }

    #[test]
    fn keyword_is_first_phrase() {
        assert_eq!(Command::Reset.keyword(), "reset");
        assert_eq!(Command::Help.to_string(), "help");
    }
}
