//! English-language helpers shared by term generation, recognition, and rendering.
//!
//! Word breaking of identifiers, input tokenization, noise words, list joining,
//! casing, and indefinite-article correction.

use std::sync::OnceLock;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

/// Words that never carry meaning at the start or end of a generated term.
const STOP_WORDS: &[&str] = &[
    "a", "an", "the", "of", "and", "or", "to", "in", "on", "for", "with", "at", "by",
];

/// Filler words users type around their answer; dropped from "not understood" feedback.
const NOISE_WORDS: &[&str] = &[
    "a", "an", "the", "i", "i'd", "id", "i'm", "im", "want", "wanted", "would", "like", "please",
    "some", "of", "to", "me", "my", "with", "for", "just", "give", "get", "have", "it", "is", "be",
    "will", "take", "also", "plus", "and", "or", "then", "thanks", "thank", "you", "ok",
];

/// How to case field and value text when rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Casing {
    /// Leave text as declared.
    #[default]
    Default,
    /// All lower case.
    Lower,
    /// All upper case.
    Upper,
    /// Upper-case the first character only.
    UpperFirst,
}

/// One lower-cased word of user input with its byte span in the original text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Lower-cased word.
    pub text: String,
    /// Byte offset where the word starts.
    pub start: usize,
    /// Byte offset one past the end of the word.
    pub end: usize,
}

/// Splits an identifier into words on case transitions, digit boundaries, and separators.
///
/// `ThinCrust` → `["Thin", "Crust"]`, `HTTPServer` → `["HTTP", "Server"]`,
/// `extra_cheese` → `["extra", "cheese"]`, `Size2` → `["Size", "2"]`.
#[must_use]
pub fn word_break(name: &str) -> Vec<String> {
    let chars: Vec<char> = name.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();

    for (i, &ch) in chars.iter().enumerate() {
        if !ch.is_alphanumeric() && ch != '\'' {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }
        if let Some(prev) = current.chars().last() {
            let next = chars.get(i + 1).copied();
            let boundary = (prev.is_lowercase() && ch.is_uppercase())
                || (prev.is_alphabetic() && ch.is_ascii_digit())
                || (prev.is_ascii_digit() && ch.is_alphabetic())
                || (prev.is_uppercase()
                    && ch.is_uppercase()
                    && next.is_some_and(char::is_lowercase));
            if boundary {
                words.push(std::mem::take(&mut current));
            }
        }
        current.push(ch);
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

/// Turns an identifier into display text: `ThinCrust` → `Thin Crust`.
#[must_use]
pub fn describe(name: &str) -> String {
    word_break(name)
        .into_iter()
        .map(|w| apply_case(&w, Casing::UpperFirst))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Splits free text into lower-cased word tokens.
///
/// A `?` standing alone is kept as its own token so it can act as a command.
#[must_use]
pub fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut start: Option<usize> = None;

    for (idx, ch) in text.char_indices() {
        let word_char = ch.is_alphanumeric() || ch == '\'';
        match (word_char, start) {
            (true, None) => start = Some(idx),
            (false, Some(s)) => {
                tokens.push(Token {
                    text: text[s..idx].to_lowercase(),
                    start: s,
                    end: idx,
                });
                start = None;
            }
            _ => {}
        }
        if ch == '?' {
            tokens.push(Token {
                text: "?".into(),
                start: idx,
                end: idx + 1,
            });
        }
    }
    if let Some(s) = start {
        tokens.push(Token {
            text: text[s..].to_lowercase(),
            start: s,
            end: text.len(),
        });
    }
    tokens
}

/// Lower-cases and trims input, collapsing internal whitespace.
#[must_use]
pub fn normalize_input(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Returns `true` for words that cannot begin or end a generated term.
#[must_use]
pub fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.contains(&word)
}

/// Returns `true` for filler words that are ignored when left unmatched.
#[must_use]
pub fn is_noise_word(word: &str) -> bool {
    NOISE_WORDS.contains(&word)
}

/// Returns `true` for tokens that separate entries of a list answer.
#[must_use]
pub fn is_list_separator(word: &str) -> bool {
    word == "and"
}

/// Appends the plural suffix to a word unless it already ends in `s`.
#[must_use]
pub fn pluralize(word: &str) -> Option<String> {
    if word.ends_with('s') || word.chars().all(|c| c.is_ascii_digit()) {
        None
    } else {
        Some(format!("{word}s"))
    }
}

/// Applies a casing rule.
#[must_use]
pub fn apply_case(text: &str, casing: Casing) -> String {
    match casing {
        Casing::Default => text.to_string(),
        Casing::Lower => text.to_lowercase(),
        Casing::Upper => text.to_uppercase(),
        Casing::UpperFirst => {
            let mut chars = text.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        }
    }
}

/// Joins items into an English list: `A`, `A and B`, `A, B, and C`.
///
/// With exactly two items the leading comma of `last_separator` is dropped.
#[must_use]
pub fn build_list<S: AsRef<str>>(items: &[S], separator: &str, last_separator: &str) -> String {
    match items {
        [] => String::new(),
        [only] => only.as_ref().to_string(),
        [first, second] => {
            let joiner = last_separator.strip_prefix(',').unwrap_or(last_separator);
            format!("{}{joiner}{}", first.as_ref(), second.as_ref())
        }
        [init @ .., last] => {
            let head = init
                .iter()
                .map(AsRef::as_ref)
                .collect::<Vec<_>>()
                .join(separator);
            format!("{head}{last_separator}{}", last.as_ref())
        }
    }
}

/// Maximum edit distance tolerated when matching a term token of this length.
#[must_use]
pub fn edit_tolerance(term_token_len: usize) -> usize {
    match term_token_len {
        0..=3 => 0,
        4..=7 => 1,
        _ => 2,
    }
}

/// Collapses runs of interior spaces, drops trailing spaces on each line,
/// and trims blank lines from both ends. Leading indentation is preserved.
#[must_use]
pub fn collapse_whitespace(text: &str) -> String {
    let lines: Vec<String> = text
        .lines()
        .map(|line| {
            let indent_len = line.len() - line.trim_start_matches([' ', '\t']).len();
            let (indent, body) = line.split_at(indent_len);
            let mut out = String::from(indent);
            let mut last_space = false;
            for ch in body.chars() {
                if ch == ' ' || ch == '\t' {
                    if !last_space {
                        out.push(' ');
                    }
                    last_space = true;
                } else {
                    out.push(ch);
                    last_space = false;
                }
            }
            out.trim_end().to_string()
        })
        .collect();

    let first = lines.iter().position(|l| !l.trim().is_empty());
    let last = lines.iter().rposition(|l| !l.trim().is_empty());
    match (first, last) {
        (Some(first), Some(last)) => {
            let mut kept = lines[first..=last].to_vec();
            kept[0] = kept[0].trim_start().to_string();
            kept.join("\n")
        }
        _ => String::new(),
    }
}

fn article_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b(a|an|A|An)([ \t]+)([A-Za-z][A-Za-z'-]*)")
            .expect("article pattern is valid")
    })
}

/// Returns `true` when a word is pronounced starting with a vowel sound.
#[must_use]
pub fn starts_with_vowel_sound(word: &str) -> bool {
    let lower = word.to_lowercase();
    const CONSONANT_SOUNDING: &[&str] =
        &["uni", "use", "usu", "uti", "eu", "one", "once", "ubiq"];
    const VOWEL_SOUNDING: &[&str] = &["hour", "honest", "honor", "honour", "heir"];
    if VOWEL_SOUNDING.iter().any(|p| lower.starts_with(p)) {
        return true;
    }
    if CONSONANT_SOUNDING.iter().any(|p| lower.starts_with(p)) {
        return false;
    }
    lower.starts_with(['a', 'e', 'i', 'o', 'u'])
}

/// Rewrites `a`/`an` to agree with the following word.
///
/// Capitalised `A`/`An` is only treated as an article at the start of a line
/// or sentence, so a choice label such as `Plan A is` is left alone.
#[must_use]
pub fn fix_articles(text: &str) -> String {
    article_regex()
        .replace_all(text, |caps: &Captures<'_>| {
            let whole = &caps[0];
            let article = &caps[1];
            let next = &caps[3];
            let start = caps.get(0).map_or(0, |m| m.start());
            let capital = article.starts_with('A');
            if capital && !at_sentence_start(&text[..start]) {
                return whole.to_string();
            }
            let wanted = if starts_with_vowel_sound(next) {
                "an"
            } else {
                "a"
            };
            let wanted = if capital {
                apply_case(wanted, Casing::UpperFirst)
            } else {
                wanted.to_string()
            };
            format!("{wanted}{}{next}", &caps[2])
        })
        .into_owned()
}

fn at_sentence_start(before: &str) -> bool {
    let trimmed = before.trim_end_matches([' ', '\t']);
    trimmed.is_empty() || trimmed.ends_with(['.', '!', '?', '\n', '*', '"'])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn article_pattern_compiles() {
        assert!(article_regex().is_match("a Size"));
    }

    #[test]
    fn word_break_handles_case_digits_and_separators() {
        assert_eq!(word_break("ThinCrust"), vec!["Thin", "Crust"]);
        assert_eq!(word_break("HTTPServer"), vec!["HTTP", "Server"]);
        assert_eq!(word_break("extra_cheese"), vec!["extra", "cheese"]);
        assert_eq!(word_break("Size2"), vec!["Size", "2"]);
        assert_eq!(
            word_break("delivery-address line"),
            vec!["delivery", "address", "line"]
        );
    }

    #[test]
    fn describe_title_cases_words() {
        assert_eq!(describe("ThinCrust"), "Thin Crust");
        assert_eq!(describe("delivery_address"), "Delivery Address");
    }

    #[test]
    fn tokenize_lowercases_and_tracks_spans() {
        let tokens = tokenize("Cheese, and PEPPERONI!");
        let words: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(words, vec!["cheese", "and", "pepperoni"]);
        assert_eq!(tokens[2].start, 12);
        assert_eq!(tokens[2].end, 21);
    }

    #[test]
    fn tokenize_keeps_question_mark() {
        let tokens = tokenize("?");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].text, "?");
    }

    #[test]
    fn build_list_uses_oxford_style() {
        assert_eq!(build_list(&["A"], ", ", ", and "), "A");
        assert_eq!(build_list(&["A", "B"], ", ", ", and "), "A and B");
        assert_eq!(build_list(&["A", "B", "C"], ", ", ", and "), "A, B, and C");
        assert_eq!(build_list::<&str>(&[], ", ", ", and "), "");
    }

    #[test]
    fn fix_articles_agrees_with_next_word() {
        assert_eq!(
            fix_articles("Please select a Extra Topping"),
            "Please select an Extra Topping"
        );
        assert_eq!(fix_articles("Please select an Size"), "Please select a Size");
        assert_eq!(fix_articles("an unicorn and a hour"), "a unicorn and an hour");
        assert_eq!(fix_articles("A apple a day"), "An apple a day");
        assert_eq!(fix_articles("Plan A is fine"), "Plan A is fine");
    }

    #[test]
    fn collapse_whitespace_keeps_indentation() {
        let text = "Please  select a   Size\n  1. Small  \n  2. Large\n\n";
        assert_eq!(
            collapse_whitespace(text),
            "Please select a Size\n  1. Small\n  2. Large"
        );
        assert_eq!(collapse_whitespace("  Wanted   Large "), "Wanted Large");
    }

    #[test]
    fn pluralize_skips_words_ending_in_s_and_numbers() {
        assert_eq!(pluralize("topping").as_deref(), Some("toppings"));
        assert_eq!(pluralize("toppings"), None);
        assert_eq!(pluralize("12"), None);
    }

    #[test]
    fn casing_rules() {
        assert_eq!(apply_case("thin crust", Casing::UpperFirst), "Thin crust");
        assert_eq!(apply_case("Thin Crust", Casing::Lower), "thin crust");
        assert_eq!(apply_case("Thin Crust", Casing::Upper), "THIN CRUST");
        assert_eq!(apply_case("Thin Crust", Casing::Default), "Thin Crust");
    }
}
