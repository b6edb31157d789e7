//! Parsers for answers that are not picked from a list: numbers, yes/no,
//! free text, and dates.

use std::sync::OnceLock;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;

use crate::language::{is_noise_word, tokenize};

const AFFIRMATIVE: &[&str] = &[
    "yes", "y", "yeah", "yep", "yup", "sure", "ok", "okay", "true", "correct", "right",
];
const NEGATIVE: &[&str] = &["no", "n", "nope", "nah", "false", "wrong", "incorrect"];

/// A parsed value plus any words around it that meant nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct Parsed<T> {
    /// The value.
    pub value: T,
    /// Leftover input fragments, verbatim, filler words removed.
    pub unmatched: Vec<String>,
}

fn integer_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[-+]?\d[\d,]*").expect("integer pattern is valid"))
}

fn float_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"[-+]?(?:\d[\d,]*(?:\.\d+)?|\.\d+)").expect("float pattern is valid")
    })
}

fn time_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(\d{1,2})(?::(\d{2}))?(?::(\d{2}))?\s*([ap]\.?m\.?)?$")
            .expect("time pattern is valid")
    })
}

fn leftovers(input: &str, start: usize, end: usize) -> Vec<String> {
    tokenize(input)
        .into_iter()
        .filter(|t| {
            (t.end <= start || t.start >= end) && t.text != "?" && !is_noise_word(&t.text)
        })
        .map(|t| input[t.start..t.end].to_string())
        .collect()
}

/// Finds the first whole number in the input. Thousands separators are accepted.
#[must_use]
pub fn parse_integer(input: &str) -> Option<Parsed<i64>> {
    let found = integer_pattern().find(input)?;
    let value = found.as_str().replace(',', "").parse().ok()?;
    Some(Parsed {
        value,
        unmatched: leftovers(input, found.start(), found.end()),
    })
}

/// Finds the first decimal number in the input.
#[must_use]
pub fn parse_float(input: &str) -> Option<Parsed<f64>> {
    let found = float_pattern().find(input)?;
    let value = found.as_str().replace(',', "").parse().ok()?;
    Some(Parsed {
        value,
        unmatched: leftovers(input, found.start(), found.end()),
    })
}

/// Reads a yes/no answer. Mixed or missing signals yield `None`.
#[must_use]
pub fn parse_bool(input: &str) -> Option<bool> {
    let tokens = tokenize(input);
    let yes = tokens.iter().any(|t| AFFIRMATIVE.contains(&t.text.as_str()));
    let no = tokens.iter().any(|t| NEGATIVE.contains(&t.text.as_str()));
    match (yes, no) {
        (true, false) => Some(true),
        (false, true) => Some(false),
        _ => None,
    }
}

/// Free text: the trimmed input, if any.
#[must_use]
pub fn parse_text(input: &str) -> Option<String> {
    let trimmed = input.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Reads a time of day: `18:30`, `6:30pm`, `6 pm`, `18:30:15`.
#[must_use]
pub fn parse_time(input: &str) -> Option<NaiveTime> {
    let caps = time_pattern().captures(input.trim())?;
    let mut hour: u32 = caps.get(1)?.as_str().parse().ok()?;
    let minute: u32 = caps.get(2).map_or(Ok(0), |m| m.as_str().parse()).ok()?;
    let second: u32 = caps.get(3).map_or(Ok(0), |m| m.as_str().parse()).ok()?;
    if let Some(meridiem) = caps.get(4) {
        if !(1..=12).contains(&hour) {
            return None;
        }
        let pm = meridiem.as_str().starts_with('p');
        hour = match (hour, pm) {
            (12, false) => 0,
            (12, true) => 12,
            (h, true) => h + 12,
            (h, false) => h,
        };
    } else if caps.get(2).is_none() {
        // A bare number is not a time.
        return None;
    }
    NaiveTime::from_hms_opt(hour, minute, second)
}

/// Reads a date, a time, or both, relative to `now` where needed.
///
/// Accepted: `now`; `today`, `tomorrow`, `yesterday`, optionally followed by
/// `at <time>`; ISO dates and date-times; `MM/DD/YYYY`; a bare time, taken as
/// today.
#[must_use]
pub fn parse_datetime(input: &str, now: NaiveDateTime) -> Option<NaiveDateTime> {
    let raw = input.trim();
    let text = raw.to_lowercase();
    if text == "now" {
        return Some(now);
    }

    let (day, rest) = split_relative_day(&text, now.date());
    if let Some(date) = day {
        let rest = rest.trim();
        let rest = rest.strip_prefix("at").map_or(rest, str::trim);
        if rest.is_empty() {
            return Some(date.and_time(NaiveTime::MIN));
        }
        return parse_time(rest).map(|time| date.and_time(time));
    }

    for format in [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(parsed);
        }
    }
    for format in ["%Y-%m-%d", "%m/%d/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return Some(date.and_time(NaiveTime::MIN));
        }
    }
    parse_time(&text).map(|time| now.date().and_time(time))
}

fn split_relative_day(text: &str, today: NaiveDate) -> (Option<NaiveDate>, &str) {
    for (word, offset) in [("today", 0), ("tomorrow", 1), ("yesterday", -1)] {
        if let Some(rest) = text.strip_prefix(word) {
            return (today.checked_add_signed(Duration::days(offset)), rest);
        }
    }
    (None, text)
}
