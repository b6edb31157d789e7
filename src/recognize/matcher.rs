//! Greedy longest-match plus fuzzy fallback over tokenized input.

use std::ops::Range;

use tracing::debug;

use super::{Candidate, Choice, Confidence, MatchOptions, RecognitionResult};
use crate::language::{edit_tolerance, is_list_separator, is_noise_word, tokenize, Token};
use crate::terms::Phrase;

/// Matches `input` against `choices`.
///
/// With `many` set the input may name several choices: segments separated by
/// commas, semicolons or `and` are matched independently and a bare number in
/// any segment selects by position. Otherwise a number is only taken as a
/// position when it is the whole input.
#[must_use]
pub fn recognize(
    input: &str,
    choices: &[Choice<'_>],
    options: &MatchOptions,
    many: bool,
) -> RecognitionResult {
    let tokens = tokenize(input);
    let segments = segment_ids(input, &tokens);
    let mut consumed = vec![false; tokens.len()];
    let mut candidates = Vec::new();

    if let Some(candidate) = whole_input_number(input, &tokens, choices) {
        debug!(label = candidate.label, "numeric selection");
        return RecognitionResult {
            candidates: vec![candidate],
            unmatched: Vec::new(),
        };
    }
    if many {
        numeric_pieces(input, &tokens, &segments, choices, &mut consumed, &mut candidates);
    }
    pattern_matches(input, &tokens, choices, &mut consumed, &mut candidates);
    exact_phrases(input, &tokens, &segments, choices, &mut consumed, &mut candidates);
    if options.fuzzy {
        fuzzy_phrases(
            input,
            &tokens,
            &segments,
            choices,
            options,
            &mut consumed,
            &mut candidates,
        );
    }

    candidates.sort_by(|a, b| {
        a.span
            .start
            .cmp(&b.span.start)
            .then(a.label.cmp(&b.label))
    });
    let unmatched = unmatched_fragments(input, &tokens, &segments, &consumed);
    debug!(
        candidates = candidates.len(),
        unmatched = unmatched.len(),
        "recognized input"
    );
    RecognitionResult { candidates, unmatched }
}

/// Assigns each token the index of the comma- or semicolon-delimited segment
/// it sits in.
fn segment_ids(input: &str, tokens: &[Token]) -> Vec<usize> {
    let mut ids = Vec::with_capacity(tokens.len());
    let mut segment = 0;
    let mut previous_end = 0;
    for token in tokens {
        if input[previous_end..token.start].contains([',', ';']) {
            segment += 1;
        }
        ids.push(segment);
        previous_end = token.end;
    }
    ids
}

fn slice(input: &str, tokens: &[Token], span: &Range<usize>) -> String {
    input[tokens[span.start].start..tokens[span.end - 1].end].to_string()
}

fn by_position<'a>(choices: &'a [Choice<'a>], position: usize) -> Option<&'a Choice<'a>> {
    choices.iter().find(|c| c.position == Some(position))
}

fn numeric(label: usize, span: Range<usize>, text: String) -> Candidate {
    Candidate {
        label,
        confidence: Confidence::High,
        score: 1.0,
        span,
        text,
    }
}

/// A whole input that reads as a list position: `2`, `#2`, `2.` or `2)`.
#[must_use]
pub fn position_number(input: &str) -> Option<usize> {
    input
        .trim()
        .trim_start_matches('#')
        .trim_end_matches(['.', ')'])
        .parse()
        .ok()
}

fn whole_input_number(
    input: &str,
    tokens: &[Token],
    choices: &[Choice<'_>],
) -> Option<Candidate> {
    let position = position_number(input)?;
    let choice = by_position(choices, position)?;
    let span = 0..tokens.len().max(1);
    Some(numeric(choice.label, span, input.trim().to_string()))
}

/// Bare numbers standing alone between separators in a list answer.
fn numeric_pieces(
    input: &str,
    tokens: &[Token],
    segments: &[usize],
    choices: &[Choice<'_>],
    consumed: &mut [bool],
    candidates: &mut Vec<Candidate>,
) {
    let is_boundary = |i: Option<usize>, neighbor: usize| match i {
        None => true,
        Some(i) => segments[i] != segments[neighbor] || is_list_separator(&tokens[i].text),
    };
    for (i, token) in tokens.iter().enumerate() {
        let Ok(position) = token.text.parse::<usize>() else {
            continue;
        };
        let before = i.checked_sub(1);
        let after = (i + 1 < tokens.len()).then_some(i + 1);
        if !(is_boundary(before, i) && is_boundary(after, i)) {
            continue;
        }
        if let Some(choice) = by_position(choices, position) {
            consumed[i] = true;
            let text = slice(input, tokens, &(i..i + 1));
            candidates.push(numeric(choice.label, i..i + 1, text));
        }
    }
}

/// Regular-expression terms, matched against the raw input.
fn pattern_matches(
    input: &str,
    tokens: &[Token],
    choices: &[Choice<'_>],
    consumed: &mut [bool],
    candidates: &mut Vec<Candidate>,
) {
    for choice in choices {
        for regex in choice.terms.patterns() {
            for found in regex.find_iter(input) {
                let covered: Vec<usize> = (0..tokens.len())
                    .filter(|&i| {
                        !consumed[i]
                            && tokens[i].start < found.end()
                            && tokens[i].end > found.start()
                    })
                    .collect();
                let (Some(&first), Some(&last)) = (covered.first(), covered.last()) else {
                    continue;
                };
                let span = first..last + 1;
                candidates.push(Candidate {
                    label: choice.label,
                    confidence: Confidence::High,
                    score: 1.0,
                    text: slice(input, tokens, &span),
                    span,
                });
            }
        }
    }
    // Mark after all choices ran so two patterns claiming the same words stay ambiguous.
    for candidate in candidates.iter() {
        for flag in &mut consumed[candidate.span.clone()] {
            *flag = true;
        }
    }
}

/// Greedy longest exact phrase match, left to right within each segment.
fn exact_phrases(
    input: &str,
    tokens: &[Token],
    segments: &[usize],
    choices: &[Choice<'_>],
    consumed: &mut [bool],
    candidates: &mut Vec<Candidate>,
) {
    let longest = choices
        .iter()
        .map(|c| c.terms.longest_phrase())
        .max()
        .unwrap_or(0);
    let words: Vec<String> = tokens.iter().map(|t| t.text.clone()).collect();
    let mut i = 0;
    while i < tokens.len() {
        if consumed[i] {
            i += 1;
            continue;
        }
        let run = (i..tokens.len())
            .take_while(|&j| !consumed[j] && segments[j] == segments[i])
            .count();
        let mut advanced = false;
        for len in (1..=run.min(longest)).rev() {
            let key = &words[i..i + len];
            let hits: Vec<(usize, &Phrase)> = choices
                .iter()
                .filter_map(|c| c.terms.find(key).map(|p| (c.label, p)))
                .collect();
            if hits.is_empty() {
                continue;
            }
            let canonical: Vec<usize> = hits
                .iter()
                .filter(|(_, p)| p.canonical)
                .map(|(l, _)| *l)
                .collect();
            let labels: Vec<usize> = if canonical.len() == 1 {
                canonical
            } else {
                hits.iter().map(|(l, _)| *l).collect()
            };
            let span = i..i + len;
            let text = slice(input, tokens, &span);
            for label in labels {
                candidates.push(Candidate {
                    label,
                    confidence: Confidence::High,
                    score: 1.0,
                    span: span.clone(),
                    text: text.clone(),
                });
            }
            for flag in &mut consumed[span] {
                *flag = true;
            }
            i += len;
            advanced = true;
            break;
        }
        if !advanced {
            i += 1;
        }
    }
}

struct FuzzyHit {
    label: usize,
    matched: Vec<usize>,
    score: f64,
}

/// Approximate matching of leftover words against every phrase of every choice.
fn fuzzy_phrases(
    input: &str,
    tokens: &[Token],
    segments: &[usize],
    choices: &[Choice<'_>],
    options: &MatchOptions,
    consumed: &mut [bool],
    candidates: &mut Vec<Candidate>,
) {
    let leftover: Vec<usize> = (0..tokens.len())
        .filter(|&i| !consumed[i] && !is_noise_word(&tokens[i].text))
        .collect();
    if leftover.is_empty() {
        return;
    }

    let mut hits: Vec<FuzzyHit> = Vec::new();
    for choice in choices {
        let best = choice
            .terms
            .phrases()
            .filter_map(|phrase| fuzzy_phrase(phrase, tokens, segments, &leftover, options))
            .max_by(|a, b| a.1.total_cmp(&b.1));
        if let Some((matched, score)) = best {
            hits.push(FuzzyHit {
                label: choice.label,
                matched,
                score,
            });
        }
    }

    // Hits that share any word compete for the union of their words.
    let mut groups: Vec<(Range<usize>, Vec<FuzzyHit>)> = Vec::new();
    hits.sort_by_key(|h| h.matched[0]);
    for hit in hits {
        let span = hit.matched[0]..hit.matched[hit.matched.len() - 1] + 1;
        match groups.last_mut() {
            Some((range, members)) if span.start < range.end => {
                range.end = range.end.max(span.end);
                members.push(hit);
            }
            _ => groups.push((span, vec![hit])),
        }
    }

    for (span, members) in groups {
        let text = slice(input, tokens, &span);
        for hit in &members {
            for &i in &hit.matched {
                consumed[i] = true;
            }
        }
        for hit in members {
            debug!(label = hit.label, score = hit.score, text = %text, "approximate match");
            candidates.push(Candidate {
                label: hit.label,
                confidence: Confidence::Low,
                score: hit.score,
                span: span.clone(),
                text: text.clone(),
            });
        }
    }
}

/// Finds which leftover tokens approximately cover `phrase`.
///
/// Returns the covered token indices and a score when more than
/// `min_coverage` of the phrase's words were found within one segment.
#[allow(clippy::cast_precision_loss)]
fn fuzzy_phrase(
    phrase: &Phrase,
    tokens: &[Token],
    segments: &[usize],
    leftover: &[usize],
    options: &MatchOptions,
) -> Option<(Vec<usize>, f64)> {
    let mut best: Option<(Vec<usize>, f64)> = None;
    let mut segment_ids: Vec<usize> = leftover.iter().map(|&i| segments[i]).collect();
    segment_ids.dedup();

    for segment in segment_ids {
        let pool: Vec<usize> = leftover
            .iter()
            .copied()
            .filter(|&i| segments[i] == segment)
            .collect();
        let mut used = Vec::new();
        let mut edits = 0;
        for word in &phrase.tokens {
            let tolerance = edit_tolerance(word.chars().count());
            let found = pool
                .iter()
                .filter(|i| !used.contains(*i))
                .map(|&i| (i, strsim::levenshtein(word, &tokens[i].text)))
                .filter(|&(_, distance)| distance <= tolerance)
                .min_by_key(|&(_, distance)| distance);
            if let Some((i, distance)) = found {
                used.push(i);
                edits += distance;
            }
        }
        let coverage = used.len() as f64 / phrase.tokens.len() as f64;
        if used.is_empty() || coverage <= options.min_coverage {
            continue;
        }
        used.sort_unstable();
        let score = (coverage - 0.1 * edits as f64).clamp(0.0, 1.0);
        if best.as_ref().is_none_or(|(_, s)| score > *s) {
            best = Some((used, score));
        }
    }
    best
}

/// Consecutive unclaimed, non-filler tokens, verbatim.
fn unmatched_fragments(
    input: &str,
    tokens: &[Token],
    segments: &[usize],
    consumed: &[bool],
) -> Vec<String> {
    let mut fragments = Vec::new();
    let mut run: Option<Range<usize>> = None;
    for i in 0..tokens.len() {
        let keep = !consumed[i] && tokens[i].text != "?" && !is_noise_word(&tokens[i].text);
        match (&mut run, keep) {
            (Some(r), true) if r.end == i && segments[r.start] == segments[i] => r.end = i + 1,
            (_, true) => {
                if let Some(r) = run.take() {
                    fragments.push(slice(input, tokens, &r));
                }
                run = Some(i..i + 1);
            }
            (_, false) => {
                if let Some(r) = run.take() {
                    fragments.push(slice(input, tokens, &r));
                }
            }
        }
    }
    if let Some(r) = run {
        fragments.push(slice(input, tokens, &r));
    }
    fragments
}
