//! Term generation: the phrases a field or value can be recognized by.
//!
//! Terms are generated once when the schema is built. A name is broken into
//! words, lower-cased, and every contiguous n-gram (bare and with a plural
//! `s`) becomes a phrase. Declared phrases and regular expressions are merged
//! on top; regular expressions are matched verbatim against raw input.

use std::collections::BTreeMap;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::language::{is_stop_word, pluralize, tokenize, word_break};

/// Controls automatic term generation for one field or value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TermOptions {
    /// Generate n-grams from the name and description.
    pub auto_generate: bool,
    /// Longest n-gram to generate; `None` covers the full name.
    pub max_phrase_len: Option<usize>,
}

impl Default for TermOptions {
    fn default() -> Self {
        Self {
            auto_generate: true,
            max_phrase_len: None,
        }
    }
}

/// One literal phrase, pre-split into lower-cased tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Phrase {
    /// Lower-cased words of the phrase.
    pub tokens: Vec<String>,
    /// Whether this phrase is a complete name, description, or declared term
    /// rather than a sub-phrase of one.
    pub canonical: bool,
}

impl Phrase {
    /// The phrase joined with single spaces.
    #[must_use]
    pub fn text(&self) -> String {
        self.tokens.join(" ")
    }
}

/// The merged set of terms for a field or value.
#[derive(Debug, Clone, Default)]
pub struct TermSet {
    phrases: Vec<Phrase>,
    patterns: Vec<Regex>,
}

impl TermSet {
    /// Builds the generated terms for a name and its description.
    #[must_use]
    pub fn generated(name: &str, description: &str, options: &TermOptions) -> Self {
        let mut phrases: BTreeMap<Vec<String>, bool> = BTreeMap::new();
        if options.auto_generate {
            let name_tokens = word_break(name).iter().map(|w| w.to_lowercase()).collect();
            for tokens in [name_tokens, token_texts(description)] {
                for (phrase, canonical) in generate_ngrams(&tokens, options.max_phrase_len) {
                    let entry = phrases.entry(phrase).or_insert(false);
                    *entry |= canonical;
                }
            }
        }
        Self::from_map(phrases)
    }

    /// Adds declared literal phrases. Declared phrases count as canonical.
    #[must_use]
    pub fn with_phrases<I, S>(self, declared: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut map: BTreeMap<Vec<String>, bool> = self
            .phrases
            .into_iter()
            .map(|p| (p.tokens, p.canonical))
            .collect();
        for phrase in declared {
            let tokens = token_texts(phrase.as_ref());
            if !tokens.is_empty() {
                map.insert(tokens, true);
            }
        }
        Self {
            phrases: Self::from_map(map).phrases,
            patterns: self.patterns,
        }
    }

    /// Adds declared regular-expression terms.
    ///
    /// Patterns are compiled case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns the offending pattern text and compiler error when a pattern is invalid.
    pub fn with_patterns<I, S>(mut self, declared: I) -> Result<Self, (String, regex::Error)>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for pattern in declared {
            let text = pattern.as_ref();
            let regex = Regex::new(&format!("(?i){text}")).map_err(|e| (text.to_string(), e))?;
            self.patterns.push(regex);
        }
        Ok(self)
    }

    fn from_map(map: BTreeMap<Vec<String>, bool>) -> Self {
        let phrases = map
            .into_iter()
            .map(|(tokens, canonical)| Phrase { tokens, canonical })
            .collect();
        Self {
            phrases,
            patterns: Vec::new(),
        }
    }

    /// All literal phrases in a stable order.
    pub fn phrases(&self) -> impl Iterator<Item = &Phrase> {
        self.phrases.iter()
    }

    /// Declared regular-expression terms.
    #[must_use]
    pub fn patterns(&self) -> &[Regex] {
        &self.patterns
    }

    /// Whether there is nothing to match against.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty() && self.patterns.is_empty()
    }

    /// Whether the set holds exactly this phrase (already lower-cased tokens).
    #[must_use]
    pub fn contains(&self, tokens: &[String]) -> bool {
        self.find(tokens).is_some()
    }

    /// Looks up a phrase by its tokens.
    #[must_use]
    pub fn find(&self, tokens: &[String]) -> Option<&Phrase> {
        self.phrases
            .binary_search_by(|p| p.tokens.as_slice().cmp(tokens))
            .ok()
            .map(|i| &self.phrases[i])
    }

    /// Whether normalized input text equals one of the phrases.
    #[must_use]
    pub fn matches_text(&self, text: &str) -> bool {
        let tokens = token_texts(text);
        !tokens.is_empty() && self.contains(&tokens)
    }

    /// Length in tokens of the longest phrase.
    #[must_use]
    pub fn longest_phrase(&self) -> usize {
        self.phrases.iter().map(|p| p.tokens.len()).max().unwrap_or(0)
    }

    /// Phrase texts, for display and diagnostics.
    #[must_use]
    pub fn phrase_texts(&self) -> Vec<String> {
        self.phrases.iter().map(Phrase::text).collect()
    }

    /// Pattern sources, for display and diagnostics.
    #[must_use]
    pub fn pattern_texts(&self) -> Vec<String> {
        self.patterns
            .iter()
            .map(|r| r.as_str().trim_start_matches("(?i)").to_string())
            .collect()
    }
}

fn token_texts(text: &str) -> Vec<String> {
    tokenize(text).into_iter().map(|t| t.text).collect()
}

/// Generates the n-gram phrases for an identifier, sorted and deduplicated.
#[must_use]
pub fn generate_terms(name: &str, max_phrase_len: Option<usize>) -> Vec<String> {
    let tokens: Vec<String> = word_break(name).iter().map(|w| w.to_lowercase()).collect();
    let mut seen = std::collections::BTreeSet::new();
    for (phrase, _) in generate_ngrams(&tokens, max_phrase_len) {
        seen.insert(phrase.join(" "));
    }
    seen.into_iter().collect()
}

fn generate_ngrams(tokens: &[String], max_phrase_len: Option<usize>) -> Vec<(Vec<String>, bool)> {
    let n = tokens.len();
    if n == 0 {
        return Vec::new();
    }
    let max = max_phrase_len.unwrap_or(n).clamp(1, n);
    let mut out = Vec::new();

    for len in 1..=max {
        for start in 0..=n - len {
            let gram = &tokens[start..start + len];
            let full = len == n;
            let edge_stop = is_stop_word(&gram[0]) || is_stop_word(&gram[len - 1]);
            if edge_stop && !full {
                continue;
            }
            out.push((gram.to_vec(), full));
            if let Some(plural) = pluralize(&gram[len - 1]) {
                let mut variant = gram.to_vec();
                variant[len - 1] = plural;
                out.push((variant, full));
            }
        }
    }
    if max < n {
        out.push((tokens.to_vec(), true));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_ngrams_with_plural_variants() {
        let terms = generate_terms("ThinCrust", None);
        assert_eq!(
            terms,
            vec!["crust", "crusts", "thin", "thin crust", "thin crusts", "thins"]
                .into_iter()
                .map(String::from)
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn generation_is_deterministic() {
        assert_eq!(
            generate_terms("ExtraLargeDeepDish", None),
            generate_terms("ExtraLargeDeepDish", None)
        );
    }

    #[test]
    fn generated_terms_are_subsequences_of_the_name() {
        let name = "SaltAndPepperShaker";
        let words: Vec<String> = word_break(name).iter().map(|w| w.to_lowercase()).collect();
        for term in generate_terms(name, None) {
            let mut tokens: Vec<String> = term.split(' ').map(String::from).collect();
            let last = tokens.len() - 1;
            if !words.contains(&tokens[last]) {
                tokens[last] = tokens[last].strip_suffix('s').unwrap_or(&tokens[last]).to_string();
            }
            let contiguous = words.windows(tokens.len()).any(|w| w == tokens.as_slice());
            assert!(contiguous, "term {term:?} is not drawn from {words:?}");
        }
    }

    #[test]
    fn stop_words_never_bound_partial_phrases() {
        let terms = generate_terms("SaltAndPepper", None);
        assert!(terms.contains(&"salt and pepper".to_string()));
        assert!(!terms.contains(&"and".to_string()));
        assert!(!terms.contains(&"salt and".to_string()));
        assert!(!terms.contains(&"and pepper".to_string()));
    }

    #[test]
    fn max_phrase_len_limits_ngrams_but_keeps_full_name() {
        let terms = generate_terms("ExtraLargeDeepDish", Some(1));
        assert!(terms.contains(&"deep".to_string()));
        assert!(!terms.contains(&"deep dish".to_string()));
        assert!(terms.contains(&"extra large deep dish".to_string()));
    }

    #[test]
    fn term_set_marks_full_name_and_description_canonical() {
        let set = TermSet::generated("ThinCrust", "Thin and crispy", &TermOptions::default());
        let full = set.find(&["thin".into(), "crust".into()]).unwrap();
        assert!(full.canonical);
        let part = set.find(&["crust".into()]).unwrap();
        assert!(!part.canonical);
        let whole = set.find(&["thin".into(), "and".into(), "crispy".into()]);
        assert!(whole.unwrap().canonical);
    }

    #[test]
    fn declared_terms_union_with_generated() {
        let set = TermSet::generated("Pepperoni", "Pepperoni", &TermOptions::default())
            .with_phrases(["Spicy Salami"]);
        assert!(set.matches_text("pepperoni"));
        assert!(set.matches_text("spicy salami"));
    }

    #[test]
    fn disabling_generation_leaves_only_declared_terms() {
        let options = TermOptions {
            auto_generate: false,
            max_phrase_len: None,
        };
        let set = TermSet::generated("Pepperoni", "Pepperoni", &options).with_phrases(["salami"]);
        assert!(!set.matches_text("pepperoni"));
        assert!(set.matches_text("salami"));
    }

    #[test]
    fn invalid_pattern_is_reported() {
        let err = TermSet::default().with_patterns(["(unclosed"]).unwrap_err();
        assert_eq!(err.0, "(unclosed");
    }

    #[test]
    fn patterns_are_case_insensitive() {
        let set = TermSet::default().with_patterns([r"\bxl\b"]).unwrap();
        assert!(set.patterns()[0].is_match("I want XL"));
        assert_eq!(set.pattern_texts(), vec![r"\bxl\b".to_string()]);
    }
}
