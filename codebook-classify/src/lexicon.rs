//! Word lists for missing-label detection and label polarity
//!
//! [`Lexicon`] is plain data so callers (and tests) can substitute their own
//! lists; [`LabelMatcher`] is the compiled form used by the classifier.
//!
//! Matching rules:
//! - Missing-label patterns are regular-expression fragments, matched
//!   case-insensitively anywhere in the label.
//! - Polarity words are literal phrases matched on word boundaries, so
//!   `satisfied` does not fire inside `dissatisfied`.
//! - Positive words are scanned before negative ones and the first match
//!   wins. Negation handling is opt-in: with a non-empty negator list (for
//!   example [`COMMON_NEGATORS`]), a positive word with a negator among the
//!   three preceding words does not count as positive.

use codebook_common::config::LexiconConfig;
use codebook_common::Polarity;
use regex::{Regex, RegexBuilder};
use thiserror::Error;

/// Lexicon errors
#[derive(Debug, Error)]
pub enum LexiconError {
    /// A configured pattern is not a valid regular expression
    #[error("Invalid lexicon pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// The missing-label pattern list is empty
    #[error("Lexicon has no missing-label patterns")]
    NoNaPatterns,
}

/// How many preceding words are searched for a negator
const NEGATOR_WINDOW: usize = 3;

pub const DEFAULT_NA_PATTERNS: &[&str] = &[
    r"\bn/?a\b",
    r"missing",
    r"no answer",
    r"\bdecline[ds]?\b",
    r"\brefused?\b",
    r"\bdon['’]?t\s+kno?w",
    r"\bdo\s+not\s+know",
    r"\bcan['’]?t\s+choose",
    r"\bcannot\s+choose",
    r"not\s+applicable",
    r"inapplicable",
    r"\bdon['’]?t\s+unders",
    r"\bdo\s+not\s+unders",
    r"\bdon\s+not\s+unders",
];

pub const DEFAULT_POSITIVE_WORDS: &[&str] = &[
    "agree",
    "strongly agree",
    "satisfied",
    "very satisfied",
    "excellent",
    "very good",
    "good",
    "always",
    "often",
    "frequently",
    "support",
    "approve",
    "favorable",
    "positive",
    "confident",
    "trust",
    "easy",
    "very easy",
    "important",
    "very important",
    "yes",
    "definitely",
];

pub const DEFAULT_NEGATIVE_WORDS: &[&str] = &[
    "disagree",
    "strongly disagree",
    "dissatisfied",
    "very dissatisfied",
    "poor",
    "very poor",
    "bad",
    "never",
    "rarely",
    "seldom",
    "oppose",
    "disapprove",
    "unfavorable",
    "negative",
    "distrust",
    "difficult",
    "very difficult",
    "unimportant",
    "not important",
    "not at all",
    "no",
];

/// Negators for opt-in negation handling; the default lexicon has none
pub const COMMON_NEGATORS: &[&str] = &["not", "no", "neither", "hardly"];

/// Classifier word lists
#[derive(Debug, Clone, PartialEq)]
pub struct Lexicon {
    pub na_patterns: Vec<String>,
    pub positive_words: Vec<String>,
    pub negative_words: Vec<String>,
    pub negators: Vec<String>,
}

impl Default for Lexicon {
    fn default() -> Self {
        Self {
            na_patterns: to_owned(DEFAULT_NA_PATTERNS),
            positive_words: to_owned(DEFAULT_POSITIVE_WORDS),
            negative_words: to_owned(DEFAULT_NEGATIVE_WORDS),
            negators: Vec::new(),
        }
    }
}

impl Lexicon {
    /// Apply `[lexicon]` overrides on top of the defaults
    pub fn from_config(config: &LexiconConfig) -> Self {
        Self {
            na_patterns: config.merge(DEFAULT_NA_PATTERNS, config.na_patterns.as_ref()),
            positive_words: config.merge(DEFAULT_POSITIVE_WORDS, config.positive_words.as_ref()),
            negative_words: config.merge(DEFAULT_NEGATIVE_WORDS, config.negative_words.as_ref()),
            negators: config.merge(&[], config.negators.as_ref()),
        }
    }
}

fn to_owned(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

/// Compiled lexicon
#[derive(Debug, Clone)]
pub struct LabelMatcher {
    na: Regex,
    positive: Vec<Regex>,
    negative: Vec<Regex>,
    negators: Vec<String>,
}

impl LabelMatcher {
    /// Compile a lexicon
    ///
    /// # Errors
    /// Returns `LexiconError::InvalidPattern` if any missing-label pattern is
    /// not a valid regular expression, `LexiconError::NoNaPatterns` if the
    /// list is empty.
    pub fn new(lexicon: &Lexicon) -> Result<Self, LexiconError> {
        if lexicon.na_patterns.is_empty() {
            return Err(LexiconError::NoNaPatterns);
        }

        // Validate patterns one by one so the error names the culprit
        for pattern in &lexicon.na_patterns {
            Regex::new(pattern).map_err(|source| LexiconError::InvalidPattern {
                pattern: pattern.clone(),
                source,
            })?;
        }
        let joined = lexicon
            .na_patterns
            .iter()
            .map(|p| format!("(?:{})", p))
            .collect::<Vec<_>>()
            .join("|");
        let na = compile_case_insensitive(&joined)?;

        let positive = lexicon
            .positive_words
            .iter()
            .map(|w| compile_case_insensitive(&word_pattern(w)))
            .collect::<Result<Vec<_>, _>>()?;
        let negative = lexicon
            .negative_words
            .iter()
            .map(|w| compile_case_insensitive(&word_pattern(w)))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            na,
            positive,
            negative,
            negators: lexicon.negators.iter().map(|n| n.to_lowercase()).collect(),
        })
    }

    /// Does this label mark a missing / don't-know / refused code?
    pub fn is_na_label(&self, label: &str) -> bool {
        let label = label.trim();
        !label.is_empty() && self.na.is_match(label)
    }

    /// Sentiment polarity of a label
    ///
    /// Positive words are scanned before negative ones; the first match wins.
    /// A positive match preceded by a configured negator is skipped.
    pub fn polarity(&self, label: &str) -> Polarity {
        let label = label.trim().to_lowercase();
        if label.is_empty() {
            return Polarity::Neutral;
        }

        for re in &self.positive {
            if re
                .find_iter(&label)
                .any(|m| !self.is_negated(&label[..m.start()]))
            {
                return Polarity::Positive;
            }
        }

        if self.negative.iter().any(|re| re.is_match(&label)) {
            return Polarity::Negative;
        }

        Polarity::Neutral
    }

    /// Is there a negator among the last few words of `prefix`?
    fn is_negated(&self, prefix: &str) -> bool {
        prefix
            .split_whitespace()
            .rev()
            .take(NEGATOR_WINDOW)
            .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()))
            .any(|w| self.negators.iter().any(|n| n == w))
    }
}

impl Default for LabelMatcher {
    fn default() -> Self {
        // The built-in lists are literals covered by tests
        Self::new(&Lexicon::default()).expect("default lexicon compiles")
    }
}

fn compile_case_insensitive(pattern: &str) -> Result<Regex, LexiconError> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|source| LexiconError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })
}

/// Literal phrase → regex with word boundaries and flexible inner whitespace
fn word_pattern(word: &str) -> String {
    let word = word.trim();
    let body = word
        .split_whitespace()
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"\s+");

    let starts_word = word.chars().next().is_some_and(is_word_char);
    let ends_word = word.chars().last().is_some_and(is_word_char);

    format!(
        "{}{}{}",
        if starts_word { r"\b" } else { "" },
        body,
        if ends_word { r"\b" } else { "" }
    )
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
