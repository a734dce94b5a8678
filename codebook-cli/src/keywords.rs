//! Distinctive keyword selection by wave-wide word frequency

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

/// Shortest word considered as a keyword
pub const DEFAULT_MIN_LEN: usize = 5;

/// Characters kept when the question has no usable keyword
const FALLBACK_CHARS: usize = 15;

static NON_WORD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w\s]").expect("valid non-word regex"));

pub const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
    "from", "is", "are", "was", "were", "be", "been", "have", "has", "had", "do", "does", "did",
    "will", "would", "should", "could", "may", "might", "must", "can", "your", "you", "how",
    "what", "which", "when", "where", "who", "why", "that", "this", "these", "those",
    "question", "please", "following",
];

/// Word counts over every question of a wave
#[derive(Debug, Clone, Default)]
pub struct WordFrequency {
    counts: HashMap<String, usize>,
    min_len: usize,
}

impl WordFrequency {
    /// Count candidate words over `questions`
    pub fn build<'a, I>(questions: I, min_len: usize) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut freq = Self {
            counts: HashMap::new(),
            min_len,
        };
        for question in questions {
            for word in freq.candidate_words(question) {
                *freq.counts.entry(word).or_insert(0) += 1;
            }
        }
        freq
    }

    /// Lower-cased words of at least `min_len` characters that are not stop
    /// words, in text order
    pub fn candidate_words(&self, text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        NON_WORD_RE
            .replace_all(&lowered, " ")
            .split_whitespace()
            .filter(|w| w.chars().count() >= self.min_len && !STOP_WORDS.contains(w))
            .map(str::to_string)
            .collect()
    }

    pub fn count(&self, word: &str) -> usize {
        self.counts.get(word).copied().unwrap_or(0)
    }

    /// Rarest candidate word of `text` (first one on ties)
    ///
    /// Falls back to the first characters of the question when it has no
    /// candidate words.
    pub fn distinctive_keyword(&self, text: &str) -> String {
        let mut best: Option<(String, usize)> = None;
        for word in self.candidate_words(text) {
            let count = self.count(&word);
            if best.as_ref().map_or(true, |(_, c)| count < *c) {
                best = Some((word, count));
            }
        }

        match best {
            Some((word, _)) => word,
            None => text.chars().take(FALLBACK_CHARS).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wave() -> WordFrequency {
        WordFrequency::build(
            [
                "How much trust do you have in the courts?",
                "How much trust do you have in the national government?",
                "How much trust do you have in political parties?",
            ],
            DEFAULT_MIN_LEN,
        )
    }

    #[test]
    fn test_counts_skip_short_and_stop_words() {
        let freq = wave();
        assert_eq!(freq.count("trust"), 3);
        assert_eq!(freq.count("courts"), 1);
        assert_eq!(freq.count("much"), 0);
        assert_eq!(freq.count("which"), 0);
    }

    #[test]
    fn test_distinctive_keyword_is_rarest() {
        let freq = wave();
        assert_eq!(freq.distinctive_keyword("How much trust do you have in the courts?"), "courts");
        assert_eq!(
            freq.distinctive_keyword("How much trust do you have in political parties?"),
            "political"
        );
    }

    #[test]
    fn test_punctuation_splits_words() {
        let freq = WordFrequency::build(["Army/police-forces"], DEFAULT_MIN_LEN);
        assert_eq!(freq.count("police"), 1);
        assert_eq!(freq.count("forces"), 1);
    }

    #[test]
    fn test_fallback_to_prefix() {
        let freq = wave();
        assert_eq!(freq.distinctive_keyword("Age of the respondent?"), "respondent");
        assert_eq!(freq.distinctive_keyword("Is it OK? Yes or no"), "Is it OK? Yes o");
        assert_eq!(freq.distinctive_keyword("Sex"), "Sex");
    }
}
