//! Validation phrases: short consecutive word runs that identify a question
//! inside its wave, plus a check that adjacent questions cannot be mixed up

use codebook_common::Variable;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

const MIN_NGRAM: usize = 2;
const MAX_NGRAM: usize = 6;

/// Single-word fallback needs at least this many characters
const FALLBACK_WORD_LEN: usize = 6;

/// Word overlap ratio above which two phrases count as confusable
const SIMILARITY_THRESHOLD: f64 = 0.8;

static DIGITS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("valid digits regex"));

const GENERIC_WORDS: &[&str] = &[
    "the", "is", "are", "was", "were", "be", "been", "being", "do", "does", "did", "doing",
    "done", "have", "has", "had", "having", "you", "your", "yours", "this", "that", "these",
    "those", "of", "to", "in", "for", "on", "at", "by", "with", "from", "a", "an", "and", "or",
    "but", "if", "so", "would", "could", "should", "may", "might", "will", "can",
];

/// Lower-case and collapse whitespace
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// True when every word of `phrase` is a function word
pub fn is_too_generic(phrase: &str) -> bool {
    phrase.split_whitespace().all(|w| GENERIC_WORDS.contains(&w))
}

/// Uniqueness × length preference × generic penalty
pub fn score_phrase(phrase: &str, occurrences: usize, word_count: usize) -> f64 {
    if occurrences == 0 {
        return 0.0;
    }

    let uniqueness = 100.0 / (occurrences as f64).powf(1.5);
    let length = match word_count {
        1 => 0.5,
        2 => 0.8,
        3 | 4 => 1.0,
        5 => 0.9,
        _ => 0.7,
    };
    let generic = if is_too_generic(phrase) { 0.5 } else { 1.0 };

    uniqueness * length * generic
}

/// Chosen phrase for one question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationPhrase {
    pub phrase: String,
    /// Number of questions in the wave containing the phrase
    pub occurrences: usize,
    pub score: f64,
}

impl ValidationPhrase {
    fn new(phrase: impl Into<String>, occurrences: usize, score: f64) -> Self {
        Self {
            phrase: phrase.into(),
            occurrences,
            score,
        }
    }

    pub fn word_count(&self) -> usize {
        self.phrase.split_whitespace().count()
    }

    pub fn is_unique(&self) -> bool {
        self.occurrences == 1
    }

    pub fn is_acceptable(&self) -> bool {
        self.occurrences <= 2
    }

    pub fn is_good(&self) -> bool {
        self.occurrences <= 3 && self.word_count() >= 2
    }
}

/// Scores candidate phrases against every question of a wave
#[derive(Debug, Clone)]
pub struct PhraseFinder {
    normalized: Vec<String>,
}

impl PhraseFinder {
    pub fn new<'a, I>(all_questions: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        Self {
            normalized: all_questions.into_iter().map(normalize_text).collect(),
        }
    }

    /// Number of wave questions containing `needle` as a substring
    pub fn occurrences(&self, needle: &str) -> usize {
        self.normalized.iter().filter(|q| q.contains(needle)).count()
    }

    /// Best-scoring 2..=6 word run of `question` (first one on ties)
    pub fn find(&self, question: &str) -> ValidationPhrase {
        let question = normalize_text(question);
        let words: Vec<&str> = question.split_whitespace().collect();

        let mut best: Option<ValidationPhrase> = None;
        for n in MIN_NGRAM..=MAX_NGRAM.min(words.len()) {
            for window in words.windows(n) {
                let ngram = window.join(" ");
                if is_too_generic(&ngram) {
                    continue;
                }
                let occurrences = self.occurrences(&ngram);
                let score = score_phrase(&ngram, occurrences, n);
                if best.as_ref().map_or(true, |b| score > b.score) {
                    best = Some(ValidationPhrase::new(ngram, occurrences, score));
                }
            }
        }
        if let Some(best) = best {
            return best;
        }

        for word in &words {
            if word.chars().count() >= FALLBACK_WORD_LEN && !is_too_generic(word) {
                let occurrences = self.occurrences(word);
                if occurrences <= 2 {
                    return ValidationPhrase::new(*word, occurrences, 50.0);
                }
            }
        }

        if !words.is_empty() {
            let fallback = words[..words.len().min(3)].join(" ");
            let occurrences = self.occurrences(&fallback);
            return ValidationPhrase::new(fallback, occurrences, 10.0);
        }

        ValidationPhrase::new("", 0, 0.0)
    }
}

/// Phrase result for one variable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhraseEntry {
    pub variable_id: String,
    pub question_text: String,
    pub validation_phrase: String,
    pub phrase_occurrences: usize,
    pub phrase_length: usize,
    pub quality_score: f64,
    pub is_unique: bool,
    pub is_acceptable: bool,
    pub is_good: bool,
}

impl PhraseEntry {
    fn new(variable: &Variable, phrase: &ValidationPhrase) -> Self {
        Self {
            variable_id: variable.variable_id.clone(),
            question_text: variable.question_text.clone(),
            validation_phrase: phrase.phrase.clone(),
            phrase_occurrences: phrase.occurrences,
            phrase_length: phrase.word_count(),
            quality_score: phrase.score,
            is_unique: phrase.is_unique(),
            is_acceptable: phrase.is_acceptable(),
            is_good: phrase.is_good(),
        }
    }
}

/// Phrase quality summary of one wave
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WavePhraseReport {
    pub wave: String,
    pub total_questions: usize,
    pub unique_phrases: usize,
    pub acceptable_phrases: usize,
    pub good_phrases: usize,
    pub problematic: usize,
    pub questions: Vec<PhraseEntry>,
    pub adjacent_issues: Vec<ConfusionIssue>,
}

impl WavePhraseReport {
    /// Find phrases for every variable with an id and question text
    pub fn analyze(wave: impl Into<String>, variables: &[Variable]) -> Self {
        let finder = PhraseFinder::new(variables.iter().map(|v| v.question_text.as_str()));

        let questions: Vec<PhraseEntry> = variables
            .iter()
            .filter(|v| !v.variable_id.is_empty() && !v.question_text.is_empty())
            .map(|v| PhraseEntry::new(v, &finder.find(&v.question_text)))
            .collect();

        let total_questions = questions.len();
        let acceptable_phrases = questions.iter().filter(|q| q.is_acceptable).count();
        let adjacent_issues = check_adjacent_confusion(&questions);

        Self {
            wave: wave.into(),
            total_questions,
            unique_phrases: questions.iter().filter(|q| q.is_unique).count(),
            acceptable_phrases,
            good_phrases: questions.iter().filter(|q| q.is_good).count(),
            problematic: total_questions - acceptable_phrases,
            questions,
            adjacent_issues,
        }
    }

    /// Share of questions with an acceptable phrase, in percent
    pub fn coverage(&self) -> f64 {
        if self.total_questions == 0 {
            0.0
        } else {
            self.acceptable_phrases as f64 * 100.0 / self.total_questions as f64
        }
    }
}

/// Why two adjacent questions could be confused
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConfusionKind {
    EmptyPhrase,
    IdenticalPhrases,
    OverlappingPhrases,
    HighSimilarity { similarity: f64 },
}

/// A pair of adjacent questions with confusable phrases
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfusionIssue {
    pub q1: String,
    pub q2: String,
    pub q1_phrase: String,
    pub q2_phrase: String,
    pub issue: ConfusionKind,
}

/// Numeric part of a question id (`q83a` → 83)
pub fn question_number(variable_id: &str) -> Option<u64> {
    DIGITS_RE
        .find(variable_id)
        .and_then(|m| m.as_str().parse().ok())
        .filter(|n| *n > 0)
}

fn confusion(a: &str, b: &str) -> Option<ConfusionKind> {
    if a.is_empty() || b.is_empty() {
        return Some(ConfusionKind::EmptyPhrase);
    }
    if a == b {
        return Some(ConfusionKind::IdenticalPhrases);
    }
    if a.contains(b) || b.contains(a) {
        return Some(ConfusionKind::OverlappingPhrases);
    }

    let a_words: HashSet<&str> = a.split_whitespace().collect();
    let b_words: HashSet<&str> = b.split_whitespace().collect();
    let smaller = a_words.len().min(b_words.len());
    if smaller == 0 {
        return None;
    }
    let similarity = a_words.intersection(&b_words).count() as f64 / smaller as f64;
    (similarity > SIMILARITY_THRESHOLD).then_some(ConfusionKind::HighSimilarity { similarity })
}

/// Compare phrases of questions numbered n and n + 1
pub fn check_adjacent_confusion(entries: &[PhraseEntry]) -> Vec<ConfusionIssue> {
    let mut by_number: BTreeMap<u64, Vec<&PhraseEntry>> = BTreeMap::new();
    for entry in entries {
        if let Some(n) = question_number(&entry.variable_id) {
            by_number.entry(n).or_default().push(entry);
        }
    }

    let mut issues = Vec::new();
    for (num, current) in &by_number {
        let Some(next) = by_number.get(&(num + 1)) else {
            continue;
        };
        for a in current {
            for b in next {
                let a_phrase = a.validation_phrase.to_lowercase();
                let b_phrase = b.validation_phrase.to_lowercase();
                if let Some(issue) = confusion(&a_phrase, &b_phrase) {
                    issues.push(ConfusionIssue {
                        q1: a.variable_id.clone(),
                        q2: b.variable_id.clone(),
                        q1_phrase: a_phrase,
                        q2_phrase: b_phrase,
                        issue,
                    });
                }
            }
        }
    }
    issues
}
