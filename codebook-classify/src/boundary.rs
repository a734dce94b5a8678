//! Missing-value boundary detection
//!
//! Splits the value codes of one question into a substantive range
//! (`..=ceiling`) and a missing block starting at `first_na`. The layered
//! rules are tried in order:
//!
//! 1. Any code ≥ 997 → the 997+ block is missing.
//! 2. Maximum ≥ 100 → numeric gap > 10, then label text.
//! 3. Maximum in 10..=99 → numeric gap > 10, then codes ≥ 90.
//! 4. Single digits → numeric gap > 1, then a missing-style label on 7, then
//!    label text.
//!
//! Label text then refines the result (except for the 997+ convention).
//! Negative codes are always missing but never become `first_na`.

use crate::lexicon::LabelMatcher;
use codebook_common::QuestionLabelSet;
use serde::Serialize;

/// Codes at or above this are the conventional "large missing" block
pub const LARGE_MISSING_CODE: i64 = 997;

/// Codes at or above this are missing on two-digit scales
pub const TWO_DIGIT_MISSING_CODE: i64 = 90;

/// Gap size that separates answers from missing codes on wide scales
const WIDE_GAP: i64 = 10;

/// Gap size on single-digit scales (one skipped code is enough)
const NARROW_GAP: i64 = 1;

/// Which rule produced a boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryRule {
    LargeCode,
    Gap,
    TextLabel,
    NinetyPlus,
    ValueSeven,
    NoMissing,
}

impl BoundaryRule {
    pub fn as_str(&self) -> &'static str {
        match self {
            BoundaryRule::LargeCode => "large_code",
            BoundaryRule::Gap => "gap",
            BoundaryRule::TextLabel => "text_label",
            BoundaryRule::NinetyPlus => "ninety_plus",
            BoundaryRule::ValueSeven => "value_seven",
            BoundaryRule::NoMissing => "no_missing",
        }
    }
}

/// Result of boundary detection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Boundary {
    /// Highest code that can still be a real answer
    pub ceiling: i64,
    /// Lowest positive-range code opening the missing block
    pub first_na: Option<i64>,
    pub rule: BoundaryRule,
}

impl Boundary {
    fn new(ceiling: i64, first_na: Option<i64>, rule: BoundaryRule) -> Self {
        Self {
            ceiling,
            first_na,
            rule,
        }
    }

    /// Locate the substantive/missing boundary of `labels`
    pub fn detect(labels: &QuestionLabelSet, matcher: &LabelMatcher) -> Self {
        let values = labels.sorted_values();
        let positives: Vec<i64> = values.iter().copied().filter(|v| *v > 0).collect();
        let max_overall = values.last().copied().unwrap_or(0).max(0);
        let is_na = |value: i64| {
            labels
                .label_of(value)
                .is_some_and(|label| matcher.is_na_label(label))
        };

        // 997+ convention is trusted as-is
        if let Some(first_large) = values.iter().copied().find(|v| *v >= LARGE_MISSING_CODE) {
            let ceiling = values
                .iter()
                .copied()
                .filter(|v| *v < LARGE_MISSING_CODE)
                .max()
                .unwrap_or(0);
            return Self::new(ceiling, Some(first_large), BoundaryRule::LargeCode);
        }

        let first_text_na = first_text_na(&positives, &is_na);
        // Zero can be an answer ("None"), so it counts as a ceiling candidate
        let below = |limit: i64| {
            values
                .iter()
                .copied()
                .filter(|v| (0..limit).contains(v))
                .max()
        };

        let boundary = if max_overall >= 100 {
            if let Some((before, after)) = find_gap(&positives, WIDE_GAP) {
                Self::new(before, Some(after), BoundaryRule::Gap)
            } else if let Some(na) = first_text_na {
                Self::new(below(na).unwrap_or(0), Some(na), BoundaryRule::TextLabel)
            } else {
                Self::new(max_overall, None, BoundaryRule::NoMissing)
            }
        } else if max_overall >= 10 {
            if let Some((before, after)) = find_gap(&positives, WIDE_GAP) {
                Self::new(before, Some(after), BoundaryRule::Gap)
            } else if let Some(na) = positives
                .iter()
                .copied()
                .find(|v| *v >= TWO_DIGIT_MISSING_CODE)
            {
                Self::new(below(na).unwrap_or(0), Some(na), BoundaryRule::NinetyPlus)
            } else {
                Self::new(max_overall, None, BoundaryRule::NoMissing)
            }
        } else if let Some((before, after)) = find_gap(&positives, NARROW_GAP) {
            let gap = Self::new(before, Some(after), BoundaryRule::Gap);
            gap.skip_substantive_gap(&positives, &is_na)
        } else if labels.contains_value(7) && is_na(7) {
            Self::new(below(7).unwrap_or(6), Some(7), BoundaryRule::ValueSeven)
        } else if let Some(na) = first_text_na {
            Self::new(below(na).unwrap_or(0), Some(na), BoundaryRule::TextLabel)
        } else {
            Self::new(max_overall, None, BoundaryRule::NoMissing)
        };

        boundary.trim_trailing_na(&positives, &is_na)
    }

    /// A single-digit gap whose far side still carries an answer label is
    /// part of the scale (e.g. forced choice `1, 2, 4, 5`); move the boundary
    /// to the first missing-style label above it instead
    fn skip_substantive_gap(self, positives: &[i64], is_na: &impl Fn(i64) -> bool) -> Self {
        let Some(after) = self.first_na else {
            return self;
        };
        if is_na(after) {
            return self;
        }
        match positives.iter().copied().find(|v| *v > after && is_na(*v)) {
            Some(na) => {
                let ceiling = positives
                    .iter()
                    .copied()
                    .filter(|v| *v < na)
                    .max()
                    .unwrap_or(self.ceiling);
                Self::new(ceiling, Some(na), self.rule)
            }
            None => self,
        }
    }

    /// Missing-style labels at the top of the presumed answer range pull the
    /// boundary down
    fn trim_trailing_na(self, positives: &[i64], is_na: &impl Fn(i64) -> bool) -> Self {
        let run_start = positives
            .iter()
            .rev()
            .copied()
            .filter(|v| *v <= self.ceiling)
            .take_while(|v| is_na(*v))
            .last();

        let Some(run_start) = run_start else {
            return self;
        };

        let first_na = match self.first_na {
            Some(existing) if existing <= run_start => existing,
            _ => run_start,
        };
        let ceiling = positives
            .iter()
            .copied()
            .filter(|v| *v < run_start)
            .max()
            .unwrap_or(0);
        Self::new(ceiling, Some(first_na), self.rule)
    }
}

/// First pair of consecutive ascending values further apart than `threshold`
fn find_gap(sorted: &[i64], threshold: i64) -> Option<(i64, i64)> {
    sorted
        .windows(2)
        .find(|pair| pair[1].saturating_sub(pair[0]) > threshold)
        .map(|pair| (pair[0], pair[1]))
}

/// Lowest code ≥ 7 with a missing-style label, else the lowest positive one
fn first_text_na(positives: &[i64], is_na: &impl Fn(i64) -> bool) -> Option<i64> {
    positives
        .iter()
        .copied()
        .find(|v| *v >= 7 && is_na(*v))
        .or_else(|| positives.iter().copied().find(|v| is_na(*v)))
}
