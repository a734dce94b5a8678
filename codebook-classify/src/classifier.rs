//! Scale-direction classifier
//!
//! [`ScaleClassifier::classify`] is total: every input, including an empty
//! label set, yields a fully populated [`ScaleAnalysis`]. Low-quality results
//! surface as `unknown` or a reduced confidence, never as an error.

use crate::boundary::Boundary;
use crate::lexicon::{LabelMatcher, Lexicon, LexiconError};
use codebook_common::{Polarity, QuestionLabelSet, ScaleAnalysis, ScaleType, ValueLabel};

/// Confidence for any rule that matched cleanly
pub const DEFAULT_CONFIDENCE: f64 = 0.8;

/// Confidence for the non-contiguous ordinal fallback
pub const AMBIGUOUS_CONFIDENCE: f64 = 0.5;

/// Substantive answers vs. missing codes of one question
#[derive(Debug, Clone, PartialEq)]
pub struct Partition<'a> {
    /// Real answers, ascending by value
    pub substantive: Vec<&'a ValueLabel>,
    pub missing: Vec<&'a ValueLabel>,
}

/// Classifies response scales from their value labels
#[derive(Debug, Clone, Default)]
pub struct ScaleClassifier {
    matcher: LabelMatcher,
}

impl ScaleClassifier {
    /// Create a classifier over a custom lexicon
    pub fn new(lexicon: &Lexicon) -> Result<Self, LexiconError> {
        Ok(Self {
            matcher: LabelMatcher::new(lexicon)?,
        })
    }

    pub fn with_matcher(matcher: LabelMatcher) -> Self {
        Self { matcher }
    }

    pub fn matcher(&self) -> &LabelMatcher {
        &self.matcher
    }

    /// Split `labels` around `boundary`
    ///
    /// Negative codes, codes above the ceiling and codes with a missing-style
    /// label are missing; everything else is substantive.
    pub fn partition<'a>(&self, labels: &'a QuestionLabelSet, boundary: &Boundary) -> Partition<'a> {
        let (mut substantive, missing): (Vec<&ValueLabel>, Vec<&ValueLabel>) =
            labels.iter().partition(|vl| {
                vl.value >= 0 && vl.value <= boundary.ceiling && !self.matcher.is_na_label(&vl.label)
            });
        substantive.sort_by_key(|vl| vl.value);
        Partition {
            substantive,
            missing,
        }
    }

    /// Classify one question's value labels
    pub fn classify(&self, labels: &QuestionLabelSet) -> ScaleAnalysis {
        if labels.is_empty() {
            return ScaleAnalysis::unknown(None, "No value labels provided");
        }

        let boundary = Boundary::detect(labels, &self.matcher);
        let partition = self.partition(labels, &boundary);

        let (Some(low), Some(high)) = (partition.substantive.first(), partition.substantive.last())
        else {
            return ScaleAnalysis::unknown(boundary.first_na, "No substantive values found");
        };

        let min = low.value;
        let max = high.value;
        let points = partition.substantive.len();
        let span = max.saturating_sub(min).saturating_add(1);

        let value_1_polarity = self.matcher.polarity(&low.label);
        let max_value_polarity = self.matcher.polarity(&high.label);
        let mut needs_reversal =
            value_1_polarity == Polarity::Positive && max_value_polarity != Polarity::Positive;

        let mut confidence = DEFAULT_CONFIDENCE;
        let (scale_type, mut reasoning) = if max <= 2 {
            (ScaleType::Binary, format!("Binary scale (values {min}-{max})"))
        } else if points >= 10 {
            if (max == 10 || max == 11) && span <= 11 && points <= 11 {
                (ScaleType::Scale10, format!("10-point scale (values {min}-{max})"))
            } else {
                needs_reversal = false;
                (
                    ScaleType::Categorical,
                    format!("Categorical with {points} values (no natural order)"),
                )
            }
        } else if let Some(likert) = ScaleType::likert(max).filter(|_| max <= 6 && span <= 6) {
            (likert, format!("{max}-point Likert scale (values {min}-{max})"))
        } else if max == 7 && boundary.first_na.map_or(true, |na| na >= 8) {
            (ScaleType::Likert7, format!("7-point Likert scale (values {min}-{max})"))
        } else if span == points as i64 {
            (ScaleType::Ordinal, format!("Ordinal scale with {points} values"))
        } else {
            confidence = AMBIGUOUS_CONFIDENCE;
            (
                ScaleType::Ordinal,
                format!("Ordinal scale with {points} values (non-contiguous, span {span})"),
            )
        };

        if needs_reversal && scale_type.is_directional() {
            reasoning.push_str(&format!(
                " | NEEDS REVERSAL: value {min} is {value_1_polarity}, value {max} is {max_value_polarity}"
            ));
        }

        ScaleAnalysis {
            scale_type,
            scale_points: points,
            first_na_value: boundary.first_na,
            max_substantive_value: max,
            needs_reversal,
            value_1_polarity,
            max_value_polarity,
            confidence,
            reasoning,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(pairs: &[(i64, &str)]) -> ScaleAnalysis {
        ScaleClassifier::default().classify(&QuestionLabelSet::from_pairs(pairs))
    }

    #[test]
    fn test_likert_4_with_negative_missing_code() {
        let a = classify(&[
            (-1, "Missing"),
            (1, "Very Satisfied"),
            (2, "Satisfied"),
            (3, "Dissatisfied"),
            (4, "Very Dissatisfied"),
        ]);
        assert_eq!(a.scale_type, ScaleType::Likert4);
        assert_eq!(a.scale_points, 4);
        assert_eq!(a.max_substantive_value, 4);
        assert_eq!(a.first_na_value, None);
        assert!(a.needs_reversal);
        assert_eq!(a.value_1_polarity, Polarity::Positive);
        assert_eq!(a.max_value_polarity, Polarity::Negative);
        assert_eq!(a.confidence, DEFAULT_CONFIDENCE);
        assert!(a.reasoning.starts_with("4-point Likert scale (values 1-4)"));
        assert!(a.reasoning.contains("NEEDS REVERSAL: value 1 is positive, value 4 is negative"));
    }

    #[test]
    fn test_likert_5_with_gap_missing_block() {
        let a = classify(&[
            (1, "Very Difficult"),
            (2, "Difficult"),
            (3, "Easy"),
            (4, "Very Easy"),
            (5, "Never Tried"),
            (8, "Can't choose"),
            (9, "Decline to answer"),
        ]);
        assert_eq!(a.scale_type, ScaleType::Likert5);
        assert_eq!(a.scale_points, 5);
        assert_eq!(a.max_substantive_value, 5);
        assert_eq!(a.first_na_value, Some(8));
        assert!(!a.needs_reversal);
        assert_eq!(a.value_1_polarity, Polarity::Negative);
        assert!(!a.reasoning.contains("NEEDS REVERSAL"));
    }

    #[test]
    fn test_scale_10_reversed() {
        let mut pairs = vec![(1, "Strongly Agree".to_string())];
        pairs.extend((2..=9).map(|v| (v, v.to_string())));
        pairs.push((10, "Strongly Disagree".to_string()));
        let a = ScaleClassifier::default().classify(&QuestionLabelSet::from_pairs(&pairs));
        assert_eq!(a.scale_type, ScaleType::Scale10);
        assert_eq!(a.scale_points, 10);
        assert!(a.needs_reversal);
    }

    #[test]
    fn test_zero_to_ten_is_scale_10() {
        let mut pairs = vec![(0, "Not at all".to_string())];
        pairs.extend((1..=9).map(|v| (v, v.to_string())));
        pairs.push((10, "Completely".to_string()));
        pairs.push((99, "Don't know".to_string()));
        let a = ScaleClassifier::default().classify(&QuestionLabelSet::from_pairs(&pairs));
        assert_eq!(a.scale_type, ScaleType::Scale10);
        assert_eq!(a.scale_points, 11);
        assert_eq!(a.first_na_value, Some(99));
        assert!(!a.needs_reversal);
    }

    #[test]
    fn test_many_codes_categorical_without_reversal() {
        let occupations = [
            "Manager", "Professional", "Technician", "Clerk", "Service worker",
            "Farmer", "Craft worker", "Operator", "Laborer", "Soldier",
            "Student", "Homemaker", "Retired", "Self-employed", "Other",
        ];
        let pairs: Vec<(i64, &str)> = occupations
            .iter()
            .enumerate()
            .map(|(i, name)| (i as i64 + 1, *name))
            .collect();
        let a = classify(&pairs);
        assert_eq!(a.scale_type, ScaleType::Categorical);
        assert_eq!(a.scale_points, 15);
        assert!(!a.needs_reversal);
    }

    #[test]
    fn test_categorical_overrides_polarity_reversal() {
        let mut pairs = vec![(1, "Excellent".to_string())];
        pairs.extend((2..=14).map(|v| (v, format!("Option {v}"))));
        pairs.push((15, "Poor".to_string()));
        let a = ScaleClassifier::default().classify(&QuestionLabelSet::from_pairs(&pairs));
        assert_eq!(a.scale_type, ScaleType::Categorical);
        assert_eq!(a.value_1_polarity, Polarity::Positive);
        assert!(!a.needs_reversal);
        assert!(!a.reasoning.contains("NEEDS REVERSAL"));
    }

    #[test]
    fn test_empty_is_unknown() {
        let a = classify(&[]);
        assert_eq!(a.scale_type, ScaleType::Unknown);
        assert_eq!(a.scale_points, 0);
        assert_eq!(a.max_substantive_value, 0);
        assert_eq!(a.confidence, 0.0);
        assert!(!a.needs_reversal);
        assert_eq!(a.reasoning, "No value labels provided");
    }

    #[test]
    fn test_all_missing_is_unknown_with_first_na() {
        let a = classify(&[(-1, "Missing"), (8, "Don't know"), (9, "Refused")]);
        assert_eq!(a.scale_type, ScaleType::Unknown);
        assert_eq!(a.first_na_value, Some(8));
        assert_eq!(a.confidence, 0.0);
    }

    #[test]
    fn test_ninety_plus_code_alone_is_missing() {
        let a = classify(&[(-1, "Missing"), (0, "None"), (95, "95 hours or more")]);
        assert_eq!(a.first_na_value, Some(95));
        assert_eq!(a.max_substantive_value, 0);
        assert_eq!(a.scale_points, 1);
    }

    #[test]
    fn test_binary_yes_no() {
        let a = classify(&[(1, "Yes"), (2, "No"), (8, "Don't know")]);
        assert_eq!(a.scale_type, ScaleType::Binary);
        assert_eq!(a.scale_points, 2);
        assert!(a.needs_reversal);
    }

    #[test]
    fn test_forced_choice_four_point() {
        let a = classify(&[
            (1, "Strongly agree"),
            (2, "Agree"),
            (4, "Disagree"),
            (5, "Strongly disagree"),
            (8, "Can't choose"),
            (9, "Refused"),
        ]);
        assert_eq!(a.scale_points, 4);
        assert_eq!(a.max_substantive_value, 5);
        assert_eq!(a.first_na_value, Some(8));
        assert_eq!(a.scale_type, ScaleType::Likert5);
        assert!(a.needs_reversal);
    }

    #[test]
    fn test_likert_7_and_value_seven_missing() {
        let seven: Vec<(i64, String)> = (1..=7).map(|v| (v, format!("Level {v}"))).collect();
        let a = ScaleClassifier::default().classify(&QuestionLabelSet::from_pairs(&seven));
        assert_eq!(a.scale_type, ScaleType::Likert7);

        let a = classify(&[
            (1, "Always"),
            (2, "Often"),
            (3, "Sometimes"),
            (4, "Rarely"),
            (5, "Never"),
            (6, "Hardly ever"),
            (7, "Don't know"),
        ]);
        assert_eq!(a.scale_type, ScaleType::Likert6);
        assert_eq!(a.first_na_value, Some(7));
        assert!(a.needs_reversal);
    }

    #[test]
    fn test_ordinal_contiguous_and_fallback() {
        let pairs: Vec<(i64, String)> = (3..=9).map(|v| (v, format!("{v} times"))).collect();
        let a = ScaleClassifier::default().classify(&QuestionLabelSet::from_pairs(&pairs));
        assert_eq!(a.scale_type, ScaleType::Ordinal);
        assert_eq!(a.confidence, DEFAULT_CONFIDENCE);

        let a = classify(&[(10, "Ten"), (20, "Twenty"), (30, "Thirty")]);
        assert_eq!(a.scale_type, ScaleType::Ordinal);
        assert_eq!(a.confidence, AMBIGUOUS_CONFIDENCE);
        assert!(a.reasoning.contains("non-contiguous"));
    }

    #[test]
    fn test_partition_is_complete() {
        let labels = QuestionLabelSet::from_pairs(&[
            (-1, "Missing"),
            (1, "Agree"),
            (2, "Neutral"),
            (3, "Disagree"),
            (8, "Don't know"),
        ]);
        let classifier = ScaleClassifier::default();
        let boundary = Boundary::detect(&labels, classifier.matcher());
        let partition = classifier.partition(&labels, &boundary);
        assert_eq!(partition.substantive.len() + partition.missing.len(), labels.len());
        assert_eq!(
            partition.substantive.iter().map(|vl| vl.value).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn test_custom_lexicon() {
        let lexicon = Lexicon {
            positive_words: vec!["zufrieden".to_string()],
            negative_words: vec!["unzufrieden".to_string()],
            ..Lexicon::default()
        };
        let classifier = ScaleClassifier::new(&lexicon).unwrap();
        let a = classifier.classify(&QuestionLabelSet::from_pairs(&[
            (1, "Sehr zufrieden"),
            (2, "Zufrieden"),
            (3, "Unzufrieden"),
        ]));
        assert_eq!(a.scale_type, ScaleType::Likert3);
        assert!(a.needs_reversal);
    }
}
