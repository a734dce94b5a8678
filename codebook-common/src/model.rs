//! Survey data model shared by the parser, classifier and export writers
//!
//! The JSON shapes produced here are the interchange format between pipeline
//! stages (`parse` → `analyze` → `guide`/`recode`), so field names are stable.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One `(value, label)` pair from a codebook
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValueLabel {
    /// Integer code as stored in the raw dataset
    pub value: i64,
    /// Text shown to respondents/coders
    pub label: String,
}

impl ValueLabel {
    pub fn new(value: i64, label: impl Into<String>) -> Self {
        Self {
            value,
            label: label.into(),
        }
    }
}

/// All value labels belonging to one survey question
///
/// Values are unique within a set but need not be sorted or contiguous.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<ValueLabel>", into = "Vec<ValueLabel>")]
pub struct QuestionLabelSet(Vec<ValueLabel>);

impl QuestionLabelSet {
    /// Build a set, keeping the first label for any repeated value
    pub fn new(labels: Vec<ValueLabel>) -> Self {
        let mut unique: Vec<ValueLabel> = Vec::with_capacity(labels.len());
        for vl in labels {
            if unique.iter().any(|existing| existing.value == vl.value) {
                tracing::warn!(value = vl.value, label = %vl.label, "Duplicate value code ignored");
                continue;
            }
            unique.push(vl);
        }
        Self(unique)
    }

    /// Convenience constructor for literal pairs
    pub fn from_pairs<S: AsRef<str>>(pairs: &[(i64, S)]) -> Self {
        Self::new(
            pairs
                .iter()
                .map(|(value, label)| ValueLabel::new(*value, label.as_ref()))
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ValueLabel> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[ValueLabel] {
        &self.0
    }

    /// All values in ascending order
    pub fn sorted_values(&self) -> Vec<i64> {
        let mut values: Vec<i64> = self.0.iter().map(|vl| vl.value).collect();
        values.sort_unstable();
        values
    }

    /// Label attached to `value`, if present
    pub fn label_of(&self, value: i64) -> Option<&str> {
        self.0
            .iter()
            .find(|vl| vl.value == value)
            .map(|vl| vl.label.as_str())
    }

    pub fn contains_value(&self, value: i64) -> bool {
        self.0.iter().any(|vl| vl.value == value)
    }

    /// Normalized form used to compare label sets between questions:
    /// sorted by value, labels trimmed and lower-cased
    pub fn normalized(&self) -> Vec<(i64, String)> {
        let mut pairs: Vec<(i64, String)> = self
            .0
            .iter()
            .map(|vl| (vl.value, vl.label.trim().to_lowercase()))
            .collect();
        pairs.sort();
        pairs
    }
}

impl From<Vec<ValueLabel>> for QuestionLabelSet {
    fn from(labels: Vec<ValueLabel>) -> Self {
        Self::new(labels)
    }
}

impl From<QuestionLabelSet> for Vec<ValueLabel> {
    fn from(set: QuestionLabelSet) -> Self {
        set.0
    }
}

impl<'a> IntoIterator for &'a QuestionLabelSet {
    type Item = &'a ValueLabel;
    type IntoIter = std::slice::Iter<'a, ValueLabel>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// A survey variable as emitted by the labels parser
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    pub variable_id: String,
    pub question_text: String,
    pub value_labels: QuestionLabelSet,

    /// Topical domain added by later annotation passes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,

    /// Concept keywords added by later annotation passes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub concepts: Vec<String>,

    /// Any other annotation fields, carried through untouched
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Variable {
    pub fn new(
        variable_id: impl Into<String>,
        question_text: impl Into<String>,
        value_labels: QuestionLabelSet,
    ) -> Self {
        Self {
            variable_id: variable_id.into(),
            question_text: question_text.into(),
            value_labels,
            domain: None,
            concepts: Vec::new(),
            extra: serde_json::Map::new(),
        }
    }
}

/// Response-scale shape of a question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ScaleType {
    #[serde(rename = "binary")]
    Binary,
    #[serde(rename = "likert_3")]
    Likert3,
    #[serde(rename = "likert_4")]
    Likert4,
    #[serde(rename = "likert_5")]
    Likert5,
    #[serde(rename = "likert_6")]
    Likert6,
    #[serde(rename = "likert_7")]
    Likert7,
    #[serde(rename = "scale_10")]
    Scale10,
    #[serde(rename = "ordinal")]
    Ordinal,
    #[serde(rename = "categorical")]
    Categorical,
    #[serde(rename = "unknown")]
    Unknown,
}

impl ScaleType {
    /// Every variant, in reporting order
    pub const ALL: [ScaleType; 10] = [
        ScaleType::Binary,
        ScaleType::Likert3,
        ScaleType::Likert4,
        ScaleType::Likert5,
        ScaleType::Likert6,
        ScaleType::Likert7,
        ScaleType::Scale10,
        ScaleType::Ordinal,
        ScaleType::Categorical,
        ScaleType::Unknown,
    ];

    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ScaleType::Binary => "binary",
            ScaleType::Likert3 => "likert_3",
            ScaleType::Likert4 => "likert_4",
            ScaleType::Likert5 => "likert_5",
            ScaleType::Likert6 => "likert_6",
            ScaleType::Likert7 => "likert_7",
            ScaleType::Scale10 => "scale_10",
            ScaleType::Ordinal => "ordinal",
            ScaleType::Categorical => "categorical",
            ScaleType::Unknown => "unknown",
        }
    }

    /// Likert variant for a 3..=7 point scale
    pub fn likert(points: i64) -> Option<Self> {
        match points {
            3 => Some(ScaleType::Likert3),
            4 => Some(ScaleType::Likert4),
            5 => Some(ScaleType::Likert5),
            6 => Some(ScaleType::Likert6),
            7 => Some(ScaleType::Likert7),
            _ => None,
        }
    }

    /// Nominal scales have no direction to reverse
    pub fn is_directional(&self) -> bool {
        !matches!(self, ScaleType::Categorical | ScaleType::Unknown)
    }
}

impl fmt::Display for ScaleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sentiment direction implied by a label's wording
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    Positive,
    Negative,
    Neutral,
}

impl Polarity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Polarity::Positive => "positive",
            Polarity::Negative => "negative",
            Polarity::Neutral => "neutral",
        }
    }
}

impl fmt::Display for Polarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifier verdict for one question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaleAnalysis {
    pub scale_type: ScaleType,
    /// Number of substantive (non-missing) values
    pub scale_points: usize,
    /// Lowest positive-range code that opens the missing block
    pub first_na_value: Option<i64>,
    /// Highest substantive value, 0 when there is none
    pub max_substantive_value: i64,
    pub needs_reversal: bool,
    pub value_1_polarity: Polarity,
    pub max_value_polarity: Polarity,
    /// Rule certainty in `[0, 1]`
    pub confidence: f64,
    /// Human-readable justification (diagnostic only)
    pub reasoning: String,
}

impl ScaleAnalysis {
    /// Result for input that carries no usable substantive values
    pub fn unknown(first_na_value: Option<i64>, reasoning: impl Into<String>) -> Self {
        Self {
            scale_type: ScaleType::Unknown,
            scale_points: 0,
            first_na_value,
            max_substantive_value: 0,
            needs_reversal: false,
            value_1_polarity: Polarity::Neutral,
            max_value_polarity: Polarity::Neutral,
            confidence: 0.0,
            reasoning: reasoning.into(),
        }
    }
}

/// A variable together with its scale analysis (`*_analyzed.json` entries)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzedVariable {
    #[serde(flatten)]
    pub variable: Variable,
    pub scale_analysis: ScaleAnalysis,
}
