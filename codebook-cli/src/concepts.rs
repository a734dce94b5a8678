//! Concept CSVs from annotated variables
//!
//! Annotation passes add `domain`, `concepts` and validation-phrase fields to
//! the variable JSON. Variables without them still get a row with defaults.

use codebook_common::{Result, Variable};
use serde_json::Value;
use std::io::Write;
use std::path::Path;
use tracing::info;

const UNKNOWN_DOMAIN: &str = "Unknown";

const BASIC_HEADER: [&str; 7] = [
    "variable_id",
    "domain",
    "concepts",
    "question_text",
    "validation_phrase",
    "validation_phrase_occurrences",
    "validation_phrase_score",
];

const DETAILED_HEADER: [&str; 8] = [
    "variable_id",
    "domain",
    "concepts",
    "question_text",
    "value_labels",
    "validation_phrase",
    "validation_phrase_occurrences",
    "validation_phrase_score",
];

/// Column values shared by both CSV forms
struct ConceptFields {
    domain: String,
    concepts: String,
    phrase: String,
    occurrences: String,
    score: String,
}

impl ConceptFields {
    fn from_variable(var: &Variable) -> Self {
        let occurrences = var
            .extra
            .get("validation_phrase_occurrences")
            .and_then(Value::as_u64)
            .unwrap_or(0);
        let score = var
            .extra
            .get("validation_phrase_score")
            .and_then(Value::as_f64)
            .unwrap_or(0.0);

        Self {
            domain: var
                .domain
                .clone()
                .unwrap_or_else(|| UNKNOWN_DOMAIN.to_string()),
            concepts: var.concepts.join(", "),
            phrase: var
                .extra
                .get("validation_phrase")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            occurrences: occurrences.to_string(),
            score: format!("{:?}", score),
        }
    }
}

/// `value=label; value=label`
pub fn format_value_labels(var: &Variable) -> String {
    var.value_labels
        .iter()
        .map(|vl| format!("{}={}", vl.value, vl.label))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Basic form: ids, domain, concepts, question and validation phrase
pub fn write_basic<W: Write>(variables: &[Variable], writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(BASIC_HEADER)?;
    for var in variables {
        let f = ConceptFields::from_variable(var);
        csv_writer.write_record([
            var.variable_id.as_str(),
            f.domain.as_str(),
            f.concepts.as_str(),
            var.question_text.as_str(),
            f.phrase.as_str(),
            f.occurrences.as_str(),
            f.score.as_str(),
        ])?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Detailed form: basic columns plus the value labels
pub fn write_detailed<W: Write>(variables: &[Variable], writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(DETAILED_HEADER)?;
    for var in variables {
        let f = ConceptFields::from_variable(var);
        let labels = format_value_labels(var);
        csv_writer.write_record([
            var.variable_id.as_str(),
            f.domain.as_str(),
            f.concepts.as_str(),
            var.question_text.as_str(),
            labels.as_str(),
            f.phrase.as_str(),
            f.occurrences.as_str(),
            f.score.as_str(),
        ])?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write both CSV files
pub fn write_concept_files(variables: &[Variable], basic: &Path, detailed: &Path) -> Result<()> {
    write_basic(variables, std::fs::File::create(basic)?)?;
    info!("Basic CSV saved to {}", basic.display());
    write_detailed(variables, std::fs::File::create(detailed)?)?;
    info!("Detailed CSV saved to {}", detailed.display());
    Ok(())
}
