//! Reversal guide CSV: one row per variable that needs reversing, with the
//! codes to treat as missing and a keyword for checking the question

use crate::keywords::{WordFrequency, DEFAULT_MIN_LEN};
use codebook_common::config::ExportConfig;
use codebook_common::{AnalyzedVariable, Result, ScaleType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::io::Write;
use std::path::Path;
use tracing::info;

/// One guide line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuideRow {
    pub wave: String,
    pub variable_id: String,
    pub question_type: String,
    pub scale_type: ScaleType,
    pub scale_points: usize,
    pub max_value: i64,
    pub missing_codes: String,
    pub distinctive_keyword: String,
    pub question_text: String,
}

/// Questionnaire section implied by the id prefix
pub fn question_type(variable_id: &str) -> &'static str {
    let id = variable_id.to_lowercase();
    if id.starts_with("ir") {
        "interviewer"
    } else if id.starts_with("se") {
        "socioeconomic"
    } else if id.starts_with('q') {
        "core_questionnaire"
    } else {
        "other"
    }
}

/// Negative codes plus everything from the first missing code up, or the
/// configured defaults when the variable has none
pub fn missing_codes(variable: &AnalyzedVariable, defaults: &[i64]) -> Vec<i64> {
    let first_na = variable.scale_analysis.first_na_value;
    let codes: BTreeSet<i64> = variable
        .variable
        .value_labels
        .iter()
        .map(|vl| vl.value)
        .filter(|v| *v < 0 || first_na.is_some_and(|na| *v >= na))
        .collect();

    if codes.is_empty() {
        defaults.to_vec()
    } else {
        codes.into_iter().collect()
    }
}

/// `-1; 8; 9`
pub fn join_codes(codes: &[i64]) -> String {
    codes
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// First `max_chars` characters followed by `...` when the text is longer
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let mut short: String = text.chars().take(max_chars).collect();
        short.push_str("...");
        short
    } else {
        text.to_string()
    }
}

/// Guide rows for one wave, in input order
///
/// Keywords are ranked against every question of the wave, not only the
/// reversed ones.
pub fn build_guide_rows(
    wave: &str,
    variables: &[AnalyzedVariable],
    config: &ExportConfig,
) -> Vec<GuideRow> {
    let freq = WordFrequency::build(
        variables.iter().map(|v| v.variable.question_text.as_str()),
        DEFAULT_MIN_LEN,
    );

    variables
        .iter()
        .filter(|v| v.scale_analysis.needs_reversal)
        .map(|v| {
            let sa = &v.scale_analysis;
            let question = &v.variable.question_text;
            GuideRow {
                wave: wave.to_string(),
                variable_id: v.variable.variable_id.clone(),
                question_type: question_type(&v.variable.variable_id).to_string(),
                scale_type: sa.scale_type,
                scale_points: sa.scale_points,
                max_value: sa.max_substantive_value,
                missing_codes: join_codes(&missing_codes(v, &config.default_missing_codes)),
                distinctive_keyword: freq.distinctive_keyword(question),
                question_text: truncate_chars(question, config.question_preview_chars),
            }
        })
        .collect()
}

/// Write rows with a header line
pub fn write_guide<W: Write>(rows: &[GuideRow], writer: W) -> Result<()> {
    let mut csv_writer = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
    csv_writer.write_record([
        "wave",
        "variable_id",
        "question_type",
        "scale_type",
        "scale_points",
        "max_value",
        "missing_codes",
        "distinctive_keyword",
        "question_text",
    ])?;
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write a guide CSV file
pub fn write_guide_file(path: &Path, rows: &[GuideRow]) -> Result<()> {
    let file = std::fs::File::create(path)?;
    write_guide(rows, file)?;
    info!("{} reversal rows written to {}", rows.len(), path.display());
    Ok(())
}

/// Read a guide CSV back
pub fn read_guide_file(path: &Path) -> Result<Vec<GuideRow>> {
    let mut reader = csv::Reader::from_path(path)?;
    let rows = reader.deserialize().collect::<std::result::Result<Vec<GuideRow>, _>>()?;
    Ok(rows)
}
