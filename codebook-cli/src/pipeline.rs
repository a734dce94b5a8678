//! Pipeline stages run by the `codebook` subcommands
//!
//! Each stage reads the previous stage's file, writes its own artifact and
//! returns what it wrote so the caller can report it.

use crate::concepts::write_concept_files;
use crate::guide::{build_guide_rows, write_guide_file, GuideRow};
use crate::phrases::WavePhraseReport;
use crate::recode::RecodeGenerator;
use crate::waves::WaveInput;
use anyhow::{Context, Result};
use codebook_classify::{analyze_questionnaire, AnalyzedQuestionnaire, ScaleClassifier};
use codebook_common::config::ExportConfig;
use codebook_common::io::{read_json, sibling_with_suffix, write_json_pretty};
use codebook_common::labels::{atomize, parse_labels_file};
use codebook_common::{AnalyzedVariable, Variable};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::info;

pub const COMBINED_GUIDE_FILE: &str = "ALL_WAVES_reversal_guide.csv";
pub const RECODE_SCRIPT_FILE: &str = "reverse_scales.R";
pub const PHRASES_FILE: &str = "validation_phrases.json";

/// `W5_labels.txt` → `W5_atomic.json`
pub fn default_atomic_path(labels: &Path) -> PathBuf {
    let stem = labels
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let base = stem.strip_suffix("_labels").unwrap_or(&stem);
    labels.with_file_name(format!("{}_atomic.json", base))
}

/// Output file placed next to the first wave input
fn beside_first_wave(waves: &[WaveInput], file_name: &str) -> PathBuf {
    waves
        .first()
        .map(|w| w.path.with_file_name(file_name))
        .unwrap_or_else(|| PathBuf::from(file_name))
}

/// Labels file → atomic variables JSON
pub fn run_parse(input: &Path, output: Option<PathBuf>, expand_stems: bool) -> Result<PathBuf> {
    let variables = parse_labels_file(input)
        .with_context(|| format!("Failed to parse labels file {}", input.display()))?;

    let variables = if expand_stems {
        atomize(variables)
    } else {
        variables
    };

    let output = output.unwrap_or_else(|| default_atomic_path(input));
    write_json_pretty(&output, &variables)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    info!("Saved {} variables to {}", variables.len(), output.display());
    Ok(output)
}

/// Variables JSON → variables with `scale_analysis` attached
pub fn run_analyze(
    classifier: &ScaleClassifier,
    input: &Path,
    output: Option<PathBuf>,
) -> Result<(PathBuf, AnalyzedQuestionnaire)> {
    let variables: Vec<Variable> =
        read_json(input).with_context(|| format!("Failed to read {}", input.display()))?;
    info!("Analyzing {} variables from {}", variables.len(), input.display());

    let result = analyze_questionnaire(classifier, variables);

    let output = output.unwrap_or_else(|| sibling_with_suffix(input, "analyzed"));
    write_json_pretty(&output, &result.variables)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    info!("Saved analysis to {}", output.display());
    Ok((output, result))
}

/// Human-readable distribution and samples for the analyze stage
pub fn format_summary(result: &AnalyzedQuestionnaire) -> String {
    let stats = &result.statistics;
    let mut out = String::new();
    let _ = writeln!(out, "Scale Type Distribution:");
    for row in stats.distribution() {
        let _ = writeln!(
            out,
            "  {:<15} {:>4} ({:>5.1}%)",
            row.scale_type.as_str(),
            row.count,
            row.percent
        );
    }
    let _ = writeln!(
        out,
        "Variables needing reversal: {} of {}",
        stats.needs_reversal, stats.total
    );

    for sample in result.samples() {
        let sa = &sample.scale_analysis;
        let _ = writeln!(
            out,
            "  {} [{}] {}",
            sample.variable.variable_id, sa.scale_type, sa.reasoning
        );
    }
    out
}

fn load_wave(wave: &WaveInput) -> Result<Vec<AnalyzedVariable>> {
    read_json(&wave.path)
        .with_context(|| format!("Failed to read analyzed wave {} ({})", wave.name, wave.path.display()))
}

/// Per-wave reversal guides plus a combined guide over all waves
///
/// The combined file is written when more than one wave is given or an
/// explicit output path is requested.
pub fn run_guide(
    waves: &[WaveInput],
    combined_output: Option<PathBuf>,
    config: &ExportConfig,
) -> Result<Vec<GuideRow>> {
    let mut all_rows = Vec::new();
    for wave in waves {
        let variables = load_wave(wave)?;
        let rows = build_guide_rows(&wave.name, &variables, config);
        let path = wave.guide_path();
        write_guide_file(&path, &rows)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!("{}: {} variables exported to {}", wave.name, rows.len(), path.display());
        all_rows.extend(rows);
    }

    if waves.len() > 1 || combined_output.is_some() {
        let path = combined_output.unwrap_or_else(|| beside_first_wave(waves, COMBINED_GUIDE_FILE));
        write_guide_file(&path, &all_rows)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!("Combined guide: {} ({} total variables)", path.display(), all_rows.len());
    }

    Ok(all_rows)
}

/// Reverse-coding R script over all waves
pub fn run_recode(
    generator: &RecodeGenerator,
    waves: &[WaveInput],
    output: Option<PathBuf>,
) -> Result<PathBuf> {
    let mut loaded = Vec::with_capacity(waves.len());
    for wave in waves {
        info!("Processing {}...", wave.name);
        loaded.push((wave.name.clone(), load_wave(wave)?));
    }

    let script = generator.master_script(&loaded);
    let output = output.unwrap_or_else(|| beside_first_wave(waves, RECODE_SCRIPT_FILE));
    std::fs::write(&output, script)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    info!("R script saved to {}", output.display());
    Ok(output)
}

/// Validation phrases and adjacency check for every wave
pub fn run_phrases(waves: &[WaveInput], output: Option<PathBuf>) -> Result<Vec<WavePhraseReport>> {
    let mut reports = Vec::with_capacity(waves.len());
    for wave in waves {
        let variables: Vec<Variable> = read_json(&wave.path)
            .with_context(|| format!("Failed to read {} ({})", wave.name, wave.path.display()))?;
        let report = WavePhraseReport::analyze(&wave.name, &variables);
        info!(
            "{}: {} questions, {} acceptable ({:.1}%), {} adjacent issues",
            report.wave,
            report.total_questions,
            report.acceptable_phrases,
            report.coverage(),
            report.adjacent_issues.len()
        );
        reports.push(report);
    }

    let output = output.unwrap_or_else(|| beside_first_wave(waves, PHRASES_FILE));
    write_json_pretty(&output, &reports)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    info!("Phrase report exported to {}", output.display());
    Ok(reports)
}

/// Annotated variables JSON → basic and detailed concept CSVs
pub fn run_concepts(input: &Path, basic: &Path, detailed: &Path) -> Result<usize> {
    let variables: Vec<Variable> =
        read_json(input).with_context(|| format!("Failed to read {}", input.display()))?;
    info!("Converting {} variables to CSV", variables.len());
    write_concept_files(&variables, basic, detailed).context("Failed to write concept CSVs")?;
    Ok(variables.len())
}
