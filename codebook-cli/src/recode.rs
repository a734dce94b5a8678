//! R script generator for reverse-coding
//!
//! Variables needing reversal are grouped by scale shape. Each range gets a
//! `safe_reverse_<points>pt` helper built on `dplyr::case_when`, suffixed
//! `_max<max>` when the top code differs from the point count (forced-choice
//! scales that skip the midpoint). Each variable gets a `mutate` step that
//! only applies the reversal when the question text still contains its
//! distinctive keyword.

use crate::guide::truncate_chars;
use crate::keywords::{WordFrequency, DEFAULT_MIN_LEN};
use codebook_classify::LabelMatcher;
use codebook_common::{AnalyzedVariable, ScaleType};
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Question preview length in generated comments
const COMMENT_PREVIEW_CHARS: usize = 60;

const RULE: &str = "# ============================================================";

type ScaleKey = (ScaleType, usize, i64);

/// Builds reverse-coding scripts
#[derive(Debug, Clone, Default)]
pub struct RecodeGenerator {
    matcher: LabelMatcher,
}

impl RecodeGenerator {
    pub fn new(matcher: LabelMatcher) -> Self {
        Self { matcher }
    }

    /// Codes of `variable` to map to `NA`: negative codes, codes from the
    /// first missing code up, and codes with a missing-style label; never 0
    pub fn missing_codes(&self, variable: &AnalyzedVariable) -> Vec<i64> {
        let first_na = variable.scale_analysis.first_na_value;
        variable
            .variable
            .value_labels
            .iter()
            .filter(|vl| {
                vl.value < 0
                    || first_na.is_some_and(|na| vl.value >= na)
                    || self.matcher.is_na_label(&vl.label)
            })
            .map(|vl| vl.value)
            .filter(|v| *v != 0)
            .collect::<BTreeSet<i64>>()
            .into_iter()
            .collect()
    }

    /// R helper reversing a `1..=max_value` scale
    pub fn reversal_function(scale_points: usize, max_value: i64, missing_codes: &[i64]) -> String {
        let missing = missing_codes
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "\n{name} <- function(x, missing_codes = c({missing})) {{\n  dplyr::case_when(\n    x %in% 1:{max_value} ~ {reversed} - x,\n    x %in% missing_codes ~ NA_real_,\n    TRUE ~ NA_real_  # Outliers\n  )\n}}",
            name = function_name(scale_points, max_value),
            reversed = max_value.saturating_add(1),
        )
    }

    /// Script section for one wave
    pub fn wave_script(&self, wave: &str, variables: &[AnalyzedVariable]) -> String {
        let mut groups: BTreeMap<ScaleKey, Vec<&AnalyzedVariable>> = BTreeMap::new();
        for var in variables.iter().filter(|v| v.scale_analysis.needs_reversal) {
            let sa = &var.scale_analysis;
            groups
                .entry((sa.scale_type, sa.scale_points, sa.max_substantive_value))
                .or_default()
                .push(var);
        }

        if groups.is_empty() {
            return format!("# {}: No variables need reversal\n", wave);
        }

        let freq = WordFrequency::build(
            variables.iter().map(|v| v.variable.question_text.as_str()),
            DEFAULT_MIN_LEN,
        );

        let mut lines = vec![
            RULE.to_string(),
            format!("# {} Reversal Functions with Keyword Validation", wave),
            "# Generated automatically from scale analysis".to_string(),
            format!("{}\n", RULE),
            "library(dplyr)\n".to_string(),
        ];

        // One helper per (points, max) range; the first group of that range
        // sets the default missing codes
        let mut generated: HashSet<(usize, i64)> = HashSet::new();
        for ((_, points, max_value), members) in &groups {
            if !generated.insert((*points, *max_value)) {
                continue;
            }
            let missing = members
                .first()
                .map(|sample| self.missing_codes(sample))
                .unwrap_or_default();
            lines.push(Self::reversal_function(*points, *max_value, &missing));
        }

        lines.push(format!("\n{}", RULE));
        lines.push(format!("# {} Variable Recodings with Validation", wave));
        lines.push(format!("{}\n", RULE));

        let data = wave.to_lowercase();
        lines.push(format!("{data} <- {data} %>%"));

        let mut steps: Vec<Vec<String>> = Vec::new();
        for ((_, points, max_value), members) in &groups {
            for var in members {
                let id = &var.variable.variable_id;
                let question = &var.variable.question_text;
                let keyword = freq.distinctive_keyword(question);
                steps.push(vec![
                    format!("  # {}: {}", id, truncate_chars(question, COMMENT_PREVIEW_CHARS)),
                    format!("  # Keyword validation: '{}'", keyword),
                    format!("  mutate({}_reversed = if_else(", id),
                    format!(
                        "    grepl(\"{}\", question_text[\"{}\"], ignore.case = TRUE),",
                        r_escape(&keyword),
                        id
                    ),
                    format!("    {}({}),", function_name(*points, *max_value), id),
                    "    NA_real_  # Validation failed!".to_string(),
                    "  )) %>%".to_string(),
                ]);
            }
        }

        let total = steps.len();
        if let Some(last) = steps.last_mut().and_then(|step| step.last_mut()) {
            *last = "  ))".to_string();
        }
        for (i, step) in steps.into_iter().enumerate() {
            lines.extend(step);
            if i + 1 < total {
                lines.push(String::new());
            }
        }

        lines.push(format!("\n{}", RULE));
        lines.push(format!("# {} Summary", wave));
        lines.push(format!("# Variables needing reversal: {}", total));
        lines.push(RULE.to_string());

        lines.join("\n")
    }

    /// Script covering several waves under one header
    pub fn master_script(&self, waves: &[(String, Vec<AnalyzedVariable>)]) -> String {
        let mut parts: Vec<String> = [
            RULE,
            "# Multi-Wave Reversal Script",
            "# Auto-generated with keyword validation",
            RULE,
            "",
            "# This script reverses scales where higher values indicate",
            "# LESS of the attribute (e.g., 1=Satisfied, 4=Dissatisfied)",
            "#",
            "# Each recoding includes:",
            "# 1. Scale-specific reversal function (4pt, 5pt, 6pt, etc.)",
            "# 2. Keyword validation to ensure correct question",
            "# 3. Missing value handling",
            "# 4. Outlier detection",
            RULE,
            "",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        for (wave, variables) in waves {
            parts.push(self.wave_script(wave, variables));
            parts.push("\n".to_string());
        }

        parts.join("\n")
    }
}

fn function_name(scale_points: usize, max_value: i64) -> String {
    if i64::try_from(scale_points).is_ok_and(|points| points == max_value) {
        format!("safe_reverse_{}pt", scale_points)
    } else {
        format!("safe_reverse_{}pt_max{}", scale_points, max_value)
    }
}

/// Escape for a double-quoted R string literal
fn r_escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}
