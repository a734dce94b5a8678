//! Questionnaire-level analysis: classify every variable of a wave and
//! summarize the scale mix

use crate::classifier::ScaleClassifier;
use codebook_common::{AnalyzedVariable, ScaleType, Variable};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Scale types shown as examples in the analysis summary
const SAMPLE_TYPES: [ScaleType; 4] = [
    ScaleType::Binary,
    ScaleType::Likert5,
    ScaleType::Scale10,
    ScaleType::Categorical,
];

/// Classified variables plus summary counts
#[derive(Debug, Clone)]
pub struct AnalyzedQuestionnaire {
    /// Same order as the input variables
    pub variables: Vec<AnalyzedVariable>,
    pub statistics: ScaleStatistics,
}

/// One row of the scale-type distribution
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionRow {
    pub scale_type: ScaleType,
    pub count: usize,
    pub percent: f64,
}

/// Counts per scale type
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScaleStatistics {
    pub total: usize,
    pub needs_reversal: usize,
    pub by_type: BTreeMap<ScaleType, usize>,
}

impl ScaleStatistics {
    fn record(&mut self, scale_type: ScaleType, needs_reversal: bool) {
        self.total += 1;
        if needs_reversal {
            self.needs_reversal += 1;
        }
        *self.by_type.entry(scale_type).or_insert(0) += 1;
    }

    pub fn count(&self, scale_type: ScaleType) -> usize {
        self.by_type.get(&scale_type).copied().unwrap_or(0)
    }

    /// Non-zero scale types in reporting order
    pub fn distribution(&self) -> Vec<DistributionRow> {
        ScaleType::ALL
            .iter()
            .filter_map(|st| {
                let count = self.count(*st);
                (count > 0).then(|| DistributionRow {
                    scale_type: *st,
                    count,
                    percent: if self.total == 0 {
                        0.0
                    } else {
                        count as f64 * 100.0 / self.total as f64
                    },
                })
            })
            .collect()
    }
}

impl AnalyzedQuestionnaire {
    /// First example of each headline scale type
    pub fn samples(&self) -> Vec<&AnalyzedVariable> {
        SAMPLE_TYPES
            .iter()
            .filter_map(|st| {
                self.variables
                    .iter()
                    .find(|av| av.scale_analysis.scale_type == *st)
            })
            .collect()
    }

    /// Variables that need a reversal transform
    pub fn reversals(&self) -> impl Iterator<Item = &AnalyzedVariable> {
        self.variables
            .iter()
            .filter(|av| av.scale_analysis.needs_reversal)
    }
}

/// Classify every variable, preserving input order
pub fn analyze_questionnaire(
    classifier: &ScaleClassifier,
    variables: Vec<Variable>,
) -> AnalyzedQuestionnaire {
    let mut statistics = ScaleStatistics::default();
    let variables: Vec<AnalyzedVariable> = variables
        .into_iter()
        .map(|variable| {
            let scale_analysis = classifier.classify(&variable.value_labels);
            debug!(
                variable_id = %variable.variable_id,
                scale_type = %scale_analysis.scale_type,
                points = scale_analysis.scale_points,
                needs_reversal = scale_analysis.needs_reversal,
                "Classified variable"
            );
            statistics.record(scale_analysis.scale_type, scale_analysis.needs_reversal);
            AnalyzedVariable {
                variable,
                scale_analysis,
            }
        })
        .collect();

    info!(
        total = statistics.total,
        needs_reversal = statistics.needs_reversal,
        "Questionnaire analyzed"
    );

    AnalyzedQuestionnaire {
        variables,
        statistics,
    }
}
