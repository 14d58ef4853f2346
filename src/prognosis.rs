use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::types::round3;

/// Tercile label, hardest first. Problems are sorted ascending by predicted
/// success, so the first third is the hardest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrognosisBand {
    Hard,
    Medium,
    Easy,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TercileSummary {
    pub band: PrognosisBand,
    /// Arithmetic mean of the group's predicted success, 3 decimals.
    pub predicted_success_rate: f64,
    pub problem_count: usize,
}

/// Per-tercile prognosis for one concept's problem pool.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrognosisReport {
    pub concept_id: String,
    /// Always three summaries, ordered hard, medium, easy.
    pub terciles: Vec<TercileSummary>,
    /// Problems that could not be scored and were left out of the split.
    pub skipped: usize,
}

/// Split scored problems into difficulty terciles.
///
/// Groups are contiguous runs of `floor(n/3)` over the ascending sort, with
/// the remainder absorbed into the last (easiest) group. Below 3 scoreable
/// problems a tercile split is undefined and the call fails.
pub(crate) fn split_terciles(
    concept_id: &str,
    mut scored: Vec<(String, f64)>,
    skipped: usize,
    min_problems: usize,
) -> Result<PrognosisReport, EngineError> {
    if scored.len() < min_problems {
        return Err(EngineError::InsufficientData {
            needed: min_problems,
            got: scored.len(),
        });
    }

    scored.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

    let third = scored.len() / 3;
    let groups = [
        (PrognosisBand::Hard, &scored[..third]),
        (PrognosisBand::Medium, &scored[third..2 * third]),
        (PrognosisBand::Easy, &scored[2 * third..]),
    ];

    let terciles = groups
        .into_iter()
        .map(|(band, group)| {
            let mean = group.iter().map(|(_, p)| p).sum::<f64>() / group.len() as f64;
            TercileSummary {
                band,
                predicted_success_rate: round3(mean),
                problem_count: group.len(),
            }
        })
        .collect();

    Ok(PrognosisReport {
        concept_id: concept_id.to_string(),
        terciles,
        skipped,
    })
}
