use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::difficulty::Difficulty;

/// One observed attempt at a problem.
///
/// Records are immutable once observed; their order within a history is
/// chronological and significant. The timestamp is carried for callers but
/// never interpreted by the engine, which relies on positional order alone.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionRecord {
    pub concept_id: String,
    pub problem_id: String,
    pub correct: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl InteractionRecord {
    pub fn new(concept_id: impl Into<String>, problem_id: impl Into<String>, correct: bool) -> Self {
        Self {
            concept_id: concept_id.into(),
            problem_id: problem_id.into(),
            correct,
            timestamp: None,
        }
    }
}

/// A problem eligible for scoring, together with the concept it exercises.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateProblem {
    pub concept_id: String,
    pub problem_id: String,
}

impl CandidateProblem {
    pub fn new(concept_id: impl Into<String>, problem_id: impl Into<String>) -> Self {
        Self {
            concept_id: concept_id.into(),
            problem_id: problem_id.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForecastBasis {
    Model,
    NoHistory,
}

/// Success forecast for one (student, problem) pair.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceForecast {
    pub concept_id: String,
    pub problem_id: String,
    pub predicted_success: f64,
    pub difficulty: Difficulty,
    pub basis: ForecastBasis,
}

impl PerformanceForecast {
    /// Short study advice derived from the forecast probability.
    pub fn advice(&self) -> &'static str {
        if self.predicted_success >= 0.8 {
            "Topic is well in hand; ready for harder material."
        } else if self.predicted_success >= 0.6 {
            "Appropriate practice level; continue at this difficulty."
        } else if self.predicted_success >= 0.4 {
            "Challenging problem; additional support may help."
        } else {
            "Likely too hard right now; review the basics first."
        }
    }
}

/// Round to 3 decimals at the reporting boundary.
pub(crate) fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
