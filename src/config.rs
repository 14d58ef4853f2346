use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Dimensions the external predictor was trained with.
///
/// All fields are mandatory and validated at construction; there is no
/// default-filling of missing values at load time. `n_concepts` also feeds
/// the `qa` outcome encoding, so a wrong value here silently corrupts every
/// prediction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelDims {
    /// Number of concept indices the predictor knows, padding included.
    pub n_concepts: usize,
    /// Number of problem indices the predictor knows, padding included.
    pub n_problems: usize,
    /// Fixed sequence length consumed by the predictor.
    pub window_len: usize,
}

impl ModelDims {
    pub fn new(n_concepts: usize, n_problems: usize, window_len: usize) -> Result<Self, ConfigError> {
        if n_concepts == 0 {
            return Err(ConfigError::ZeroDimension { name: "n_concepts" });
        }
        if n_problems == 0 {
            return Err(ConfigError::ZeroDimension { name: "n_problems" });
        }
        if window_len == 0 {
            return Err(ConfigError::ZeroDimension { name: "window_len" });
        }
        Ok(Self {
            n_concepts,
            n_problems,
            window_len,
        })
    }
}

/// Tunables for the mastery estimator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasteryParams {
    /// Weight of the predictor probability in the blended score.
    pub predicted_weight: f64,
    /// Weight of the raw historical accuracy in the blended score.
    pub accuracy_weight: f64,
    /// Minimum interactions across all concepts before the blend kicks in.
    pub min_history_for_blend: usize,
}

impl Default for MasteryParams {
    fn default() -> Self {
        Self {
            predicted_weight: 0.7,
            accuracy_weight: 0.3,
            min_history_for_blend: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    pub mastery: MasteryParams,
    /// Upper bound on candidates scored per ranking or prognosis request.
    pub max_candidates: usize,
    /// Minimum scoreable problems for a tercile prognosis.
    pub min_prognosis_problems: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            mastery: MasteryParams::default(),
            max_candidates: 50,
            min_prognosis_problems: 3,
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("EDUTRACE_MAX_CANDIDATES") {
            config.max_candidates = val.parse().unwrap_or(config.max_candidates);
        }
        if let Ok(val) = std::env::var("EDUTRACE_MIN_HISTORY_FOR_BLEND") {
            config.mastery.min_history_for_blend =
                val.parse().unwrap_or(config.mastery.min_history_for_blend);
        }

        config
    }
}
