use std::collections::HashMap;
use std::sync::Arc;

use rayon::prelude::*;

use crate::config::{EngineConfig, ModelDims};
use crate::difficulty::Difficulty;
use crate::encoding::encode;
use crate::error::{ConfigError, EngineError, PredictorError};
use crate::mapping::{IdKind, IdentifierMap};
use crate::mastery::{most_frequent_problem, Confidence, MasteryEstimate};
use crate::predictor::{predict_last, Predictor};
use crate::prognosis::{split_terciles, PrognosisReport};
use crate::recommend::{fitness, RankOutcome, RecommendationCandidate, TargetBand};
use crate::types::{round3, CandidateProblem, ForecastBasis, InteractionRecord, PerformanceForecast};

/// Long-lived engine handle.
///
/// Owns the identifier map and the predictor, both loaded once and shared
/// read-only across concurrent requests. Construct it at startup and inject
/// it into request handlers; there is no global instance.
pub struct TraceEngine {
    dims: ModelDims,
    config: EngineConfig,
    map: Arc<IdentifierMap>,
    predictor: Arc<dyn Predictor>,
}

impl std::fmt::Debug for TraceEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TraceEngine")
            .field("dims", &self.dims)
            .field("config", &self.config)
            .field("map", &self.map)
            .field("predictor", &"<dyn Predictor>")
            .finish()
    }
}

impl TraceEngine {
    pub fn new(
        dims: ModelDims,
        config: EngineConfig,
        map: Arc<IdentifierMap>,
        predictor: Arc<dyn Predictor>,
    ) -> Result<Self, ConfigError> {
        if map.concept_bound() > dims.n_concepts {
            return Err(ConfigError::MapExceedsModel {
                kind: IdKind::Concept,
                bound: map.concept_bound(),
                model: dims.n_concepts,
            });
        }
        if map.problem_bound() > dims.n_problems {
            return Err(ConfigError::MapExceedsModel {
                kind: IdKind::Problem,
                bound: map.problem_bound(),
                model: dims.n_problems,
            });
        }

        tracing::info!(
            n_concepts = dims.n_concepts,
            n_problems = dims.n_problems,
            window_len = dims.window_len,
            "trace engine initialized"
        );

        Ok(Self {
            dims,
            config,
            map,
            predictor,
        })
    }

    pub fn dims(&self) -> ModelDims {
        self.dims
    }

    pub fn map(&self) -> &IdentifierMap {
        &self.map
    }

    /// Probability that the student answers `problem_id` correctly next,
    /// given the full chronological history.
    pub fn predict_success(
        &self,
        history: &[InteractionRecord],
        concept_id: &str,
        problem_id: &str,
    ) -> Result<f64, PredictorError> {
        let outcome = encode(&self.map, &self.dims, history, concept_id, problem_id);
        predict_last(self.predictor.as_ref(), &outcome.seq)
    }

    /// Success forecast with difficulty category. An empty history yields a
    /// neutral forecast without touching the predictor; with history, a
    /// predictor failure propagates as service-unavailable.
    pub fn forecast(
        &self,
        history: &[InteractionRecord],
        concept_id: &str,
        problem_id: &str,
    ) -> Result<PerformanceForecast, EngineError> {
        if history.is_empty() {
            return Ok(PerformanceForecast {
                concept_id: concept_id.to_string(),
                problem_id: problem_id.to_string(),
                predicted_success: 0.5,
                difficulty: Difficulty::classify(0.5),
                basis: ForecastBasis::NoHistory,
            });
        }

        let probability = self.predict_success(history, concept_id, problem_id)?;
        Ok(PerformanceForecast {
            concept_id: concept_id.to_string(),
            problem_id: problem_id.to_string(),
            predicted_success: round3(probability),
            difficulty: Difficulty::classify(probability),
            basis: ForecastBasis::Model,
        })
    }

    /// Mastery of one concept. Never fails: with enough overall history the
    /// predictor output is blended in, and a predictor failure falls back
    /// to plain historical accuracy.
    pub fn estimate_mastery(
        &self,
        history: &[InteractionRecord],
        concept_id: &str,
    ) -> MasteryEstimate {
        let concept_records: Vec<&InteractionRecord> = history
            .iter()
            .filter(|record| record.concept_id == concept_id)
            .collect();

        if concept_records.is_empty() {
            return MasteryEstimate::neutral(concept_id);
        }

        let attempts = concept_records.len();
        let correct = concept_records.iter().filter(|r| r.correct).count();
        let accuracy = correct as f64 / attempts as f64;
        let confidence = Confidence::from_attempts(attempts);

        if history.len() >= self.config.mastery.min_history_for_blend {
            // Probe the concept through its most practiced problem.
            if let Some(problem_id) = most_frequent_problem(&concept_records) {
                match self.predict_success(history, concept_id, problem_id) {
                    Ok(predicted) => {
                        let params = &self.config.mastery;
                        let score = params.predicted_weight * predicted
                            + params.accuracy_weight * accuracy;
                        return MasteryEstimate {
                            concept_id: concept_id.to_string(),
                            score: round3(score),
                            confidence,
                            attempts,
                            correct,
                            historical_accuracy: Some(round3(accuracy)),
                            predicted_probability: Some(round3(predicted)),
                            predictor_based: true,
                        };
                    }
                    Err(err) => {
                        tracing::warn!(
                            concept = %concept_id,
                            error = %err,
                            "mastery blend unavailable, falling back to accuracy"
                        );
                    }
                }
            }
        }

        MasteryEstimate {
            concept_id: concept_id.to_string(),
            score: round3(accuracy),
            confidence,
            attempts,
            correct,
            historical_accuracy: Some(round3(accuracy)),
            predicted_probability: None,
            predictor_based: false,
        }
    }

    /// Mastery estimates for every concept with at least `min_attempts`
    /// attempts in the history, weakest first. Ties keep first-seen order.
    pub fn mastery_profile(
        &self,
        history: &[InteractionRecord],
        min_attempts: usize,
    ) -> Vec<MasteryEstimate> {
        let mut first_seen: Vec<&str> = Vec::new();
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for record in history {
            let entry = counts.entry(record.concept_id.as_str()).or_insert(0);
            if *entry == 0 {
                first_seen.push(record.concept_id.as_str());
            }
            *entry += 1;
        }

        let mut profile: Vec<MasteryEstimate> = first_seen
            .into_iter()
            .filter(|concept| counts[concept] >= min_attempts)
            .map(|concept| self.estimate_mastery(history, concept))
            .collect();

        profile.sort_by(|a, b| a.score.partial_cmp(&b.score).unwrap_or(std::cmp::Ordering::Equal));
        profile
    }

    /// Rank candidate problems against a target success band.
    ///
    /// Candidates whose prediction fails are excluded and counted in
    /// `skipped`; candidates beyond the configured cap are never scored and
    /// counted in `capped`. An empty pool after filtering is an empty
    /// result, not an error.
    pub fn rank(
        &self,
        history: &[InteractionRecord],
        candidates: &[CandidateProblem],
        band: TargetBand,
        count: usize,
    ) -> RankOutcome {
        let in_cap = &candidates[..candidates.len().min(self.config.max_candidates)];
        let capped = candidates.len() - in_cap.len();
        if capped > 0 {
            tracing::warn!(
                capped,
                cap = self.config.max_candidates,
                "candidate pool exceeds cap, excess not scored"
            );
        }

        let scored: Vec<Option<(f64, RecommendationCandidate)>> = in_cap
            .par_iter()
            .map(|candidate| {
                if self.map.to_index(IdKind::Concept, &candidate.concept_id).is_none()
                    || self.map.to_index(IdKind::Problem, &candidate.problem_id).is_none()
                {
                    tracing::warn!(
                        concept = %candidate.concept_id,
                        problem = %candidate.problem_id,
                        "excluding unmapped candidate from ranking"
                    );
                    return None;
                }
                match self.predict_success(history, &candidate.concept_id, &candidate.problem_id) {
                    Ok(probability) => {
                        let fit = fitness(probability, band);
                        Some((
                            fit,
                            RecommendationCandidate {
                                problem_id: candidate.problem_id.clone(),
                                concept_id: candidate.concept_id.clone(),
                                predicted_success: round3(probability),
                                fitness: round3(fit),
                                difficulty: Difficulty::classify(probability),
                            },
                        ))
                    }
                    Err(err) => {
                        tracing::warn!(
                            problem = %candidate.problem_id,
                            error = %err,
                            "excluding candidate after prediction failure"
                        );
                        None
                    }
                }
            })
            .collect();

        let mut ranked: Vec<(f64, RecommendationCandidate)> =
            scored.into_iter().flatten().collect();
        let skipped = in_cap.len() - ranked.len();

        // Stable sort: equal fitness keeps candidate input order.
        ranked.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        ranked.truncate(count);

        RankOutcome {
            recommendations: ranked.into_iter().map(|(_, candidate)| candidate).collect(),
            skipped,
            capped,
        }
    }

    /// Difficulty-tercile prognosis over one concept's problem pool.
    pub fn prognosis(
        &self,
        history: &[InteractionRecord],
        concept_id: &str,
        problem_ids: &[String],
    ) -> Result<PrognosisReport, EngineError> {
        let in_cap = &problem_ids[..problem_ids.len().min(self.config.max_candidates)];
        if in_cap.len() < problem_ids.len() {
            tracing::warn!(
                total = problem_ids.len(),
                cap = self.config.max_candidates,
                "prognosis pool exceeds cap, excess not scored"
            );
        }

        let concept_known = self.map.to_index(IdKind::Concept, concept_id).is_some();
        let scored: Vec<Option<(String, f64)>> = in_cap
            .par_iter()
            .map(|problem_id| {
                if !concept_known || self.map.to_index(IdKind::Problem, problem_id).is_none() {
                    tracing::warn!(
                        concept = %concept_id,
                        problem = %problem_id,
                        "skipping unmapped problem in prognosis"
                    );
                    return None;
                }
                match self.predict_success(history, concept_id, problem_id) {
                    Ok(probability) => Some((problem_id.clone(), probability)),
                    Err(err) => {
                        tracing::warn!(
                            problem = %problem_id,
                            error = %err,
                            "skipping unscoreable problem in prognosis"
                        );
                        None
                    }
                }
            })
            .collect();

        let scored: Vec<(String, f64)> = scored.into_iter().flatten().collect();
        let skipped = in_cap.len() - scored.len();

        split_terciles(
            concept_id,
            scored,
            skipped,
            self.config.min_prognosis_problems,
        )
    }
}
