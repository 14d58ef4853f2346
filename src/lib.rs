//! Knowledge-tracing engine.
//!
//! Turns a student's chronological right/wrong attempt history into
//! calibrated mastery estimates, per-problem success forecasts, and ranked
//! problem recommendations. The neural sequence predictor is an external
//! collaborator behind the [`Predictor`] trait; this crate owns everything
//! around it: identifier mapping, sequence encoding, probability extraction,
//! mastery blending, difficulty classification, ranking and prognosis.

pub mod config;
pub mod difficulty;
pub mod encoding;
pub mod engine;
pub mod error;
pub mod logging;
pub mod mapping;
pub mod mastery;
pub mod predictor;
pub mod prognosis;
pub mod recommend;
pub mod types;

pub use config::{EngineConfig, MasteryParams, ModelDims};
pub use difficulty::Difficulty;
pub use encoding::{encode, EncodeOutcome, EncodedSequence};
pub use engine::TraceEngine;
pub use error::{ConfigError, EngineError, MapError, PredictorError};
pub use mapping::{IdKind, IdentifierMap, PADDING_INDEX};
pub use mastery::{Confidence, MasteryEstimate};
pub use predictor::{Predictor, SerializedPredictor};
pub use prognosis::{PrognosisBand, PrognosisReport, TercileSummary};
pub use recommend::{RankOutcome, RecommendationCandidate, TargetBand};
pub use types::{CandidateProblem, ForecastBasis, InteractionRecord, PerformanceForecast};
