use crate::mapping::IdKind;

/// Failures raised while invoking the external predictor.
///
/// Loading problems are distinct from inference problems so callers can
/// tell a service that never came up apart from one that broke mid-request.
#[derive(Debug, thiserror::Error)]
pub enum PredictorError {
    #[error("predictor not loaded: {0}")]
    NotLoaded(String),
    #[error("inference failed: {0}")]
    Inference(String),
    #[error("predictor returned {got} probabilities, expected {expected}")]
    OutputLength { expected: usize, got: usize },
}

/// Failures while building the identifier map.
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("failed to read mapping table: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed mapping table: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("mapping table has no {0} entries")]
    Empty(IdKind),
    #[error("reserved padding index 0 assigned to {kind} id {id:?}")]
    ReservedIndex { kind: IdKind, id: String },
    #[error("duplicate index {index} for {kind} ids {first:?} and {second:?}")]
    DuplicateIndex {
        kind: IdKind,
        index: usize,
        first: String,
        second: String,
    },
}

/// Configuration and wiring failures, reported at construction time.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("model dimension {name} must be non-zero")]
    ZeroDimension { name: &'static str },
    #[error("{kind} map needs indices up to {bound}, model only supports {model}")]
    MapExceedsModel {
        kind: IdKind,
        bound: usize,
        model: usize,
    },
}

/// Request-level failures surfaced by the engine.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("predictor unavailable: {0}")]
    PredictorUnavailable(#[from] PredictorError),
    #[error("insufficient data: need at least {needed} scoreable problems, got {got}")]
    InsufficientData { needed: usize, got: usize },
    #[error("invalid target band preset: {0:?}")]
    InvalidBand(String),
}
