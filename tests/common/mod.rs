#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use edutrace::{
    EncodedSequence, EngineConfig, IdentifierMap, ModelDims, Predictor, PredictorError, TraceEngine,
};

/// Deterministic fake predictor: resolves the probability for the problem
/// index at the last valid step from a fixed table.
pub struct TablePredictor {
    by_problem_idx: HashMap<i64, f64>,
    default: f64,
    calls: AtomicUsize,
}

impl TablePredictor {
    pub fn new(by_problem_idx: HashMap<i64, f64>, default: f64) -> Self {
        Self {
            by_problem_idx,
            default,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Predictor for TablePredictor {
    fn predict(&self, seq: &EncodedSequence) -> Result<Vec<f64>, PredictorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let position = seq.last_valid_position();
        let probability = self
            .by_problem_idx
            .get(&seq.pid[position])
            .copied()
            .unwrap_or(self.default);
        let mut out = vec![0.0; seq.window_len()];
        out[position] = probability;
        Ok(out)
    }
}

/// Always errors, as if the model backend never loaded.
pub struct FailingPredictor;

impl Predictor for FailingPredictor {
    fn predict(&self, _seq: &EncodedSequence) -> Result<Vec<f64>, PredictorError> {
        Err(PredictorError::NotLoaded("model backend offline".into()))
    }
}

/// Fails only for specific problem indices, succeeding with a fixed
/// probability otherwise.
pub struct FlakyPredictor {
    fail_problem_idx: Vec<i64>,
    probability: f64,
}

impl FlakyPredictor {
    pub fn new(fail_problem_idx: Vec<i64>, probability: f64) -> Self {
        Self {
            fail_problem_idx,
            probability,
        }
    }
}

impl Predictor for FlakyPredictor {
    fn predict(&self, seq: &EncodedSequence) -> Result<Vec<f64>, PredictorError> {
        let position = seq.last_valid_position();
        if self.fail_problem_idx.contains(&seq.pid[position]) {
            return Err(PredictorError::Inference("inference backend timeout".into()));
        }
        Ok(vec![self.probability; seq.window_len()])
    }
}

/// Concepts algebra/geometry/fractions, problems p1..p6.
pub fn sample_map() -> IdentifierMap {
    let concepts = HashMap::from([
        ("algebra".to_string(), 1),
        ("geometry".to_string(), 2),
        ("fractions".to_string(), 3),
    ]);
    let problems = (1..=6)
        .map(|i| (format!("p{i}"), i))
        .collect::<HashMap<String, usize>>();
    IdentifierMap::from_tables(concepts, problems).unwrap()
}

pub fn sample_dims() -> ModelDims {
    ModelDims::new(10, 10, 20).unwrap()
}

pub fn engine_with(predictor: impl Predictor + 'static) -> TraceEngine {
    TraceEngine::new(
        sample_dims(),
        EngineConfig::default(),
        Arc::new(sample_map()),
        Arc::new(predictor),
    )
    .unwrap()
}
