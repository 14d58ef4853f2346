use parking_lot::Mutex;

use crate::encoding::EncodedSequence;
use crate::error::PredictorError;

/// Contract for the external sequence predictor.
///
/// Implementations take three equal-length integer sequences and return one
/// correctness probability per position, running in inference-only mode
/// (no parameter updates, no shared mutable buffers across calls). A
/// runtime that cannot guarantee reentrancy should be wrapped in
/// [`SerializedPredictor`].
pub trait Predictor: Send + Sync {
    fn predict(&self, seq: &EncodedSequence) -> Result<Vec<f64>, PredictorError>;
}

/// Serializes inference calls for predictor runtimes that are not safely
/// reentrant. Concurrent callers queue on the lock; the predictor never
/// sees overlapping invocations.
pub struct SerializedPredictor<P> {
    inner: P,
    gate: Mutex<()>,
}

impl<P: Predictor> SerializedPredictor<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            gate: Mutex::new(()),
        }
    }
}

impl<P: Predictor> Predictor for SerializedPredictor<P> {
    fn predict(&self, seq: &EncodedSequence) -> Result<Vec<f64>, PredictorError> {
        let _guard = self.gate.lock();
        self.inner.predict(seq)
    }
}

/// Run the predictor and extract the probability at the last valid
/// (non-padding) step, clipped to `[0, 1]` against numerical drift.
pub fn predict_last(
    predictor: &dyn Predictor,
    seq: &EncodedSequence,
) -> Result<f64, PredictorError> {
    let probabilities = predictor.predict(seq)?;
    if probabilities.len() != seq.window_len() {
        return Err(PredictorError::OutputLength {
            expected: seq.window_len(),
            got: probabilities.len(),
        });
    }
    let position = seq.last_valid_position();
    Ok(probabilities[position].clamp(0.0, 1.0))
}
