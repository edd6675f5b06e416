//! Regressor Abstraction

use std::time::Instant;

use tracing::debug;

use crate::batch::SampleBatch;
use crate::InferenceError;

/// One output row per input sample
pub type PredictionRows = Vec<Vec<f32>>;

/// A loaded model that maps an `(N, F)` batch to `(N, K)` predictions.
///
/// Implementations must be safe to call concurrently through a shared
/// reference.
pub trait Regressor: Send + Sync {
    /// Run the model on `batch`
    fn predict(&self, batch: &SampleBatch) -> Result<PredictionRows, InferenceError>;
}

/// Result of an inference call
#[derive(Debug, Clone)]
pub struct InferenceResult {
    /// Output rows, in input order
    pub rows: PredictionRows,
    /// Inference latency in milliseconds
    pub latency_ms: u64,
}

/// Run `regressor` on `batch` and check that it returned one row per sample.
pub fn run_inference<R>(regressor: &R, batch: &SampleBatch) -> Result<InferenceResult, InferenceError>
where
    R: Regressor + ?Sized,
{
    let start = Instant::now();
    let rows = regressor.predict(batch)?;

    if rows.len() != batch.samples() {
        return Err(InferenceError::InvalidOutputShape {
            expected: format!("{} rows", batch.samples()),
            actual: format!("{} rows", rows.len()),
        });
    }

    let latency_ms = start.elapsed().as_millis() as u64;
    debug!("Inference on {} samples completed in {}ms", batch.samples(), latency_ms);

    Ok(InferenceResult { rows, latency_ms })
}
