//! Inference Engine Implementation

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use tract_core::internal::DimLike;
use tract_onnx::prelude::*;

use crate::batch::SampleBatch;
use crate::regressor::{PredictionRows, Regressor};
use crate::InferenceError;

type Plan = SimplePlan<TypedFact, Box<dyn TypedOp>, TypedModel>;

/// ONNX regression model, optimized and ready to run
pub struct InferenceEngine {
    /// Model path
    model_path: PathBuf,
    /// Runnable tract plan
    plan: Plan,
    /// Element type of the model's first input
    input_type: DatumType,
    /// Declared input shape, for logs and errors
    input_shape: String,
    /// Reasons the declared input cannot take every `(N, 1)` batch
    shape_warnings: Vec<String>,
}

impl InferenceEngine {
    /// Load and optimize the ONNX model at `path`
    pub fn load(path: impl AsRef<Path>) -> Result<Self, InferenceError> {
        let path = path.as_ref();
        info!(path = %path.display(), "Loading ONNX model");

        let plan = tract_onnx::onnx()
            .model_for_path(path)
            .and_then(|model| model.into_optimized())
            .and_then(|model| model.into_runnable())
            .map_err(|e| InferenceError::ModelLoadError(format!("{}: {e:#}", path.display())))?;

        let input = plan
            .model()
            .input_fact(0)
            .map_err(|e| InferenceError::ModelLoadError(format!("{}: {e:#}", path.display())))?
            .clone();

        let input_shape = format!("{:?}", input.shape);
        let dims: Vec<Option<usize>> = input.shape.iter().map(|dim| dim.to_usize().ok()).collect();

        // Requests are always reshaped to one feature per sample.
        let shape_warnings = input_shape_warnings(&dims);
        for warning in &shape_warnings {
            warn!(
                path = %path.display(),
                input_shape = %input_shape,
                "Model input is not (N, 1): {}",
                warning
            );
        }

        info!(
            path = %path.display(),
            input_shape = %input_shape,
            input_type = ?input.datum_type,
            "Model loaded successfully"
        );

        Ok(Self {
            model_path: path.to_path_buf(),
            plan,
            input_type: input.datum_type,
            input_shape,
            shape_warnings,
        })
    }

    /// Get model path
    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    /// Declared input shape of the model
    pub fn input_shape(&self) -> &str {
        &self.input_shape
    }

    /// Problems found with the declared input shape at load time
    pub fn shape_warnings(&self) -> &[String] {
        &self.shape_warnings
    }
}

impl Regressor for InferenceEngine {
    fn predict(&self, batch: &SampleBatch) -> Result<PredictionRows, InferenceError> {
        let tensor = batch.to_tensor()?;
        let tensor = tensor
            .cast_to_dt(self.input_type)
            .map_err(|e| InferenceError::InferenceFailed(format!("{e:#}")))?
            .into_owned();

        let outputs = self
            .plan
            .run(tvec!(tensor.into()))
            .map_err(|e| InferenceError::InferenceFailed(format!("{e:#}")))?;

        let output = outputs.first().ok_or_else(|| InferenceError::InvalidOutputShape {
            expected: "at least one output".to_string(),
            actual: "none".to_string(),
        })?;

        debug!("Model output shape {:?}", output.shape());
        rows_from_output(output, batch.samples())
    }
}

/// Check a declared input shape against `(N, 1)` batches. `None` marks a
/// symbolic dimension.
fn input_shape_warnings(dims: &[Option<usize>]) -> Vec<String> {
    if dims.len() != 2 {
        return vec![format!("rank is {}, expected 2", dims.len())];
    }

    let mut warnings = Vec::new();
    if let Some(batch) = dims[0] {
        warnings.push(format!(
            "batch dimension is fixed at {batch}; requests with any other number of features will fail"
        ));
    }
    if let Some(width) = dims[1].filter(|&width| width != 1) {
        warnings.push(format!("feature dimension is {width}, expected 1"));
    }
    warnings
}

/// Convert an `(N,)` or `(N, K)` output tensor into rows
fn rows_from_output(output: &Tensor, samples: usize) -> Result<PredictionRows, InferenceError> {
    let output = output
        .cast_to::<f32>()
        .map_err(|e| InferenceError::InferenceFailed(format!("{e:#}")))?;
    let view = output
        .to_array_view::<f32>()
        .map_err(|e| InferenceError::InferenceFailed(format!("{e:#}")))?;

    let rows: PredictionRows = match view.ndim() {
        1 => view.iter().map(|&value| vec![value]).collect(),
        2 => view
            .outer_iter()
            .map(|row| row.iter().copied().collect())
            .collect(),
        _ => {
            return Err(InferenceError::InvalidOutputShape {
                expected: format!("({samples}, K)"),
                actual: format!("{:?}", view.shape()),
            })
        }
    };

    if rows.len() != samples {
        return Err(InferenceError::InvalidOutputShape {
            expected: format!("({samples}, K)"),
            actual: format!("{:?}", view.shape()),
        });
    }

    Ok(rows)
}
