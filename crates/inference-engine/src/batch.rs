//! Sample Batch Construction

use tract_core::prelude::*;

use crate::InferenceError;

/// Row-major input batch of shape `(samples, features)`
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBatch {
    values: Vec<f32>,
    samples: usize,
    features: usize,
}

impl SampleBatch {
    /// Reshape a flat list into `(N, 1)`: every value becomes its own
    /// one-feature sample, in input order.
    ///
    /// Values are narrowed to `f32`; anything that does not survive the
    /// narrowing as a finite number is rejected.
    pub fn single_feature(values: &[f64]) -> Result<Self, InferenceError> {
        if values.is_empty() {
            return Err(InferenceError::InvalidInputShape {
                expected: "(N >= 1, 1)".to_string(),
                actual: "(0, 1)".to_string(),
            });
        }

        let values = values
            .iter()
            .enumerate()
            .map(|(index, &value)| {
                let narrowed = value as f32;
                if narrowed.is_finite() {
                    Ok(narrowed)
                } else {
                    Err(InferenceError::NonFiniteInput { index })
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            samples: values.len(),
            features: 1,
            values,
        })
    }

    /// Number of sample rows
    pub fn samples(&self) -> usize {
        self.samples
    }

    /// Number of features per sample
    pub fn features(&self) -> usize {
        self.features
    }

    /// Tensor shape as `[samples, features]`
    pub fn shape(&self) -> [usize; 2] {
        [self.samples, self.features]
    }

    /// Iterate over sample rows
    pub fn rows(&self) -> impl Iterator<Item = &[f32]> {
        self.values.chunks(self.features)
    }

    /// Build the `f32` input tensor
    pub fn to_tensor(&self) -> Result<Tensor, InferenceError> {
        Tensor::from_shape(&self.shape(), self.values.as_slice()).map_err(|e| InferenceError::InvalidInputShape {
            expected: format!("{:?}", self.shape()),
            actual: format!("{} values ({e})", self.values.len()),
        })
    }
}
