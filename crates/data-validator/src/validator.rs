//! Feature Request Decoder

use crate::error::ValidationError;
use serde_json::Value;
use tracing::debug;

/// Name of the request field carrying the feature values
pub const FEATURES_FIELD: &str = "features";

/// A validated prediction request
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRequest {
    /// Feature values in request order, never empty
    pub features: Vec<f64>,
}

impl FeatureRequest {
    /// Build a request from already-known values.
    ///
    /// Fails with [`ValidationError::Empty`] when `features` is empty.
    pub fn new(features: Vec<f64>) -> Result<Self, ValidationError> {
        if features.is_empty() {
            return Err(ValidationError::Empty(FEATURES_FIELD));
        }
        Ok(Self { features })
    }

    /// Decode a parsed JSON body.
    ///
    /// Checks, in order: the body is an object, `features` is present, it is
    /// an array, it is non-empty, and every element is a number. Fields other
    /// than `features` are ignored.
    pub fn from_value(body: &Value) -> Result<Self, ValidationError> {
        let object = body.as_object().ok_or(ValidationError::NotAnObject)?;

        let items = match object.get(FEATURES_FIELD) {
            None | Some(Value::Null) => return Err(ValidationError::MissingField(FEATURES_FIELD)),
            Some(Value::Array(items)) => items,
            Some(_) => return Err(ValidationError::NotAList(FEATURES_FIELD)),
        };

        if items.is_empty() {
            return Err(ValidationError::Empty(FEATURES_FIELD));
        }

        let features = items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                item.as_f64().ok_or(ValidationError::NotANumber {
                    field: FEATURES_FIELD,
                    index,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        debug!("Decoded {} feature values", features.len());
        Ok(Self { features })
    }

    /// Number of samples this request produces
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Always false for a validated request
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}
