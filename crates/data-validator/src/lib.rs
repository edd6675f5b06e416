//! Request Validation
//!
//! Decodes prediction request bodies into typed feature lists.

mod error;
mod validator;

pub use error::ValidationError;
pub use validator::{FeatureRequest, FEATURES_FIELD};
