//! Validation Error Types

use thiserror::Error;

/// Errors while decoding a prediction request
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Body parsed as JSON but is not an object
    #[error("Request body must be a JSON object")]
    NotAnObject,

    /// Missing required field
    #[error("The \"{0}\" key must be a non-empty list.")]
    MissingField(&'static str),

    /// Field present but not an array
    #[error("The \"{0}\" key must be a non-empty list.")]
    NotAList(&'static str),

    /// Field is an empty array
    #[error("The \"{0}\" key must be a non-empty list.")]
    Empty(&'static str),

    /// Array element is not a JSON number
    #[error("{field}[{index}] is not a number")]
    NotANumber { field: &'static str, index: usize },
}
