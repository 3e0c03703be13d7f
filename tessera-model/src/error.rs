//! Error types for model marshaling.

use thiserror::Error;

/// Result type for marshaling operations.
pub type MarshalResult<T> = Result<T, MarshalError>;

/// Errors that can occur while marshaling a model.
///
/// Unknown property names are never errors; they are skipped on input and
/// absent on output.
#[derive(Debug, Error)]
pub enum MarshalError {
    /// The model lacks a structural requirement of the operation.
    #[error("unsupported model {model}: {reason}")]
    UnsupportedModel { model: String, reason: String },

    /// A value could not be converted to the property's declared type.
    #[error("cannot coerce {model}.{property} to {expected}: {value}")]
    Coercion {
        model: String,
        property: String,
        expected: String,
        value: String,
    },

    /// A JSON value that must be an object was something else.
    #[error("expected a JSON object for {model}, found {found}")]
    NotAnObject { model: String, found: String },

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
