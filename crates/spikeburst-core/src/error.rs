//! Error types for spike encoding and burst detection

use thiserror::Error;

/// Result type for encoder and detector operations
pub type Result<T> = std::result::Result<T, BurstError>;

/// Errors raised by the encoder, resamplers and burst detectors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BurstError {
    /// Invalid parameter value or malformed input sequence
    #[error("Invalid parameter {parameter}: {value} (expected {constraint})")]
    InvalidParameter {
        /// Parameter name
        parameter: String,
        /// Invalid value
        value: String,
        /// Constraint description
        constraint: String,
    },

    /// Operation needs at least one sample
    #[error("Empty input: {operation} requires at least one sample")]
    EmptyInput {
        /// Operation that received no samples
        operation: String,
    },
}

impl BurstError {
    /// Create an invalid parameter error
    pub fn invalid_parameter(
        parameter: impl Into<String>,
        value: impl Into<String>,
        constraint: impl Into<String>,
    ) -> Self {
        Self::InvalidParameter {
            parameter: parameter.into(),
            value: value.into(),
            constraint: constraint.into(),
        }
    }

    /// Create an empty input error
    pub fn empty_input(operation: impl Into<String>) -> Self {
        Self::EmptyInput {
            operation: operation.into(),
        }
    }
}

/// Check that a scalar is finite and `>= 0`.
pub(crate) fn ensure_non_negative(parameter: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(BurstError::invalid_parameter(
            parameter,
            value.to_string(),
            "finite and >= 0.0",
        ));
    }
    Ok(())
}
