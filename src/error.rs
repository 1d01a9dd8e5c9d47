//! Error types for the prediction service
//!
//! Startup errors (`Config`, `ModelLoad`) are fatal: the process must not
//! begin serving without a usable model handle. Request errors
//! (`Validation`, `Inference`) are isolated to the request that produced
//! them and surfaced as 4xx/5xx responses.

use thiserror::Error;

/// Error type for all service operations
#[derive(Debug, Error)]
pub enum PredecirError {
    /// Missing or malformed configuration key. Fatal at startup.
    #[error("Configuration error: {reason}")]
    Config {
        /// What was missing or malformed
        reason: String,
    },

    /// Registry unreachable, version unknown, or malformed artifact.
    /// Fatal at startup; the first failure aborts, no retry.
    #[error("Model load failed: {reason}")]
    ModelLoad {
        /// Why the model could not be materialized
        reason: String,
    },

    /// A request field failed type coercion or a range constraint.
    /// Surfaced as a 400 response naming the field.
    #[error("Invalid field '{field}': {reason}")]
    Validation {
        /// Name of the offending field
        field: String,
        /// What went wrong with it
        reason: String,
    },

    /// Model invocation failed or no handle is bound.
    /// Surfaced as a 5xx response; never escalated to a process crash.
    #[error("Inference failed: {reason}")]
    Inference {
        /// Why the prediction could not be produced
        reason: String,
    },
}

impl PredecirError {
    /// Shorthand constructor for configuration errors
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }

    /// Shorthand constructor for model load errors
    pub fn model_load(reason: impl Into<String>) -> Self {
        Self::ModelLoad {
            reason: reason.into(),
        }
    }

    /// Shorthand constructor for validation errors
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand constructor for inference errors
    pub fn inference(reason: impl Into<String>) -> Self {
        Self::Inference {
            reason: reason.into(),
        }
    }
}

/// Result type alias used throughout the crate
pub type Result<T> = std::result::Result<T, PredecirError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = PredecirError::config("missing key 'model_name'");
        assert_eq!(
            err.to_string(),
            "Configuration error: missing key 'model_name'"
        );
    }

    #[test]
    fn test_model_load_error_display() {
        let err = PredecirError::model_load("registry unreachable");
        assert!(err.to_string().contains("registry unreachable"));
    }

    #[test]
    fn test_validation_error_names_field() {
        let err = PredecirError::validation("LIMIT_BAL", "must be non-negative");
        let msg = err.to_string();
        assert!(msg.contains("LIMIT_BAL"));
        assert!(msg.contains("non-negative"));
    }

    #[test]
    fn test_inference_error_display() {
        let err = PredecirError::inference("no model handle bound");
        assert!(err.to_string().starts_with("Inference failed"));
    }
}
