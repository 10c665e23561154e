//! Error types for the MPS classifier

use thiserror::Error;

/// Result type for MPS classifier operations
pub type Result<T> = std::result::Result<T, ClassifierError>;

/// Errors that can occur when building or evaluating the classifier
#[derive(Error, Debug)]
pub enum ClassifierError {
    /// Invalid model configuration, detected at construction
    #[error("Invalid configuration: {parameter} = {value} ({message})")]
    ConfigError {
        /// Name of the offending parameter
        parameter: &'static str,
        /// The rejected value
        value: usize,
        /// Why the value is rejected
        message: &'static str,
    },

    /// Tensor shape inconsistent with the declared dimensions
    #[error("Shape mismatch for {what}: expected {expected}, got {got}")]
    ShapeMismatch {
        /// Which tensor or argument is inconsistent
        what: &'static str,
        /// The expected shape
        expected: String,
        /// The shape actually provided
        got: String,
    },

    /// Chain reduction called on an empty sequence
    #[error("Cannot reduce an empty matrix chain")]
    EmptyChain,
}
