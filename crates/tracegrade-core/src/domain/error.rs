//! Domain-level error taxonomy for Tracegrade.
//!
//! Scoring and aggregation are total functions and never produce these; only
//! the file-bearing edges (item loading, rubric overlays, report persistence)
//! do.

/// Tracegrade domain errors.
#[derive(Debug, thiserror::Error)]
pub enum TracegradeError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid rubric for category {category}: {reason}")]
    InvalidRubric { category: String, reason: String },

    #[error("digest mismatch: expected {expected}, got {actual}")]
    DigestMismatch { expected: String, actual: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for Tracegrade domain operations.
pub type Result<T> = std::result::Result<T, TracegradeError>;
