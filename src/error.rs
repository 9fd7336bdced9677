//! Error types for dataset generation

use thiserror::Error;

/// Generation failures. Every variant except `Stalled` and the I/O variants
/// is raised before any sampling starts.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GenError {
    #[error("invalid rules for variant {variant}: {message}")]
    InvalidRules { variant: usize, message: String },

    #[error("invalid naming policy: {message}")]
    InvalidNaming { message: String },

    #[error("invalid variant weights: {message}")]
    InvalidWeights { message: String },

    #[error("requested {requested} unique prompts but {scope} admits at most {capacity}")]
    Infeasible {
        requested: u64,
        capacity: u128,
        scope: String,
    },

    #[error("{phase} pool stalled at {collected}/{requested} after {duplicates} consecutive duplicate prompts")]
    Stalled {
        phase: &'static str,
        collected: usize,
        requested: usize,
        duplicates: u64,
    },

    #[error("failed to {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for generation operations.
pub type Result<T> = std::result::Result<T, GenError>;

impl GenError {
    pub(crate) fn io(operation: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            source,
        }
    }
}
