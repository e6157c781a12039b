//! # Classifier Errors

use thiserror::Error;

use crate::session::SessionError;

/// Result type for classification
pub type ClassifyResult<T> = Result<T, ClassifyError>;

/// Classification errors. Always faults.
#[derive(Debug, Clone, Error)]
pub enum ClassifyError {
    /// The declared-parameter lookup for a too-many-arguments error failed
    #[error("Parameter lookup failed: {0}")]
    ParameterLookup(#[from] SessionError),
}
