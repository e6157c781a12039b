//! # Invoker Errors

use std::time::Duration;

use thiserror::Error;

use crate::session::{EngineError, SessionError};

/// Result type for invocation
pub type InvokeResult<T> = Result<T, InvokeError>;

/// Invocation errors
#[derive(Debug, Clone, Error)]
pub enum InvokeError {
    /// The engine rejected the call. `sent_names` lists every parameter
    /// name sent with it, for the error classifier.
    #[error("{error}")]
    Engine {
        error: EngineError,
        sent_names: Vec<String>,
    },

    #[error(transparent)]
    Session(SessionError),

    /// The procedure itself reported a 500
    #[error("Procedure reported a server error: {}", .0.as_deref().unwrap_or("(no body)"))]
    ReportedServerError(Option<String>),

    #[error("Procedure did not set a status code")]
    MissingStatus,

    #[error("Procedure returned an out-of-range status code: {0}")]
    InvalidStatus(i64),

    #[error("Procedure call timed out after {0:?}")]
    Timeout(Duration),
}

impl InvokeError {
    /// The engine error and sent parameter names, when the engine rejected the call
    pub fn engine(&self) -> Option<(&EngineError, &[String])> {
        match self {
            InvokeError::Engine { error, sent_names } => Some((error, sent_names)),
            _ => None,
        }
    }
}
