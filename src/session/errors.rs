//! # Session Errors

use thiserror::Error;

/// Result type for session operations
pub type SessionResult<T> = Result<T, SessionError>;

/// An error raised by the database engine while executing a statement.
///
/// `message` is the engine's text, verbatim. `procedure` names the procedure
/// the engine attributed the error to, when it did.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct EngineError {
    pub message: String,
    pub procedure: Option<String>,
}

impl EngineError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            procedure: None,
        }
    }

    pub fn in_procedure(mut self, procedure: impl Into<String>) -> Self {
        self.procedure = Some(procedure.into());
        self
    }
}

/// Session errors
#[derive(Debug, Clone, Error)]
pub enum SessionError {
    /// The engine rejected or failed the statement
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// The session could not be opened or was lost
    #[error("Connection failed: {0}")]
    Connection(String),

    /// The session does not understand an ad-hoc statement
    #[error("Unsupported statement: {0}")]
    UnsupportedStatement(String),
}
