//! # Bridge Errors
//!
//! Faults that escape the bridge. None of them is translated into a
//! structured JSON error: they are logged and answered with a generic 500.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::binder::BindError;
use crate::classifier::ClassifyError;
use crate::config::ConfigError;
use crate::invoker::InvokeError;
use crate::outcome::ClassifiedError;
use crate::session::{EngineError, SessionError};

use super::response::JsonResult;

/// Result type for bridge calls
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Body of every fault response
pub const FAULT_MESSAGE: &str = "An internal error occurred.";

/// Unrecoverable faults
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// Only catalog faults reach here; shape errors are answered with a 400
    #[error("Binding error: {0}")]
    Bind(#[from] BindError),

    #[error("Invocation error: {0}")]
    Invoke(#[from] InvokeError),

    #[error("Classification error: {0}")]
    Classify(#[from] ClassifyError),

    /// An engine error no known pattern explains
    #[error("Unrecognized engine error: {0}")]
    UnrecognizedEngineError(EngineError),

    /// The procedure returned a status that is not a valid HTTP status
    #[error("Procedure returned invalid HTTP status {0}")]
    InvalidStatus(i32),
}

impl BridgeError {
    pub fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

impl IntoResponse for BridgeError {
    fn into_response(self) -> Response {
        JsonResult::from(ClassifiedError::new(
            self.status_code().as_u16(),
            FAULT_MESSAGE,
        ))
        .into_response()
    }
}

/// Rejections raised while extracting a [`BridgeRequest`](super::BridgeRequest)
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("Request body exceeds {0} bytes")]
    BodyTooLarge(usize),

    #[error("Failed to read request body: {0}")]
    BodyRead(String),
}

impl RequestError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RequestError::BodyTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            RequestError::BodyRead(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for RequestError {
    fn into_response(self) -> Response {
        JsonResult::from(ClassifiedError::new(
            self.status_code().as_u16(),
            self.to_string(),
        ))
        .into_response()
    }
}
