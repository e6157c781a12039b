//! # JSON Envelope
//!
//! Every bridge outcome leaves as a `JsonResult`: the given status, a JSON
//! content type, no-cache headers, and the body verbatim.

use axum::body::Body;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::outcome::{ClassifiedError, ProcedureCallResult};

/// A status and an optional, already-serialized JSON body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonResult {
    pub status: StatusCode,
    pub body: Option<String>,
}

impl JsonResult {
    pub fn new(status: StatusCode, body: Option<String>) -> Self {
        Self { status, body }
    }

    /// Envelope for a completed call; `None` when the procedure's status is
    /// not a valid HTTP status
    pub fn from_call(result: ProcedureCallResult) -> Option<Self> {
        let status = u16::try_from(result.status_code)
            .ok()
            .and_then(|s| StatusCode::from_u16(s).ok())?;
        Some(Self::new(status, result.json_body))
    }
}

impl From<ClassifiedError> for JsonResult {
    fn from(err: ClassifiedError) -> Self {
        let status = StatusCode::from_u16(err.status).unwrap_or(StatusCode::BAD_REQUEST);
        Self::new(status, Some(err.body))
    }
}

impl IntoResponse for JsonResult {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body.unwrap_or_default()));
        *response.status_mut() = self.status;

        let headers = response.headers_mut();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-cache, no-store, must-revalidate"),
        );
        headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
        headers.insert(header::EXPIRES, HeaderValue::from_static("0"));
        response
    }
}
