//! # Bridge Requests
//!
//! The parts of an HTTP request the bridge reads: method, headers, body.

use async_trait::async_trait;
use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use axum::http::{header, HeaderMap, Method};
use futures_util::StreamExt;

use crate::outcome::ClassifiedError;

use super::errors::RequestError;

/// Body size limit used when no [`BodyLimit`] extension is installed
pub const DEFAULT_BODY_LIMIT: usize = 4 * 1024 * 1024;

/// Message of the 415 response
pub const UNSUPPORTED_CONTENT_TYPE: &str =
    "Content-Type must be \"application/json\" or \"application/x-www-form-urlencoded\"";

/// Request extension overriding the body size limit of the extractor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BodyLimit(pub usize);

/// Body encodings the bridge binds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Json,
    Form,
}

impl ContentKind {
    /// Classify a `Content-Type` value; case-insensitive substring match
    pub fn from_content_type(value: &str) -> Option<Self> {
        let value = value.to_ascii_lowercase();
        if value.contains("application/json") {
            Some(ContentKind::Json)
        } else if value.contains("application/x-www-form-urlencoded") {
            Some(ContentKind::Form)
        } else {
            None
        }
    }
}

/// A buffered request
#[derive(Debug, Clone)]
pub struct BridgeRequest {
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl BridgeRequest {
    pub fn new(method: Method, headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        Self {
            method,
            headers,
            body: body.into(),
        }
    }

    /// Only POST and PUT carry parameters in the body
    pub fn has_body(&self) -> bool {
        self.method == Method::POST || self.method == Method::PUT
    }

    /// The body encoding, or the 415 to answer with
    pub fn content_kind(&self) -> Result<ContentKind, ClassifiedError> {
        self.headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(ContentKind::from_content_type)
            .ok_or_else(|| ClassifiedError::unsupported_media_type(UNSUPPORTED_CONTENT_TYPE))
    }

    /// Value of the named cookie, from any `Cookie` header
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.trim())
    }
}

#[async_trait]
impl<S> FromRequest<S> for BridgeRequest
where
    S: Send + Sync,
{
    type Rejection = RequestError;

    async fn from_request(req: Request, _state: &S) -> Result<Self, Self::Rejection> {
        let limit = req
            .extensions()
            .get::<BodyLimit>()
            .map(|l| l.0)
            .unwrap_or(DEFAULT_BODY_LIMIT);

        let declared = req
            .headers()
            .get(header::CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<usize>().ok());
        if declared.is_some_and(|len| len > limit) {
            return Err(RequestError::BodyTooLarge(limit));
        }

        // Chunked bodies carry no length up front; count as frames arrive
        let (parts, body) = req.into_parts();
        let mut frames = body.into_data_stream();
        let mut buffer = Vec::new();
        while let Some(frame) = frames.next().await {
            let frame = frame.map_err(|e| RequestError::BodyRead(e.to_string()))?;
            if buffer.len() + frame.len() > limit {
                return Err(RequestError::BodyTooLarge(limit));
            }
            buffer.extend_from_slice(&frame);
        }

        Ok(Self::new(parts.method, parts.headers, buffer))
    }
}
