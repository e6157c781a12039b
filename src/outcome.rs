//! # Call Outcomes
//!
//! The two user-facing results of the bridge: a completed procedure call, or a
//! request rejected with a classified error. Both become HTTP responses 1:1.

use serde_json::{json, Value};

/// Status and body returned through the procedure's output parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcedureCallResult {
    pub status_code: i32,
    pub json_body: Option<String>,
}

impl ProcedureCallResult {
    pub fn new(status_code: i32, json_body: Option<String>) -> Self {
        Self {
            status_code,
            json_body,
        }
    }
}

/// A request rejected before or during the call, with a JSON body of the
/// form `{"Error": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedError {
    pub status: u16,
    pub body: String,
}

impl ClassifiedError {
    pub fn new(status: u16, message: impl AsRef<str>) -> Self {
        Self {
            status,
            body: json!({ "Error": message.as_ref() }).to_string(),
        }
    }

    /// 400
    pub fn bad_request(message: impl AsRef<str>) -> Self {
        Self::new(400, message)
    }

    /// 415
    pub fn unsupported_media_type(message: impl AsRef<str>) -> Self {
        Self::new(415, message)
    }

    /// The `Error` message carried in the body
    pub fn message(&self) -> Option<String> {
        serde_json::from_str::<Value>(&self.body)
            .ok()
            .and_then(|v| v.get("Error").and_then(Value::as_str).map(str::to_string))
    }
}
