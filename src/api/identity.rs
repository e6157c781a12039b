//! # Caller Identity
//!
//! `UserId` and `SessionId` cookies, passed to procedures as parameters of
//! the same names unless the body already supplied them.

use uuid::Uuid;

use crate::binder::{contains_parameter, ParameterBinding, Scalar};

use super::request::BridgeRequest;

pub const USER_ID_PARAMETER: &str = "UserId";
pub const SESSION_ID_PARAMETER: &str = "SessionId";

/// Identity values the caller presented. Unparseable values are ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallerIdentity {
    pub user_id: Option<i32>,
    pub session_id: Option<Uuid>,
}

impl CallerIdentity {
    pub fn from_request(request: &BridgeRequest) -> Self {
        Self {
            user_id: request
                .cookie(USER_ID_PARAMETER)
                .and_then(|v| v.parse().ok()),
            session_id: request
                .cookie(SESSION_ID_PARAMETER)
                .and_then(|v| Uuid::parse_str(v).ok()),
        }
    }

    /// Append identity parameters that are present and not already bound
    pub fn inject(&self, bindings: &mut Vec<ParameterBinding>) {
        if let Some(user_id) = self.user_id {
            if !contains_parameter(bindings, USER_ID_PARAMETER) {
                bindings.push(ParameterBinding::scalar(
                    USER_ID_PARAMETER,
                    Scalar::Integer(i64::from(user_id)),
                ));
            }
        }
        if let Some(session_id) = self.session_id {
            if !contains_parameter(bindings, SESSION_ID_PARAMETER) {
                bindings.push(ParameterBinding::scalar(
                    SESSION_ID_PARAMETER,
                    Scalar::Guid(session_id),
                ));
            }
        }
    }
}
