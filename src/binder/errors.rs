//! # Binder Errors

use thiserror::Error;

use crate::outcome::ClassifiedError;
use crate::schema::SchemaError;
use crate::token::{TokenError, TokenKind};

/// Result type for binding
pub type BindResult<T> = Result<T, BindError>;

/// Message for tokenizer failures
pub const UNPARSEABLE_JSON: &str = "Could not parse the JSON.";

/// Message for undecodable form bodies
pub const UNPARSEABLE_FORM: &str = "Could not parse the form data.";

/// Errors raised while binding a request body.
///
/// Everything except `Schema` is a shape error answered with a 400.
#[derive(Debug, Error)]
pub enum BindError {
    /// Not a single flat JSON object
    #[error("Could not parse a simple JSON object")]
    InvalidObject,

    #[error("If you pass an array of scalars, they must all be of the same type.")]
    MixedArray,

    #[error("\"{column}\" is not a valid property of \"{parameter}\".")]
    UnknownColumn { column: String, parameter: String },

    #[error("You specified multiple values for \"{column}\".")]
    DuplicateColumn { column: String },

    #[error("Values with type '{0}' are not supported.")]
    UnsupportedValue(TokenKind),

    #[error("{}", UNPARSEABLE_JSON)]
    Unparseable(#[source] TokenError),

    #[error("{}", UNPARSEABLE_FORM)]
    UnparseableForm(#[source] serde_urlencoded::de::Error),

    /// The catalog could not describe a table parameter. A fault.
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl From<TokenError> for BindError {
    fn from(err: TokenError) -> Self {
        BindError::Unparseable(err)
    }
}

impl BindError {
    /// True for errors answered with a 400
    pub fn is_shape_error(&self) -> bool {
        !matches!(self, BindError::Schema(_))
    }

    /// The 400 response for a shape error; `None` for faults.
    ///
    /// With `diagnostics` on, parser details are appended to the message.
    pub fn to_classified(&self, diagnostics: bool) -> Option<ClassifiedError> {
        let message = match self {
            BindError::Schema(_) => return None,
            BindError::Unparseable(err) if diagnostics => {
                format!("{}\r\n\r\nDetails:\n{}", UNPARSEABLE_JSON, err)
            }
            BindError::UnparseableForm(err) if diagnostics => {
                format!("{}\r\n\r\nDetails:\n{}", UNPARSEABLE_FORM, err)
            }
            other => other.to_string(),
        };
        Some(ClassifiedError::bad_request(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_messages() {
        let err = BindError::UnknownColumn {
            column: "C".into(),
            parameter: "Rows".into(),
        };
        assert_eq!(err.to_string(), "\"C\" is not a valid property of \"Rows\".");
        assert_eq!(
            BindError::UnsupportedValue(TokenKind::StartObject).to_string(),
            "Values with type 'StartObject' are not supported."
        );
    }

    #[test]
    fn test_parse_details_only_with_diagnostics() {
        let source = serde_json::from_str::<serde_json::Value>(r#"{"a":"#).unwrap_err();
        let detail = source.to_string();
        let err = BindError::from(TokenError::from(source));

        let quiet = err.to_classified(false).unwrap();
        assert_eq!(quiet.message().as_deref(), Some("Could not parse the JSON."));

        let verbose = err.to_classified(true).unwrap();
        assert_eq!(
            verbose.message(),
            Some(format!("Could not parse the JSON.\r\n\r\nDetails:\n{}", detail))
        );
    }

    #[test]
    fn test_schema_error_is_not_classified() {
        let err = BindError::from(SchemaError::TypeNotFound {
            procedure: "P".into(),
            parameter: "Rows".into(),
        });
        assert!(!err.is_shape_error());
        assert!(err.to_classified(true).is_none());
    }
}
