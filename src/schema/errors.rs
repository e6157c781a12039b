//! # Schema Errors

use thiserror::Error;

use crate::session::SessionError;

/// Result type for schema resolution
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Schema resolution errors. Never user-facing.
#[derive(Debug, Clone, Error)]
pub enum SchemaError {
    /// The catalog has no table type for this procedure parameter
    #[error("No table type found for parameter \"{parameter}\" of procedure \"{procedure}\"")]
    TypeNotFound { procedure: String, parameter: String },

    #[error("Catalog query failed: {0}")]
    Session(#[from] SessionError),
}
