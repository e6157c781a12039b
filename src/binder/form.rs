//! # Form Binder
//!
//! `application/x-www-form-urlencoded` bodies bind flat: one text parameter
//! per field, in body order. No table-valued parameters.

use super::errors::{BindError, BindResult};
use super::value::ParameterBinding;

/// Decode a form body into text bindings
pub fn bind_form(body: &[u8]) -> BindResult<Vec<ParameterBinding>> {
    let fields: Vec<(String, String)> =
        serde_urlencoded::from_bytes(body).map_err(BindError::UnparseableForm)?;
    Ok(fields
        .into_iter()
        .map(|(name, value)| ParameterBinding::text(name, value))
        .collect())
}
