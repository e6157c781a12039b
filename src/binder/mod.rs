//! # Parameter Binder
//!
//! Turns a request body into named call parameters: JSON bodies through the
//! streaming [`ParameterBinder`], form bodies through [`bind_form`].

mod binder;
mod errors;
mod form;
mod value;

pub use binder::ParameterBinder;
pub use errors::{BindError, BindResult, UNPARSEABLE_FORM, UNPARSEABLE_JSON};
pub use form::bind_form;
pub use value::{
    contains_parameter, Cell, ParameterBinding, ParameterValue, Scalar, TableBinding,
};
