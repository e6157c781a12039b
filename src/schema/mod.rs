//! # Schema Resolver
//!
//! Maps a (procedure, parameter) pair to the ordered column names of the
//! table type the parameter is declared with. Answers are cached for the
//! process lifetime; a procedure's table-type shape is treated as immutable.

pub mod catalog;
mod errors;
mod resolver;

pub use errors::{SchemaError, SchemaResult};
pub use resolver::SchemaResolver;
