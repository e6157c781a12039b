//! # Error Classifier
//!
//! Maps the engine's parameter errors to 400 responses. Anything it does
//! not recognize stays a fault.

mod classifier;
mod errors;
mod patterns;

pub use classifier::{explain_extra, CallContext, ErrorClassifier};
pub use errors::{ClassifyError, ClassifyResult};
pub use patterns::{match_message, patterns, ErrorPattern, PatternKind};
