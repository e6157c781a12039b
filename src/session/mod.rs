//! # Database Session
//!
//! The capability the bridge drives: execute a stored procedure with named
//! scalar and table-valued inputs, read back output parameters, and run
//! ad-hoc catalog queries. [`MemoryEngine`] is the in-process engine used by
//! the test suite.

mod call;
mod errors;
mod memory;
mod session;

pub use call::{OutputParameter, OutputValues, ProcedureCall, SqlType};
pub use errors::{EngineError, SessionError, SessionResult};
pub use memory::{
    CallArguments, DeclaredParameter, MemoryConnector, MemoryEngine, MemorySession,
    ProcedureBody, ProcedureDef,
};
pub use session::{SessionConnector, SqlSession};
