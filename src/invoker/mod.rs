//! # Procedure Invoker
//!
//! Executes a bound call with the two conventional output parameters and
//! turns them into a [`ProcedureCallResult`](crate::outcome::ProcedureCallResult).
//! A status of 500 reported by the procedure escalates as a fault.

mod errors;
mod invoker;
mod locks;

pub use errors::{InvokeError, InvokeResult};
pub use invoker::{ProcedureInvoker, BODY_PARAMETER, STATUS_PARAMETER};
pub use locks::{ExclusivityGuard, ExclusivityLocks};
