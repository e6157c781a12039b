//! Observability for the procedure bridge
//!
//! Structured JSON logging of typed lifecycle events. Logging is
//! read-only and never affects the outcome of a call.
//!
//! ```ignore
//! use procbridge::observability::{Event, Logger};
//!
//! Logger::event(Event::ProcedureCallComplete, &[("procedure", "SaveOrder")]);
//! ```

mod events;
mod logger;

pub use events::Event;
pub use logger::{Logger, Severity};
