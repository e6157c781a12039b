//! Observable events of the procedure bridge
//!
//! Events are explicit and typed. Each event carries the severity it is
//! logged at.

use std::fmt;

use super::logger::Severity;

/// Observable events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Bridge configuration validated and a connector bound
    BridgeConfigured,

    // Procedure calls
    /// A request has been bound and the procedure is about to run
    ProcedureCallStart,
    /// The procedure returned a status and body
    ProcedureCallComplete,
    /// The request was answered with a 4xx (shape error or classified engine error)
    ProcedureCallRejected,
    /// The request escalated to a server fault
    ProcedureCallFault,

    // Exclusivity
    /// An invocation waited for its exclusivity token
    ExclusivityAcquired,

    // Catalog
    /// Table type columns fetched from the catalog
    TableTypeResolved,
    /// Declared parameters fetched to explain a too-many-arguments error
    ParameterDiffQueried,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::BridgeConfigured => "BRIDGE_CONFIGURED",
            Event::ProcedureCallStart => "PROCEDURE_CALL_START",
            Event::ProcedureCallComplete => "PROCEDURE_CALL_COMPLETE",
            Event::ProcedureCallRejected => "PROCEDURE_CALL_REJECTED",
            Event::ProcedureCallFault => "PROCEDURE_CALL_FAULT",
            Event::ExclusivityAcquired => "EXCLUSIVITY_ACQUIRED",
            Event::TableTypeResolved => "TABLE_TYPE_RESOLVED",
            Event::ParameterDiffQueried => "PARAMETER_DIFF_QUERIED",
        }
    }

    /// Severity the event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::ProcedureCallFault => Severity::Error,
            Event::ProcedureCallRejected => Severity::Warn,
            Event::ProcedureCallStart
            | Event::ExclusivityAcquired
            | Event::TableTypeResolved
            | Event::ParameterDiffQueried => Severity::Trace,
            Event::BridgeConfigured | Event::ProcedureCallComplete => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names_are_screaming_snake_case() {
        let events = [
            Event::BridgeConfigured,
            Event::ProcedureCallStart,
            Event::ProcedureCallComplete,
            Event::ProcedureCallRejected,
            Event::ProcedureCallFault,
            Event::ExclusivityAcquired,
            Event::TableTypeResolved,
            Event::ParameterDiffQueried,
        ];
        for event in events {
            let name = event.as_str();
            assert!(name.chars().all(|c| c.is_ascii_uppercase() || c == '_'), "{}", name);
            assert_eq!(event.to_string(), name);
        }
    }

    #[test]
    fn test_fault_is_error_severity() {
        assert_eq!(Event::ProcedureCallFault.severity(), Severity::Error);
        assert_eq!(Event::ProcedureCallComplete.severity(), Severity::Info);
    }
}
