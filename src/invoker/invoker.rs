//! # Procedure Invoker

use std::sync::Arc;
use std::time::Duration;

use crate::binder::{ParameterBinding, Scalar};
use crate::observability::{Event, Logger};
use crate::outcome::ProcedureCallResult;
use crate::session::{ProcedureCall, SessionError, SqlSession, SqlType};

use super::errors::{InvokeError, InvokeResult};
use super::locks::ExclusivityLocks;

/// Output parameter carrying the HTTP status
pub const STATUS_PARAMETER: &str = "HttpStatusCode";

/// Output parameter carrying the JSON response body
pub const BODY_PARAMETER: &str = "JsonResponse";

/// Runs stored procedures and reads back their status and body outputs
#[derive(Debug, Clone)]
pub struct ProcedureInvoker {
    timeout: Duration,
    locks: Arc<ExclusivityLocks>,
}

impl ProcedureInvoker {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            locks: Arc::new(ExclusivityLocks::new()),
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn locks(&self) -> &ExclusivityLocks {
        &self.locks
    }

    /// Execute `procedure` with `bindings`.
    ///
    /// With an `exclusivity` key, the call runs only while no other call
    /// holding the same key does.
    pub async fn invoke<S>(
        &self,
        session: &mut S,
        procedure: &str,
        bindings: Vec<ParameterBinding>,
        exclusivity: Option<&str>,
    ) -> InvokeResult<ProcedureCallResult>
    where
        S: SqlSession + ?Sized,
    {
        let call = ProcedureCall::new(procedure, bindings)
            .with_output(STATUS_PARAMETER, SqlType::Int)
            .with_output(BODY_PARAMETER, SqlType::NVarCharMax)
            .with_timeout(self.timeout);

        let count = call.inputs.len().to_string();
        Logger::event(
            Event::ProcedureCallStart,
            &[("inputs", count.as_str()), ("procedure", procedure)],
        );

        let _guard = match exclusivity {
            Some(key) => {
                let guard = self.locks.acquire(key).await;
                Logger::event(
                    Event::ExclusivityAcquired,
                    &[("key", key), ("procedure", procedure)],
                );
                Some(guard)
            }
            None => None,
        };

        let outputs = match tokio::time::timeout(self.timeout, session.execute(&call)).await {
            Err(_) => return Err(InvokeError::Timeout(self.timeout)),
            Ok(Err(SessionError::Engine(error))) => {
                return Err(InvokeError::Engine {
                    error,
                    sent_names: call.parameter_names(),
                })
            }
            Ok(Err(other)) => return Err(InvokeError::Session(other)),
            Ok(Ok(outputs)) => outputs,
        };

        let body = outputs.get(BODY_PARAMETER).map(Scalar::to_string);
        let status = outputs
            .get_int(STATUS_PARAMETER)
            .ok_or(InvokeError::MissingStatus)?;
        let status = i32::try_from(status).map_err(|_| InvokeError::InvalidStatus(status))?;

        if status == 500 {
            return Err(InvokeError::ReportedServerError(body));
        }
        Ok(ProcedureCallResult::new(status, body))
    }
}
