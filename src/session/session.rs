//! # Session Capability
//!
//! The database session the bridge drives. Implementations own one
//! connection; a session is never shared between requests.

use async_trait::async_trait;

use super::call::{OutputValues, ProcedureCall};
use super::errors::SessionResult;

/// One open database session
#[async_trait]
pub trait SqlSession: Send {
    /// Execute a stored procedure and read back its output parameters
    async fn execute(&mut self, call: &ProcedureCall) -> SessionResult<OutputValues>;

    /// Run an ad-hoc text query and return the first column of every row
    async fn query_column(
        &mut self,
        sql: &str,
        params: &[(&str, &str)],
    ) -> SessionResult<Vec<String>>;
}

/// Opens sessions, one per request
#[async_trait]
pub trait SessionConnector: Send + Sync {
    type Session: SqlSession;

    async fn open(&self) -> SessionResult<Self::Session>;
}
