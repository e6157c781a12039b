//! # In-Memory Engine
//!
//! A stored-procedure engine held in memory, used by the tests and as a
//! reference for what a real session implementation must reproduce: catalog
//! answers for the two introspection queries, named-parameter validation with
//! the engine's own error phrasing, and output parameters.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;

use crate::binder::{ParameterBinding, ParameterValue, Scalar, TableBinding};
use crate::config::{ConfigResult, ConnectionConfig};
use crate::schema::catalog;

use super::call::{OutputValues, ProcedureCall};
use super::errors::{EngineError, SessionError, SessionResult};
use super::session::{SessionConnector, SqlSession};

/// Procedure body: receives the bound inputs, returns output values
pub type ProcedureBody =
    Arc<dyn Fn(&CallArguments) -> Result<OutputValues, EngineError> + Send + Sync>;

/// A formal parameter of an in-memory procedure
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclaredParameter {
    Input { name: String, required: bool },
    Table { name: String, columns: Vec<String> },
    Output { name: String },
}

impl DeclaredParameter {
    pub fn name(&self) -> &str {
        match self {
            DeclaredParameter::Input { name, .. }
            | DeclaredParameter::Table { name, .. }
            | DeclaredParameter::Output { name } => name,
        }
    }
}

/// An in-memory stored procedure definition
#[derive(Clone)]
pub struct ProcedureDef {
    name: String,
    parameters: Vec<DeclaredParameter>,
    body: ProcedureBody,
    latency: Option<Duration>,
}

impl fmt::Debug for ProcedureDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcedureDef")
            .field("name", &self.name)
            .field("parameters", &self.parameters)
            .field("latency", &self.latency)
            .finish()
    }
}

impl ProcedureDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: Vec::new(),
            body: Arc::new(|_| Ok(OutputValues::new())),
            latency: None,
        }
    }

    /// Declare a required scalar input
    pub fn input(mut self, name: impl Into<String>) -> Self {
        self.parameters.push(DeclaredParameter::Input {
            name: name.into(),
            required: true,
        });
        self
    }

    /// Declare a scalar input with a default
    pub fn optional(mut self, name: impl Into<String>) -> Self {
        self.parameters.push(DeclaredParameter::Input {
            name: name.into(),
            required: false,
        });
        self
    }

    /// Declare a table-valued input whose type has these columns, in order
    pub fn table<I, S>(mut self, name: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parameters.push(DeclaredParameter::Table {
            name: name.into(),
            columns: columns.into_iter().map(Into::into).collect(),
        });
        self
    }

    pub fn output(mut self, name: impl Into<String>) -> Self {
        self.parameters
            .push(DeclaredParameter::Output { name: name.into() });
        self
    }

    pub fn body<F>(mut self, body: F) -> Self
    where
        F: Fn(&CallArguments) -> Result<OutputValues, EngineError> + Send + Sync + 'static,
    {
        self.body = Arc::new(body);
        self
    }

    /// Simulated execution time
    pub fn latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parameters(&self) -> &[DeclaredParameter] {
        &self.parameters
    }

    fn find(&self, name: &str) -> Option<&DeclaredParameter> {
        self.parameters
            .iter()
            .find(|p| p.name().eq_ignore_ascii_case(name))
    }

    /// Reproduce the engine's argument checks, in the engine's order
    fn check_call(&self, call: &ProcedureCall) -> Result<(), EngineError> {
        let sent = call.parameter_names();

        if sent.len() > self.parameters.len() {
            return Err(self.error(format!(
                "Procedure or function {} has too many arguments specified.",
                self.name
            )));
        }

        for input in &call.inputs {
            match self.find(&input.name) {
                None if matches!(input.value, ParameterValue::Table(_)) => {
                    return Err(self.error(format!(
                        "The procedure \"{}\" has no parameter named \"@{}\".",
                        self.name, input.name
                    )));
                }
                None => return Err(self.unknown_parameter(&input.name)),
                Some(declared) => self.check_value(declared, &input.value)?,
            }
        }

        for output in &call.outputs {
            if self.find(&output.name).is_none() {
                return Err(self.unknown_parameter(&output.name));
            }
        }

        let mut seen = HashSet::new();
        for name in &sent {
            if !seen.insert(name.to_ascii_lowercase()) {
                return Err(self.error(format!(
                    "Parameter '@{}' was supplied multiple times.",
                    name
                )));
            }
        }

        for declared in &self.parameters {
            if let DeclaredParameter::Input {
                name,
                required: true,
            } = declared
            {
                if !sent.iter().any(|s| s.eq_ignore_ascii_case(name)) {
                    return Err(self.error(format!(
                        "Procedure or function '{}' expects parameter '@{}', which was not supplied.",
                        self.name, name
                    )));
                }
            }
        }

        Ok(())
    }

    fn check_value(
        &self,
        declared: &DeclaredParameter,
        value: &ParameterValue,
    ) -> Result<(), EngineError> {
        match (declared, value) {
            (DeclaredParameter::Table { columns, .. }, ParameterValue::Table(table)) => {
                if table.columns().len() != columns.len() {
                    return Err(self.error(format!(
                        "Trying to pass a table-valued parameter with {} column(s) where the corresponding user-defined table type requires {} column(s).",
                        table.columns().len(),
                        columns.len()
                    )));
                }
                Ok(())
            }
            (DeclaredParameter::Table { name, .. }, ParameterValue::Scalar(_)) => Err(self.error(
                format!("Operand type clash: scalar value is incompatible with '@{}'.", name),
            )),
            (DeclaredParameter::Table { .. }, ParameterValue::Null) => Ok(()),
            (_, ParameterValue::Table(_)) => Err(self.error(format!(
                "Operand type clash: table type is incompatible with '@{}'.",
                declared.name()
            ))),
            _ => Ok(()),
        }
    }

    fn unknown_parameter(&self, name: &str) -> EngineError {
        self.error(format!(
            "@{} is not a parameter for procedure {}.",
            name, self.name
        ))
    }

    fn error(&self, message: String) -> EngineError {
        EngineError::new(message).in_procedure(self.name.clone())
    }
}

/// Inputs as seen by a procedure body
#[derive(Debug, Clone)]
pub struct CallArguments {
    inputs: Vec<ParameterBinding>,
}

impl CallArguments {
    pub fn get(&self, name: &str) -> Option<&ParameterValue> {
        self.inputs
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
            .map(|p| &p.value)
    }

    pub fn scalar(&self, name: &str) -> Option<&Scalar> {
        self.get(name).and_then(ParameterValue::as_scalar)
    }

    pub fn table(&self, name: &str) -> Option<&TableBinding> {
        self.get(name).and_then(ParameterValue::as_table)
    }

    pub fn bindings(&self) -> &[ParameterBinding] {
        &self.inputs
    }
}

/// Lowercased bare procedure name: `[dbo].[GetUser]` and `GetUser` match
fn procedure_key(name: &str) -> String {
    let bare = name.rsplit('.').next().unwrap_or(name);
    bare.trim_matches(|c| c == '[' || c == ']')
        .to_ascii_lowercase()
}

/// The shared in-memory engine
#[derive(Debug, Default)]
pub struct MemoryEngine {
    procedures: RwLock<HashMap<String, ProcedureDef>>,
    offline: AtomicBool,
    catalog_queries: AtomicUsize,
    executions: AtomicUsize,
    active: AtomicUsize,
    peak_active: AtomicUsize,
}

impl MemoryEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a procedure
    pub fn register(&self, procedure: ProcedureDef) {
        let mut procedures = self
            .procedures
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        procedures.insert(procedure_key(&procedure.name), procedure);
    }

    /// While offline, opening a session fails
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of ad-hoc catalog queries answered so far
    pub fn catalog_queries(&self) -> usize {
        self.catalog_queries.load(Ordering::SeqCst)
    }

    /// Number of procedure executions started so far
    pub fn executions(&self) -> usize {
        self.executions.load(Ordering::SeqCst)
    }

    /// Highest number of executions observed in flight at once
    pub fn peak_concurrency(&self) -> usize {
        self.peak_active.load(Ordering::SeqCst)
    }

    fn procedure(&self, name: &str) -> Option<ProcedureDef> {
        let procedures = self
            .procedures
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        procedures.get(&procedure_key(name)).cloned()
    }

    fn table_type_columns(&self, procedure: &str, parameter: &str) -> Vec<String> {
        self.procedure(procedure)
            .and_then(|def| match def.find(parameter) {
                Some(DeclaredParameter::Table { columns, .. }) => Some(columns.clone()),
                _ => None,
            })
            .unwrap_or_default()
    }

    fn declared_parameter_names(&self, procedure: &str) -> Vec<String> {
        self.procedure(procedure)
            .map(|def| {
                def.parameters
                    .iter()
                    .map(|p| p.name().to_string())
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Decrements the in-flight counter on every exit path
struct ActiveGuard<'a>(&'a AtomicUsize);

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// A session against a [`MemoryEngine`]
#[derive(Debug, Clone)]
pub struct MemorySession {
    engine: Arc<MemoryEngine>,
}

impl MemorySession {
    pub fn new(engine: Arc<MemoryEngine>) -> Self {
        Self { engine }
    }
}

fn statement_param<'p>(params: &[(&str, &'p str)], name: &str) -> SessionResult<&'p str> {
    params
        .iter()
        .find(|(key, _)| *key == name)
        .map(|(_, value)| *value)
        .ok_or_else(|| {
            SessionError::Engine(EngineError::new(format!(
                "Must declare the scalar variable \"@{}\".",
                name
            )))
        })
}

#[async_trait]
impl SqlSession for MemorySession {
    async fn execute(&mut self, call: &ProcedureCall) -> SessionResult<OutputValues> {
        let engine = &self.engine;
        let def = engine.procedure(&call.procedure).ok_or_else(|| {
            EngineError::new(format!(
                "Could not find stored procedure '{}'.",
                call.procedure
            ))
        })?;

        def.check_call(call)?;

        engine.executions.fetch_add(1, Ordering::SeqCst);
        let in_flight = engine.active.fetch_add(1, Ordering::SeqCst) + 1;
        let _guard = ActiveGuard(&engine.active);
        engine.peak_active.fetch_max(in_flight, Ordering::SeqCst);

        if let Some(latency) = def.latency {
            tokio::time::sleep(latency).await;
        }

        let args = CallArguments {
            inputs: call.inputs.clone(),
        };
        let produced = (def.body)(&args).map_err(|e| match e.procedure {
            Some(_) => e,
            None => e.in_procedure(def.name.clone()),
        })?;

        let mut outputs = OutputValues::new();
        for output in &call.outputs {
            outputs.set(output.name.clone(), produced.get(&output.name).cloned());
        }
        Ok(outputs)
    }

    async fn query_column(
        &mut self,
        sql: &str,
        params: &[(&str, &str)],
    ) -> SessionResult<Vec<String>> {
        self.engine.catalog_queries.fetch_add(1, Ordering::SeqCst);

        if sql == catalog::TABLE_TYPE_COLUMNS {
            let procedure = statement_param(params, catalog::PROCEDURE_NAME_PARAM)?;
            let parameter = statement_param(params, catalog::PROPERTY_NAME_PARAM)?;
            Ok(self.engine.table_type_columns(procedure, parameter))
        } else if sql == catalog::PROCEDURE_PARAMETERS {
            let procedure = statement_param(params, catalog::PROCEDURE_NAME_PARAM)?;
            Ok(self.engine.declared_parameter_names(procedure))
        } else {
            Err(SessionError::UnsupportedStatement(sql.to_string()))
        }
    }
}

/// Opens [`MemorySession`]s against one engine
#[derive(Debug, Clone)]
pub struct MemoryConnector {
    engine: Arc<MemoryEngine>,
}

impl MemoryConnector {
    /// Fails when the connection settings are invalid
    pub fn new(config: &ConnectionConfig, engine: Arc<MemoryEngine>) -> ConfigResult<Self> {
        config.validate()?;
        Ok(Self { engine })
    }

    pub fn engine(&self) -> &Arc<MemoryEngine> {
        &self.engine
    }
}

#[async_trait]
impl SessionConnector for MemoryConnector {
    type Session = MemorySession;

    async fn open(&self) -> SessionResult<MemorySession> {
        if self.engine.offline.load(Ordering::SeqCst) {
            return Err(SessionError::Connection(
                "A network-related error occurred while establishing a connection".to_string(),
            ));
        }
        Ok(MemorySession::new(self.engine.clone()))
    }
}
