//! # Procedure Calls
//!
//! What a session is asked to execute, and what it hands back.

use std::collections::HashMap;
use std::time::Duration;

use crate::binder::{ParameterBinding, Scalar};

/// Engine type of an output parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlType {
    Int,
    /// Unbounded unicode text
    NVarCharMax,
}

/// A parameter the engine writes back
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputParameter {
    pub name: String,
    pub sql_type: SqlType,
}

/// A stored procedure call with its bound inputs and requested outputs
#[derive(Debug, Clone)]
pub struct ProcedureCall {
    pub procedure: String,
    pub inputs: Vec<ParameterBinding>,
    pub outputs: Vec<OutputParameter>,
    pub timeout: Duration,
}

impl ProcedureCall {
    pub fn new(procedure: impl Into<String>, inputs: Vec<ParameterBinding>) -> Self {
        Self {
            procedure: procedure.into(),
            inputs,
            outputs: Vec::new(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_output(mut self, name: impl Into<String>, sql_type: SqlType) -> Self {
        self.outputs.push(OutputParameter {
            name: name.into(),
            sql_type,
        });
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Every parameter name sent with the call, inputs first, in order
    pub fn parameter_names(&self) -> Vec<String> {
        self.inputs
            .iter()
            .map(|p| p.name.clone())
            .chain(self.outputs.iter().map(|p| p.name.clone()))
            .collect()
    }
}

/// Output parameter values after execution; `None` is database null
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutputValues {
    values: HashMap<String, Option<Scalar>>,
}

impl OutputValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: impl Into<String>, value: Option<Scalar>) {
        self.values.insert(name.into(), value);
    }

    pub fn with(mut self, name: impl Into<String>, value: Option<Scalar>) -> Self {
        self.set(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Scalar> {
        self.values.get(name).and_then(Option::as_ref)
    }

    pub fn get_int(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Scalar::as_i64)
    }

    pub fn get_text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Scalar::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }
}
