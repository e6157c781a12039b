//! # Parameter Values
//!
//! The closed value model handed from the binder to the session:
//! every parameter is a scalar, a database null, or a table.

use std::fmt;

use uuid::Uuid;

/// A single non-null value.
///
/// Dates have no variant of their own: they travel as normalized `Text`.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Text(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Guid(Uuid),
}

impl Scalar {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Scalar::Integer(i) => Some(*i),
            _ => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Text(s) => write!(f, "{}", s),
            Scalar::Integer(i) => write!(f, "{}", i),
            Scalar::Float(x) => write!(f, "{}", x),
            Scalar::Boolean(b) => write!(f, "{}", b),
            Scalar::Guid(g) => write!(f, "{}", g),
        }
    }
}

/// A table cell; `None` is database null
pub type Cell = Option<Scalar>;

/// A structured (table-valued) parameter.
///
/// Every row has exactly one cell per column, in column order.
#[derive(Debug, Clone, PartialEq)]
pub struct TableBinding {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl TableBinding {
    /// Column name used for arrays of scalars
    pub const VALUE_COLUMN: &'static str = "Value";

    pub fn with_columns(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Empty table with the single implicit `Value` column
    pub fn single_column() -> Self {
        Self::with_columns(vec![Self::VALUE_COLUMN.to_string()])
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Look up a cell by row index and column name
    pub fn cell(&self, row: usize, column: &str) -> Option<&Cell> {
        let index = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.get(index))
    }

    pub(crate) fn push_row(&mut self, row: Vec<Cell>) {
        debug_assert_eq!(row.len(), self.columns.len());
        self.rows.push(row);
    }
}

/// The value bound to one named parameter
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterValue {
    Scalar(Scalar),
    Null,
    Table(TableBinding),
}

impl ParameterValue {
    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            ParameterValue::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<&TableBinding> {
        match self {
            ParameterValue::Table(t) => Some(t),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ParameterValue::Null)
    }
}

impl From<Cell> for ParameterValue {
    fn from(cell: Cell) -> Self {
        match cell {
            Some(scalar) => ParameterValue::Scalar(scalar),
            None => ParameterValue::Null,
        }
    }
}

/// A named call parameter, name without the `@` prefix
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterBinding {
    pub name: String,
    pub value: ParameterValue,
}

impl ParameterBinding {
    pub fn new(name: impl Into<String>, value: ParameterValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    pub fn scalar(name: impl Into<String>, value: Scalar) -> Self {
        Self::new(name, ParameterValue::Scalar(value))
    }

    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::scalar(name, Scalar::Text(value.into()))
    }

    pub fn null(name: impl Into<String>) -> Self {
        Self::new(name, ParameterValue::Null)
    }

    pub fn table(name: impl Into<String>, table: TableBinding) -> Self {
        Self::new(name, ParameterValue::Table(table))
    }
}

/// True when a binding with this name exists, ignoring ASCII case
/// (parameter names are case-insensitive on the engine side).
pub fn contains_parameter(bindings: &[ParameterBinding], name: &str) -> bool {
    bindings.iter().any(|b| b.name.eq_ignore_ascii_case(name))
}
