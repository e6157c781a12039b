//! # JSON Binder
//!
//! Walks a flat JSON object token by token and produces one binding per
//! property. Arrays become table-valued parameters: arrays of scalars bind a
//! single `Value` column, arrays of objects bind the columns of the
//! parameter's table type as reported by the catalog.

use crate::schema::SchemaResolver;
use crate::session::SqlSession;
use crate::token::{Token, TokenKind, TokenReader};

use super::errors::{BindError, BindResult};
use super::value::{Cell, ParameterBinding, ParameterValue, Scalar, TableBinding};

/// Element family of an array of scalars. Integers and floats share one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Family {
    Text,
    Numeric,
    Boolean,
    Date,
}

/// Convert a scalar token into a cell, handing back any non-scalar token
fn scalar_cell(token: Token) -> Result<Cell, Token> {
    match token {
        Token::String(s) | Token::Date(s) => Ok(Some(Scalar::Text(s))),
        Token::Integer(i) => Ok(Some(Scalar::Integer(i))),
        Token::Float(x) => Ok(Some(Scalar::Float(x))),
        Token::Boolean(b) => Ok(Some(Scalar::Boolean(b))),
        Token::Null => Ok(None),
        other => Err(other),
    }
}

fn family(token: &Token) -> Option<Family> {
    match token {
        Token::String(_) => Some(Family::Text),
        Token::Integer(_) | Token::Float(_) => Some(Family::Numeric),
        Token::Boolean(_) => Some(Family::Boolean),
        Token::Date(_) => Some(Family::Date),
        _ => None,
    }
}

/// Binds one request body for one procedure.
///
/// Holds the request's session so table types can be looked up mid-stream.
pub struct ParameterBinder<'a, S: SqlSession + ?Sized> {
    resolver: &'a SchemaResolver,
    session: &'a mut S,
    procedure: &'a str,
}

impl<'a, S: SqlSession + ?Sized> ParameterBinder<'a, S> {
    pub fn new(resolver: &'a SchemaResolver, session: &'a mut S, procedure: &'a str) -> Self {
        Self {
            resolver,
            session,
            procedure,
        }
    }

    /// Bind every property of the root object, in document order
    pub async fn bind(&mut self, reader: &mut TokenReader<'_>) -> BindResult<Vec<ParameterBinding>> {
        match reader.next_token()? {
            Some(Token::StartObject) => {}
            _ => return Err(BindError::InvalidObject),
        }

        let mut bindings = Vec::new();
        loop {
            match reader.next_token()? {
                Some(Token::PropertyName(name)) => {
                    let value = self.bind_value(reader, &name).await?;
                    bindings.push(ParameterBinding::new(name, value));
                }
                Some(Token::EndObject) => break,
                _ => return Err(BindError::InvalidObject),
            }
        }

        // Nothing may follow the root object
        match reader.next_token()? {
            None => Ok(bindings),
            Some(_) => Err(BindError::InvalidObject),
        }
    }

    async fn bind_value(
        &mut self,
        reader: &mut TokenReader<'_>,
        name: &str,
    ) -> BindResult<ParameterValue> {
        let token = reader.next_token()?.ok_or(BindError::InvalidObject)?;
        match token {
            Token::StartArray => self.bind_array(reader, name).await,
            other => scalar_cell(other)
                .map(ParameterValue::from)
                .map_err(|t| BindError::UnsupportedValue(t.kind())),
        }
    }

    async fn bind_array(
        &mut self,
        reader: &mut TokenReader<'_>,
        name: &str,
    ) -> BindResult<ParameterValue> {
        let first = reader.next_token()?.ok_or(BindError::InvalidObject)?;
        let table = match first {
            Token::EndArray => TableBinding::single_column(),
            Token::StartObject => self.bind_rows(reader, name).await?,
            Token::StartArray => return Err(BindError::InvalidObject),
            scalar => bind_scalars(reader, scalar)?,
        };
        Ok(ParameterValue::Table(table))
    }

    /// Rows of an array of objects; the first `{` has been consumed
    async fn bind_rows(
        &mut self,
        reader: &mut TokenReader<'_>,
        parameter: &str,
    ) -> BindResult<TableBinding> {
        let columns = self
            .resolver
            .resolve_columns(&mut *self.session, self.procedure, parameter)
            .await?;
        let mut table = TableBinding::with_columns(columns.to_vec());

        loop {
            table.push_row(read_row(reader, &columns, parameter)?);

            match reader.next_token()? {
                Some(Token::StartObject) => continue,
                Some(Token::EndArray) => return Ok(table),
                _ => return Err(BindError::InvalidObject),
            }
        }
    }
}

/// One object of an array of objects; its `{` has been consumed
fn read_row(
    reader: &mut TokenReader<'_>,
    columns: &[String],
    parameter: &str,
) -> BindResult<Vec<Cell>> {
    let mut slots: Vec<Option<Cell>> = vec![None; columns.len()];

    loop {
        let column = match reader.next_token()? {
            Some(Token::PropertyName(column)) => column,
            Some(Token::EndObject) => break,
            _ => return Err(BindError::InvalidObject),
        };

        // Property names must spell the column exactly
        let index = columns
            .iter()
            .position(|c| *c == column)
            .ok_or_else(|| BindError::UnknownColumn {
                column: column.clone(),
                parameter: parameter.to_string(),
            })?;
        if slots[index].is_some() {
            return Err(BindError::DuplicateColumn { column });
        }

        let token = reader.next_token()?.ok_or(BindError::InvalidObject)?;
        let cell = scalar_cell(token).map_err(|t| BindError::UnsupportedValue(t.kind()))?;
        slots[index] = Some(cell);
    }

    Ok(slots.into_iter().map(Option::flatten).collect())
}

/// Elements of an array of scalars, starting from the already-read first one
fn bind_scalars(reader: &mut TokenReader<'_>, first: Token) -> BindResult<TableBinding> {
    let mut table = TableBinding::single_column();
    let mut fixed: Option<Family> = None;
    let mut next = Some(first);

    while let Some(token) = next.take() {
        if token == Token::EndArray {
            return Ok(table);
        }
        if let Some(f) = family(&token) {
            match fixed {
                Some(expected) if expected != f => return Err(BindError::MixedArray),
                _ => fixed = Some(f),
            }
        }
        let cell = scalar_cell(token).map_err(|t| match t.kind() {
            TokenKind::StartObject | TokenKind::StartArray => BindError::MixedArray,
            kind => BindError::UnsupportedValue(kind),
        })?;
        table.push_row(vec![cell]);
        next = reader.next_token()?;
    }

    // The tokenizer reports truncation inside a container itself
    Err(BindError::InvalidObject)
}
