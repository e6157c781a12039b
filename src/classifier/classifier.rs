//! # Error Classifier
//!
//! Reads raw engine error text and, for the shapes it recognizes, answers
//! with a 400 naming the offending parameter(s). A too-many-arguments error
//! names no parameter, so the procedure's declared parameters are fetched
//! and diffed against what was sent. The diff trusts that lookup even if the
//! procedure changed between the call and the lookup.

use crate::observability::{Event, Logger};
use crate::outcome::ClassifiedError;
use crate::schema::catalog;
use crate::session::{EngineError, SqlSession};

use super::errors::ClassifyResult;
use super::patterns::{match_message, PatternKind};

/// The call an engine error belongs to
#[derive(Debug, Clone, Copy)]
pub struct CallContext<'a> {
    pub procedure: &'a str,
    /// Every parameter name sent, including outputs and injected identity
    pub sent_names: &'a [String],
}

/// Turns engine errors into user-facing 400s
#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorClassifier;

impl ErrorClassifier {
    pub fn new() -> Self {
        Self
    }

    /// `Ok(None)` when the error is not one the classifier recognizes
    pub async fn classify<S>(
        &self,
        session: &mut S,
        error: &EngineError,
        context: &CallContext<'_>,
    ) -> ClassifyResult<Option<ClassifiedError>>
    where
        S: SqlSession + ?Sized,
    {
        let Some((kind, name)) = match_message(&error.message) else {
            return Ok(None);
        };

        let classified = match kind {
            PatternKind::MissingParameter => required_input(&name),
            PatternKind::UnknownParameter => invalid_parameter(&name),
            PatternKind::TooManyArguments => {
                let procedure = error.procedure.as_deref().unwrap_or(context.procedure);
                let available = session
                    .query_column(
                        catalog::PROCEDURE_PARAMETERS,
                        &[(catalog::PROCEDURE_NAME_PARAM, procedure)],
                    )
                    .await?;

                let count = available.len().to_string();
                Logger::event(
                    Event::ParameterDiffQueried,
                    &[("available", count.as_str()), ("procedure", procedure)],
                );

                explain_extra(context.sent_names, &available)
            }
        };
        Ok(Some(classified))
    }
}

fn required_input(name: &str) -> ClassifiedError {
    ClassifiedError::bad_request(format!("The parameter \"{}\" is a required input.", name))
}

fn invalid_parameter(name: &str) -> ClassifiedError {
    ClassifiedError::bad_request(format!(
        "The parameter called \"{}\" is invalid for this endpoint.",
        name
    ))
}

fn quoted_list(names: &[&str]) -> String {
    names
        .iter()
        .map(|n| format!("\"{}\"", n))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Push `name` unless an ASCII-case-insensitive equal is already present
fn push_distinct<'a>(names: &mut Vec<&'a str>, name: &'a str) {
    if !names.iter().any(|n| n.eq_ignore_ascii_case(name)) {
        names.push(name);
    }
}

/// Explain a too-many-arguments error from the sent and declared names.
///
/// Names compare ASCII-case-insensitively, as the engine does. Sent names
/// not declared are reported in first-appearance order; when every sent
/// name is declared, the names sent more than once are reported instead.
pub fn explain_extra(sent: &[String], available: &[String]) -> ClassifiedError {
    let mut extra = Vec::new();
    for name in sent {
        if !available.iter().any(|a| a.eq_ignore_ascii_case(name)) {
            push_distinct(&mut extra, name);
        }
    }

    match extra.as_slice() {
        [] => {
            let mut duplicates = Vec::new();
            for (i, name) in sent.iter().enumerate() {
                if let Some(first) = sent[..i].iter().find(|s| s.eq_ignore_ascii_case(name)) {
                    push_distinct(&mut duplicates, first);
                }
            }
            ClassifiedError::bad_request(format!(
                "The following parameters were duplicates: {}",
                quoted_list(&duplicates)
            ))
        }
        [single] => invalid_parameter(single),
        many => ClassifiedError::bad_request(format!(
            "The following parameters are invalid for this endpoint: {}",
            quoted_list(many)
        )),
    }
}
