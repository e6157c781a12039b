//! Known engine error shapes, in evaluation order.

use once_cell::sync::Lazy;
use regex::Regex;

/// What a recognized engine error says about the call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternKind {
    /// A required parameter was not sent
    MissingParameter,
    /// A sent parameter is not declared by the procedure
    UnknownParameter,
    /// More parameters were sent than declared; the engine does not say which
    TooManyArguments,
}

/// One known engine error shape
#[derive(Debug)]
pub struct ErrorPattern {
    pub kind: PatternKind,
    regex: Regex,
}

impl ErrorPattern {
    fn new(kind: PatternKind, pattern: &str) -> Self {
        Self {
            kind,
            regex: Regex::new(pattern).expect("static error pattern"),
        }
    }

    /// `Some(name)` when the message matches; the name is empty for
    /// patterns that do not capture one.
    pub fn extract(&self, message: &str) -> Option<String> {
        self.regex.captures(message).map(|caps| {
            caps.get(1)
                .map(|m| m.as_str().to_string())
                .unwrap_or_default()
        })
    }
}

// Engine identifiers: letter or underscore, then letters, digits, underscores
static PATTERNS: Lazy<Vec<ErrorPattern>> = Lazy::new(|| {
    vec![
        ErrorPattern::new(
            PatternKind::MissingParameter,
            r"^Procedure or function '[a-zA-Z_][a-zA-Z0-9_]*' expects parameter '@([a-zA-Z_][a-zA-Z0-9_]*)', which was not supplied\.$",
        ),
        ErrorPattern::new(
            PatternKind::UnknownParameter,
            r#"^The procedure "[a-zA-Z_][a-zA-Z0-9_]*" has no parameter named "@([a-zA-Z_][a-zA-Z0-9_]*)"\.$"#,
        ),
        ErrorPattern::new(
            PatternKind::UnknownParameter,
            r"^@([a-zA-Z_][a-zA-Z0-9_]*) is not a parameter for procedure [a-zA-Z_][a-zA-Z0-9_]*\.$",
        ),
        ErrorPattern::new(
            PatternKind::TooManyArguments,
            r"^Procedure or function [a-zA-Z_][a-zA-Z0-9_]* has too many arguments specified\.$",
        ),
    ]
});

/// The ordered pattern table
pub fn patterns() -> &'static [ErrorPattern] {
    &PATTERNS
}

/// First pattern matching `message`, with its captured parameter name
pub fn match_message(message: &str) -> Option<(PatternKind, String)> {
    patterns()
        .iter()
        .find_map(|p| p.extract(message).map(|name| (p.kind, name)))
}
