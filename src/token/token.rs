//! # Tokens
//!
//! The token vocabulary produced by [`TokenReader`](super::TokenReader).

use std::fmt;

/// A single JSON token.
///
/// `Date` carries text already normalized to the round-trip form, see
/// [`normalize_date`](super::normalize_date).
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    StartObject,
    EndObject,
    StartArray,
    EndArray,
    PropertyName(String),
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Null,
    Date(String),
}

impl Token {
    /// The kind of this token, without its payload
    pub fn kind(&self) -> TokenKind {
        match self {
            Token::StartObject => TokenKind::StartObject,
            Token::EndObject => TokenKind::EndObject,
            Token::StartArray => TokenKind::StartArray,
            Token::EndArray => TokenKind::EndArray,
            Token::PropertyName(_) => TokenKind::PropertyName,
            Token::String(_) => TokenKind::String,
            Token::Integer(_) => TokenKind::Integer,
            Token::Float(_) => TokenKind::Float,
            Token::Boolean(_) => TokenKind::Boolean,
            Token::Null => TokenKind::Null,
            Token::Date(_) => TokenKind::Date,
        }
    }
}

/// Payload-free token classification.
///
/// The display names appear verbatim in user-facing error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    StartObject,
    EndObject,
    StartArray,
    EndArray,
    PropertyName,
    String,
    Integer,
    Float,
    Boolean,
    Null,
    Date,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::StartObject => "StartObject",
            TokenKind::EndObject => "EndObject",
            TokenKind::StartArray => "StartArray",
            TokenKind::EndArray => "EndArray",
            TokenKind::PropertyName => "PropertyName",
            TokenKind::String => "String",
            TokenKind::Integer => "Integer",
            TokenKind::Float => "Float",
            TokenKind::Boolean => "Boolean",
            TokenKind::Null => "Null",
            TokenKind::Date => "Date",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_matches_payload() {
        assert_eq!(Token::PropertyName("a".into()).kind(), TokenKind::PropertyName);
        assert_eq!(Token::Date("x".into()).kind(), TokenKind::Date);
        assert_eq!(Token::Float(1.5).kind(), TokenKind::Float);
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(TokenKind::StartObject.to_string(), "StartObject");
        assert_eq!(TokenKind::Boolean.to_string(), "Boolean");
    }
}
