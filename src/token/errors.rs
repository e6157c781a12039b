//! # Tokenizer Errors

use thiserror::Error;

/// Result type for tokenizer operations
pub type TokenResult<T> = Result<T, TokenError>;

/// Syntax errors raised by the JSON parser under the token stream.
///
/// Display carries the parser's message with its 1-based line and column.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct TokenError(#[from] serde_json::Error);

impl TokenError {
    pub fn line(&self) -> usize {
        self.0.line()
    }

    pub fn column(&self) -> usize {
        self.0.column()
    }

    /// The input ended inside a value
    pub fn is_eof(&self) -> bool {
        self.0.is_eof()
    }
}
