//! # Token Stream
//!
//! Pull-based JSON token stream feeding the parameter binder, driven by
//! `serde_json`. Tokens are read one at a time so the binder can enforce
//! shape rules, and see duplicate keys, in document order.

mod date;
pub mod errors;
mod reader;
mod token;

pub use date::normalize_date;
pub use errors::{TokenError, TokenResult};
pub use reader::TokenReader;
pub use token::{Token, TokenKind};
