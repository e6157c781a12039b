//! # Pull Reader
//!
//! Token stream over `serde_json`. Each root value is walked with a
//! visitor that records its tokens in document order, keeping duplicate
//! keys, and the reader hands them out one at a time. Syntax is validated by
//! the parser: a root with a syntax error yields no tokens at all. Several
//! roots in one input are read in turn; whether trailing roots are
//! acceptable is the caller's decision.

use std::collections::VecDeque;
use std::fmt;

use serde::de::{self, DeserializeSeed, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer};
use serde_json::de::SliceRead;
use serde_json::StreamDeserializer;

use super::date::normalize_date;
use super::errors::{TokenError, TokenResult};
use super::token::Token;

const BYTE_ORDER_MARK: &[u8] = b"\xEF\xBB\xBF";

/// Appends the tokens of one JSON value to a buffer
struct TokenSink<'b>(&'b mut Vec<Token>);

impl<'de, 'b> DeserializeSeed<'de> for TokenSink<'b> {
    type Value = ();

    fn deserialize<D>(self, deserializer: D) -> Result<(), D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(self)
    }
}

impl<'de, 'b> Visitor<'de> for TokenSink<'b> {
    type Value = ();

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a JSON value")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<(), E> {
        self.0.push(Token::Boolean(v));
        Ok(())
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<(), E> {
        self.0.push(Token::Integer(v));
        Ok(())
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<(), E> {
        // Past i64 the engine only has floats
        let token = i64::try_from(v)
            .map(Token::Integer)
            .unwrap_or(Token::Float(v as f64));
        self.0.push(token);
        Ok(())
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<(), E> {
        self.0.push(Token::Float(v));
        Ok(())
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<(), E> {
        let token = match normalize_date(v) {
            Some(date) => Token::Date(date),
            None => Token::String(v.to_string()),
        };
        self.0.push(token);
        Ok(())
    }

    fn visit_unit<E: de::Error>(self) -> Result<(), E> {
        self.0.push(Token::Null);
        Ok(())
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<(), A::Error>
    where
        A: SeqAccess<'de>,
    {
        let tokens = self.0;
        tokens.push(Token::StartArray);
        while seq.next_element_seed(TokenSink(&mut *tokens))?.is_some() {}
        tokens.push(Token::EndArray);
        Ok(())
    }

    fn visit_map<A>(self, mut map: A) -> Result<(), A::Error>
    where
        A: MapAccess<'de>,
    {
        let tokens = self.0;
        tokens.push(Token::StartObject);
        while let Some(key) = map.next_key::<String>()? {
            tokens.push(Token::PropertyName(key));
            map.next_value_seed(TokenSink(&mut *tokens))?;
        }
        tokens.push(Token::EndObject);
        Ok(())
    }
}

/// Tokens of one root value
struct RootTokens(Vec<Token>);

impl<'de> Deserialize<'de> for RootTokens {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let mut tokens = Vec::new();
        TokenSink(&mut tokens).deserialize(deserializer)?;
        Ok(RootTokens(tokens))
    }
}

/// Pull-based token reader over JSON text.
pub struct TokenReader<'a> {
    roots: StreamDeserializer<'a, SliceRead<'a>, RootTokens>,
    pending: VecDeque<Token>,
    failed: bool,
}

impl<'a> TokenReader<'a> {
    pub fn new(src: &'a str) -> Self {
        Self::from_bytes(src.as_bytes())
    }

    /// Reader over raw bytes; invalid UTF-8 surfaces as a token error
    pub fn from_bytes(bytes: &'a [u8]) -> Self {
        let bytes = bytes.strip_prefix(BYTE_ORDER_MARK).unwrap_or(bytes);
        Self {
            roots: serde_json::Deserializer::from_slice(bytes).into_iter(),
            pending: VecDeque::new(),
            failed: false,
        }
    }

    /// Read the next token.
    ///
    /// Returns `Ok(None)` only when the input is exhausted between root
    /// values. Running out of input inside a container is an error, and
    /// after an error the reader yields nothing more.
    pub fn next_token(&mut self) -> TokenResult<Option<Token>> {
        if let Some(token) = self.pending.pop_front() {
            return Ok(Some(token));
        }
        if self.failed {
            return Ok(None);
        }

        match self.roots.next() {
            None => Ok(None),
            Some(Ok(RootTokens(tokens))) => {
                self.pending.extend(tokens);
                Ok(self.pending.pop_front())
            }
            Some(Err(e)) => {
                self.failed = true;
                Err(TokenError::from(e))
            }
        }
    }
}
