//! SQLite SQL dialect.
//!
//! SQLite differences from ANSI:
//! - Double-quote identifier quoting
//! - Booleans stored as 1/0
//! - `?` positional parameters
//! - OFFSET requires a LIMIT (`LIMIT -1` means unbounded)

use super::helpers;
use super::{PlaceholderStyle, SqlDialect};
use crate::sql::token::{Token, TokenStream};

/// SQLite SQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct Sqlite;

impl SqlDialect for Sqlite {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_double(ident)
    }

    fn format_bool(&self, b: bool) -> &'static str {
        helpers::format_bool_numeric(b)
    }

    fn placeholder_style(&self) -> PlaceholderStyle {
        PlaceholderStyle::Question
    }

    fn emit_limit_offset(&self, limit: Option<u64>, offset: Option<u64>) -> TokenStream {
        match (limit, offset) {
            (None, Some(off)) => {
                let mut ts = TokenStream::new();
                ts.push(Token::Limit)
                    .space()
                    .push(Token::LitInt(-1))
                    .space()
                    .push(Token::Offset)
                    .space()
                    .push(Token::LitInt(off as i64));
                ts
            }
            _ => helpers::emit_limit_offset_standard(limit, offset),
        }
    }
}
