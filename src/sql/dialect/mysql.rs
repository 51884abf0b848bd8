//! MySQL SQL dialect.
//!
//! MySQL differences from ANSI:
//! - Backtick identifier quoting (`` `name` ``)
//! - Boolean is TINYINT(1), returns 1/0
//! - `?` positional parameters
//! - OFFSET requires a LIMIT
//! - No NULLS FIRST/LAST

use super::helpers;
use super::{PlaceholderStyle, SqlDialect};
use crate::sql::token::TokenStream;

/// LIMIT used when only an offset is given (fits the i64 literal token).
const MAX_LIMIT: u64 = i64::MAX as u64;

/// MySQL SQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct MySql;

impl SqlDialect for MySql {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_backtick(ident)
    }

    fn format_bool(&self, b: bool) -> &'static str {
        helpers::format_bool_numeric(b)
    }

    fn placeholder_style(&self) -> PlaceholderStyle {
        PlaceholderStyle::Question
    }

    fn emit_limit_offset(&self, limit: Option<u64>, offset: Option<u64>) -> TokenStream {
        helpers::emit_limit_offset_required_limit(limit, offset, MAX_LIMIT)
    }

    fn supports_nulls_ordering(&self) -> bool {
        false
    }
}
