//! Generic SQL dialect - the engine's default rendering.
//!
//! Produces readable SQL for diagnostics and tests:
//! - Plain identifiers are left bare (`t0.amount`), others double-quoted
//! - Named placeholders are kept (`:p0`)
//! - LIMIT ... OFFSET ... pagination

use super::helpers;
use super::{PlaceholderStyle, SqlDialect};

/// Generic SQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct Generic;

impl SqlDialect for Generic {
    fn name(&self) -> &'static str {
        "generic"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_if_needed(ident)
    }

    fn format_bool(&self, b: bool) -> &'static str {
        helpers::format_bool_literal(b)
    }

    fn placeholder_style(&self) -> PlaceholderStyle {
        PlaceholderStyle::Named
    }

    fn supports_ilike(&self) -> bool {
        true
    }
}
