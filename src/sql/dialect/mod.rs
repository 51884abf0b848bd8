//! SQL Dialect definitions and formatting rules.
//!
//! Each dialect implements `SqlDialect` to handle the syntax differences the
//! query engine actually hits:
//!
//! - Identifier quoting: bare (Generic), `"` (PostgreSQL/SQLite), `` ` `` (MySQL)
//! - Bound parameter placeholders: `:name`, `$n`, `?`
//! - NULLS FIRST/LAST support in ORDER BY
//! - LIMIT/OFFSET pagination
//!
//! # Usage
//!
//! ```ignore
//! use quill::sql::dialect::{Dialect, SqlDialect};
//!
//! let dialect = Dialect::Postgres;
//! let quoted = dialect.quote_identifier("user");  // "user"
//! let p = dialect.placeholder(1, "p0");           // $1
//! ```
//!
//! | Feature | Generic | PostgreSQL | MySQL | SQLite |
//! |---------|---------|------------|-------|--------|
//! | Placeholder | `:p0` | `$1` | `?` | `?` |
//! | NULLS FIRST/LAST | ✓ | ✓ | ❌ | 3.30+ |
//! | ILIKE | ✓ | ✓ | ❌ | ❌ |

mod generic;
pub mod helpers;
mod mysql;
mod postgres;
mod sqlite;

pub use generic::Generic;
pub use mysql::MySql;
pub use postgres::Postgres;
pub use sqlite::Sqlite;

use serde::{Deserialize, Serialize};

use super::token::TokenStream;

/// How bound parameters are written into rendered SQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderStyle {
    /// `:name`, keeps the engine's parameter names.
    Named,
    /// `$1`, `$2`, … in order of appearance.
    Dollar,
    /// `?` for every parameter, bound in order of appearance.
    Question,
}

/// SQL dialect trait - defines how SQL constructs are rendered.
///
/// The default implementations follow ANSI SQL where possible.
pub trait SqlDialect: std::fmt::Debug {
    /// Dialect name for display/logging.
    fn name(&self) -> &'static str;

    // =========================================================================
    // Identifier and Literal Quoting
    // =========================================================================

    /// Quote an identifier (table, column, alias).
    fn quote_identifier(&self, ident: &str) -> String;

    /// Quote a string literal.
    fn quote_string(&self, s: &str) -> String {
        helpers::quote_string_single(s)
    }

    /// Format a boolean literal.
    fn format_bool(&self, b: bool) -> &'static str;

    /// Format a NULL literal.
    fn format_null(&self) -> &'static str {
        "NULL"
    }

    // =========================================================================
    // Parameters
    // =========================================================================

    /// Placeholder style used when a query is prepared for execution.
    fn placeholder_style(&self) -> PlaceholderStyle;

    /// Render the placeholder for the parameter at 1-based `position`.
    fn placeholder(&self, position: usize, name: &str) -> String {
        match self.placeholder_style() {
            PlaceholderStyle::Named => format!(":{}", name),
            PlaceholderStyle::Dollar => format!("${}", position),
            PlaceholderStyle::Question => "?".into(),
        }
    }

    // =========================================================================
    // Pagination
    // =========================================================================

    /// Emit LIMIT/OFFSET or equivalent pagination clause.
    fn emit_limit_offset(&self, limit: Option<u64>, offset: Option<u64>) -> TokenStream {
        helpers::emit_limit_offset_standard(limit, offset)
    }

    // =========================================================================
    // Ordering / Operators
    // =========================================================================

    /// Whether this dialect supports NULLS FIRST/LAST in ORDER BY.
    fn supports_nulls_ordering(&self) -> bool {
        true
    }

    /// Whether `ILIKE` is available as an operator.
    fn supports_ilike(&self) -> bool {
        false
    }
}

/// Supported SQL dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[default]
    Generic,
    #[serde(alias = "postgresql", alias = "pg")]
    Postgres,
    #[serde(alias = "mariadb")]
    MySql,
    Sqlite,
}

impl Dialect {
    /// Get the dialect implementation.
    pub fn dialect(&self) -> &'static dyn SqlDialect {
        match self {
            Dialect::Generic => &Generic,
            Dialect::Postgres => &Postgres,
            Dialect::MySql => &MySql,
            Dialect::Sqlite => &Sqlite,
        }
    }
}

// Implement SqlDialect for Dialect enum by delegating to concrete types
impl SqlDialect for Dialect {
    fn name(&self) -> &'static str {
        self.dialect().name()
    }

    fn quote_identifier(&self, ident: &str) -> String {
        self.dialect().quote_identifier(ident)
    }

    fn quote_string(&self, s: &str) -> String {
        self.dialect().quote_string(s)
    }

    fn format_bool(&self, b: bool) -> &'static str {
        self.dialect().format_bool(b)
    }

    fn format_null(&self) -> &'static str {
        self.dialect().format_null()
    }

    fn placeholder_style(&self) -> PlaceholderStyle {
        self.dialect().placeholder_style()
    }

    fn placeholder(&self, position: usize, name: &str) -> String {
        self.dialect().placeholder(position, name)
    }

    fn emit_limit_offset(&self, limit: Option<u64>, offset: Option<u64>) -> TokenStream {
        self.dialect().emit_limit_offset(limit, offset)
    }

    fn supports_nulls_ordering(&self) -> bool {
        self.dialect().supports_nulls_ordering()
    }

    fn supports_ilike(&self) -> bool {
        self.dialect().supports_ilike()
    }
}

impl std::str::FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "generic" => Ok(Dialect::Generic),
            "postgres" | "postgresql" | "pg" => Ok(Dialect::Postgres),
            "mysql" | "mariadb" => Ok(Dialect::MySql),
            "sqlite" => Ok(Dialect::Sqlite),
            other => Err(format!("unknown dialect: {}", other)),
        }
    }
}
