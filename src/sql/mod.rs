//! SQL generation module.
//!
//! The fluent engine never writes SQL text itself. Everything it records is
//! replayed into the AST here and serialized per dialect:
//!
//! - [`query`] - SELECT statement AST
//! - [`expr`] - Expression AST and comparison operators
//! - [`value`] - Values bound to named parameters
//! - [`token`] - Token types for SQL generation
//! - [`dialect`] - SQL dialect implementations

pub mod dialect;
pub mod expr;
pub mod query;
pub mod token;
pub mod value;

#[cfg(test)]
pub mod test_utils;

// Re-export commonly used types at the sql module level
pub use dialect::{Dialect, PlaceholderStyle, SqlDialect};
pub use expr::{
    col, column_ref, param, table_col, table_star, BinaryOperator, CompareOp, Expr, ExprExt,
    Literal,
};
pub use query::{
    Join, JoinType, LimitOffset, NullsOrder, OrderByExpr, Query, SelectExpr, SortDir, TableRef,
};
pub use token::{Token, TokenStream};
pub use value::Value;

/// Error raised while turning a token stream into executable SQL.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RenderError {
    #[error("Parameter :{0} is referenced but has no bound value")]
    UnboundParameter(String),
}
