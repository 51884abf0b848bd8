//! Execution seam.
//!
//! A [`Session`] runs prepared SQL and hands back [`Row`]s. Hosts implement it
//! over their own connection or pool; [`MemorySession`] serves canned rows.

mod memory;
mod row;

pub use memory::{Executed, MemorySession};
pub use row::Row;

use async_trait::async_trait;

use crate::sql::Value;

/// Error type for statement execution.
///
/// These are returned unchanged from the engine's fetch operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SessionError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("SQL error: {0}")]
    Sql(String),

    #[error("Constraint violated: {0}")]
    Constraint(String),

    #[error("Failed to decode row: {0}")]
    Decode(String),

    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for SessionError {
    fn from(err: serde_json::Error) -> Self {
        SessionError::Decode(err.to_string())
    }
}

/// Something that can execute a SELECT with positional parameters.
#[async_trait]
pub trait Session: Send + Sync {
    /// Execute and return every row.
    async fn fetch_all(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>, SessionError>;

    /// Execute and return the first row, if any.
    async fn fetch_optional(
        &self,
        sql: &str,
        params: &[Value],
    ) -> Result<Option<Row>, SessionError> {
        Ok(self.fetch_all(sql, params).await?.into_iter().next())
    }
}
