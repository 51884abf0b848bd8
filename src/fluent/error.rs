//! Engine errors.

use crate::builder::BuildError;
use crate::session::SessionError;

use super::dispatch::{Method, OperationMode};

/// Error type for the fluent engine.
///
/// Unmodeled accesses and sequence misuse only become errors in strict mode,
/// where the first one is recorded and returned by the next terminal call.
/// Execution failures always propagate unchanged as [`QueryError::Session`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QueryError {
    #[error("{name:?} means nothing in {mode} mode")]
    UnmodeledAccess { name: String, mode: OperationMode },

    #[error("Entity behind alias {alias} has no relation {relation}")]
    UnknownRelation { alias: String, relation: String },

    #[error("Unknown entity: {0}")]
    UnknownEntity(String),

    #[error("Unknown comparison operator: {0}")]
    UnknownOperator(String),

    #[error("Invalid sort direction: {0}")]
    InvalidDirection(String),

    #[error("Invalid nulls ordering: {0}")]
    InvalidNullsOrder(String),

    #[error("Misuse: {0}")]
    Misuse(String),

    #[error("{0} takes a callback and cannot be invoked by name")]
    RequiresCallback(Method),

    #[error("{0} returns a value and cannot be chained by name")]
    NotChainable(Method),

    #[error(transparent)]
    Build(BuildError),

    #[error(transparent)]
    Session(SessionError),
}

impl From<BuildError> for QueryError {
    fn from(err: BuildError) -> Self {
        match err {
            BuildError::Session(e) => QueryError::Session(e),
            BuildError::UnknownEntity(e) => QueryError::UnknownEntity(e),
            other => QueryError::Build(other),
        }
    }
}

impl From<SessionError> for QueryError {
    fn from(err: SessionError) -> Self {
        QueryError::Session(err)
    }
}
