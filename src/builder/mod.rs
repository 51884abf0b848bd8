//! Query-builder seam.
//!
//! The fluent engine never renders SQL itself. It records clauses into a
//! [`QueryBuilder`] using alias-qualified column references (`t1.amount`) and
//! relation paths (`t0.orders`), then asks the builder to render or execute.
//! [`SelectBuilder`] is the reference implementation over the `sql` AST.

mod select;

pub use select::SelectBuilder;

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::session::{Row, SessionError};
use crate::sql::{Dialect, Expr, NullsOrder, RenderError, SortDir, Value};

/// Error type for rendering and executing a built query.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BuildError {
    #[error("Unknown entity: {0}")]
    UnknownEntity(String),

    #[error("Alias {0} is not part of this query")]
    UnknownAlias(String),

    #[error("Entity behind alias {alias} has no relation {relation}")]
    UnknownRelation { alias: String, relation: String },

    #[error("Invalid relation path {0:?}, expected alias.relation")]
    InvalidRelationPath(String),

    #[error("No session attached to the query builder")]
    NoSession,

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Which condition slot a clause lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClauseFamily {
    Where,
    Having,
}

/// How a condition combines with what the slot already holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Link {
    /// Replace the slot.
    Replace,
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
}

/// One ORDER BY entry, either the bare direction or direction plus nulls
/// placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderEntry {
    Direction(SortDir),
    Detailed { dir: SortDir, nulls: NullsOrder },
}

impl Default for OrderEntry {
    fn default() -> Self {
        OrderEntry::Direction(SortDir::Asc)
    }
}

impl OrderEntry {
    /// Build the most compact form: without nulls placement this is the
    /// shorthand `Direction`.
    pub fn new(dir: SortDir, nulls: Option<NullsOrder>) -> Self {
        match nulls {
            Some(nulls) => OrderEntry::Detailed { dir, nulls },
            None => OrderEntry::Direction(dir),
        }
    }

    pub fn dir(&self) -> SortDir {
        match self {
            OrderEntry::Direction(dir) | OrderEntry::Detailed { dir, .. } => *dir,
        }
    }

    pub fn nulls(&self) -> Option<NullsOrder> {
        match self {
            OrderEntry::Direction(_) => None,
            OrderEntry::Detailed { nulls, .. } => Some(*nulls),
        }
    }

    #[must_use]
    pub fn with_dir(self, dir: SortDir) -> Self {
        OrderEntry::new(dir, self.nulls())
    }

    #[must_use]
    pub fn with_nulls(self, nulls: NullsOrder) -> Self {
        OrderEntry::new(self.dir(), Some(nulls))
    }
}

/// Incremental SELECT builder the fluent engine drives.
///
/// Column arguments are alias-qualified (`t0.name`). Relation paths are
/// `parentAlias.relation`. The trait is object safe; the engine holds a
/// `Box<dyn QueryBuilder>`.
#[async_trait]
pub trait QueryBuilder: Send + Sync {
    fn root_alias(&self) -> &str;

    fn root_entity(&self) -> &str;

    fn dialect(&self) -> Dialect;

    /// Replace the selection with one column.
    fn select(&mut self, column: &str);

    fn add_select(&mut self, column: &str);

    /// Put a condition into the WHERE or HAVING slot.
    fn condition(&mut self, family: ClauseFamily, link: Link, condition: Expr);

    fn set_parameter(&mut self, name: &str, value: Value);

    fn parameters(&self) -> &BTreeMap<String, Value>;

    fn join(&mut self, kind: JoinKind, with_select: bool, relation_path: &str, alias: &str);

    /// Replace the ordering with one entry.
    fn order_by(&mut self, column: &str, entry: OrderEntry);

    fn add_order_by(&mut self, column: &str, entry: OrderEntry);

    fn order_entry(&self, column: &str) -> Option<OrderEntry>;

    /// Overwrite an existing entry in place. Returns false if the column is
    /// not ordered on.
    fn set_order_entry(&mut self, column: &str, entry: OrderEntry) -> bool;

    fn group_by(&mut self, column: &str);

    fn add_group_by(&mut self, column: &str);

    fn limit(&mut self, limit: Option<u64>);

    fn offset(&mut self, offset: Option<u64>);

    /// Render with named parameters (`:p0`).
    fn get_sql(&self) -> Result<String, BuildError>;

    /// Render with the dialect's placeholders and the values in order.
    fn get_query_and_parameters(&self) -> Result<(String, Vec<Value>), BuildError>;

    async fn fetch_one(&self) -> Result<Option<Row>, BuildError>;

    async fn fetch_many(&self) -> Result<Vec<Row>, BuildError>;
}
