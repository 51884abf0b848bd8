//! # Quill
//!
//! A fluent query engine that turns chains of field and relation names into
//! SQL, tracking table aliases across joins.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │            FluentQuery (name classification)             │
//! │   methods / relation traversal / fields / scopes         │
//! └─────────────────────────────────────────────────────────┘
//!            │                               │
//!            ▼ [metadata]                    ▼ [builder]
//! ┌──────────────────────────┐   ┌──────────────────────────┐
//! │  Catalog / Provider      │   │  QueryBuilder            │
//! │  entities, relations,    │   │  clauses, joins, params  │
//! │  scopes                  │   │                          │
//! └──────────────────────────┘   └──────────────────────────┘
//!                                            │
//!                                            ▼ [sql]
//! ┌─────────────────────────────────────────────────────────┐
//! │          Query AST -> TokenStream -> dialect SQL         │
//! └─────────────────────────────────────────────────────────┘
//!                                            │
//!                                            ▼ [session]
//! ┌─────────────────────────────────────────────────────────┐
//! │                  Rows (async fetch)                      │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod builder;
pub mod config;
pub mod fluent;
pub mod metadata;
pub mod session;
pub mod sql;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::builder::{
        BuildError, ClauseFamily, JoinKind, Link, OrderEntry, QueryBuilder, SelectBuilder,
    };
    pub use crate::config::{QueryOptions, Settings, SettingsError};
    pub use crate::fluent::{Access, FluentQuery, Method, OperationMode, QueryError};
    pub use crate::metadata::{
        Catalog, EntityMetadata, JoinColumns, Junction, MetadataProvider, RelationDescriptor,
        RelationKind,
    };
    pub use crate::session::{MemorySession, Row, Session, SessionError};
    pub use crate::sql::{CompareOp, Dialect, NullsOrder, SortDir, Value};
}
