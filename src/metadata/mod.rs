//! Entity metadata.
//!
//! The engine asks a [`MetadataProvider`] which relations an entity declares,
//! what entity each relation leads to, and which scopes it offers. [`Catalog`]
//! is the in-memory provider used by tests and by hosts without their own
//! mapping layer.

mod catalog;
mod provider;
mod types;

pub use catalog::{Catalog, CatalogError};
pub use provider::MetadataProvider;
pub use types::{
    default_table_name, EntityMetadata, JoinColumns, Junction, RelationDescriptor, RelationKind,
    ScopeFn,
};
