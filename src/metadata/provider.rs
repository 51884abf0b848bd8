//! MetadataProvider trait definition.
//!
//! The engine resolves relation names while a chain is being built, which is
//! synchronous, so lookups here are plain borrows of already-loaded metadata.

use super::types::{EntityMetadata, RelationDescriptor};

/// Source of entity and relation metadata.
///
/// # Example
///
/// ```ignore
/// use quill::metadata::{Catalog, MetadataProvider};
///
/// fn relations_of(provider: &dyn MetadataProvider) -> Vec<String> {
///     provider
///         .relations("User")
///         .into_iter()
///         .map(|r| r.name)
///         .collect()
/// }
/// ```
pub trait MetadataProvider: Send + Sync {
    /// Look up an entity by name.
    fn entity(&self, name: &str) -> Option<&EntityMetadata>;

    /// Look up one relation declared on an entity.
    fn relation(&self, entity: &str, relation: &str) -> Option<&RelationDescriptor> {
        self.entity(entity)?.get_relation(relation)
    }

    /// All relations declared on an entity. Empty for unknown entities.
    fn relations(&self, entity: &str) -> Vec<RelationDescriptor> {
        self.entity(entity)
            .map(|e| e.relations.values().cloned().collect())
            .unwrap_or_default()
    }
}
