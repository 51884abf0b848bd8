//! In-memory metadata catalog.
//!
//! Entities are registered fluently in code or loaded from TOML:
//!
//! ```toml
//! [[entity]]
//! name = "User"
//! columns = ["id", "name"]
//!
//! [[entity.relation]]
//! name = "orders"
//! target = "Order"
//! kind = "one-to-many"
//! join = { foreign = "user_id" }
//! ```
//!
//! Scopes are closures and can only be attached in code.

use std::collections::HashMap;

use serde::Deserialize;

use super::provider::MetadataProvider;
use super::types::{EntityMetadata, RelationDescriptor};

/// Error type for catalog loading.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Failed to parse entity definitions: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Entity {entity} declares relation {relation} to unknown entity {target}")]
    DanglingRelation {
        entity: String,
        relation: String,
        target: String,
    },
}

/// A set of entities keyed by name.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entities: HashMap<String, EntityMetadata>,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default, rename = "entity")]
    entities: Vec<EntityDef>,
}

#[derive(Debug, Deserialize)]
struct EntityDef {
    name: String,
    table: Option<String>,
    schema: Option<String>,
    primary_key: Option<String>,
    #[serde(default)]
    columns: Vec<String>,
    #[serde(default, rename = "relation")]
    relations: Vec<RelationDescriptor>,
}

impl From<EntityDef> for EntityMetadata {
    fn from(def: EntityDef) -> Self {
        let mut meta = EntityMetadata::new(&def.name);
        if let Some(table) = def.table {
            meta.table = table;
        }
        meta.schema = def.schema;
        if let Some(pk) = def.primary_key {
            meta.primary_key = pk;
        }
        meta.columns = def.columns;
        for rel in def.relations {
            meta.relations.insert(rel.name.clone(), rel);
        }
        meta
    }
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entity, replacing any entity of the same name.
    pub fn entity(mut self, meta: EntityMetadata) -> Self {
        self.insert(meta);
        self
    }

    pub fn insert(&mut self, meta: EntityMetadata) {
        self.entities.insert(meta.name.clone(), meta);
    }

    pub fn get(&self, name: &str) -> Option<&EntityMetadata> {
        self.entities.get(name)
    }

    /// Mutable access, e.g. to attach scopes to entities loaded from TOML.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut EntityMetadata> {
        self.entities.get_mut(name)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Parse `[[entity]]` tables from a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = toml::from_str(content)?;
        let mut catalog = Catalog::new();
        for def in file.entities {
            catalog.insert(def.into());
        }
        catalog.validate()?;
        Ok(catalog)
    }

    /// Check that every relation points at a registered entity.
    pub fn validate(&self) -> Result<(), CatalogError> {
        for entity in self.entities.values() {
            for rel in entity.relations.values() {
                if !self.entities.contains_key(&rel.target) {
                    return Err(CatalogError::DanglingRelation {
                        entity: entity.name.clone(),
                        relation: rel.name.clone(),
                        target: rel.target.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

impl MetadataProvider for Catalog {
    fn entity(&self, name: &str) -> Option<&EntityMetadata> {
        self.get(name)
    }
}
