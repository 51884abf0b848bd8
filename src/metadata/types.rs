//! Entity and relation descriptors.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use inflector::Inflector;
use serde::{Deserialize, Serialize};

use crate::fluent::FluentQuery;
use crate::sql::Value;

/// A reusable query fragment declared on an entity.
///
/// Scopes receive the live query, already addressed at the alias the scope
/// was invoked on, plus the caller's arguments.
pub type ScopeFn = Arc<dyn Fn(&mut FluentQuery, &[Value]) + Send + Sync>;

/// Cardinality of a relation, seen from the entity that declares it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RelationKind {
    OneToOne,
    ManyToOne,
    OneToMany,
    ManyToMany,
}

/// Columns used in the join condition `child.foreign = parent.local`.
///
/// A missing column means the primary key of the respective entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinColumns {
    #[serde(default)]
    pub local: Option<String>,
    #[serde(default)]
    pub foreign: Option<String>,
}

/// Link table for a many-to-many relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Junction {
    pub table: String,
    /// Junction column pointing at the declaring entity.
    pub source_column: String,
    /// Junction column pointing at the target entity.
    pub target_column: String,
}

/// A named relation from one entity to another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationDescriptor {
    pub name: String,
    pub target: String,
    pub kind: RelationKind,
    #[serde(default)]
    pub join: JoinColumns,
    #[serde(default)]
    pub junction: Option<Junction>,
}

impl RelationDescriptor {
    /// The target table holds `foreign_column` pointing at our primary key.
    pub fn one_to_many(name: &str, target: &str, foreign_column: &str) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
            kind: RelationKind::OneToMany,
            join: JoinColumns {
                local: None,
                foreign: Some(foreign_column.into()),
            },
            junction: None,
        }
    }

    /// We hold `local_column` pointing at the target's primary key.
    pub fn many_to_one(name: &str, target: &str, local_column: &str) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
            kind: RelationKind::ManyToOne,
            join: JoinColumns {
                local: Some(local_column.into()),
                foreign: None,
            },
            junction: None,
        }
    }

    pub fn one_to_one(name: &str, target: &str, join: JoinColumns) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
            kind: RelationKind::OneToOne,
            join,
            junction: None,
        }
    }

    pub fn many_to_many(name: &str, target: &str, junction: Junction) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
            kind: RelationKind::ManyToMany,
            join: JoinColumns::default(),
            junction: Some(junction),
        }
    }
}

/// Everything the engine needs to know about one entity.
#[derive(Clone)]
#[must_use = "builders have no effect until registered in a Catalog"]
pub struct EntityMetadata {
    pub name: String,
    pub table: String,
    pub schema: Option<String>,
    pub primary_key: String,
    pub columns: Vec<String>,
    pub relations: BTreeMap<String, RelationDescriptor>,
    pub scopes: BTreeMap<String, ScopeFn>,
}

impl EntityMetadata {
    /// New entity with the conventional table name and an `id` primary key.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.into(),
            table: default_table_name(name),
            schema: None,
            primary_key: "id".into(),
            columns: Vec::new(),
            relations: BTreeMap::new(),
            scopes: BTreeMap::new(),
        }
    }

    pub fn table(mut self, table: &str) -> Self {
        self.table = table.into();
        self
    }

    pub fn schema(mut self, schema: &str) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn primary_key(mut self, column: &str) -> Self {
        self.primary_key = column.into();
        self
    }

    pub fn columns(mut self, columns: &[&str]) -> Self {
        self.columns = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn relation(mut self, relation: RelationDescriptor) -> Self {
        self.relations.insert(relation.name.clone(), relation);
        self
    }

    pub fn scope<F>(mut self, name: &str, f: F) -> Self
    where
        F: Fn(&mut FluentQuery, &[Value]) + Send + Sync + 'static,
    {
        self.scopes.insert(name.into(), Arc::new(f));
        self
    }

    pub fn get_relation(&self, name: &str) -> Option<&RelationDescriptor> {
        self.relations.get(name)
    }

    pub fn get_scope(&self, name: &str) -> Option<ScopeFn> {
        self.scopes.get(name).cloned()
    }
}

impl fmt::Debug for EntityMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityMetadata")
            .field("name", &self.name)
            .field("table", &self.table)
            .field("schema", &self.schema)
            .field("primary_key", &self.primary_key)
            .field("columns", &self.columns)
            .field("relations", &self.relations)
            .field("scopes", &self.scopes.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// `OrderItem` -> `order_items`.
pub fn default_table_name(entity: &str) -> String {
    entity.to_snake_case().to_plural()
}
