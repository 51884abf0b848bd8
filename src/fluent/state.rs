//! Per-query bookkeeping: aliases, relation descriptors, emitted joins and
//! the traversal cursor.

use std::collections::{BTreeSet, HashMap};

use crate::builder::ClauseFamily;
use crate::config::QueryOptions;
use crate::metadata::{MetadataProvider, RelationDescriptor};

use super::dispatch::OperationMode;
use super::error::QueryError;

/// Left-hand side of a where/having comparison waiting for its right-hand
/// field.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingComparison {
    pub field: String,
    pub operator: String,
}

/// Everything a single query remembers between chain calls.
///
/// Owned exclusively by one `FluentQuery`; nothing here is shared.
#[derive(Debug, Clone)]
pub struct QueryState {
    /// alias -> (relation -> child alias)
    pub(crate) alias_table: HashMap<String, HashMap<String, String>>,
    /// alias -> (relation -> descriptor), loaded on first visit
    pub(crate) relation_catalog: HashMap<String, HashMap<String, RelationDescriptor>>,
    /// alias -> entity name
    pub(crate) alias_entities: HashMap<String, String>,
    /// `parentAlias.relation` keys already handed to the builder
    pub(crate) join_ledger: BTreeSet<String>,

    pub(crate) mode: OperationMode,
    pub(crate) current_alias: String,
    pub(crate) relations_queue: Vec<String>,
    pub(crate) alias_queue: Vec<String>,
    /// Alias the current traversal started from.
    pub(crate) path_start: String,
    /// Bottom element is the root and is never popped.
    pub(crate) anchors: Vec<String>,
    /// Set by a relation traversal, cleared by anything else.
    pub(crate) just_traversed: bool,

    pub(crate) pending: Option<PendingComparison>,
    pub(crate) last_family: Option<ClauseFamily>,
    pub(crate) last_order_by: Option<String>,

    pub(crate) alias_counter: usize,
    pub(crate) param_counter: usize,
    pub(crate) alias_prefix: String,
    pub(crate) parameter_prefix: String,

    /// First strict-mode error, reported by the next terminal call.
    pub(crate) error: Option<QueryError>,
}

impl QueryState {
    /// Register the root alias and load its relations.
    pub fn new(provider: &dyn MetadataProvider, entity: &str, options: &QueryOptions) -> Self {
        let root = options.root_alias.clone();
        let mut state = Self {
            alias_table: HashMap::new(),
            relation_catalog: HashMap::new(),
            alias_entities: HashMap::new(),
            join_ledger: BTreeSet::new(),
            mode: OperationMode::None,
            current_alias: root.clone(),
            relations_queue: Vec::new(),
            alias_queue: Vec::new(),
            path_start: root.clone(),
            anchors: vec![root.clone()],
            just_traversed: false,
            pending: None,
            last_family: None,
            last_order_by: None,
            alias_counter: 0,
            param_counter: 0,
            alias_prefix: options.alias_prefix.clone(),
            parameter_prefix: options.parameter_prefix.clone(),
            error: None,
        };
        state.register_alias(provider, &root, entity);
        state
    }

    /// Bind `alias` to `entity` and cache the entity's relations under it.
    pub(crate) fn register_alias(
        &mut self,
        provider: &dyn MetadataProvider,
        alias: &str,
        entity: &str,
    ) {
        self.alias_table.entry(alias.to_string()).or_default();
        self.alias_entities
            .insert(alias.to_string(), entity.to_string());
        let relations = provider
            .relations(entity)
            .into_iter()
            .map(|r| (r.name.clone(), r))
            .collect();
        self.relation_catalog.insert(alias.to_string(), relations);
    }

    pub fn root_alias(&self) -> &str {
        &self.anchors[0]
    }

    pub fn current_alias(&self) -> &str {
        &self.current_alias
    }

    pub fn anchor(&self) -> &str {
        self.anchors.last().map(String::as_str).unwrap_or(&self.current_alias)
    }

    pub fn mode(&self) -> OperationMode {
        self.mode
    }

    pub fn pending(&self) -> Option<&PendingComparison> {
        self.pending.as_ref()
    }

    pub fn last_order_by(&self) -> Option<&str> {
        self.last_order_by.as_deref()
    }

    /// Every known alias, sorted.
    pub fn aliases(&self) -> Vec<&str> {
        let mut aliases: Vec<&str> = self.alias_table.keys().map(String::as_str).collect();
        aliases.sort_unstable();
        aliases
    }

    pub fn has_alias(&self, alias: &str) -> bool {
        self.alias_table.contains_key(alias)
            || self.relation_catalog.contains_key(alias)
            || self.alias_entities.contains_key(alias)
    }

    /// Child alias already assigned to `parent.relation`.
    pub fn child_alias(&self, parent: &str, relation: &str) -> Option<&str> {
        self.alias_table
            .get(parent)?
            .get(relation)
            .map(String::as_str)
    }

    pub fn entity_of(&self, alias: &str) -> Option<&str> {
        self.alias_entities.get(alias).map(String::as_str)
    }

    pub fn relation(&self, alias: &str, relation: &str) -> Option<&RelationDescriptor> {
        self.relation_catalog.get(alias)?.get(relation)
    }

    pub fn is_joined(&self, key: &str) -> bool {
        self.join_ledger.contains(key)
    }

    pub fn error(&self) -> Option<&QueryError> {
        self.error.as_ref()
    }

    /// `alias.column`
    pub(crate) fn aliased(&self, column: &str) -> String {
        format!("{}.{}", self.current_alias, column)
    }

    /// Next unused alias. The counter only moves forward.
    pub(crate) fn next_alias(&mut self) -> String {
        loop {
            self.alias_counter += 1;
            let candidate = format!("{}{}", self.alias_prefix, self.alias_counter);
            if !self.has_alias(&candidate) {
                return candidate;
            }
        }
    }

    pub(crate) fn next_param(&mut self) -> String {
        let name = format!("{}{}", self.parameter_prefix, self.param_counter);
        self.param_counter += 1;
        name
    }

    /// Follow `relation` from the current alias, allocating a child alias on
    /// first use. Returns the child alias, or `None` if the current entity has
    /// no such relation.
    pub(crate) fn traverse(
        &mut self,
        provider: &dyn MetadataProvider,
        relation: &str,
    ) -> Option<String> {
        let parent = self.current_alias.clone();
        let target = self.relation(&parent, relation)?.target.clone();

        let child = match self.child_alias(&parent, relation) {
            Some(existing) => existing.to_string(),
            None => {
                let child = self.next_alias();
                self.alias_table
                    .entry(parent.clone())
                    .or_default()
                    .insert(relation.to_string(), child.clone());
                self.register_alias(provider, &child, &target);
                tracing::debug!(parent = %parent, relation, alias = %child, "Allocated alias");
                child
            }
        };

        if self.relations_queue.is_empty() {
            self.path_start = parent;
        }
        self.relations_queue.push(relation.to_string());
        self.alias_queue.push(child.clone());
        self.current_alias = child.clone();
        self.just_traversed = true;
        Some(child)
    }

    /// `(parentAlias.relation, alias)` for every queued hop, in order.
    pub(crate) fn queued_hops(&self) -> Vec<(String, String)> {
        let mut parent = self.path_start.as_str();
        let mut hops = Vec::with_capacity(self.relations_queue.len());
        for (relation, alias) in self.relations_queue.iter().zip(&self.alias_queue) {
            hops.push((format!("{}.{}", parent, relation), alias.clone()));
            parent = alias;
        }
        hops
    }

    /// Rename the alias created by the traversal that just happened.
    pub(crate) fn rename_last(&mut self, new_alias: &str) -> Result<(), QueryError> {
        if !self.just_traversed {
            return Err(QueryError::Misuse(
                "as() must directly follow a relation traversal".into(),
            ));
        }
        let (Some(relation), Some(old)) = (
            self.relations_queue.last().cloned(),
            self.alias_queue.last().cloned(),
        ) else {
            return Err(QueryError::Misuse("as() without a traversed relation".into()));
        };
        if old == new_alias {
            return Ok(());
        }
        if self.has_alias(new_alias) {
            return Err(QueryError::Misuse(format!(
                "alias {} is already in use",
                new_alias
            )));
        }
        let parent = match self.alias_queue.len() {
            1 => self.path_start.clone(),
            n => self.alias_queue[n - 2].clone(),
        };
        let key = format!("{}.{}", parent, relation);
        if self.join_ledger.contains(&key) {
            return Err(QueryError::Misuse(format!(
                "{} is already joined as {}",
                key, old
            )));
        }

        if let Some(children) = self.alias_table.get_mut(&parent) {
            children.insert(relation, new_alias.to_string());
        }
        if let Some(children) = self.alias_table.remove(&old) {
            self.alias_table.insert(new_alias.to_string(), children);
        }
        if let Some(relations) = self.relation_catalog.remove(&old) {
            self.relation_catalog.insert(new_alias.to_string(), relations);
        }
        if let Some(entity) = self.alias_entities.remove(&old) {
            self.alias_entities.insert(new_alias.to_string(), entity);
        }
        if let Some(tail) = self.alias_queue.last_mut() {
            *tail = new_alias.to_string();
        }
        self.current_alias = new_alias.to_string();

        tracing::debug!(from = %old, to = new_alias, "Renamed alias");
        Ok(())
    }

    /// Clear the traversal queues and put the cursor back on the anchor.
    pub(crate) fn reset_operation(&mut self) {
        self.current_alias = self.anchor().to_string();
        self.path_start = self.current_alias.clone();
        self.relations_queue.clear();
        self.alias_queue.clear();
        self.pending = None;
        self.just_traversed = false;
    }

    /// Clear the traversal queues but leave the cursor where it is.
    pub(crate) fn clear_queues(&mut self) {
        self.path_start = self.current_alias.clone();
        self.relations_queue.clear();
        self.alias_queue.clear();
        self.just_traversed = false;
    }

    pub(crate) fn push_anchor(&mut self, alias: &str) {
        self.anchors.push(alias.to_string());
        self.reset_operation();
    }

    /// Pop the innermost anchor. The root anchor stays.
    pub(crate) fn pop_anchor(&mut self) {
        if self.anchors.len() > 1 {
            self.anchors.pop();
        }
    }

    /// Keep the first strict-mode error only.
    pub(crate) fn record(&mut self, err: QueryError) {
        if self.error.is_none() {
            self.error = Some(err);
        }
    }
}
