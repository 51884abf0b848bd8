//! Reference `QueryBuilder` over the `sql` AST.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use super::{BuildError, ClauseFamily, JoinKind, Link, OrderEntry, QueryBuilder};
use crate::metadata::{EntityMetadata, MetadataProvider, RelationKind};
use crate::session::{Row, Session};
use crate::sql::{
    column_ref, table_col, table_star, BinaryOperator, Dialect, Expr, ExprExt, JoinType,
    OrderByExpr, Query, TableRef, Value,
};

#[derive(Debug, Clone, PartialEq)]
struct JoinSpec {
    kind: JoinKind,
    with_select: bool,
    relation_path: String,
    alias: String,
}

/// Records clauses and renders them as one SELECT statement.
///
/// Relation paths are resolved against the metadata provider at render time,
/// so joins can be recorded in any order as long as each parent alias is
/// joined before its children.
pub struct SelectBuilder {
    provider: Arc<dyn MetadataProvider>,
    session: Option<Arc<dyn Session>>,
    dialect: Dialect,
    root_entity: String,
    root_alias: String,
    selects: Vec<String>,
    joins: Vec<JoinSpec>,
    where_clause: Option<Expr>,
    having: Option<Expr>,
    group_by: Vec<String>,
    order_by: Vec<(String, OrderEntry)>,
    params: BTreeMap<String, Value>,
    limit: Option<u64>,
    offset: Option<u64>,
}

impl fmt::Debug for SelectBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectBuilder")
            .field("dialect", &self.dialect)
            .field("root_entity", &self.root_entity)
            .field("root_alias", &self.root_alias)
            .field("selects", &self.selects)
            .field("joins", &self.joins)
            .field("where_clause", &self.where_clause)
            .field("having", &self.having)
            .field("order_by", &self.order_by)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

impl SelectBuilder {
    /// Start a query over `entity`, addressed as `alias`.
    pub fn new(
        provider: Arc<dyn MetadataProvider>,
        entity: &str,
        alias: &str,
    ) -> Result<Self, BuildError> {
        if provider.entity(entity).is_none() {
            return Err(BuildError::UnknownEntity(entity.into()));
        }
        Ok(Self {
            provider,
            session: None,
            dialect: Dialect::default(),
            root_entity: entity.into(),
            root_alias: alias.into(),
            selects: Vec::new(),
            joins: Vec::new(),
            where_clause: None,
            having: None,
            group_by: Vec::new(),
            order_by: Vec::new(),
            params: BTreeMap::new(),
            limit: None,
            offset: None,
        })
    }

    pub fn with_session(mut self, session: Arc<dyn Session>) -> Self {
        self.session = Some(session);
        self
    }

    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// Build the statement AST.
    pub fn to_query(&self) -> Result<Query, BuildError> {
        let root = self.entity(&self.root_entity)?;

        let mut alias_entities: HashMap<&str, &EntityMetadata> = HashMap::new();
        alias_entities.insert(&self.root_alias, root);

        let mut query = Query::new().from(
            TableRef::new(&root.table)
                .with_schema(root.schema.as_deref())
                .with_alias(&self.root_alias),
        );
        let mut joined_selects = Vec::new();

        for spec in &self.joins {
            let (parent_alias, relation) = spec
                .relation_path
                .split_once('.')
                .ok_or_else(|| BuildError::InvalidRelationPath(spec.relation_path.clone()))?;
            let parent = alias_entities
                .get(parent_alias)
                .copied()
                .ok_or_else(|| BuildError::UnknownAlias(parent_alias.into()))?;
            let rel = parent
                .get_relation(relation)
                .ok_or_else(|| BuildError::UnknownRelation {
                    alias: parent_alias.into(),
                    relation: relation.into(),
                })?;
            let target = self.entity(&rel.target)?;
            let join_type = match spec.kind {
                JoinKind::Inner => JoinType::Inner,
                JoinKind::Left => JoinType::Left,
            };
            let local = rel.join.local.as_deref().unwrap_or(&parent.primary_key);
            let foreign = rel.join.foreign.as_deref().unwrap_or(&target.primary_key);

            match (&rel.kind, &rel.junction) {
                (RelationKind::ManyToMany, Some(junction)) => {
                    let link_alias = format!("{}_{}", spec.alias, junction.table);
                    query = query
                        .join(
                            join_type,
                            TableRef::new(&junction.table).with_alias(&link_alias),
                            table_col(&link_alias, &junction.source_column)
                                .eq(table_col(parent_alias, local)),
                        )
                        .join(
                            join_type,
                            TableRef::new(&target.table)
                                .with_schema(target.schema.as_deref())
                                .with_alias(&spec.alias),
                            table_col(&spec.alias, foreign)
                                .eq(table_col(&link_alias, &junction.target_column)),
                        );
                }
                _ => {
                    query = query.join(
                        join_type,
                        TableRef::new(&target.table)
                            .with_schema(target.schema.as_deref())
                            .with_alias(&spec.alias),
                        table_col(&spec.alias, foreign).eq(table_col(parent_alias, local)),
                    );
                }
            }

            if spec.with_select {
                joined_selects.push(table_star(&spec.alias));
            }
            alias_entities.insert(&spec.alias, target);
        }

        let mut select: Vec<Expr> = if self.selects.is_empty() {
            vec![table_star(&self.root_alias)]
        } else {
            self.selects.iter().map(|c| column_ref(c)).collect()
        };
        select.extend(joined_selects);

        Ok(query
            .select(select)
            .filter(self.where_clause.clone())
            .group_by(self.group_by.iter().map(|c| column_ref(c)).collect())
            .having(self.having.clone())
            .order_by(
                self.order_by
                    .iter()
                    .map(|(column, entry)| {
                        OrderByExpr::new(column_ref(column))
                            .with_dir(entry.dir())
                            .with_nulls(entry.nulls())
                    })
                    .collect(),
            )
            .limit_offset(self.limit, self.offset))
    }

    fn entity(&self, name: &str) -> Result<&EntityMetadata, BuildError> {
        self.provider
            .entity(name)
            .ok_or_else(|| BuildError::UnknownEntity(name.into()))
    }

    fn session(&self) -> Result<&Arc<dyn Session>, BuildError> {
        self.session.as_ref().ok_or(BuildError::NoSession)
    }
}

/// AND binds tighter than OR, so an OR chain joined with AND needs parens.
fn group_or(expr: Expr) -> Expr {
    match expr {
        Expr::BinaryOp {
            op: BinaryOperator::Or,
            ..
        } => expr.paren(),
        other => other,
    }
}

#[async_trait]
impl QueryBuilder for SelectBuilder {
    fn root_alias(&self) -> &str {
        &self.root_alias
    }

    fn root_entity(&self) -> &str {
        &self.root_entity
    }

    fn dialect(&self) -> Dialect {
        self.dialect
    }

    fn select(&mut self, column: &str) {
        self.selects = vec![column.into()];
    }

    fn add_select(&mut self, column: &str) {
        self.selects.push(column.into());
    }

    fn condition(&mut self, family: ClauseFamily, link: Link, condition: Expr) {
        let slot = match family {
            ClauseFamily::Where => &mut self.where_clause,
            ClauseFamily::Having => &mut self.having,
        };
        *slot = Some(match (link, slot.take()) {
            (Link::And, Some(existing)) => group_or(existing).and(group_or(condition)),
            (Link::Or, Some(existing)) => existing.or(condition),
            (_, replaced) => {
                // Values bound only by the replaced clause no longer appear in the SQL.
                if let Some(replaced) = replaced {
                    let kept = condition.param_names();
                    for name in replaced.param_names() {
                        if !kept.contains(&name) {
                            self.params.remove(name);
                        }
                    }
                }
                condition
            }
        });
    }

    fn set_parameter(&mut self, name: &str, value: Value) {
        self.params.insert(name.into(), value);
    }

    fn parameters(&self) -> &BTreeMap<String, Value> {
        &self.params
    }

    fn join(&mut self, kind: JoinKind, with_select: bool, relation_path: &str, alias: &str) {
        self.joins.push(JoinSpec {
            kind,
            with_select,
            relation_path: relation_path.into(),
            alias: alias.into(),
        });
    }

    fn order_by(&mut self, column: &str, entry: OrderEntry) {
        self.order_by = vec![(column.into(), entry)];
    }

    fn add_order_by(&mut self, column: &str, entry: OrderEntry) {
        match self.order_by.iter_mut().find(|(c, _)| c == column) {
            Some((_, existing)) => *existing = entry,
            None => self.order_by.push((column.into(), entry)),
        }
    }

    fn order_entry(&self, column: &str) -> Option<OrderEntry> {
        self.order_by
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, entry)| *entry)
    }

    fn set_order_entry(&mut self, column: &str, entry: OrderEntry) -> bool {
        match self.order_by.iter_mut().find(|(c, _)| c == column) {
            Some((_, existing)) => {
                *existing = entry;
                true
            }
            None => false,
        }
    }

    fn group_by(&mut self, column: &str) {
        self.group_by = vec![column.into()];
    }

    fn add_group_by(&mut self, column: &str) {
        self.group_by.push(column.into());
    }

    fn limit(&mut self, limit: Option<u64>) {
        self.limit = limit;
    }

    fn offset(&mut self, offset: Option<u64>) {
        self.offset = offset;
    }

    fn get_sql(&self) -> Result<String, BuildError> {
        Ok(self.to_query()?.to_sql(self.dialect))
    }

    fn get_query_and_parameters(&self) -> Result<(String, Vec<Value>), BuildError> {
        Ok(self.to_query()?.prepare(self.dialect, &self.params)?)
    }

    async fn fetch_one(&self) -> Result<Option<Row>, BuildError> {
        let session = self.session()?;
        let (sql, params) = self.get_query_and_parameters()?;
        tracing::debug!(sql = %sql, params = params.len(), "Executing query for one row");
        Ok(session.fetch_optional(&sql, &params).await?)
    }

    async fn fetch_many(&self) -> Result<Vec<Row>, BuildError> {
        let session = self.session()?;
        let (sql, params) = self.get_query_and_parameters()?;
        tracing::debug!(sql = %sql, params = params.len(), "Executing query for many rows");
        Ok(session.fetch_all(&sql, &params).await?)
    }
}
