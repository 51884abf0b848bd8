//! The fluent query engine.
//!
//! [`FluentQuery`] interprets a chain of names against an entity's metadata.
//! Each name is classified in priority order:
//!
//! 1. an engine [`Method`] (`where`, `join`, `as`, ...)
//! 2. a relation of the entity behind the current alias, which moves the
//!    cursor to the (possibly new) child alias
//! 3. a field, whose meaning depends on the active [`OperationMode`]:
//!    select column, where/having comparison, order-by column or scope name
//! 4. anything else is a no-op, or a recorded error in strict mode
//!
//! # Example
//!
//! ```ignore
//! let mut q = FluentQuery::new(catalog, session, "User")?;
//! q.join().rel("orders").rel("items").end_join()
//!     .where_().field("amount").cmp(">", 100);
//! // SELECT t0.* FROM users AS t0
//! //   INNER JOIN orders AS t1 ON t1.user_id = t0.id
//! //   INNER JOIN items AS t2 ON t2.order_id = t1.id
//! // WHERE t2.amount > :p0
//! let sql = q.get_sql()?;
//! ```

mod access;
mod dispatch;
mod error;
mod state;

pub use access::Access;
pub use dispatch::{Method, OperationMode};
pub use error::QueryError;
pub use state::{PendingComparison, QueryState};

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;

use access::Target;

use crate::builder::{ClauseFamily, JoinKind, Link, OrderEntry, QueryBuilder, SelectBuilder};
use crate::config::QueryOptions;
use crate::metadata::{MetadataProvider, ScopeFn};
use crate::session::{Row, Session};
use crate::sql::{column_ref, param, CompareOp, Expr, NullsOrder, SortDir, Value};

/// A query under construction.
///
/// Chain calls mutate the query in place and return `&mut Self`; only the
/// fetch terminals are async.
pub struct FluentQuery {
    builder: Box<dyn QueryBuilder>,
    provider: Arc<dyn MetadataProvider>,
    state: QueryState,
    strict: bool,
}

impl fmt::Debug for FluentQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FluentQuery")
            .field("root_entity", &self.builder.root_entity())
            .field("state", &self.state)
            .field("strict", &self.strict)
            .finish_non_exhaustive()
    }
}

impl FluentQuery {
    /// Query over `entity` with default options.
    pub fn new(
        provider: Arc<dyn MetadataProvider>,
        session: Arc<dyn Session>,
        entity: &str,
    ) -> Result<Self, QueryError> {
        Self::with_options(provider, session, entity, &QueryOptions::default())
    }

    pub fn with_options(
        provider: Arc<dyn MetadataProvider>,
        session: Arc<dyn Session>,
        entity: &str,
        options: &QueryOptions,
    ) -> Result<Self, QueryError> {
        let builder = SelectBuilder::new(provider.clone(), entity, &options.root_alias)?
            .with_dialect(options.dialect)
            .with_session(session);
        Self::from_builder(Box::new(builder), provider, options)
    }

    /// Drive a caller-supplied builder. Its root entity and alias win over
    /// `options.root_alias`.
    pub fn from_builder(
        builder: Box<dyn QueryBuilder>,
        provider: Arc<dyn MetadataProvider>,
        options: &QueryOptions,
    ) -> Result<Self, QueryError> {
        let entity = builder.root_entity().to_string();
        if provider.entity(&entity).is_none() {
            return Err(QueryError::UnknownEntity(entity));
        }
        let options = QueryOptions {
            root_alias: builder.root_alias().to_string(),
            ..options.clone()
        };
        let state = QueryState::new(provider.as_ref(), &entity, &options);
        Ok(Self {
            builder,
            provider,
            state,
            strict: options.strict,
        })
    }

    // =========================================================================
    // Classification
    // =========================================================================

    /// Look up `name` against the current mode and cursor.
    pub fn access(&mut self, name: &str) -> Access<'_> {
        let target = self.classify(name);
        tracing::trace!(
            name,
            mode = %self.state.mode,
            alias = %self.state.current_alias,
            target = target.kind(),
            "Classified access"
        );
        Access::new(self, target)
    }

    /// Same as [`access`](Self::access).
    pub fn field(&mut self, name: &str) -> Access<'_> {
        self.access(name)
    }

    /// Access a field and invoke it with no arguments.
    pub fn col(&mut self, name: &str) -> &mut Self {
        self.access(name).emit()
    }

    /// Traverse a relation.
    pub fn rel(&mut self, name: &str) -> &mut Self {
        self.access(name).emit()
    }

    fn classify(&mut self, name: &str) -> Target {
        if let Ok(method) = name.parse::<Method>() {
            return Target::Method(method);
        }

        if self.state.traverse(self.provider.as_ref(), name).is_some() {
            return Target::Continue;
        }
        self.state.just_traversed = false;

        let mode = self.state.mode;
        if mode.is_select() {
            return Target::Select {
                column: self.state.aliased(name),
            };
        }
        if mode.comparison().is_some() {
            let column = self.state.aliased(name);
            if self.state.pending.is_some() {
                self.emit_field_comparison(&column);
                return Target::Continue;
            }
            return Target::Compare { column };
        }
        if mode.is_order() {
            return Target::Order {
                column: self.state.aliased(name),
            };
        }
        if mode == OperationMode::Scope {
            let scope = self
                .state
                .entity_of(&self.state.current_alias)
                .and_then(|entity| self.provider.entity(entity))
                .and_then(|meta| meta.get_scope(name));
            if let Some(scope) = scope {
                return Target::Scope {
                    name: name.to_string(),
                    scope,
                };
            }
        }

        let err = if mode.is_traversal() {
            QueryError::UnknownRelation {
                alias: self.state.current_alias.clone(),
                relation: name.to_string(),
            }
        } else {
            QueryError::UnmodeledAccess {
                name: name.to_string(),
                mode,
            }
        };
        self.misstep(err);
        Target::NoOp
    }

    /// Log an ignored access; in strict mode also remember it.
    fn misstep(&mut self, err: QueryError) {
        tracing::debug!(error = %err, "Ignoring access");
        if self.strict {
            self.state.record(err);
        }
    }

    pub(crate) fn invoke(&mut self, method: Method, args: &[Value]) -> &mut Self {
        match method {
            Method::Select => self.select(),
            Method::AddSelect => self.add_select(),
            Method::Where => self.where_(),
            Method::AndWhere => self.and_where(),
            Method::OrWhere => self.or_where(),
            Method::Having => self.having(),
            Method::AndHaving => self.and_having(),
            Method::OrHaving => self.or_having(),
            Method::OrderBy => self.order_by(),
            Method::AddOrderBy => self.add_order_by(),
            Method::Asc => self.asc(),
            Method::Desc => self.desc(),
            Method::NullsFirst => self.nulls_first(),
            Method::NullsLast => self.nulls_last(),
            Method::Join | Method::InnerJoin => self.inner_join(),
            Method::LeftJoin => self.left_join(),
            Method::InnerJoinAndSelect => self.inner_join_and_select(),
            Method::LeftJoinAndSelect => self.left_join_and_select(),
            Method::EndJoin => self.end_join(),
            Method::Alias => self.alias(),
            Method::As => match args.first().and_then(Value::as_str) {
                Some(alias) => self.as_(alias),
                None => {
                    self.misstep(QueryError::Misuse("as() needs an alias name".into()));
                    self
                }
            },
            Method::EndAlias => self.end_alias(),
            Method::Scope => self.scope(),
            Method::And => self.and(),
            Method::Or => self.or(),
            Method::Limit | Method::Offset => {
                let n = match args.first() {
                    None | Some(Value::Null) => None,
                    Some(Value::Int(n)) if *n >= 0 => Some(*n as u64),
                    Some(other) => {
                        self.misstep(QueryError::Misuse(format!(
                            "{} expects a non-negative integer, got {:?}",
                            method, other
                        )));
                        return self;
                    }
                };
                if method == Method::Limit {
                    self.builder.limit(n);
                } else {
                    self.builder.offset(n);
                }
                self
            }
            Method::Pin | Method::Pinx | Method::Qb => {
                self.misstep(QueryError::RequiresCallback(method));
                self
            }
            Method::GetOne | Method::GetMany | Method::GetSql => {
                self.misstep(QueryError::NotChainable(method));
                self
            }
            Method::PrintSql => self.print_sql(),
        }
    }

    // =========================================================================
    // Mode entry
    // =========================================================================

    /// Enter a clause mode, keeping the cursor where it is.
    fn enter(&mut self, mode: OperationMode) -> &mut Self {
        self.state.mode = mode;
        self.state.pending = None;
        self.state.clear_queues();
        self
    }

    /// Enter a traversal mode; paths always start at the anchor.
    fn enter_traversal(&mut self, mode: OperationMode) -> &mut Self {
        self.state.mode = mode;
        self.state.reset_operation();
        self
    }

    pub fn select(&mut self) -> &mut Self {
        self.enter(OperationMode::Select)
    }

    pub fn add_select(&mut self) -> &mut Self {
        self.enter(OperationMode::AddSelect)
    }

    /// Start a WHERE clause, replacing any previous one.
    pub fn where_(&mut self) -> &mut Self {
        self.enter(OperationMode::Where)
    }

    pub fn and_where(&mut self) -> &mut Self {
        self.enter(OperationMode::AndWhere)
    }

    pub fn or_where(&mut self) -> &mut Self {
        self.enter(OperationMode::OrWhere)
    }

    pub fn having(&mut self) -> &mut Self {
        self.enter(OperationMode::Having)
    }

    pub fn and_having(&mut self) -> &mut Self {
        self.enter(OperationMode::AndHaving)
    }

    pub fn or_having(&mut self) -> &mut Self {
        self.enter(OperationMode::OrHaving)
    }

    pub fn order_by(&mut self) -> &mut Self {
        self.enter(OperationMode::OrderBy)
    }

    pub fn add_order_by(&mut self) -> &mut Self {
        self.enter(OperationMode::AddOrderBy)
    }

    /// Same as [`inner_join`](Self::inner_join).
    pub fn join(&mut self) -> &mut Self {
        self.inner_join()
    }

    pub fn inner_join(&mut self) -> &mut Self {
        self.enter_traversal(OperationMode::Join {
            kind: JoinKind::Inner,
            with_select: false,
        })
    }

    pub fn left_join(&mut self) -> &mut Self {
        self.enter_traversal(OperationMode::Join {
            kind: JoinKind::Left,
            with_select: false,
        })
    }

    pub fn inner_join_and_select(&mut self) -> &mut Self {
        self.enter_traversal(OperationMode::Join {
            kind: JoinKind::Inner,
            with_select: true,
        })
    }

    pub fn left_join_and_select(&mut self) -> &mut Self {
        self.enter_traversal(OperationMode::Join {
            kind: JoinKind::Left,
            with_select: true,
        })
    }

    /// Traverse relations to allocate or rename aliases without joining.
    pub fn alias(&mut self) -> &mut Self {
        self.enter_traversal(OperationMode::Alias)
    }

    /// Invoke an entity-declared scope by name on the next access.
    pub fn scope(&mut self) -> &mut Self {
        self.enter(OperationMode::Scope)
    }

    /// Re-enter the last where/having family with AND. No-op if no condition
    /// was emitted yet.
    pub fn and(&mut self) -> &mut Self {
        self.rechain(Link::And)
    }

    /// Re-enter the last where/having family with OR. No-op if no condition
    /// was emitted yet.
    pub fn or(&mut self) -> &mut Self {
        self.rechain(Link::Or)
    }

    fn rechain(&mut self, link: Link) -> &mut Self {
        match self.state.last_family {
            Some(family) => self.enter(OperationMode::chained(family, link)),
            None => {
                tracing::debug!(?link, "No previous where/having clause to chain onto");
                self
            }
        }
    }

    // =========================================================================
    // Joins and aliases
    // =========================================================================

    /// Emit a join for every relation traversed since the join clause began.
    ///
    /// Paths already joined are skipped. The cursor stays on the deepest
    /// alias so the next clause can address its fields.
    pub fn end_join(&mut self) -> &mut Self {
        let OperationMode::Join { kind, with_select } = self.state.mode else {
            tracing::debug!(mode = %self.state.mode, "end_join outside a join clause");
            self.state.clear_queues();
            return self;
        };

        for (path, alias) in self.state.queued_hops() {
            if self.state.join_ledger.insert(path.clone()) {
                tracing::debug!(path = %path, alias = %alias, ?kind, with_select, "Emitting join");
                self.builder.join(kind, with_select, &path, &alias);
            }
        }

        self.state.mode = OperationMode::None;
        self.state.pending = None;
        self.state.clear_queues();
        self
    }

    /// Rename the alias the previous relation traversal produced.
    ///
    /// Must directly follow the traversal, before the join is emitted.
    /// Anywhere else it does nothing.
    pub fn as_(&mut self, alias: &str) -> &mut Self {
        if let Err(err) = self.state.rename_last(alias) {
            self.misstep(err);
        }
        self
    }

    pub fn end_alias(&mut self) -> &mut Self {
        self.state.mode = OperationMode::None;
        self.state.reset_operation();
        self
    }

    // =========================================================================
    // Leaf emission
    // =========================================================================

    pub(crate) fn emit_select(&mut self, column: &str) -> &mut Self {
        if self.state.mode == OperationMode::Select {
            self.builder.select(column);
        } else {
            self.builder.add_select(column);
        }
        self.state.mode = OperationMode::AddSelect;
        self.state.reset_operation();
        self
    }

    pub(crate) fn emit_comparison(&mut self, column: &str, args: &[Value]) -> &mut Self {
        let Some((family, link)) = self.state.mode.comparison() else {
            return self;
        };

        let (op_arg, value) = match args {
            [] => {
                tracing::debug!(column, "Comparison field invoked without operator");
                self.state.reset_operation();
                return self;
            }
            [op] => (op, None),
            [op, value, ..] => (op, Some(value)),
        };

        let op = match op_arg.as_str().map(str::parse::<CompareOp>) {
            Some(Ok(op)) => op,
            Some(Err(raw)) => return self.reject_leaf(QueryError::UnknownOperator(raw)),
            None => {
                return self.reject_leaf(QueryError::UnknownOperator(format!("{:?}", op_arg)))
            }
        };

        let Some(value) = value else {
            let pending = PendingComparison {
                field: column.to_string(),
                operator: op.to_string(),
            };
            self.state.reset_operation();
            self.state.pending = Some(pending);
            return self;
        };

        let left = column_ref(column);
        let expr = match value {
            Value::Null => op.apply_null(left),
            Value::List(items) if matches!(op, CompareOp::In | CompareOp::NotIn) => {
                let params = items.iter().map(|item| self.bind(item.clone())).collect();
                op.apply_list(left, params)
            }
            other => {
                let right = self.bind(other.clone());
                op.apply(left, right)
            }
        };
        self.finish_condition(family, link, expr)
    }

    /// `<pending field> <pending op> <column>`, no parameter.
    fn emit_field_comparison(&mut self, column: &str) {
        let (Some((family, link)), Some(pending)) =
            (self.state.mode.comparison(), self.state.pending.take())
        else {
            return;
        };
        match pending.operator.parse::<CompareOp>() {
            Ok(op) => {
                let expr = op.apply(column_ref(&pending.field), column_ref(column));
                self.finish_condition(family, link, expr);
            }
            Err(raw) => {
                self.reject_leaf(QueryError::UnknownOperator(raw));
            }
        }
    }

    fn bind(&mut self, value: Value) -> Expr {
        let name = self.state.next_param();
        self.builder.set_parameter(&name, value);
        param(&name)
    }

    fn finish_condition(&mut self, family: ClauseFamily, link: Link, expr: Expr) -> &mut Self {
        self.builder.condition(family, link, expr);
        self.state.last_family = Some(family);
        self.state.mode = OperationMode::None;
        self.state.reset_operation();
        self
    }

    /// Drop a malformed leaf: nothing is emitted, the cursor resets.
    fn reject_leaf(&mut self, err: QueryError) -> &mut Self {
        self.misstep(err);
        self.state.reset_operation();
        self
    }

    pub(crate) fn emit_order(&mut self, column: &str, args: &[Value]) -> &mut Self {
        let dir = match args.first() {
            None | Some(Value::Null) => SortDir::Asc,
            Some(Value::String(s)) => match s.parse::<SortDir>() {
                Ok(dir) => dir,
                Err(raw) => return self.reject_leaf(QueryError::InvalidDirection(raw)),
            },
            Some(other) => {
                return self.reject_leaf(QueryError::InvalidDirection(format!("{:?}", other)))
            }
        };
        let nulls = match args.get(1) {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => match s.parse::<NullsOrder>() {
                Ok(nulls) => Some(nulls),
                Err(raw) => return self.reject_leaf(QueryError::InvalidNullsOrder(raw)),
            },
            Some(other) => {
                return self.reject_leaf(QueryError::InvalidNullsOrder(format!("{:?}", other)))
            }
        };

        let entry = OrderEntry::new(dir, nulls);
        if self.state.mode == OperationMode::OrderBy {
            self.builder.order_by(column, entry);
        } else {
            self.builder.add_order_by(column, entry);
        }
        self.state.last_order_by = Some(column.to_string());
        self.state.mode = OperationMode::AddOrderBy;
        self.state.reset_operation();
        self
    }

    pub(crate) fn run_scope(&mut self, name: &str, scope: ScopeFn, args: &[Value]) -> &mut Self {
        let anchor = self.state.current_alias.clone();
        tracing::debug!(scope = name, alias = %anchor, "Applying scope");
        self.state.mode = OperationMode::None;
        self.state.push_anchor(&anchor);
        scope(self, args);
        self.state.pop_anchor();
        self.state.mode = OperationMode::None;
        self.state.reset_operation();
        self
    }

    // =========================================================================
    // Ordering refinement
    // =========================================================================

    pub fn asc(&mut self) -> &mut Self {
        self.refine_order(|entry| entry.with_dir(SortDir::Asc))
    }

    pub fn desc(&mut self) -> &mut Self {
        self.refine_order(|entry| entry.with_dir(SortDir::Desc))
    }

    pub fn nulls_first(&mut self) -> &mut Self {
        self.refine_order(|entry| entry.with_nulls(NullsOrder::First))
    }

    pub fn nulls_last(&mut self) -> &mut Self {
        self.refine_order(|entry| entry.with_nulls(NullsOrder::Last))
    }

    /// Rewrite the most recent order-by entry in place.
    fn refine_order(&mut self, f: impl FnOnce(OrderEntry) -> OrderEntry) -> &mut Self {
        let Some(column) = self.state.last_order_by.clone() else {
            tracing::debug!("Ordering refinement without a previous order by");
            return self;
        };
        let entry = self.builder.order_entry(&column).unwrap_or_default();
        if !self.builder.set_order_entry(&column, f(entry)) {
            tracing::debug!(column = %column, "Order entry no longer present");
        }
        self
    }

    // =========================================================================
    // Scoped anchoring
    // =========================================================================

    /// Run `f` with the current alias as anchor. The cursor is restored
    /// afterwards.
    pub fn pin<F>(&mut self, f: F) -> &mut Self
    where
        F: FnOnce(&mut FluentQuery),
    {
        let anchor = self.state.current_alias.clone();
        self.anchored(&anchor, f)
    }

    /// Run `f` anchored at `alias`, bound to `entity`. An alias not seen
    /// before is registered and its relations loaded.
    pub fn pinx<F>(&mut self, entity: &str, alias: &str, f: F) -> &mut Self
    where
        F: FnOnce(&mut FluentQuery),
    {
        if self.provider.entity(entity).is_none() {
            self.misstep(QueryError::UnknownEntity(entity.to_string()));
            return self;
        }
        match self.state.entity_of(alias).map(str::to_string) {
            Some(bound) if bound != entity => {
                let err = QueryError::Misuse(format!(
                    "alias {} is bound to {}, not {}",
                    alias, bound, entity
                ));
                self.misstep(err);
                return self;
            }
            Some(_) => {}
            None => self
                .state
                .register_alias(self.provider.as_ref(), alias, entity),
        }
        self.anchored(alias, f)
    }

    fn anchored<F>(&mut self, anchor: &str, f: F) -> &mut Self
    where
        F: FnOnce(&mut FluentQuery),
    {
        let saved = self.state.current_alias.clone();
        self.state.mode = OperationMode::None;
        self.state.push_anchor(anchor);

        f(self);

        self.state.pop_anchor();
        self.state.mode = OperationMode::None;
        self.state.reset_operation();
        self.state.current_alias = saved.clone();
        self.state.path_start = saved;
        self
    }

    // =========================================================================
    // Pass-through and terminals
    // =========================================================================

    pub fn limit(&mut self, limit: u64) -> &mut Self {
        self.builder.limit(Some(limit));
        self
    }

    pub fn offset(&mut self, offset: u64) -> &mut Self {
        self.builder.offset(Some(offset));
        self
    }

    /// Escape hatch for builder operations the engine does not model.
    pub fn qb<F>(&mut self, f: F) -> &mut Self
    where
        F: FnOnce(&mut dyn QueryBuilder),
    {
        f(self.builder.as_mut());
        self
    }

    pub fn builder(&self) -> &dyn QueryBuilder {
        self.builder.as_ref()
    }

    pub fn builder_mut(&mut self) -> &mut dyn QueryBuilder {
        self.builder.as_mut()
    }

    pub fn state(&self) -> &QueryState {
        &self.state
    }

    pub fn parameters(&self) -> &BTreeMap<String, Value> {
        self.builder.parameters()
    }

    fn check(&self) -> Result<(), QueryError> {
        match &self.state.error {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    /// Render with named parameters (`:p0`) without executing.
    pub fn get_sql(&self) -> Result<String, QueryError> {
        self.check()?;
        Ok(self.builder.get_sql()?)
    }

    /// Render for execution: dialect placeholders plus values in order.
    pub fn get_query_and_parameters(&self) -> Result<(String, Vec<Value>), QueryError> {
        self.check()?;
        Ok(self.builder.get_query_and_parameters()?)
    }

    /// Log the rendered SQL at INFO.
    pub fn print_sql(&mut self) -> &mut Self {
        match self.get_sql() {
            Ok(sql) => tracing::info!(sql = %sql, params = ?self.parameters(), "Rendered query"),
            Err(err) => tracing::warn!(error = %err, "Query does not render"),
        }
        self
    }

    pub async fn get_one_row(&self) -> Result<Option<Row>, QueryError> {
        self.check()?;
        Ok(self.builder.fetch_one().await?)
    }

    pub async fn get_many_rows(&self) -> Result<Vec<Row>, QueryError> {
        self.check()?;
        Ok(self.builder.fetch_many().await?)
    }

    /// Fetch the first row and decode it.
    pub async fn get_one<T: DeserializeOwned>(&self) -> Result<Option<T>, QueryError> {
        let row = self.get_one_row().await?;
        Ok(row.map(|r| r.decode()).transpose()?)
    }

    /// Fetch all rows and decode each.
    pub async fn get_many<T: DeserializeOwned>(&self) -> Result<Vec<T>, QueryError> {
        let rows = self.get_many_rows().await?;
        Ok(rows
            .iter()
            .map(Row::decode)
            .collect::<Result<Vec<T>, _>>()?)
    }
}
