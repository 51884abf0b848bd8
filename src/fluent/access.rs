//! The continuation returned by a named access.

use crate::metadata::ScopeFn;
use crate::sql::Value;

use super::dispatch::Method;
use super::FluentQuery;

/// What a classified name turned into.
pub(crate) enum Target {
    /// Engine operation, run on call.
    Method(Method),
    /// Work already happened at access time (relation traversal or a
    /// deferred field-to-field comparison).
    Continue,
    Select { column: String },
    Compare { column: String },
    Order { column: String },
    Scope { name: String, scope: ScopeFn },
    NoOp,
}

impl Target {
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Target::Method(_) => "method",
            Target::Continue => "continue",
            Target::Select { .. } => "select",
            Target::Compare { .. } => "compare",
            Target::Order { .. } => "order",
            Target::Scope { .. } => "scope",
            Target::NoOp => "noop",
        }
    }
}

/// A name looked up on a [`FluentQuery`], waiting to be invoked.
///
/// Invoking it always hands the query back so the chain continues:
///
/// ```ignore
/// q.where_().field("amount").cmp(">", 100).order_by().field("created_at").order("desc");
/// ```
#[must_use = "an access does nothing until it is called"]
pub struct Access<'q> {
    query: &'q mut FluentQuery,
    target: Target,
}

impl<'q> Access<'q> {
    pub(crate) fn new(query: &'q mut FluentQuery, target: Target) -> Self {
        Self { query, target }
    }

    /// Invoke with positional arguments.
    ///
    /// - select fields take none
    /// - where/having fields take `(operator, value)`, or `(operator)` to
    ///   compare against the next field accessed
    /// - order-by fields take `(direction?, nulls?)`
    /// - scopes receive the arguments unchanged
    pub fn call(self, args: &[Value]) -> &'q mut FluentQuery {
        let query = self.query;
        match self.target {
            Target::Method(method) => query.invoke(method, args),
            Target::Continue | Target::NoOp => query,
            Target::Select { column } => query.emit_select(&column),
            Target::Compare { column } => query.emit_comparison(&column, args),
            Target::Order { column } => query.emit_order(&column, args),
            Target::Scope { name, scope } => query.run_scope(&name, scope, args),
        }
    }

    /// Invoke with no arguments.
    pub fn emit(self) -> &'q mut FluentQuery {
        self.call(&[])
    }

    /// `field <op> value`. A null value renders `IS NULL` style and binds
    /// nothing.
    pub fn cmp(self, op: &str, value: impl Into<Value>) -> &'q mut FluentQuery {
        self.call(&[Value::from(op), value.into()])
    }

    /// `field <op>` against the next field accessed.
    pub fn op(self, op: &str) -> &'q mut FluentQuery {
        self.call(&[Value::from(op)])
    }

    pub fn order(self, dir: &str) -> &'q mut FluentQuery {
        self.call(&[Value::from(dir)])
    }

    pub fn order_nulls(self, dir: &str, nulls: &str) -> &'q mut FluentQuery {
        self.call(&[Value::from(dir), Value::from(nulls)])
    }

    /// Hand the query back without invoking anything.
    pub fn done(self) -> &'q mut FluentQuery {
        self.query
    }
}
