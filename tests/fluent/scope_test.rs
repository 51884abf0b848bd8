//! Entity-declared scopes.

mod common;

use std::sync::Arc;

use common::{sql, strict_users, users};
use quill::prelude::*;

#[test]
fn test_scope_without_arguments() {
    let mut q = users();
    q.scope().col("active");

    assert!(sql(&q).contains("WHERE t0.active = :p0"));
    assert_eq!(q.parameters()["p0"], Value::Bool(true));
    assert_eq!(q.state().mode(), OperationMode::None);
}

#[test]
fn test_scope_receives_arguments() {
    let mut q = users();
    q.scope().field("olderThan").call(&[Value::Int(40)]);

    assert!(sql(&q).contains("WHERE t0.age > :p0"));
    assert_eq!(q.parameters()["p0"], Value::Int(40));
}

#[test]
fn test_scopes_compose_with_where() {
    let mut q = users();
    q.where_()
        .field("name")
        .cmp("like", "a%")
        .scope()
        .col("active")
        .scope()
        .field("olderThan")
        .call(&[Value::Int(30)]);

    assert!(sql(&q)
        .contains("WHERE t0.name LIKE :p0 AND t0.active = :p1 AND t0.age > :p2"));
}

#[test]
fn test_scope_on_joined_alias() {
    let mut q = users();
    q.join().rel("orders").end_join().scope().col("shipped");

    let sql = sql(&q);
    assert!(sql.contains("WHERE t1.status = :p0"));
    assert_eq!(q.parameters()["p0"], Value::from("shipped"));
    assert_eq!(q.state().current_alias(), "t0");
}

#[test]
fn test_scope_can_join() {
    let mut q = users();
    q.scope().col("withBigOrders");

    let sql = sql(&q);
    assert!(sql.contains("INNER JOIN orders AS t1 ON t1.user_id = t0.id"));
    assert!(sql.contains("WHERE t1.amount >= :p0"));
}

#[test]
fn test_unknown_scope() {
    let mut q = users();
    q.scope().col("vip");
    assert!(!sql(&q).contains("WHERE"));

    let mut q = strict_users();
    q.scope().col("vip");
    assert_eq!(
        q.get_sql().unwrap_err(),
        QueryError::UnmodeledAccess {
            name: "vip".into(),
            mode: OperationMode::Scope
        }
    );
}

#[test]
fn test_scope_registered_at_runtime() {
    let mut catalog = common::catalog();
    if let Some(user) = catalog.get_mut("User") {
        let meta = std::mem::replace(user, EntityMetadata::new("User"));
        *user = meta.scope("named", |q, args| {
            if let Some(name) = args.first() {
                q.and_where().field("name").cmp("=", name.clone());
            }
        });
    }

    let mut q = FluentQuery::new(Arc::new(catalog), Arc::new(MemorySession::new()), "User")
        .unwrap();
    q.scope().field("named").call(&[Value::from("ada")]);
    assert!(sql(&q).contains("WHERE t0.name = :p0"));
}
