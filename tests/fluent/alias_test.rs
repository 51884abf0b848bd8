//! Alias allocation and renaming.

mod common;

use common::{sql, strict_users, users, users_with};
use quill::prelude::*;

#[test]
fn test_rename_propagates_to_fields() {
    let mut q = users();
    q.join()
        .rel("orders")
        .as_("o")
        .end_join()
        .where_()
        .field("amount")
        .cmp(">", 10);

    let sql = sql(&q);
    assert!(sql.contains("INNER JOIN orders AS o ON o.user_id = t0.id"));
    assert!(sql.contains("WHERE o.amount > :p0"));

    let state = q.state();
    assert_eq!(state.child_alias("t0", "orders"), Some("o"));
    assert!(!state.has_alias("t1"));
    assert_eq!(state.entity_of("o"), Some("Order"));
    assert!(state.relation("o", "items").is_some());
    assert!(state.relation("t1", "items").is_none());
}

#[test]
fn test_renamed_alias_is_reused_by_later_traversals() {
    let mut q = users();
    q.alias().rel("orders").as_("o").end_alias();
    q.where_().rel("orders").field("status").cmp("=", "open");
    q.join().rel("orders").rel("items").as_("i").end_join();

    let sql = sql(&q);
    assert!(sql.contains("WHERE o.status = :p0"));
    assert!(sql.contains("INNER JOIN items AS i ON i.order_id = o.id"));
    assert_eq!(sql.matches("JOIN orders").count(), 1);
}

#[test]
fn test_as_by_name() {
    let mut q = users();
    q.join()
        .rel("orders")
        .access("as")
        .call(&[Value::from("o")])
        .end_join();

    assert!(sql(&q).contains("INNER JOIN orders AS o"));
}

#[test]
fn test_alias_mode_allocates_without_joining() {
    let mut q = users();
    q.alias().rel("orders").as_("o").end_alias();
    q.where_().rel("orders").field("amount").cmp(">", 5);

    let sql = sql(&q);
    assert!(!sql.contains("JOIN"));
    assert!(sql.contains("WHERE o.amount > :p0"));
    assert_eq!(q.state().current_alias(), "t0");
}

#[test]
fn test_end_alias_without_alias_is_harmless() {
    let mut q = users();
    q.end_alias().where_().field("id").cmp("=", 1);
    assert!(sql(&q).contains("WHERE t0.id = :p0"));
}

#[test]
fn test_auto_aliases_skip_taken_names() {
    let mut q = users();
    q.join().rel("orders").as_("t2").end_join();
    q.join().rel("profile").end_join();

    let state = q.state();
    assert_eq!(state.child_alias("t0", "orders"), Some("t2"));
    // t1 was allocated and released by the rename; the counter never reuses it.
    assert_eq!(state.child_alias("t0", "profile"), Some("t3"));
}

#[test]
fn test_custom_alias_prefix() {
    let options = QueryOptions {
        alias_prefix: "j".into(),
        root_alias: "u".into(),
        ..QueryOptions::default()
    };
    let mut q = users_with(options);
    q.join().rel("orders").end_join();
    assert!(sql(&q).contains("INNER JOIN orders AS j1 ON j1.user_id = u.id"));
}

#[test]
fn test_as_misuse_is_a_noop() {
    let mut q = users();
    q.where_().field("name").cmp("=", "ada").as_("x");
    assert!(!q.state().has_alias("x"));

    let mut q = strict_users();
    q.join().rel("orders").end_join().as_("x");
    assert!(matches!(q.get_sql(), Err(QueryError::Misuse(_))));
}

#[test]
fn test_as_rejects_alias_in_use() {
    let mut q = strict_users();
    q.join().rel("orders").as_("t0").end_join();
    assert!(matches!(q.get_sql(), Err(QueryError::Misuse(_))));
    assert_eq!(q.state().child_alias("t0", "orders"), Some("t1"));
}
