//! Join emission through `join()` ... `end_join()`.

mod common;

use common::{sql, users};
use quill::prelude::*;

#[test]
fn test_two_hop_join_then_where_on_deepest_alias() {
    let mut q = users();
    q.join()
        .rel("orders")
        .rel("items")
        .end_join()
        .where_()
        .field("amount")
        .cmp(">", 100);

    insta::assert_snapshot!(sql(&q), @r"
    SELECT
      t0.*
    FROM users AS t0
    INNER JOIN orders AS t1 ON t1.user_id = t0.id
    INNER JOIN items AS t2 ON t2.order_id = t1.id
    WHERE t2.amount > :p0
    ");
    assert_eq!(q.parameters().len(), 1);
    assert_eq!(q.parameters().get("p0"), Some(&Value::Int(100)));
}

#[test]
fn test_same_path_joined_once() {
    let mut q = users();
    q.join().rel("orders").end_join();
    q.join().rel("orders").end_join();
    q.left_join().rel("orders").rel("items").end_join();

    let sql = sql(&q);
    assert_eq!(sql.matches("JOIN orders").count(), 1);
    assert_eq!(sql.matches("JOIN items").count(), 1);
    assert!(sql.contains("LEFT JOIN items AS t2 ON t2.order_id = t1.id"));
}

#[test]
fn test_distinct_paths_get_distinct_aliases() {
    let mut q = users();
    q.join()
        .rel("orders")
        .rel("user")
        .rel("orders")
        .end_join()
        .join()
        .rel("profile")
        .end_join();

    let state = q.state();
    let aliases = [
        state.child_alias("t0", "orders").unwrap(),
        state.child_alias("t1", "user").unwrap(),
        state.child_alias("t2", "orders").unwrap(),
        state.child_alias("t0", "profile").unwrap(),
    ];
    assert_eq!(aliases, ["t1", "t2", "t3", "t4"]);

    let sql = sql(&q);
    assert!(sql.contains("INNER JOIN users AS t2 ON t2.id = t1.user_id"));
    assert!(sql.contains("INNER JOIN orders AS t3 ON t3.user_id = t2.id"));
    assert!(sql.contains("INNER JOIN profiles AS t4 ON t4.user_id = t0.id"));
}

#[test]
fn test_join_and_select_adds_alias_star() {
    let mut q = users();
    q.left_join_and_select().rel("orders").end_join();

    insta::assert_snapshot!(sql(&q), @r"
    SELECT
      t0.*,
      t1.*
    FROM users AS t0
    LEFT JOIN orders AS t1 ON t1.user_id = t0.id
    ");
}

#[test]
fn test_many_to_many_goes_through_junction() {
    let mut q = users();
    q.inner_join().rel("roles").end_join();

    let sql = sql(&q);
    assert!(sql.contains("INNER JOIN user_roles AS t1_user_roles ON t1_user_roles.user_id = t0.id"));
    assert!(sql.contains("INNER JOIN roles AS t1 ON t1.id = t1_user_roles.role_id"));
}

#[test]
fn test_join_restarts_at_root() {
    let mut q = users();
    q.join().rel("orders").end_join();
    // The cursor sits on t1 after end_join; a new join starts over at t0.
    q.join().rel("profile").end_join();

    assert!(sql(&q).contains("INNER JOIN profiles AS t2 ON t2.user_id = t0.id"));
}

#[test]
fn test_unknown_relation_in_join_is_ignored() {
    let mut q = users();
    q.join().rel("orders").rel("nonsense").end_join();

    let sql = sql(&q);
    assert!(sql.contains("INNER JOIN orders AS t1"));
    assert_eq!(sql.matches("JOIN").count(), 1);
}

#[test]
fn test_end_join_outside_join_is_harmless() {
    let mut q = users();
    q.end_join().where_().field("name").cmp("=", "ada");

    assert!(sql(&q).contains("WHERE t0.name = :p0"));
}

#[test]
fn test_join_renders_for_postgres() {
    let mut q = common::users_with(QueryOptions::default().dialect(Dialect::Postgres));
    q.join()
        .rel("orders")
        .rel("items")
        .end_join()
        .where_()
        .field("amount")
        .cmp(">", 100);

    let (sql, params) = q.get_query_and_parameters().unwrap();
    assert!(sql.contains("\"t2\".\"amount\" > $1"));
    assert_eq!(params, vec![Value::Int(100)]);
}
