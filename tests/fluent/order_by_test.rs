//! ORDER BY emission and in-place refinement.

mod common;

use common::{sql, strict_users, users, users_with};
use quill::prelude::*;

#[test]
fn test_order_by_defaults_to_ascending() {
    let mut q = users();
    q.order_by().col("name");
    assert!(sql(&q).ends_with("ORDER BY t0.name ASC"));
    assert_eq!(q.state().last_order_by(), Some("t0.name"));
}

#[test]
fn test_direction_and_nulls_are_case_insensitive() {
    let mut q = users_with(QueryOptions::default().dialect(Dialect::Postgres));
    q.order_by().field("age").order_nulls("desc", "nulls last");
    assert!(sql(&q).ends_with("ORDER BY \"t0\".\"age\" DESC NULLS LAST"));
}

#[test]
fn test_refinement_mutates_single_entry() {
    let mut q = users_with(QueryOptions::default().dialect(Dialect::Postgres));
    q.order_by().col("name").asc().nulls_last();
    q.desc();

    let sql = sql(&q);
    assert!(sql.ends_with("ORDER BY \"t0\".\"name\" DESC NULLS LAST"));
    assert_eq!(sql.matches("\"t0\".\"name\"").count(), 1);
    assert_eq!(
        q.builder().order_entry("t0.name"),
        Some(OrderEntry::Detailed {
            dir: SortDir::Desc,
            nulls: NullsOrder::Last
        })
    );
}

#[test]
fn test_entry_without_nulls_stays_simple() {
    let mut q = users();
    q.order_by().col("name").desc();
    assert_eq!(
        q.builder().order_entry("t0.name"),
        Some(OrderEntry::Direction(SortDir::Desc))
    );
}

#[test]
fn test_order_mode_continues_with_add_order_by() {
    let mut q = users();
    q.order_by().col("name").field("age").order("desc");
    assert!(sql(&q).ends_with("ORDER BY t0.name ASC, t0.age DESC"));

    q.order_by().col("email");
    assert!(sql(&q).ends_with("ORDER BY t0.email ASC"));

    q.add_order_by().col("id");
    assert!(sql(&q).ends_with("ORDER BY t0.email ASC, t0.id ASC"));
}

#[test]
fn test_refinement_targets_last_field_only() {
    let mut q = users();
    q.order_by().col("name").col("age").desc();
    assert!(sql(&q).ends_with("ORDER BY t0.name ASC, t0.age DESC"));
}

#[test]
fn test_order_by_joined_alias() {
    let mut q = users();
    q.join()
        .rel("orders")
        .end_join()
        .order_by()
        .field("created_at")
        .order("DESC");
    assert!(sql(&q).ends_with("ORDER BY t1.created_at DESC"));
}

#[test]
fn test_refinement_without_order_by_is_noop() {
    let mut q = users();
    q.desc().nulls_first();
    assert!(!sql(&q).contains("ORDER BY"));
}

#[test]
fn test_nulls_skipped_where_unsupported() {
    let mut q = users_with(QueryOptions::default().dialect(Dialect::MySql));
    q.order_by().col("name").nulls_first();
    let sql = sql(&q);
    assert!(sql.ends_with("ORDER BY `t0`.`name` ASC"));
}

#[test]
fn test_invalid_direction() {
    let mut q = users();
    q.order_by().field("name").order("sideways");
    assert!(!sql(&q).contains("ORDER BY"));

    let mut q = strict_users();
    q.order_by().field("name").order("sideways");
    assert_eq!(
        q.get_sql().unwrap_err(),
        QueryError::InvalidDirection("sideways".into())
    );
}
