//! Scoped anchoring with `pin` and `pinx`.

mod common;

use common::{sql, strict_users, users};
use quill::prelude::*;

#[test]
fn test_pin_does_not_move_outer_cursor() {
    let mut q = users();
    q.join().rel("orders").end_join();
    assert_eq!(q.state().current_alias(), "t1");

    q.pin(|q| {
        q.join().rel("items").end_join();
        q.and_where().field("sku").cmp("=", "A-1");
    });

    assert_eq!(q.state().current_alias(), "t1");
    assert_eq!(q.state().anchor(), "t0");

    q.and_where().field("amount").cmp(">", 50);
    let sql = sql(&q);
    assert!(sql.contains("INNER JOIN items AS t2 ON t2.order_id = t1.id"));
    assert!(sql.contains("WHERE t2.sku = :p0 AND t1.amount > :p1"), "{sql}");
}

#[test]
fn test_pin_anchors_new_clauses_at_current_alias() {
    let mut q = users();
    q.join().rel("orders").end_join();
    q.pin(|q| {
        // A fresh clause inside the pin starts at t1, not at the root.
        q.select().col("amount").col("status");
    });

    assert!(sql(&q).contains("SELECT\n  t1.amount,\n  t1.status\n"));
}

#[test]
fn test_nested_pins() {
    let mut q = users();
    q.join().rel("orders").end_join();
    q.pin(|q| {
        q.join().rel("items").end_join();
        q.pin(|q| {
            q.order_by().field("sku").order("desc");
            assert_eq!(q.state().anchor(), "t2");
        });
        assert_eq!(q.state().anchor(), "t1");
        assert_eq!(q.state().current_alias(), "t2");
    });

    assert_eq!(q.state().anchor(), "t0");
    assert!(sql(&q).ends_with("ORDER BY t2.sku DESC"));
}

#[test]
fn test_pinx_binds_explicit_alias() {
    let mut q = users();
    q.pinx("Order", "latest", |q| {
        q.and_where().field("status").cmp("=", "open");
    });

    assert_eq!(q.state().entity_of("latest"), Some("Order"));
    assert!(q.state().relation("latest", "items").is_some());
    assert!(sql(&q).contains("WHERE latest.status = :p0"));
    assert_eq!(q.state().current_alias(), "t0");
}

#[test]
fn test_pinx_on_existing_alias() {
    let mut q = users();
    q.join().rel("orders").end_join().end_alias();
    q.pinx("Order", "t1", |q| {
        q.where_().field("amount").cmp("<", 5);
    });

    assert!(sql(&q).contains("WHERE t1.amount < :p0"));
}

#[test]
fn test_pinx_rejects_conflicting_binding() {
    let mut q = strict_users();
    let mut ran = false;
    q.pinx("Order", "t0", |_| ran = true);

    assert!(!ran);
    assert!(matches!(q.get_sql(), Err(QueryError::Misuse(_))));
}

#[test]
fn test_pinx_unknown_entity() {
    let mut q = strict_users();
    q.pinx("Ghost", "g", |_| {});
    assert_eq!(
        q.get_sql().unwrap_err(),
        QueryError::UnknownEntity("Ghost".into())
    );
}

#[test]
fn test_pin_by_name_requires_callback() {
    let mut q = strict_users();
    q.access("pinx").emit();
    assert_eq!(
        q.get_sql().unwrap_err(),
        QueryError::RequiresCallback(Method::Pinx)
    );
}
