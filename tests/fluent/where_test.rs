//! WHERE / HAVING comparisons.

mod common;

use common::{sql, strict_users, users};
use quill::prelude::*;

#[test]
fn test_value_comparison_binds_one_parameter() {
    let mut q = users();
    q.where_().field("age").cmp(">=", 21);

    let sql = sql(&q);
    assert!(sql.contains("WHERE t0.age >= :p0"));
    assert_eq!(sql.matches(":p0").count(), 1);
    assert_eq!(q.parameters().len(), 1);
    assert_eq!(q.parameters()["p0"], Value::Int(21));
}

#[test]
fn test_null_comparison_binds_nothing() {
    let mut q = users();
    q.where_().field("deleted_at").cmp("=", Value::Null);
    assert!(sql(&q).contains("WHERE t0.deleted_at IS NULL"));
    assert!(q.parameters().is_empty());

    let mut q = users();
    q.where_().field("deleted_at").cmp("!=", None::<i64>);
    assert!(sql(&q).contains("WHERE t0.deleted_at IS NOT NULL"));
    assert!(q.parameters().is_empty());
}

#[test]
fn test_field_to_field_comparison() {
    let mut q = users();
    // end_join leaves the cursor on t1; stashing the operator returns it to t0.
    q.join()
        .rel("orders")
        .end_join()
        .where_()
        .field("user_id")
        .op("=")
        .field("id");

    let sql = sql(&q);
    assert!(sql.contains("WHERE t1.user_id = t0.id"), "{sql}");
    assert!(q.parameters().is_empty());
    assert!(q.state().pending().is_none());
}

#[test]
fn test_field_to_field_through_relation() {
    let mut q = users();
    q.join()
        .rel("orders")
        .rel("items")
        .end_join()
        .where_()
        .field("amount")
        .op(">")
        .rel("orders")
        .field("amount");

    assert!(sql(&q).contains("WHERE t2.amount > t1.amount"));
}

#[test]
fn test_field_to_field_on_same_alias() {
    let mut q = users();
    q.where_().field("created_at").op("<").field("updated_at");

    assert!(sql(&q).contains("WHERE t0.created_at < t0.updated_at"));
    assert!(q.parameters().is_empty());
}

#[test]
fn test_and_where_or_where() {
    let mut q = users();
    q.where_()
        .field("name")
        .cmp("like", "a%")
        .or_where()
        .field("email")
        .cmp("like", "%@example.com")
        .and_where()
        .field("active")
        .cmp("=", true);

    assert!(sql(&q).contains(
        "WHERE (t0.name LIKE :p0 OR t0.email LIKE :p1) AND t0.active = :p2"
    ));
    assert_eq!(q.parameters()["p1"], Value::from("%@example.com"));
}

#[test]
fn test_where_replaces_previous_where() {
    let mut q = users();
    q.where_().field("name").cmp("=", "ada");
    q.where_().field("name").cmp("=", "grace");

    let sql = sql(&q);
    assert!(sql.contains("WHERE t0.name = :p1"));
    assert!(!sql.contains(":p0"));
    assert_eq!(q.parameters().len(), 1);
    assert_eq!(q.parameters()["p1"], Value::from("grace"));

    let mut q = users();
    q.having().field("age").cmp(">", 1);
    q.having().field("age").cmp(">", 2);
    q.where_().field("age").cmp("<", 99);
    let names: Vec<_> = q.parameters().keys().cloned().collect();
    assert_eq!(names, vec!["p1", "p2"]);
}

#[test]
fn test_and_or_reapply_previous_family() {
    let mut q = users();
    q.where_()
        .field("age")
        .cmp(">", 18)
        .and()
        .field("age")
        .cmp("<", 65)
        .or()
        .field("active")
        .cmp("=", false);

    assert!(sql(&q).contains("WHERE t0.age > :p0 AND t0.age < :p1 OR t0.active = :p2"));
}

#[test]
fn test_and_without_previous_clause_is_noop() {
    let mut q = users();
    q.and().field("age").cmp(">", 18);

    assert!(!sql(&q).contains("WHERE"));
    assert_eq!(q.state().mode(), OperationMode::None);
}

#[test]
fn test_having_family() {
    let mut q = users();
    q.qb(|qb| qb.group_by("t0.age"))
        .having()
        .field("age")
        .cmp(">", 30)
        .or_having()
        .field("age")
        .cmp("<", 20);

    let sql = sql(&q);
    assert!(sql.contains("GROUP BY t0.age"));
    assert!(sql.contains("HAVING t0.age > :p0 OR t0.age < :p1"));
}

#[test]
fn test_in_list_binds_each_element() {
    let mut q = users();
    q.where_().field("id").cmp("in", vec![1, 2, 3]);

    assert!(sql(&q).contains("WHERE t0.id IN (:p0, :p1, :p2)"));
    assert_eq!(q.parameters().len(), 3);

    let mut q = users();
    q.where_().field("id").cmp("not in", Vec::<i64>::new());
    assert!(sql(&q).contains("WHERE TRUE"));
}

#[test]
fn test_parameter_names_are_unique() {
    let mut q = users();
    for age in [10, 20, 30] {
        q.or_where().field("age").cmp("=", age);
    }
    let names: Vec<_> = q.parameters().keys().cloned().collect();
    assert_eq!(names, vec!["p0", "p1", "p2"]);
}

#[test]
fn test_other_operators_pass_through() {
    let mut q = users();
    q.where_().field("tags").cmp("@>", "{vip}");
    assert!(sql(&q).contains("WHERE t0.tags @> :p0"));
    assert_eq!(q.parameters()["p0"], Value::from("{vip}"));

    let mut q = users();
    q.where_()
        .field("tenant_id")
        .cmp("=", 7)
        .and_where()
        .field("name")
        .cmp(" ~* ", "^a");
    assert!(sql(&q).contains("WHERE t0.tenant_id = :p0 AND t0.name ~* :p1"));
    assert_eq!(q.parameters().len(), 2);

    let mut q = users();
    q.where_().field("age").cmp("between", 3);
    assert!(sql(&q).contains("WHERE t0.age between :p0"));

    let mut q = users();
    q.where_().field("age").op("<=>").field("id");
    assert!(sql(&q).contains("WHERE t0.age <=> t0.id"));
}

#[test]
fn test_unusable_operator() {
    let mut q = users();
    q.where_().field("age").cmp("= 1; --", 1);
    assert!(!sql(&q).contains("WHERE"));
    assert!(q.parameters().is_empty());

    let mut q = strict_users();
    q.where_().field("age").cmp("= 1; --", 1);
    assert_eq!(
        q.get_sql().unwrap_err(),
        QueryError::UnknownOperator("= 1; --".into())
    );

    let mut q = strict_users();
    q.where_().field("age").call(&[Value::from(5), Value::from(1)]);
    assert_eq!(
        q.get_sql().unwrap_err(),
        QueryError::UnknownOperator("Int(5)".into())
    );
}

#[test]
fn test_field_without_operator_emits_nothing() {
    let mut q = users();
    q.where_().col("age");
    assert!(!sql(&q).contains("WHERE"));
    assert!(q.state().pending().is_none());

    let mut q = users();
    q.where_().rel("orders").col("amount");
    assert_eq!(q.state().current_alias(), "t0");
    assert!(!sql(&q).contains("WHERE"));
}
