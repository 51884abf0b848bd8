//! Name classification priority and the non-strict fallback.

mod common;

use std::sync::Arc;

use common::{sql, strict_users, users};
use quill::prelude::*;

#[test]
fn test_method_spellings_are_interchangeable() {
    let mut camel = users();
    camel
        .access("innerJoinAndSelect")
        .emit()
        .rel("orders")
        .access("endJoin")
        .emit()
        .access("orderBy")
        .emit()
        .field("amount")
        .order("desc");

    let mut snake = users();
    snake
        .access("inner_join_and_select")
        .emit()
        .rel("orders")
        .access("end_join")
        .emit()
        .access("order_by")
        .emit()
        .field("amount")
        .order("desc");

    assert_eq!(sql(&camel), sql(&snake));
    assert!(sql(&camel).contains("t1.*"));
}

#[test]
fn test_method_wins_over_relation_of_same_name() {
    let catalog = Catalog::new()
        .entity(
            EntityMetadata::new("Account")
                .relation(RelationDescriptor::one_to_many("select", "Entry", "account_id")),
        )
        .entity(EntityMetadata::new("Entry"));
    let mut q = FluentQuery::new(
        Arc::new(catalog),
        Arc::new(MemorySession::new()),
        "Account",
    )
    .unwrap();

    q.join().access("select").emit();
    assert_eq!(q.state().mode(), OperationMode::Select);
    assert!(q.state().child_alias("t0", "select").is_none());
}

#[test]
fn test_relation_wins_over_field() {
    let mut q = users();
    q.select().col("orders").col("id");

    // "orders" moved the cursor instead of selecting a column.
    assert!(sql(&q).contains("SELECT\n  t1.id\n"));
}

#[test]
fn test_unmodeled_access_is_silent_by_default() {
    let mut q = users();
    q.col("whatever").access("nothing").call(&[Value::Int(1)]);
    q.join().rel("nowhere").end_join();

    assert!(q.state().error().is_none());
    assert_eq!(
        sql(&q),
        "SELECT\n  t0.*\nFROM users AS t0"
    );
}

#[test]
fn test_strict_unknown_relation_in_join() {
    let mut q = strict_users();
    q.join().rel("orders").rel("nowhere").end_join();

    assert_eq!(
        q.get_sql().unwrap_err(),
        QueryError::UnknownRelation {
            alias: "t1".into(),
            relation: "nowhere".into()
        }
    );
}

#[test]
fn test_strict_keeps_first_error() {
    let mut q = strict_users();
    q.col("first").col("second");

    assert_eq!(
        q.state().error(),
        Some(&QueryError::UnmodeledAccess {
            name: "first".into(),
            mode: OperationMode::None
        })
    );
}

#[test]
fn test_mode_resets_after_leaf() {
    let mut q = users();
    q.where_().field("id").cmp("=", 1);
    assert_eq!(q.state().mode(), OperationMode::None);
    assert_eq!(q.state().current_alias(), "t0");

    q.select().col("id");
    assert_eq!(q.state().mode(), OperationMode::AddSelect);

    q.order_by().col("id");
    assert_eq!(q.state().mode(), OperationMode::AddOrderBy);
}

#[test]
fn test_limit_and_offset_by_name() {
    let mut q = users();
    q.access("limit")
        .call(&[Value::Int(5)])
        .access("offset")
        .call(&[Value::Int(15)]);
    assert!(sql(&q).ends_with("LIMIT 5 OFFSET 15"));

    q.access("limit").call(&[Value::Null]).access("offset").emit();
    assert!(!sql(&q).contains("LIMIT"));
}

#[test]
fn test_from_custom_builder() {
    let catalog: Arc<dyn MetadataProvider> = Arc::new(common::catalog());
    let builder = SelectBuilder::new(catalog.clone(), "Order", "o")
        .unwrap()
        .with_dialect(Dialect::MySql);
    let mut q =
        FluentQuery::from_builder(Box::new(builder), catalog, &QueryOptions::default()).unwrap();
    q.join().rel("items").end_join();

    let sql = sql(&q);
    assert!(sql.contains("FROM `orders` AS `o`"));
    assert!(sql.contains("INNER JOIN `items` AS `t1` ON `t1`.`order_id` = `o`.`id`"));
}

#[test]
fn test_method_casing_must_match_exactly() {
    let mut q = users();
    q.where_().field("Limit").cmp("=", 1);
    q.and_where().field("ALIAS").cmp("=", 2);
    assert_eq!(q.state().mode(), OperationMode::None);

    let sql = sql(&q);
    assert!(sql.contains("WHERE t0.Limit = :p0 AND t0.ALIAS = :p1"));
    assert!(!sql.contains("LIMIT"));
    assert_eq!(q.parameters().len(), 2);
}
