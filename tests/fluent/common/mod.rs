//! Shared fixture: a small shop catalog.
//!
//! ```text
//! User --orders--> Order --items--> Item
//!  |  \--profile--> Profile        \--user--> User
//!  \--roles (user_roles)--> Role
//! ```

#![allow(dead_code)]

use std::sync::Arc;

use quill::prelude::*;

pub fn catalog() -> Catalog {
    Catalog::new()
        .entity(
            EntityMetadata::new("User")
                .columns(&["id", "name", "email", "age", "active", "deleted_at"])
                .relation(RelationDescriptor::one_to_many("orders", "Order", "user_id"))
                .relation(RelationDescriptor::one_to_one(
                    "profile",
                    "Profile",
                    JoinColumns {
                        local: None,
                        foreign: Some("user_id".into()),
                    },
                ))
                .relation(RelationDescriptor::many_to_many(
                    "roles",
                    "Role",
                    Junction {
                        table: "user_roles".into(),
                        source_column: "user_id".into(),
                        target_column: "role_id".into(),
                    },
                ))
                .scope("active", |q, _args| {
                    q.and_where().field("active").cmp("=", true);
                })
                .scope("olderThan", |q, args| {
                    let age = args.first().cloned().unwrap_or(Value::Int(18));
                    q.and_where().field("age").cmp(">", age);
                })
                .scope("withBigOrders", |q, _args| {
                    q.join()
                        .rel("orders")
                        .end_join()
                        .and_where()
                        .field("amount")
                        .cmp(">=", 1000);
                }),
        )
        .entity(
            EntityMetadata::new("Order")
                .columns(&["id", "user_id", "amount", "status", "created_at"])
                .relation(RelationDescriptor::many_to_one("user", "User", "user_id"))
                .relation(RelationDescriptor::one_to_many("items", "Item", "order_id"))
                .scope("shipped", |q, _args| {
                    q.and_where().field("status").cmp("=", "shipped");
                }),
        )
        .entity(
            EntityMetadata::new("Item")
                .columns(&["id", "order_id", "sku", "amount"])
                .relation(RelationDescriptor::many_to_one("order", "Order", "order_id")),
        )
        .entity(EntityMetadata::new("Profile").columns(&["id", "user_id", "bio"]))
        .entity(EntityMetadata::new("Role").columns(&["id", "name"]))
}

pub fn users() -> FluentQuery {
    users_with(QueryOptions::default())
}

pub fn strict_users() -> FluentQuery {
    users_with(QueryOptions::default().strict(true))
}

pub fn users_with(options: QueryOptions) -> FluentQuery {
    query("User", Arc::new(MemorySession::new()), options)
}

pub fn query(entity: &str, session: Arc<MemorySession>, options: QueryOptions) -> FluentQuery {
    FluentQuery::with_options(Arc::new(catalog()), session, entity, &options)
        .expect("fixture entity exists")
}

/// Rendered SQL, panicking on a recorded error.
pub fn sql(q: &FluentQuery) -> String {
    q.get_sql().expect("query renders")
}
