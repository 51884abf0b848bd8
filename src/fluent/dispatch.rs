//! Name classification tables: engine methods, operation modes and what a
//! field access means in each mode.

use std::fmt;
use std::str::FromStr;

use inflector::Inflector;

use crate::builder::{ClauseFamily, JoinKind, Link};

/// Operations the engine defines. These win over relation and field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Select,
    AddSelect,
    Where,
    AndWhere,
    OrWhere,
    Having,
    AndHaving,
    OrHaving,
    OrderBy,
    AddOrderBy,
    Asc,
    Desc,
    NullsFirst,
    NullsLast,
    Join,
    InnerJoin,
    LeftJoin,
    InnerJoinAndSelect,
    LeftJoinAndSelect,
    EndJoin,
    Alias,
    As,
    EndAlias,
    Scope,
    Pin,
    Pinx,
    And,
    Or,
    Limit,
    Offset,
    Qb,
    GetOne,
    GetMany,
    GetSql,
    PrintSql,
}

impl Method {
    const ALL: [Method; 35] = [
        Method::Select,
        Method::AddSelect,
        Method::Where,
        Method::AndWhere,
        Method::OrWhere,
        Method::Having,
        Method::AndHaving,
        Method::OrHaving,
        Method::OrderBy,
        Method::AddOrderBy,
        Method::Asc,
        Method::Desc,
        Method::NullsFirst,
        Method::NullsLast,
        Method::Join,
        Method::InnerJoin,
        Method::LeftJoin,
        Method::InnerJoinAndSelect,
        Method::LeftJoinAndSelect,
        Method::EndJoin,
        Method::Alias,
        Method::As,
        Method::EndAlias,
        Method::Scope,
        Method::Pin,
        Method::Pinx,
        Method::And,
        Method::Or,
        Method::Limit,
        Method::Offset,
        Method::Qb,
        Method::GetOne,
        Method::GetMany,
        Method::GetSql,
        Method::PrintSql,
    ];

    /// camelCase name.
    pub fn name(&self) -> &'static str {
        match self {
            Method::Select => "select",
            Method::AddSelect => "addSelect",
            Method::Where => "where",
            Method::AndWhere => "andWhere",
            Method::OrWhere => "orWhere",
            Method::Having => "having",
            Method::AndHaving => "andHaving",
            Method::OrHaving => "orHaving",
            Method::OrderBy => "orderBy",
            Method::AddOrderBy => "addOrderBy",
            Method::Asc => "asc",
            Method::Desc => "desc",
            Method::NullsFirst => "nullsFirst",
            Method::NullsLast => "nullsLast",
            Method::Join => "join",
            Method::InnerJoin => "innerJoin",
            Method::LeftJoin => "leftJoin",
            Method::InnerJoinAndSelect => "innerJoinAndSelect",
            Method::LeftJoinAndSelect => "leftJoinAndSelect",
            Method::EndJoin => "endJoin",
            Method::Alias => "alias",
            Method::As => "as",
            Method::EndAlias => "endAlias",
            Method::Scope => "scope",
            Method::Pin => "pin",
            Method::Pinx => "pinx",
            Method::And => "and",
            Method::Or => "or",
            Method::Limit => "limit",
            Method::Offset => "offset",
            Method::Qb => "qb",
            Method::GetOne => "getOne",
            Method::GetMany => "getMany",
            Method::GetSql => "getSql",
            Method::PrintSql => "printSql",
        }
    }
}

impl FromStr for Method {
    type Err = ();

    /// Matches the exact camelCase name or its snake_case form, either one
    /// optionally followed by a single `_` (`where_`, `as_`, `order_by`).
    /// Any other casing is a field name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.strip_suffix('_').unwrap_or(s);
        if name.is_empty() {
            return Err(());
        }
        Method::ALL
            .iter()
            .find(|m| m.name() == name || m.name().to_snake_case() == name)
            .copied()
            .ok_or(())
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The clause currently being built. Decides what a field access means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OperationMode {
    #[default]
    None,
    Select,
    AddSelect,
    Where,
    AndWhere,
    OrWhere,
    Having,
    AndHaving,
    OrHaving,
    OrderBy,
    AddOrderBy,
    Join {
        kind: JoinKind,
        with_select: bool,
    },
    Alias,
    Scope,
}

impl OperationMode {
    pub fn is_select(&self) -> bool {
        matches!(self, OperationMode::Select | OperationMode::AddSelect)
    }

    /// Condition slot and link for where/having modes.
    pub fn comparison(&self) -> Option<(ClauseFamily, Link)> {
        match self {
            OperationMode::Where => Some((ClauseFamily::Where, Link::Replace)),
            OperationMode::AndWhere => Some((ClauseFamily::Where, Link::And)),
            OperationMode::OrWhere => Some((ClauseFamily::Where, Link::Or)),
            OperationMode::Having => Some((ClauseFamily::Having, Link::Replace)),
            OperationMode::AndHaving => Some((ClauseFamily::Having, Link::And)),
            OperationMode::OrHaving => Some((ClauseFamily::Having, Link::Or)),
            _ => None,
        }
    }

    pub fn is_order(&self) -> bool {
        matches!(self, OperationMode::OrderBy | OperationMode::AddOrderBy)
    }

    /// Modes in which only relation names are meaningful.
    pub fn is_traversal(&self) -> bool {
        matches!(self, OperationMode::Join { .. } | OperationMode::Alias)
    }

    /// The AND/OR re-entry mode for a clause family.
    pub fn chained(family: ClauseFamily, link: Link) -> Self {
        match (family, link) {
            (ClauseFamily::Where, Link::Replace) => OperationMode::Where,
            (ClauseFamily::Where, Link::And) => OperationMode::AndWhere,
            (ClauseFamily::Where, Link::Or) => OperationMode::OrWhere,
            (ClauseFamily::Having, Link::Replace) => OperationMode::Having,
            (ClauseFamily::Having, Link::And) => OperationMode::AndHaving,
            (ClauseFamily::Having, Link::Or) => OperationMode::OrHaving,
        }
    }
}

impl fmt::Display for OperationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OperationMode::None => "none",
            OperationMode::Select => "select",
            OperationMode::AddSelect => "addSelect",
            OperationMode::Where => "where",
            OperationMode::AndWhere => "andWhere",
            OperationMode::OrWhere => "orWhere",
            OperationMode::Having => "having",
            OperationMode::AndHaving => "andHaving",
            OperationMode::OrHaving => "orHaving",
            OperationMode::OrderBy => "orderBy",
            OperationMode::AddOrderBy => "addOrderBy",
            OperationMode::Join {
                kind: JoinKind::Inner,
                with_select: false,
            } => "innerJoin",
            OperationMode::Join {
                kind: JoinKind::Left,
                with_select: false,
            } => "leftJoin",
            OperationMode::Join {
                kind: JoinKind::Inner,
                with_select: true,
            } => "innerJoinAndSelect",
            OperationMode::Join {
                kind: JoinKind::Left,
                with_select: true,
            } => "leftJoinAndSelect",
            OperationMode::Alias => "alias",
            OperationMode::Scope => "scope",
        };
        f.write_str(name)
    }
}
