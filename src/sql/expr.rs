//! Expression AST - conditions, column references and bound parameters.
//!
//! This module provides a strongly-typed AST for the SQL expressions the
//! query engine emits, with exhaustive pattern matching enforced by the
//! compiler.

use std::fmt;
use std::str::FromStr;

use super::dialect::Dialect;
use super::token::{Token, TokenStream};

// =============================================================================
// Expression AST
// =============================================================================

/// A SQL expression.
///
/// Every variant must be handled in `to_tokens()` - the compiler enforces this.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Column reference: optional_table.column
    Column {
        table: Option<String>,
        column: String,
    },

    /// Literal values
    Literal(Literal),

    /// Named bound parameter: `:name`
    Param(String),

    /// Binary operation: left op right
    BinaryOp {
        left: Box<Expr>,
        op: BinaryOperator,
        right: Box<Expr>,
    },

    /// IN: expr IN (values...)
    In {
        expr: Box<Expr>,
        values: Vec<Expr>,
        negated: bool,
    },

    /// IS NULL / IS NOT NULL
    IsNull { expr: Box<Expr>, negated: bool },

    /// Wildcard: * or table.*
    Star { table: Option<String> },

    /// Parenthesized expression
    Paren(Box<Expr>),
}

/// Literal values.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i64),
    Float(f64),
    String(String),
    Bool(bool),
    Null,
}

/// Binary operators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BinaryOperator {
    // Comparison
    Eq,
    Ne,
    Lt,
    Gt,
    Lte,
    Gte,
    // Logical
    And,
    Or,
    // String
    Like,
    NotLike,
    ILike,
    // Identity
    Is,
    IsNot,
    /// Any other operator, written out as given (`@>`, `~*`, `between`).
    Custom(String),
}

// =============================================================================
// Comparison operators as written by callers
// =============================================================================

/// A comparison operator given as a string in a where/having leaf.
///
/// Operators the engine knows get their own variant. Anything else is carried
/// through as [`CompareOp::Other`] so that dialect-specific operators reach
/// the SQL untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Gt,
    Lte,
    Gte,
    Like,
    NotLike,
    ILike,
    In,
    NotIn,
    Is,
    IsNot,
    /// Whitespace-normalized operator text, emitted verbatim.
    Other(String),
}

impl FromStr for CompareOp {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.split_whitespace().collect::<Vec<_>>().join(" ");
        match normalized.to_ascii_lowercase().as_str() {
            "=" | "==" | "eq" => Ok(CompareOp::Eq),
            "!=" | "<>" | "ne" => Ok(CompareOp::Ne),
            "<" | "lt" => Ok(CompareOp::Lt),
            ">" | "gt" => Ok(CompareOp::Gt),
            "<=" | "lte" => Ok(CompareOp::Lte),
            ">=" | "gte" => Ok(CompareOp::Gte),
            "like" => Ok(CompareOp::Like),
            "not like" => Ok(CompareOp::NotLike),
            "ilike" => Ok(CompareOp::ILike),
            "in" => Ok(CompareOp::In),
            "not in" => Ok(CompareOp::NotIn),
            "is" => Ok(CompareOp::Is),
            "is not" => Ok(CompareOp::IsNot),
            _ if is_passthrough_operator(&normalized) => Ok(CompareOp::Other(normalized)),
            _ => Err(s.to_string()),
        }
    }
}

/// An operator that can be written into the statement as-is: non-empty, and
/// free of quotes, parentheses, statement separators and comment openers.
fn is_passthrough_operator(op: &str) -> bool {
    !op.is_empty()
        && !op.contains("--")
        && !op.contains("/*")
        && op
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == ' ' || "_+-*/<>=~!@#%^&|`?".contains(c))
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "<>",
            CompareOp::Lt => "<",
            CompareOp::Gt => ">",
            CompareOp::Lte => "<=",
            CompareOp::Gte => ">=",
            CompareOp::Like => "LIKE",
            CompareOp::NotLike => "NOT LIKE",
            CompareOp::ILike => "ILIKE",
            CompareOp::In => "IN",
            CompareOp::NotIn => "NOT IN",
            CompareOp::Is => "IS",
            CompareOp::IsNot => "IS NOT",
            CompareOp::Other(op) => op,
        };
        f.write_str(s)
    }
}

impl CompareOp {
    /// Build `left <op> right`. `IN`/`NOT IN` wrap a single right-hand side.
    pub fn apply(&self, left: Expr, right: Expr) -> Expr {
        match self {
            CompareOp::In | CompareOp::NotIn => self.apply_list(left, vec![right]),
            _ => Expr::BinaryOp {
                left: Box::new(left),
                op: self.binary_operator(),
                right: Box::new(right),
            },
        }
    }

    /// Build `left IN (items...)` / `left NOT IN (items...)`. Other operators
    /// compare against the first item.
    pub fn apply_list(&self, left: Expr, items: Vec<Expr>) -> Expr {
        match self {
            CompareOp::In | CompareOp::NotIn => Expr::In {
                expr: Box::new(left),
                values: items,
                negated: matches!(self, CompareOp::NotIn),
            },
            _ => {
                let right = items.into_iter().next().unwrap_or(Expr::Literal(Literal::Null));
                self.apply(left, right)
            }
        }
    }

    /// Build the comparison of `left` against NULL.
    ///
    /// Equality and identity collapse to `IS NULL` / `IS NOT NULL`; any other
    /// operator is kept verbatim against a NULL literal.
    pub fn apply_null(&self, left: Expr) -> Expr {
        match self {
            CompareOp::Eq | CompareOp::Is => Expr::IsNull {
                expr: Box::new(left),
                negated: false,
            },
            CompareOp::Ne | CompareOp::IsNot => Expr::IsNull {
                expr: Box::new(left),
                negated: true,
            },
            _ => self.apply(left, Expr::Literal(Literal::Null)),
        }
    }

    fn binary_operator(&self) -> BinaryOperator {
        match self {
            CompareOp::Eq | CompareOp::In => BinaryOperator::Eq,
            CompareOp::Ne | CompareOp::NotIn => BinaryOperator::Ne,
            CompareOp::Lt => BinaryOperator::Lt,
            CompareOp::Gt => BinaryOperator::Gt,
            CompareOp::Lte => BinaryOperator::Lte,
            CompareOp::Gte => BinaryOperator::Gte,
            CompareOp::Like => BinaryOperator::Like,
            CompareOp::NotLike => BinaryOperator::NotLike,
            CompareOp::ILike => BinaryOperator::ILike,
            CompareOp::Is => BinaryOperator::Is,
            CompareOp::IsNot => BinaryOperator::IsNot,
            CompareOp::Other(op) => BinaryOperator::Custom(op.clone()),
        }
    }
}

// =============================================================================
// Expression to Tokens
// =============================================================================

impl Expr {
    /// Convert this expression to a token stream (dialect-agnostic).
    pub fn to_tokens(&self) -> TokenStream {
        let mut ts = TokenStream::new();

        match self {
            Expr::Column { table, column } => {
                if let Some(t) = table {
                    ts.push(Token::Ident(t.clone()));
                    ts.push(Token::Dot);
                }
                ts.push(Token::Ident(column.clone()));
            }

            Expr::Literal(lit) => {
                ts.push(match lit {
                    Literal::Int(n) => Token::LitInt(*n),
                    Literal::Float(f) => Token::LitFloat(*f),
                    Literal::String(s) => Token::LitString(s.clone()),
                    Literal::Bool(b) => Token::LitBool(*b),
                    Literal::Null => Token::LitNull,
                });
            }

            Expr::Param(name) => {
                ts.push(Token::Param(name.clone()));
            }

            Expr::BinaryOp { left, op, right } => {
                ts.append(&left.to_tokens());
                ts.space();
                ts.push(binary_op_to_token(op));
                ts.space();
                ts.append(&right.to_tokens());
            }

            Expr::In {
                expr,
                values,
                negated,
            } => {
                // Empty IN list: "x IN ()" is invalid SQL
                // "x IN ()" should be FALSE, "x NOT IN ()" should be TRUE
                if values.is_empty() {
                    ts.push(if *negated { Token::True } else { Token::False });
                } else {
                    ts.append(&expr.to_tokens());
                    if *negated {
                        ts.space().push(Token::Not);
                    }
                    ts.space().push(Token::In).space().lparen();
                    for (i, val) in values.iter().enumerate() {
                        if i > 0 {
                            ts.comma().space();
                        }
                        ts.append(&val.to_tokens());
                    }
                    ts.rparen();
                }
            }

            Expr::IsNull { expr, negated } => {
                ts.append(&expr.to_tokens());
                ts.space();
                ts.push(if *negated {
                    Token::IsNotNull
                } else {
                    Token::IsNull
                });
            }

            Expr::Star { table } => {
                if let Some(t) = table {
                    ts.push(Token::Ident(t.clone()));
                    ts.push(Token::Dot);
                }
                ts.push(Token::Star);
            }

            Expr::Paren(inner) => {
                ts.lparen();
                ts.append(&inner.to_tokens());
                ts.rparen();
            }
        }

        ts
    }

    /// Render with named placeholders for the given dialect.
    pub fn to_sql(&self, dialect: Dialect) -> String {
        self.to_tokens().serialize(dialect)
    }

    /// Names of the parameters this expression binds, left to right.
    pub fn param_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_params(&mut names);
        names
    }

    fn collect_params<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            Expr::Param(name) => names.push(name),
            Expr::BinaryOp { left, right, .. } => {
                left.collect_params(names);
                right.collect_params(names);
            }
            Expr::In { expr, values, .. } => {
                expr.collect_params(names);
                values.iter().for_each(|v| v.collect_params(names));
            }
            Expr::IsNull { expr, .. } => expr.collect_params(names),
            Expr::Paren(inner) => inner.collect_params(names),
            Expr::Column { .. } | Expr::Literal(_) | Expr::Star { .. } => {}
        }
    }
}

fn binary_op_to_token(op: &BinaryOperator) -> Token {
    match op {
        BinaryOperator::Eq => Token::Eq,
        BinaryOperator::Ne => Token::Ne,
        BinaryOperator::Lt => Token::Lt,
        BinaryOperator::Gt => Token::Gt,
        BinaryOperator::Lte => Token::Lte,
        BinaryOperator::Gte => Token::Gte,
        BinaryOperator::And => Token::And,
        BinaryOperator::Or => Token::Or,
        BinaryOperator::Like => Token::Like,
        BinaryOperator::NotLike => Token::NotLike,
        BinaryOperator::ILike => Token::ILike,
        BinaryOperator::Is => Token::Is,
        BinaryOperator::IsNot => Token::IsNot,
        BinaryOperator::Custom(op) => Token::Operator(op.clone()),
    }
}

// =============================================================================
// Expression Constructors
// =============================================================================

/// Create a column reference.
pub fn col(name: &str) -> Expr {
    Expr::Column {
        table: None,
        column: name.into(),
    }
}

/// Create a qualified column reference (table.column).
pub fn table_col(table: &str, column: &str) -> Expr {
    Expr::Column {
        table: Some(table.into()),
        column: column.into(),
    }
}

/// Parse an alias-qualified reference: `t1.amount` is a qualified column,
/// `amount` a bare one.
pub fn column_ref(path: &str) -> Expr {
    match path.split_once('.') {
        Some((table, column)) => table_col(table, column),
        None => col(path),
    }
}

/// Create a named parameter reference.
pub fn param(name: &str) -> Expr {
    Expr::Param(name.into())
}

/// Create a qualified star (table.*) expression.
pub fn table_star(table: &str) -> Expr {
    Expr::Star {
        table: Some(table.into()),
    }
}

// =============================================================================
// Fluent combinators
// =============================================================================

/// Extension methods to build conditions fluently.
pub trait ExprExt: Sized {
    fn into_expr(self) -> Expr;

    fn eq(self, other: impl Into<Expr>) -> Expr {
        Expr::BinaryOp {
            left: Box::new(self.into_expr()),
            op: BinaryOperator::Eq,
            right: Box::new(other.into()),
        }
    }

    fn and(self, other: impl Into<Expr>) -> Expr {
        Expr::BinaryOp {
            left: Box::new(self.into_expr()),
            op: BinaryOperator::And,
            right: Box::new(other.into()),
        }
    }

    fn or(self, other: impl Into<Expr>) -> Expr {
        Expr::BinaryOp {
            left: Box::new(self.into_expr()),
            op: BinaryOperator::Or,
            right: Box::new(other.into()),
        }
    }

    fn paren(self) -> Expr {
        Expr::Paren(Box::new(self.into_expr()))
    }
}

impl ExprExt for Expr {
    fn into_expr(self) -> Expr {
        self
    }
}
