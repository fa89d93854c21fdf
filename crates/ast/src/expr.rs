// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Expressions
//!
//! This module represents SQL expressions as handed over by the parser.
//!
//! ## Design
//!
//! Expressions are a closed tagged union; the resolver matches on it
//! exhaustively, so adding a variant is a compile-visible change everywhere
//! a type or nullability rule must be decided. An expression can be:
//!
//! - **Column references**: `column` or `table.column`
//! - **Literal values**: numbers, strings, blobs, NULL
//! - **Function calls**: `count(*)`, `coalesce(a, b)`, including DISTINCT
//! - **Binary/unary operations**: arithmetic, comparison, logical, pattern
//! - **CASE expressions**: with or without an operand and ELSE branch
//! - **CAST expressions**: carrying a full [`TypeClause`]
//! - **Scalar subqueries**: `(SELECT ...)` in expression position
//! - **IN expressions**: against a list, a subquery, or a single placeholder
//! - **Placeholders**: `?`, `?N` and `:name` bind sites
//!
//! ## Placeholders
//!
//! [`Placeholder`] occurrences are left in place by the parser; the argument
//! binder assigns positions following SQLite's numbering rule and collapses
//! repeated names/indices to one logical argument.

use crate::query::Select;
use crate::span::Span;
use crate::types::TypeClause;
use serde::{Deserialize, Serialize};

/// A SQL expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    /// Literal value
    Literal(Literal),

    /// Column reference (e.g., `table.column` or just `column`)
    Column(ColumnRef),

    /// Function call (e.g., `count(*)`, `max(score)`)
    Call {
        name: String,
        args: Vec<Expr>,
        distinct: bool,
        span: Span,
    },

    /// Binary operation (e.g., `a + b`, `x = 5`)
    BinaryOp {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
    },

    /// Unary operation (e.g., `-x`, `NOT a`)
    UnaryOp { op: UnaryOp, expr: Box<Expr> },

    /// CASE expression
    Case {
        operand: Option<Box<Expr>>,
        when_clauses: Vec<WhenClause>,
        else_clause: Option<Box<Expr>>,
    },

    /// CAST expression
    Cast { expr: Box<Expr>, as_type: TypeClause },

    /// Scalar subquery
    Subquery(Box<Select>),

    /// IN expression
    In {
        expr: Box<Expr>,
        operand: InOperand,
        negated: bool,
    },

    /// Bind-parameter occurrence
    Placeholder(Placeholder),

    /// `*` inside an aggregate call (e.g., `count(*)`)
    Wildcard(Span),

    /// Parenthesized expression
    Paren(Box<Expr>),
}

impl Expr {
    /// Unqualified column reference
    pub fn column(name: impl Into<String>) -> Self {
        Expr::Column(ColumnRef::new(name))
    }

    /// Qualified column reference (`table.column`)
    pub fn qualified(table: impl Into<String>, name: impl Into<String>) -> Self {
        Expr::Column(ColumnRef::new(name).with_table(table))
    }

    pub fn integer(value: i64) -> Self {
        Expr::Literal(Literal::Integer(value))
    }

    pub fn real(value: f64) -> Self {
        Expr::Literal(Literal::Real(value))
    }

    pub fn string(value: impl Into<String>) -> Self {
        Expr::Literal(Literal::String(value.into()))
    }

    pub fn null() -> Self {
        Expr::Literal(Literal::Null)
    }

    pub fn binary(left: Expr, op: BinaryOp, right: Expr) -> Self {
        Expr::BinaryOp {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    pub fn call(name: impl Into<String>, args: Vec<Expr>) -> Self {
        Expr::Call {
            name: name.into(),
            args,
            distinct: false,
            span: Span::default(),
        }
    }

    pub fn paren(expr: Expr) -> Self {
        Expr::Paren(Box::new(expr))
    }

    /// Anonymous `?` placeholder
    pub fn placeholder() -> Self {
        Expr::Placeholder(Placeholder::anonymous())
    }

    /// Explicit `?N` placeholder
    pub fn indexed_placeholder(index: u32) -> Self {
        Expr::Placeholder(Placeholder::indexed(index))
    }

    /// Named `:name` placeholder
    pub fn named_placeholder(name: impl Into<String>) -> Self {
        Expr::Placeholder(Placeholder::named(name))
    }
}

/// One `WHEN condition THEN result` arm of a CASE expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhenClause {
    pub condition: Expr,
    pub result: Expr,
}

/// Right-hand side of an IN expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InOperand {
    /// `IN (expr, expr, ...)`
    List(Vec<Expr>),
    /// `IN ?`, a collection-valued argument expanded at emission time
    Placeholder(Placeholder),
    /// `IN (SELECT ...)`
    Subquery(Box<Select>),
}

/// Column reference
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnRef {
    /// Optional table/alias qualifier
    pub table: Option<String>,
    /// Column name
    pub column: String,
    /// Position of the reference in the source
    pub span: Span,
}

impl ColumnRef {
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            table: None,
            column: column.into(),
            span: Span::default(),
        }
    }

    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// The reference as written (`table.column` or `column`)
    pub fn qualified(&self) -> String {
        match &self.table {
            Some(table) => format!("{}.{}", table, self.column),
            None => self.column.clone(),
        }
    }
}

/// A bind-parameter occurrence in the statement text
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Placeholder {
    pub kind: PlaceholderKind,
    pub span: Span,
}

impl Placeholder {
    pub fn anonymous() -> Self {
        Self {
            kind: PlaceholderKind::Anonymous,
            span: Span::default(),
        }
    }

    pub fn indexed(index: u32) -> Self {
        Self {
            kind: PlaceholderKind::Indexed(index),
            span: Span::default(),
        }
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            kind: PlaceholderKind::Named(name.into()),
            span: Span::default(),
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// The placeholder as written in the statement text
    pub fn token(&self) -> String {
        match &self.kind {
            PlaceholderKind::Anonymous => "?".to_string(),
            PlaceholderKind::Indexed(index) => format!("?{}", index),
            PlaceholderKind::Named(name) => format!(":{}", name),
        }
    }
}

/// Placeholder syntax variants
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlaceholderKind {
    /// `?`
    Anonymous,
    /// `?N` (1-based)
    Indexed(u32),
    /// `:name`
    Named(String),
}

/// Literal value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    Null,
    Integer(i64),
    Real(f64),
    String(String),
    Blob(Vec<u8>),
    Boolean(bool),
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,

    // String
    Concat,

    // Comparison
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,

    // Logical
    And,
    Or,

    // Pattern
    Like,
    Glob,

    // Null-aware
    Is,
    IsNot,
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOp {
    Neg,
    Not,
}
