// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Query statements
//!
//! This module represents the statements a schema's named queries are made
//! of: SELECT (including compound UNION/INTERSECT/EXCEPT chains), INSERT,
//! UPDATE and DELETE.
//!
//! ## SELECT structure
//!
//! A [`Select`] is a [`SelectBody`] (a single core or a compound tree) plus
//! the clauses that apply to the whole statement: ORDER BY, LIMIT, OFFSET.
//! A [`SelectCore`] carries the projection, FROM clause, WHERE, GROUP BY and
//! HAVING. Comma-separated FROM lists arrive from the parser as
//! [`JoinOp::Cross`] joins, so the resolver only ever sees one join chain.
//!
//! ## Named queries
//!
//! A [`NamedQuery`] pairs a statement with the identifier the emitter will
//! generate an accessor under.

use crate::expr::Expr;
use crate::span::Span;
use serde::{Deserialize, Serialize};

/// A full SELECT statement, possibly compound
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Select {
    pub body: SelectBody,
    pub order_by: Vec<OrderingTerm>,
    pub limit: Option<Expr>,
    pub offset: Option<Expr>,
    pub span: Span,
}

impl Select {
    pub fn new(core: SelectCore) -> Self {
        let span = core.span;
        Self {
            body: SelectBody::Select(core),
            order_by: Vec::new(),
            limit: None,
            offset: None,
            span,
        }
    }

    /// Combine with another SELECT under a compound operator
    ///
    /// The right-hand statement's ORDER BY/LIMIT are discarded; SQLite only
    /// allows them on the final statement of a compound chain.
    pub fn compound(self, op: CompoundOp, other: Select) -> Self {
        Self {
            body: SelectBody::Compound {
                op,
                left: Box::new(self.body),
                right: Box::new(other.body),
            },
            order_by: other.order_by,
            limit: other.limit,
            offset: other.offset,
            span: self.span,
        }
    }

    pub fn union(self, other: Select) -> Self {
        self.compound(CompoundOp::Union, other)
    }

    pub fn union_all(self, other: Select) -> Self {
        self.compound(CompoundOp::UnionAll, other)
    }

    pub fn with_order_by(mut self, terms: Vec<OrderingTerm>) -> Self {
        self.order_by = terms;
        self
    }

    pub fn with_limit(mut self, limit: Expr) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_offset(mut self, offset: Expr) -> Self {
        self.offset = Some(offset);
        self
    }
}

/// One ORDER BY term
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderingTerm {
    pub expr: Expr,
    pub ascending: bool,
}

/// The body of a SELECT: one core or a compound tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SelectBody {
    Select(SelectCore),
    Compound {
        op: CompoundOp,
        left: Box<SelectBody>,
        right: Box<SelectBody>,
    },
}

/// Compound SELECT operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompoundOp {
    Union,
    UnionAll,
    Intersect,
    Except,
}

/// A single SELECT core (projection + FROM + filters)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectCore {
    pub distinct: bool,
    pub projection: Vec<SelectItem>,
    pub from: Option<FromClause>,
    pub where_clause: Option<Expr>,
    pub group_by: Vec<Expr>,
    pub having: Option<Expr>,
    pub span: Span,
}

impl SelectCore {
    pub fn new() -> Self {
        Self {
            distinct: false,
            projection: Vec::new(),
            from: None,
            where_clause: None,
            group_by: Vec::new(),
            having: None,
            span: Span::default(),
        }
    }

    pub fn with_projection(mut self, projection: Vec<SelectItem>) -> Self {
        self.projection = projection;
        self
    }

    pub fn with_from(mut self, from: FromClause) -> Self {
        self.from = Some(from);
        self
    }

    pub fn with_where(mut self, where_clause: Expr) -> Self {
        self.where_clause = Some(where_clause);
        self
    }

    pub fn with_group_by(mut self, group_by: Vec<Expr>) -> Self {
        self.group_by = group_by;
        self
    }

    pub fn with_having(mut self, having: Expr) -> Self {
        self.having = Some(having);
        self
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Wrap this core into a full SELECT statement
    pub fn into_select(self) -> Select {
        Select::new(self)
    }
}

impl Default for SelectCore {
    fn default() -> Self {
        Self::new()
    }
}

/// One item of the SELECT projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SelectItem {
    /// An expression, optionally aliased (`expr AS alias`)
    Expr { expr: Expr, alias: Option<String> },
    /// Unqualified `*`
    Wildcard { span: Span },
    /// Qualified `table.*`
    TableWildcard { table: String, span: Span },
}

impl SelectItem {
    pub fn expr(expr: Expr) -> Self {
        SelectItem::Expr { expr, alias: None }
    }

    pub fn aliased(expr: Expr, alias: impl Into<String>) -> Self {
        SelectItem::Expr {
            expr,
            alias: Some(alias.into()),
        }
    }

    pub fn wildcard() -> Self {
        SelectItem::Wildcard {
            span: Span::default(),
        }
    }

    pub fn table_wildcard(table: impl Into<String>) -> Self {
        SelectItem::TableWildcard {
            table: table.into(),
            span: Span::default(),
        }
    }
}

/// FROM clause: a first source plus a join chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FromClause {
    pub source: SelectSource,
    pub joins: Vec<Join>,
}

impl FromClause {
    pub fn new(source: SelectSource) -> Self {
        Self {
            source,
            joins: Vec::new(),
        }
    }

    /// FROM clause over a single named table
    pub fn table(name: impl Into<String>) -> Self {
        Self::new(SelectSource::table(name))
    }

    pub fn with_join(mut self, join: Join) -> Self {
        self.joins.push(join);
        self
    }
}

/// One source in a FROM clause
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectSource {
    pub kind: SourceKind,
    pub alias: Option<String>,
    pub span: Span,
}

impl SelectSource {
    pub fn table(name: impl Into<String>) -> Self {
        Self {
            kind: SourceKind::Table(name.into()),
            alias: None,
            span: Span::default(),
        }
    }

    pub fn subquery(select: Select) -> Self {
        Self {
            kind: SourceKind::Subquery(Box::new(select)),
            alias: None,
            span: Span::default(),
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }
}

/// What a source refers to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SourceKind {
    /// A declared table or view
    Table(String),
    /// A parenthesized subquery
    Subquery(Box<Select>),
}

/// One join step in the chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Join {
    pub op: JoinOp,
    pub source: SelectSource,
    pub constraint: Option<JoinConstraint>,
}

impl Join {
    pub fn inner(source: SelectSource) -> Self {
        Self {
            op: JoinOp::Inner,
            source,
            constraint: None,
        }
    }

    pub fn left(source: SelectSource) -> Self {
        Self {
            op: JoinOp::Left,
            source,
            constraint: None,
        }
    }

    pub fn cross(source: SelectSource) -> Self {
        Self {
            op: JoinOp::Cross,
            source,
            constraint: None,
        }
    }

    pub fn on(mut self, expr: Expr) -> Self {
        self.constraint = Some(JoinConstraint::On(expr));
        self
    }

    pub fn using(mut self, columns: Vec<String>) -> Self {
        self.constraint = Some(JoinConstraint::Using(columns));
        self
    }
}

/// Join operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JoinOp {
    Inner,
    Left,
    Cross,
}

/// ON or USING constraint of a join
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum JoinConstraint {
    On(Expr),
    Using(Vec<String>),
}

/// A statement a named query can hold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Statement {
    Select(Select),
    Insert(Insert),
    Update(Update),
    Delete(Delete),
}

/// INSERT statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insert {
    pub table: String,
    /// Explicit column list; empty means declaration order
    pub columns: Vec<String>,
    pub source: InsertSource,
    pub span: Span,
}

impl Insert {
    pub fn new(table: impl Into<String>, source: InsertSource) -> Self {
        Self {
            table: table.into(),
            columns: Vec::new(),
            source,
            span: Span::default(),
        }
    }

    pub fn with_columns(mut self, columns: Vec<String>) -> Self {
        self.columns = columns;
        self
    }
}

/// Where an INSERT's rows come from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InsertSource {
    Values(Vec<Vec<Expr>>),
    Select(Box<Select>),
    DefaultValues,
}

/// UPDATE statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Update {
    pub table: String,
    pub assignments: Vec<Assignment>,
    pub where_clause: Option<Expr>,
    pub span: Span,
}

impl Update {
    pub fn new(table: impl Into<String>, assignments: Vec<Assignment>) -> Self {
        Self {
            table: table.into(),
            assignments,
            where_clause: None,
            span: Span::default(),
        }
    }

    pub fn with_where(mut self, where_clause: Expr) -> Self {
        self.where_clause = Some(where_clause);
        self
    }
}

/// One `column = value` assignment of an UPDATE
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub column: String,
    pub value: Expr,
}

impl Assignment {
    pub fn new(column: impl Into<String>, value: Expr) -> Self {
        Self {
            column: column.into(),
            value,
        }
    }
}

/// DELETE statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Delete {
    pub table: String,
    pub where_clause: Option<Expr>,
    pub span: Span,
}

impl Delete {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            where_clause: None,
            span: Span::default(),
        }
    }

    pub fn with_where(mut self, where_clause: Expr) -> Self {
        self.where_clause = Some(where_clause);
        self
    }
}

/// A statement with the name the emitter generates an accessor under
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedQuery {
    pub name: String,
    pub statement: Statement,
    pub span: Span,
}

impl NamedQuery {
    pub fn new(name: impl Into<String>, statement: Statement) -> Self {
        Self {
            name: name.into(),
            statement,
            span: Span::default(),
        }
    }

    pub fn select(name: impl Into<String>, select: Select) -> Self {
        Self::new(name, Statement::Select(select))
    }
}
