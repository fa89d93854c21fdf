// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # sql-typegen - Parse-tree input contract
//!
//! This crate defines the node types the (external) SQL parser hands to the
//! compiler: schema declarations, query statements and expressions. The
//! nodes are designed to:
//! - Carry source positions on everything a build error can point at
//! - Model expressions as a closed tagged union for exhaustive resolution
//! - Round-trip through serde so tooling and golden tests can snapshot them

pub mod decl;
pub mod expr;
pub mod query;
pub mod span;
pub mod types;

// Re-export commonly used types
pub use decl::{
    ColumnConstraint, ColumnDeclaration, Declaration, TableConstraint, TableDeclaration,
    TriggerDeclaration, TriggerEvent, ViewDeclaration,
};
pub use expr::{
    BinaryOp, ColumnRef, Expr, InOperand, Literal, Placeholder, PlaceholderKind, UnaryOp,
    WhenClause,
};
pub use query::{
    Assignment, CompoundOp, Delete, FromClause, Insert, InsertSource, Join, JoinConstraint,
    JoinOp, NamedQuery, OrderingTerm, Select, SelectBody, SelectCore, SelectItem, SelectSource,
    SourceKind, Statement, Update,
};
pub use span::Span;
pub use types::{SqlType, TypeClause};
