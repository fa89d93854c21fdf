// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # sql-typegen - Semantic analysis
//!
//! The resolution engine: given a built schema, computes each statement's
//! result shape (column names, types, nullability, provenance) and argument
//! surface (bind positions, expected types, statement arity). The
//! [`compile_unit`] driver runs the whole pipeline for one unit of
//! declarations and named queries.
//!
//! ## Stages
//!
//! 1. **Catalog**: [`ShapeViewResolver`] plugs shape resolution into the
//!    catalog builder so view columns come out typed like query results.
//! 2. **Shape**: [`QueryResolver`] expands wildcards, tracks aliases and
//!    left-join nullability, merges compound arms, and disambiguates
//!    display names.
//! 3. **Binding**: [`ArgumentBinder`] numbers placeholders by SQLite's
//!    rule and infers each argument's type from its use site.

pub mod analyzer;
pub mod binder;
mod context;
pub mod error;
mod expr;
pub mod model;
pub mod shape;
pub mod types;

// Re-export commonly used types
pub use analyzer::{compile_unit, resolve_query, ShapeViewResolver};
pub use binder::ArgumentBinder;
pub use error::{SemanticError, SemanticResult};
pub use model::{
    ArgumentBindings, BoundArgument, ColumnOrigin, CompiledUnit, QueryKind, QueryShape,
    ResolvedQuery, ResultColumn, StatementArity, UnitOptions,
};
pub use shape::{QueryResolver, StatementShape};
pub use types::ResolvedType;
