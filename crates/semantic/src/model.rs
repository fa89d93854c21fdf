// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Resolved query model
//!
//! The output side of resolution: what a query produces ([`QueryShape`]),
//! what must be bound to run it ([`ArgumentBindings`]), and the per-unit
//! aggregate the compile driver returns ([`CompiledUnit`]). Everything here
//! is plain serializable data; emitters consume it without touching the AST.

use crate::error::{SemanticError, SemanticResult};
use crate::types::ResolvedType;
use serde::{Deserialize, Serialize};
use sql_typegen_catalog::{Schema, TableSet};

/// The table column a result column was read from, when it still has one
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnOrigin {
    pub table: String,
    pub column: String,
}

/// One column of a query's result shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultColumn {
    /// Unique display name within the shape (alias, column name, or a
    /// disambiguated variant of either)
    pub display_name: String,
    pub ty: ResolvedType,
    /// Present for direct column reads; computed expressions have none
    pub origin: Option<ColumnOrigin>,
}

/// The result shape of a resolved statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryShape {
    pub result_columns: Vec<ResultColumn>,
    /// Base tables a read observes; drives cache invalidation
    pub dependent_tables: TableSet,
}

impl QueryShape {
    /// The shape of a statement that returns no rows
    pub fn empty() -> Self {
        Self {
            result_columns: Vec::new(),
            dependent_tables: TableSet::new(),
        }
    }

    pub fn with_dependent_tables(mut self, dependent_tables: TableSet) -> Self {
        self.dependent_tables = dependent_tables;
        self
    }
}

/// One logical bind argument of a statement
///
/// Repeated occurrences of the same index or name collapse into a single
/// argument; [`ArgumentBindings::occurrences`] keeps the full textual order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundArgument {
    /// 1-based bind position
    pub position: u32,
    /// Present for `:name` placeholders
    pub name: Option<String>,
    pub ty: ResolvedType,
    /// Whether binding goes through a custom-type adapter
    pub adapter_required: bool,
}

/// How many values a statement needs at execution time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatementArity {
    /// A fixed number of bind values
    Fixed { arg_count: usize },
    /// At least one `IN ?` argument expands to a runtime-sized list; the
    /// statement text must be finalized per call
    Dynamic { array_arguments: Vec<u32> },
}

/// The complete argument surface of one statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArgumentBindings {
    /// Logical arguments in bind-position order
    pub arguments: Vec<BoundArgument>,
    /// Bind positions in textual occurrence order, one entry per
    /// placeholder token in the statement
    pub occurrences: Vec<u32>,
    pub arity: StatementArity,
}

impl ArgumentBindings {
    /// The argument bound at the given 1-based position
    pub fn argument_at(&self, position: u32) -> Option<&BoundArgument> {
        self.arguments.iter().find(|a| a.position == position)
    }

    /// The argument bound under the given name
    pub fn argument_named(&self, name: &str) -> SemanticResult<&BoundArgument> {
        self.arguments
            .iter()
            .find(|a| a.name.as_deref() == Some(name))
            .ok_or_else(|| SemanticError::UnboundNamedArgument(name.to_string()))
    }
}

/// Statement classification of a named query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QueryKind {
    Select,
    Insert,
    Update,
    Delete,
}

/// One fully resolved named query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedQuery {
    pub name: String,
    pub kind: QueryKind,
    pub shape: QueryShape,
    pub bindings: ArgumentBindings,
    /// For reads, the tables whose mutation invalidates this query's
    /// results; for writes, the trigger-closed set of tables the statement
    /// can touch
    pub table_set: TableSet,
}

/// Options applied to one compilation unit
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitOptions {
    /// Package qualifier the emitter places generated code under
    pub package: Option<String>,
}

impl UnitOptions {
    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        self.package = Some(package.into());
        self
    }
}

/// The resolved output of one compilation unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledUnit {
    pub schema: Schema,
    /// Queries in declaration order
    pub queries: Vec<ResolvedQuery>,
}
