// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Error types for catalog construction
//!
//! Every error is fatal to the enclosing compilation unit and carries the
//! source position of the offending declaration; no partial schema escapes
//! the builder.

use serde::Serialize;
use sql_typegen_ast::Span;
use thiserror::Error;

/// Result type alias for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Errors that can occur while building a schema
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize)]
pub enum CatalogError {
    /// A table or view name was declared twice
    #[error("duplicate table or view name '{name}' at {span}")]
    DuplicateTableName { name: String, span: Span },

    /// A column was declared with an unrecognized type keyword
    #[error("unknown type '{type_name}' for column '{table}.{column}' at {span}")]
    UnknownType {
        type_name: String,
        table: String,
        column: String,
        span: Span,
    },

    /// A group of views depends on itself
    #[error("cyclic view dependency involving {}", .views.join(", "))]
    CyclicViewDependency { views: Vec<String> },

    /// A declaration references a table that does not exist
    #[error("unknown table '{name}' referenced by '{context}' at {span}")]
    UnknownTable {
        name: String,
        context: String,
        span: Span,
    },

    /// A view's explicit column list has the wrong arity
    #[error(
        "view '{view}' names {declared} columns but its query produces {resolved} at {span}"
    )]
    ViewColumnCountMismatch {
        view: String,
        declared: usize,
        resolved: usize,
        span: Span,
    },
}
