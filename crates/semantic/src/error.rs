// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Error types for query resolution
//!
//! All errors are compile-time and fatal to the enclosing compilation unit.
//! Catalog errors pass through unchanged; resolution errors carry the source
//! position of the offending reference, and the compile driver wraps each in
//! [`SemanticError::Query`] with the query's name for user-facing reporting.

use sql_typegen_ast::Span;
use sql_typegen_catalog::CatalogError;
use thiserror::Error;

/// Result type alias for resolution operations
pub type SemanticResult<T> = Result<T, SemanticError>;

/// Errors that can occur while resolving queries
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SemanticError {
    /// Schema construction failed
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// A bare column reference matches more than one in-scope table
    #[error("ambiguous column reference '{column}' at {span} (found in {})", .candidates.join(", "))]
    AmbiguousColumn {
        column: String,
        candidates: Vec<String>,
        span: Span,
    },

    /// A column reference matches no in-scope column
    #[error("unknown column '{column}' at {span}")]
    UnknownColumn { column: String, span: Span },

    /// A statement references a table the schema does not contain
    #[error("unknown table '{name}' at {span}")]
    UnknownTable { name: String, span: Span },

    /// Compound SELECT arms project different column counts
    #[error("compound select arms project {left} and {right} columns at {span}")]
    SetOperationColumnCountMismatch {
        left: usize,
        right: usize,
        span: Span,
    },

    /// An INSERT supplies the wrong number of values
    #[error("insert into '{table}' supplies {actual} values for {expected} columns at {span}")]
    InsertColumnCountMismatch {
        table: String,
        expected: usize,
        actual: usize,
        span: Span,
    },

    /// A placeholder token is not valid SQLite syntax (e.g. `?0`)
    #[error("malformed placeholder '{token}' at {span}")]
    MalformedPlaceholder { token: String, span: Span },

    /// A named argument was requested that no placeholder binds
    #[error("no argument named '{0}' is bound in this statement")]
    UnboundNamedArgument(String),

    /// A resolution error, annotated with the query it occurred in
    #[error("in query '{name}': {source}")]
    Query {
        name: String,
        source: Box<SemanticError>,
    },
}
