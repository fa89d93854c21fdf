// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Resolved expression types
//!
//! A [`ResolvedType`] is the type the compiler assigns to an expression or
//! result column: an optional storage class (absent only for bare NULL and
//! untyped placeholders), an optional custom type annotation carried through
//! from a column declaration, and nullability.

use serde::{Deserialize, Serialize};
use sql_typegen_ast::SqlType;
use sql_typegen_catalog::Column;

/// The type assigned to an expression
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedType {
    /// Storage class; `None` for NULL literals and untyped placeholders
    pub sql_type: Option<SqlType>,
    /// Target-language type annotation, carried from the declaring column
    pub custom_type: Option<String>,
    /// Whether the expression can evaluate to NULL
    pub nullable: bool,
}

impl ResolvedType {
    /// A non-null value of the given storage class
    pub fn new(sql_type: SqlType) -> Self {
        Self {
            sql_type: Some(sql_type),
            custom_type: None,
            nullable: false,
        }
    }

    pub fn integer() -> Self {
        Self::new(SqlType::Integer)
    }

    pub fn real() -> Self {
        Self::new(SqlType::Real)
    }

    pub fn text() -> Self {
        Self::new(SqlType::Text)
    }

    pub fn blob() -> Self {
        Self::new(SqlType::Blob)
    }

    /// The type of a bare NULL or an expression nothing constrains
    pub fn unknown() -> Self {
        Self {
            sql_type: None,
            custom_type: None,
            nullable: true,
        }
    }

    /// The type a column produces when read
    pub fn from_column(column: &Column) -> Self {
        Self {
            sql_type: Some(column.sql_type),
            custom_type: column.custom_type.clone(),
            nullable: column.nullable,
        }
    }

    /// Builder method: set nullability
    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// Builder method: set the custom type annotation
    pub fn with_custom_type(mut self, custom_type: impl Into<String>) -> Self {
        self.custom_type = Some(custom_type.into());
        self
    }

    /// This type, made nullable
    pub fn forced_nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Whether binding or reading this value goes through a column adapter
    pub fn requires_adapter(&self) -> bool {
        self.custom_type.is_some()
    }

    /// Merge two branch types into the type of a value that can come from
    /// either branch (CASE arms, UNION columns, coalesced arguments)
    ///
    /// An untyped side yields to the other. Equal storage classes keep the
    /// custom annotation only when both sides agree on it. INTEGER and REAL
    /// widen to REAL; any other mix falls back to TEXT. Nullability is the
    /// OR of both sides.
    pub fn merge(&self, other: &ResolvedType) -> ResolvedType {
        let nullable = self.nullable || other.nullable;

        let (sql_type, custom_type) = match (self.sql_type, other.sql_type) {
            (None, _) => (other.sql_type, other.custom_type.clone()),
            (_, None) => (self.sql_type, self.custom_type.clone()),
            (Some(left), Some(right)) if left == right => {
                let custom = if self.custom_type == other.custom_type {
                    self.custom_type.clone()
                } else {
                    None
                };
                (Some(left), custom)
            }
            (Some(SqlType::Integer), Some(SqlType::Real))
            | (Some(SqlType::Real), Some(SqlType::Integer)) => (Some(SqlType::Real), None),
            _ => (Some(SqlType::Text), None),
        };

        ResolvedType {
            sql_type,
            custom_type,
            nullable,
        }
    }
}
