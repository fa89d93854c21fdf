// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # SQL storage types
//!
//! SQLite stores values in one of four primitive storage classes. A declared
//! column type may additionally carry a class-literal annotation naming a
//! target-language type (e.g. `TEXT AS 'com.example.Status'`); the compiler
//! only records the annotation, adapters live with the emitted code.

use crate::span::Span;
use serde::{Deserialize, Serialize};

/// Primitive SQLite storage classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SqlType {
    Integer,
    Real,
    Text,
    Blob,
}

impl SqlType {
    /// Resolve a declared type keyword (case-insensitive)
    ///
    /// Only the keywords `INTEGER`, `INT`, `REAL`, `TEXT` and `BLOB` are
    /// recognized; anything else is an unknown type to the catalog builder.
    ///
    /// # Examples
    ///
    /// ```
    /// use sql_typegen_ast::SqlType;
    ///
    /// assert_eq!(SqlType::from_keyword("integer"), Some(SqlType::Integer));
    /// assert_eq!(SqlType::from_keyword("INT"), Some(SqlType::Integer));
    /// assert_eq!(SqlType::from_keyword("VARCHAR"), None);
    /// ```
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword.to_ascii_uppercase().as_str() {
            "INTEGER" | "INT" => Some(SqlType::Integer),
            "REAL" => Some(SqlType::Real),
            "TEXT" => Some(SqlType::Text),
            "BLOB" => Some(SqlType::Blob),
            _ => None,
        }
    }

    /// The canonical SQL keyword for this storage class
    pub fn keyword(&self) -> &'static str {
        match self {
            SqlType::Integer => "INTEGER",
            SqlType::Real => "REAL",
            SqlType::Text => "TEXT",
            SqlType::Blob => "BLOB",
        }
    }
}

/// A declared column type as written in the schema
///
/// `type_name` is the raw keyword from the declaration; the catalog builder
/// resolves it to a [`SqlType`] and rejects unknown keywords.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeClause {
    /// Raw type keyword (e.g. "INTEGER", "TEXT")
    pub type_name: String,
    /// Optional class-literal annotation naming a target-language type
    pub custom_type: Option<String>,
    /// Position of the type clause in the source
    pub span: Span,
}

impl TypeClause {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            custom_type: None,
            span: Span::default(),
        }
    }

    pub fn with_custom_type(mut self, custom_type: impl Into<String>) -> Self {
        self.custom_type = Some(custom_type.into());
        self
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_keyword_case_insensitive() {
        assert_eq!(SqlType::from_keyword("Text"), Some(SqlType::Text));
        assert_eq!(SqlType::from_keyword("blob"), Some(SqlType::Blob));
        assert_eq!(SqlType::from_keyword("REAL"), Some(SqlType::Real));
    }

    #[test]
    fn test_int_aliases_integer() {
        assert_eq!(SqlType::from_keyword("int"), Some(SqlType::Integer));
    }

    #[test]
    fn test_unknown_keyword() {
        assert_eq!(SqlType::from_keyword("DATETIME"), None);
    }

    #[test]
    fn test_type_clause_custom_type() {
        let clause = TypeClause::new("TEXT").with_custom_type("com.example.Status");
        assert_eq!(clause.type_name, "TEXT");
        assert_eq!(clause.custom_type.as_deref(), Some("com.example.Status"));
    }
}
