// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Schema declarations
//!
//! The parsed forms of `CREATE TABLE`, `CREATE VIEW` and `CREATE TRIGGER`.
//! These are inputs to the catalog builder; nothing in here is resolved yet:
//! type keywords are raw strings and view queries are plain [`Select`] trees.

use crate::query::{Select, Statement};
use crate::span::Span;
use crate::types::TypeClause;
use serde::{Deserialize, Serialize};

/// Any top-level schema declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Declaration {
    Table(TableDeclaration),
    View(ViewDeclaration),
    Trigger(TriggerDeclaration),
}

impl Declaration {
    /// The declared object's name
    pub fn name(&self) -> &str {
        match self {
            Declaration::Table(table) => &table.name,
            Declaration::View(view) => &view.name,
            Declaration::Trigger(trigger) => &trigger.name,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Declaration::Table(table) => table.span,
            Declaration::View(view) => view.span,
            Declaration::Trigger(trigger) => trigger.span,
        }
    }
}

/// A parsed `CREATE TABLE`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableDeclaration {
    pub name: String,
    pub columns: Vec<ColumnDeclaration>,
    pub constraints: Vec<TableConstraint>,
    pub span: Span,
}

impl TableDeclaration {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            constraints: Vec::new(),
            span: Span::default(),
        }
    }

    pub fn with_column(mut self, column: ColumnDeclaration) -> Self {
        self.columns.push(column);
        self
    }

    pub fn with_constraint(mut self, constraint: TableConstraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }
}

/// One column of a `CREATE TABLE`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDeclaration {
    pub name: String,
    pub type_clause: TypeClause,
    pub constraints: Vec<ColumnConstraint>,
    pub span: Span,
}

impl ColumnDeclaration {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_clause: TypeClause::new(type_name),
            constraints: Vec::new(),
            span: Span::default(),
        }
    }

    /// Attach a class-literal type annotation (`AS 'com.example.Type'`)
    pub fn as_custom(mut self, custom_type: impl Into<String>) -> Self {
        self.type_clause = self.type_clause.with_custom_type(custom_type);
        self
    }

    pub fn not_null(mut self) -> Self {
        self.constraints.push(ColumnConstraint::NotNull);
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.constraints.push(ColumnConstraint::PrimaryKey {
            autoincrement: false,
        });
        self
    }

    pub fn unique(mut self) -> Self {
        self.constraints.push(ColumnConstraint::Unique);
        self
    }

    pub fn references(mut self, table: impl Into<String>, column: impl Into<String>) -> Self {
        self.constraints.push(ColumnConstraint::ForeignKey {
            table: table.into(),
            column: Some(column.into()),
        });
        self
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }
}

/// Column-level constraints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnConstraint {
    NotNull,
    PrimaryKey { autoincrement: bool },
    Unique,
    ForeignKey {
        table: String,
        column: Option<String>,
    },
}

/// Table-level constraints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TableConstraint {
    PrimaryKey(Vec<String>),
    Unique(Vec<String>),
    ForeignKey {
        columns: Vec<String>,
        table: String,
        ref_columns: Vec<String>,
    },
}

/// A parsed `CREATE VIEW`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewDeclaration {
    pub name: String,
    /// Optional explicit column list (`CREATE VIEW v(a, b) AS ...`)
    pub column_names: Option<Vec<String>>,
    pub query: Select,
    pub span: Span,
}

impl ViewDeclaration {
    pub fn new(name: impl Into<String>, query: Select) -> Self {
        Self {
            name: name.into(),
            column_names: None,
            query,
            span: Span::default(),
        }
    }

    pub fn with_column_names(mut self, names: Vec<String>) -> Self {
        self.column_names = Some(names);
        self
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }
}

/// A parsed `CREATE TRIGGER`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerDeclaration {
    pub name: String,
    /// The table the trigger fires on
    pub table: String,
    pub event: TriggerEvent,
    pub body: Vec<Statement>,
    pub span: Span,
}

impl TriggerDeclaration {
    pub fn new(
        name: impl Into<String>,
        table: impl Into<String>,
        event: TriggerEvent,
        body: Vec<Statement>,
    ) -> Self {
        Self {
            name: name.into(),
            table: table.into(),
            event,
            body,
            span: Span::default(),
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }
}

/// Which write fires a trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TriggerEvent {
    Insert,
    Update,
    Delete,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_declaration_builder() {
        let table = TableDeclaration::new("players")
            .with_column(ColumnDeclaration::new("_id", "INTEGER").primary_key())
            .with_column(ColumnDeclaration::new("name", "TEXT").not_null());

        assert_eq!(table.name, "players");
        assert_eq!(table.columns.len(), 2);
        assert!(matches!(
            table.columns[0].constraints[0],
            ColumnConstraint::PrimaryKey { .. }
        ));
    }

    #[test]
    fn test_column_custom_type() {
        let column = ColumnDeclaration::new("state", "TEXT").as_custom("com.example.State");
        assert_eq!(
            column.type_clause.custom_type.as_deref(),
            Some("com.example.State")
        );
    }

    #[test]
    fn test_declaration_name() {
        let decl = Declaration::Table(TableDeclaration::new("teams"));
        assert_eq!(decl.name(), "teams");
    }
}
