// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Resolved schema model
//!
//! The immutable output of the catalog builder: tables, views (tables whose
//! columns were derived from a query), triggers, and the [`TableSet`] closure
//! used for write invalidation. Built once per compilation unit, read-only
//! afterwards; safe to share across the parallel resolution of independent
//! queries.

use serde::{Deserialize, Serialize};
use sql_typegen_ast::{Span, SqlType, TriggerEvent};
use std::collections::BTreeMap;
use std::collections::BTreeSet;

/// The set of base tables a query transitively reads or a write touches
///
/// A `BTreeSet` keeps iteration deterministic, which the round-trip
/// guarantees of the resolved model rely on.
pub type TableSet = BTreeSet<String>;

/// Reference to another table's column (foreign keys)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnReference {
    pub table: String,
    pub column: String,
}

/// A resolved column of a table or view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Column name
    pub name: String,
    /// Resolved storage class
    pub sql_type: SqlType,
    /// Optional target-language type from the declaration's annotation
    pub custom_type: Option<String>,
    /// Whether a read can observe NULL
    pub nullable: bool,
    /// `INTEGER PRIMARY KEY` rowid alias: non-null after a read, but
    /// optional before an insert; the two call sites consult the two
    /// fields separately
    pub is_rowid_alias: bool,
    /// Whether this column is part of the primary key
    pub is_primary_key: bool,
    /// Whether this column carries a UNIQUE constraint
    pub is_unique: bool,
    /// Referenced table/column (if foreign key)
    pub references: Option<ColumnReference>,
}

impl Column {
    /// Create a new column with builder pattern
    pub fn new(name: impl Into<String>, sql_type: SqlType) -> Self {
        Self {
            name: name.into(),
            sql_type,
            custom_type: None,
            nullable: true,
            is_rowid_alias: false,
            is_primary_key: false,
            is_unique: false,
            references: None,
        }
    }

    /// Builder method: set the custom type annotation
    pub fn with_custom_type(mut self, custom_type: impl Into<String>) -> Self {
        self.custom_type = Some(custom_type.into());
        self
    }

    /// Builder method: set nullability
    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// Builder method: mark as rowid alias
    pub fn with_rowid_alias(mut self) -> Self {
        self.is_rowid_alias = true;
        self
    }

    /// Builder method: mark as primary key (forces non-null)
    pub fn with_primary_key(mut self) -> Self {
        self.is_primary_key = true;
        self.nullable = false;
        self
    }

    /// Builder method: mark as unique
    pub fn with_unique(mut self) -> Self {
        self.is_unique = true;
        self
    }

    /// Builder method: set foreign key reference
    pub fn with_references(mut self, table: impl Into<String>, column: impl Into<String>) -> Self {
        self.references = Some(ColumnReference {
            table: table.into(),
            column: column.into(),
        });
        self
    }
}

/// Whether a table's columns were declared or derived
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TableKind {
    /// A `CREATE TABLE` declaration
    Table,
    /// A `CREATE VIEW`; columns are its query's resolved result shape
    View {
        /// Base tables the view transitively reads
        dependent_tables: TableSet,
    },
}

/// A resolved table or view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    /// Declared name
    pub name: String,
    /// Package qualifier the emitter places generated code under
    pub package: Option<String>,
    /// Ordered resolved columns
    pub columns: Vec<Column>,
    /// Structural key/value table (`key TEXT PRIMARY KEY, value ...`)
    pub is_key_value: bool,
    pub kind: TableKind,
}

impl Table {
    /// Create a new base table with builder pattern
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            package: None,
            columns: Vec::new(),
            is_key_value: false,
            kind: TableKind::Table,
        }
    }

    /// Create a view with its derived columns and base-table closure
    pub fn view(name: impl Into<String>, columns: Vec<Column>, dependent_tables: TableSet) -> Self {
        Self {
            name: name.into(),
            package: None,
            columns,
            is_key_value: false,
            kind: TableKind::View { dependent_tables },
        }
    }

    /// Builder method: set the package qualifier
    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        self.package = Some(package.into());
        self
    }

    /// Builder method: set columns
    pub fn with_columns(mut self, columns: Vec<Column>) -> Self {
        self.columns = columns;
        self
    }

    /// Builder method: mark as key/value table
    pub fn with_key_value(mut self, is_key_value: bool) -> Self {
        self.is_key_value = is_key_value;
        self
    }

    pub fn is_view(&self) -> bool {
        matches!(self.kind, TableKind::View { .. })
    }

    /// Find a column by name (case-insensitive, SQLite rules)
    pub fn find_column(&self, name: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// The base tables a read of this table depends on
    ///
    /// A base table depends on itself; a view resolves to its own dependent
    /// tables, never to itself.
    pub fn base_tables(&self) -> TableSet {
        match &self.kind {
            TableKind::Table => TableSet::from([self.name.clone()]),
            TableKind::View { dependent_tables } => dependent_tables.clone(),
        }
    }
}

/// A resolved trigger: which table it fires on and which tables its body writes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trigger {
    pub name: String,
    /// The table the trigger fires on
    pub table: String,
    pub event: TriggerEvent,
    /// Tables written by the trigger body
    pub writes: TableSet,
    pub span: Span,
}

/// The resolved, read-only catalog of one compilation unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    /// Tables and views keyed by lowercase name (deterministic order)
    tables: BTreeMap<String, Table>,
    triggers: Vec<Trigger>,
}

impl Schema {
    pub(crate) fn new() -> Self {
        Self {
            tables: BTreeMap::new(),
            triggers: Vec::new(),
        }
    }

    pub(crate) fn insert_table(&mut self, table: Table) {
        self.tables.insert(table.name.to_ascii_lowercase(), table);
    }

    pub(crate) fn insert_trigger(&mut self, trigger: Trigger) {
        self.triggers.push(trigger);
    }

    /// Lookup a table or view by name (case-insensitive)
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.get(&name.to_ascii_lowercase())
    }

    pub fn contains_table(&self, name: &str) -> bool {
        self.tables.contains_key(&name.to_ascii_lowercase())
    }

    /// All tables and views in deterministic (name) order
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.values()
    }

    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    pub fn triggers(&self) -> &[Trigger] {
        &self.triggers
    }

    /// The tables a write to `table` invalidates: the written table plus the
    /// transitive closure of tables written by triggers firing on any member
    ///
    /// The closure is computed over a visited set, so mutually-triggering
    /// tables terminate.
    pub fn tables_affected_by_write(&self, table: &str) -> TableSet {
        let canonical = self
            .table(table)
            .map(|t| t.name.clone())
            .unwrap_or_else(|| table.to_string());

        let mut affected = TableSet::from([canonical]);
        let mut frontier: Vec<String> = affected.iter().cloned().collect();

        while let Some(current) = frontier.pop() {
            for trigger in &self.triggers {
                if !trigger.table.eq_ignore_ascii_case(&current) {
                    continue;
                }
                for written in &trigger.writes {
                    let written = self
                        .table(written)
                        .map(|t| t.name.clone())
                        .unwrap_or_else(|| written.clone());
                    if affected.insert(written.clone()) {
                        frontier.push(written);
                    }
                }
            }
        }

        affected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_table_schema() -> Schema {
        let mut schema = Schema::new();
        schema.insert_table(
            Table::new("players").with_columns(vec![
                Column::new("_id", SqlType::Integer)
                    .with_primary_key()
                    .with_rowid_alias(),
                Column::new("name", SqlType::Text).with_nullable(false),
            ]),
        );
        schema.insert_table(
            Table::new("stats")
                .with_columns(vec![Column::new("games", SqlType::Integer)]),
        );
        schema
    }

    #[test]
    fn test_table_lookup_case_insensitive() {
        let schema = two_table_schema();
        assert!(schema.table("PLAYERS").is_some());
        assert!(schema.table("players").is_some());
        assert!(schema.table("teams").is_none());
    }

    #[test]
    fn test_find_column_case_insensitive() {
        let schema = two_table_schema();
        let players = schema.table("players").unwrap();
        assert!(players.find_column("NAME").is_some());
        assert!(players.find_column("email").is_none());
    }

    #[test]
    fn test_base_tables_of_view() {
        let view = Table::view(
            "names",
            vec![Column::new("name", SqlType::Text)],
            TableSet::from(["players".to_string()]),
        );
        assert_eq!(view.base_tables(), TableSet::from(["players".to_string()]));

        let table = Table::new("players");
        assert_eq!(
            table.base_tables(),
            TableSet::from(["players".to_string()])
        );
    }

    #[test]
    fn test_write_closure_follows_triggers() {
        let mut schema = two_table_schema();
        schema.insert_trigger(Trigger {
            name: "log_player".to_string(),
            table: "players".to_string(),
            event: TriggerEvent::Insert,
            writes: TableSet::from(["stats".to_string()]),
            span: Span::default(),
        });

        let affected = schema.tables_affected_by_write("players");
        assert!(affected.contains("players"));
        assert!(affected.contains("stats"));

        // Writing stats does not fire the players trigger
        let affected = schema.tables_affected_by_write("stats");
        assert_eq!(affected, TableSet::from(["stats".to_string()]));
    }

    #[test]
    fn test_write_closure_is_cycle_safe() {
        let mut schema = two_table_schema();
        schema.insert_trigger(Trigger {
            name: "a_to_b".to_string(),
            table: "players".to_string(),
            event: TriggerEvent::Update,
            writes: TableSet::from(["stats".to_string()]),
            span: Span::default(),
        });
        schema.insert_trigger(Trigger {
            name: "b_to_a".to_string(),
            table: "stats".to_string(),
            event: TriggerEvent::Update,
            writes: TableSet::from(["players".to_string()]),
            span: Span::default(),
        });

        let affected = schema.tables_affected_by_write("players");
        assert!(affected.contains("players"));
        assert!(affected.contains("stats"));
    }
}
