// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Integration tests for the catalog builder
//!
//! View shapes are stubbed out; the real shape computation lives in the
//! semantic crate and is tested there.

use sql_typegen_ast::{
    ColumnDeclaration, Declaration, Expr, FromClause, Select, SelectCore, SelectItem, Span,
    SqlType, Statement, TableConstraint, TableDeclaration, TriggerDeclaration, TriggerEvent,
    Update, ViewDeclaration,
};
use sql_typegen_catalog::{
    CatalogError, Column, Schema, SchemaBuilder, TableSet, ViewResolver, ViewShape,
};
use std::cell::RefCell;

/// Resolver stub: one TEXT column per view, records resolution order
struct StubViewResolver {
    calls: RefCell<Vec<String>>,
}

impl StubViewResolver {
    fn new() -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
        }
    }
}

impl ViewResolver for StubViewResolver {
    type Error = CatalogError;

    fn resolve_view(
        &self,
        _schema: &Schema,
        view: &ViewDeclaration,
    ) -> Result<ViewShape, CatalogError> {
        self.calls.borrow_mut().push(view.name.clone());
        Ok(ViewShape {
            columns: vec![Column::new("value", SqlType::Text)],
            dependent_tables: TableSet::new(),
        })
    }
}

fn select_from(table: &str) -> Select {
    SelectCore::new()
        .with_projection(vec![SelectItem::wildcard()])
        .with_from(FromClause::table(table))
        .into_select()
}

fn players_table() -> Declaration {
    Declaration::Table(
        TableDeclaration::new("players")
            .with_column(ColumnDeclaration::new("_id", "INTEGER").primary_key())
            .with_column(ColumnDeclaration::new("name", "TEXT").not_null())
            .with_column(ColumnDeclaration::new("number", "INTEGER")),
    )
}

#[test]
fn test_declared_nullability() {
    let schema = SchemaBuilder::new()
        .build(&[players_table()], &StubViewResolver::new())
        .unwrap();

    let players = schema.table("players").unwrap();
    assert!(!players.find_column("_id").unwrap().nullable);
    assert!(!players.find_column("name").unwrap().nullable);
    assert!(players.find_column("number").unwrap().nullable);
}

#[test]
fn test_rowid_alias_flag() {
    let schema = SchemaBuilder::new()
        .build(&[players_table()], &StubViewResolver::new())
        .unwrap();

    let id = schema.table("players").unwrap().find_column("_id").unwrap();
    assert!(id.is_rowid_alias);
    assert!(id.is_primary_key);
    assert!(!id.nullable);
}

#[test]
fn test_rowid_alias_with_explicit_not_null() {
    // The redundant NOT NULL changes nothing: still a rowid alias
    let declaration = Declaration::Table(
        TableDeclaration::new("players").with_column(
            ColumnDeclaration::new("_id", "INTEGER")
                .primary_key()
                .not_null(),
        ),
    );
    let schema = SchemaBuilder::new()
        .build(&[declaration], &StubViewResolver::new())
        .unwrap();

    let id = schema.table("players").unwrap().find_column("_id").unwrap();
    assert!(id.is_rowid_alias);
    assert!(!id.nullable);
}

#[test]
fn test_table_level_primary_key_forces_not_null() {
    let declaration = Declaration::Table(
        TableDeclaration::new("pairs")
            .with_column(ColumnDeclaration::new("a", "TEXT"))
            .with_column(ColumnDeclaration::new("b", "TEXT"))
            .with_constraint(TableConstraint::PrimaryKey(vec![
                "a".to_string(),
                "b".to_string(),
            ])),
    );
    let schema = SchemaBuilder::new()
        .build(&[declaration], &StubViewResolver::new())
        .unwrap();

    let pairs = schema.table("pairs").unwrap();
    assert!(!pairs.find_column("a").unwrap().nullable);
    assert!(!pairs.find_column("b").unwrap().nullable);
    // A two-column primary key is no rowid alias
    assert!(!pairs.find_column("a").unwrap().is_rowid_alias);
}

#[test]
fn test_key_value_table_detection() {
    let declaration = Declaration::Table(
        TableDeclaration::new("settings")
            .with_column(ColumnDeclaration::new("key", "TEXT").primary_key())
            .with_column(ColumnDeclaration::new("value", "BLOB")),
    );
    let schema = SchemaBuilder::new()
        .build(&[declaration], &StubViewResolver::new())
        .unwrap();
    assert!(schema.table("settings").unwrap().is_key_value);
}

#[test]
fn test_duplicate_table_name_error() {
    let declarations = vec![players_table(), players_table()];
    let err = SchemaBuilder::new()
        .build(&declarations, &StubViewResolver::new())
        .unwrap_err();
    assert!(matches!(err, CatalogError::DuplicateTableName { ref name, .. } if name == "players"));
}

#[test]
fn test_view_colliding_with_table_error() {
    let declarations = vec![
        players_table(),
        Declaration::View(ViewDeclaration::new("Players", select_from("players"))),
    ];
    let err = SchemaBuilder::new()
        .build(&declarations, &StubViewResolver::new())
        .unwrap_err();
    assert!(matches!(err, CatalogError::DuplicateTableName { .. }));
}

#[test]
fn test_unknown_type_error_carries_position() {
    let declaration = Declaration::Table(TableDeclaration::new("players").with_column(
        ColumnDeclaration::new("joined", "DATETIME").with_span(Span::new(2, 10)),
    ));
    let err = SchemaBuilder::new()
        .build(&[declaration], &StubViewResolver::new())
        .unwrap_err();

    match err {
        CatalogError::UnknownType {
            type_name,
            table,
            column,
            ..
        } => {
            assert_eq!(type_name, "DATETIME");
            assert_eq!(table, "players");
            assert_eq!(column, "joined");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_views_resolved_in_dependency_order() {
    // view2 is declared before view1 but reads from it
    let declarations = vec![
        Declaration::View(ViewDeclaration::new("view2", select_from("view1"))),
        players_table(),
        Declaration::View(ViewDeclaration::new("view1", select_from("players"))),
    ];

    let resolver = StubViewResolver::new();
    let schema = SchemaBuilder::new().build(&declarations, &resolver).unwrap();

    assert_eq!(*resolver.calls.borrow(), vec!["view1", "view2"]);
    assert!(schema.table("view2").unwrap().is_view());
}

#[test]
fn test_cyclic_view_dependency_error() {
    let declarations = vec![
        Declaration::View(ViewDeclaration::new("view_a", select_from("view_b"))),
        Declaration::View(ViewDeclaration::new("view_b", select_from("view_a"))),
    ];
    let err = SchemaBuilder::new()
        .build(&declarations, &StubViewResolver::new())
        .unwrap_err();

    match err {
        CatalogError::CyclicViewDependency { views } => {
            assert_eq!(views, vec!["view_a".to_string(), "view_b".to_string()]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_view_over_unknown_table_error() {
    let declarations = vec![Declaration::View(ViewDeclaration::new(
        "ghosts",
        select_from("missing"),
    ))];
    let err = SchemaBuilder::new()
        .build(&declarations, &StubViewResolver::new())
        .unwrap_err();
    assert!(matches!(
        err,
        CatalogError::UnknownTable { ref name, ref context, .. }
            if name == "missing" && context == "ghosts"
    ));
}

#[test]
fn test_view_column_list_arity_mismatch() {
    let declarations = vec![
        players_table(),
        Declaration::View(
            ViewDeclaration::new("names", select_from("players"))
                .with_column_names(vec!["a".to_string(), "b".to_string()]),
        ),
    ];
    // The stub resolver always produces one column
    let err = SchemaBuilder::new()
        .build(&declarations, &StubViewResolver::new())
        .unwrap_err();
    assert!(matches!(
        err,
        CatalogError::ViewColumnCountMismatch {
            declared: 2,
            resolved: 1,
            ..
        }
    ));
}

#[test]
fn test_view_column_list_renames() {
    let declarations = vec![
        players_table(),
        Declaration::View(
            ViewDeclaration::new("names", select_from("players"))
                .with_column_names(vec!["player_value".to_string()]),
        ),
    ];
    let schema = SchemaBuilder::new()
        .build(&declarations, &StubViewResolver::new())
        .unwrap();
    let names = schema.table("names").unwrap();
    assert_eq!(names.columns[0].name, "player_value");
}

#[test]
fn test_trigger_records_write_set() {
    let declarations = vec![
        players_table(),
        Declaration::Table(
            TableDeclaration::new("stats")
                .with_column(ColumnDeclaration::new("games", "INTEGER")),
        ),
        Declaration::Trigger(TriggerDeclaration::new(
            "bump_stats",
            "players",
            TriggerEvent::Insert,
            vec![Statement::Update(
                Update::new(
                    "stats",
                    vec![sql_typegen_ast::Assignment::new("games", Expr::integer(0))],
                ),
            )],
        )),
    ];
    let schema = SchemaBuilder::new()
        .build(&declarations, &StubViewResolver::new())
        .unwrap();

    assert_eq!(schema.triggers().len(), 1);
    assert!(schema.triggers()[0].writes.contains("stats"));

    let affected = schema.tables_affected_by_write("players");
    assert!(affected.contains("players"));
    assert!(affected.contains("stats"));
}

#[test]
fn test_trigger_on_unknown_table_error() {
    let declarations = vec![Declaration::Trigger(TriggerDeclaration::new(
        "ghost",
        "missing",
        TriggerEvent::Delete,
        vec![],
    ))];
    let err = SchemaBuilder::new()
        .build(&declarations, &StubViewResolver::new())
        .unwrap_err();
    assert!(matches!(err, CatalogError::UnknownTable { ref name, .. } if name == "missing"));
}

#[test]
fn test_package_applied_to_tables_and_views() {
    let declarations = vec![
        players_table(),
        Declaration::View(ViewDeclaration::new("names", select_from("players"))),
    ];
    let schema = SchemaBuilder::new()
        .with_package(Some("com.example.db".to_string()))
        .build(&declarations, &StubViewResolver::new())
        .unwrap();

    assert_eq!(
        schema.table("players").unwrap().package.as_deref(),
        Some("com.example.db")
    );
    assert_eq!(
        schema.table("names").unwrap().package.as_deref(),
        Some("com.example.db")
    );
}
