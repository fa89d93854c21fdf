// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! End-to-end tests for the compile driver.

use sql_typegen_ast::{
    BinaryOp, Declaration, Expr, FromClause, NamedQuery, SelectCore, SelectItem, SqlType,
    ViewDeclaration,
};
use sql_typegen_catalog::CatalogError;
use sql_typegen_semantic::{compile_unit, QueryKind, SemanticError, UnitOptions};
use sql_typegen_test_utils::{league_declarations, select_all};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

#[test]
fn test_compile_unit_resolves_schema_and_queries() {
    init_tracing();
    let queries = vec![
        NamedQuery::select("selectPlayers", select_all("players")),
        NamedQuery::select(
            "selectByName",
            SelectCore::new()
                .with_projection(vec![SelectItem::wildcard()])
                .with_from(FromClause::table("players"))
                .with_where(Expr::binary(
                    Expr::column("name"),
                    BinaryOp::Eq,
                    Expr::placeholder(),
                ))
                .into_select(),
        ),
    ];

    let unit = compile_unit(&UnitOptions::default(), &league_declarations(), &queries).unwrap();

    assert_eq!(unit.schema.table_count(), 5);
    assert_eq!(unit.queries.len(), 2);

    let select_players = &unit.queries[0];
    assert_eq!(select_players.kind, QueryKind::Select);
    assert_eq!(select_players.shape.result_columns.len(), 5);
    assert!(select_players.bindings.arguments.is_empty());

    let select_by_name = &unit.queries[1];
    assert_eq!(select_by_name.bindings.arguments.len(), 1);
    assert!(select_by_name.table_set.contains("players"));
}

#[test]
fn test_view_columns_come_from_shape_resolution() {
    init_tracing();
    let unit = compile_unit(&UnitOptions::default(), &league_declarations(), &[]).unwrap();

    let names = unit.schema.table("names").unwrap();
    assert!(names.is_view());
    assert_eq!(names.columns.len(), 1);
    assert_eq!(names.columns[0].name, "name");
    assert_eq!(names.columns[0].sql_type, SqlType::Text);
    // players.name is NOT NULL, so the view column is too
    assert!(!names.columns[0].nullable);
}

#[test]
fn test_query_error_carries_query_name() {
    init_tracing();
    let queries = vec![NamedQuery::select("selectGhosts", select_all("ghosts"))];
    let err = compile_unit(&UnitOptions::default(), &league_declarations(), &queries).unwrap_err();

    match err {
        SemanticError::Query { name, source } => {
            assert_eq!(name, "selectGhosts");
            assert!(matches!(*source, SemanticError::UnknownTable { .. }));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_cyclic_views_fail_the_unit() {
    init_tracing();
    let declarations = vec![
        Declaration::View(ViewDeclaration::new("view_a", select_all("view_b"))),
        Declaration::View(ViewDeclaration::new("view_b", select_all("view_a"))),
    ];
    let err = compile_unit(&UnitOptions::default(), &declarations, &[]).unwrap_err();
    assert!(matches!(
        err,
        SemanticError::Catalog(CatalogError::CyclicViewDependency { .. })
    ));
}

#[test]
fn test_package_option_reaches_the_schema() {
    init_tracing();
    let options = UnitOptions::default().with_package("com.example.db");
    let unit = compile_unit(&options, &league_declarations(), &[]).unwrap();
    assert_eq!(
        unit.schema.table("players").unwrap().package.as_deref(),
        Some("com.example.db")
    );
}

#[test]
fn test_view_of_view_reuses_resolved_columns() {
    init_tracing();
    let mut declarations = league_declarations();
    declarations.push(Declaration::View(ViewDeclaration::new(
        "names_again",
        select_all("names"),
    )));

    let unit = compile_unit(&UnitOptions::default(), &declarations, &[]).unwrap();
    let names = unit.schema.table("names").unwrap();
    let names_again = unit.schema.table("names_again").unwrap();

    assert_eq!(names_again.columns, names.columns);
    // The outer view's base tables flatten to the inner view's
    assert_eq!(names_again.base_tables(), names.base_tables());
}

#[test]
fn test_resolution_is_deterministic() {
    init_tracing();
    let queries = vec![
        NamedQuery::select("selectPlayers", select_all("players")),
        NamedQuery::select("selectNames", select_all("names")),
    ];

    let first = compile_unit(&UnitOptions::default(), &league_declarations(), &queries).unwrap();
    let second = compile_unit(&UnitOptions::default(), &league_declarations(), &queries).unwrap();

    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn test_compiled_unit_round_trips_through_json() {
    init_tracing();
    let queries = vec![NamedQuery::select("selectPlayers", select_all("players"))];
    let unit = compile_unit(&UnitOptions::default(), &league_declarations(), &queries).unwrap();

    let json = serde_json::to_string(&unit).unwrap();
    let back: sql_typegen_semantic::CompiledUnit = serde_json::from_str(&json).unwrap();
    assert_eq!(unit, back);
}
