// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! League schema fixtures used across the resolution test suites.

use sql_typegen_ast::{
    Assignment, ColumnDeclaration, Declaration, Expr, FromClause, Select, SelectCore, SelectItem,
    Statement, TableDeclaration, TriggerDeclaration, TriggerEvent, Update, ViewDeclaration,
};

/// `SELECT * FROM <table>`
pub fn select_all(table: &str) -> Select {
    SelectCore::new()
        .with_projection(vec![SelectItem::wildcard()])
        .with_from(FromClause::table(table))
        .into_select()
}

/// Teams: rowid alias `_id`, required unique name, optional city
pub fn teams_table() -> Declaration {
    Declaration::Table(
        TableDeclaration::new("teams")
            .with_column(ColumnDeclaration::new("_id", "INTEGER").primary_key())
            .with_column(ColumnDeclaration::new("name", "TEXT").not_null().unique())
            .with_column(ColumnDeclaration::new("city", "TEXT")),
    )
}

/// Players: rowid alias, required name/number, custom-typed position,
/// optional foreign key to teams
pub fn players_table() -> Declaration {
    Declaration::Table(
        TableDeclaration::new("players")
            .with_column(ColumnDeclaration::new("_id", "INTEGER").primary_key())
            .with_column(ColumnDeclaration::new("name", "TEXT").not_null())
            .with_column(ColumnDeclaration::new("number", "INTEGER").not_null())
            .with_column(
                ColumnDeclaration::new("position", "TEXT")
                    .as_custom("com.example.Position")
                    .not_null(),
            )
            .with_column(ColumnDeclaration::new("team", "INTEGER").references("teams", "_id")),
    )
}

/// Per-team roster counts, maintained by [`roster_trigger`]
pub fn team_stats_table() -> Declaration {
    Declaration::Table(
        TableDeclaration::new("team_stats")
            .with_column(ColumnDeclaration::new("team", "INTEGER").primary_key())
            .with_column(ColumnDeclaration::new("player_count", "INTEGER").not_null()),
    )
}

/// A structural key/value table
pub fn settings_table() -> Declaration {
    Declaration::Table(
        TableDeclaration::new("settings")
            .with_column(ColumnDeclaration::new("key", "TEXT").primary_key())
            .with_column(ColumnDeclaration::new("value", "BLOB")),
    )
}

/// `CREATE VIEW names AS SELECT name FROM players`
pub fn names_view() -> Declaration {
    Declaration::View(ViewDeclaration::new(
        "names",
        SelectCore::new()
            .with_projection(vec![SelectItem::expr(Expr::column("name"))])
            .with_from(FromClause::table("players"))
            .into_select(),
    ))
}

/// After a player insert, bump the team's roster count
pub fn roster_trigger() -> Declaration {
    Declaration::Trigger(TriggerDeclaration::new(
        "bump_roster",
        "players",
        TriggerEvent::Insert,
        vec![Statement::Update(Update::new(
            "team_stats",
            vec![Assignment::new(
                "player_count",
                Expr::binary(
                    Expr::column("player_count"),
                    sql_typegen_ast::BinaryOp::Add,
                    Expr::integer(1),
                ),
            )],
        ))],
    ))
}

/// The full league schema in declaration order
pub fn league_declarations() -> Vec<Declaration> {
    vec![
        teams_table(),
        players_table(),
        team_stats_table(),
        settings_table(),
        names_view(),
        roster_trigger(),
    ]
}
