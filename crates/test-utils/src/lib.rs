// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Test fixtures
//!
//! A small league schema shared across the resolution test suites: teams,
//! players (with a custom-typed column and a foreign key), a key/value
//! settings table, a view and a roster-counting trigger.

pub mod fixtures;

pub use fixtures::{
    league_declarations, names_view, players_table, roster_trigger, select_all, settings_table,
    team_stats_table, teams_table,
};
