// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # sql-typegen - Catalog
//!
//! The resolved schema model and the catalog builder. A [`Schema`] is built
//! once per compilation unit from every `CREATE TABLE`/`CREATE VIEW`/
//! `CREATE TRIGGER` declaration, is immutable afterwards, and is the only
//! state query resolution reads. View column computation is delegated to
//! the semantic layer through the [`ViewResolver`] seam so this crate stays
//! free of expression typing rules.

pub mod builder;
pub mod error;
pub mod schema;

// Re-export commonly used types
pub use builder::{SchemaBuilder, ViewResolver, ViewShape};
pub use error::{CatalogError, CatalogResult};
pub use schema::{Column, ColumnReference, Schema, Table, TableKind, TableSet, Trigger};
