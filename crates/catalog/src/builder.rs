// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Catalog builder
//!
//! Builds an immutable [`Schema`] from the full set of declarations of one
//! compilation unit. The builder sees every declaration before resolving
//! anything, so forward references and views-of-views work regardless of
//! declaration order.
//!
//! ## View resolution
//!
//! View columns are the result shape of the view's defining query, which
//! only the semantic layer can compute. The builder therefore delegates
//! per-view shape computation through the [`ViewResolver`] trait and keeps
//! the ordering concern for itself: views are resolved in topological
//! dependency order over a name-keyed graph, so cycles are detected
//! structurally instead of by stack overflow.

use crate::error::{CatalogError, CatalogResult};
use crate::schema::{Column, Schema, Table, TableSet, Trigger};
use sql_typegen_ast::{
    ColumnConstraint, ColumnDeclaration, Declaration, Expr, FromClause, InOperand, Select,
    SelectBody, SelectCore, SelectItem, SourceKind, SqlType, Statement, TableConstraint,
    TableDeclaration, TriggerDeclaration, ViewDeclaration,
};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// A view's resolved shape, as computed by the semantic layer
#[derive(Debug, Clone, PartialEq)]
pub struct ViewShape {
    /// The view's result columns in order
    pub columns: Vec<Column>,
    /// Base tables the view transitively reads
    pub dependent_tables: TableSet,
}

/// Computes the column shape of one view against the schema built so far
///
/// The builder guarantees that every table and view the defining query
/// references is already present in the schema it passes in.
pub trait ViewResolver {
    type Error: From<CatalogError>;

    fn resolve_view(
        &self,
        schema: &Schema,
        view: &ViewDeclaration,
    ) -> Result<ViewShape, Self::Error>;
}

/// Builds a [`Schema`] from parsed declarations
#[derive(Debug, Clone, Default)]
pub struct SchemaBuilder {
    package: Option<String>,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: package qualifier applied to every table
    pub fn with_package(mut self, package: Option<String>) -> Self {
        self.package = package;
        self
    }

    /// Build the schema, resolving views through `resolver`
    ///
    /// Declaration order is irrelevant: all base tables are built first,
    /// then views in dependency order, then triggers. Any error aborts the
    /// build; no partial schema is returned.
    pub fn build<R: ViewResolver>(
        &self,
        declarations: &[Declaration],
        resolver: &R,
    ) -> Result<Schema, R::Error> {
        let mut schema = Schema::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut views: Vec<&ViewDeclaration> = Vec::new();
        let mut triggers: Vec<&TriggerDeclaration> = Vec::new();

        for declaration in declarations {
            match declaration {
                Declaration::Table(_) | Declaration::View(_) => {
                    let key = declaration.name().to_ascii_lowercase();
                    if !seen.insert(key) {
                        return Err(CatalogError::DuplicateTableName {
                            name: declaration.name().to_string(),
                            span: declaration.span(),
                        }
                        .into());
                    }
                }
                Declaration::Trigger(_) => {}
            }

            match declaration {
                Declaration::Table(table) => {
                    let table = self.build_table(table)?;
                    debug!(table = %table.name, columns = table.columns.len(), "table added");
                    schema.insert_table(table);
                }
                Declaration::View(view) => views.push(view),
                Declaration::Trigger(trigger) => triggers.push(trigger),
            }
        }

        self.resolve_views(&mut schema, views, resolver)?;

        for trigger in triggers {
            if !schema.contains_table(&trigger.table) {
                return Err(CatalogError::UnknownTable {
                    name: trigger.table.clone(),
                    context: trigger.name.clone(),
                    span: trigger.span,
                }
                .into());
            }
            let writes = trigger
                .body
                .iter()
                .filter_map(statement_write_target)
                .collect();
            schema.insert_trigger(Trigger {
                name: trigger.name.clone(),
                table: trigger.table.clone(),
                event: trigger.event,
                writes,
                span: trigger.span,
            });
        }

        Ok(schema)
    }

    /// Resolve all views in topological dependency order (Kahn's algorithm)
    fn resolve_views<R: ViewResolver>(
        &self,
        schema: &mut Schema,
        views: Vec<&ViewDeclaration>,
        resolver: &R,
    ) -> Result<(), R::Error> {
        let view_names: HashSet<String> = views
            .iter()
            .map(|v| v.name.to_ascii_lowercase())
            .collect();

        // Edges run from a view to the views that consume it; in-degree
        // counts unresolved view dependencies only, base tables are already
        // in the schema.
        let mut dependencies: HashMap<String, HashSet<String>> = HashMap::new();
        for view in &views {
            let mut referenced = TableSet::new();
            collect_select_tables(&view.query, &mut referenced);
            for name in &referenced {
                if !view_names.contains(name) && !schema.contains_table(name) {
                    return Err(CatalogError::UnknownTable {
                        name: name.clone(),
                        context: view.name.clone(),
                        span: view.span,
                    }
                    .into());
                }
            }
            let view_deps: HashSet<String> = referenced
                .into_iter()
                .filter(|name| view_names.contains(name))
                .collect();
            dependencies.insert(view.name.to_ascii_lowercase(), view_deps);
        }

        if !views.is_empty() {
            debug!(views = views.len(), "resolving views in dependency order");
        }

        let mut pending: Vec<&ViewDeclaration> = views;
        while !pending.is_empty() {
            let ready_index = pending.iter().position(|view| {
                dependencies[&view.name.to_ascii_lowercase()]
                    .iter()
                    .all(|dep| schema.contains_table(dep))
            });

            let Some(index) = ready_index else {
                let mut names: Vec<String> =
                    pending.iter().map(|view| view.name.clone()).collect();
                names.sort();
                return Err(CatalogError::CyclicViewDependency { views: names }.into());
            };

            let view = pending.remove(index);
            let shape = resolver.resolve_view(schema, view)?;
            let columns = apply_column_names(view, shape.columns)?;
            debug!(view = %view.name, columns = columns.len(), "view resolved");

            let mut table = Table::view(view.name.clone(), columns, shape.dependent_tables);
            if let Some(package) = &self.package {
                table = table.with_package(package.clone());
            }
            schema.insert_table(table);
        }

        Ok(())
    }

    fn build_table(&self, declaration: &TableDeclaration) -> CatalogResult<Table> {
        let table_pk = table_primary_key(declaration);
        let table_unique = table_unique_columns(declaration);

        let mut columns = Vec::with_capacity(declaration.columns.len());
        for column in &declaration.columns {
            columns.push(build_column(
                declaration,
                column,
                &table_pk,
                &table_unique,
            )?);
        }

        let is_key_value = is_key_value_table(&columns);
        let mut table = Table::new(declaration.name.clone())
            .with_columns(columns)
            .with_key_value(is_key_value);
        if let Some(package) = &self.package {
            table = table.with_package(package.clone());
        }
        Ok(table)
    }
}

/// Columns named by a table-level `PRIMARY KEY(...)` constraint
fn table_primary_key(declaration: &TableDeclaration) -> Vec<String> {
    declaration
        .constraints
        .iter()
        .find_map(|constraint| match constraint {
            TableConstraint::PrimaryKey(columns) => Some(columns.clone()),
            _ => None,
        })
        .unwrap_or_default()
}

/// Columns named by single-column table-level `UNIQUE(...)` constraints
fn table_unique_columns(declaration: &TableDeclaration) -> Vec<String> {
    declaration
        .constraints
        .iter()
        .filter_map(|constraint| match constraint {
            TableConstraint::Unique(columns) if columns.len() == 1 => {
                Some(columns[0].clone())
            }
            _ => None,
        })
        .collect()
}

fn build_column(
    table: &TableDeclaration,
    declaration: &ColumnDeclaration,
    table_pk: &[String],
    table_unique: &[String],
) -> CatalogResult<Column> {
    let type_name = &declaration.type_clause.type_name;
    let sql_type =
        SqlType::from_keyword(type_name).ok_or_else(|| CatalogError::UnknownType {
            type_name: type_name.clone(),
            table: table.name.clone(),
            column: declaration.name.clone(),
            span: declaration.type_clause.span,
        })?;

    let mut not_null = false;
    let mut column_pk = false;
    let mut unique = false;
    let mut references = None;
    for constraint in &declaration.constraints {
        match constraint {
            ColumnConstraint::NotNull => not_null = true,
            ColumnConstraint::PrimaryKey { .. } => column_pk = true,
            ColumnConstraint::Unique => unique = true,
            ColumnConstraint::ForeignKey { table, column } => {
                references = Some((
                    table.clone(),
                    column.clone().unwrap_or_else(|| declaration.name.clone()),
                ));
            }
        }
    }

    let in_table_pk = table_pk
        .iter()
        .any(|name| name.eq_ignore_ascii_case(&declaration.name));
    let is_primary_key = column_pk || in_table_pk;

    // SQLite's rowid-alias rule: a single-column INTEGER primary key, with
    // the type spelled exactly INTEGER (INT does not qualify).
    let sole_pk = column_pk
        || (in_table_pk && table_pk.len() == 1);
    let is_rowid_alias =
        sole_pk && sql_type == SqlType::Integer && type_name.eq_ignore_ascii_case("INTEGER");

    let mut column = Column::new(declaration.name.clone(), sql_type)
        .with_nullable(!(not_null || is_primary_key));
    if let Some(custom_type) = &declaration.type_clause.custom_type {
        column = column.with_custom_type(custom_type.clone());
    }
    if is_primary_key {
        column = column.with_primary_key();
    }
    if is_rowid_alias {
        column = column.with_rowid_alias();
    }
    if unique
        || table_unique
            .iter()
            .any(|name| name.eq_ignore_ascii_case(&declaration.name))
    {
        column = column.with_unique();
    }
    if let Some((ref_table, ref_column)) = references {
        column = column.with_references(ref_table, ref_column);
    }
    Ok(column)
}

/// Structural key/value detection: exactly two columns, the first a
/// `TEXT PRIMARY KEY` named `key`, the second named `value`
fn is_key_value_table(columns: &[Column]) -> bool {
    match columns {
        [key, value] => {
            key.name.eq_ignore_ascii_case("key")
                && key.sql_type == SqlType::Text
                && key.is_primary_key
                && value.name.eq_ignore_ascii_case("value")
        }
        _ => false,
    }
}

/// Apply a view's explicit column list, checking arity
fn apply_column_names(
    view: &ViewDeclaration,
    mut columns: Vec<Column>,
) -> CatalogResult<Vec<Column>> {
    if let Some(names) = &view.column_names {
        if names.len() != columns.len() {
            return Err(CatalogError::ViewColumnCountMismatch {
                view: view.name.clone(),
                declared: names.len(),
                resolved: columns.len(),
                span: view.span,
            });
        }
        for (column, name) in columns.iter_mut().zip(names) {
            column.name = name.clone();
        }
    }
    Ok(columns)
}

/// The table a statement writes, if it is a write
fn statement_write_target(statement: &Statement) -> Option<String> {
    match statement {
        Statement::Insert(insert) => Some(insert.table.clone()),
        Statement::Update(update) => Some(update.table.clone()),
        Statement::Delete(delete) => Some(delete.table.clone()),
        Statement::Select(_) => None,
    }
}

/// Collect every table name a SELECT references, lowercased
///
/// Walks FROM sources, join chains, and subqueries in expression position;
/// used for view dependency ordering.
pub(crate) fn collect_select_tables(select: &Select, out: &mut TableSet) {
    collect_body_tables(&select.body, out);
    for term in &select.order_by {
        collect_expr_tables(&term.expr, out);
    }
    if let Some(limit) = &select.limit {
        collect_expr_tables(limit, out);
    }
    if let Some(offset) = &select.offset {
        collect_expr_tables(offset, out);
    }
}

fn collect_body_tables(body: &SelectBody, out: &mut TableSet) {
    match body {
        SelectBody::Select(core) => collect_core_tables(core, out),
        SelectBody::Compound { left, right, .. } => {
            collect_body_tables(left, out);
            collect_body_tables(right, out);
        }
    }
}

fn collect_core_tables(core: &SelectCore, out: &mut TableSet) {
    if let Some(from) = &core.from {
        collect_from_tables(from, out);
    }
    for item in &core.projection {
        if let SelectItem::Expr { expr, .. } = item {
            collect_expr_tables(expr, out);
        }
    }
    if let Some(where_clause) = &core.where_clause {
        collect_expr_tables(where_clause, out);
    }
    for expr in &core.group_by {
        collect_expr_tables(expr, out);
    }
    if let Some(having) = &core.having {
        collect_expr_tables(having, out);
    }
}

fn collect_from_tables(from: &FromClause, out: &mut TableSet) {
    collect_source_tables(&from.source.kind, out);
    for join in &from.joins {
        collect_source_tables(&join.source.kind, out);
        if let Some(sql_typegen_ast::JoinConstraint::On(expr)) = &join.constraint {
            collect_expr_tables(expr, out);
        }
    }
}

fn collect_source_tables(kind: &SourceKind, out: &mut TableSet) {
    match kind {
        SourceKind::Table(name) => {
            out.insert(name.to_ascii_lowercase());
        }
        SourceKind::Subquery(select) => collect_select_tables(select, out),
    }
}

fn collect_expr_tables(expr: &Expr, out: &mut TableSet) {
    match expr {
        Expr::Literal(_) | Expr::Column(_) | Expr::Placeholder(_) | Expr::Wildcard(_) => {}
        Expr::Call { args, .. } => {
            for arg in args {
                collect_expr_tables(arg, out);
            }
        }
        Expr::BinaryOp { left, right, .. } => {
            collect_expr_tables(left, out);
            collect_expr_tables(right, out);
        }
        Expr::UnaryOp { expr, .. } => collect_expr_tables(expr, out),
        Expr::Case {
            operand,
            when_clauses,
            else_clause,
        } => {
            if let Some(operand) = operand {
                collect_expr_tables(operand, out);
            }
            for when in when_clauses {
                collect_expr_tables(&when.condition, out);
                collect_expr_tables(&when.result, out);
            }
            if let Some(else_clause) = else_clause {
                collect_expr_tables(else_clause, out);
            }
        }
        Expr::Cast { expr, .. } => collect_expr_tables(expr, out),
        Expr::Subquery(select) => collect_select_tables(select, out),
        Expr::In {
            expr, operand, ..
        } => {
            collect_expr_tables(expr, out);
            match operand {
                InOperand::List(items) => {
                    for item in items {
                        collect_expr_tables(item, out);
                    }
                }
                InOperand::Placeholder(_) => {}
                InOperand::Subquery(select) => collect_select_tables(select, out),
            }
        }
        Expr::Paren(expr) => collect_expr_tables(expr, out),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn select_from(table: &str) -> Select {
        SelectCore::new()
            .with_projection(vec![SelectItem::wildcard()])
            .with_from(FromClause::table(table))
            .into_select()
    }

    #[test]
    fn test_collect_select_tables_from_and_subquery() {
        let select = SelectCore::new()
            .with_projection(vec![SelectItem::expr(Expr::Subquery(Box::new(
                select_from("stats"),
            )))])
            .with_from(FromClause::table("Players"))
            .into_select();

        let mut out = TableSet::new();
        collect_select_tables(&select, &mut out);
        assert!(out.contains("players"));
        assert!(out.contains("stats"));
    }

    #[test]
    fn test_key_value_detection() {
        let columns = vec![
            Column::new("key", SqlType::Text).with_primary_key(),
            Column::new("value", SqlType::Blob),
        ];
        assert!(is_key_value_table(&columns));

        let columns = vec![
            Column::new("id", SqlType::Text).with_primary_key(),
            Column::new("value", SqlType::Blob),
        ];
        assert!(!is_key_value_table(&columns));
    }

    #[test]
    fn test_rowid_alias_requires_integer_spelling() {
        let table = TableDeclaration::new("players")
            .with_column(ColumnDeclaration::new("_id", "INT").primary_key());
        let built = SchemaBuilder::new().build_table(&table).unwrap();
        let id = built.find_column("_id").unwrap();
        assert!(id.is_primary_key);
        assert!(!id.is_rowid_alias);

        let table = TableDeclaration::new("players")
            .with_column(ColumnDeclaration::new("_id", "INTEGER").primary_key());
        let built = SchemaBuilder::new().build_table(&table).unwrap();
        let id = built.find_column("_id").unwrap();
        assert!(id.is_rowid_alias);
        assert!(!id.nullable);
    }
}
