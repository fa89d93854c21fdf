// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Query shape resolution
//!
//! Computes the [`QueryShape`] of a statement against a built schema:
//! wildcard expansion in FROM order, alias and provenance tracking,
//! left-join nullability, compound-arm merging, and display-name
//! disambiguation. Writes produce an empty shape; their dependent tables
//! are what the statement reads, and their table set is the trigger-closed
//! write set.

use crate::context::{ContextColumn, ContextSource, ResolutionContext};
use crate::error::{SemanticError, SemanticResult};
use crate::model::{QueryKind, QueryShape, ResultColumn};
use sql_typegen_ast::{
    ColumnRef, Delete, Expr, FromClause, Insert, InsertSource, JoinConstraint, JoinOp, Select,
    SelectBody, SelectCore, SelectItem, SelectSource, SourceKind, Span, Statement, Update,
};
use sql_typegen_catalog::{Column, Schema, Table, TableSet};
use sql_typegen_functions::FunctionRegistry;
use std::collections::BTreeSet;
use tracing::trace;

/// A statement's shape together with its invalidation table set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementShape {
    pub kind: QueryKind,
    pub shape: QueryShape,
    pub table_set: TableSet,
}

/// Resolves statements against one schema and function registry
///
/// Holds no per-statement state; one resolver serves every query of a
/// compilation unit.
pub struct QueryResolver<'a> {
    schema: &'a Schema,
    functions: &'a FunctionRegistry,
}

impl<'a> QueryResolver<'a> {
    pub fn new(schema: &'a Schema, functions: &'a FunctionRegistry) -> Self {
        Self { schema, functions }
    }

    pub fn schema(&self) -> &Schema {
        self.schema
    }

    pub(crate) fn functions(&self) -> &FunctionRegistry {
        self.functions
    }

    /// Resolve the result shape of a SELECT statement
    pub fn resolve_select(&self, select: &Select) -> SemanticResult<QueryShape> {
        self.resolve_select_in(select, None)
    }

    /// Resolve a statement to its shape, kind and table set
    pub fn resolve_statement(&self, statement: &Statement) -> SemanticResult<StatementShape> {
        match statement {
            Statement::Select(select) => {
                let shape = self.resolve_select(select)?;
                let table_set = shape.dependent_tables.clone();
                Ok(StatementShape {
                    kind: QueryKind::Select,
                    shape,
                    table_set,
                })
            }
            Statement::Insert(insert) => self.resolve_insert(insert),
            Statement::Update(update) => self.resolve_update(update),
            Statement::Delete(delete) => self.resolve_delete(delete),
        }
    }

    /// ORDER BY/LIMIT never change the shape; only the body is resolved.
    pub(crate) fn resolve_select_in(
        &self,
        select: &Select,
        parent: Option<&ResolutionContext<'_>>,
    ) -> SemanticResult<QueryShape> {
        self.resolve_body(&select.body, parent)
    }

    fn resolve_body(
        &self,
        body: &SelectBody,
        parent: Option<&ResolutionContext<'_>>,
    ) -> SemanticResult<QueryShape> {
        match body {
            SelectBody::Select(core) => self.resolve_core(core, parent),
            SelectBody::Compound { op: _, left, right } => {
                let left_shape = self.resolve_body(left, parent)?;
                let right_shape = self.resolve_body(right, parent)?;
                merge_compound(left_shape, right_shape, body)
            }
        }
    }

    fn resolve_core(
        &self,
        core: &SelectCore,
        parent: Option<&ResolutionContext<'_>>,
    ) -> SemanticResult<QueryShape> {
        let mut deps = TableSet::new();
        let sources = match &core.from {
            Some(from) => self.build_sources(from, parent, &mut deps)?,
            None => Vec::new(),
        };
        let ctx = match parent {
            Some(parent) => parent.child(sources),
            None => ResolutionContext::root(sources),
        };

        // ON constraints are resolved for their errors and subquery deps
        if let Some(from) = &core.from {
            for join in &from.joins {
                if let Some(JoinConstraint::On(expr)) = &join.constraint {
                    self.resolve_expr(expr, &ctx, &mut deps)?;
                }
            }
        }

        let mut raw: Vec<(Option<String>, ResultColumn)> = Vec::new();
        for item in &core.projection {
            match item {
                SelectItem::Wildcard { span } => {
                    if ctx.sources().is_empty() {
                        return Err(SemanticError::UnknownColumn {
                            column: "*".to_string(),
                            span: *span,
                        });
                    }
                    for source in ctx.sources() {
                        let label = source.label().map(str::to_string);
                        for column in source.visible_columns() {
                            raw.push((label.clone(), result_column(column, None)));
                        }
                    }
                }
                SelectItem::TableWildcard { table, span } => {
                    let source =
                        ctx.source(table)
                            .ok_or_else(|| SemanticError::UnknownTable {
                                name: table.clone(),
                                span: *span,
                            })?;
                    let label = source.label().map(str::to_string);
                    // `t.*` includes columns a USING clause hid from `*`
                    for column in source.columns() {
                        raw.push((label.clone(), result_column(column, None)));
                    }
                }
                SelectItem::Expr { expr, alias } => {
                    if let Some(reference) = column_reference(expr) {
                        let (label, column) = ctx.resolve(reference)?;
                        let label = label.map(str::to_string);
                        raw.push((label, result_column(column, alias.clone())));
                    } else {
                        let ty = self.resolve_expr(expr, &ctx, &mut deps)?;
                        let display_name =
                            alias.clone().unwrap_or_else(|| derived_name(expr));
                        raw.push((
                            None,
                            ResultColumn {
                                display_name,
                                ty,
                                origin: None,
                            },
                        ));
                    }
                }
            }
        }

        if let Some(where_clause) = &core.where_clause {
            self.resolve_expr(where_clause, &ctx, &mut deps)?;
        }
        for expr in &core.group_by {
            self.resolve_expr(expr, &ctx, &mut deps)?;
        }
        if let Some(having) = &core.having {
            self.resolve_expr(having, &ctx, &mut deps)?;
        }

        let result_columns = disambiguate(raw);
        trace!(columns = result_columns.len(), "select core resolved");
        Ok(QueryShape {
            result_columns,
            dependent_tables: deps,
        })
    }

    pub(crate) fn build_sources(
        &self,
        from: &FromClause,
        parent: Option<&ResolutionContext<'_>>,
        deps: &mut TableSet,
    ) -> SemanticResult<Vec<ContextSource>> {
        let mut sources = vec![self.build_source(&from.source, parent, deps)?];
        // Nullability infects every source to the right of the first LEFT JOIN
        let mut infectious = false;
        for join in &from.joins {
            let mut source = self.build_source(&join.source, parent, deps)?;
            if join.op == JoinOp::Left {
                infectious = true;
            }
            if infectious {
                source.force_nullable();
            }
            if let Some(JoinConstraint::Using(columns)) = &join.constraint {
                for name in columns {
                    let left_has = sources.iter().any(|s| s.find_column(name).is_some());
                    if !left_has || source.find_column(name).is_none() {
                        return Err(SemanticError::UnknownColumn {
                            column: name.clone(),
                            span: join.source.span,
                        });
                    }
                    source.hide_column(name);
                }
            }
            sources.push(source);
        }
        Ok(sources)
    }

    fn build_source(
        &self,
        source: &SelectSource,
        parent: Option<&ResolutionContext<'_>>,
        deps: &mut TableSet,
    ) -> SemanticResult<ContextSource> {
        match &source.kind {
            SourceKind::Table(name) => {
                let table = self.lookup_table(name, source.span)?;
                deps.extend(table.base_tables());
                Ok(ContextSource::from_table(table, source.alias.as_deref()))
            }
            SourceKind::Subquery(select) => {
                let shape = self.resolve_select_in(select, parent)?;
                deps.extend(shape.dependent_tables.iter().cloned());
                Ok(ContextSource::from_shape(source.alias.as_deref(), &shape))
            }
        }
    }

    fn lookup_table(&self, name: &str, span: Span) -> SemanticResult<&Table> {
        self.schema
            .table(name)
            .ok_or_else(|| SemanticError::UnknownTable {
                name: name.to_string(),
                span,
            })
    }

    fn resolve_insert(&self, insert: &Insert) -> SemanticResult<StatementShape> {
        let table = self.lookup_table(&insert.table, insert.span)?;
        let targets = self.insert_targets(table, insert)?;
        let mut deps = TableSet::new();

        match &insert.source {
            InsertSource::Values(rows) => {
                let ctx = ResolutionContext::root(Vec::new());
                for row in rows {
                    if row.len() != targets.len() {
                        return Err(SemanticError::InsertColumnCountMismatch {
                            table: table.name.clone(),
                            expected: targets.len(),
                            actual: row.len(),
                            span: insert.span,
                        });
                    }
                    for expr in row {
                        self.resolve_expr(expr, &ctx, &mut deps)?;
                    }
                }
            }
            InsertSource::Select(select) => {
                let shape = self.resolve_select(select)?;
                if shape.result_columns.len() != targets.len() {
                    return Err(SemanticError::InsertColumnCountMismatch {
                        table: table.name.clone(),
                        expected: targets.len(),
                        actual: shape.result_columns.len(),
                        span: insert.span,
                    });
                }
                deps.extend(shape.dependent_tables);
            }
            InsertSource::DefaultValues => {}
        }

        Ok(StatementShape {
            kind: QueryKind::Insert,
            shape: QueryShape::empty().with_dependent_tables(deps),
            table_set: self.schema.tables_affected_by_write(&insert.table),
        })
    }

    /// The columns an INSERT assigns, in value order
    pub(crate) fn insert_targets(
        &self,
        table: &'a Table,
        insert: &Insert,
    ) -> SemanticResult<Vec<&'a Column>> {
        if insert.columns.is_empty() {
            return Ok(table.columns.iter().collect());
        }
        insert
            .columns
            .iter()
            .map(|name| {
                table
                    .find_column(name)
                    .ok_or_else(|| SemanticError::UnknownColumn {
                        column: name.clone(),
                        span: insert.span,
                    })
            })
            .collect()
    }

    fn resolve_update(&self, update: &Update) -> SemanticResult<StatementShape> {
        let table = self.lookup_table(&update.table, update.span)?;
        let ctx = ResolutionContext::root(vec![ContextSource::from_table(table, None)]);
        let mut deps = table.base_tables();

        for assignment in &update.assignments {
            if table.find_column(&assignment.column).is_none() {
                return Err(SemanticError::UnknownColumn {
                    column: assignment.column.clone(),
                    span: update.span,
                });
            }
            self.resolve_expr(&assignment.value, &ctx, &mut deps)?;
        }
        if let Some(where_clause) = &update.where_clause {
            self.resolve_expr(where_clause, &ctx, &mut deps)?;
        }

        Ok(StatementShape {
            kind: QueryKind::Update,
            shape: QueryShape::empty().with_dependent_tables(deps),
            table_set: self.schema.tables_affected_by_write(&update.table),
        })
    }

    fn resolve_delete(&self, delete: &Delete) -> SemanticResult<StatementShape> {
        let table = self.lookup_table(&delete.table, delete.span)?;
        let ctx = ResolutionContext::root(vec![ContextSource::from_table(table, None)]);
        let mut deps = table.base_tables();

        if let Some(where_clause) = &delete.where_clause {
            self.resolve_expr(where_clause, &ctx, &mut deps)?;
        }

        Ok(StatementShape {
            kind: QueryKind::Delete,
            shape: QueryShape::empty().with_dependent_tables(deps),
            table_set: self.schema.tables_affected_by_write(&delete.table),
        })
    }
}

fn result_column(column: &ContextColumn, alias: Option<String>) -> ResultColumn {
    ResultColumn {
        display_name: alias.unwrap_or_else(|| column.name.clone()),
        ty: column.ty.clone(),
        origin: column.origin.clone(),
    }
}

/// A projection item that is a plain column read, through any parentheses
fn column_reference(expr: &Expr) -> Option<&ColumnRef> {
    match expr {
        Expr::Column(reference) => Some(reference),
        Expr::Paren(inner) => column_reference(inner),
        _ => None,
    }
}

/// Display name for an unaliased computed projection item
fn derived_name(expr: &Expr) -> String {
    match expr {
        Expr::Call { name, .. } => name.to_ascii_lowercase(),
        Expr::Cast { expr, .. } | Expr::Paren(expr) => derived_name(expr),
        Expr::Column(reference) => reference.column.clone(),
        _ => "expr".to_string(),
    }
}

/// Make display names unique: a colliding column keeps its source label as
/// prefix (`two__id`), then takes a numeric suffix if still taken
fn disambiguate(raw: Vec<(Option<String>, ResultColumn)>) -> Vec<ResultColumn> {
    let mut used: BTreeSet<String> = BTreeSet::new();
    let mut out = Vec::with_capacity(raw.len());
    for (label, mut column) in raw {
        let mut name = column.display_name.clone();
        if !used.insert(name.to_ascii_lowercase()) {
            if let Some(label) = &label {
                name = format!("{}_{}", label, column.display_name);
            }
            if label.is_none() || !used.insert(name.to_ascii_lowercase()) {
                let base = name.clone();
                let mut suffix = 2;
                loop {
                    name = format!("{base}_{suffix}");
                    if used.insert(name.to_ascii_lowercase()) {
                        break;
                    }
                    suffix += 1;
                }
            }
        }
        column.display_name = name;
        out.push(column);
    }
    out
}

/// Merge two compound arms positionally
///
/// The left arm's display names win; a column that traces to the same
/// table column in both arms keeps its provenance, any other pair loses it.
fn merge_compound(
    left: QueryShape,
    right: QueryShape,
    body: &SelectBody,
) -> SemanticResult<QueryShape> {
    if left.result_columns.len() != right.result_columns.len() {
        return Err(SemanticError::SetOperationColumnCountMismatch {
            left: left.result_columns.len(),
            right: right.result_columns.len(),
            span: body_span(body),
        });
    }

    let mut dependent_tables = left.dependent_tables;
    dependent_tables.extend(right.dependent_tables);

    let result_columns = left
        .result_columns
        .into_iter()
        .zip(right.result_columns)
        .map(|(left, right)| ResultColumn {
            display_name: left.display_name,
            ty: left.ty.merge(&right.ty),
            origin: if left.origin == right.origin {
                left.origin
            } else {
                None
            },
        })
        .collect();

    Ok(QueryShape {
        result_columns,
        dependent_tables,
    })
}

fn body_span(body: &SelectBody) -> Span {
    match body {
        SelectBody::Select(core) => core.span,
        SelectBody::Compound { left, .. } => body_span(left),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ResolvedType;

    fn plain(name: &str) -> (Option<String>, ResultColumn) {
        (
            None,
            ResultColumn {
                display_name: name.to_string(),
                ty: ResolvedType::integer(),
                origin: None,
            },
        )
    }

    fn labeled(label: &str, name: &str) -> (Option<String>, ResultColumn) {
        let (_, column) = plain(name);
        (Some(label.to_string()), column)
    }

    #[test]
    fn test_disambiguate_prefixes_source_label() {
        let columns = disambiguate(vec![labeled("one", "_id"), labeled("two", "_id")]);
        assert_eq!(columns[0].display_name, "_id");
        assert_eq!(columns[1].display_name, "two__id");
    }

    #[test]
    fn test_disambiguate_numeric_suffix_without_label() {
        let columns = disambiguate(vec![plain("total"), plain("total"), plain("total")]);
        assert_eq!(columns[0].display_name, "total");
        assert_eq!(columns[1].display_name, "total_2");
        assert_eq!(columns[2].display_name, "total_3");
    }

    #[test]
    fn test_disambiguate_is_case_insensitive() {
        let columns = disambiguate(vec![plain("Name"), plain("name")]);
        assert_eq!(columns[0].display_name, "Name");
        assert_eq!(columns[1].display_name, "name_2");
    }

    #[test]
    fn test_derived_name_for_calls_and_casts() {
        let call = Expr::call("COUNT", vec![Expr::Wildcard(Default::default())]);
        assert_eq!(derived_name(&call), "count");

        let sum = Expr::binary(
            Expr::column("a"),
            sql_typegen_ast::BinaryOp::Add,
            Expr::column("b"),
        );
        assert_eq!(derived_name(&sum), "expr");
    }
}

