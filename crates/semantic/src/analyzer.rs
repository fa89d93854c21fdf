// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Compile driver
//!
//! Ties the stages of one compilation unit together: build the schema
//! (resolving each view's columns through [`ShapeViewResolver`]), then
//! resolve every named query to its shape and argument bindings. Any error
//! aborts the unit; query errors are wrapped with the query's name.

use crate::binder::ArgumentBinder;
use crate::error::{SemanticError, SemanticResult};
use crate::model::{CompiledUnit, ResolvedQuery, UnitOptions};
use crate::shape::QueryResolver;
use sql_typegen_ast::{Declaration, NamedQuery, SqlType, ViewDeclaration};
use sql_typegen_catalog::{Column, Schema, SchemaBuilder, ViewResolver, ViewShape};
use sql_typegen_functions::FunctionRegistry;
use tracing::{debug, instrument};

/// Resolves view columns by computing the defining query's shape
pub struct ShapeViewResolver<'a> {
    functions: &'a FunctionRegistry,
}

impl<'a> ShapeViewResolver<'a> {
    pub fn new(functions: &'a FunctionRegistry) -> Self {
        Self { functions }
    }
}

impl ViewResolver for ShapeViewResolver<'_> {
    type Error = SemanticError;

    fn resolve_view(
        &self,
        schema: &Schema,
        view: &ViewDeclaration,
    ) -> Result<ViewShape, SemanticError> {
        let resolver = QueryResolver::new(schema, self.functions);
        let shape = resolver.resolve_select(&view.query)?;

        let columns = shape
            .result_columns
            .iter()
            .map(|column| {
                let sql_type = column.ty.sql_type.unwrap_or(SqlType::Text);
                let mut built = Column::new(column.display_name.clone(), sql_type)
                    .with_nullable(column.ty.nullable);
                if let Some(custom_type) = &column.ty.custom_type {
                    built = built.with_custom_type(custom_type.clone());
                }
                built
            })
            .collect();

        Ok(ViewShape {
            columns,
            dependent_tables: shape.dependent_tables,
        })
    }
}

/// Resolve one named query against a built schema
pub fn resolve_query(
    schema: &Schema,
    functions: &FunctionRegistry,
    query: &NamedQuery,
) -> SemanticResult<ResolvedQuery> {
    let resolver = QueryResolver::new(schema, functions);
    let statement = resolver.resolve_statement(&query.statement)?;
    let bindings = ArgumentBinder::new(&resolver).bind(&query.statement)?;

    debug!(
        query = %query.name,
        columns = statement.shape.result_columns.len(),
        arguments = bindings.arguments.len(),
        "query resolved"
    );

    Ok(ResolvedQuery {
        name: query.name.clone(),
        kind: statement.kind,
        shape: statement.shape,
        bindings,
        table_set: statement.table_set,
    })
}

/// Compile one unit: declarations into a schema, then each query in order
///
/// Queries resolve independently against the immutable schema; an error in
/// one aborts the unit, carrying that query's name.
#[instrument(skip_all, fields(declarations = declarations.len(), queries = queries.len()))]
pub fn compile_unit(
    options: &UnitOptions,
    declarations: &[Declaration],
    queries: &[NamedQuery],
) -> SemanticResult<CompiledUnit> {
    let functions = FunctionRegistry::new();
    let schema = SchemaBuilder::new()
        .with_package(options.package.clone())
        .build(declarations, &ShapeViewResolver::new(&functions))?;

    let mut resolved = Vec::with_capacity(queries.len());
    for query in queries {
        let query = resolve_query(&schema, &functions, query).map_err(|source| {
            SemanticError::Query {
                name: query.name.clone(),
                source: Box::new(source),
            }
        })?;
        resolved.push(query);
    }

    debug!(tables = schema.table_count(), queries = resolved.len(), "unit compiled");
    Ok(CompiledUnit {
        schema,
        queries: resolved,
    })
}
