// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Resolution context
//!
//! The lexical scope a column reference resolves against: one layer of
//! [`ContextSource`]s per SELECT core, chained to the enclosing statement's
//! layer for correlated subqueries. Qualified references match a source
//! label in the nearest layer that has it; bare references search a layer's
//! sources, error on a tie, and only then fall through to the parent.
//!
//! Sources own their columns (cloned out of the schema or a subquery shape)
//! so left-join nullability can be baked in per scope without touching the
//! catalog.

use crate::error::{SemanticError, SemanticResult};
use crate::model::ColumnOrigin;
use crate::types::ResolvedType;
use sql_typegen_ast::ColumnRef;
use sql_typegen_catalog::Table;
use std::collections::BTreeSet;

use crate::model::QueryShape;

/// One column visible in a scope
#[derive(Debug, Clone)]
pub(crate) struct ContextColumn {
    pub name: String,
    pub ty: ResolvedType,
    pub origin: Option<ColumnOrigin>,
}

/// One FROM source in a scope: a table, an aliased table, or a subquery
#[derive(Debug, Clone)]
pub(crate) struct ContextSource {
    /// The name qualified references match: the alias if present, else the
    /// table name; anonymous subqueries have none
    label: Option<String>,
    columns: Vec<ContextColumn>,
    /// Lowercase names hidden from wildcards and bare lookup (USING merge)
    hidden: BTreeSet<String>,
}

impl ContextSource {
    pub fn from_table(table: &Table, alias: Option<&str>) -> Self {
        let columns = table
            .columns
            .iter()
            .map(|column| ContextColumn {
                name: column.name.clone(),
                ty: ResolvedType::from_column(column),
                origin: Some(ColumnOrigin {
                    table: table.name.clone(),
                    column: column.name.clone(),
                }),
            })
            .collect();
        Self {
            label: Some(alias.unwrap_or(&table.name).to_string()),
            columns,
            hidden: BTreeSet::new(),
        }
    }

    pub fn from_shape(alias: Option<&str>, shape: &QueryShape) -> Self {
        let columns = shape
            .result_columns
            .iter()
            .map(|column| ContextColumn {
                name: column.display_name.clone(),
                ty: column.ty.clone(),
                origin: column.origin.clone(),
            })
            .collect();
        Self {
            label: alias.map(str::to_string),
            columns,
            hidden: BTreeSet::new(),
        }
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Whether a qualifier names this source
    pub fn matches(&self, name: &str) -> bool {
        self.label
            .as_deref()
            .is_some_and(|label| label.eq_ignore_ascii_case(name))
    }

    /// Find a column including USING-hidden ones (qualified access)
    pub fn find_column(&self, name: &str) -> Option<&ContextColumn> {
        self.columns
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Find a column, skipping USING-hidden ones (bare access)
    pub fn find_visible_column(&self, name: &str) -> Option<&ContextColumn> {
        self.visible_columns()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// All columns in declaration order (qualified wildcard expansion)
    pub fn columns(&self) -> &[ContextColumn] {
        &self.columns
    }

    /// Columns minus USING-hidden ones (bare wildcard expansion)
    pub fn visible_columns(&self) -> impl Iterator<Item = &ContextColumn> {
        self.columns
            .iter()
            .filter(|c| !self.hidden.contains(&c.name.to_ascii_lowercase()))
    }

    /// Make every column of this source nullable (right side of LEFT JOIN)
    pub fn force_nullable(&mut self) {
        for column in &mut self.columns {
            column.ty.nullable = true;
        }
    }

    /// Hide a column from wildcards and bare lookup (USING merge column)
    pub fn hide_column(&mut self, name: &str) {
        self.hidden.insert(name.to_ascii_lowercase());
    }
}

/// A layered lexical scope
#[derive(Debug)]
pub(crate) struct ResolutionContext<'a> {
    parent: Option<&'a ResolutionContext<'a>>,
    sources: Vec<ContextSource>,
}

impl<'a> ResolutionContext<'a> {
    /// The outermost scope of a statement
    pub fn root(sources: Vec<ContextSource>) -> Self {
        Self {
            parent: None,
            sources,
        }
    }

    /// A nested scope whose bare references can escape to this one
    pub fn child(&'a self, sources: Vec<ContextSource>) -> ResolutionContext<'a> {
        ResolutionContext {
            parent: Some(self),
            sources,
        }
    }

    /// This layer's sources, in FROM order
    pub fn sources(&self) -> &[ContextSource] {
        &self.sources
    }

    /// The source a qualifier names, in this layer only
    pub fn source(&self, name: &str) -> Option<&ContextSource> {
        self.sources.iter().find(|s| s.matches(name))
    }

    /// Resolve a column reference to its source label and column
    pub fn resolve(&self, reference: &ColumnRef) -> SemanticResult<(Option<&str>, &ContextColumn)> {
        match &reference.table {
            Some(qualifier) => self.resolve_qualified(qualifier, reference),
            None => self.resolve_bare(reference),
        }
    }

    fn resolve_qualified(
        &self,
        qualifier: &str,
        reference: &ColumnRef,
    ) -> SemanticResult<(Option<&str>, &ContextColumn)> {
        let mut layer = Some(self);
        let mut qualifier_seen = false;
        while let Some(current) = layer {
            if let Some(source) = current.source(qualifier) {
                qualifier_seen = true;
                if let Some(column) = source.find_column(&reference.column) {
                    return Ok((source.label(), column));
                }
            }
            layer = current.parent;
        }
        if qualifier_seen {
            Err(SemanticError::UnknownColumn {
                column: reference.qualified(),
                span: reference.span,
            })
        } else {
            Err(SemanticError::UnknownTable {
                name: qualifier.to_string(),
                span: reference.span,
            })
        }
    }

    fn resolve_bare(&self, reference: &ColumnRef) -> SemanticResult<(Option<&str>, &ContextColumn)> {
        let mut layer = Some(self);
        while let Some(current) = layer {
            let mut matches: Vec<(Option<&str>, &ContextColumn)> = Vec::new();
            for source in &current.sources {
                if let Some(column) = source.find_visible_column(&reference.column) {
                    matches.push((source.label(), column));
                }
            }
            match matches.len() {
                0 => layer = current.parent,
                1 => return Ok(matches.remove(0)),
                _ => {
                    return Err(SemanticError::AmbiguousColumn {
                        column: reference.column.clone(),
                        candidates: matches
                            .iter()
                            .map(|(label, _)| label.unwrap_or("<subquery>").to_string())
                            .collect(),
                        span: reference.span,
                    });
                }
            }
        }
        Err(SemanticError::UnknownColumn {
            column: reference.column.clone(),
            span: reference.span,
        })
    }
}
