// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Argument binding
//!
//! Walks a statement collecting placeholder occurrences, numbers them by
//! SQLite's rule (an anonymous `?` takes the high-water index plus one, an
//! explicit `?N` raises the high-water mark to N, a repeated `:name` reuses
//! its first position), collapses repeats into logical arguments, and infers
//! each argument's expected type from its use site: the other side of a
//! comparison, the target column of an INSERT or UPDATE, the element type of
//! an IN list, or INTEGER for LIMIT/OFFSET. An argument no site constrains
//! is nullable TEXT.

use crate::context::{ContextSource, ResolutionContext};
use crate::error::{SemanticError, SemanticResult};
use crate::model::{ArgumentBindings, BoundArgument, StatementArity};
use crate::shape::QueryResolver;
use crate::types::ResolvedType;
use sql_typegen_ast::{
    BinaryOp, Delete, Expr, InOperand, Insert, InsertSource, JoinConstraint, Placeholder,
    PlaceholderKind, Select, SelectBody, SelectCore, SelectItem, SelectSource, SourceKind,
    Statement, Update,
};
use sql_typegen_catalog::TableSet;
use std::collections::BTreeSet;
use std::collections::HashMap;

/// One logical argument under construction
struct Slot {
    position: u32,
    name: Option<String>,
    ty: Option<ResolvedType>,
}

/// Collects and types the bind arguments of one statement
pub struct ArgumentBinder<'a> {
    resolver: &'a QueryResolver<'a>,
    slots: Vec<Slot>,
    /// Named placeholder -> slot index
    named: HashMap<String, usize>,
    high_water: u32,
    occurrences: Vec<u32>,
    array_positions: BTreeSet<u32>,
}

impl<'a> ArgumentBinder<'a> {
    pub fn new(resolver: &'a QueryResolver<'a>) -> Self {
        Self {
            resolver,
            slots: Vec::new(),
            named: HashMap::new(),
            high_water: 0,
            occurrences: Vec::new(),
            array_positions: BTreeSet::new(),
        }
    }

    /// Bind every placeholder of the statement
    pub fn bind(mut self, statement: &Statement) -> SemanticResult<ArgumentBindings> {
        self.visit_statement(statement)?;

        self.slots.sort_by_key(|slot| slot.position);
        let arguments: Vec<BoundArgument> = self
            .slots
            .into_iter()
            .map(|slot| {
                let ty = slot
                    .ty
                    .unwrap_or_else(|| ResolvedType::text().forced_nullable());
                BoundArgument {
                    position: slot.position,
                    name: slot.name,
                    adapter_required: ty.requires_adapter(),
                    ty,
                }
            })
            .collect();

        let arity = if self.array_positions.is_empty() {
            StatementArity::Fixed {
                arg_count: arguments.len(),
            }
        } else {
            StatementArity::Dynamic {
                array_arguments: self.array_positions.into_iter().collect(),
            }
        };

        Ok(ArgumentBindings {
            arguments,
            occurrences: self.occurrences,
            arity,
        })
    }

    fn visit_statement(&mut self, statement: &Statement) -> SemanticResult<()> {
        match statement {
            Statement::Select(select) => self.visit_select(select, None),
            Statement::Insert(insert) => self.visit_insert(insert),
            Statement::Update(update) => self.visit_update(update),
            Statement::Delete(delete) => self.visit_delete(delete),
        }
    }

    fn visit_select(
        &mut self,
        select: &Select,
        parent: Option<&ResolutionContext<'_>>,
    ) -> SemanticResult<()> {
        self.visit_body(&select.body, parent)?;

        // ORDER BY terms constrain nothing; LIMIT/OFFSET are row counts
        let empty = ResolutionContext::root(Vec::new());
        for term in &select.order_by {
            self.visit_expr(&term.expr, None, &empty)?;
        }
        let row_count = ResolvedType::integer();
        if let Some(limit) = &select.limit {
            self.visit_expr(limit, Some(&row_count), &empty)?;
        }
        if let Some(offset) = &select.offset {
            self.visit_expr(offset, Some(&row_count), &empty)?;
        }
        Ok(())
    }

    fn visit_body(
        &mut self,
        body: &SelectBody,
        parent: Option<&ResolutionContext<'_>>,
    ) -> SemanticResult<()> {
        match body {
            SelectBody::Select(core) => self.visit_core(core, parent),
            SelectBody::Compound { left, right, .. } => {
                self.visit_body(left, parent)?;
                self.visit_body(right, parent)
            }
        }
    }

    fn visit_core(
        &mut self,
        core: &SelectCore,
        parent: Option<&ResolutionContext<'_>>,
    ) -> SemanticResult<()> {
        let mut deps = TableSet::new();
        let sources = match &core.from {
            Some(from) => self.resolver.build_sources(from, parent, &mut deps)?,
            None => Vec::new(),
        };
        let ctx = match parent {
            Some(parent) => parent.child(sources),
            None => ResolutionContext::root(sources),
        };

        for item in &core.projection {
            if let SelectItem::Expr { expr, .. } = item {
                self.visit_expr(expr, None, &ctx)?;
            }
        }
        if let Some(from) = &core.from {
            // FROM subqueries carry their own placeholders; they can only
            // correlate against the enclosing scope, never against siblings
            self.visit_source(&from.source, parent)?;
            for join in &from.joins {
                self.visit_source(&join.source, parent)?;
                if let Some(JoinConstraint::On(expr)) = &join.constraint {
                    self.visit_expr(expr, None, &ctx)?;
                }
            }
        }
        if let Some(where_clause) = &core.where_clause {
            self.visit_expr(where_clause, None, &ctx)?;
        }
        for expr in &core.group_by {
            self.visit_expr(expr, None, &ctx)?;
        }
        if let Some(having) = &core.having {
            self.visit_expr(having, None, &ctx)?;
        }
        Ok(())
    }

    fn visit_source(
        &mut self,
        source: &SelectSource,
        parent: Option<&ResolutionContext<'_>>,
    ) -> SemanticResult<()> {
        match &source.kind {
            SourceKind::Table(_) => Ok(()),
            SourceKind::Subquery(select) => self.visit_select(select, parent),
        }
    }

    fn visit_insert(&mut self, insert: &Insert) -> SemanticResult<()> {
        let table = self.resolver.schema().table(&insert.table).ok_or_else(|| {
            SemanticError::UnknownTable {
                name: insert.table.clone(),
                span: insert.span,
            }
        })?;
        let expected: Vec<ResolvedType> = self
            .resolver
            .insert_targets(table, insert)?
            .into_iter()
            .map(|column| {
                let mut ty = ResolvedType::from_column(column);
                // A rowid alias may be omitted or passed as NULL on insert
                if column.is_rowid_alias {
                    ty.nullable = true;
                }
                ty
            })
            .collect();

        let empty = ResolutionContext::root(Vec::new());
        match &insert.source {
            InsertSource::Values(rows) => {
                for row in rows {
                    for (expr, ty) in row.iter().zip(&expected) {
                        self.visit_expr(expr, Some(ty), &empty)?;
                    }
                }
                Ok(())
            }
            InsertSource::Select(select) => self.visit_select(select, None),
            InsertSource::DefaultValues => Ok(()),
        }
    }

    fn visit_update(&mut self, update: &Update) -> SemanticResult<()> {
        let table = self.resolver.schema().table(&update.table).ok_or_else(|| {
            SemanticError::UnknownTable {
                name: update.table.clone(),
                span: update.span,
            }
        })?;
        let ctx = ResolutionContext::root(vec![ContextSource::from_table(table, None)]);

        for assignment in &update.assignments {
            let expected = table
                .find_column(&assignment.column)
                .map(ResolvedType::from_column);
            self.visit_expr(&assignment.value, expected.as_ref(), &ctx)?;
        }
        if let Some(where_clause) = &update.where_clause {
            self.visit_expr(where_clause, None, &ctx)?;
        }
        Ok(())
    }

    fn visit_delete(&mut self, delete: &Delete) -> SemanticResult<()> {
        let table = self.resolver.schema().table(&delete.table).ok_or_else(|| {
            SemanticError::UnknownTable {
                name: delete.table.clone(),
                span: delete.span,
            }
        })?;
        let ctx = ResolutionContext::root(vec![ContextSource::from_table(table, None)]);
        if let Some(where_clause) = &delete.where_clause {
            self.visit_expr(where_clause, None, &ctx)?;
        }
        Ok(())
    }

    fn visit_expr(
        &mut self,
        expr: &Expr,
        expected: Option<&ResolvedType>,
        ctx: &ResolutionContext<'_>,
    ) -> SemanticResult<()> {
        match expr {
            Expr::Placeholder(placeholder) => self.record(placeholder, expected.cloned(), false),
            Expr::BinaryOp { left, op, right } => {
                let left_expected = if placeholder_like(left) {
                    self.expected_against(*op, right, ctx)
                } else {
                    None
                };
                let right_expected = if placeholder_like(right) {
                    self.expected_against(*op, left, ctx)
                } else {
                    None
                };
                self.visit_expr(left, left_expected.as_ref(), ctx)?;
                self.visit_expr(right, right_expected.as_ref(), ctx)
            }
            Expr::UnaryOp { expr, .. } => self.visit_expr(expr, None, ctx),
            Expr::Call { args, .. } => {
                for arg in args {
                    self.visit_expr(arg, None, ctx)?;
                }
                Ok(())
            }
            Expr::Case {
                operand,
                when_clauses,
                else_clause,
            } => {
                let operand_ty = operand.as_deref().and_then(|o| self.infer(o, ctx));
                if let Some(operand) = operand {
                    self.visit_expr(operand, None, ctx)?;
                }
                for clause in when_clauses {
                    self.visit_expr(&clause.condition, operand_ty.as_ref(), ctx)?;
                    self.visit_expr(&clause.result, None, ctx)?;
                }
                match else_clause {
                    Some(else_clause) => self.visit_expr(else_clause, None, ctx),
                    None => Ok(()),
                }
            }
            Expr::Cast { expr, .. } => self.visit_expr(expr, None, ctx),
            Expr::Subquery(select) => self.visit_nested_select(select, ctx),
            Expr::In { expr, operand, .. } => {
                let element = self.infer(expr, ctx);
                self.visit_expr(expr, None, ctx)?;
                match operand {
                    InOperand::List(items) => {
                        for item in items {
                            self.visit_expr(item, element.as_ref(), ctx)?;
                        }
                        Ok(())
                    }
                    InOperand::Placeholder(placeholder) => {
                        self.record(placeholder, element, true)
                    }
                    InOperand::Subquery(select) => self.visit_nested_select(select, ctx),
                }
            }
            Expr::Paren(inner) => self.visit_expr(inner, expected, ctx),
            Expr::Literal(_) | Expr::Column(_) | Expr::Wildcard(_) => Ok(()),
        }
    }

    fn visit_nested_select(
        &mut self,
        select: &Select,
        ctx: &ResolutionContext<'_>,
    ) -> SemanticResult<()> {
        self.visit_select(select, Some(ctx))
    }

    /// The type a placeholder should take opposite `other` under `op`
    fn expected_against(
        &self,
        op: BinaryOp,
        other: &Expr,
        ctx: &ResolutionContext<'_>,
    ) -> Option<ResolvedType> {
        match op {
            // Pattern operands are text regardless of the matched column
            BinaryOp::Like | BinaryOp::Glob => {
                let nullable = self.infer(other, ctx).map(|ty| ty.nullable).unwrap_or(true);
                Some(ResolvedType::text().with_nullable(nullable))
            }
            // IS comparisons are exactly the null-tolerant form
            BinaryOp::Is | BinaryOp::IsNot => {
                self.infer(other, ctx).map(ResolvedType::forced_nullable)
            }
            BinaryOp::And | BinaryOp::Or => None,
            _ => self.infer(other, ctx),
        }
    }

    /// Best-effort type of an expression; `None` when it does not resolve
    fn infer(&self, expr: &Expr, ctx: &ResolutionContext<'_>) -> Option<ResolvedType> {
        let mut deps = TableSet::new();
        self.resolver.resolve_expr(expr, ctx, &mut deps).ok()
    }

    fn record(
        &mut self,
        placeholder: &Placeholder,
        expected: Option<ResolvedType>,
        array: bool,
    ) -> SemanticResult<()> {
        let (position, name) = match &placeholder.kind {
            PlaceholderKind::Anonymous => {
                self.high_water += 1;
                (self.high_water, None)
            }
            PlaceholderKind::Indexed(0) => {
                return Err(SemanticError::MalformedPlaceholder {
                    token: placeholder.token(),
                    span: placeholder.span,
                });
            }
            PlaceholderKind::Indexed(index) => {
                self.high_water = self.high_water.max(*index);
                (*index, None)
            }
            PlaceholderKind::Named(name) => match self.named.get(name) {
                Some(&slot) => (self.slots[slot].position, Some(name.clone())),
                None => {
                    self.high_water += 1;
                    (self.high_water, Some(name.clone()))
                }
            },
        };

        let slot = match self.slots.iter().position(|s| s.position == position) {
            Some(slot) => slot,
            None => {
                self.slots.push(Slot {
                    position,
                    name: name.clone(),
                    ty: None,
                });
                if let Some(name) = name {
                    self.named.insert(name, self.slots.len() - 1);
                }
                self.slots.len() - 1
            }
        };

        if let Some(expected) = expected {
            let merged = match self.slots[slot].ty.take() {
                Some(ty) => ty.merge(&expected),
                None => expected,
            };
            self.slots[slot].ty = Some(merged);
        }

        self.occurrences.push(position);
        if array {
            self.array_positions.insert(position);
        }
        Ok(())
    }
}

/// Whether an expression is a placeholder, through any parentheses
fn placeholder_like(expr: &Expr) -> bool {
    match expr {
        Expr::Placeholder(_) => true,
        Expr::Paren(inner) => placeholder_like(inner),
        _ => false,
    }
}
