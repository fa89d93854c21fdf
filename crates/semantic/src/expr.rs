// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Expression type resolution
//!
//! Assigns a [`ResolvedType`] to every expression form. The rules are
//! SQLite's observable behavior, not SQL-standard typing: comparisons and
//! logical operators produce INTEGER, arithmetic widens to REAL only when
//! a REAL operand is present, a scalar subquery is always nullable because
//! it can produce zero rows, and unknown functions degrade to nullable TEXT
//! instead of failing the build.

use crate::context::ResolutionContext;
use crate::error::SemanticResult;
use crate::shape::QueryResolver;
use crate::types::ResolvedType;
use sql_typegen_ast::{BinaryOp, Expr, InOperand, Literal, SqlType, UnaryOp};
use sql_typegen_catalog::TableSet;
use sql_typegen_functions::{NullRule, TypeRule};

impl QueryResolver<'_> {
    /// Resolve an expression's type within a scope
    ///
    /// Base tables read by embedded subqueries are added to `deps`.
    pub(crate) fn resolve_expr(
        &self,
        expr: &Expr,
        ctx: &ResolutionContext<'_>,
        deps: &mut TableSet,
    ) -> SemanticResult<ResolvedType> {
        match expr {
            Expr::Literal(literal) => Ok(literal_type(literal)),
            Expr::Column(reference) => {
                let (_, column) = ctx.resolve(reference)?;
                Ok(column.ty.clone())
            }
            Expr::Call { name, args, .. } => self.resolve_call(name, args, ctx, deps),
            Expr::BinaryOp { left, op, right } => {
                let left = self.resolve_expr(left, ctx, deps)?;
                let right = self.resolve_expr(right, ctx, deps)?;
                Ok(binary_type(*op, &left, &right))
            }
            Expr::UnaryOp { op, expr } => {
                let inner = self.resolve_expr(expr, ctx, deps)?;
                Ok(match op {
                    UnaryOp::Neg => ResolvedType {
                        sql_type: Some(if inner.sql_type == Some(SqlType::Real) {
                            SqlType::Real
                        } else {
                            SqlType::Integer
                        }),
                        custom_type: None,
                        nullable: inner.nullable,
                    },
                    UnaryOp::Not => ResolvedType::integer().with_nullable(inner.nullable),
                })
            }
            Expr::Case {
                operand,
                when_clauses,
                else_clause,
            } => {
                if let Some(operand) = operand {
                    self.resolve_expr(operand, ctx, deps)?;
                }
                let mut merged: Option<ResolvedType> = None;
                for clause in when_clauses {
                    self.resolve_expr(&clause.condition, ctx, deps)?;
                    let ty = self.resolve_expr(&clause.result, ctx, deps)?;
                    merged = Some(match merged {
                        Some(merged) => merged.merge(&ty),
                        None => ty,
                    });
                }
                let merged = merged.unwrap_or_else(ResolvedType::unknown);
                Ok(match else_clause {
                    Some(else_clause) => {
                        let ty = self.resolve_expr(else_clause, ctx, deps)?;
                        merged.merge(&ty)
                    }
                    // A missing ELSE produces NULL when no arm matches
                    None => merged.forced_nullable(),
                })
            }
            Expr::Cast { expr, as_type } => {
                let inner = self.resolve_expr(expr, ctx, deps)?;
                let sql_type = SqlType::from_keyword(&as_type.type_name).unwrap_or(SqlType::Text);
                Ok(ResolvedType {
                    sql_type: Some(sql_type),
                    custom_type: as_type.custom_type.clone(),
                    nullable: inner.nullable,
                })
            }
            Expr::Subquery(select) => {
                let shape = self.resolve_select_in(select, Some(ctx))?;
                deps.extend(shape.dependent_tables.iter().cloned());
                // Zero rows read as NULL
                Ok(shape
                    .result_columns
                    .first()
                    .map(|c| c.ty.clone().forced_nullable())
                    .unwrap_or_else(ResolvedType::unknown))
            }
            Expr::In { expr, operand, .. } => {
                self.resolve_expr(expr, ctx, deps)?;
                match operand {
                    InOperand::List(items) => {
                        for item in items {
                            self.resolve_expr(item, ctx, deps)?;
                        }
                    }
                    InOperand::Placeholder(_) => {}
                    InOperand::Subquery(select) => {
                        let shape = self.resolve_select_in(select, Some(ctx))?;
                        deps.extend(shape.dependent_tables.iter().cloned());
                    }
                }
                Ok(ResolvedType::integer())
            }
            Expr::Placeholder(_) => Ok(ResolvedType::unknown()),
            // Bare `*` only appears inside count(*)
            Expr::Wildcard(_) => Ok(ResolvedType::integer()),
            Expr::Paren(inner) => self.resolve_expr(inner, ctx, deps),
        }
    }

    fn resolve_call(
        &self,
        name: &str,
        args: &[Expr],
        ctx: &ResolutionContext<'_>,
        deps: &mut TableSet,
    ) -> SemanticResult<ResolvedType> {
        let mut arg_types = Vec::with_capacity(args.len());
        for arg in args {
            arg_types.push(self.resolve_expr(arg, ctx, deps)?);
        }

        let Some(signature) = self.functions().lookup(name, args.len()) else {
            // Unknown functions degrade instead of failing the build
            return Ok(ResolvedType::text().forced_nullable());
        };

        let (sql_type, custom_type) = match signature.result {
            TypeRule::Fixed(sql_type) => (Some(sql_type), None),
            TypeRule::Argument(index) => arg_types
                .get(index)
                .map(|ty| (ty.sql_type, ty.custom_type.clone()))
                .unwrap_or((None, None)),
            TypeRule::CommonOfArgs => {
                let merged = arg_types
                    .iter()
                    .fold(ResolvedType::unknown(), |acc, ty| acc.merge(ty));
                (merged.sql_type, merged.custom_type)
            }
        };

        let nullable = match signature.nullability {
            NullRule::NeverNull => false,
            NullRule::AlwaysNullable => true,
            NullRule::AnyArgNonNull => arg_types.iter().all(|ty| ty.nullable),
            NullRule::AnyArgNullable => arg_types.iter().any(|ty| ty.nullable),
        };

        Ok(ResolvedType {
            sql_type,
            custom_type,
            nullable,
        })
    }
}

fn literal_type(literal: &Literal) -> ResolvedType {
    match literal {
        Literal::Null => ResolvedType::unknown(),
        Literal::Integer(_) | Literal::Boolean(_) => ResolvedType::integer(),
        Literal::Real(_) => ResolvedType::real(),
        Literal::String(_) => ResolvedType::text(),
        Literal::Blob(_) => ResolvedType::blob(),
    }
}

fn binary_type(op: BinaryOp, left: &ResolvedType, right: &ResolvedType) -> ResolvedType {
    let nullable = left.nullable || right.nullable;
    match op {
        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => {
            let widened = if left.sql_type == Some(SqlType::Real)
                || right.sql_type == Some(SqlType::Real)
            {
                SqlType::Real
            } else {
                SqlType::Integer
            };
            ResolvedType::new(widened).with_nullable(nullable)
        }
        BinaryOp::Concat => ResolvedType::text().with_nullable(nullable),
        // Comparisons, logical and pattern operators read back as 0/1
        BinaryOp::Eq
        | BinaryOp::NotEq
        | BinaryOp::Lt
        | BinaryOp::LtEq
        | BinaryOp::Gt
        | BinaryOp::GtEq
        | BinaryOp::And
        | BinaryOp::Or
        | BinaryOp::Like
        | BinaryOp::Glob
        | BinaryOp::Is
        | BinaryOp::IsNot => ResolvedType::integer(),
    }
}
