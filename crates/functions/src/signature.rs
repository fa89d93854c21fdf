// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Function signatures
//!
//! A [`FunctionSignature`] records how a builtin function's result type and
//! nullability follow from its arguments. The rules are declarative; the
//! expression resolver interprets them against resolved argument types, so
//! this crate stays free of resolution logic.

use serde::{Deserialize, Serialize};
use sql_typegen_ast::SqlType;

/// Function classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FunctionKind {
    Scalar,
    Aggregate,
}

/// How the result type follows from the arguments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeRule {
    /// Always the given storage class
    Fixed(SqlType),
    /// The type of the n-th argument (0-based)
    Argument(usize),
    /// The merged common type of all arguments
    CommonOfArgs,
}

/// How nullability follows from the arguments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NullRule {
    /// Never NULL regardless of inputs (e.g. `count`)
    NeverNull,
    /// May always be NULL (e.g. aggregates over zero rows)
    AlwaysNullable,
    /// Non-null if at least one argument is provably non-null (`coalesce`)
    AnyArgNonNull,
    /// Nullable if at least one argument is nullable (plain scalars)
    AnyArgNullable,
}

/// Signature of one builtin function at one arity range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionSignature {
    /// Function name (matched case-insensitively)
    pub name: String,
    pub kind: FunctionKind,
    pub result: TypeRule,
    pub nullability: NullRule,
    /// Minimum argument count this signature applies to
    pub min_args: usize,
    /// Maximum argument count, `None` for variadic
    pub max_args: Option<usize>,
}

impl FunctionSignature {
    pub fn new(
        name: impl Into<String>,
        kind: FunctionKind,
        result: TypeRule,
        nullability: NullRule,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            result,
            nullability,
            min_args: 0,
            max_args: None,
        }
    }

    /// Builder method: restrict the arity range
    pub fn with_arity(mut self, min_args: usize, max_args: Option<usize>) -> Self {
        self.min_args = min_args;
        self.max_args = max_args;
        self
    }

    /// Whether this signature applies at the given argument count
    pub fn accepts_arity(&self, arg_count: usize) -> bool {
        arg_count >= self.min_args && self.max_args.is_none_or(|max| arg_count <= max)
    }

    pub fn is_aggregate(&self) -> bool {
        self.kind == FunctionKind::Aggregate
    }
}
