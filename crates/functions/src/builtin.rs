// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Builtin SQLite functions
//!
//! Result-type and nullability rules for the SQLite builtins the resolver
//! recognizes. The nullability column mirrors SQLite semantics:
//!
//! - `count`/`total`/`changes`/`last_insert_rowid`/`random` never return NULL
//! - `sum`/`avg`/`min`/`max`/`group_concat` may see zero rows, so they do
//! - `coalesce`/`ifnull` are non-null as soon as one argument provably is
//! - `nullif` can always return NULL
//! - one-argument `min`/`max` are aggregates; two or more arguments select
//!   SQLite's scalar form, typed from the arguments
//!
//! Functions not listed here resolve as nullable TEXT.

use crate::signature::{FunctionKind, FunctionSignature, NullRule, TypeRule};
use sql_typegen_ast::SqlType;

fn aggregate(name: &str, result: TypeRule, nullability: NullRule) -> FunctionSignature {
    FunctionSignature::new(name, FunctionKind::Aggregate, result, nullability)
}

fn scalar(name: &str, result: TypeRule, nullability: NullRule) -> FunctionSignature {
    FunctionSignature::new(name, FunctionKind::Scalar, result, nullability)
}

/// All builtin function signatures
pub fn all_functions() -> Vec<FunctionSignature> {
    vec![
        // Aggregates
        aggregate(
            "count",
            TypeRule::Fixed(SqlType::Integer),
            NullRule::NeverNull,
        ),
        aggregate("total", TypeRule::Fixed(SqlType::Real), NullRule::NeverNull),
        aggregate("sum", TypeRule::Argument(0), NullRule::AlwaysNullable),
        aggregate(
            "avg",
            TypeRule::Fixed(SqlType::Real),
            NullRule::AlwaysNullable,
        ),
        aggregate("min", TypeRule::Argument(0), NullRule::AlwaysNullable)
            .with_arity(1, Some(1)),
        aggregate("max", TypeRule::Argument(0), NullRule::AlwaysNullable)
            .with_arity(1, Some(1)),
        aggregate(
            "group_concat",
            TypeRule::Fixed(SqlType::Text),
            NullRule::AlwaysNullable,
        ),
        // Scalar forms of min/max (two or more arguments)
        scalar("min", TypeRule::CommonOfArgs, NullRule::AnyArgNullable).with_arity(2, None),
        scalar("max", TypeRule::CommonOfArgs, NullRule::AnyArgNullable).with_arity(2, None),
        // Null handling
        scalar("coalesce", TypeRule::CommonOfArgs, NullRule::AnyArgNonNull),
        scalar("ifnull", TypeRule::CommonOfArgs, NullRule::AnyArgNonNull).with_arity(2, Some(2)),
        scalar("nullif", TypeRule::Argument(0), NullRule::AlwaysNullable).with_arity(2, Some(2)),
        // Statement environment
        scalar(
            "changes",
            TypeRule::Fixed(SqlType::Integer),
            NullRule::NeverNull,
        ),
        scalar(
            "total_changes",
            TypeRule::Fixed(SqlType::Integer),
            NullRule::NeverNull,
        ),
        scalar(
            "last_insert_rowid",
            TypeRule::Fixed(SqlType::Integer),
            NullRule::NeverNull,
        ),
        scalar(
            "random",
            TypeRule::Fixed(SqlType::Integer),
            NullRule::NeverNull,
        ),
        scalar(
            "randomblob",
            TypeRule::Fixed(SqlType::Blob),
            NullRule::NeverNull,
        ),
        scalar(
            "zeroblob",
            TypeRule::Fixed(SqlType::Blob),
            NullRule::NeverNull,
        ),
        // Numeric scalars
        scalar("abs", TypeRule::Argument(0), NullRule::AnyArgNullable),
        scalar(
            "round",
            TypeRule::Fixed(SqlType::Real),
            NullRule::AnyArgNullable,
        ),
        scalar(
            "length",
            TypeRule::Fixed(SqlType::Integer),
            NullRule::AnyArgNullable,
        ),
        scalar(
            "instr",
            TypeRule::Fixed(SqlType::Integer),
            NullRule::AnyArgNullable,
        ),
        scalar(
            "unicode",
            TypeRule::Fixed(SqlType::Integer),
            NullRule::AnyArgNullable,
        ),
        scalar("likely", TypeRule::Argument(0), NullRule::AnyArgNullable),
        scalar("unlikely", TypeRule::Argument(0), NullRule::AnyArgNullable),
        scalar("likelihood", TypeRule::Argument(0), NullRule::AnyArgNullable),
        // Boolean-producing scalars
        scalar(
            "like",
            TypeRule::Fixed(SqlType::Integer),
            NullRule::NeverNull,
        ),
        scalar(
            "glob",
            TypeRule::Fixed(SqlType::Integer),
            NullRule::NeverNull,
        ),
        // Text scalars
        scalar(
            "upper",
            TypeRule::Fixed(SqlType::Text),
            NullRule::AnyArgNullable,
        ),
        scalar(
            "lower",
            TypeRule::Fixed(SqlType::Text),
            NullRule::AnyArgNullable,
        ),
        scalar(
            "trim",
            TypeRule::Fixed(SqlType::Text),
            NullRule::AnyArgNullable,
        ),
        scalar(
            "ltrim",
            TypeRule::Fixed(SqlType::Text),
            NullRule::AnyArgNullable,
        ),
        scalar(
            "rtrim",
            TypeRule::Fixed(SqlType::Text),
            NullRule::AnyArgNullable,
        ),
        scalar(
            "substr",
            TypeRule::Fixed(SqlType::Text),
            NullRule::AnyArgNullable,
        ),
        scalar(
            "replace",
            TypeRule::Fixed(SqlType::Text),
            NullRule::AnyArgNullable,
        ),
        scalar(
            "char",
            TypeRule::Fixed(SqlType::Text),
            NullRule::NeverNull,
        ),
        scalar("hex", TypeRule::Fixed(SqlType::Text), NullRule::NeverNull),
        scalar("quote", TypeRule::Fixed(SqlType::Text), NullRule::NeverNull),
        scalar("typeof", TypeRule::Fixed(SqlType::Text), NullRule::NeverNull),
        scalar(
            "printf",
            TypeRule::Fixed(SqlType::Text),
            NullRule::AnyArgNullable,
        ),
        // Date/time scalars return NULL on unparseable input
        scalar(
            "date",
            TypeRule::Fixed(SqlType::Text),
            NullRule::AlwaysNullable,
        ),
        scalar(
            "time",
            TypeRule::Fixed(SqlType::Text),
            NullRule::AlwaysNullable,
        ),
        scalar(
            "datetime",
            TypeRule::Fixed(SqlType::Text),
            NullRule::AlwaysNullable,
        ),
        scalar(
            "strftime",
            TypeRule::Fixed(SqlType::Text),
            NullRule::AlwaysNullable,
        ),
        scalar(
            "julianday",
            TypeRule::Fixed(SqlType::Real),
            NullRule::AlwaysNullable,
        ),
    ]
}
