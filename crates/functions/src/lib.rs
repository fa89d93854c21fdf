// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # sql-typegen - Builtin function signatures
//!
//! This crate carries the fixed per-function result-type and nullability
//! rules the expression resolver applies to SQLite builtins, exposed through
//! a case-insensitive, arity-aware [`FunctionRegistry`].

pub mod builtin;
pub mod registry;
pub mod signature;

// Re-export commonly used types
pub use registry::FunctionRegistry;
pub use signature::{FunctionKind, FunctionSignature, NullRule, TypeRule};
