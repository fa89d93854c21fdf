// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

use crate::builtin;
use crate::signature::FunctionSignature;
use std::collections::HashMap;

/// Registry of builtin SQLite function signatures
///
/// Lookup is case-insensitive and arity-aware: `min(x)` resolves to the
/// aggregate form, `min(x, y)` to the scalar form.
#[derive(Debug, Clone)]
pub struct FunctionRegistry {
    /// Signatures keyed by lowercase name
    functions: HashMap<String, Vec<FunctionSignature>>,
}

impl FunctionRegistry {
    /// Create a new registry with all builtin functions loaded
    pub fn new() -> Self {
        let mut functions: HashMap<String, Vec<FunctionSignature>> = HashMap::new();
        for signature in builtin::all_functions() {
            functions
                .entry(signature.name.to_ascii_lowercase())
                .or_default()
                .push(signature);
        }
        Self { functions }
    }

    /// Lookup a signature by name and argument count
    ///
    /// # Arguments
    ///
    /// * `name` - Function name (case-insensitive)
    /// * `arg_count` - Number of arguments at the call site
    ///
    /// # Returns
    ///
    /// `Some(&FunctionSignature)` whose arity range covers `arg_count`,
    /// `None` for unknown functions or an arity no signature accepts
    pub fn lookup(&self, name: &str, arg_count: usize) -> Option<&FunctionSignature> {
        self.functions
            .get(&name.to_ascii_lowercase())?
            .iter()
            .find(|signature| signature.accepts_arity(arg_count))
    }

    /// Check whether any signature exists under the given name
    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(&name.to_ascii_lowercase())
    }

    /// Total number of registered signatures
    pub fn signature_count(&self) -> usize {
        self.functions.values().map(Vec::len).sum()
    }
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
