// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Source positions
//!
//! Every node handed to the compiler carries the position it was parsed at,
//! so build errors can point back into the `.sq` source file.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A 1-based source position (line and column)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub line: u32,
    pub column: u32,
}

impl Span {
    /// Create a new span
    ///
    /// # Arguments
    ///
    /// * `line` - 1-based line number
    /// * `column` - 1-based column number
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl Default for Span {
    fn default() -> Self {
        Self { line: 1, column: 1 }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_display() {
        let span = Span::new(12, 3);
        assert_eq!(span.to_string(), "line 12, column 3");
    }

    #[test]
    fn test_span_default_is_one_based() {
        let span = Span::default();
        assert_eq!(span.line, 1);
        assert_eq!(span.column, 1);
    }
}
