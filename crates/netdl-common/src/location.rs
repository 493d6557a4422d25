//! Text locations attached to expressions, values and errors.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Span;

/// Where an expression came from in the configuration source.
///
/// Lines and columns are 1-based as reported by the parser. A location with
/// line 0 is `Location::NONE`: the producer of a value or error did not know
/// where it came from, and error reporting substitutes the nearest enclosing
/// expression's location.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Location {
    #[serde(default)]
    pub span: Span,
    pub line: u32,
    pub column: u32,
}

impl Location {
    pub const NONE: Location = Location {
        span: Span::DUMMY,
        line: 0,
        column: 0,
    };

    pub fn new(span: Span, line: u32, column: u32) -> Self {
        Self { span, line, column }
    }

    /// A location known only by line and column.
    pub fn at(line: u32, column: u32) -> Self {
        Self {
            span: Span::DUMMY,
            line,
            column,
        }
    }

    pub fn is_none(&self) -> bool {
        self.line == 0
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            write!(f, "<unknown>")
        } else {
            write!(f, "{}:{}", self.line, self.column)
        }
    }
}

impl fmt::Debug for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Location({self} @ {:?})", self.span)
    }
}
