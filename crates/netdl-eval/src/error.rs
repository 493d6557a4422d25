//! Evaluation errors and the location trail they collect while unwinding.

use netdl_common::Location;
use netdl_diagnostic::{Diagnostic, DiagnosticKind, ErrorCode, Label};
use thiserror::Error;

/// What went wrong.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalErrorKind {
    #[error("unknown identifier {0}")]
    UnknownIdentifier(String),

    #[error("expected expression of type {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: String,
    },

    #[error("operator {op} cannot be applied to operands of type {left} and {right}")]
    InvalidOperandTypes {
        op: String,
        left: String,
        right: String,
    },

    #[error("unknown runtime type {0}")]
    UnknownType(String),

    #[error("function expects {expected} positional arguments, but {given} were given")]
    ArityMismatch { expected: usize, given: usize },

    #[error("cyclic reference: {0} depends on its own value")]
    CyclicEvaluation(String),

    #[error("{0}")]
    UserRaised(String),

    #[error("index {index} out of bounds {first}..{last}")]
    IndexOutOfBounds { index: i64, first: i64, last: i64 },

    #[error("{0}")]
    InvalidArgument(String),

    #[error("evaluation nested deeper than {0} levels")]
    RecursionLimit(usize),
}

impl EvalErrorKind {
    pub fn code(&self) -> ErrorCode {
        match self {
            EvalErrorKind::UnknownIdentifier(_) => ErrorCode::UnknownIdentifier,
            EvalErrorKind::TypeMismatch { .. } => ErrorCode::TypeMismatch,
            EvalErrorKind::InvalidOperandTypes { .. } => ErrorCode::InvalidOperandTypes,
            EvalErrorKind::UnknownType(_) => ErrorCode::UnknownType,
            EvalErrorKind::ArityMismatch { .. } => ErrorCode::ArityMismatch,
            EvalErrorKind::CyclicEvaluation(_) => ErrorCode::CyclicEvaluation,
            EvalErrorKind::UserRaised(_) => ErrorCode::UserRaised,
            EvalErrorKind::IndexOutOfBounds { .. } => ErrorCode::IndexOutOfBounds,
            EvalErrorKind::InvalidArgument(_) => ErrorCode::InvalidArgument,
            EvalErrorKind::RecursionLimit(_) => ErrorCode::RecursionLimit,
        }
    }
}

/// An evaluation error with the location it was raised at and the locations
/// of every enclosing expression it unwound through, innermost first.
#[derive(Debug, Clone, Error)]
#[error("{kind}")]
pub struct EvalError {
    pub kind: EvalErrorKind,
    pub location: Location,
    pub trail: Vec<Location>,
}

impl EvalError {
    pub fn new(kind: EvalErrorKind, location: Location) -> Self {
        Self {
            kind,
            location,
            trail: Vec::new(),
        }
    }

    pub fn unknown_identifier(id: &str, location: Location) -> Self {
        Self::new(EvalErrorKind::UnknownIdentifier(id.to_string()), location)
    }

    pub fn type_mismatch(
        expected: &'static str,
        found: impl Into<String>,
        location: Location,
    ) -> Self {
        Self::new(
            EvalErrorKind::TypeMismatch {
                expected,
                found: found.into(),
            },
            location,
        )
    }

    pub fn invalid_argument(message: impl Into<String>, location: Location) -> Self {
        Self::new(EvalErrorKind::InvalidArgument(message.into()), location)
    }

    /// Record that the error passed through an expression at `location`.
    ///
    /// An error raised without a location adopts the first one it meets.
    /// Unknown locations and immediate repeats are not added to the trail.
    pub fn at(mut self, location: Location) -> Self {
        if location.is_none() {
            return self;
        }
        if self.location.is_none() {
            self.location = location;
            return self;
        }
        let last = self.trail.last().copied().unwrap_or(self.location);
        if last != location {
            self.trail.push(location);
        }
        self
    }

    /// The primary location followed by the trail.
    pub fn locations(&self) -> impl Iterator<Item = Location> + '_ {
        std::iter::once(self.location)
            .chain(self.trail.iter().copied())
            .filter(|loc| !loc.is_none())
    }

    pub fn code(&self) -> ErrorCode {
        self.kind.code()
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let kind = match self.kind {
            EvalErrorKind::UserRaised(_) | EvalErrorKind::InvalidArgument(_) => {
                DiagnosticKind::Runtime
            }
            _ => DiagnosticKind::Eval,
        };
        let mut diag =
            Diagnostic::error(kind, self.location, self.kind.to_string()).with_code(self.code());
        for location in &self.trail {
            diag = diag.with_label(Label::new(*location, "while evaluating this"));
        }
        diag
    }
}
