//! Error codes for netdl diagnostics.

/// Error codes for categorizing diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Input errors (E0100 - E0199)
    UnreadableInput,
    MalformedTree,

    // Eval errors (E0300 - E0399)
    UnknownIdentifier,
    TypeMismatch,
    InvalidOperandTypes,
    UnknownType,
    ArityMismatch,
    CyclicEvaluation,
    UserRaised,
    IndexOutOfBounds,
    InvalidArgument,
    RecursionLimit,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            // Input
            ErrorCode::UnreadableInput => "E0100",
            ErrorCode::MalformedTree => "E0101",

            // Eval
            ErrorCode::UnknownIdentifier => "E0300",
            ErrorCode::TypeMismatch => "E0301",
            ErrorCode::InvalidOperandTypes => "E0302",
            ErrorCode::UnknownType => "E0303",
            ErrorCode::ArityMismatch => "E0304",
            ErrorCode::CyclicEvaluation => "E0305",
            ErrorCode::UserRaised => "E0306",
            ErrorCode::IndexOutOfBounds => "E0307",
            ErrorCode::InvalidArgument => "E0308",
            ErrorCode::RecursionLimit => "E0309",
        }
    }

    /// Get a human-readable description of the error.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::UnreadableInput => "expression tree could not be read",
            ErrorCode::MalformedTree => "expression tree is malformed",

            ErrorCode::UnknownIdentifier => "cannot find identifier in this scope",
            ErrorCode::TypeMismatch => "value has the wrong type",
            ErrorCode::InvalidOperandTypes => "operator cannot be applied to these operand types",
            ErrorCode::UnknownType => "unknown runtime type in `new` expression",
            ErrorCode::ArityMismatch => "wrong number of positional arguments",
            ErrorCode::CyclicEvaluation => "value depends on itself",
            ErrorCode::UserRaised => "configuration raised an error",
            ErrorCode::IndexOutOfBounds => "array index out of bounds",
            ErrorCode::InvalidArgument => "runtime object rejected an argument",
            ErrorCode::RecursionLimit => "evaluation nested too deeply",
        }
    }

    /// Get a suggested fix for the error, if available.
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            ErrorCode::UnknownIdentifier => {
                Some("check the spelling or ensure the name is defined in an enclosing record")
            }
            ErrorCode::UnknownType => {
                Some("only registered runtime types can be instantiated with `new`")
            }
            ErrorCode::ArityMismatch => {
                Some("check the function definition for the expected parameters")
            }
            ErrorCode::CyclicEvaluation => Some(
                "break the cycle with a delayed runtime object, or restructure the definitions",
            ),
            _ => None,
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eval_codes_are_in_eval_range() {
        for code in [
            ErrorCode::UnknownIdentifier,
            ErrorCode::CyclicEvaluation,
            ErrorCode::RecursionLimit,
        ] {
            assert!(code.as_str().starts_with("E03"));
        }
    }

    #[test]
    fn test_suggestion() {
        assert!(ErrorCode::CyclicEvaluation.suggestion().is_some());
        assert!(ErrorCode::TypeMismatch.suggestion().is_none());
    }
}
