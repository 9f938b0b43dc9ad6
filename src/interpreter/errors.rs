//! Runtime error types for the interpreter
//!
//! This module defines [`RuntimeError`], which represents all errors that can occur
//! during program execution (as opposed to translation, which never fails).
//!
//! All runtime errors are fatal - they halt the run. The executor wraps them in an
//! [`ExecutionError`](crate::executor::ExecutionError) together with the partial
//! timeline recorded up to that point.

use thiserror::Error;

/// Runtime errors that can occur during execution
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    /// Undefined variable reference
    #[error("Undefined variable '{name}' at line {line}")]
    UndefinedVariable { name: String, line: usize },

    /// Undefined function call
    #[error("Undefined function '{name}' at line {line}")]
    UndefinedFunction { name: String, line: usize },

    /// Function argument count mismatch
    #[error(
        "Function '{function}' expects {expected} argument{}, got {got} at line {line}",
        plural(.expected)
    )]
    ArgumentCountMismatch {
        function: String,
        expected: usize,
        got: usize,
        line: usize,
    },

    /// Type error
    #[error("Type error at line {line}: expected {expected}, got {got}")]
    TypeError {
        expected: String,
        got: String,
        line: usize,
    },

    /// List or string index out of bounds
    #[error("Index {index} out of bounds for size {size} at line {line}")]
    IndexOutOfBounds { index: i64, size: usize, line: usize },

    /// `back()` / `pop_back()` on an empty container
    #[error("{operation} on an empty container at line {line}")]
    EmptyContainer { operation: String, line: usize },

    /// Negative or oversized container size
    #[error("Invalid container size {size} at line {line}")]
    InvalidSize { size: i64, line: usize },

    /// Division by zero or modulo by zero
    #[error("{operation} at line {line}")]
    DivisionByZero { operation: String, line: usize },

    /// Integer overflow in arithmetic operation
    #[error("Integer overflow in operation: {operation} at line {line}")]
    IntegerOverflow { operation: String, line: usize },

    /// Invalid printf format string
    #[error("Invalid printf format at line {line}: {message}")]
    InvalidPrintfFormat { message: String, line: usize },

    /// A construct the translator could not express was reached
    #[error("Unsupported construct at line {line}: {text} ({reason})")]
    Unsupported {
        text: String,
        reason: String,
        line: usize,
    },

    /// Recursion went deeper than the configured limit
    #[error("Maximum call depth of {limit} exceeded at line {line}")]
    CallDepthExceeded { limit: usize, line: usize },

    /// The timeline grew past the configured limit
    #[error("Event limit of {limit} exceeded at line {line}")]
    EventLimitExceeded { limit: usize, line: usize },
}

fn plural(count: &usize) -> &'static str {
    if *count == 1 {
        ""
    } else {
        "s"
    }
}

impl RuntimeError {
    /// Source line the error points at
    pub fn line(&self) -> usize {
        match self {
            RuntimeError::UndefinedVariable { line, .. }
            | RuntimeError::UndefinedFunction { line, .. }
            | RuntimeError::ArgumentCountMismatch { line, .. }
            | RuntimeError::TypeError { line, .. }
            | RuntimeError::IndexOutOfBounds { line, .. }
            | RuntimeError::EmptyContainer { line, .. }
            | RuntimeError::InvalidSize { line, .. }
            | RuntimeError::DivisionByZero { line, .. }
            | RuntimeError::IntegerOverflow { line, .. }
            | RuntimeError::InvalidPrintfFormat { line, .. }
            | RuntimeError::Unsupported { line, .. }
            | RuntimeError::CallDepthExceeded { line, .. }
            | RuntimeError::EventLimitExceeded { line, .. } => *line,
        }
    }

    /// Whether the run stopped on an out-of-subset construct
    pub fn is_degradation(&self) -> bool {
        matches!(self, RuntimeError::Unsupported { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argument_count_message_pluralizes() {
        let one = RuntimeError::ArgumentCountMismatch {
            function: "f".to_string(),
            expected: 1,
            got: 2,
            line: 3,
        };
        assert_eq!(one.to_string(), "Function 'f' expects 1 argument, got 2 at line 3");

        let two = RuntimeError::ArgumentCountMismatch {
            function: "g".to_string(),
            expected: 2,
            got: 0,
            line: 7,
        };
        assert_eq!(two.to_string(), "Function 'g' expects 2 arguments, got 0 at line 7");
        assert_eq!(two.line(), 7);
    }
}
