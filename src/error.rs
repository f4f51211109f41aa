//! Error types for the expression engine.
//!
//! Verification and execution fail in disjoint ways: a [`VerificationError`]
//! rejects a pipeline configuration before any document is seen, an
//! [`ExecutionError`] fails one document's stage. Null values are neither.

use thiserror::Error;

use crate::ast::ArithmeticOperator;
use crate::types::DataType;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Static type errors raised by the verification pass.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum VerificationError {
    #[error("Operands of '{op}' require conflicting input types, {left} vs {right}")]
    ConflictingInputTypes {
        left: DataType,
        op: ArithmeticOperator,
        right: DataType,
    },

    #[error("Attempting to perform unsupported arithmetic: [{left}] {op} [{right}]")]
    UnsupportedArithmetic {
        left: DataType,
        op: ArithmeticOperator,
        right: DataType,
    },

    #[error("Attempting to perform arithmetic on a null value in '{0}'")]
    NullArithmetic(String),

    #[error("Expected {expected} input, but no input is specified")]
    MissingInput { expected: DataType },

    #[error("Expected {expected} input, got {actual}")]
    InputTypeMismatch { expected: DataType, actual: DataType },

    #[error("Expected {expected} output, got {actual}")]
    OutputTypeMismatch { expected: DataType, actual: DataType },

    #[error("Input field '{0}' not found")]
    UnknownField(String),

    #[error("'{expression}' does not accept {actual} input")]
    UnsupportedInput { expression: String, actual: DataType },
}

/// Runtime failures of a single document's execution pass.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExecutionError {
    #[error("Unsupported operation: [{left}] {op} [{right}]")]
    UnsupportedArithmetic {
        left: DataType,
        op: ArithmeticOperator,
        right: DataType,
    },

    #[error("Division by zero in '{0}'")]
    DivisionByZero(String),

    #[error("Cannot perform exact arithmetic on non-finite value {0}")]
    NonFiniteOperand(String),

    #[error("Expected {expected} input, got {actual}")]
    InputTypeMismatch { expected: DataType, actual: DataType },

    #[error("Cannot convert {value} to {target}")]
    InvalidConversion { value: String, target: DataType },

    #[error("Cannot add {actual} element to Array<{expected}>")]
    ArrayElementMismatch { expected: DataType, actual: DataType },

    #[error("Invalid document: {0}")]
    InvalidDocument(String),
}

/// Umbrella error for operations that may fail either way, such as tree
/// conversion which re-validates rebuilt nodes.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Verification error: {0}")]
    Verification(#[from] VerificationError),

    #[error("Execution error: {0}")]
    Execution(#[from] ExecutionError),

    #[error("Converter has no rule for {variant} expression '{expression}'")]
    UnsupportedConversion {
        variant: &'static str,
        expression: String,
    },
}
