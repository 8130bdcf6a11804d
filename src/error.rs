//! Error taxonomy for the compiler and VM.
//!
//! The teacher (`anyvm`) hand-rolls its `MemoryErr`/`InvokeErr` enums with
//! manual `Display`/`Error` impls; the rest of the retrieval pack reaches for
//! `thiserror` for exactly this shape (see `unyt-org-datex-core`'s
//! `TCPError`), so this crate follows the pack instead.

use thiserror::Error;

/// Errors raised while building the quadruple program: declaration, type,
/// arity, use-before-init, and memory-exhaustion faults.
#[derive(Debug, Error, PartialEq, Clone)]
pub enum CompileError {
    #[error("syntax error: {0}")]
    Syntax(String),

    #[error("duplicate variable '{0}'")]
    DuplicateVariable(String),

    #[error("duplicate function '{0}'")]
    DuplicateFunction(String),

    #[error("undeclared identifier '{0}'")]
    UndeclaredIdentifier(String),

    #[error("undeclared function '{0}'")]
    UndeclaredFunction(String),

    #[error("variable '{0}' used before initialization")]
    UseBeforeInit(String),

    #[error("invalid operation: {left} {op} {right}")]
    InvalidOperation {
        left: String,
        op: String,
        right: String,
    },

    #[error("condition must be bool, found {0}")]
    NonBoolCondition(String),

    #[error("cannot assign {from} to {to}")]
    AssignmentMismatch { from: String, to: String },

    #[error("wrong argument count for '{name}': expected {expected}, found {found}")]
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("argument {index} of '{name}' has type {found}, expected {expected}")]
    ArgumentTypeMismatch {
        name: String,
        index: usize,
        expected: String,
        found: String,
    },

    #[error("out of memory in {0} segment")]
    MemoryExhausted(String),
}

/// Errors raised by the virtual machine while executing a compiled program.
#[derive(Debug, Error, PartialEq, Clone)]
pub enum RuntimeError {
    #[error("division by zero")]
    DivisionByZero,

    #[error("unresolved address {0}")]
    AddressFault(i64),

    #[error("jump to out-of-range quadruple index {0}")]
    BadJumpTarget(usize),

    #[error("call to undefined function '{0}'")]
    UndefinedFunction(String),

    #[error("call stack underflow")]
    CallStackUnderflow,
}

/// Top-level error surfaced at the CLI boundary.
#[derive(Debug, Error, Clone)]
pub enum BabyDuckError {
    #[error("{0}")]
    Compile(#[from] CompileError),

    #[error("{0}")]
    Runtime(#[from] RuntimeError),
}
