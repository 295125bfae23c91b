//! Error types for query compilation

use thiserror::Error;

/// Errors raised while rewriting a query before it is compiled
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransformError {
    /// A variable placeholder has no value in the query bindings
    #[error("Variable {name} not bound")]
    UnboundVariable { name: String },
}

/// Errors raised while lowering a query to SPARQL text
///
/// Any error aborts the whole compilation; no partial query text is produced.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// An expression or value shape the compiler cannot lower
    #[error("Unsupported expression: {message}")]
    UnsupportedExpression { message: String },

    /// Pre-compilation transform failed
    #[error(transparent)]
    Transform(#[from] TransformError),
}

impl CompileError {
    pub(crate) fn unsupported(message: impl Into<String>) -> Self {
        Self::UnsupportedExpression {
            message: message.into(),
        }
    }
}

/// Result type for query compilation
pub type CompileResult<T> = Result<T, CompileError>;
