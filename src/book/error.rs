//! Book orchestrator error types

use thiserror::Error;

use super::types::SourceKind;

/// Unified error type for book loading and binding
#[derive(Debug, Error)]
pub enum BookError {
    /// A one-time state transition was attempted twice
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// The binding pipeline was invoked twice for the same book
    #[error("Binding already started")]
    DoubleBind,

    /// A strategy loader was invoked on a book configured with a
    /// different source kind
    #[error("Source mismatch: loader expects {expected}, book was built from {actual}")]
    SourceMismatch {
        expected: SourceKind,
        actual: SourceKind,
    },

    /// A binder-delegating query was made before the binder exists
    #[error("Book is not bound yet")]
    NotBound,

    /// Network transport failure, surfaced verbatim
    #[error("Transport error: {0}")]
    Transport(String),

    /// Local file failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Push-producer failure, surfaced verbatim
    #[error("Producer error: {0}")]
    Producer(String),

    /// The asynchronous binder factory (or binder start) failed
    #[error("Binder creation failed: {0}")]
    BinderCreation(String),
}

/// Result type alias for book operations
pub type Result<T> = std::result::Result<T, BookError>;
