//! Binder error types

use thiserror::Error;

/// Errors surfaced by binder implementations
#[derive(Debug, Error)]
pub enum BinderError {
    /// Binder construction failed
    #[error("Binder creation failed: {0}")]
    Creation(String),

    /// The binder's internal pipeline could not be started
    #[error("Binder start failed: {0}")]
    Start(String),

    /// The decoding engine context was already torn down
    #[error("Binder context is closed")]
    ContextClosed,
}

/// Result type alias for binder operations
pub type Result<T> = std::result::Result<T, BinderError>;
