//! Decoding engine context
//!
//! Binder implementations share one explicitly constructed engine handle
//! instead of a lazily initialized process-wide global. The handle is
//! created once by the caller that owns the factories, passed to them,
//! and torn down with [`BinderContext::shutdown`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::error::{BinderError, Result};

/// Tuning options for the decoding engine
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Upper bound on a single extracted page payload, in bytes
    pub max_page_bytes: usize,
    /// How many pages a binder may decode concurrently
    pub decode_concurrency: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            max_page_bytes: 64 * 1024 * 1024,
            decode_concurrency: 2,
        }
    }
}

/// Explicit decoding engine handle passed to binder factories
#[derive(Debug)]
pub struct BinderContext {
    options: EngineOptions,
    closed: AtomicBool,
}

impl BinderContext {
    /// Initialize the engine context
    pub fn initialize(options: EngineOptions) -> Arc<Self> {
        tracing::debug!(
            max_page_bytes = options.max_page_bytes,
            decode_concurrency = options.decode_concurrency,
            "Initialized binder context"
        );
        Arc::new(Self {
            options,
            closed: AtomicBool::new(false),
        })
    }

    /// Engine tuning options
    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Whether the context has been torn down
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Fail once the context has been torn down
    ///
    /// Factories call this before creating a binder.
    pub fn ensure_open(&self) -> Result<()> {
        if self.is_closed() {
            return Err(BinderError::ContextClosed);
        }
        Ok(())
    }

    /// Tear the engine down
    ///
    /// One-way: binder creation must be refused afterwards.
    pub fn shutdown(&self) {
        if !self.closed.swap(true, Ordering::AcqRel) {
            tracing::info!("Binder context shut down");
        }
    }
}
