//! Binder traits
//!
//! Surface of the external decoding engine consumed by the orchestrator.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::error::Result;
use super::events::BinderEvent;
use super::types::BookKind;

/// One extracted unit of book content
///
/// Pages are created and owned by the binder; the orchestrator holds
/// shared references in arrival order and never mutates them.
pub trait Page: fmt::Debug + Send + Sync {
    /// MIME type of the page payload
    fn mime_type(&self) -> &str;

    /// Raw page payload
    fn bytes(&self) -> &[u8];
}

/// Shared reference to a binder-owned page
pub type PageRef = Arc<dyn Page>;

/// Decoding/extraction engine for one book
///
/// Created once per book by a [`BinderFactory`], fed chunks by the
/// orchestrator, and reporting back through its event stream.
#[async_trait]
pub trait Binder: Send + Sync {
    /// Kind of book this binder is unpacking
    fn book_type(&self) -> BookKind;

    /// MIME type of the underlying container
    fn mime_type(&self) -> &str;

    /// Fraction of the expected bytes fed so far, in `[0.0, 1.0]`
    fn loading_percentage(&self) -> f64;

    /// Fraction of the container unarchived so far, in `[0.0, 1.0]`
    fn unarchiving_percentage(&self) -> f64;

    /// Fraction of extracted pages laid out so far, in `[0.0, 1.0]`
    fn layout_percentage(&self) -> f64;

    /// Feed one additional chunk
    ///
    /// Implementations must process chunks in the order received, after
    /// the initial bytes passed at creation.
    async fn append_bytes(&self, chunk: &[u8]);

    /// Hand out the binder's event stream
    ///
    /// Called exactly once, before `start`.
    fn subscribe(&self) -> mpsc::UnboundedReceiver<BinderEvent>;

    /// Bring the internal extraction pipeline live
    ///
    /// Resolving does not mean extraction finished; completion is
    /// reported via [`BinderEvent::BindingComplete`].
    async fn start(&self) -> Result<()>;
}

/// Factory that asynchronously constructs binders
#[async_trait]
pub trait BinderFactory: Send + Sync {
    /// Create a binder for a book
    ///
    /// `expected_size` is the total size in bytes when known, `-1`
    /// otherwise. `initial_bytes` is the first chunk observed from the
    /// source; the factory must treat it as read-only.
    async fn create_binder(
        &self,
        name: &str,
        initial_bytes: &[u8],
        expected_size: i64,
    ) -> Result<Arc<dyn Binder>>;
}
