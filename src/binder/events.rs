//! Binder lifecycle events

use super::traits::PageRef;
use super::types::BookMetadata;

/// Events emitted by a binder while it unpacks a book
///
/// The orchestrator observes these to update its own state, then re-emits
/// its own event stream; binder events are never forwarded verbatim to
/// book subscribers.
#[derive(Debug, Clone)]
pub enum BinderEvent {
    /// The binder finished everything it will ever extract
    BindingComplete,
    /// A metadata record was recovered from the container
    MetadataExtracted { metadata: BookMetadata },
    /// One page finished extraction
    PageExtracted { page: PageRef, index: usize },
    /// Extraction progress, with an optional revised page total
    Progress {
        total_pages: Option<usize>,
        message: Option<String>,
    },
}
