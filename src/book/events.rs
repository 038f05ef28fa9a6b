//! Re-sourced book events

use crate::binder::PageRef;

/// Events a book emits to its subscribers
///
/// These are re-sourced: binder events mutate book state first, then are
/// re-emitted here under the book's own identity. Loading and binding are
/// two independently observable milestones — `BindingComplete` may arrive
/// before or after `LoadingComplete`.
#[derive(Debug, Clone)]
pub enum BookEvent {
    /// A load strategy began; no byte has been accumulated yet
    LoadingStarted,
    /// Extraction progress
    Progress {
        total_pages: usize,
        message: Option<String>,
    },
    /// A page was extracted and appended
    PageExtracted { page: PageRef, index: usize },
    /// Every source byte has been consumed and fed
    LoadingComplete,
    /// The binder finished extraction
    BindingComplete,
}
