//! Book source and state types

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::binder::{BookMetadata, PageRef};
use crate::pump::PumpSubscription;

use super::error::{BookError, Result};

/// Size value meaning "total size unknown"
pub const UNKNOWN_SIZE: i64 = -1;

/// Default timeout for network loads
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// A prepared network request
#[derive(Debug, Clone)]
pub struct NetworkRequest {
    /// Resource URI
    pub uri: String,
    /// Extra request headers
    pub headers: Vec<(String, String)>,
    /// Per-request timeout
    pub timeout: Duration,
}

impl NetworkRequest {
    /// Request for a URI with default headers and timeout
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            headers: Vec::new(),
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Add a request header
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Override the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Where a book's bytes come from
///
/// Exactly one variant is chosen at construction and never changes. The
/// non-clonable payloads (file handle, pump subscription) are taken
/// exactly once by their matching load strategy.
#[derive(Debug)]
pub enum BookSource {
    /// Entire byte sequence already in memory
    Buffer(Vec<u8>),
    /// One-shot network request
    Request(NetworkRequest),
    /// Streaming network fetch
    Uri(NetworkRequest),
    /// Local file path
    File(PathBuf),
    /// Already-open local file handle
    FileHandle(tokio::fs::File),
    /// Externally pumped chunks
    Pump(PumpSubscription),
}

impl BookSource {
    /// Discriminant of this source
    pub fn kind(&self) -> SourceKind {
        match self {
            Self::Buffer(_) => SourceKind::Buffer,
            Self::Request(_) => SourceKind::Request,
            Self::Uri(_) => SourceKind::Uri,
            Self::File(_) => SourceKind::File,
            Self::FileHandle(_) => SourceKind::FileHandle,
            Self::Pump(_) => SourceKind::Pump,
        }
    }
}

/// Source kind tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Buffer,
    Request,
    Uri,
    File,
    FileHandle,
    Pump,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Buffer => "memory buffer",
            Self::Request => "network request",
            Self::Uri => "network uri",
            Self::File => "local file",
            Self::FileHandle => "file handle",
            Self::Pump => "push producer",
        };
        f.write_str(name)
    }
}

/// Binder-reported progress fractions, all in `[0.0, 1.0]`
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BindingProgress {
    pub loading: f64,
    pub unarchiving: f64,
    pub layout: f64,
}

/// One-way load lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoadPhase {
    /// No strategy has run yet
    Unloaded,
    /// A strategy is consuming the source
    Loading,
    /// Every source byte has been accumulated and fed
    Loaded,
}

/// Mutable orchestrator state behind the book handle
///
/// All transitions are one-way; none of the latches ever reverts, even
/// when a load fails partway.
#[derive(Debug)]
pub(crate) struct BookState {
    pub phase: LoadPhase,
    pub started_binding: bool,
    pub finished_binding: bool,
    pub byte_sequence: Vec<u8>,
    pub expected_size: i64,
    pub total_page_count: usize,
    pub pages: Vec<PageRef>,
    pub metadata: BookMetadata,
}

impl BookState {
    pub fn new() -> Self {
        Self {
            phase: LoadPhase::Unloaded,
            started_binding: false,
            finished_binding: false,
            byte_sequence: Vec::new(),
            expected_size: UNKNOWN_SIZE,
            total_page_count: 0,
            pages: Vec::new(),
            metadata: BookMetadata::default(),
        }
    }

    /// The needs-loading latch, viewed through the phase machine
    pub fn needs_loading(&self) -> bool {
        self.phase == LoadPhase::Unloaded
    }

    /// Trip the needs-loading latch
    ///
    /// Fails on re-entry. The latch never resets: a load that fails later
    /// leaves the book permanently unloadable.
    pub fn begin_loading(&mut self) -> Result<()> {
        if self.phase != LoadPhase::Unloaded {
            return Err(BookError::InvalidState(
                "book does not need loading".to_string(),
            ));
        }
        self.phase = LoadPhase::Loading;
        Ok(())
    }

    pub fn finish_loading(&mut self) {
        if self.phase == LoadPhase::Loading {
            self.phase = LoadPhase::Loaded;
        }
    }

    /// Trip the started-binding latch
    pub fn begin_binding(&mut self) -> Result<()> {
        if self.started_binding {
            return Err(BookError::DoubleBind);
        }
        self.started_binding = true;
        Ok(())
    }

    pub fn finish_binding(&mut self) {
        self.finished_binding = true;
    }

    /// Refine the expected size, once, while still unknown
    pub fn refine_expected_size(&mut self, size: i64) {
        if self.expected_size == UNKNOWN_SIZE && size >= 0 {
            self.expected_size = size;
        }
    }

    /// Raise the reported page total; stale smaller reports are ignored
    pub fn report_total_pages(&mut self, total: usize) {
        if total > self.total_page_count {
            self.total_page_count = total;
        }
    }

    /// Copy-append a chunk to the byte sequence
    ///
    /// The producer may reuse or hand off the chunk's allocation after
    /// this call, so the sequence is rebuilt into a fresh allocation of
    /// `old + chunk` rather than grown in place.
    pub fn append_bytes(&mut self, chunk: &[u8]) {
        let mut next = Vec::with_capacity(self.byte_sequence.len() + chunk.len());
        next.extend_from_slice(&self.byte_sequence);
        next.extend_from_slice(chunk);
        self.byte_sequence = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_loading_trips_once() {
        let mut state = BookState::new();
        assert!(state.needs_loading());
        state.begin_loading().unwrap();
        assert!(!state.needs_loading());

        let err = state.begin_loading().unwrap_err();
        assert!(matches!(err, BookError::InvalidState(_)));
        // still loading, not reset
        assert_eq!(state.phase, LoadPhase::Loading);
    }

    #[test]
    fn test_begin_binding_trips_once() {
        let mut state = BookState::new();
        state.begin_binding().unwrap();
        assert!(matches!(state.begin_binding(), Err(BookError::DoubleBind)));
        assert!(state.started_binding);
    }

    #[test]
    fn test_expected_size_refined_at_most_once() {
        let mut state = BookState::new();
        assert_eq!(state.expected_size, UNKNOWN_SIZE);
        state.refine_expected_size(1000);
        assert_eq!(state.expected_size, 1000);
        state.refine_expected_size(2000);
        assert_eq!(state.expected_size, 1000);
    }

    #[test]
    fn test_total_pages_monotonic() {
        let mut state = BookState::new();
        state.report_total_pages(10);
        state.report_total_pages(4);
        assert_eq!(state.total_page_count, 10);
        state.report_total_pages(12);
        assert_eq!(state.total_page_count, 12);
    }

    #[test]
    fn test_append_concatenates_in_order() {
        let mut state = BookState::new();
        state.append_bytes(b"abc");
        state.append_bytes(b"");
        state.append_bytes(b"defg");
        assert_eq!(state.byte_sequence, b"abcdefg");
        assert_eq!(state.byte_sequence.len(), 7);
    }

    #[test]
    fn test_append_does_not_alias_chunk() {
        let mut state = BookState::new();
        let mut chunk = vec![1u8, 2, 3];
        state.append_bytes(&chunk);
        chunk[0] = 9;
        assert_eq!(state.byte_sequence, vec![1, 2, 3]);
    }
}
