//! The book orchestrator
//!
//! Bytes from every source flow through one shared pipeline: the first
//! chunk creates the binder, later chunks are appended to the book's own
//! sequence and fed to the binder strictly in arrival order. The binder's
//! events are relayed back into book state and re-emitted to subscribers.

use std::path::PathBuf;
use std::sync::{Arc, Weak};

use futures::StreamExt;
use parking_lot::{Mutex, RwLock};
use tokio::io::AsyncReadExt;
use tokio::sync::{broadcast, mpsc};

use crate::binder::{Binder, BinderEvent, BinderFactory, BookKind, BookMetadata, PageRef};
use crate::pump::{PumpEvent, PumpSubscription};

use super::error::{BookError, Result};
use super::events::BookEvent;
use super::types::{BindingProgress, BookSource, BookState, LoadPhase, NetworkRequest, SourceKind};

/// Capacity of the subscriber event channel
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// A book being progressively loaded and bound
///
/// Cheap to clone; clones share one orchestrated state. A book is built
/// from exactly one source, loaded at most once, and bound at most once.
/// A load that fails leaves the book permanently unloadable — retry means
/// constructing a new book.
#[derive(Clone)]
pub struct Book {
    inner: Arc<BookInner>,
}

struct BookInner {
    name: String,
    source_kind: SourceKind,
    /// Consumed exactly once by the matching load strategy
    source: Mutex<Option<BookSource>>,
    state: RwLock<BookState>,
    binder: RwLock<Option<Arc<dyn Binder>>>,
    factory: Arc<dyn BinderFactory>,
    events: broadcast::Sender<BookEvent>,
}

impl Book {
    /// Create a book over an explicit source
    pub fn new(
        name: impl Into<String>,
        source: BookSource,
        factory: Arc<dyn BinderFactory>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(BookInner {
                name: name.into(),
                source_kind: source.kind(),
                source: Mutex::new(Some(source)),
                state: RwLock::new(BookState::new()),
                binder: RwLock::new(None),
                factory,
                events,
            }),
        }
    }

    /// Book over an in-memory buffer
    pub fn from_buffer(
        name: impl Into<String>,
        buffer: Vec<u8>,
        factory: Arc<dyn BinderFactory>,
    ) -> Self {
        Self::new(name, BookSource::Buffer(buffer), factory)
    }

    /// Book over a one-shot network request
    pub fn from_request(
        name: impl Into<String>,
        request: NetworkRequest,
        factory: Arc<dyn BinderFactory>,
    ) -> Self {
        Self::new(name, BookSource::Request(request), factory)
    }

    /// Book over a streaming network fetch
    pub fn from_uri(
        name: impl Into<String>,
        uri: impl Into<String>,
        factory: Arc<dyn BinderFactory>,
    ) -> Self {
        Self::new(name, BookSource::Uri(NetworkRequest::new(uri)), factory)
    }

    /// Book over a local file path
    pub fn from_file(
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        factory: Arc<dyn BinderFactory>,
    ) -> Self {
        Self::new(name, BookSource::File(path.into()), factory)
    }

    /// Book over an already-open file handle
    pub fn from_file_handle(
        name: impl Into<String>,
        file: tokio::fs::File,
        factory: Arc<dyn BinderFactory>,
    ) -> Self {
        Self::new(name, BookSource::FileHandle(file), factory)
    }

    /// Book fed by an external push producer
    pub fn from_pump(
        name: impl Into<String>,
        subscription: PumpSubscription,
        factory: Arc<dyn BinderFactory>,
    ) -> Self {
        Self::new(name, BookSource::Pump(subscription), factory)
    }

    /// Declare the total size up front, when the caller knows it
    ///
    /// Ignored if a size is already known; a transport signal can refine
    /// an unknown size at most once later.
    pub fn with_expected_size(self, size: u64) -> Self {
        self.inner.state.write().refine_expected_size(size as i64);
        self
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Book name
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Kind of source this book was built from
    pub fn source_kind(&self) -> SourceKind {
        self.inner.source_kind
    }

    /// Subscribe to the book's event stream
    pub fn subscribe(&self) -> broadcast::Receiver<BookEvent> {
        self.inner.events.subscribe()
    }

    /// Whether no load strategy has run yet
    pub fn needs_loading(&self) -> bool {
        self.inner.state.read().needs_loading()
    }

    /// Whether the binding pipeline has started
    pub fn started_binding(&self) -> bool {
        self.inner.state.read().started_binding
    }

    /// Whether every source byte has been accumulated and fed
    pub fn finished_loading(&self) -> bool {
        self.inner.state.read().phase == LoadPhase::Loaded
    }

    /// Whether the binder reported extraction complete
    pub fn finished_binding(&self) -> bool {
        self.inner.state.read().finished_binding
    }

    /// Expected total size in bytes, `UNKNOWN_SIZE` when unknown
    pub fn expected_size(&self) -> i64 {
        self.inner.state.read().expected_size
    }

    /// Owned copy of the accumulated byte sequence
    ///
    /// Stable only once `finished_loading` is true.
    pub fn bytes(&self) -> Vec<u8> {
        self.inner.state.read().byte_sequence.clone()
    }

    /// Length of the accumulated byte sequence
    pub fn byte_len(&self) -> usize {
        self.inner.state.read().byte_sequence.len()
    }

    /// Number of pages: the reported total, or the extracted count when
    /// that is larger
    pub fn number_of_pages(&self) -> usize {
        let state = self.inner.state.read();
        state.total_page_count.max(state.pages.len())
    }

    /// Page at `index`, when it exists and has been extracted
    ///
    /// `None` for any out-of-range index, in every binding state.
    pub fn page(&self, index: usize) -> Option<PageRef> {
        let state = self.inner.state.read();
        if index >= state.total_page_count.max(state.pages.len()) {
            return None;
        }
        state.pages.get(index).cloned()
    }

    /// Current metadata record
    pub fn metadata(&self) -> BookMetadata {
        self.inner.state.read().metadata.clone()
    }

    /// Replace the metadata record
    ///
    /// Stores an independent deep copy: later mutation of the caller's
    /// record never reaches this book, and vice versa.
    pub fn set_metadata(&self, metadata: &BookMetadata) {
        self.inner.state.write().metadata = metadata.clone();
    }

    /// Kind of book, per the binder
    pub fn book_type(&self) -> Result<BookKind> {
        self.inner
            .binder
            .read()
            .as_ref()
            .map(|binder| binder.book_type())
            .ok_or(BookError::NotBound)
    }

    /// MIME type of the container, per the binder
    pub fn mime_type(&self) -> Result<String> {
        self.inner
            .binder
            .read()
            .as_ref()
            .map(|binder| binder.mime_type().to_string())
            .ok_or(BookError::NotBound)
    }

    /// Fraction of expected bytes fed, `0.0` until binding starts
    pub fn loading_percentage(&self) -> f64 {
        self.inner
            .binder
            .read()
            .as_ref()
            .map(|binder| binder.loading_percentage())
            .unwrap_or(0.0)
    }

    /// Fraction unarchived, `0.0` until binding starts
    pub fn unarchiving_percentage(&self) -> f64 {
        self.inner
            .binder
            .read()
            .as_ref()
            .map(|binder| binder.unarchiving_percentage())
            .unwrap_or(0.0)
    }

    /// Fraction laid out, `0.0` until binding starts
    pub fn layout_percentage(&self) -> f64 {
        self.inner
            .binder
            .read()
            .as_ref()
            .map(|binder| binder.layout_percentage())
            .unwrap_or(0.0)
    }

    /// All three binder progress fractions in one record
    pub fn binding_progress(&self) -> BindingProgress {
        BindingProgress {
            loading: self.loading_percentage(),
            unarchiving: self.unarchiving_percentage(),
            layout: self.layout_percentage(),
        }
    }

    // ========================================================================
    // Load strategies
    // ========================================================================

    /// Load the book from its configured source
    ///
    /// Dispatches to the strategy matching the source kind chosen at
    /// construction. Fails with `InvalidState` when the book no longer
    /// needs loading — including after an earlier failed load.
    pub async fn load(&self) -> Result<()> {
        match self.inner.source_kind {
            SourceKind::Buffer => self.load_from_buffer().await,
            SourceKind::Request => self.load_from_request().await,
            SourceKind::Uri => self.load_from_uri().await,
            SourceKind::File => self.load_from_file().await,
            SourceKind::FileHandle => self.load_from_file_handle().await,
            SourceKind::Pump => self.load_from_pump().await,
        }
    }

    /// One-shot strategy over an in-memory buffer
    ///
    /// The whole buffer is both the initial binder chunk and the final
    /// content; loading finishes in the same step.
    pub async fn load_from_buffer(&self) -> Result<()> {
        let BookSource::Buffer(buffer) = self.begin_load(SourceKind::Buffer)? else {
            return Err(self.mismatch(SourceKind::Buffer));
        };
        self.finish_with_buffer(buffer).await
    }

    /// One-shot network strategy
    ///
    /// Downloads the full body, refining the expected size from the
    /// response's `Content-Length` when still unknown, then binds the
    /// body in a single step.
    pub async fn load_from_request(&self) -> Result<()> {
        let BookSource::Request(request) = self.begin_load(SourceKind::Request)? else {
            return Err(self.mismatch(SourceKind::Request));
        };

        let response = self.send_request(&request).await?;
        if let Some(len) = response.content_length() {
            self.inner.state.write().refine_expected_size(len as i64);
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| BookError::Transport(e.to_string()))?;
        tracing::debug!(name = %self.inner.name, bytes = body.len(), "Downloaded one-shot body");

        self.finish_with_buffer(body.to_vec()).await
    }

    /// Streaming network strategy
    ///
    /// The first chunk runs the binding pipeline (and the response's
    /// `Content-Length`, when present, refines an unknown expected size);
    /// every later chunk is appended and fed in arrival order. Completion
    /// of the transport cursor marks the load finished.
    pub async fn load_from_uri(&self) -> Result<()> {
        let BookSource::Uri(request) = self.begin_load(SourceKind::Uri)? else {
            return Err(self.mismatch(SourceKind::Uri));
        };

        let response = self.send_request(&request).await?;
        if let Some(len) = response.content_length() {
            self.inner.state.write().refine_expected_size(len as i64);
        }

        let mut stream = response.bytes_stream();
        let mut binder: Option<Arc<dyn Binder>> = None;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| BookError::Transport(e.to_string()))?;
            self.ingest(&chunk, &mut binder).await?;
        }

        self.complete_loading();
        Ok(())
    }

    /// Local file strategy: read the whole file, then one-shot
    pub async fn load_from_file(&self) -> Result<()> {
        let BookSource::File(path) = self.begin_load(SourceKind::File)? else {
            return Err(self.mismatch(SourceKind::File));
        };

        let buffer = tokio::fs::read(&path).await?;
        tracing::debug!(name = %self.inner.name, path = %path.display(), bytes = buffer.len(), "Read file");
        self.finish_with_buffer(buffer).await
    }

    /// Local file-handle strategy: read the handle to the end, then
    /// one-shot
    pub async fn load_from_file_handle(&self) -> Result<()> {
        let BookSource::FileHandle(mut file) = self.begin_load(SourceKind::FileHandle)? else {
            return Err(self.mismatch(SourceKind::FileHandle));
        };

        let mut buffer = Vec::new();
        file.read_to_end(&mut buffer).await?;
        self.finish_with_buffer(buffer).await
    }

    /// Push-producer strategy
    ///
    /// Events drain through one sequential loop, so chunks arriving while
    /// the first chunk's binder construction is in flight queue in the
    /// channel and replay strictly in arrival order afterwards. An `End`
    /// pushed before any chunk completes an empty load without ever
    /// creating a binder; a producer dropped without terminating fails
    /// the load.
    pub async fn load_from_pump(&self) -> Result<()> {
        let BookSource::Pump(mut subscription) = self.begin_load(SourceKind::Pump)? else {
            return Err(self.mismatch(SourceKind::Pump));
        };

        let mut binder: Option<Arc<dyn Binder>> = None;
        loop {
            match subscription.rx.recv().await {
                Some(PumpEvent::Data(chunk)) => self.ingest(&chunk, &mut binder).await?,
                Some(PumpEvent::End) => break,
                Some(PumpEvent::Error(cause)) => {
                    tracing::warn!(name = %self.inner.name, %cause, "Producer failed");
                    return Err(BookError::Producer(cause));
                }
                None => {
                    return Err(BookError::Producer(
                        "producer disconnected before end of stream".to_string(),
                    ));
                }
            }
        }

        self.complete_loading();
        Ok(())
    }

    // ========================================================================
    // Shared pipeline
    // ========================================================================

    /// Run both strategy preconditions, then consume the source and trip
    /// the needs-loading latch
    ///
    /// The latch trips strictly before the first byte is accumulated, and
    /// `LoadingStarted` is emitted here for every strategy. A mismatch
    /// leaves the latch untouched, so the matching loader can still run.
    fn begin_load(&self, expected: SourceKind) -> Result<BookSource> {
        if !self.needs_loading() {
            return Err(BookError::InvalidState(
                "book does not need loading".to_string(),
            ));
        }
        if self.inner.source_kind != expected {
            return Err(self.mismatch(expected));
        }

        let source = self
            .inner
            .source
            .lock()
            .take()
            .ok_or_else(|| BookError::InvalidState("source already consumed".to_string()))?;
        self.inner.state.write().begin_loading()?;

        tracing::info!(name = %self.inner.name, source = %expected, "Loading started");
        self.emit(BookEvent::LoadingStarted);
        Ok(source)
    }

    fn mismatch(&self, expected: SourceKind) -> BookError {
        BookError::SourceMismatch {
            expected,
            actual: self.inner.source_kind,
        }
    }

    /// One-shot tail shared by the buffer-producing strategies
    async fn finish_with_buffer(&self, buffer: Vec<u8>) -> Result<()> {
        self.inner
            .state
            .write()
            .refine_expected_size(buffer.len() as i64);
        self.bind(&buffer).await?;
        self.complete_loading();
        Ok(())
    }

    /// Feed one chunk through the shared pipeline
    ///
    /// The first chunk runs the binding pipeline; later chunks append to
    /// the book's sequence and feed the binder. Accumulation and binder
    /// feed for a chunk happen within this one step, never interleaved
    /// with a later chunk's processing.
    async fn ingest(&self, chunk: &[u8], binder: &mut Option<Arc<dyn Binder>>) -> Result<()> {
        match binder {
            None => {
                *binder = Some(self.bind(chunk).await?);
            }
            Some(binder) => {
                self.inner.state.write().append_bytes(chunk);
                binder.append_bytes(chunk).await;
            }
        }
        Ok(())
    }

    /// The binding pipeline; runs exactly once per book
    async fn bind(&self, initial_chunk: &[u8]) -> Result<Arc<dyn Binder>> {
        let expected_size = {
            let mut state = self.inner.state.write();
            state.begin_binding()?;
            // the book keeps its own copy of the initial chunk; the
            // source may mutate or hand off the original afterwards
            state.append_bytes(initial_chunk);
            state.expected_size
        };

        let binder = self
            .inner
            .factory
            .create_binder(&self.inner.name, initial_chunk, expected_size)
            .await
            .map_err(|e| BookError::BinderCreation(e.to_string()))?;

        self.inner.state.write().metadata = BookMetadata::empty(binder.book_type());

        let events = binder.subscribe();
        self.spawn_binder_relay(events);
        *self.inner.binder.write() = Some(binder.clone());

        binder
            .start()
            .await
            .map_err(|e| BookError::BinderCreation(e.to_string()))?;
        tracing::debug!(name = %self.inner.name, kind = binder.book_type().as_str(), "Binder started");
        Ok(binder)
    }

    fn complete_loading(&self) {
        self.inner.state.write().finish_loading();
        tracing::info!(name = %self.inner.name, bytes = self.byte_len(), "Loading complete");
        self.emit(BookEvent::LoadingComplete);
    }

    async fn send_request(&self, request: &NetworkRequest) -> Result<reqwest::Response> {
        let client = reqwest::Client::builder()
            .timeout(request.timeout)
            .build()
            .map_err(|e| BookError::Transport(e.to_string()))?;

        let mut builder = client.get(&request.uri);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        builder
            .send()
            .await
            .map_err(|e| BookError::Transport(e.to_string()))?
            .error_for_status()
            .map_err(|e| BookError::Transport(e.to_string()))
    }

    // ========================================================================
    // Event re-sourcing
    // ========================================================================

    fn spawn_binder_relay(&self, mut events: mpsc::UnboundedReceiver<BinderEvent>) {
        // the relay must not keep the book alive: the binder holding the
        // sender side lives inside the book, so a strong handle here
        // would cycle
        let inner: Weak<BookInner> = Arc::downgrade(&self.inner);
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                let Some(inner) = inner.upgrade() else {
                    break;
                };
                Book { inner }.apply_binder_event(event);
            }
        });
    }

    /// Translate one binder event into book state plus a re-sourced event
    fn apply_binder_event(&self, event: BinderEvent) {
        match event {
            BinderEvent::BindingComplete => {
                self.inner.state.write().finish_binding();
                tracing::info!(name = %self.inner.name, "Binding complete");
                self.emit(BookEvent::BindingComplete);
            }
            BinderEvent::MetadataExtracted { metadata } => {
                // consumed internally; subscribers observe it via metadata()
                self.inner.state.write().metadata = metadata;
            }
            BinderEvent::PageExtracted { page, index } => {
                {
                    let mut state = self.inner.state.write();
                    state.pages.push(page.clone());
                    if state.pages.len() != index + 1 {
                        tracing::warn!(
                            name = %self.inner.name,
                            index,
                            extracted = state.pages.len(),
                            "Page index does not match arrival order"
                        );
                    }
                }
                self.emit(BookEvent::PageExtracted { page, index });
            }
            BinderEvent::Progress {
                total_pages,
                message,
            } => {
                let total = {
                    let mut state = self.inner.state.write();
                    if let Some(total) = total_pages {
                        state.report_total_pages(total);
                    }
                    state.total_page_count
                };
                self.emit(BookEvent::Progress {
                    total_pages: total,
                    message,
                });
            }
        }
    }

    fn emit(&self, event: BookEvent) {
        // a book with no subscribers is fine
        let _ = self.inner.events.send(event);
    }
}
