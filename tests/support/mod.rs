//! Shared test doubles: a scriptable binder and its factory.
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc;

use tebeo::{
    Binder, BinderContext, BinderEvent, BinderFactory, BookKind, BookMetadata, Page, PageRef,
};

/// Page double carrying an arbitrary payload
#[derive(Debug)]
pub struct FixturePage {
    pub data: Vec<u8>,
}

impl FixturePage {
    pub fn shared(data: Vec<u8>) -> PageRef {
        Arc::new(Self { data })
    }
}

impl Page for FixturePage {
    fn mime_type(&self) -> &str {
        "image/png"
    }

    fn bytes(&self) -> &[u8] {
        &self.data
    }
}

/// Binder double driven explicitly by the test
pub struct ScriptedBinder {
    initial: Vec<u8>,
    expected_size: i64,
    appended: Mutex<Vec<Vec<u8>>>,
    tx: mpsc::UnboundedSender<BinderEvent>,
    rx: Mutex<Option<mpsc::UnboundedReceiver<BinderEvent>>>,
}

impl ScriptedBinder {
    pub fn new(initial: &[u8], expected_size: i64) -> Arc<Self> {
        let (tx, rx) = mpsc::unbounded_channel();
        Arc::new(Self {
            initial: initial.to_vec(),
            expected_size,
            appended: Mutex::new(Vec::new()),
            tx,
            rx: Mutex::new(Some(rx)),
        })
    }

    pub fn emit_progress(&self, total_pages: Option<usize>, message: Option<&str>) {
        let _ = self.tx.send(BinderEvent::Progress {
            total_pages,
            message: message.map(str::to_string),
        });
    }

    pub fn emit_page(&self, page: PageRef, index: usize) {
        let _ = self.tx.send(BinderEvent::PageExtracted { page, index });
    }

    pub fn emit_metadata(&self, metadata: BookMetadata) {
        let _ = self.tx.send(BinderEvent::MetadataExtracted { metadata });
    }

    pub fn emit_complete(&self) {
        let _ = self.tx.send(BinderEvent::BindingComplete);
    }

    /// Every byte fed to this binder, in feed order
    pub fn fed(&self) -> Vec<u8> {
        let mut all = self.initial.clone();
        for chunk in self.appended.lock().iter() {
            all.extend_from_slice(chunk);
        }
        all
    }

    pub fn expected_size(&self) -> i64 {
        self.expected_size
    }
}

#[async_trait]
impl Binder for ScriptedBinder {
    fn book_type(&self) -> BookKind {
        BookKind::Comic
    }

    fn mime_type(&self) -> &str {
        "application/vnd.comicbook+zip"
    }

    fn loading_percentage(&self) -> f64 {
        if self.expected_size <= 0 {
            return 0.0;
        }
        self.fed().len() as f64 / self.expected_size as f64
    }

    fn unarchiving_percentage(&self) -> f64 {
        0.0
    }

    fn layout_percentage(&self) -> f64 {
        0.0
    }

    async fn append_bytes(&self, chunk: &[u8]) {
        self.appended.lock().push(chunk.to_vec());
    }

    fn subscribe(&self) -> mpsc::UnboundedReceiver<BinderEvent> {
        self.rx.lock().take().expect("subscribed once")
    }

    async fn start(&self) -> tebeo::binder::Result<()> {
        Ok(())
    }
}

/// Factory double recording every binder it creates
pub struct ScriptedFactory {
    context: Option<Arc<BinderContext>>,
    delay: Option<Duration>,
    created: Mutex<Vec<Arc<ScriptedBinder>>>,
}

impl ScriptedFactory {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            context: None,
            delay: None,
            created: Mutex::new(Vec::new()),
        })
    }

    /// Factory bound to an engine context; refuses creation once the
    /// context is shut down
    pub fn with_context(context: Arc<BinderContext>) -> Arc<Self> {
        Arc::new(Self {
            context: Some(context),
            delay: None,
            created: Mutex::new(Vec::new()),
        })
    }

    /// Factory whose construction resolves only after `delay`
    pub fn with_delay(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            context: None,
            delay: Some(delay),
            created: Mutex::new(Vec::new()),
        })
    }

    /// The first binder created by this factory
    pub fn binder(&self) -> Arc<ScriptedBinder> {
        self.created.lock().first().expect("binder created").clone()
    }
}

#[async_trait]
impl BinderFactory for ScriptedFactory {
    async fn create_binder(
        &self,
        _name: &str,
        initial_bytes: &[u8],
        expected_size: i64,
    ) -> tebeo::binder::Result<Arc<dyn Binder>> {
        if let Some(context) = &self.context {
            context.ensure_open()?;
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let binder = ScriptedBinder::new(initial_bytes, expected_size);
        self.created.lock().push(binder.clone());
        Ok(binder)
    }
}
