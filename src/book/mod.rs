//! Book loading orchestrator
//!
//! The core of the crate: a [`Book`] owns load-source selection, byte
//! accumulation, the binder lifecycle, and the re-sourcing of binder
//! events into its own public event stream.
//!
//! ```text
//!   source (request | uri | file | handle | pump | buffer)
//!      │ chunks, in arrival order
//!      ▼
//!   Book ── first chunk ──▶ BinderFactory::create_binder
//!      │                         │
//!      ├── byte_sequence (owned, copy-append, monotonic)
//!      ├── later chunks ──▶ Binder::append_bytes
//!      └──◀── BinderEvent ── relay ──▶ BookEvent subscribers
//! ```

mod error;
mod events;
mod orchestrator;
mod types;

pub use error::{BookError, Result};
pub use events::BookEvent;
pub use orchestrator::Book;
pub use types::{
    BindingProgress, BookSource, NetworkRequest, SourceKind, DEFAULT_REQUEST_TIMEOUT, UNKNOWN_SIZE,
};
