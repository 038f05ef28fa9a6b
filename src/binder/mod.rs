//! Binder contract
//!
//! The binder is the external decoding/extraction engine that unpacks a
//! book's raw bytes into pages and metadata. The orchestrator depends
//! only on the surface in this module; the unpacking algorithm behind it
//! is an external collaborator.
//!
//! ```text
//!   orchestrator ──create_binder──▶ BinderFactory
//!        │                              │
//!        │◀─────── Arc<dyn Binder> ─────┘
//!        │
//!        ├─ append_bytes(chunk)  ──▶ Binder
//!        └─◀── BinderEvent stream ── Binder
//! ```

mod context;
mod error;
mod events;
mod traits;
mod types;

pub use context::{BinderContext, EngineOptions};
pub use error::{BinderError, Result};
pub use events::BinderEvent;
pub use traits::{Binder, BinderFactory, Page, PageRef};
pub use types::{BookKind, BookMetadata, Creator};
