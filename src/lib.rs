//! Tebeo
//!
//! Asynchronous loading and binding orchestration for comic book archives
//! and similar paginated containers.
//!
//! A book's bytes can arrive four different ways: as one buffer from a
//! one-shot network request, as a chunked network stream, from a local
//! file, or pushed asynchronously by an external producer. This crate
//! accumulates those bytes into a single owned sequence, drives an
//! external decoding engine (the binder) with the same bytes, and
//! re-emits the binder's lifecycle as one stable event stream.
//!
//! # Modules
//!
//! - `book`: the loading/binding orchestrator
//! - `binder`: the decoding engine contract consumed by the orchestrator
//! - `pump`: the push-producer channel

pub mod binder;
pub mod book;
pub mod pump;

pub use binder::{
    Binder, BinderContext, BinderError, BinderEvent, BinderFactory, BookKind, BookMetadata,
    Creator, EngineOptions, Page, PageRef,
};
pub use book::{
    BindingProgress, Book, BookError, BookEvent, BookSource, NetworkRequest, SourceKind,
    UNKNOWN_SIZE,
};
pub use pump::{BookPump, PumpError, PumpEvent, PumpSubscription};
