//! # feedspool-core
//!
//! Feed-to-maildir synchronization engine.
//!
//! This crate provides:
//! - A crash-safe, file-per-message maildir store
//! - Entry identity derivation and in-place change detection
//! - Persisted per-feed conditional-fetch state
//! - Message composition (plaintext + HTML alternatives)
//! - The synchronizer orchestrating fetch, delivery, and stale cleanup
//!
//! Feed retrieval, HTML-to-text rendering, and HTML diffing are
//! collaborators injected through the [`FetchFeed`], [`RenderText`], and
//! [`DiffHtml`] traits.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod cache;
pub mod compose;
mod error;
pub mod feed;
pub mod identity;
pub mod maildir;
pub mod sync;

pub use cache::{CacheRecord, CacheRepository};
pub use compose::RenderText;
pub use error::{Error, Result};
pub use feed::{Entry, EntryFilter, FeedConfig, FetchFeed, FetchOutcome, Validators};
pub use identity::DiffHtml;
pub use maildir::{Maildir, PRESERVED_FLAG};
pub use sync::{SyncReport, Synchronizer};
