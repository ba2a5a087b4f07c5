//! Error types for the core library.

use thiserror::Error;

/// Errors that can occur in core operations.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error while staging, publishing, or deleting messages, or
    /// while persisting the feed cache. Fatal for the operation.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A message with this filename already exists at publish time.
    /// Callers treat this as "already delivered" and move on.
    #[error("name clash with existing message: {key}")]
    NameClash {
        /// The clashing message filename.
        key: String,
    },

    /// Cache serialization error.
    #[error("cache serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Message generation error.
    #[error("message generation error: {0}")]
    Mime(#[from] feedspool_mime::Error),

    /// The fetch collaborator failed for one feed. Recovered per feed;
    /// the synchronizer treats the feed as unchanged and continues.
    #[error("feed fetch failed: {0}")]
    Fetch(String),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
