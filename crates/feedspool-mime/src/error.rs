//! Error types for MIME generation.

use thiserror::Error;

/// Result type alias for MIME operations.
pub type Result<T> = std::result::Result<T, Error>;

/// MIME generation error types.
#[derive(Debug, Error)]
pub enum Error {
    /// A required message field was never supplied to the builder.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// A header value contains a raw line break.
    #[error("header value contains a line break: {0:?}")]
    HeaderLineBreak(String),

    /// The message has no body part at all.
    #[error("message has no body part")]
    EmptyBody,
}
