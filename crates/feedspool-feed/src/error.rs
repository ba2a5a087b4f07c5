//! Error types for feed retrieval.

use thiserror::Error;

/// Result type alias for fetch operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while retrieving or parsing a feed.
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP transport failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success, non-304 status.
    #[error("unexpected HTTP status: {0}")]
    Status(u16),

    /// Spawning or running an `exec:` feed command failed.
    #[error("feed command failed: {0}")]
    Exec(#[from] std::io::Error),

    /// An `exec:` feed command exited unsuccessfully.
    #[error("feed command exited with {status}: {command}")]
    ExecStatus {
        /// The command that was run.
        command: String,
        /// Its exit status.
        status: std::process::ExitStatus,
    },

    /// The feed document could not be parsed.
    #[error("feed parse error: {0}")]
    Parse(#[from] feed_rs::parser::ParseFeedError),
}
