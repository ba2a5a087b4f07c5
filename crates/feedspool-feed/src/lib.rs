//! # feedspool-feed
//!
//! Feed retrieval and parsing: the concrete [`feedspool_core::FetchFeed`]
//! collaborator.
//!
//! Fetches over HTTP with conditional-GET validators (a 304 comes back as
//! the unchanged signal), or, for `exec:` urls, by running a local
//! command and parsing its captured stdout. Either way the body goes
//! through feed-rs and comes out as normalized core entries.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod error;
mod fetch;
mod parse;

pub use error::{Error, Result};
pub use fetch::HttpFetcher;
pub use parse::parse_feed;
