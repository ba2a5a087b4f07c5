//! Feed domain model and the fetch collaborator seam.

use crate::Result;
use chrono::{DateTime, Utc};
use std::fmt;

/// A single feed entry, normalized to plain optional fields.
///
/// Derivation precedence over these fields (identity, dates) lives in
/// [`crate::identity`] and [`crate::compose`]; this type carries data
/// only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Entry {
    /// Entry link. The only required field.
    pub link: String,
    /// Feed-assigned entry id (Atom id / RSS guid).
    pub id: Option<String>,
    /// Entry title.
    pub title: Option<String>,
    /// Entry summary or content body, as HTML.
    pub summary: Option<String>,
    /// Author name.
    pub author: Option<String>,
    /// Last-updated timestamp.
    pub updated: Option<DateTime<Utc>>,
    /// First-published timestamp.
    pub published: Option<DateTime<Utc>>,
}

impl Entry {
    /// Creates an entry with only a link set.
    #[must_use]
    pub fn new(link: impl Into<String>) -> Self {
        Self {
            link: link.into(),
            ..Self::default()
        }
    }
}

/// Conditional-fetch validator tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Validators {
    /// HTTP `ETag` value from the last successful fetch.
    pub etag: Option<String>,
    /// HTTP `Last-Modified` value from the last successful fetch.
    pub modified: Option<String>,
}

impl Validators {
    /// Returns true if neither token is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.etag.is_none() && self.modified.is_none()
    }
}

/// Result of one fetch of one feed.
///
/// An unchanged feed (HTTP 304) is represented as an outcome with zero
/// entries; the synchronizer treats zero entries and fetch failure the
/// same way.
#[derive(Debug, Clone, Default)]
pub struct FetchOutcome {
    /// Feed-provided title, when the document carries one.
    pub title: Option<String>,
    /// Feed-level updated timestamp.
    pub updated: Option<DateTime<Utc>>,
    /// Entries in document order (feeds publish newest first).
    pub entries: Vec<Entry>,
    /// Validator tokens for the next conditional fetch.
    pub validators: Validators,
}

/// Per-feed entry filter: may rewrite the entry in place; returning true
/// drops the entry entirely.
pub type EntryFilter = Box<dyn Fn(&mut Entry) -> bool>;

/// Configuration for one feed. Immutable during a run.
pub struct FeedConfig {
    /// Feed url; also the feed's identity in the persisted cache. The
    /// `exec:` scheme means "run the rest as a local command and parse
    /// its stdout as the feed body".
    pub url: String,
    /// Display title override. Falls back to the feed-provided title,
    /// then to the url.
    pub title: Option<String>,
    /// Entry filter/rewrite callback.
    pub filter: Option<EntryFilter>,
    /// Derive entry identity from the feed-assigned id rather than from
    /// the content.
    pub use_uid: bool,
    /// Send cached validator tokens on fetch (conditional GET).
    pub use_header: bool,
    /// Trust entry-provided timestamps; when false, every message is
    /// dated with the current time.
    pub use_date: bool,
    /// Skip delivering entries older than this many days. `None`
    /// disables the age window.
    pub max_age_days: Option<u32>,
}

impl FeedConfig {
    /// Creates a config with the defaults the original tool used:
    /// content-derived identity, conditional fetching on, entry dates
    /// trusted, no age window.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: None,
            filter: None,
            use_uid: false,
            use_header: true,
            use_date: true,
            max_age_days: None,
        }
    }
}

impl fmt::Debug for FeedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeedConfig")
            .field("url", &self.url)
            .field("title", &self.title)
            .field("filter", &self.filter.as_ref().map(|_| "<fn>"))
            .field("use_uid", &self.use_uid)
            .field("use_header", &self.use_header)
            .field("use_date", &self.use_date)
            .field("max_age_days", &self.max_age_days)
            .finish()
    }
}

/// Fetch collaborator: retrieve and parse one feed.
pub trait FetchFeed {
    /// Fetches `url`, sending `validators` for a conditional request
    /// when provided.
    ///
    /// # Errors
    ///
    /// Implementations report network, process, or parse failures as
    /// [`crate::Error::Fetch`]; the synchronizer recovers per feed.
    fn fetch(&self, url: &str, validators: Option<&Validators>) -> Result<FetchOutcome>;
}
