//! Cache data model.

use crate::feed::Validators;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Persisted fetch state for one feed.
///
/// `entries` maps entry uid to the last-rendered body HTML for that uid.
/// Keys are exactly the uids observed in the most recent non-empty fetch;
/// uids absent from the latest fetch are dropped, which bounds growth.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheRecord {
    /// `ETag` from the last successful fetch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    /// `Last-Modified` from the last successful fetch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<String>,
    /// Entry uid to last-rendered body HTML.
    #[serde(default)]
    pub entries: BTreeMap<String, String>,
}

impl CacheRecord {
    /// Creates a record carrying validator tokens and no entries yet.
    #[must_use]
    pub fn new(validators: Validators) -> Self {
        Self {
            etag: validators.etag,
            modified: validators.modified,
            entries: BTreeMap::new(),
        }
    }

    /// The record's validator tokens, for the next conditional fetch.
    #[must_use]
    pub fn validators(&self) -> Validators {
        Validators {
            etag: self.etag.clone(),
            modified: self.modified.clone(),
        }
    }
}
