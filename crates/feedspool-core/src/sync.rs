//! The synchronizer: drives the per-feed loop and the end-of-run
//! reconciliation.
//!
//! Per feed: fetch → (unchanged | entries) → per-entry identify, diff,
//! deliver-or-skip → cache update. Across feeds: load cache → every feed
//! → stale cleanup → persist cache. A single feed's failure never aborts
//! the run; storage failures do.

use crate::cache::{CacheRecord, CacheRepository};
use crate::compose::{RenderText, compose, resolve_date};
use crate::error::{Error, Result};
use crate::feed::{FeedConfig, FetchFeed, FetchOutcome};
use crate::identity::{DiffHtml, cache_uid, identity, render_body, resolve_body, sanitize_title};
use crate::maildir::{Maildir, PRESERVED_FLAG};
use chrono::{Duration, Utc};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, warn};

/// Counters for one synchronizer run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Messages newly delivered.
    pub delivered: usize,
    /// Stale messages removed by the cleanup pass.
    pub deleted: usize,
    /// Feeds whose fetch failed (treated as unchanged).
    pub failed: usize,
}

/// One-shot feed-to-maildir synchronizer.
pub struct Synchronizer<'a> {
    store: &'a Maildir,
    cache: &'a CacheRepository,
    fetcher: &'a dyn FetchFeed,
    renderer: &'a dyn RenderText,
    differ: &'a dyn DiffHtml,
}

impl<'a> Synchronizer<'a> {
    /// Wires the synchronizer to its store, cache, and collaborators.
    #[must_use]
    pub fn new(
        store: &'a Maildir,
        cache: &'a CacheRepository,
        fetcher: &'a dyn FetchFeed,
        renderer: &'a dyn RenderText,
        differ: &'a dyn DiffHtml,
    ) -> Self {
        Self {
            store,
            cache,
            fetcher,
            renderer,
            differ,
        }
    }

    /// Runs one full synchronization pass over `feeds`.
    ///
    /// # Errors
    ///
    /// Returns an error on storage failure during delivery or cleanup,
    /// or if the new cache cannot be persisted. Per-feed fetch failures
    /// are recovered and only counted in the report.
    pub fn run(&self, feeds: &[FeedConfig]) -> Result<SyncReport> {
        let now = Utc::now();
        let old_cache = self.cache.load();
        let mut new_cache: BTreeMap<String, CacheRecord> = BTreeMap::new();

        // Everything present at run start is stale until an entry
        // confirms it.
        let mut stale = self.store.keys()?;
        let mut report = SyncReport::default();

        for feed in feeds {
            let old_record = old_cache.get(&feed.url);
            let validators = if feed.use_header {
                old_record.map(CacheRecord::validators).filter(|v| !v.is_empty())
            } else {
                None
            };

            let outcome = match self.fetcher.fetch(&feed.url, validators.as_ref()) {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!(url = %feed.url, error = %e, "feed fetch failed, treating as unchanged");
                    report.failed += 1;
                    let title = feed.title.clone().unwrap_or_else(|| feed.url.clone());
                    Self::carry_forward(feed, &title, old_record, &mut new_cache, &mut stale);
                    continue;
                }
            };

            let title = feed
                .title
                .clone()
                .or_else(|| outcome.title.clone())
                .unwrap_or_else(|| feed.url.clone());

            if outcome.entries.is_empty() {
                debug!(url = %feed.url, "feed unchanged");
                Self::carry_forward(feed, &title, old_record, &mut new_cache, &mut stale);
                continue;
            }

            let record =
                self.process_entries(feed, &title, outcome, old_record, &mut stale, now, &mut report)?;
            new_cache.insert(feed.url.clone(), record);
        }

        report.deleted = self.cleanup(&stale)?;
        self.cache.persist(&new_cache)?;

        info!(
            delivered = report.delivered,
            deleted = report.deleted,
            failed = report.failed,
            "sync complete"
        );
        Ok(report)
    }

    /// Unchanged/failed path: keep the previous cache record and shield
    /// this feed's existing messages from the cleanup pass.
    fn carry_forward(
        feed: &FeedConfig,
        title: &str,
        old_record: Option<&CacheRecord>,
        new_cache: &mut BTreeMap<String, CacheRecord>,
        stale: &mut BTreeSet<String>,
    ) {
        let prefix = format!("{}.", sanitize_title(title));
        stale.retain(|key| !key.starts_with(&prefix));

        if let Some(record) = old_record {
            new_cache.insert(feed.url.clone(), record.clone());
        }
    }

    /// Entries path: oldest first, filter, identify, diff, deliver.
    #[allow(clippy::too_many_arguments)]
    fn process_entries(
        &self,
        feed: &FeedConfig,
        title: &str,
        outcome: FetchOutcome,
        old_record: Option<&CacheRecord>,
        stale: &mut BTreeSet<String>,
        now: chrono::DateTime<Utc>,
        report: &mut SyncReport,
    ) -> Result<CacheRecord> {
        let prefix = sanitize_title(title);
        let mut record = CacheRecord::new(outcome.validators);

        for mut entry in outcome.entries.into_iter().rev() {
            if let Some(filter) = &feed.filter {
                if filter(&mut entry) {
                    // Dropped entries leave no trace: no cache entry, no
                    // stale-set touch, so an already-delivered message
                    // for this entry becomes eligible for cleanup.
                    debug!(link = %entry.link, "entry dropped by filter");
                    continue;
                }
            }

            let uid = cache_uid(&entry, feed.use_uid);
            let fresh = render_body(&entry);
            let key = format!("{prefix}.{}", identity(&entry, feed.use_uid));

            if !self.store.contains(&key)? {
                let date = resolve_date(&entry, outcome.updated, feed.use_date, now);
                let within_age = feed
                    .max_age_days
                    .is_none_or(|days| now - date < Duration::days(i64::from(days)));

                if within_age {
                    let cached = old_record.and_then(|r| r.entries.get(&uid)).map(String::as_str);
                    let body = resolve_body(&fresh, cached, self.differ);
                    let message = compose(title, &entry, date, &body, self.renderer)?;
                    match self.store.add(&key, &message) {
                        Ok(()) => {
                            debug!(%key, "delivered");
                            report.delivered += 1;
                        }
                        Err(Error::NameClash { .. }) => {
                            debug!(%key, "name clash, already delivered");
                        }
                        Err(e) => return Err(e),
                    }
                } else {
                    debug!(%key, "entry older than age window, not delivered");
                }
            }

            record.entries.insert(uid, fresh);
            stale.remove(&key);
        }

        Ok(record)
    }

    /// Deletes everything still stale, sparing preserved messages.
    fn cleanup(&self, stale: &BTreeSet<String>) -> Result<usize> {
        let mut deleted = 0;
        for key in stale {
            if self.store.flags(key)?.contains(PRESERVED_FLAG) {
                debug!(%key, "stale but preserved, keeping");
                continue;
            }
            debug!(%key, "deleting stale message");
            self.store.delete(key)?;
            deleted += 1;
        }
        Ok(deleted)
    }
}
