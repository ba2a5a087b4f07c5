//! Maps parsed feed documents onto core entries.

use crate::error::Result;
use feedspool_core::{Entry, FetchOutcome};
use tracing::warn;

/// Parses RSS/Atom bytes into a [`FetchOutcome`] (without validators;
/// the transport layer attaches those).
///
/// Entries come out in document order. Entries without any link are
/// skipped: the link is the one field the mailbox rendering cannot do
/// without.
///
/// # Errors
///
/// Returns an error if the document is not a recognizable feed.
pub fn parse_feed(bytes: &[u8]) -> Result<FetchOutcome> {
    let feed = feed_rs::parser::parse(bytes)?;

    let mut entries = Vec::with_capacity(feed.entries.len());
    for item in feed.entries {
        let Some(link) = item.links.first().map(|l| l.href.clone()) else {
            warn!(id = %item.id, "skipping entry without a link");
            continue;
        };

        let summary = item
            .summary
            .map(|s| s.content)
            .or_else(|| item.content.and_then(|c| c.body));

        entries.push(Entry {
            link,
            id: Some(item.id).filter(|id| !id.is_empty()),
            title: item.title.map(|t| t.content),
            summary,
            author: item
                .authors
                .into_iter()
                .map(|a| a.name)
                .find(|name| !name.is_empty()),
            updated: item.updated,
            published: item.published,
        });
    }

    Ok(FetchOutcome {
        title: feed.title.map(|t| t.content),
        updated: feed.updated,
        entries,
        validators: feedspool_core::Validators::default(),
    })
}
