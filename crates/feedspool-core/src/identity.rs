//! Entry identity, canonical body rendering, and change detection.
//!
//! The identity token names the message file; the canonical body is what
//! gets cached and compared across runs. Both must be stable for a given
//! entry or the store fills up with duplicates.

use crate::feed::Entry;
use sha2::{Digest, Sha256};
use std::fmt::Write as _;

/// HTML diff collaborator: render the change between two body versions
/// as a single HTML fragment with inline markup.
pub trait DiffHtml {
    /// Diffs `old` against `new`.
    fn diff(&self, old: &str, new: &str) -> String;
}

/// Selects the identity source for an entry.
///
/// With `use_uid`: the feed-assigned id when present, else summary, else
/// title, else link. Without: the first non-empty of summary, title,
/// link, so the identity follows the content and a changed body names a
/// new message.
#[must_use]
pub fn identity_source(entry: &Entry, use_uid: bool) -> &str {
    if use_uid {
        entry
            .id
            .as_deref()
            .or(entry.summary.as_deref())
            .or(entry.title.as_deref())
            .unwrap_or(&entry.link)
    } else {
        entry
            .summary
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| entry.title.as_deref().filter(|t| !t.is_empty()))
            .unwrap_or(&entry.link)
    }
}

/// Fixed-width, filesystem-safe identity token: lowercase hex SHA-256 of
/// the selected source.
#[must_use]
pub fn identity(entry: &Entry, use_uid: bool) -> String {
    let mut hasher = Sha256::new();
    hasher.update(identity_source(entry, use_uid).as_bytes());
    let digest = hasher.finalize();
    let mut hex = String::with_capacity(64);
    for byte in digest {
        let _ = write!(hex, "{byte:02x}");
    }
    hex
}

/// The key under which this entry's rendered body is cached: the raw
/// selected source under `use_uid`, the id-or-link otherwise.
#[must_use]
pub fn cache_uid(entry: &Entry, use_uid: bool) -> String {
    if use_uid {
        identity_source(entry, true).to_string()
    } else {
        entry.id.clone().unwrap_or_else(|| entry.link.clone())
    }
}

/// Renders the canonical body HTML for an entry: link anchor, optional
/// author line, then the raw summary (or the link again when there is
/// none). This is the content compared across runs.
#[must_use]
pub fn render_body(entry: &Entry) -> String {
    let author = entry
        .author
        .as_deref()
        .map(|a| format!("Author: {a}<br>"))
        .unwrap_or_default();
    let summary = entry.summary.as_deref().unwrap_or(&entry.link);
    format!("<a href=\"{}\">Link</a><br>{author}<br>{summary}", entry.link)
}

/// Resolves the body to deliver: the diff of (cached, fresh) when the
/// cached body for this uid differs byte-for-byte, the fresh render
/// otherwise. The cache itself always keeps the fresh render.
#[must_use]
pub fn resolve_body(fresh: &str, cached: Option<&str>, differ: &dyn DiffHtml) -> String {
    match cached {
        Some(old) if old != fresh => differ.diff(old, fresh),
        _ => fresh.to_string(),
    }
}

/// Sanitizes a feed title into a stable filename prefix: space, `.`,
/// `:`, `/` and every non-ASCII character become `_`. Stale-tracking
/// prefix matching depends on this being identical across runs.
#[must_use]
pub fn sanitize_title(title: &str) -> String {
    title
        .chars()
        .map(|c| match c {
            ' ' | '.' | ':' | '/' => '_',
            c if c.is_ascii() => c,
            _ => '_',
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    struct MarkerDiff;

    impl DiffHtml for MarkerDiff {
        fn diff(&self, old: &str, new: &str) -> String {
            format!("<del>{old}</del><ins>{new}</ins>")
        }
    }

    fn entry() -> Entry {
        Entry {
            link: "http://x".to_string(),
            id: Some("a".to_string()),
            title: Some("T".to_string()),
            summary: Some("S1".to_string()),
            author: None,
            updated: None,
            published: None,
        }
    }

    #[test]
    fn test_uid_identity_prefers_id() {
        assert_eq!(identity_source(&entry(), true), "a");
    }

    #[test]
    fn test_uid_identity_falls_back_in_order() {
        let mut e = entry();
        e.id = None;
        assert_eq!(identity_source(&e, true), "S1");
        e.summary = None;
        assert_eq!(identity_source(&e, true), "T");
        e.title = None;
        assert_eq!(identity_source(&e, true), "http://x");
    }

    #[test]
    fn test_content_identity_prefers_summary() {
        assert_eq!(identity_source(&entry(), false), "S1");
    }

    #[test]
    fn test_content_identity_skips_empty_fields() {
        let mut e = entry();
        e.summary = Some(String::new());
        assert_eq!(identity_source(&e, false), "T");
        e.title = Some(String::new());
        assert_eq!(identity_source(&e, false), "http://x");
    }

    #[test]
    fn test_identity_is_sha256_of_source() {
        // sha256("a")
        assert_eq!(
            identity(&entry(), true),
            "ca978112ca1bbdcafac231b39a23dc4da786eff8147c4e72b9807785afee48bb"
        );
    }

    #[test]
    fn test_cache_uid_content_mode_uses_id_or_link() {
        let mut e = entry();
        assert_eq!(cache_uid(&e, false), "a");
        e.id = None;
        assert_eq!(cache_uid(&e, false), "http://x");
    }

    #[test]
    fn test_render_body_with_author() {
        let mut e = entry();
        e.author = Some("Ada".to_string());
        assert_eq!(
            render_body(&e),
            "<a href=\"http://x\">Link</a><br>Author: Ada<br><br>S1"
        );
    }

    #[test]
    fn test_render_body_without_summary_repeats_link() {
        let mut e = entry();
        e.summary = None;
        assert_eq!(
            render_body(&e),
            "<a href=\"http://x\">Link</a><br><br>http://x"
        );
    }

    #[test]
    fn test_resolve_body_unchanged_and_uncached() {
        let differ = MarkerDiff;
        assert_eq!(resolve_body("b", None, &differ), "b");
        assert_eq!(resolve_body("b", Some("b"), &differ), "b");
    }

    #[test]
    fn test_resolve_body_diffs_on_change() {
        let differ = MarkerDiff;
        assert_eq!(
            resolve_body("new", Some("old"), &differ),
            "<del>old</del><ins>new</ins>"
        );
    }

    #[test]
    fn test_sanitize_title() {
        assert_eq!(sanitize_title("My Feed: v2.0/news"), "My_Feed__v2_0_news");
        assert_eq!(sanitize_title("Überblick"), "_berblick");
    }

    proptest! {
        #[test]
        fn prop_identity_is_fixed_width_hex(source in ".*") {
            let e = Entry {
                link: source,
                ..Entry::default()
            };
            let token = identity(&e, false);
            prop_assert_eq!(token.len(), 64);
            prop_assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        }

        #[test]
        fn prop_sanitized_title_is_filename_safe(title in ".*") {
            let sanitized = sanitize_title(&title);
            prop_assert!(sanitized.is_ascii());
            prop_assert!(!sanitized.contains('/'));
            prop_assert!(!sanitized.contains(' '));
            prop_assert!(!sanitized.contains('.'));
            prop_assert!(!sanitized.contains(':'));
        }
    }
}
