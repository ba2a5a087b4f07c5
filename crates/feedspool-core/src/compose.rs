//! Message composition.

use crate::Result;
use crate::feed::Entry;
use chrono::{DateTime, Utc};
use feedspool_mime::MessageBuilder;

/// RFC-2822-style timestamp for the `Date` header.
const DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S %z";

/// Glyph that keeps turning up mis-encoded in feed titles; stripped from
/// the `From` display name.
const BAD_TITLE_GLYPH: char = '»';

/// HTML-to-plaintext collaborator. Implementations should keep literal
/// unicode and must not inline link targets into the text.
pub trait RenderText {
    /// Renders an HTML fragment as plain text.
    fn render(&self, html: &str) -> String;
}

/// Resolves the timestamp a message is dated with.
///
/// With `use_date`: the entry's updated timestamp, else its published
/// timestamp, else the feed-level updated timestamp, else `now`. Without:
/// always `now`.
#[must_use]
pub fn resolve_date(
    entry: &Entry,
    feed_updated: Option<DateTime<Utc>>,
    use_date: bool,
    now: DateTime<Utc>,
) -> DateTime<Utc> {
    if !use_date {
        return now;
    }
    entry
        .updated
        .or(entry.published)
        .or(feed_updated)
        .unwrap_or(now)
}

/// Composes the full message for an entry: plaintext and HTML
/// alternatives under the feed-title `From`, the entry-title `Subject`,
/// and the resolved `Date`.
///
/// # Errors
///
/// Returns an error if message generation fails.
pub fn compose(
    title: &str,
    entry: &Entry,
    date: DateTime<Utc>,
    body_html: &str,
    renderer: &dyn RenderText,
) -> Result<String> {
    let sender: String = title.chars().filter(|c| *c != BAD_TITLE_GLYPH).collect();
    let subject: String = entry
        .title
        .as_deref()
        .unwrap_or(&entry.link)
        .chars()
        .filter(|c| *c != '\n' && *c != '\r')
        .collect();

    let message = MessageBuilder::new()
        .sender_name(sender)
        .subject(subject)
        .date(date.format(DATE_FORMAT).to_string())
        .text_body(renderer.render(body_html))
        .html_body(body_html)
        .build()?;
    Ok(message)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    struct PassthroughRender;

    impl RenderText for PassthroughRender {
        fn render(&self, html: &str) -> String {
            format!("text:{html}")
        }
    }

    fn entry() -> Entry {
        Entry {
            link: "http://x".to_string(),
            title: Some("An article".to_string()),
            ..Entry::default()
        }
    }

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn test_date_resolution_precedence() {
        let now = at(1_000_000);
        let mut e = entry();
        assert_eq!(resolve_date(&e, None, true, now), now);

        let feed_updated = at(10);
        assert_eq!(resolve_date(&e, Some(feed_updated), true, now), feed_updated);

        e.published = Some(at(20));
        assert_eq!(resolve_date(&e, Some(feed_updated), true, now), at(20));

        e.updated = Some(at(30));
        assert_eq!(resolve_date(&e, Some(feed_updated), true, now), at(30));
    }

    #[test]
    fn test_date_ignored_when_untrusted() {
        let now = at(1_000_000);
        let mut e = entry();
        e.updated = Some(at(30));
        assert_eq!(resolve_date(&e, None, false, now), now);
    }

    #[test]
    fn test_compose_headers_and_parts() {
        let message = compose(
            "My Feed",
            &entry(),
            at(1_752_000_000),
            "<p>body</p>",
            &PassthroughRender,
        )
        .unwrap();

        assert!(message.starts_with("From: My Feed <>\n"));
        assert!(message.contains("Subject: An article\n"));
        assert!(message.contains("Date: "));
        assert!(message.contains("+0000\n"));
        assert!(message.contains("multipart/alternative"));
        // Plaintext part came from the renderer, HTML part is verbatim.
        assert!(message.contains("text:<p>body</p>"));
        assert!(message.contains("<p>body</p>"));
    }

    #[test]
    fn test_compose_strips_bad_glyph_from_sender() {
        let message = compose(
            "heise online News »",
            &entry(),
            at(0),
            "b",
            &PassthroughRender,
        )
        .unwrap();
        let from = message.lines().next().unwrap();
        assert_eq!(from, "From: heise online News  <>");
    }

    #[test]
    fn test_compose_strips_newlines_from_subject() {
        let mut e = entry();
        e.title = Some("line one\r\nline two".to_string());
        let message = compose("F", &e, at(0), "b", &PassthroughRender).unwrap();
        assert!(message.contains("Subject: line oneline two\n"));
    }

    #[test]
    fn test_compose_subject_falls_back_to_link() {
        let mut e = entry();
        e.title = None;
        let message = compose("F", &e, at(0), "b", &PassthroughRender).unwrap();
        assert!(message.contains("Subject: http://x"));
    }
}
