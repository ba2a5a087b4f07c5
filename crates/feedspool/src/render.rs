//! Collaborator implementations: HTML-to-plaintext rendering and HTML
//! body diffing.

use feedspool_core::{DiffHtml, RenderText};
use similar::{ChangeTag, TextDiff};
use std::fmt::Write as _;

/// Width the plaintext alternative is wrapped to.
const TEXT_WIDTH: usize = 80;

/// html2text-backed plaintext renderer.
#[derive(Debug, Default)]
pub struct TextRenderer;

impl RenderText for TextRenderer {
    fn render(&self, html: &str) -> String {
        // On pathological markup fall back to the raw fragment; a rough
        // plaintext part beats losing the message.
        html2text::from_read(html.as_bytes(), TEXT_WIDTH)
    }
}

/// Word-level diff rendered as HTML with `<del>`/`<ins>` inline markup.
#[derive(Debug, Default)]
pub struct InlineHtmlDiff;

impl DiffHtml for InlineHtmlDiff {
    fn diff(&self, old: &str, new: &str) -> String {
        let diff = TextDiff::from_words(old, new);
        let mut out = String::with_capacity(new.len());
        for change in diff.iter_all_changes() {
            let value = change.value();
            match change.tag() {
                ChangeTag::Delete => {
                    let _ = write!(out, "<del>{value}</del>");
                }
                ChangeTag::Insert => {
                    let _ = write!(out, "<ins>{value}</ins>");
                }
                ChangeTag::Equal => out.push_str(value),
            }
        }
        out
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_render_produces_plain_text() {
        let text = TextRenderer.render("<p>Hello <b>world</b></p>");
        assert!(text.contains("Hello"));
        assert!(text.contains("world"));
        assert!(!text.contains("<p>"));
    }

    #[test]
    fn test_diff_marks_insertions_and_deletions() {
        let diffed = InlineHtmlDiff.diff("the quick fox", "the slow fox");
        assert!(diffed.contains("<del>quick</del>"));
        assert!(diffed.contains("<ins>slow</ins>"));
        assert!(diffed.starts_with("the "));
        assert!(diffed.ends_with("fox"));
    }

    #[test]
    fn test_diff_of_identical_input_is_identity() {
        assert_eq!(InlineHtmlDiff.diff("same", "same"), "same");
    }
}
