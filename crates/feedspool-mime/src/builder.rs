//! Message builder.

use crate::content_type::ContentType;
use crate::encoding::{header_word, quoted_printable};
use crate::error::{Error, Result};
use crate::header::Headers;
use sha2::{Digest, Sha256};
use std::fmt::Write as _;

/// Builds a feed-mail message: top headers plus a plaintext and/or HTML
/// body, serialized as `multipart/alternative` when both are present.
///
/// Bodies are transfer-encoded as quoted-printable. The multipart
/// boundary is derived from the body content, so identical inputs always
/// produce identical bytes.
#[derive(Debug, Clone, Default)]
pub struct MessageBuilder {
    sender_name: Option<String>,
    subject: Option<String>,
    date: Option<String>,
    text: Option<String>,
    html: Option<String>,
}

impl MessageBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the `From` display name. The generated header carries only a
    /// display name and an empty angle-addr; feed mail has no real
    /// originator mailbox.
    #[must_use]
    pub fn sender_name(mut self, name: impl Into<String>) -> Self {
        self.sender_name = Some(name.into());
        self
    }

    /// Sets the subject. Raw text; RFC 2047 encoding is applied on build.
    #[must_use]
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Sets the preformatted `Date` header value.
    #[must_use]
    pub fn date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    /// Sets the plaintext body part.
    #[must_use]
    pub fn text_body(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Sets the HTML body part.
    #[must_use]
    pub fn html_body(mut self, html: impl Into<String>) -> Self {
        self.html = Some(html.into());
        self
    }

    /// Serializes the message.
    ///
    /// # Errors
    ///
    /// Returns an error if sender, subject, or date is missing, if no
    /// body part was supplied, or if an encoded header still carries a
    /// line break.
    pub fn build(self) -> Result<String> {
        let sender = self.sender_name.ok_or(Error::MissingField("sender_name"))?;
        let subject = self.subject.ok_or(Error::MissingField("subject"))?;
        let date = self.date.ok_or(Error::MissingField("date"))?;

        let mut headers = Headers::new();
        headers.push("From", format!("{} <>", header_word(&sender)))?;
        headers.push("Date", date)?;
        headers.push("Subject", header_word(&subject))?;
        headers.push("MIME-Version", "1.0")?;

        let mut out = String::new();
        match (self.text, self.html) {
            (Some(text), Some(html)) => {
                let boundary = derive_boundary(&text, &html);
                headers.push(
                    "Content-Type",
                    ContentType::multipart_alternative(&boundary).to_string(),
                )?;
                let _ = writeln!(out, "{headers}");
                write_part(&mut out, &boundary, &ContentType::text_plain(), &text);
                write_part(&mut out, &boundary, &ContentType::text_html(), &html);
                let _ = writeln!(out, "--{boundary}--");
            }
            (Some(text), None) => {
                write_single(&mut out, headers, &ContentType::text_plain(), &text)?;
            }
            (None, Some(html)) => {
                write_single(&mut out, headers, &ContentType::text_html(), &html)?;
            }
            (None, None) => return Err(Error::EmptyBody),
        }

        Ok(out)
    }
}

/// Boundary derived from the body content. Deterministic, and long enough
/// that a collision with body text is not a practical concern.
fn derive_boundary(text: &str, html: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hasher.update([0]);
    hasher.update(html.as_bytes());
    let digest = hasher.finalize();
    let mut hex = String::with_capacity(24);
    for byte in &digest[..12] {
        let _ = write!(hex, "{byte:02x}");
    }
    format!("=_{hex}")
}

fn write_part(out: &mut String, boundary: &str, content_type: &ContentType, body: &str) {
    let _ = writeln!(
        out,
        "--{boundary}\nContent-Type: {content_type}\nContent-Transfer-Encoding: quoted-printable\n\n{}",
        quoted_printable(body)
    );
}

fn write_single(
    out: &mut String,
    mut headers: Headers,
    content_type: &ContentType,
    body: &str,
) -> Result<()> {
    headers.push("Content-Type", content_type.to_string())?;
    headers.push("Content-Transfer-Encoding", "quoted-printable")?;
    let _ = writeln!(out, "{headers}\n{}", quoted_printable(body));
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn builder() -> MessageBuilder {
        MessageBuilder::new()
            .sender_name("Example Feed")
            .subject("An article")
            .date("Mon, 06 Jul 2026 10:00:00 +0000")
    }

    #[test]
    fn test_multipart_alternative_layout() {
        let message = builder()
            .text_body("plain")
            .html_body("<p>html</p>")
            .build()
            .unwrap();

        assert!(message.starts_with("From: Example Feed <>\n"));
        assert!(message.contains("Date: Mon, 06 Jul 2026 10:00:00 +0000\n"));
        assert!(message.contains("Subject: An article\n"));
        assert!(message.contains("MIME-Version: 1.0\n"));
        assert!(message.contains("Content-Type: multipart/alternative; boundary="));
        assert!(message.contains("Content-Type: text/plain; charset=utf-8"));
        assert!(message.contains("Content-Type: text/html; charset=utf-8"));
        assert!(message.trim_end().ends_with("--"));
    }

    #[test]
    fn test_deterministic_output() {
        let a = builder().text_body("t").html_body("<p>h</p>").build().unwrap();
        let b = builder().text_body("t").html_body("<p>h</p>").build().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_boundary_varies_with_content() {
        let a = builder().text_body("t1").html_body("h").build().unwrap();
        let b = builder().text_body("t2").html_body("h").build().unwrap();
        let boundary = |m: &str| {
            m.lines()
                .find(|l| l.starts_with("Content-Type: multipart"))
                .unwrap()
                .to_string()
        };
        assert_ne!(boundary(&a), boundary(&b));
    }

    #[test]
    fn test_unicode_subject_is_encoded() {
        let message = builder()
            .subject("Übersicht")
            .text_body("t")
            .build()
            .unwrap();
        let subject = message
            .lines()
            .find(|l| l.starts_with("Subject: "))
            .unwrap();
        assert!(subject.contains("=?utf-8?B?"));
    }

    #[test]
    fn test_single_part_has_no_boundary() {
        let message = builder().html_body("<p>h</p>").build().unwrap();
        assert!(message.contains("Content-Type: text/html; charset=utf-8"));
        assert!(!message.contains("multipart"));
    }

    #[test]
    fn test_missing_fields_rejected() {
        let err = MessageBuilder::new().text_body("t").build();
        assert!(err.is_err());

        let err = builder().build();
        assert!(matches!(err, Err(Error::EmptyBody)));
    }

    #[test]
    fn test_unicode_body_survives_quoted_printable() {
        let message = builder().text_body("Héllo — Wørld").build().unwrap();
        assert!(message.contains("H=C3=A9llo"));
    }
}
