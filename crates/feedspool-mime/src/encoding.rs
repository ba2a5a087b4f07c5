//! Body and header encoders.
//!
//! Generation side only: Quoted-Printable bodies (RFC 2045) and
//! encoded-word headers (RFC 2047).

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::fmt::Write as _;

/// Soft-wrap limit for Quoted-Printable output lines.
const QP_LINE_LIMIT: usize = 76;

/// Encodes raw bytes as Base64 (single line, no wrapping).
#[must_use]
pub fn base64(data: &[u8]) -> String {
    STANDARD.encode(data)
}

/// Encodes text as Quoted-Printable (RFC 2045).
///
/// Every byte outside printable ASCII is escaped, including CR and LF, so
/// the result is a valid transfer-encoded body regardless of the input's
/// line structure. Soft breaks (`=\n`) keep lines under the RFC limit.
#[must_use]
pub fn quoted_printable(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut column = 0;

    for byte in text.as_bytes() {
        if column >= QP_LINE_LIMIT - 3 {
            out.push_str("=\n");
            column = 0;
        }

        match byte {
            // Printable ASCII except '='
            b'!'..=b'<' | b'>'..=b'~' => {
                out.push(char::from(*byte));
                column += 1;
            }
            b' ' => {
                // A space at the wrap point must be escaped so it cannot
                // end up trailing on an output line.
                if column >= QP_LINE_LIMIT - 4 {
                    out.push_str("=20");
                    column += 3;
                } else {
                    out.push(' ');
                    column += 1;
                }
            }
            _ => {
                let _ = write!(out, "={byte:02X}");
                column += 3;
            }
        }
    }

    out
}

/// Encodes a header value as an RFC 2047 encoded word when needed.
///
/// Pure-ASCII values without encoded-word metacharacters pass through
/// unchanged; anything else becomes a single `=?utf-8?B?...?=` word.
#[must_use]
pub fn header_word(text: &str) -> String {
    let plain = text
        .chars()
        .all(|c| c.is_ascii() && !c.is_ascii_control() && c != '=' && c != '?');
    if plain {
        return text.to_string();
    }

    format!("=?utf-8?B?{}?=", base64(text.as_bytes()))
}
