//! Markup Escaping
//!
//! Escapes the five markup-significant characters: & < > " '
//!
//! Uses memchr to skip straight to each byte needing escaping, so text
//! without special characters is copied in a single write.

use memchr::{memchr2_iter, memchr3_iter};

#[inline]
fn entity(b: u8) -> &'static [u8] {
    match b {
        b'&' => b"&amp;",
        b'<' => b"&lt;",
        b'>' => b"&gt;",
        b'"' => b"&quot;",
        b'\'' => b"&#39;",
        _ => unreachable!("escape scanners only stop on markup bytes"),
    }
}

/// Append `input` to `buf`, escaping markup characters
///
/// Two forward-only scanners (`& < >` and `" '`) are merged in offset
/// order, so every byte is searched once.
pub fn escape_into(input: &str, buf: &mut Vec<u8>) {
    let bytes = input.as_bytes();
    let mut tags = memchr3_iter(b'&', b'<', b'>', bytes).peekable();
    let mut quotes = memchr2_iter(b'"', b'\'', bytes).peekable();
    let mut pos = 0;

    loop {
        let at = match (tags.peek().copied(), quotes.peek().copied()) {
            (Some(t), Some(q)) if q < t => quotes.next(),
            (Some(_), _) => tags.next(),
            (None, _) => quotes.next(),
        };
        let Some(at) = at else { break };

        if pos == 0 {
            // First escape: nothing written yet
            buf.reserve(bytes.len() + 8);
        }
        buf.extend_from_slice(&bytes[pos..at]);
        buf.extend_from_slice(entity(bytes[at]));
        pos = at + 1;
    }

    // Fast path ends here too: with nothing to escape this is one write
    buf.extend_from_slice(&bytes[pos..]);
}
