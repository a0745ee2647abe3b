//! Character encodings understood by the char and word tokenizers

use crate::error::{Error, Result};
use std::char::REPLACEMENT_CHARACTER;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    #[default]
    Utf8,
    /// ISO-8859-1: every byte is the code point of the same value
    Latin1,
    /// US-ASCII: bytes above 0x7F decode to U+FFFD
    Ascii,
}

impl Encoding {
    /// Resolve an encoding by name ("UTF-8", "ISO-8859-1", "latin1", "US-ASCII", ...)
    pub fn from_name(name: &str) -> Result<Self> {
        let normalized: String = name
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match normalized.as_str() {
            "utf8" => Ok(Encoding::Utf8),
            "iso88591" | "latin1" | "l1" => Ok(Encoding::Latin1),
            "usascii" | "ascii" => Ok(Encoding::Ascii),
            _ => Err(Error::UnsupportedEncoding(name.to_string())),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Encoding::Utf8 => "UTF-8",
            Encoding::Latin1 => "ISO-8859-1",
            Encoding::Ascii => "US-ASCII",
        }
    }

    /// Widest encoded character in bytes
    pub fn max_char_bytes(self) -> usize {
        match self {
            Encoding::Utf8 => 4,
            Encoding::Latin1 | Encoding::Ascii => 1,
        }
    }

    /// Decode the first character of `window`, returning it with its encoded
    /// width. Bytes that do not start a valid character decode to U+FFFD and
    /// occupy one byte. `window` must not be empty.
    #[inline]
    pub fn decode_char(self, window: &[u8]) -> (char, usize) {
        let first = window[0];
        match self {
            Encoding::Latin1 => (first as char, 1),
            Encoding::Ascii if first < 0x80 => (first as char, 1),
            Encoding::Ascii => (REPLACEMENT_CHARACTER, 1),
            Encoding::Utf8 => {
                let width = utf8_width(first);
                if width == 0 || width > window.len() {
                    return (REPLACEMENT_CHARACTER, 1);
                }
                match std::str::from_utf8(&window[..width]) {
                    Ok(s) => s
                        .chars()
                        .next()
                        .map(|c| (c, width))
                        .unwrap_or((REPLACEMENT_CHARACTER, 1)),
                    Err(_) => (REPLACEMENT_CHARACTER, 1),
                }
            }
        }
    }

    /// Decode a whole byte range, looking at most `max_char_bytes` ahead per character
    pub fn decode(self, bytes: &[u8], max_char_bytes: usize) -> String {
        let mut out = String::with_capacity(bytes.len());
        let mut pos = 0;
        while pos < bytes.len() {
            let end = (pos + max_char_bytes.max(1)).min(bytes.len());
            let (c, width) = self.decode_char(&bytes[pos..end]);
            out.push(c);
            pos += width;
        }
        out
    }

    /// Encode `text`, substituting `?` for characters the encoding cannot hold
    pub fn encode(self, text: &str, out: &mut Vec<u8>) {
        match self {
            Encoding::Utf8 => out.extend_from_slice(text.as_bytes()),
            Encoding::Latin1 => out.extend(text.chars().map(|c| {
                let code = c as u32;
                if code <= 0xFF { code as u8 } else { b'?' }
            })),
            Encoding::Ascii => out.extend(text.chars().map(|c| {
                if c.is_ascii() { c as u8 } else { b'?' }
            })),
        }
    }
}

impl FromStr for Encoding {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Encoding::from_name(s)
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Encoded width implied by a UTF-8 lead byte, 0 for bytes that cannot lead
#[inline]
fn utf8_width(lead: u8) -> usize {
    match lead {
        0x00..=0x7F => 1,
        0xC2..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF4 => 4,
        _ => 0,
    }
}
