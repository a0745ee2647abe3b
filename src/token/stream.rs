//! Infinite circular character and token streams
//!
//! Streams never end: after the last character or token of the file they
//! continue from the first one, so the document reads as a cycle. Callers
//! bound consumption with `take`.

use super::encoding::Encoding;

/// Infinite sequence of decoded characters
pub type CharStream<'a> = Box<dyn Iterator<Item = char> + Send + 'a>;

/// Infinite sequence of token texts
pub type TokenStream<'a> = Box<dyn Iterator<Item = String> + Send + 'a>;

/// Decodes characters from a byte buffer, wrapping to offset 0 at the end.
/// The decode window never extends past the end of the buffer, so a
/// character is never assembled from bytes on both sides of the wrap.
pub struct DecodingStream<'a> {
    data: &'a [u8],
    pos: usize,
    encoding: Encoding,
    max_char_bytes: usize,
}

impl<'a> DecodingStream<'a> {
    /// `data` must not be empty; `pos` is taken modulo its length
    pub fn new(data: &'a [u8], pos: usize, encoding: Encoding, max_char_bytes: usize) -> Self {
        Self {
            data,
            pos: pos % data.len(),
            encoding,
            max_char_bytes: max_char_bytes.max(1),
        }
    }
}

impl Iterator for DecodingStream<'_> {
    type Item = char;

    #[inline]
    fn next(&mut self) -> Option<char> {
        let end = (self.pos + self.max_char_bytes).min(self.data.len());
        let (c, width) = self.encoding.decode_char(&self.data[self.pos..end]);
        self.pos += width;
        if self.pos >= self.data.len() {
            self.pos = 0;
        }
        Some(c)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (usize::MAX, None)
    }
}
