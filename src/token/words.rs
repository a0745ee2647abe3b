//! Alternating blank / non-blank runs as tokens

use super::stream::{CharStream, DecodingStream};
use super::{Encoding, TokenFile};
use crate::error::Result;
use crate::position::{ByteOffset, CharOffset, TokenOffset};
use crate::storage::DataFile;
use std::path::Path;
use std::sync::OnceLock;
use tracing::debug;

/// Token boundaries found by one scan of the file
struct WordLayout {
    /// Byte offset of the first byte of each token
    byte_starts: Vec<u32>,
    /// Character offset of the first character of each token
    char_starts: Vec<u64>,
    char_count: u64,
}

/// Token file whose tokens are maximal runs of whitespace and maximal runs
/// of everything else, so `"Hello world"` is `"Hello"`, `" "`, `"world"`.
///
/// Offset 0 always starts a token: a run that touches both ends of the file
/// is two tokens, not one merged across the wrap.
pub struct WordTokenFile {
    data: DataFile,
    encoding: Encoding,
    max_char_bytes: usize,
    layout: OnceLock<WordLayout>,
}

impl WordTokenFile {
    pub fn open(path: &Path, encoding: Encoding, max_char_bytes: usize) -> Result<Self> {
        Ok(Self {
            data: DataFile::open(path)?,
            encoding,
            max_char_bytes: max_char_bytes.max(1),
            layout: OnceLock::new(),
        })
    }

    fn layout(&self) -> &WordLayout {
        self.layout.get_or_init(|| {
            let bytes = self.data.bytes();
            let mut byte_starts = Vec::new();
            let mut char_starts = Vec::new();
            let mut previous_blank = None;
            let mut pos = 0;
            let mut chars = 0u64;
            while pos < bytes.len() {
                let end = (pos + self.max_char_bytes).min(bytes.len());
                let (c, width) = self.encoding.decode_char(&bytes[pos..end]);
                let blank = c.is_whitespace();
                if previous_blank != Some(blank) {
                    byte_starts.push(pos as u32);
                    char_starts.push(chars);
                    previous_blank = Some(blank);
                }
                pos += width;
                chars += 1;
            }
            debug!(
                path = %self.data.path().display(),
                tokens = byte_starts.len(),
                chars,
                "scanned word boundaries"
            );
            WordLayout {
                byte_starts,
                char_starts,
                char_count: chars,
            }
        })
    }

    #[inline]
    fn token_index(&self, position: TokenOffset) -> usize {
        position.wrap(self.token_count()).as_usize()
    }

    pub fn close(self) {
        self.data.close();
    }
}

impl TokenFile for WordTokenFile {
    fn path(&self) -> &Path {
        self.data.path()
    }

    fn file_length(&self) -> ByteOffset {
        self.data.len()
    }

    fn token_count(&self) -> TokenOffset {
        TokenOffset(self.layout().byte_starts.len() as u64)
    }

    fn char_count(&self) -> CharOffset {
        CharOffset(self.layout().char_count)
    }

    fn token_indices(&self) -> Box<dyn Iterator<Item = ByteOffset> + '_> {
        Box::new(self.layout().byte_starts.iter().map(|s| ByteOffset(*s as u64)))
    }

    fn char_to_token(&self, position: CharOffset) -> TokenOffset {
        let c = position.wrap(self.char_count()).get();
        let starts = &self.layout().char_starts;
        // char_starts[0] is always 0, so the partition point is at least 1
        TokenOffset((starts.partition_point(|s| *s <= c) - 1) as u64)
    }

    fn token_to_char(&self, position: TokenOffset) -> CharOffset {
        CharOffset(self.layout().char_starts[self.token_index(position)])
    }

    fn token_text(&self, position: TokenOffset) -> String {
        let layout = self.layout();
        let t = self.token_index(position);
        let start = layout.byte_starts[t] as usize;
        let end = layout
            .byte_starts
            .get(t + 1)
            .map(|e| *e as usize)
            .unwrap_or(self.data.bytes().len());
        self.encoding
            .decode(&self.data.bytes()[start..end], self.max_char_bytes)
    }

    fn chars(&self, position: CharOffset) -> CharStream<'_> {
        let token = self.char_to_token(position);
        let t = token.as_usize();
        let layout = self.layout();
        let skip = position.wrap(self.char_count()).get() - layout.char_starts[t];
        Box::new(
            DecodingStream::new(
                self.data.bytes(),
                layout.byte_starts[t] as usize,
                self.encoding,
                self.max_char_bytes,
            )
            .skip(skip as usize),
        )
    }

    fn read(&self, at: ByteOffset, buf: &mut [u8]) {
        self.data.read(at, buf);
    }

    fn encoding(&self) -> Encoding {
        self.encoding
    }
}
