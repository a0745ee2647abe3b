//! One decoded character per token

use super::stream::{CharStream, DecodingStream};
use super::{Encoding, TokenFile};
use crate::error::Result;
use crate::position::{ByteOffset, CharOffset, TokenOffset};
use crate::storage::DataFile;
use std::path::Path;
use std::sync::OnceLock;
use tracing::debug;

/// Token file where every decoded character is a token. The byte offset of
/// each character is recorded by a single scan on first use.
pub struct CharTokenFile {
    data: DataFile,
    encoding: Encoding,
    max_char_bytes: usize,
    starts: OnceLock<Vec<u32>>,
}

impl CharTokenFile {
    pub fn open(path: &Path, encoding: Encoding, max_char_bytes: usize) -> Result<Self> {
        Ok(Self {
            data: DataFile::open(path)?,
            encoding,
            max_char_bytes: max_char_bytes.max(1),
            starts: OnceLock::new(),
        })
    }

    /// Starting byte offset of every character
    fn starts(&self) -> &[u32] {
        self.starts.get_or_init(|| {
            let bytes = self.data.bytes();
            let mut starts = Vec::with_capacity(bytes.len());
            let mut pos = 0;
            while pos < bytes.len() {
                starts.push(pos as u32);
                let end = (pos + self.max_char_bytes).min(bytes.len());
                let (_, width) = self.encoding.decode_char(&bytes[pos..end]);
                pos += width;
            }
            debug!(
                path = %self.data.path().display(),
                chars = starts.len(),
                "scanned character offsets"
            );
            starts
        })
    }

    #[inline]
    fn start_of(&self, position: TokenOffset) -> usize {
        let starts = self.starts();
        starts[(position.get() % starts.len() as u64) as usize] as usize
    }

    pub fn close(self) {
        self.data.close();
    }
}

impl TokenFile for CharTokenFile {
    fn path(&self) -> &Path {
        self.data.path()
    }

    fn file_length(&self) -> ByteOffset {
        self.data.len()
    }

    fn token_count(&self) -> TokenOffset {
        TokenOffset(self.starts().len() as u64)
    }

    fn char_count(&self) -> CharOffset {
        CharOffset(self.starts().len() as u64)
    }

    fn token_indices(&self) -> Box<dyn Iterator<Item = ByteOffset> + '_> {
        Box::new(self.starts().iter().map(|s| ByteOffset(*s as u64)))
    }

    fn char_to_token(&self, position: CharOffset) -> TokenOffset {
        TokenOffset(position.get()).wrap(self.token_count())
    }

    fn token_to_char(&self, position: TokenOffset) -> CharOffset {
        CharOffset(position.get()).wrap(self.char_count())
    }

    fn token_text(&self, position: TokenOffset) -> String {
        self.chars(CharOffset(position.get())).next().map(String::from).unwrap_or_default()
    }

    fn chars(&self, position: CharOffset) -> CharStream<'_> {
        let start = self.start_of(TokenOffset(position.get()));
        Box::new(DecodingStream::new(
            self.data.bytes(),
            start,
            self.encoding,
            self.max_char_bytes,
        ))
    }

    fn read(&self, at: ByteOffset, buf: &mut [u8]) {
        self.data.read(at, buf);
    }

    fn encoding(&self) -> Encoding {
        self.encoding
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn char_file(content: &str, encoding: Encoding) -> (tempfile::TempDir, CharTokenFile) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.txt");
        std::fs::write(&path, content.as_bytes()).unwrap();
        let file = CharTokenFile::open(&path, encoding, 4).unwrap();
        (dir, file)
    }

    #[test]
    fn test_multibyte_offsets() {
        let (_dir, file) = char_file("aé世b", Encoding::Utf8);
        assert_eq!(file.token_count(), TokenOffset(4));
        assert_eq!(file.file_length(), ByteOffset(7));
        let indices: Vec<_> = file.token_indices().map(|b| b.get()).collect();
        assert_eq!(indices, vec![0, 1, 3, 6]);
        assert_eq!(file.token_text(TokenOffset(2)), "世");
    }

    #[test]
    fn test_read_string_wraps_across_multibyte() {
        let (_dir, file) = char_file("aé世b", Encoding::Utf8);
        let s = file.read_string(TokenOffset(2), CharOffset(4), CharOffset::ZERO).unwrap();
        assert_eq!(s, "世baé");
        let s = file.read_string(TokenOffset(0), CharOffset(2), CharOffset(3)).unwrap();
        assert_eq!(s, "ba");
    }

    #[test]
    fn test_latin1_reads_bytes_as_chars() {
        let (_dir, file) = char_file("é", Encoding::Latin1);
        // Two UTF-8 bytes are two Latin-1 characters
        assert_eq!(file.token_count(), TokenOffset(2));
    }

    #[test]
    fn test_invalid_byte_is_replacement() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.txt");
        std::fs::write(&path, [b'a', 0xFF, b'b']).unwrap();
        let file = CharTokenFile::open(&path, Encoding::Utf8, 4).unwrap();
        assert_eq!(file.token_count(), TokenOffset(3));
        assert_eq!(file.token_text(TokenOffset(1)), "\u{FFFD}");
    }

    #[test]
    fn test_periodic_stream() {
        let (_dir, file) = char_file("ab", Encoding::Utf8);
        let s: String = file.chars(CharOffset(1)).take(5).collect();
        assert_eq!(s, "babab");
    }
}
