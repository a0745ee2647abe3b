//! One byte per token

use super::stream::CharStream;
use super::{Encoding, TokenFile};
use crate::error::Result;
use crate::position::{ByteOffset, CharOffset, TokenOffset};
use crate::storage::DataFile;
use std::path::Path;

/// Token file where token `i` is byte `i` of the data file. The text of a
/// token is the Latin-1 character with the byte's value, so every byte
/// round-trips through text and back.
pub struct ByteTokenFile {
    data: DataFile,
}

impl ByteTokenFile {
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self {
            data: DataFile::open(path)?,
        })
    }

    #[inline]
    fn byte_at(&self, position: TokenOffset) -> u8 {
        let bytes = self.data.bytes();
        bytes[(position.get() % bytes.len() as u64) as usize]
    }

    pub fn close(self) {
        self.data.close();
    }
}

impl TokenFile for ByteTokenFile {
    fn path(&self) -> &Path {
        self.data.path()
    }

    fn file_length(&self) -> ByteOffset {
        self.data.len()
    }

    fn token_count(&self) -> TokenOffset {
        TokenOffset(self.data.len().get())
    }

    fn char_count(&self) -> CharOffset {
        CharOffset(self.data.len().get())
    }

    fn token_indices(&self) -> Box<dyn Iterator<Item = ByteOffset> + '_> {
        Box::new(ByteOffset::ZERO.range_to(self.data.len()))
    }

    fn char_to_token(&self, position: CharOffset) -> TokenOffset {
        TokenOffset(position.get()).wrap(self.token_count())
    }

    fn token_to_char(&self, position: TokenOffset) -> CharOffset {
        CharOffset(position.get()).wrap(self.char_count())
    }

    fn token_text(&self, position: TokenOffset) -> String {
        (self.byte_at(position) as char).to_string()
    }

    fn chars(&self, position: CharOffset) -> CharStream<'_> {
        let bytes = self.data.bytes();
        let start = position.wrap(self.char_count()).as_usize();
        Box::new(bytes[start..].iter().chain(bytes[..start].iter()).cycle().map(|b| *b as char))
    }

    fn read(&self, at: ByteOffset, buf: &mut [u8]) {
        self.data.read(at, buf);
    }

    fn encoding(&self) -> Encoding {
        Encoding::Latin1
    }
}
