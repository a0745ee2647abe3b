//! Dictionary-coded tokens
//!
//! The data file is a flat array of little-endian `u32` codes; the text of
//! each token is the dictionary entry its code names. This is the layout
//! written by [`crate::codec::write_compressed`], so compressed output can be
//! indexed and searched like any other token file.

use super::stream::CharStream;
use super::{Encoding, TokenFile};
use crate::codec::{load_codec, validate_codec};
use crate::error::{Error, Result};
use crate::position::{ByteOffset, CharOffset, TokenOffset};
use crate::storage::{DataFile, FixedWidth};
use std::path::Path;
use std::sync::OnceLock;

const CODE_WIDTH: usize = <u32 as FixedWidth>::WIDTH;

pub struct CodedTokenFile {
    data: DataFile,
    codec: Vec<String>,
    token_count: u64,
    /// Cumulative character offset of each token, plus the total
    char_starts: OnceLock<Vec<u64>>,
}

impl CodedTokenFile {
    /// Open a code file with its dictionary. Every code is checked against
    /// the dictionary once, here.
    pub fn open(path: &Path, dictionary: &Path) -> Result<Self> {
        let codec = load_codec(dictionary)?;
        Self::with_codec(path, codec)
    }

    /// Open a code file against an in-memory codec
    pub fn with_codec(path: &Path, codec: Vec<String>) -> Result<Self> {
        validate_codec(&codec)?;
        let data = DataFile::open(path)?;
        let token_count = data.len().get() / CODE_WIDTH as u64;
        if token_count == 0 {
            return Err(Error::DataFileEmpty {
                path: path.to_path_buf(),
            });
        }
        let file = Self {
            data,
            codec,
            token_count,
            char_starts: OnceLock::new(),
        };
        for t in 0..token_count {
            let code = file.code_at(t as usize);
            if code as usize >= file.codec.len() {
                return Err(Error::CodeOutOfRange {
                    code,
                    codec_len: file.codec.len(),
                });
            }
        }
        Ok(file)
    }

    pub fn codec(&self) -> &[String] {
        &self.codec
    }

    #[inline]
    fn code_at(&self, t: usize) -> u32 {
        let offset = t * CODE_WIDTH;
        u32::read_le(&self.data.bytes()[offset..offset + CODE_WIDTH])
    }

    fn char_starts(&self) -> &[u64] {
        self.char_starts.get_or_init(|| {
            let mut starts = Vec::with_capacity(self.token_count as usize + 1);
            let mut total = 0u64;
            for t in 0..self.token_count as usize {
                starts.push(total);
                total += self.codec[self.code_at(t) as usize].chars().count() as u64;
            }
            starts.push(total);
            starts
        })
    }

    pub fn close(self) {
        self.data.close();
    }
}

impl TokenFile for CodedTokenFile {
    fn path(&self) -> &Path {
        self.data.path()
    }

    fn file_length(&self) -> ByteOffset {
        self.data.len()
    }

    fn token_count(&self) -> TokenOffset {
        TokenOffset(self.token_count)
    }

    fn char_count(&self) -> CharOffset {
        let starts = self.char_starts();
        CharOffset(starts[starts.len() - 1])
    }

    fn token_indices(&self) -> Box<dyn Iterator<Item = ByteOffset> + '_> {
        Box::new((0..self.token_count).map(|t| ByteOffset(t * CODE_WIDTH as u64)))
    }

    fn char_to_token(&self, position: CharOffset) -> TokenOffset {
        let c = position.wrap(self.char_count()).get();
        let starts = &self.char_starts()[..self.token_count as usize];
        TokenOffset((starts.partition_point(|s| *s <= c) - 1) as u64)
    }

    fn token_to_char(&self, position: TokenOffset) -> CharOffset {
        CharOffset(self.char_starts()[position.wrap(self.token_count()).as_usize()])
    }

    fn token_text(&self, position: TokenOffset) -> String {
        let t = position.wrap(self.token_count()).as_usize();
        self.codec[self.code_at(t) as usize].clone()
    }

    fn chars(&self, position: CharOffset) -> CharStream<'_> {
        let token = self.char_to_token(position);
        let skip = position.wrap(self.char_count()).get() - self.token_to_char(token).get();
        Box::new(
            self.tokens(token)
                .flat_map(|text| text.chars().collect::<Vec<_>>())
                .skip(skip as usize),
        )
    }

    fn read(&self, at: ByteOffset, buf: &mut [u8]) {
        self.data.read(at, buf);
    }

    fn encoding(&self) -> Encoding {
        Encoding::Utf8
    }
}
