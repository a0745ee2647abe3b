//! Tokenized views over a data file
//!
//! A [`TokenFile`] decomposes a file into tokens and exposes them through
//! circular character and token streams. Four tokenizers are available:
//!
//! - `bytes`: one byte per token (Latin-1 text)
//! - `chars`: one decoded character per token
//! - `words`: alternating runs of blank and non-blank characters
//! - `coded`: one 4-byte dictionary code per token
//!
//! Reads never hit an end of file: positions past the end wrap around to
//! the start, and streams continue indefinitely.

pub mod bytes;
pub mod chars;
pub mod coded;
pub mod encoding;
pub mod stream;
pub mod words;

pub use bytes::ByteTokenFile;
pub use chars::CharTokenFile;
pub use coded::CodedTokenFile;
pub use encoding::Encoding;
pub use stream::{CharStream, DecodingStream, TokenStream};
pub use words::WordTokenFile;

use crate::error::{Error, Result};
use crate::position::{ByteOffset, CharOffset, TokenOffset};
use crate::utils::paths::dictionary_for_compressed;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Default look-ahead when decoding one character
pub const DEFAULT_MAX_CHAR_BYTES: usize = 4;

/// A data file seen as a circular sequence of tokens
pub trait TokenFile: Send + Sync {
    /// Path of the backing file
    fn path(&self) -> &Path;

    /// Length of the backing file in bytes
    fn file_length(&self) -> ByteOffset;

    /// Number of tokens in one period of the file
    fn token_count(&self) -> TokenOffset;

    /// Number of decoded characters in one period of the file
    fn char_count(&self) -> CharOffset;

    /// Byte offset at which each token starts, in token order
    fn token_indices(&self) -> Box<dyn Iterator<Item = ByteOffset> + '_>;

    /// Token containing the character at `position`
    fn char_to_token(&self, position: CharOffset) -> TokenOffset;

    /// Character offset of the first character of token `position`
    fn token_to_char(&self, position: TokenOffset) -> CharOffset;

    /// Decoded text of a single token
    fn token_text(&self, position: TokenOffset) -> String;

    /// Infinite character stream starting at `position`
    fn chars(&self, position: CharOffset) -> CharStream<'_>;

    /// Raw circular read of `buf.len()` bytes starting at `at`
    fn read(&self, at: ByteOffset, buf: &mut [u8]);

    /// Encoding used to turn token text back into bytes
    fn encoding(&self) -> Encoding;

    /// Infinite token stream starting at `position`
    fn tokens(&self, position: TokenOffset) -> TokenStream<'_> {
        let count = self.token_count();
        let start = position.wrap(count);
        Box::new(
            std::iter::successors(Some(start), move |p| Some(p.wrapping_add(1, count)))
                .map(move |p| self.token_text(p)),
        )
    }

    /// `n` characters starting `skip` characters after the start of token
    /// `position`, wrapping past the end of the file
    fn read_string(&self, position: TokenOffset, n: CharOffset, skip: CharOffset) -> Result<String> {
        if n.get() == 0 {
            return Err(Error::InvalidReadLength(n.get()));
        }
        let start = self
            .token_to_char(position)
            .wrapping_add(skip.get(), self.char_count());
        Ok(self.chars(start).take(n.as_usize()).collect())
    }
}

impl<T: TokenFile + ?Sized> TokenFile for Box<T> {
    fn path(&self) -> &Path {
        (**self).path()
    }

    fn file_length(&self) -> ByteOffset {
        (**self).file_length()
    }

    fn token_count(&self) -> TokenOffset {
        (**self).token_count()
    }

    fn char_count(&self) -> CharOffset {
        (**self).char_count()
    }

    fn token_indices(&self) -> Box<dyn Iterator<Item = ByteOffset> + '_> {
        (**self).token_indices()
    }

    fn char_to_token(&self, position: CharOffset) -> TokenOffset {
        (**self).char_to_token(position)
    }

    fn token_to_char(&self, position: TokenOffset) -> CharOffset {
        (**self).token_to_char(position)
    }

    fn token_text(&self, position: TokenOffset) -> String {
        (**self).token_text(position)
    }

    fn chars(&self, position: CharOffset) -> CharStream<'_> {
        (**self).chars(position)
    }

    fn read(&self, at: ByteOffset, buf: &mut [u8]) {
        (**self).read(at, buf)
    }

    fn encoding(&self) -> Encoding {
        (**self).encoding()
    }

    fn tokens(&self, position: TokenOffset) -> TokenStream<'_> {
        (**self).tokens(position)
    }

    fn read_string(&self, position: TokenOffset, n: CharOffset, skip: CharOffset) -> Result<String> {
        (**self).read_string(position, n, skip)
    }
}

/// Which tokenizer to put over a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenizerKind {
    Bytes,
    #[default]
    Chars,
    Words,
    Coded,
}

impl TokenizerKind {
    pub fn name(self) -> &'static str {
        match self {
            TokenizerKind::Bytes => "bytes",
            TokenizerKind::Chars => "chars",
            TokenizerKind::Words => "words",
            TokenizerKind::Coded => "coded",
        }
    }
}

impl FromStr for TokenizerKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "bytes" | "byte" => Ok(TokenizerKind::Bytes),
            "chars" | "char" => Ok(TokenizerKind::Chars),
            "words" | "word" => Ok(TokenizerKind::Words),
            "coded" | "compressed" => Ok(TokenizerKind::Coded),
            _ => Err(Error::UnknownTokenizer(s.to_string())),
        }
    }
}

impl fmt::Display for TokenizerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Options for [`open`]
#[derive(Debug, Clone)]
pub struct TokenFileOptions {
    pub encoding: Encoding,
    pub max_char_bytes: usize,
    /// Dictionary for `coded` files; `x.compressed` defaults to
    /// `x.dictionary`
    pub dictionary: Option<PathBuf>,
}

impl Default for TokenFileOptions {
    fn default() -> Self {
        Self {
            encoding: Encoding::Utf8,
            max_char_bytes: DEFAULT_MAX_CHAR_BYTES,
            dictionary: None,
        }
    }
}

/// Open `path` with the given tokenizer
pub fn open(path: &Path, kind: TokenizerKind, options: &TokenFileOptions) -> Result<Box<dyn TokenFile>> {
    Ok(match kind {
        TokenizerKind::Bytes => Box::new(ByteTokenFile::open(path)?),
        TokenizerKind::Chars => Box::new(CharTokenFile::open(
            path,
            options.encoding,
            options.max_char_bytes,
        )?),
        TokenizerKind::Words => Box::new(WordTokenFile::open(
            path,
            options.encoding,
            options.max_char_bytes,
        )?),
        TokenizerKind::Coded => {
            let dictionary = options
                .dictionary
                .clone()
                .unwrap_or_else(|| dictionary_for_compressed(path));
            Box::new(CodedTokenFile::open(path, &dictionary)?)
        }
    })
}
