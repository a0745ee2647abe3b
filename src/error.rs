//! Error types for token files, indexes and dictionary coding.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("data file empty: {}", path.display())]
    DataFileEmpty { path: PathBuf },

    #[error("data file too large: {} ({length} bytes, limit {limit})", path.display())]
    DataFileTooLarge {
        path: PathBuf,
        length: u64,
        limit: u64,
    },

    #[error("invalid read length: {0}")]
    InvalidReadLength(u64),

    #[error("index length {index_length} does not match token count {token_count}")]
    IndexLengthMismatch { index_length: u64, token_count: u64 },

    #[error("element {index} out of range for array of length {length}")]
    IndexOutOfRange { index: u64, length: u64 },

    /// Bucket sizes did not add up to the range being populated. This is a
    /// builder defect, never a property of the data.
    #[error("bucket sizes sum to {actual} for a range of {expected} slots")]
    BucketSizeMismatch { expected: u64, actual: u64 },

    #[error("no codec entry covers token {position} (\"{upcoming}\")")]
    NoCoveringPrefix { position: u64, upcoming: String },

    #[error("code {code} out of range for codec of {codec_len} entries")]
    CodeOutOfRange { code: u32, codec_len: usize },

    #[error("invalid codec: {0}")]
    InvalidCodec(String),

    #[error("unsupported encoding: {0}")]
    UnsupportedEncoding(String),

    #[error("unknown tokenizer: {0}")]
    UnknownTokenizer(String),
}

pub type Result<T> = std::result::Result<T, Error>;
