//! # tokidx - Circular Token-File Indexing
//!
//! tokidx treats a file as a circular sequence of tokens, builds a sorted
//! position index over it, and uses that index for substring search and for
//! mining a dictionary that compresses the file into 4-byte codes.
//!
//! ## Architecture
//!
//! - [`position`] - Typed byte, character, token and element offsets
//! - [`storage`] - Memory-mapped arrays, record stores and data files
//! - [`token`] - Tokenizers (bytes, chars, words, dictionary codes)
//! - [`index`] - Index building, search and prefix mining
//! - [`codec`] - Dictionary compression and expansion
//! - [`config`] - User configuration
//! - [`output`] - Terminal formatting
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::path::Path;
//! use tokidx::index::FileIndexer;
//! use tokidx::token::{self, TokenFileOptions, TokenizerKind};
//!
//! let data = Path::new("corpus.txt");
//! let file = token::open(data, TokenizerKind::Chars, &TokenFileOptions::default())?;
//! let mut indexer = FileIndexer::create(file, &tokidx::utils::index_path(data))?;
//! indexer.build_index(2)?;
//!
//! for position in indexer.find("needle")? {
//!     println!("{}", position);
//! }
//!
//! let codec = indexer.build_codec(200, 256)?;
//! tokidx::codec::write_compressed(indexer.token_file(), &codec)?;
//! # Ok::<(), tokidx::Error>(())
//! ```

pub mod codec;
pub mod config;
pub mod error;
pub mod index;
pub mod output;
pub mod position;
pub mod storage;
pub mod token;
pub mod utils;

pub use error::{Error, Result};
pub use index::{Candidate, FileIndexer};
pub use position::{ByteOffset, CharOffset, ElementOffset, TokenOffset};
pub use token::{TokenFile, TokenizerKind};
