//! Dictionary coding
//!
//! A codec is an ordered, duplicate-free list of strings; the code of an
//! entry is its position in the list. Codecs are persisted as record stores
//! (one UTF-8 record per entry) and compressed data as a flat array of
//! little-endian `u32` codes.

pub mod coder;
pub mod trie;

pub use coder::{expand, write_compressed};
pub use trie::PrefixTrie;

use crate::error::{Error, Result};
use crate::storage::RecordStore;
use rustc_hash::FxHashSet;
use std::path::Path;

/// Reject codecs that cannot be used for coding: no entries, an empty
/// entry, or the same entry twice
pub fn validate_codec(codec: &[String]) -> Result<()> {
    if codec.is_empty() {
        return Err(Error::InvalidCodec("codec has no entries".to_string()));
    }
    if u32::try_from(codec.len()).is_err() {
        return Err(Error::InvalidCodec(format!(
            "codec has {} entries, more than a u32 code can address",
            codec.len()
        )));
    }
    let mut seen = FxHashSet::default();
    for (i, entry) in codec.iter().enumerate() {
        if entry.is_empty() {
            return Err(Error::InvalidCodec(format!("entry {} is empty", i)));
        }
        if !seen.insert(entry.as_str()) {
            return Err(Error::InvalidCodec(format!("duplicate entry {:?}", entry)));
        }
    }
    Ok(())
}

/// Read a codec from a dictionary record store
pub fn load_codec(path: &Path) -> Result<Vec<String>> {
    // Fail on a missing dictionary instead of creating an empty one
    std::fs::metadata(path)?;
    let mut store = RecordStore::open(path)?;
    let codec = store
        .read_all()?
        .into_iter()
        .enumerate()
        .map(|(i, bytes)| {
            String::from_utf8(bytes)
                .map_err(|_| Error::InvalidCodec(format!("entry {} is not valid UTF-8", i)))
        })
        .collect::<Result<Vec<_>>>()?;
    store.close()?;
    validate_codec(&codec)?;
    Ok(codec)
}

/// Write a codec as a fresh dictionary record store
pub fn save_codec(codec: &[String], path: &Path) -> Result<()> {
    let mut store = RecordStore::create(path)?;
    for (i, entry) in codec.iter().enumerate() {
        let index = store.append(entry.as_bytes())?;
        if index.as_usize() != i {
            return Err(Error::InvalidCodec(format!(
                "entry {:?} stored at {} instead of {}",
                entry, index, i
            )));
        }
    }
    store.close()
}
