//! Names of the files derived from a data file
//!
//! Every derived file sits next to its data file with an extra suffix, so
//! `corpus.txt` gets `corpus.txt.index`, `corpus.txt.compressed` and so on.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}

/// `<data>.index`
pub fn index_path(data: &Path) -> PathBuf {
    with_suffix(data, "index")
}

/// `<data>.compressed`
pub fn compressed_path(data: &Path) -> PathBuf {
    with_suffix(data, "compressed")
}

/// `<data>.dictionary`
pub fn dictionary_path(data: &Path) -> PathBuf {
    with_suffix(data, "dictionary")
}

/// `<data>.expand`
pub fn expanded_path(data: &Path) -> PathBuf {
    with_suffix(data, "expand")
}

/// Data file a compressed file was made from: `x.compressed` came from
/// `x`. Files without the extension stand for themselves.
pub fn data_for_compressed(compressed: &Path) -> PathBuf {
    match compressed.extension() {
        Some(ext) if ext == "compressed" => compressed.with_extension(""),
        _ => compressed.to_path_buf(),
    }
}

/// Dictionary that belongs to a compressed file: `x.compressed` pairs with
/// `x.dictionary`
pub fn dictionary_for_compressed(compressed: &Path) -> PathBuf {
    dictionary_path(&data_for_compressed(compressed))
}

/// Default output when expanding a compressed file: `x.compressed`
/// expands to `x.expand`
pub fn expanded_for_compressed(compressed: &Path) -> PathBuf {
    expanded_path(&data_for_compressed(compressed))
}
