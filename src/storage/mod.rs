//! File-backed storage primitives
//!
//! - `mapped`: fixed-width little-endian arrays (index and code files)
//! - `records`: length-prefixed variable-length records (dictionaries)
//! - `data_file`: read-only circular view of a raw data file

pub mod data_file;
pub mod mapped;
pub mod records;

pub use data_file::{DataFile, MAX_DATA_FILE_LEN};
pub use mapped::{CodeArray, FixedWidth, MappedArray, PositionArray};
pub use records::RecordStore;
