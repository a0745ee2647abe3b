//! Sorted position index over a token file
//!
//! The index is a flat array of `u64` token positions, one per token, in
//! the order of the circular text that starts at each position. It supports
//! substring search and mining of frequent prefixes for dictionary coding.
//!
//! - [`builder`]: bucket-refinement construction
//! - [`search`]: binary search for every occurrence of a string
//! - [`miner`]: compression-prefix discovery and codec assembly

pub mod builder;
pub mod miner;
pub mod search;

pub use builder::{FileIndexer, BUCKET_REFINE_THRESHOLD, MAX_SORT_DEPTH, PARALLEL_SORT_THRESHOLD};
pub use miner::{Candidate, MAX_COMMON_PREFIX_TOKENS};
