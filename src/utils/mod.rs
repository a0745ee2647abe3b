//! Shared helpers
//!
//! - [`paths`] - Names of the files derived from a data file
//! - [`progress`] - Progress bars, no-op without the `progress` feature

pub mod paths;
pub mod progress;

pub use paths::*;
