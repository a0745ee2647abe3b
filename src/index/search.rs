//! Substring search over a built index
//!
//! The index is ordered by the first [`resolved_depth`] characters of each
//! position, so the binary search runs on at most that many characters of
//! the query. Longer queries are checked in full against every member of
//! the matching block.
//!
//! [`resolved_depth`]: FileIndexer::resolved_depth

use super::builder::FileIndexer;
use crate::error::Result;
use crate::position::{CharOffset, TokenOffset};
use crate::token::TokenFile;
use std::cmp::Ordering;
use tracing::debug;

impl<F: TokenFile> FileIndexer<F> {
    /// Every token position whose text starts with `query`, ascending.
    /// An empty query matches nothing.
    pub fn find(&self, query: &str) -> Result<Vec<TokenOffset>> {
        let Some((lo, hi)) = self.matching_block(query)? else {
            debug!(query, hits = 0, "find");
            return Ok(Vec::new());
        };
        let query_chars = query.chars().count() as u64;
        let exact = query_chars <= self.resolved_depth();

        let mut positions = Vec::with_capacity((hi - lo) as usize);
        for slot in lo..hi {
            let position = self.position_at(slot)?;
            if exact || self.window(position, query_chars)? == query {
                positions.push(position);
            }
        }
        positions.sort_unstable();
        debug!(query, hits = positions.len(), "find");
        Ok(positions)
    }

    /// Number of positions [`find`](Self::find) would return
    pub fn count(&self, query: &str) -> Result<u64> {
        if query.chars().count() as u64 > self.resolved_depth() {
            return Ok(self.find(query)?.len() as u64);
        }
        Ok(self.matching_block(query)?.map_or(0, |(lo, hi)| hi - lo))
    }

    pub fn contains(&self, query: &str) -> Result<bool> {
        Ok(self.count(query)? > 0)
    }

    /// Slots `lo..hi` whose text starts with the part of `query` the index
    /// is ordered by: binary search for one hit, then walk outwards while
    /// neighbours still match
    fn matching_block(&self, query: &str) -> Result<Option<(u64, u64)>> {
        if query.is_empty() {
            return Ok(None);
        }
        let depth = self.resolved_depth() as usize;
        let prefix = query
            .char_indices()
            .nth(depth)
            .map_or(query, |(i, _)| &query[..i]);
        let prefix_chars = prefix.chars().count() as u64;
        let len = self.index.len().get();

        let mut lo = 0u64;
        let mut hi = len;
        let mut hit = None;
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            match self.window_at(mid, prefix_chars)?.as_str().cmp(prefix) {
                Ordering::Less => lo = mid + 1,
                Ordering::Greater => hi = mid,
                Ordering::Equal => {
                    hit = Some(mid);
                    break;
                }
            }
        }
        let Some(hit) = hit else {
            return Ok(None);
        };

        let mut start = hit;
        while start > 0 && self.window_at(start - 1, prefix_chars)? == prefix {
            start -= 1;
        }
        let mut end = hit + 1;
        while end < len && self.window_at(end, prefix_chars)? == prefix {
            end += 1;
        }
        Ok(Some((start, end)))
    }

    #[inline]
    fn window_at(&self, slot: u64, chars: u64) -> Result<String> {
        self.window(self.position_at(slot)?, chars)
    }

    #[inline]
    fn window(&self, position: TokenOffset, chars: u64) -> Result<String> {
        self.token_file
            .read_string(position, CharOffset(chars), CharOffset::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::ByteTokenFile;
    use tempfile::tempdir;

    fn indexed(content: &[u8]) -> (tempfile::TempDir, FileIndexer<ByteTokenFile>) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.txt");
        std::fs::write(&path, content).unwrap();
        let file = ByteTokenFile::open(&path).unwrap();
        let mut indexer = FileIndexer::create(file, &dir.path().join("data.txt.index")).unwrap();
        indexer.build_index(2).unwrap();
        (dir, indexer)
    }

    fn offsets(values: &[u64]) -> Vec<TokenOffset> {
        values.iter().map(|v| TokenOffset(*v)).collect()
    }

    #[test]
    fn test_find_sample_sentence() {
        let (_dir, indexer) = indexed(b"This is a test data file.");
        assert_eq!(indexer.find("This").unwrap(), offsets(&[0]));
        assert_eq!(indexer.find("is").unwrap(), offsets(&[2, 5]));
        assert_eq!(indexer.find("a").unwrap(), offsets(&[8, 16, 18]));
        assert!(indexer.find("foo").unwrap().is_empty());
    }

    #[test]
    fn test_find_across_wrap() {
        let (_dir, indexer) = indexed(b"abcdef");
        assert_eq!(indexer.find("fab").unwrap(), offsets(&[5]));
        // Longer than the file: the text repeats
        assert_eq!(indexer.find("defabcdef").unwrap(), offsets(&[3]));
    }

    #[test]
    fn test_empty_query() {
        let (_dir, indexer) = indexed(b"abc");
        assert!(indexer.find("").unwrap().is_empty());
        assert_eq!(indexer.count("").unwrap(), 0);
    }

    #[test]
    fn test_query_longer_than_depth() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.txt");
        std::fs::write(&path, b"abcdX abcdY abcdX").unwrap();
        let file = ByteTokenFile::open(&path).unwrap();
        let mut indexer = FileIndexer::create(file, &dir.path().join("idx"))
            .unwrap()
            .with_max_depth(3);
        indexer.build_index(1).unwrap();

        assert_eq!(indexer.find("abc").unwrap(), offsets(&[0, 6, 12]));
        assert_eq!(indexer.find("abcdX").unwrap(), offsets(&[0, 12]));
        assert_eq!(indexer.count("abcdY").unwrap(), 1);
        assert!(!indexer.contains("abcdZ").unwrap());
    }

    #[test]
    fn test_count_and_contains() {
        let (_dir, indexer) = indexed(b"mississippi");
        assert_eq!(indexer.count("ss").unwrap(), 2);
        assert_eq!(indexer.count("i").unwrap(), 4);
        assert!(indexer.contains("sip").unwrap());
        assert!(!indexer.contains("spa").unwrap());
    }
}
