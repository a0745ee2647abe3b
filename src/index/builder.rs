//! Index construction by bucket refinement
//!
//! Positions are first grouped by the `n` characters that start them. Any
//! group with more than one member is then refined on the next `n`
//! characters: large groups are re-bucketed, small ones are sorted directly,
//! and members still tied afterwards go back on the worklist one round
//! deeper. Refinement stops at [`FileIndexer::resolved_depth`] characters,
//! so the index is ordered by that prefix and runs tied beyond it keep their
//! encounter order. Pending groups live on an explicit worklist, so
//! arbitrarily repetitive input cannot exhaust the stack, and each round
//! reads `n` characters per position, so build time grows with the depth
//! rather than with the length of repeated text.

use crate::error::{Error, Result};
use crate::position::{CharOffset, ElementOffset, TokenOffset};
use crate::storage::PositionArray;
use crate::token::TokenFile;
use crate::utils::progress::ProgressBar;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, trace};

/// Buckets at least this large are re-bucketed instead of sorted directly
pub const BUCKET_REFINE_THRESHOLD: usize = 1000;

/// Direct sorts above this size run in parallel
pub const PARALLEL_SORT_THRESHOLD: usize = 100_000;

/// Default number of leading characters the index is ordered by
pub const MAX_SORT_DEPTH: u64 = 64;

/// A run of index slots still to be ordered, all of whose positions agree
/// on their first `skip` characters
#[derive(Debug, Clone, Copy)]
struct Span {
    from: u64,
    to: u64,
    skip: u64,
}

impl Span {
    fn len(&self) -> u64 {
        self.to - self.from
    }
}

/// A token file together with its position index
pub struct FileIndexer<F: TokenFile> {
    pub(crate) token_file: F,
    pub(crate) index: PositionArray,
    refine_threshold: usize,
    max_depth: u64,
}

impl<F: TokenFile> FileIndexer<F> {
    /// Pair a token file with an index array, which must hold exactly one
    /// slot per token
    pub fn new(token_file: F, index: PositionArray) -> Result<Self> {
        let token_count = token_file.token_count().get();
        if index.len().get() != token_count {
            return Err(Error::IndexLengthMismatch {
                index_length: index.len().get(),
                token_count,
            });
        }
        Ok(Self {
            token_file,
            index,
            refine_threshold: BUCKET_REFINE_THRESHOLD,
            max_depth: MAX_SORT_DEPTH,
        })
    }

    /// Create (or truncate) `index_path` sized for `token_file`
    pub fn create(token_file: F, index_path: &Path) -> Result<Self> {
        let len = ElementOffset(token_file.token_count().get());
        let index = PositionArray::create_with_len(index_path, len)?;
        Self::new(token_file, index)
    }

    /// Open a previously built index. Searches assume it was built with the
    /// same sort depth as this indexer ([`MAX_SORT_DEPTH`] unless changed
    /// with [`with_max_depth`](Self::with_max_depth)).
    pub fn open(token_file: F, index_path: &Path) -> Result<Self> {
        let index = PositionArray::open(index_path)?;
        Self::new(token_file, index)
    }

    /// Change the bucket size at which refinement re-buckets instead of sorting
    pub fn with_refine_threshold(mut self, threshold: usize) -> Self {
        self.refine_threshold = threshold.max(2);
        self
    }

    /// Change how many leading characters the index is ordered by
    pub fn with_max_depth(mut self, depth: u64) -> Self {
        self.max_depth = depth.max(1);
        self
    }

    /// Characters of text the built index is fully ordered by. Streams that
    /// agree on a whole period agree forever, so the depth never exceeds
    /// the character count.
    pub fn resolved_depth(&self) -> u64 {
        self.max_depth.min(self.token_file.char_count().get())
    }

    pub fn token_file(&self) -> &F {
        &self.token_file
    }

    pub fn index(&self) -> &PositionArray {
        &self.index
    }

    /// Token position stored in slot `slot`
    #[inline]
    pub fn position_at(&self, slot: u64) -> Result<TokenOffset> {
        Ok(TokenOffset(self.index.get(ElementOffset(slot))?))
    }

    /// Sort every token position by the text that follows it, using `n`
    /// characters per bucketing round
    pub fn build_index(&mut self, n: usize) -> Result<()> {
        self.build_index_with_progress(n, &ProgressBar::hidden())
    }

    /// [`build_index`](Self::build_index), advancing `progress` by one for
    /// every slot whose final position is settled
    pub fn build_index_with_progress(&mut self, n: usize, progress: &ProgressBar) -> Result<()> {
        if n == 0 {
            return Err(Error::InvalidReadLength(0));
        }
        let start = Instant::now();
        let count = self.token_file.token_count().get();
        let depth = self.resolved_depth();
        let n = n as u64;

        let positions: Vec<u64> = (0..count).collect();
        let buckets = self.populate_by_scan(0, count, &positions, 0, n)?;
        debug!(buckets = buckets.len(), tokens = count, depth, "initial bucketing");

        let mut worklist = Vec::new();
        push_groups(&mut worklist, 0, &buckets, n, depth, progress);

        let mut rounds = 0u64;
        let mut sorted = 0u64;
        let mut max_worklist = 0usize;
        while let Some(span) = worklist.pop() {
            max_worklist = max_worklist.max(worklist.len() + 1);
            let positions = self.read_span(span)?;

            let groups = if positions.len() >= self.refine_threshold {
                rounds += 1;
                self.populate_by_scan(span.from, span.to, &positions, span.skip, n)?
            } else {
                sorted += 1;
                self.sort_span(span, positions, n)?
            };
            trace!(
                from = span.from,
                len = span.len(),
                skip = span.skip,
                groups = groups.len(),
                "refined span"
            );
            push_groups(&mut worklist, span.from, &groups, span.skip + n, depth, progress);
        }

        self.index.flush()?;
        info!(
            path = %self.token_file.path().display(),
            tokens = count,
            ngram = n,
            depth,
            rounds,
            sorted_spans = sorted,
            max_worklist,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "built index"
        );
        Ok(())
    }

    /// Group `positions` by their `n` characters after `skip`, write them to
    /// slots `from..to` in key order (encounter order within a key), and
    /// return the bucket sizes in slot order
    fn populate_by_scan(
        &mut self,
        from: u64,
        to: u64,
        positions: &[u64],
        skip: u64,
        n: u64,
    ) -> Result<Vec<u64>> {
        let mut buckets: BTreeMap<String, Vec<u64>> = BTreeMap::new();
        for &position in positions {
            let key = self
                .token_file
                .read_string(TokenOffset(position), CharOffset(n), CharOffset(skip))?;
            buckets.entry(key).or_default().push(position);
        }

        let total: u64 = buckets.values().map(|b| b.len() as u64).sum();
        if total != to - from {
            return Err(Error::BucketSizeMismatch {
                expected: to - from,
                actual: total,
            });
        }

        let mut slot = from;
        let mut sizes = Vec::with_capacity(buckets.len());
        for bucket in buckets.values() {
            for &position in bucket {
                self.index.set(ElementOffset(slot), position)?;
                slot += 1;
            }
            sizes.push(bucket.len() as u64);
        }
        Ok(sizes)
    }

    fn read_span(&self, span: Span) -> Result<Vec<u64>> {
        ElementOffset(span.from)
            .range_to(ElementOffset(span.to))
            .map(|slot| self.index.get(slot))
            .collect()
    }

    /// Stable sort of one span by its `n` characters after `skip`. Returns
    /// the sizes of the runs of equal keys in slot order.
    fn sort_span(&mut self, span: Span, positions: Vec<u64>, n: u64) -> Result<Vec<u64>> {
        let token_file = &self.token_file;
        let mut keyed = positions
            .into_iter()
            .map(|p| {
                token_file
                    .read_string(TokenOffset(p), CharOffset(n), CharOffset(span.skip))
                    .map(|key| (key, p))
            })
            .collect::<Result<Vec<_>>>()?;

        if keyed.len() > PARALLEL_SORT_THRESHOLD {
            keyed.par_sort_by(|a, b| a.0.cmp(&b.0));
        } else {
            keyed.sort_by(|a, b| a.0.cmp(&b.0));
        }

        let mut sizes: Vec<u64> = Vec::new();
        let mut previous: Option<&str> = None;
        for (offset, (key, position)) in keyed.iter().enumerate() {
            self.index.set(ElementOffset(span.from + offset as u64), *position)?;
            match sizes.last_mut() {
                Some(size) if previous == Some(key.as_str()) => *size += 1,
                _ => sizes.push(1),
            }
            previous = Some(key.as_str());
        }
        Ok(sizes)
    }

    /// Flush the index and release both files
    pub fn close(self) -> Result<()> {
        self.index.close()
    }
}

/// Queue every group that is still tied and not yet at `depth`; the rest
/// are settled
fn push_groups(
    worklist: &mut Vec<Span>,
    from: u64,
    sizes: &[u64],
    skip: u64,
    depth: u64,
    progress: &ProgressBar,
) {
    let mut start = from;
    for &size in sizes {
        if size > 1 && skip < depth {
            worklist.push(Span {
                from: start,
                to: start + size,
                skip,
            });
        } else {
            progress.inc(size);
        }
        start += size;
    }
}
