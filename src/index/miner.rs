//! Discovery of frequent prefixes worth a dictionary entry
//!
//! Neighbouring index slots share their longest common prefixes, so one
//! pass over the index sees every repeated string at the slots where it
//! occurs. Each repeated prefix is scored by how many bytes replacing it
//! with a 4-byte code would save.

use super::builder::FileIndexer;
use crate::error::Result;
use crate::position::TokenOffset;
use crate::token::TokenFile;
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::collections::BTreeSet;
use std::time::Instant;
use tracing::{debug, info};

/// Longest common prefix considered, in tokens
pub const MAX_COMMON_PREFIX_TOKENS: usize = 1024;

/// Width of one code in the compressed layout
const CODE_BYTES: i64 = 4;

/// A frequent prefix and the number of index slots it covers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    pub prefix: String,
    pub count: u64,
}

impl Candidate {
    /// `count·bytes − count·4 − bytes`: bytes saved by coding every
    /// occurrence, less the cost of storing the entry once
    pub fn fitness(&self) -> i64 {
        fitness(&self.prefix, self.count)
    }
}

fn fitness(prefix: &str, count: u64) -> i64 {
    let bytes = prefix.len() as i64;
    let count = count as i64;
    count * bytes - count * CODE_BYTES - bytes
}

/// The longest common prefix of two token streams, as whole tokens
fn common_tokens<F: TokenFile>(token_file: &F, a: TokenOffset, b: TokenOffset, limit: usize) -> Vec<String> {
    token_file
        .tokens(a)
        .zip(token_file.tokens(b))
        .take(limit)
        .take_while(|(x, y)| x == y)
        .map(|(x, _)| x)
        .collect()
}

impl<F: TokenFile> FileIndexer<F> {
    /// Frequent prefixes with fitness above `threshold`, at most `max_count`
    /// of them, none a prefix of another. Ordered by descending fitness,
    /// ties by prefix.
    pub fn find_compression_prefixes(&self, threshold: i64, max_count: usize) -> Result<Vec<Candidate>> {
        let start = Instant::now();
        let len = self.index.len().get();
        let limit = MAX_COMMON_PREFIX_TOKENS.min(self.token_file.token_count().as_usize());

        // prefix -> slots it has been active for since it was last tracked
        let mut active: FxHashMap<String, u64> = FxHashMap::default();
        let mut totals: FxHashMap<String, u64> = FxHashMap::default();
        let mut with_previous: Vec<String> = Vec::new();

        for slot in 0..len {
            let current = self.position_at(slot)?;
            let with_next = if slot + 1 < len {
                common_tokens(&self.token_file, current, self.position_at(slot + 1)?, limit)
            } else {
                Vec::new()
            };
            let chosen = {
                let chars_previous: usize = with_previous.iter().map(|t| t.chars().count()).sum();
                let chars_next: usize = with_next.iter().map(|t| t.chars().count()).sum();
                if chars_previous > chars_next {
                    &with_previous
                } else {
                    &with_next
                }
            };
            let chosen_text = chosen.concat();

            let finished: Vec<String> = active
                .keys()
                .filter(|prefix| !chosen_text.starts_with(prefix.as_str()))
                .cloned()
                .collect();
            for prefix in finished {
                if let Some(count) = active.remove(&prefix) {
                    *totals.entry(prefix).or_default() += count;
                }
            }

            let mut prefix = String::new();
            for token in chosen.iter().take(chosen.len().saturating_sub(1)) {
                prefix.push_str(token);
                *active.entry(prefix.clone()).or_default() += 1;
            }

            with_previous = with_next;
        }
        for (prefix, count) in active {
            *totals.entry(prefix).or_default() += count;
        }

        let mut candidates: Vec<Candidate> = totals
            .into_iter()
            .filter(|(prefix, count)| fitness(prefix, *count) > threshold)
            .map(|(prefix, count)| Candidate { prefix, count })
            .collect();
        debug!(candidates = candidates.len(), threshold, "scored prefixes");

        candidates.sort_by(|a, b| {
            b.fitness()
                .cmp(&a.fitness())
                .then_with(|| a.prefix.cmp(&b.prefix))
        });
        let mut selected: Vec<Candidate> = Vec::new();
        for candidate in candidates {
            if selected.len() >= max_count {
                break;
            }
            let overlaps = selected.iter().any(|s| {
                s.prefix.starts_with(candidate.prefix.as_str())
                    || candidate.prefix.starts_with(s.prefix.as_str())
            });
            if !overlaps {
                selected.push(candidate);
            }
        }

        info!(
            slots = len,
            selected = selected.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "mined compression prefixes"
        );
        Ok(selected)
    }

    /// Every distinct single token text
    pub fn token_set(&self) -> BTreeSet<String> {
        self.token_file
            .tokens(TokenOffset::ZERO)
            .take(self.token_file.token_count().as_usize())
            .collect()
    }

    /// A covering codec: the mined prefixes plus every single token, sorted
    pub fn build_codec(&self, threshold: i64, max_count: usize) -> Result<Vec<String>> {
        let mut entries = self.token_set();
        entries.extend(
            self.find_compression_prefixes(threshold, max_count)?
                .into_iter()
                .map(|c| c.prefix),
        );
        Ok(entries.into_iter().collect())
    }
}
