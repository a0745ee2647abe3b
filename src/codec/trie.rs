//! Character trie over codec entries, matched a whole token at a time

use rustc_hash::FxHashMap;

#[derive(Debug, Default)]
struct Node {
    children: FxHashMap<char, usize>,
    code: Option<u32>,
}

/// Prefix trie mapping codec entries to their codes. Nodes live in one
/// arena and refer to their children by index.
#[derive(Debug)]
pub struct PrefixTrie {
    nodes: Vec<Node>,
}

impl PrefixTrie {
    /// Build the trie for `codec`; entry `i` gets code `i`
    pub fn new(codec: &[String]) -> Self {
        let mut trie = Self {
            nodes: vec![Node::default()],
        };
        for (code, entry) in codec.iter().enumerate() {
            trie.insert(entry, code as u32);
        }
        trie
    }

    fn insert(&mut self, entry: &str, code: u32) {
        let mut node = 0;
        for c in entry.chars() {
            node = match self.nodes[node].children.get(&c) {
                Some(&child) => child,
                None => {
                    let child = self.nodes.len();
                    self.nodes.push(Node::default());
                    self.nodes[node].children.insert(c, child);
                    child
                }
            };
        }
        self.nodes[node].code = Some(code);
    }

    /// Number of nodes, the root included
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Code of an exact entry
    pub fn get(&self, entry: &str) -> Option<u32> {
        let mut node = 0;
        for c in entry.chars() {
            node = *self.nodes[node].children.get(&c)?;
        }
        self.nodes[node].code
    }

    /// Longest entry equal to the concatenation of the first `k >= 1`
    /// tokens. Returns the entry's code and `k`. Matching only ends on token
    /// boundaries, so an entry that stops inside a token never matches.
    pub fn longest_match<I, S>(&self, tokens: I) -> Option<(u32, usize)>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut node = 0;
        let mut best = None;
        'tokens: for (i, token) in tokens.into_iter().enumerate() {
            for c in token.as_ref().chars() {
                match self.nodes[node].children.get(&c) {
                    Some(&child) => node = child,
                    None => break 'tokens,
                }
            }
            if let Some(code) = self.nodes[node].code {
                best = Some((code, i + 1));
            }
        }
        best
    }
}
