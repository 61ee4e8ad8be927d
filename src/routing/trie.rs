//! Byte-wise prefix trie.
//!
//! # Responsibilities
//! - Store values under byte-string keys
//! - Reject duplicate keys at insert time
//! - Find the longest stored key that prefixes a lookup key
//!
//! # Design Decisions
//! - Arena of nodes indexed by `usize`, no per-node boxing
//! - Children kept sorted by byte for binary search
//! - Lookup cost bounded by key length, no allocation
//! - Optional ASCII case folding applied to the lookup key on the fly;
//!   stored keys are expected to be folded by the caller already

/// Index of the root node in the arena.
const ROOT: usize = 0;

#[derive(Debug)]
struct Node<T> {
    children: Vec<(u8, usize)>,
    value: Option<T>,
}

impl<T> Node<T> {
    fn empty() -> Self {
        Self {
            children: Vec::new(),
            value: None,
        }
    }

    fn child(&self, byte: u8) -> Option<usize> {
        self.children
            .binary_search_by_key(&byte, |(b, _)| *b)
            .ok()
            .map(|pos| self.children[pos].1)
    }
}

/// Longest-prefix lookup table keyed on bytes.
#[derive(Debug)]
pub struct PrefixTrie<T> {
    nodes: Vec<Node<T>>,
    len: usize,
    max_key_len: usize,
}

impl<T> PrefixTrie<T> {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::empty()],
            len: 0,
            max_key_len: 0,
        }
    }

    /// Insert `value` under `key`.
    ///
    /// Returns the value back if `key` is already present; the stored value
    /// is left untouched.
    pub fn try_insert(&mut self, key: &[u8], value: T) -> Result<(), T> {
        let mut current = ROOT;
        for &byte in key {
            current = match self.nodes[current].child(byte) {
                Some(next) => next,
                None => {
                    let next = self.nodes.len();
                    self.nodes.push(Node::empty());
                    let children = &mut self.nodes[current].children;
                    let pos = children.partition_point(|(b, _)| *b < byte);
                    children.insert(pos, (byte, next));
                    next
                }
            };
        }

        let slot = &mut self.nodes[current].value;
        if slot.is_some() {
            return Err(value);
        }
        *slot = Some(value);
        self.len += 1;
        self.max_key_len = self.max_key_len.max(key.len());
        Ok(())
    }

    /// Exact-key lookup.
    pub fn get(&self, key: &[u8]) -> Option<&T> {
        let mut current = ROOT;
        for &byte in key {
            current = self.nodes[current].child(byte)?;
        }
        self.nodes[current].value.as_ref()
    }

    /// Find the longest non-empty stored key that is a prefix of `key`.
    ///
    /// Returns the matched length in bytes together with the stored value.
    /// With `fold_case`, each byte of `key` is ASCII-lowercased before it is
    /// compared.
    pub fn longest_prefix(&self, key: &[u8], fold_case: bool) -> Option<(usize, &T)> {
        let mut current = ROOT;
        let mut best = None;

        for (depth, &byte) in key.iter().enumerate() {
            let byte = if fold_case {
                byte.to_ascii_lowercase()
            } else {
                byte
            };
            match self.nodes[current].child(byte) {
                Some(next) => current = next,
                None => break,
            }
            if let Some(value) = self.nodes[current].value.as_ref() {
                best = Some((depth + 1, value));
            }
        }

        best
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Length of the longest stored key.
    pub fn max_key_len(&self) -> usize {
        self.max_key_len
    }
}

impl<T> Default for PrefixTrie<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trie(keys: &[&str]) -> PrefixTrie<String> {
        let mut trie = PrefixTrie::new();
        for key in keys {
            trie.try_insert(key.as_bytes(), key.to_string()).unwrap();
        }
        trie
    }

    #[test]
    fn longest_prefix_prefers_deepest_value() {
        let trie = trie(&["a", "ab", "abcd"]);

        let (len, value) = trie.longest_prefix(b"abc:1", false).unwrap();
        assert_eq!(len, 2);
        assert_eq!(value, "ab");

        let (len, value) = trie.longest_prefix(b"abcd", false).unwrap();
        assert_eq!(len, 4);
        assert_eq!(value, "abcd");

        assert!(trie.longest_prefix(b"b", false).is_none());
        assert!(trie.longest_prefix(b"", false).is_none());
    }

    #[test]
    fn intermediate_nodes_without_values_do_not_match() {
        let trie = trie(&["abc"]);
        assert!(trie.longest_prefix(b"ab", false).is_none());
        assert!(trie.get(b"ab").is_none());
        assert_eq!(trie.get(b"abc").map(String::as_str), Some("abc"));
    }

    #[test]
    fn fold_case_lowercases_lookup_key() {
        let trie = trie(&["user:"]);
        assert!(trie.longest_prefix(b"USER:1", false).is_none());
        let (len, _) = trie.longest_prefix(b"USER:1", true).unwrap();
        assert_eq!(len, 5);
    }

    #[test]
    fn duplicate_insert_is_rejected() {
        let mut trie = trie(&["ab"]);
        let rejected = trie.try_insert(b"ab", "again".to_string());
        assert_eq!(rejected, Err("again".to_string()));
        assert_eq!(trie.get(b"ab").map(String::as_str), Some("ab"));
        assert_eq!(trie.len(), 1);
    }

    #[test]
    fn children_stay_sorted_regardless_of_insert_order() {
        let trie = trie(&["z", "a", "m", "b"]);
        for key in ["z", "a", "m", "b"] {
            assert_eq!(trie.get(key.as_bytes()).map(String::as_str), Some(key));
        }
        assert_eq!(trie.len(), 4);
        assert_eq!(trie.max_key_len(), 1);
    }
}
