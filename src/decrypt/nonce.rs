//! Per-transaction nonce table.

use crate::decode::Nonce;
use std::collections::BTreeMap;

/// Nonces recovered while opening message inputs, keyed by message index.
///
/// Only successfully opened messages have an entry. An absent entry is a
/// valid terminal state: nothing tagged with that index is ever decrypted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NonceTable {
    entries: BTreeMap<usize, Nonce>,
}

impl NonceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record(&mut self, index: usize, nonce: Nonce) {
        self.entries.insert(index, nonce);
    }

    /// Nonce for a message index, if its input was opened.
    pub fn get(&self, index: usize) -> Option<&Nonce> {
        self.entries.get(&index)
    }

    pub fn contains(&self, index: usize) -> bool {
        self.entries.contains_key(&index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Recorded indices in ascending order.
    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.entries.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sparse_indices() {
        let mut table = NonceTable::new();
        table.record(2, Nonce::new([2; 32]));
        table.record(0, Nonce::new([0; 32]));

        assert_eq!(table.len(), 2);
        assert!(table.contains(0));
        assert!(!table.contains(1));
        assert_eq!(table.get(2), Some(&Nonce::new([2; 32])));
        assert_eq!(table.indices().collect::<Vec<_>>(), vec![0, 2]);
    }
}
