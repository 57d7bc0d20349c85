//! Sorted-vector set.

use super::{SetBackend, Toggled};

/// Set stored as a sorted `Vec`, searched by bisection.
///
/// Lookups are cache friendly; inserts and removals shift the tail.
#[derive(Debug, Clone)]
pub struct FlatSet<K> {
    items: Vec<K>,
}

impl<K> Default for FlatSet<K> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<K: Ord> FlatSet<K> {
    /// Empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if `key` is present.
    pub fn contains(&self, key: &K) -> bool {
        self.items.binary_search(key).is_ok()
    }

    /// Keys in ascending order.
    pub fn as_slice(&self) -> &[K] {
        &self.items
    }
}

impl<K: Ord> SetBackend<K> for FlatSet<K> {
    const NAME: &'static str = "FlatSet";

    #[inline]
    fn toggle(&mut self, probe: K) -> Toggled<K> {
        match self.items.binary_search(&probe) {
            Ok(index) => Toggled::Removed {
                stored: self.items.remove(index),
                probe,
            },
            Err(index) => {
                self.items.insert(index, probe);
                Toggled::Inserted
            }
        }
    }

    fn len(&self) -> usize {
        self.items.len()
    }

    fn drain_each(&mut self, f: impl FnMut(K)) {
        self.items.drain(..).for_each(f)
    }
}
