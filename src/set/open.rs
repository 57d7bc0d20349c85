//! Open-addressing hash set with sentinel keys.
//!
//! Buckets hold keys directly. Two reserved keys mark a bucket as never used
//! (`empty`) or vacated (`deleted`), so the caller must guarantee that
//! neither sentinel ever equals a live key. Probing is linear over a
//! power-of-two table. Load, tombstones included, never exceeds one half,
//! so every probe sequence reaches an empty bucket.

use std::hash::{BuildHasher, Hash};
use std::mem;

use rustc_hash::FxBuildHasher;

use super::{SetBackend, Toggled};

/// Smallest table; must be a power of two.
const MIN_BUCKETS: usize = 16;

/// Hash set keyed by `K` with caller-supplied empty and deleted markers.
pub struct OpenSet<K, S = FxBuildHasher> {
    buckets: Box<[K]>,
    empty: K,
    deleted: K,
    len: usize,
    tombstones: usize,
    hasher: S,
}

impl<K, S> OpenSet<K, S>
where
    K: Copy + Eq + Hash,
    S: BuildHasher + Default,
{
    /// Empty set using `empty` and `deleted` as bucket markers.
    ///
    /// # Panics
    /// Panics if the two sentinels are equal.
    pub fn with_sentinels(empty: K, deleted: K) -> Self {
        assert!(empty != deleted, "open set sentinels must differ");
        Self {
            buckets: vec![empty; MIN_BUCKETS].into_boxed_slice(),
            empty,
            deleted,
            len: 0,
            tombstones: 0,
            hasher: S::default(),
        }
    }
}

impl<K, S> OpenSet<K, S>
where
    K: Copy + Eq + Hash,
    S: BuildHasher,
{
    /// Check if `key` is present.
    pub fn contains(&self, key: &K) -> bool {
        self.find(key).is_ok()
    }

    /// Number of buckets.
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    /// Buckets holding a deleted marker.
    pub fn tombstones(&self) -> usize {
        self.tombstones
    }

    #[inline]
    fn is_vacant(&self, key: &K) -> bool {
        *key == self.empty || *key == self.deleted
    }

    /// `Ok(bucket)` holding `key`, or `Err(bucket)` where it would go: the
    /// first tombstone on the probe path, else the terminating empty bucket.
    fn find(&self, key: &K) -> Result<usize, usize> {
        let mask = self.buckets.len() - 1;
        let mut index = self.hasher.hash_one(key) as usize & mask;
        let mut first_tombstone = None;
        loop {
            let bucket = &self.buckets[index];
            if *bucket == self.empty {
                return Err(first_tombstone.unwrap_or(index));
            }
            if *bucket == self.deleted {
                first_tombstone.get_or_insert(index);
            } else if bucket == key {
                return Ok(index);
            }
            index = (index + 1) & mask;
        }
    }

    /// Makes room for one more key, rehashing when live keys plus tombstones
    /// would pass half the table.
    fn reserve_one(&mut self) {
        if (self.len + self.tombstones + 1) * 2 <= self.buckets.len() {
            return;
        }
        let mut target = self.buckets.len();
        while (self.len + 1) * 4 > target {
            target *= 2;
        }
        self.rehash(target);
    }

    fn rehash(&mut self, buckets: usize) {
        debug_assert!(buckets.is_power_of_two());
        let (empty, deleted) = (self.empty, self.deleted);
        let old = mem::replace(&mut self.buckets, vec![empty; buckets].into_boxed_slice());
        self.tombstones = 0;
        let mask = buckets - 1;
        for key in old.iter().filter(|k| **k != empty && **k != deleted) {
            let mut index = self.hasher.hash_one(key) as usize & mask;
            while self.buckets[index] != empty {
                index = (index + 1) & mask;
            }
            self.buckets[index] = *key;
        }
    }
}

impl<K, S> SetBackend<K> for OpenSet<K, S>
where
    K: Copy + Eq + Hash,
    S: BuildHasher,
{
    const NAME: &'static str = "OpenSet";

    #[inline]
    fn toggle(&mut self, probe: K) -> Toggled<K> {
        debug_assert!(!self.is_vacant(&probe), "probe collides with a sentinel");
        self.reserve_one();
        match self.find(&probe) {
            Ok(index) => {
                let stored = mem::replace(&mut self.buckets[index], self.deleted);
                self.len -= 1;
                self.tombstones += 1;
                Toggled::Removed { stored, probe }
            }
            Err(index) => {
                if self.buckets[index] == self.deleted {
                    self.tombstones -= 1;
                }
                self.buckets[index] = probe;
                self.len += 1;
                Toggled::Inserted
            }
        }
    }

    fn len(&self) -> usize {
        self.len
    }

    fn drain_each(&mut self, mut f: impl FnMut(K)) {
        for i in 0..self.buckets.len() {
            let key = mem::replace(&mut self.buckets[i], self.empty);
            if key != self.empty && key != self.deleted {
                f(key);
            }
        }
        self.len = 0;
        self.tombstones = 0;
    }
}
