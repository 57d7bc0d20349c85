//! Associative sets: native insert, erase on duplicate.
//!
//! Every turn the drawn value is wrapped in a probe handle and offered to the
//! set. If the set already holds an equal key, that key is erased and freed,
//! and the probe is kept for the next turn instead of being thrown away.
//! Otherwise the probe stays in the set and a new one is allocated lazily.

pub mod flat;
pub mod open;

use std::collections::hash_map::RandomState;
use std::collections::{BTreeSet, HashSet};
use std::hash::Hash;

use rustc_hash::FxBuildHasher;

pub use flat::FlatSet;
pub use open::OpenSet;

use crate::alloc::{ByValue, SentinelScope, SlotAlloc, SENTINELS};
use crate::primitive::SlotValue;
use crate::Game;

/// Outcome of offering a key to a set.
#[derive(Debug)]
pub enum Toggled<K> {
    /// The key was absent and is now stored.
    Inserted,
    /// An equal key was present. Both the evicted key and the rejected probe
    /// are handed back.
    Removed {
        /// Key the set held.
        stored: K,
        /// Key that was offered.
        probe: K,
    },
}

/// A set that can toggle membership of a key.
pub trait SetBackend<K> {
    /// Container name used in labels.
    const NAME: &'static str;

    /// Inserts `probe`, or removes the equal key if one is present.
    fn toggle(&mut self, probe: K) -> Toggled<K>;

    /// Number of keys.
    fn len(&self) -> usize;

    /// Check if empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Empties the set, passing every key to `f`.
    fn drain_each(&mut self, f: impl FnMut(K));
}

impl<K: Ord> SetBackend<K> for BTreeSet<K> {
    const NAME: &'static str = "BTreeSet";

    #[inline]
    fn toggle(&mut self, probe: K) -> Toggled<K> {
        match self.replace(probe) {
            None => Toggled::Inserted,
            Some(stored) => {
                let probe = self
                    .take(&stored)
                    .unwrap_or_else(|| unreachable!("replaced key is present"));
                Toggled::Removed { stored, probe }
            }
        }
    }

    fn len(&self) -> usize {
        BTreeSet::len(self)
    }

    fn drain_each(&mut self, mut f: impl FnMut(K)) {
        while let Some(key) = self.pop_first() {
            f(key);
        }
    }
}

macro_rules! impl_hash_backend {
    ($name:literal, $set:ty) => {
        impl<K: Eq + Hash> SetBackend<K> for $set {
            const NAME: &'static str = $name;

            #[inline]
            fn toggle(&mut self, probe: K) -> Toggled<K> {
                match self.replace(probe) {
                    None => Toggled::Inserted,
                    Some(stored) => {
                        let probe = self
                            .take(&stored)
                            .unwrap_or_else(|| unreachable!("replaced key is present"));
                        Toggled::Removed { stored, probe }
                    }
                }
            }

            fn len(&self) -> usize {
                <$set>::len(self)
            }

            fn drain_each(&mut self, f: impl FnMut(K)) {
                self.drain().for_each(f)
            }
        }
    };
}

impl_hash_backend!("HashSet", HashSet<K, RandomState>);
impl_hash_backend!("FxHashSet", HashSet<K, FxBuildHasher>);
impl_hash_backend!("hashbrown::HashSet", hashbrown::HashSet<K>);

/// Offers `slot` to `set`, reusing `probe` when the last turn left one over.
#[inline]
fn toggle_through<S, A>(set: &mut S, alloc: &mut A, probe: &mut Option<A::Handle>, slot: u64) -> u64
where
    S: SetBackend<ByValue<A::Handle>>,
    A: SlotAlloc,
{
    let value = A::Value::from_slot(slot);
    // SAFETY: the probe and every key in `set` came from `alloc`. The owning
    // game frees them all through `release` before `alloc` is dropped.
    let handle = match probe.take() {
        Some(mut handle) => {
            unsafe { alloc.assign(&mut handle, value) };
            handle
        }
        None => unsafe { alloc.alloc_with(value) },
    };
    if let Toggled::Removed { stored, probe: rejected } = set.toggle(ByValue(handle)) {
        // SAFETY: the set gave the stored key up, so it is freed exactly once.
        unsafe { alloc.free(stored.0) };
        *probe = Some(rejected.0);
    }
    set.len() as u64
}

fn release<S, A>(set: &mut S, alloc: &mut A, probe: &mut Option<A::Handle>)
where
    S: SetBackend<ByValue<A::Handle>>,
    A: SlotAlloc,
{
    // SAFETY: drained keys and the spare probe all came from `alloc` and
    // leave the game here.
    set.drain_each(|key| unsafe { alloc.free(key.0) });
    if let Some(handle) = probe.take() {
        unsafe { alloc.free(handle) };
    }
}

/// A set game over any default-constructible backend.
pub struct SetGame<S, A>
where
    S: SetBackend<ByValue<A::Handle>> + Default,
    A: SlotAlloc,
{
    set: S,
    alloc: A,
    probe: Option<A::Handle>,
}

impl<S, A> SetGame<S, A>
where
    S: SetBackend<ByValue<A::Handle>> + Default,
    A: SlotAlloc,
{
    /// Handles the allocator has outstanding, the spare probe included.
    pub fn live(&self) -> usize {
        self.alloc.live()
    }
}

impl<S, A> Game for SetGame<S, A>
where
    S: SetBackend<ByValue<A::Handle>> + Default,
    A: SlotAlloc,
{
    fn with_slots(_slots: u64) -> Self {
        Self {
            set: S::default(),
            alloc: A::default(),
            probe: None,
        }
    }

    #[inline]
    fn turn(&mut self, slot: u64) -> u64 {
        toggle_through(&mut self.set, &mut self.alloc, &mut self.probe, slot)
    }
}

impl<S, A> Drop for SetGame<S, A>
where
    S: SetBackend<ByValue<A::Handle>> + Default,
    A: SlotAlloc,
{
    fn drop(&mut self) {
        release(&mut self.set, &mut self.alloc, &mut self.probe);
        debug_assert_eq!(self.alloc.live(), 0, "set game leaked handles");
    }
}

/// A set game over [`OpenSet`], whose sentinel keys are allocated from the
/// same strategy as the data and released when the game ends.
pub struct SentinelSetGame<A>
where
    A: SlotAlloc,
    A::Handle: Copy,
{
    // Declared before `scope`: the set holds copies of the sentinels.
    set: OpenSet<ByValue<A::Handle>>,
    probe: Option<A::Handle>,
    scope: SentinelScope<A>,
}

impl<A> SentinelSetGame<A>
where
    A: SlotAlloc,
    A::Handle: Copy,
{
    /// Handles outstanding, sentinels and spare probe included.
    pub fn live(&self) -> usize {
        self.scope.live()
    }
}

impl<A> Game for SentinelSetGame<A>
where
    A: SlotAlloc,
    A::Handle: Copy,
{
    fn with_slots(_slots: u64) -> Self {
        let scope = SentinelScope::acquire(A::default());
        Self {
            set: OpenSet::with_sentinels(ByValue(scope.empty()), ByValue(scope.deleted())),
            probe: None,
            scope,
        }
    }

    #[inline]
    fn turn(&mut self, slot: u64) -> u64 {
        toggle_through(&mut self.set, &mut *self.scope, &mut self.probe, slot)
    }
}

impl<A> Drop for SentinelSetGame<A>
where
    A: SlotAlloc,
    A::Handle: Copy,
{
    fn drop(&mut self) {
        release(&mut self.set, &mut *self.scope, &mut self.probe);
        debug_assert_eq!(self.scope.live(), SENTINELS, "open set game leaked handles");
    }
}
