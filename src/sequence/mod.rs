//! Sequence containers: linear-scan unsorted and binary-search sorted.
//!
//! Both games hold the allocator's handles directly and compare them through
//! [`SlotHandle::primitive_value`]. On a hit the element is erased and its
//! storage freed; on a miss a fresh handle is allocated and stored.

use std::collections::{LinkedList, VecDeque};

use smallvec::SmallVec;

use crate::alloc::{SlotAlloc, SlotHandle};
use crate::primitive::SlotValue;
use crate::Game;

/// Inline capacity of the [`SmallVec`] backend.
pub const SMALL_INLINE: usize = 16;

/// A growable sequence with positional insert and erase.
pub trait Sequence<K>: Default {
    /// Container name used in labels.
    const NAME: &'static str;

    /// Number of elements.
    fn len(&self) -> usize;

    /// Check if empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Index of the first element matching `pred`, scanning front to back.
    fn find(&self, pred: impl FnMut(&K) -> bool) -> Option<usize>;

    /// Index of the first element for which `pred` is false, given the
    /// sequence is partitioned by `pred`.
    fn partition_point(&self, pred: impl FnMut(&K) -> bool) -> usize;

    /// Element at `index`.
    fn get(&self, index: usize) -> Option<&K>;

    /// Appends at the back.
    fn push(&mut self, item: K);

    /// Inserts before `index`; `index == len` appends.
    fn insert(&mut self, index: usize, item: K);

    /// Removes the element at `index`, keeping the order of the rest.
    fn remove(&mut self, index: usize) -> Option<K>;

    /// Empties the sequence, passing every element to `f`.
    fn drain_each(&mut self, f: impl FnMut(K));
}

impl<K> Sequence<K> for Vec<K> {
    const NAME: &'static str = "Vec";

    fn len(&self) -> usize {
        Vec::len(self)
    }

    #[inline]
    fn find(&self, pred: impl FnMut(&K) -> bool) -> Option<usize> {
        self.iter().position(pred)
    }

    #[inline]
    fn partition_point(&self, pred: impl FnMut(&K) -> bool) -> usize {
        self.as_slice().partition_point(pred)
    }

    fn get(&self, index: usize) -> Option<&K> {
        self.as_slice().get(index)
    }

    fn push(&mut self, item: K) {
        Vec::push(self, item)
    }

    fn insert(&mut self, index: usize, item: K) {
        Vec::insert(self, index, item)
    }

    fn remove(&mut self, index: usize) -> Option<K> {
        (index < Vec::len(self)).then(|| Vec::remove(self, index))
    }

    fn drain_each(&mut self, f: impl FnMut(K)) {
        self.drain(..).for_each(f)
    }
}

impl<K> Sequence<K> for VecDeque<K> {
    const NAME: &'static str = "VecDeque";

    fn len(&self) -> usize {
        VecDeque::len(self)
    }

    #[inline]
    fn find(&self, pred: impl FnMut(&K) -> bool) -> Option<usize> {
        self.iter().position(pred)
    }

    #[inline]
    fn partition_point(&self, pred: impl FnMut(&K) -> bool) -> usize {
        VecDeque::partition_point(self, pred)
    }

    fn get(&self, index: usize) -> Option<&K> {
        VecDeque::get(self, index)
    }

    fn push(&mut self, item: K) {
        self.push_back(item)
    }

    fn insert(&mut self, index: usize, item: K) {
        VecDeque::insert(self, index, item)
    }

    fn remove(&mut self, index: usize) -> Option<K> {
        VecDeque::remove(self, index)
    }

    fn drain_each(&mut self, f: impl FnMut(K)) {
        self.drain(..).for_each(f)
    }
}

// A linked list has no random access: the sorted search walks the list
// just like a lower-bound over forward iterators, and positional edits
// split and re-append.
impl<K> Sequence<K> for LinkedList<K> {
    const NAME: &'static str = "LinkedList";

    fn len(&self) -> usize {
        LinkedList::len(self)
    }

    #[inline]
    fn find(&self, pred: impl FnMut(&K) -> bool) -> Option<usize> {
        self.iter().position(pred)
    }

    fn partition_point(&self, mut pred: impl FnMut(&K) -> bool) -> usize {
        self.iter()
            .position(|k| !pred(k))
            .unwrap_or_else(|| LinkedList::len(self))
    }

    fn get(&self, index: usize) -> Option<&K> {
        self.iter().nth(index)
    }

    fn push(&mut self, item: K) {
        self.push_back(item)
    }

    fn insert(&mut self, index: usize, item: K) {
        let mut tail = self.split_off(index);
        self.push_back(item);
        self.append(&mut tail);
    }

    fn remove(&mut self, index: usize) -> Option<K> {
        if index >= LinkedList::len(self) {
            return None;
        }
        let mut tail = self.split_off(index);
        let item = tail.pop_front();
        self.append(&mut tail);
        item
    }

    fn drain_each(&mut self, mut f: impl FnMut(K)) {
        while let Some(item) = self.pop_front() {
            f(item);
        }
    }
}

impl<K> Sequence<K> for SmallVec<[K; SMALL_INLINE]> {
    const NAME: &'static str = "SmallVec";

    fn len(&self) -> usize {
        SmallVec::len(self)
    }

    #[inline]
    fn find(&self, pred: impl FnMut(&K) -> bool) -> Option<usize> {
        self.iter().position(pred)
    }

    #[inline]
    fn partition_point(&self, pred: impl FnMut(&K) -> bool) -> usize {
        self.as_slice().partition_point(pred)
    }

    fn get(&self, index: usize) -> Option<&K> {
        self.as_slice().get(index)
    }

    fn push(&mut self, item: K) {
        SmallVec::push(self, item)
    }

    fn insert(&mut self, index: usize, item: K) {
        SmallVec::insert(self, index, item)
    }

    fn remove(&mut self, index: usize) -> Option<K> {
        (index < SmallVec::len(self)).then(|| SmallVec::remove(self, index))
    }

    fn drain_each(&mut self, f: impl FnMut(K)) {
        self.drain(..).for_each(f)
    }
}

fn release<S, A>(items: &mut S, alloc: &mut A)
where
    S: Sequence<A::Handle>,
    A: SlotAlloc,
{
    // SAFETY: every stored handle came from `alloc` and is freed once here.
    items.drain_each(|h| unsafe { alloc.free(h) });
    debug_assert_eq!(alloc.live(), 0, "sequence game leaked handles");
}

/// Linear scan for equality; append on a miss.
pub struct Unsorted<S, A>
where
    S: Sequence<A::Handle>,
    A: SlotAlloc,
{
    items: S,
    alloc: A,
}

impl<S, A> Game for Unsorted<S, A>
where
    S: Sequence<A::Handle>,
    A: SlotAlloc,
{
    fn with_slots(_slots: u64) -> Self {
        Self {
            items: S::default(),
            alloc: A::default(),
        }
    }

    #[inline]
    fn turn(&mut self, slot: u64) -> u64 {
        let value = A::Value::from_slot(slot);
        match self.items.find(|h| h.primitive_value() == value) {
            Some(index) => {
                if let Some(stored) = self.items.remove(index) {
                    // SAFETY: taken out of the container, so freed exactly once.
                    unsafe { self.alloc.free(stored) };
                }
            }
            None => {
                // SAFETY: the handle lives in `items` and is freed before
                // `alloc` is dropped (see `Drop`).
                let handle = unsafe { self.alloc.alloc_with(value) };
                self.items.push(handle);
            }
        }
        self.items.len() as u64
    }
}

impl<S, A> Drop for Unsorted<S, A>
where
    S: Sequence<A::Handle>,
    A: SlotAlloc,
{
    fn drop(&mut self) {
        release(&mut self.items, &mut self.alloc);
    }
}

/// Kept sorted by primitive value; binary search for the insertion point.
pub struct Sorted<S, A>
where
    S: Sequence<A::Handle>,
    A: SlotAlloc,
{
    items: S,
    alloc: A,
}

impl<S, A> Game for Sorted<S, A>
where
    S: Sequence<A::Handle>,
    A: SlotAlloc,
{
    fn with_slots(_slots: u64) -> Self {
        Self {
            items: S::default(),
            alloc: A::default(),
        }
    }

    #[inline]
    fn turn(&mut self, slot: u64) -> u64 {
        let value = A::Value::from_slot(slot);
        let index = self.items.partition_point(|h| h.primitive_value() < value);
        let hit = matches!(self.items.get(index), Some(h) if h.primitive_value() == value);
        if hit {
            if let Some(stored) = self.items.remove(index) {
                // SAFETY: taken out of the container, so freed exactly once.
                unsafe { self.alloc.free(stored) };
            }
        } else {
            // SAFETY: as in `Unsorted::turn`.
            let handle = unsafe { self.alloc.alloc_with(value) };
            self.items.insert(index, handle);
        }
        self.items.len() as u64
    }
}

impl<S, A> Drop for Sorted<S, A>
where
    S: Sequence<A::Handle>,
    A: SlotAlloc,
{
    fn drop(&mut self) {
        release(&mut self.items, &mut self.alloc);
    }
}

impl<S, A> Sorted<S, A>
where
    S: Sequence<A::Handle>,
    A: SlotAlloc,
{
    /// Stored values in container order.
    pub fn values(&self) -> Vec<A::Value> {
        (0..self.items.len())
            .filter_map(|i| self.items.get(i).map(SlotHandle::primitive_value))
            .collect()
    }
}
