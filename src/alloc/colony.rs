//! Colony: bulk storage with stable handles.
//!
//! Elements live in groups whose capacity doubles from
//! [`MIN_GROUP_CAPACITY`] up to [`MAX_GROUP_CAPACITY`]. Groups never move or
//! shrink, so a handle stays valid until its own element is erased. Erasure
//! clears the element's occupancy bit and queues the location for reuse; it
//! never touches other elements. Iteration walks the occupancy bits, so
//! erased locations are skipped.
//!
//! Every owner-side access checks that the handle addresses an occupied
//! location of this colony, so a handle from another colony is rejected
//! rather than followed.

use std::fmt;
use std::ptr::NonNull;

use fixedbitset::FixedBitSet;

use tracing::trace;

use crate::alloc::SlotHandle;
use crate::primitive::SlotValue;

/// Capacity of the first group.
pub const MIN_GROUP_CAPACITY: usize = 8;

/// Groups stop doubling at this capacity.
pub const MAX_GROUP_CAPACITY: usize = 8192;

struct Group<T> {
    elements: NonNull<[T]>,
    occupied: FixedBitSet,
    /// Locations below this index have been handed out at least once.
    touched: usize,
}

impl<T: Copy + Default> Group<T> {
    fn new(capacity: usize) -> Self {
        let elements: Box<[T]> = vec![T::default(); capacity].into_boxed_slice();
        Self {
            elements: NonNull::from(Box::leak(elements)),
            occupied: FixedBitSet::with_capacity(capacity),
            touched: 0,
        }
    }
}

impl<T> Group<T> {
    fn capacity(&self) -> usize {
        self.elements.len()
    }

    #[inline]
    fn element(&self, index: usize) -> NonNull<T> {
        debug_assert!(index < self.capacity());
        // SAFETY: `index` is within the group.
        unsafe { NonNull::new_unchecked(self.elements.cast::<T>().as_ptr().add(index)) }
    }
}

/// Stable handle to a colony element.
///
/// Only obtainable through [`SlotAlloc::alloc_with`](crate::alloc::SlotAlloc::alloc_with)
/// on [`Colonized`](crate::alloc::Colonized). Valid until the element is
/// erased or the colony dropped.
pub struct ColonyHandle<T> {
    ptr: NonNull<T>,
    group: u32,
    index: u32,
}

impl<T> Clone for ColonyHandle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ColonyHandle<T> {}

impl<T> fmt::Debug for ColonyHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColonyHandle")
            .field("group", &self.group)
            .field("index", &self.index)
            .finish()
    }
}

impl<T> PartialEq for ColonyHandle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.group == other.group && self.index == other.index
    }
}

impl<T> Eq for ColonyHandle<T> {}

impl<T: SlotValue> SlotHandle for ColonyHandle<T> {
    type Value = T;

    #[inline]
    fn primitive_value(&self) -> T {
        // SAFETY: colony handles only leave the crate through the unsafe
        // `SlotAlloc` methods, whose callers keep them inside the colony's
        // lifetime and before their erase.
        unsafe { *self.ptr.as_ptr() }
    }
}

/// Unordered container with O(1) insert and erase and stable handles.
pub(crate) struct Colony<T> {
    groups: Vec<Group<T>>,
    /// Erased locations, reused last-in first-out.
    free: Vec<(u32, u32)>,
    len: usize,
}

impl<T: Copy + Default> Colony<T> {
    /// Constructs an empty colony. Does not allocate.
    pub fn new() -> Self {
        Self {
            groups: Vec::new(),
            free: Vec::new(),
            len: 0,
        }
    }

    /// Inserts `value`, reusing an erased location when one exists.
    pub fn insert(&mut self, value: T) -> ColonyHandle<T> {
        let (group, index) = match self.free.pop() {
            Some(location) => location,
            None => self.fresh_location(),
        };
        let g = &mut self.groups[group as usize];
        let ptr = g.element(index as usize);
        // SAFETY: the location is unoccupied, so no live handle reads it.
        unsafe { ptr.as_ptr().write(value) };
        g.occupied.insert(index as usize);
        self.len += 1;
        ColonyHandle { ptr, group, index }
    }

    /// Erases the element behind `handle` and returns its value.
    ///
    /// Other handles stay valid. Panics if `handle` is not a live element
    /// of this colony.
    pub fn erase(&mut self, handle: ColonyHandle<T>) -> T {
        assert!(self.holds(handle), "erasing a handle this colony does not hold");
        self.groups[handle.group as usize]
            .occupied
            .set(handle.index as usize, false);
        self.free.push((handle.group, handle.index));
        self.len -= 1;
        // SAFETY: `holds` matched the pointer to an element of one of our
        // groups, which stay allocated until drop.
        unsafe { *handle.ptr.as_ptr() }
    }

    /// Overwrite the element behind a live handle.
    ///
    /// Panics if `handle` is not a live element of this colony.
    pub fn set(&mut self, handle: ColonyHandle<T>, value: T) {
        assert!(self.holds(handle), "writing through a handle this colony does not hold");
        // SAFETY: as in `erase`.
        unsafe { handle.ptr.as_ptr().write(value) }
    }

    /// Number of live elements.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Locations across all groups.
    pub fn capacity(&self) -> usize {
        self.groups.iter().map(Group::capacity).sum()
    }

    fn fresh_location(&mut self) -> (u32, u32) {
        let full = self.groups.last().map_or(true, |g| g.touched == g.capacity());
        if full {
            let capacity = self
                .groups
                .last()
                .map_or(MIN_GROUP_CAPACITY, |g| (g.capacity() * 2).min(MAX_GROUP_CAPACITY));
            self.groups.push(Group::new(capacity));
            trace!(groups = self.groups.len(), capacity, "colony grew");
        }
        let group = self.groups.len() - 1;
        let g = &mut self.groups[group];
        let index = g.touched;
        g.touched += 1;
        (group as u32, index as u32)
    }
}

impl<T> Colony<T> {
    /// Whether `handle` addresses an occupied location of this colony.
    #[inline]
    fn holds(&self, handle: ColonyHandle<T>) -> bool {
        let index = handle.index as usize;
        self.groups.get(handle.group as usize).is_some_and(|g| {
            index < g.capacity() && g.element(index) == handle.ptr && g.occupied.contains(index)
        })
    }
}

impl<T: Copy + Default> Default for Colony<T> {
    fn default() -> Self {
        Self::new()
    }
}

// Inspection used by the model tests.
#[cfg(test)]
impl<T: Copy + Default> Colony<T> {
    /// Value behind `handle`, or `None` if it is not a live element here.
    pub fn get(&self, handle: ColonyHandle<T>) -> Option<T> {
        // SAFETY: `holds` matched the pointer to one of our elements.
        self.holds(handle).then(|| unsafe { *handle.ptr.as_ptr() })
    }

    /// Live values, group by group.
    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        self.groups.iter().flat_map(|g| {
            g.occupied.ones().map(move |i| {
                // SAFETY: `ones` only yields occupied locations.
                unsafe { *g.element(i).as_ptr() }
            })
        })
    }

    pub fn num_groups(&self) -> usize {
        self.groups.len()
    }
}

impl<T> Drop for Colony<T> {
    fn drop(&mut self) {
        for g in self.groups.drain(..) {
            // SAFETY: every group's storage came from `Box::leak` in
            // `Group::new` and is released exactly once here.
            drop(unsafe { Box::from_raw(g.elements.as_ptr()) });
        }
    }
}
