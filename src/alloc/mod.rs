//! Slot allocation strategies.
//!
//! A strategy decides how a slot value becomes a storable element:
//!
//! - [`Inline`]: the primitive itself.
//! - [`Boxed`]: one global-heap allocation per value.
//! - [`Pooled`]: cells from a free-list pool, freed back to the pool.
//! - [`Colonized`]: elements of a colony, with stable handles.
//!
//! Containers never order or hash handles by identity. [`ByValue`] wraps any
//! [`SlotHandle`] and compares, orders and hashes through
//! [`SlotHandle::primitive_value`].
//!
//! Pooled and colony handles are plain pointers with no lifetime tying them
//! to their storage. The pools themselves stay private to the crate and the
//! [`SlotAlloc`] methods that hand out or take back handles are `unsafe`, so
//! keeping a handle inside its allocator's lifetime is the caller's
//! obligation. The games in this crate discharge it by freeing every handle
//! in `Drop`.

mod colony;
mod pool;

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::ops::{Deref, DerefMut};

pub use colony::ColonyHandle;
pub use pool::PoolPtr;

pub(crate) use colony::Colony;
pub(crate) use pool::Pool;

use crate::primitive::SlotValue;

/// The stored representation of a slot value.
pub trait SlotHandle {
    /// Primitive the handle resolves to.
    type Value: SlotValue;

    /// The underlying slot value.
    fn primitive_value(&self) -> Self::Value;
}

macro_rules! impl_inline_handle {
    ($($t:ty),*) => {$(
        impl SlotHandle for $t {
            type Value = $t;

            #[inline]
            fn primitive_value(&self) -> $t {
                *self
            }
        }
    )*};
}

impl_inline_handle!(u8, u16, u32, u64, i8, i16, i32, i64);

impl<P: SlotValue> SlotHandle for Box<P> {
    type Value = P;

    #[inline]
    fn primitive_value(&self) -> P {
        **self
    }
}

/// Compares, orders and hashes a handle by its primitive value.
#[derive(Clone, Copy)]
#[repr(transparent)]
pub struct ByValue<H>(pub H);

impl<H: SlotHandle> ByValue<H> {
    /// The underlying slot value.
    #[inline]
    pub fn value(&self) -> H::Value {
        self.0.primitive_value()
    }
}

impl<H: SlotHandle> PartialEq for ByValue<H> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.value() == other.value()
    }
}

impl<H: SlotHandle> Eq for ByValue<H> {}

impl<H: SlotHandle> PartialOrd for ByValue<H> {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<H: SlotHandle> Ord for ByValue<H> {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.value().cmp(&other.value())
    }
}

impl<H: SlotHandle> Hash for ByValue<H> {
    #[inline]
    fn hash<S: Hasher>(&self, state: &mut S) {
        self.value().hash(state)
    }
}

impl<H: SlotHandle> fmt::Debug for ByValue<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ByValue").field(&self.value()).finish()
    }
}

/// How slot values are materialized as container elements.
///
/// `live` counts handles handed out and not yet freed, which lets a game
/// check it returned everything.
///
/// # Safety
///
/// The handle-taking methods share one contract. A handle may only be passed
/// back to the allocator that produced it, at most once to `free`, and it
/// must not be read, through [`SlotHandle::primitive_value`] or a
/// [`ByValue`] comparison, after it is freed or the allocator is dropped.
pub trait SlotAlloc: Default {
    /// Primitive being stored.
    type Value: SlotValue;

    /// Element stored in containers.
    type Handle: SlotHandle<Value = Self::Value>;

    /// Strategy name for labels; empty for inline storage.
    const NAME: &'static str;

    /// A handle holding `value`.
    ///
    /// # Safety
    ///
    /// The returned handle falls under the trait's handle contract.
    unsafe fn alloc_with(&mut self, value: Self::Value) -> Self::Handle;

    /// A handle holding the default value.
    ///
    /// # Safety
    ///
    /// As for [`alloc_with`](Self::alloc_with).
    unsafe fn alloc(&mut self) -> Self::Handle {
        // SAFETY: forwarded to the caller.
        unsafe { self.alloc_with(Self::Value::default()) }
    }

    /// Overwrites the value behind a live handle.
    ///
    /// # Safety
    ///
    /// `handle` must be live and come from this allocator.
    unsafe fn assign(&mut self, handle: &mut Self::Handle, value: Self::Value);

    /// Releases a handle's storage.
    ///
    /// # Safety
    ///
    /// `handle` must be live and come from this allocator. It is dead
    /// afterwards.
    unsafe fn free(&mut self, handle: Self::Handle);

    /// Handles currently outstanding.
    fn live(&self) -> usize;

    /// Element label, e.g. `u16` or `Pooled<u16>`.
    fn label() -> String {
        if Self::NAME.is_empty() {
            Self::Value::NAME.to_string()
        } else {
            format!("{}<{}>", Self::NAME, Self::Value::NAME)
        }
    }
}

/// Stores the primitive directly.
#[derive(Debug)]
pub struct Inline<P> {
    live: usize,
    _marker: PhantomData<P>,
}

impl<P> Default for Inline<P> {
    fn default() -> Self {
        Self {
            live: 0,
            _marker: PhantomData,
        }
    }
}

impl<P> SlotAlloc for Inline<P>
where
    P: SlotValue + SlotHandle<Value = P>,
{
    type Value = P;
    type Handle = P;
    const NAME: &'static str = "";

    #[inline]
    unsafe fn alloc_with(&mut self, value: P) -> P {
        self.live += 1;
        value
    }

    #[inline]
    unsafe fn assign(&mut self, handle: &mut P, value: P) {
        *handle = value;
    }

    #[inline]
    unsafe fn free(&mut self, _handle: P) {
        self.live -= 1;
    }

    fn live(&self) -> usize {
        self.live
    }
}

/// One global-heap allocation per value.
#[derive(Debug)]
pub struct Boxed<P> {
    live: usize,
    _marker: PhantomData<P>,
}

impl<P> Default for Boxed<P> {
    fn default() -> Self {
        Self {
            live: 0,
            _marker: PhantomData,
        }
    }
}

impl<P: SlotValue> SlotAlloc for Boxed<P> {
    type Value = P;
    type Handle = Box<P>;
    const NAME: &'static str = "Box";

    #[inline]
    unsafe fn alloc_with(&mut self, value: P) -> Box<P> {
        self.live += 1;
        Box::new(value)
    }

    #[inline]
    unsafe fn assign(&mut self, handle: &mut Box<P>, value: P) {
        **handle = value;
    }

    #[inline]
    unsafe fn free(&mut self, handle: Box<P>) {
        self.live -= 1;
        drop(handle);
    }

    fn live(&self) -> usize {
        self.live
    }
}

/// Cells from a free-list pool.
#[derive(Default)]
pub struct Pooled<P: SlotValue> {
    pool: Pool<P>,
}

impl<P: SlotValue> SlotAlloc for Pooled<P> {
    type Value = P;
    type Handle = PoolPtr<P>;
    const NAME: &'static str = "Pooled";

    #[inline]
    unsafe fn alloc_with(&mut self, value: P) -> PoolPtr<P> {
        self.pool.alloc(value)
    }

    #[inline]
    unsafe fn assign(&mut self, handle: &mut PoolPtr<P>, value: P) {
        // SAFETY: the caller vouches that `handle` is a live cell of our pool.
        unsafe { self.pool.set(*handle, value) }
    }

    #[inline]
    unsafe fn free(&mut self, handle: PoolPtr<P>) {
        // SAFETY: as in `assign`.
        unsafe { self.pool.free(handle) }
    }

    fn live(&self) -> usize {
        self.pool.len()
    }
}

/// Elements of a colony.
#[derive(Default)]
pub struct Colonized<P: SlotValue> {
    colony: Colony<P>,
}

impl<P: SlotValue> SlotAlloc for Colonized<P> {
    type Value = P;
    type Handle = ColonyHandle<P>;
    const NAME: &'static str = "Colony";

    #[inline]
    unsafe fn alloc_with(&mut self, value: P) -> ColonyHandle<P> {
        self.colony.insert(value)
    }

    #[inline]
    unsafe fn assign(&mut self, handle: &mut ColonyHandle<P>, value: P) {
        self.colony.set(*handle, value);
    }

    #[inline]
    unsafe fn free(&mut self, handle: ColonyHandle<P>) {
        self.colony.erase(handle);
    }

    fn live(&self) -> usize {
        self.colony.len()
    }
}

/// Sentinel handles an open-addressing set game keeps allocated.
pub const SENTINELS: usize = 2;

/// Owns an allocator together with the two sentinel handles an
/// open-addressing set reserves as empty and deleted markers.
///
/// The sentinel values come from [`SlotValue::sentinels`]. Both handles are
/// freed when the scope is dropped, so the scope must outlive the set that
/// stores copies of them.
pub(crate) struct SentinelScope<A>
where
    A: SlotAlloc,
    A::Handle: Copy,
{
    alloc: A,
    empty: A::Handle,
    deleted: A::Handle,
}

impl<A> SentinelScope<A>
where
    A: SlotAlloc,
    A::Handle: Copy,
{
    /// Allocates both sentinels from `alloc`.
    pub fn acquire(mut alloc: A) -> Self {
        let [empty, deleted] = A::Value::sentinels();
        // SAFETY: both handles stay private to the scope and are freed into
        // `alloc` in `Drop`, before the allocator goes.
        let (empty, deleted) = unsafe { (alloc.alloc_with(empty), alloc.alloc_with(deleted)) };
        Self {
            alloc,
            empty,
            deleted,
        }
    }

    /// Handle marking a never-used bucket.
    pub fn empty(&self) -> A::Handle {
        self.empty
    }

    /// Handle marking a bucket whose key was removed.
    pub fn deleted(&self) -> A::Handle {
        self.deleted
    }
}

impl<A> Deref for SentinelScope<A>
where
    A: SlotAlloc,
    A::Handle: Copy,
{
    type Target = A;

    fn deref(&self) -> &A {
        &self.alloc
    }
}

impl<A> DerefMut for SentinelScope<A>
where
    A: SlotAlloc,
    A::Handle: Copy,
{
    fn deref_mut(&mut self) -> &mut A {
        &mut self.alloc
    }
}

impl<A> Drop for SentinelScope<A>
where
    A: SlotAlloc,
    A::Handle: Copy,
{
    fn drop(&mut self) {
        // SAFETY: allocated from `self.alloc` in `acquire` and freed only here.
        unsafe {
            self.alloc.free(self.empty);
            self.alloc.free(self.deleted);
        }
    }
}
