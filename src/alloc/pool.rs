//! Free-list pool for fixed-size cells.
//!
//! Cells are carved out of chunks that never move once allocated, so a
//! [`PoolPtr`] is a plain pointer into a chunk. Freed cells go on a free list
//! and are handed out again before the pool bumps into fresh chunk space.
//! Nothing is returned to the global allocator until the pool is dropped.

use std::fmt;
use std::mem;
use std::ptr::NonNull;

use tracing::trace;

use crate::alloc::SlotHandle;
use crate::primitive::SlotValue;

/// Bytes per chunk for [`Pool::new`].
const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// A pool of `T` cells with individual free.
pub(crate) struct Pool<T> {
    chunks: Vec<NonNull<[T]>>,
    free: Vec<NonNull<T>>,
    /// Next untouched cell in the last chunk.
    bump: usize,
    chunk_len: usize,
    live: usize,
}

/// Pointer to a pool cell.
///
/// Only obtainable through [`SlotAlloc::alloc_with`](crate::alloc::SlotAlloc::alloc_with)
/// on [`Pooled`](crate::alloc::Pooled). Valid until the matching free or
/// until the pool is dropped, whichever comes first.
pub struct PoolPtr<T>(NonNull<T>);

impl<T> Clone for PoolPtr<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for PoolPtr<T> {}

impl<T> fmt::Debug for PoolPtr<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PoolPtr").field(&self.0).finish()
    }
}

impl<T> PoolPtr<T> {
    /// Address of the cell, for identity checks.
    pub fn as_ptr(self) -> *const T {
        self.0.as_ptr()
    }
}

impl<T: SlotValue> SlotHandle for PoolPtr<T> {
    type Value = T;

    #[inline]
    fn primitive_value(&self) -> T {
        // SAFETY: pool pointers only leave the crate through the unsafe
        // `SlotAlloc` methods, whose callers keep them inside the pool's
        // lifetime and before their free.
        unsafe { *self.0.as_ptr() }
    }
}

impl<T: Copy + Default> Pool<T> {
    pub fn new() -> Self {
        Self::with_chunk_size(DEFAULT_CHUNK_SIZE)
    }

    /// Chunks span `bytes` bytes, rounded down to whole cells but never empty.
    pub fn with_chunk_size(bytes: usize) -> Self {
        let chunk_len = (bytes / mem::size_of::<T>().max(1)).max(1);
        Self {
            chunks: Vec::new(),
            free: Vec::new(),
            bump: chunk_len,
            chunk_len,
            live: 0,
        }
    }

    /// Take a cell and store `value` in it.
    #[inline]
    pub fn alloc(&mut self, value: T) -> PoolPtr<T> {
        let cell = match self.free.pop() {
            Some(cell) => cell,
            None => self.bump_cell(),
        };
        // SAFETY: the cell lies inside a chunk we own and no live handle
        // refers to it.
        unsafe { cell.as_ptr().write(value) };
        self.live += 1;
        PoolPtr(cell)
    }

    /// Return a cell to the free list.
    ///
    /// # Safety
    ///
    /// `ptr` must come from this pool's [`alloc`](Self::alloc) and must not
    /// have been freed since.
    #[inline]
    pub unsafe fn free(&mut self, ptr: PoolPtr<T>) {
        debug_assert!(self.live > 0, "free on an empty pool");
        self.free.push(ptr.0);
        self.live -= 1;
    }

    /// Overwrite a live cell.
    ///
    /// # Safety
    ///
    /// `ptr` must be a live cell of this pool.
    #[inline]
    pub unsafe fn set(&mut self, ptr: PoolPtr<T>, value: T) {
        // SAFETY: guaranteed by the caller.
        unsafe { ptr.0.as_ptr().write(value) }
    }

    /// Number of cells currently handed out.
    pub fn len(&self) -> usize {
        self.live
    }

    /// Cells carved out so far, handed out or on the free list.
    pub fn capacity(&self) -> usize {
        self.chunks.len() * self.chunk_len
    }

    fn bump_cell(&mut self) -> NonNull<T> {
        if self.bump == self.chunk_len {
            self.grow();
        }
        let chunk = self.chunks[self.chunks.len() - 1];
        // SAFETY: `bump < chunk_len`, the length of every chunk.
        let cell = unsafe { NonNull::new_unchecked(chunk.cast::<T>().as_ptr().add(self.bump)) };
        self.bump += 1;
        cell
    }

    fn grow(&mut self) {
        let chunk: Box<[T]> = vec![T::default(); self.chunk_len].into_boxed_slice();
        self.chunks.push(NonNull::from(Box::leak(chunk)));
        self.bump = 0;
        trace!(chunks = self.chunks.len(), cells = self.capacity(), "pool grew");
    }
}

impl<T: Copy + Default> Default for Pool<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for Pool<T> {
    fn drop(&mut self) {
        for chunk in self.chunks.drain(..) {
            // SAFETY: every chunk came from `Box::leak` in `grow` and is
            // released exactly once here.
            drop(unsafe { Box::from_raw(chunk.as_ptr()) });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_basic() {
        let mut pool: Pool<u32> = Pool::new();
        let a = pool.alloc(7);
        let b = pool.alloc(9);
        assert_eq!(a.primitive_value(), 7);
        assert_eq!(b.primitive_value(), 9);
        assert_eq!(pool.len(), 2);

        unsafe { pool.set(a, 11) };
        assert_eq!(a.primitive_value(), 11);
        assert_eq!(b.primitive_value(), 9);
    }

    #[test]
    fn test_pool_reuses_freed_cells() {
        let mut pool: Pool<u64> = Pool::new();
        let a = pool.alloc(1);
        let addr = a.as_ptr();
        unsafe { pool.free(a) };
        assert_eq!(pool.len(), 0);

        let b = pool.alloc(2);
        assert_eq!(b.as_ptr(), addr);
        assert_eq!(b.primitive_value(), 2);
    }

    #[test]
    fn test_pool_grows_in_chunks() {
        let mut pool: Pool<u64> = Pool::with_chunk_size(4 * 8);
        let ptrs: Vec<_> = (0..10u64).map(|i| pool.alloc(i)).collect();
        assert_eq!(pool.capacity(), 12);
        for (i, p) in ptrs.iter().enumerate() {
            assert_eq!(p.primitive_value(), i as u64);
        }
    }

    #[test]
    fn test_pool_tiny_chunk() {
        let mut pool: Pool<u64> = Pool::with_chunk_size(1);
        let a = pool.alloc(5);
        let b = pool.alloc(6);
        assert_eq!((a.primitive_value(), b.primitive_value()), (5, 6));
        assert_eq!(pool.capacity(), 2);
    }
}
