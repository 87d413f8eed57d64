//! The allocator seam every `MapDeque` allocates through.

use core::alloc::Layout;
use core::ptr::{self, NonNull};

/// A trait for the memory source behind a [`MapDeque`](crate::MapDeque).
///
/// This trait is similar to `std::alloc::Allocator` but narrowed to what a
/// chunked container needs: raw block acquisition and release, plus the
/// construct/destroy pair used on individual slots. Both the outer chunk map
/// and every chunk buffer are obtained through it.
///
/// Implementations are not required to be thread-safe; a deque never shares
/// its allocator across threads on its own.
pub trait ChunkAlloc {
    /// Allocates memory according to the given layout.
    ///
    /// `layout` always has a non-zero size.
    ///
    /// # Errors
    /// Returns `AllocError` if allocation fails.
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError>;

    /// Deallocates memory.
    ///
    /// # Safety
    /// `ptr` must denote a block of memory currently allocated by this allocator.
    /// `layout` must be the same layout that was used to allocate that block of memory.
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout);

    /// Moves `value` into the uninitialized slot at `ptr`.
    ///
    /// # Safety
    /// `ptr` must be valid for writes and properly aligned. Any value already
    /// stored there is overwritten without being dropped.
    #[inline(always)]
    unsafe fn construct<T>(&self, ptr: NonNull<T>, value: T) {
        ptr.as_ptr().write(value);
    }

    /// Drops the value stored at `ptr`, leaving the slot uninitialized.
    ///
    /// # Safety
    /// `ptr` must point to an initialized value that is not used afterwards.
    #[inline(always)]
    unsafe fn destroy<T>(&self, ptr: NonNull<T>) {
        ptr::drop_in_place(ptr.as_ptr());
    }
}

impl<A: ChunkAlloc + ?Sized> ChunkAlloc for &A {
    #[inline(always)]
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        (**self).allocate(layout)
    }

    #[inline(always)]
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        (**self).deallocate(ptr, layout);
    }

    #[inline(always)]
    unsafe fn construct<T>(&self, ptr: NonNull<T>, value: T) {
        (**self).construct(ptr, value);
    }

    #[inline(always)]
    unsafe fn destroy<T>(&self, ptr: NonNull<T>) {
        (**self).destroy(ptr);
    }
}

/// The error type for allocation failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocError;

impl core::fmt::Display for AllocError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("memory allocation failed")
    }
}

impl std::error::Error for AllocError {}
