//! Fixed-size chunk buffers and the index split they are addressed by.
//!
//! A chunk is `K` contiguous, possibly uninitialized slots obtained from the
//! deque's allocator. Which slots are live is tracked by the deque, never by
//! the chunk itself.

use crate::alloc::ChunkAlloc;
use crate::error::ReserveError;
use core::alloc::Layout;
use core::ptr::NonNull;

/// Typed handle to one chunk of `K` slots.
///
/// Handles are plain pointers: copying one never copies elements, which is
/// what lets a rebuild relocate chunks inside the map for free.
pub(crate) struct Chunk<T> {
    ptr: NonNull<T>,
}

// Handles are niche-optimized pointers, so a map slot is one word.
const _: () = assert!(core::mem::size_of::<Option<Chunk<u64>>>() == core::mem::size_of::<usize>());

impl<T> Clone for Chunk<T> {
    #[inline(always)]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Chunk<T> {}

impl<T> Chunk<T> {
    #[inline]
    fn layout<const K: usize>() -> Result<Layout, ReserveError> {
        Layout::array::<T>(K).map_err(|_| ReserveError::CapacityOverflow)
    }

    /// Allocates an uninitialized chunk.
    pub(crate) fn allocate<const K: usize, A: ChunkAlloc>(alloc: &A) -> Result<Self, ReserveError> {
        let layout = Self::layout::<K>()?;
        if layout.size() == 0 {
            // Zero-sized elements need no backing memory.
            return Ok(Self {
                ptr: NonNull::dangling(),
            });
        }
        let ptr = alloc
            .allocate(layout)
            .map_err(ReserveError::alloc(layout))?;
        trace_event!(bytes = layout.size(), "acquired chunk");
        Ok(Self { ptr: ptr.cast() })
    }

    /// Returns the chunk's memory to `alloc`.
    ///
    /// # Safety
    /// The chunk must have been allocated by `alloc` with the same `K`, hold
    /// no live elements, and not be used afterwards.
    pub(crate) unsafe fn deallocate<const K: usize, A: ChunkAlloc>(self, alloc: &A) {
        // SAFETY: the same layout was computed successfully at allocation.
        let layout = Layout::array::<T>(K).unwrap_unchecked();
        if layout.size() != 0 {
            alloc.deallocate(self.ptr.cast(), layout);
            trace_event!(bytes = layout.size(), "released chunk");
        }
    }

    /// Pointer to slot `offset`.
    ///
    /// # Safety
    /// `offset` must be less than the chunk's `K`.
    #[inline(always)]
    pub(crate) unsafe fn slot(self, offset: usize) -> NonNull<T> {
        NonNull::new_unchecked(self.ptr.as_ptr().add(offset))
    }

    /// Destroys the live run `start..end` of this chunk through `alloc`.
    ///
    /// # Safety
    /// Every slot in `start..end` must be initialized and is uninitialized
    /// afterwards.
    #[inline]
    pub(crate) unsafe fn drop_run<A: ChunkAlloc>(self, start: usize, end: usize, alloc: &A) {
        for offset in start..end {
            alloc.destroy(self.slot(offset));
        }
    }
}

/// Splits a window-relative slot number into `(chunk, offset)`.
#[inline(always)]
pub(crate) const fn index_split<const K: usize>(idx: usize) -> (usize, usize) {
    if K == 0 {
        panic!("MapDeque chunk size K must be > 0");
    }
    if K.is_power_of_two() {
        let shift = K.trailing_zeros() as usize;
        let mask = K - 1;
        (idx >> shift, idx & mask)
    } else {
        (idx / K, idx % K)
    }
}

/// Number of chunks needed to cover `slots` slots.
#[inline(always)]
pub(crate) const fn chunks_for<const K: usize>(slots: usize) -> usize {
    let (whole, rest) = index_split::<K>(slots);
    whole + (rest != 0) as usize
}
