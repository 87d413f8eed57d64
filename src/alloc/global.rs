//! The process-wide allocator as a [`ChunkAlloc`].
//!
//! Delegates to `std::alloc`, so whatever `#[global_allocator]` the final
//! binary installs (system, mimalloc, jemalloc, ...) backs every chunk.

use crate::alloc::{AllocError, ChunkAlloc};
use core::alloc::Layout;
use core::ptr::NonNull;
use std::alloc::{alloc, dealloc};

/// The global memory allocator.
///
/// Zero-sized and stateless; this is the default allocator parameter of
/// [`MapDeque`](crate::MapDeque).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Global;

impl ChunkAlloc for Global {
    #[inline]
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        debug_assert!(layout.size() != 0, "zero-sized allocations are never requested");
        // SAFETY: callers never request zero-sized layouts.
        let ptr = unsafe { alloc(layout) };
        NonNull::new(ptr).ok_or(AllocError)
    }

    #[inline]
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        dealloc(ptr.as_ptr(), layout);
    }
}
