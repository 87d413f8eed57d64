//! The outer chunk map and the window/rebuild protocol built on it.
//!
//! ## Layout
//!
//! ```text
//!             used_begin          used_end
//!                 v                   v
//! map:  [ None | C0 | C1 | C2 | None | None ]
//!                 \    \    \
//!                  K slots each, live elements start at `head` in C0
//! ```
//!
//! Every slot in `[used_begin, used_end)` holds a chunk and every slot outside
//! it is `None`. Growth at either end first consumes the slack around the
//! window; only when a new chunk would land outside the map does a rebuild
//! run. A rebuild moves chunk handles, never elements.

use super::chunk::{chunks_for, index_split, Chunk};
use super::MapDeque;
use crate::alloc::ChunkAlloc;
use crate::error::ReserveError;
use core::alloc::Layout;
use core::ops::Range;
use core::ptr::{self, NonNull};

/// Smallest map a rebuild ever allocates.
pub const MIN_MAP_LEN: usize = 8;

/// Allocator-backed array of chunk handles.
pub(crate) struct ChunkMap<T> {
    ptr: NonNull<Option<Chunk<T>>>,
    len: usize,
}

impl<T> ChunkMap<T> {
    /// The map of an empty deque: no allocation.
    pub(crate) const fn empty() -> Self {
        Self {
            ptr: NonNull::dangling(),
            len: 0,
        }
    }

    /// Allocates a map of `len` slots, all `None`.
    pub(crate) fn allocate<A: ChunkAlloc>(len: usize, alloc: &A) -> Result<Self, ReserveError> {
        debug_assert!(len > 0);
        let layout = Self::layout(len)?;
        let ptr = alloc
            .allocate(layout)
            .map_err(ReserveError::alloc(layout))?
            .cast::<Option<Chunk<T>>>();
        for i in 0..len {
            // SAFETY: `i < len` and the block holds `len` slots.
            unsafe { ptr.as_ptr().add(i).write(None) };
        }
        Ok(Self { ptr, len })
    }

    fn layout(len: usize) -> Result<Layout, ReserveError> {
        Layout::array::<Option<Chunk<T>>>(len).map_err(|_| ReserveError::CapacityOverflow)
    }

    /// Frees the map array itself. Chunks it references are not touched.
    ///
    /// # Safety
    /// The map must have been allocated by `alloc`.
    pub(crate) unsafe fn deallocate<A: ChunkAlloc>(&mut self, alloc: &A) {
        if self.len != 0 {
            let layout = Self::layout(self.len).unwrap_unchecked();
            alloc.deallocate(self.ptr.cast(), layout);
        }
        *self = Self::empty();
    }

    #[inline(always)]
    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    #[inline(always)]
    pub(crate) fn get(&self, slot: usize) -> Option<Chunk<T>> {
        assert!(slot < self.len);
        // SAFETY: bounds checked above.
        unsafe { *self.ptr.as_ptr().add(slot) }
    }

    #[inline(always)]
    pub(crate) fn set(&mut self, slot: usize, chunk: Option<Chunk<T>>) {
        assert!(slot < self.len);
        // SAFETY: bounds checked above.
        unsafe { *self.ptr.as_ptr().add(slot) = chunk };
    }

    /// Moves the handles in `from` so the run starts at `to`, clearing the
    /// slots the run no longer covers.
    pub(crate) fn relocate(&mut self, from: Range<usize>, to: usize) {
        let n = from.len();
        assert!(from.end <= self.len && to + n <= self.len);
        // SAFETY: both runs are in bounds; `ptr::copy` allows overlap.
        unsafe { ptr::copy(self.ptr.as_ptr().add(from.start), self.ptr.as_ptr().add(to), n) };
        for slot in from {
            if slot < to || slot >= to + n {
                self.set(slot, None);
            }
        }
    }

    /// Copies the handles in `from` into `dst` starting at `to`.
    pub(crate) fn transfer(&self, from: Range<usize>, dst: &mut Self, to: usize) {
        let n = from.len();
        assert!(from.end <= self.len && to + n <= dst.len);
        // SAFETY: distinct allocations, both runs in bounds.
        unsafe {
            ptr::copy_nonoverlapping(self.ptr.as_ptr().add(from.start), dst.ptr.as_ptr().add(to), n);
        }
    }

    #[inline(always)]
    pub(crate) fn window<const K: usize>(&self, first: usize, head: usize) -> Window<T, K> {
        Window {
            map: self.ptr,
            first,
            head,
        }
    }
}

/// A copyable view of where logical index 0 lives: the map, the first used
/// map slot and the offset of the first element inside that chunk.
///
/// This is the one place the index translation formula is written down:
/// element `i` lives in map slot `first + (head + i) / K` at offset
/// `(head + i) % K`.
pub(crate) struct Window<T, const K: usize> {
    map: NonNull<Option<Chunk<T>>>,
    first: usize,
    head: usize,
}

impl<T, const K: usize> Clone for Window<T, K> {
    #[inline(always)]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, const K: usize> Copy for Window<T, K> {}

impl<T, const K: usize> Window<T, K> {
    /// Map slot and chunk offset of logical index `index`.
    #[inline(always)]
    pub(crate) const fn locate(&self, index: usize) -> (usize, usize) {
        let (chunk, offset) = index_split::<K>(self.head + index);
        (self.first + chunk, offset)
    }

    /// Pointer to the slot backing logical index `index`.
    ///
    /// # Safety
    /// The slot's chunk must be inside the used window of a live map.
    #[inline(always)]
    pub(crate) unsafe fn slot(self, index: usize) -> NonNull<T> {
        let (slot, offset) = self.locate(index);
        let chunk = *self.map.as_ptr().add(slot);
        debug_assert!(chunk.is_some(), "slot {index} maps outside the used window");
        chunk.unwrap_unchecked().slot(offset)
    }
}

impl<T, const K: usize, A: ChunkAlloc> MapDeque<T, K, A> {
    /// Number of chunks in the used window.
    #[inline(always)]
    pub(super) const fn chunks_in_use(&self) -> usize {
        self.used_end - self.used_begin
    }

    #[inline(always)]
    pub(super) fn window(&self) -> Window<T, K> {
        self.map.window(self.used_begin, self.head)
    }

    /// Grows or re-centers the map so that `front_extra` chunk slots are free
    /// before the window and `back_extra` after it.
    ///
    /// If the current map is at least twice what is needed, the window is
    /// re-centered in place. Otherwise a new map of
    /// `max(2 * needed, MIN_MAP_LEN)` slots is built completely before the old
    /// one is released, so a failed allocation leaves `self` untouched.
    pub(super) fn rebuild(&mut self, front_extra: usize, back_extra: usize) -> Result<(), ReserveError> {
        let live = self.chunks_in_use();
        let needed = live
            .checked_add(front_extra)
            .and_then(|n| n.checked_add(back_extra))
            .ok_or(ReserveError::CapacityOverflow)?;
        let target = needed.checked_mul(2).ok_or(ReserveError::CapacityOverflow)?;

        let old_len = self.map.len();
        let old_window = self.used_begin..self.used_end;
        if old_len >= target {
            let begin = front_extra + (old_len - needed) / 2;
            self.map.relocate(old_window, begin);
            self.used_begin = begin;
            self.used_end = begin + live;
            debug_event!(map_len = old_len, live, begin, "re-centered chunk map in place");
        } else {
            let new_len = target.max(MIN_MAP_LEN);
            let mut map = ChunkMap::allocate(new_len, &self.alloc)?;
            let begin = front_extra + (new_len - needed) / 2;
            self.map.transfer(old_window, &mut map, begin);
            let mut old = core::mem::replace(&mut self.map, map);
            // SAFETY: the old map came from `self.alloc`; its handles now live in the new map.
            unsafe { old.deallocate(&self.alloc) };
            self.used_begin = begin;
            self.used_end = begin + live;
            debug_event!(old_len, new_len, live, begin, "rebuilt chunk map");
        }
        debug_assert!(self.used_begin >= front_extra);
        debug_assert!(self.map.len() - self.used_end >= back_extra);
        Ok(())
    }

    /// Allocates a map of exactly `chunks` slots with the window at its
    /// start. Only valid on a deque without elements; any map it still
    /// holds is released first.
    pub(super) fn init_exact(&mut self, chunks: usize) -> Result<(), ReserveError> {
        debug_assert!(self.len == 0);
        self.release_storage();
        if chunks == 0 {
            return Ok(());
        }
        self.map = ChunkMap::allocate(chunks, &self.alloc)?;
        self.used_begin = 0;
        self.used_end = 0;
        self.head = 0;
        Ok(())
    }

    /// Ensures map slots exist for `additional` more elements at the back,
    /// rebuilding at most once. Chunks themselves are acquired lazily.
    pub(super) fn reserve_back(&mut self, additional: usize) -> Result<(), ReserveError> {
        let slots = self
            .head
            .checked_add(self.len)
            .and_then(|n| n.checked_add(additional))
            .ok_or(ReserveError::CapacityOverflow)?;
        let chunks = chunks_for::<K>(slots);
        if self.used_begin + chunks > self.map.len() {
            self.rebuild(0, chunks - self.chunks_in_use())?;
        }
        Ok(())
    }

    /// Makes the slot at logical index `len` writable.
    pub(super) fn reserve_back_slot(&mut self) -> Result<(), ReserveError> {
        if self.head + self.len < self.chunks_in_use() * K {
            return Ok(());
        }
        if self.used_end == self.map.len() {
            self.rebuild(0, 1)?;
        }
        match Chunk::allocate::<K, A>(&self.alloc) {
            Ok(chunk) => {
                self.map.set(self.used_end, Some(chunk));
                self.used_end += 1;
                Ok(())
            }
            Err(err) => {
                self.trim_window();
                Err(err)
            }
        }
    }

    /// Makes the slot just before logical index 0 writable. On success the
    /// caller must consume it by decrementing `head`.
    pub(super) fn reserve_front_slot(&mut self) -> Result<(), ReserveError> {
        if self.head > 0 {
            return Ok(());
        }
        if self.used_begin == 0 {
            self.rebuild(1, 0)?;
        }
        match Chunk::allocate::<K, A>(&self.alloc) {
            Ok(chunk) => {
                self.used_begin -= 1;
                self.map.set(self.used_begin, Some(chunk));
                self.head = K;
                Ok(())
            }
            Err(err) => {
                self.trim_window();
                Err(err)
            }
        }
    }

    /// Releases boundary chunks that no longer back any live element, and
    /// all storage once the deque is empty.
    pub(super) fn trim_window(&mut self) {
        if self.len == 0 {
            self.release_storage();
            return;
        }
        while self.head >= K {
            let chunk = self.map.get(self.used_begin);
            self.map.set(self.used_begin, None);
            self.used_begin += 1;
            self.head -= K;
            if let Some(chunk) = chunk {
                // SAFETY: every slot of a chunk before `head` is vacant.
                unsafe { chunk.deallocate::<K, A>(&self.alloc) };
            }
        }
        while self.chunks_in_use() > chunks_for::<K>(self.head + self.len) {
            self.used_end -= 1;
            let chunk = self.map.get(self.used_end);
            self.map.set(self.used_end, None);
            if let Some(chunk) = chunk {
                // SAFETY: the chunk lies past the last live element.
                unsafe { chunk.deallocate::<K, A>(&self.alloc) };
            }
        }
    }

    /// Frees every chunk in the window and the map, returning to the
    /// canonical empty state. Live elements must already be gone.
    pub(super) fn release_storage(&mut self) {
        for slot in self.used_begin..self.used_end {
            if let Some(chunk) = self.map.get(slot) {
                // SAFETY: the caller guarantees no live elements remain.
                unsafe { chunk.deallocate::<K, A>(&self.alloc) };
            }
        }
        // SAFETY: the map came from `self.alloc`.
        unsafe { self.map.deallocate(&self.alloc) };
        self.used_begin = 0;
        self.used_end = 0;
        self.head = 0;
        self.len = 0;
    }
}
