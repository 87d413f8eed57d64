//! A double-ended queue over a map of fixed-size chunks.
//!
//! ## Performance Characteristics
//!
//! ### Time Complexity
//! - **push/pop at either end**: O(1) amortized - one chunk allocation every
//!   `K` pushes, one map rebuild whenever the slack around the window runs out
//! - **Indexing**: O(1) - `(head + i) / K` picks the chunk, `(head + i) % K` the slot
//! - **insert/erase**: O(min(i, len - i)) - elements between the position and
//!   the nearer end move by one slot
//! - **Iteration**: O(1) per element
//!
//! ### Memory Layout
//! - **Chunks**: `K` contiguous slots each, allocated and freed one at a time
//! - **Map**: one contiguous array of chunk handles with slack on both sides
//! - **Stable chunks**: growing the map relocates handles; elements never move
//!   during a rebuild
//!
//! ## Chunk retirement
//!
//! Chunks are released as soon as the last live slot they back is vacated,
//! whichever operation vacates it (`pop_*`, `erase`, `remove`, `truncate`,
//! `resize`, `clear`, `clone_from`). When the deque becomes empty the map is
//! released too, so an empty deque owns no memory. The price is one chunk
//! allocation when a push crosses back over a boundary that a pop just
//! retired; the amortized bounds above are unaffected.
//!
//! ## Thread safety
//!
//! `MapDeque` has no internal synchronization. It is `Send`/`Sync` when its
//! element and allocator types are, exactly like `Vec`; sharing it mutably
//! across threads requires external locking.
//!
//! ## Usage
//!
//! ```rust
//! use mapdeque::MapDeque;
//!
//! let mut dq: MapDeque<i32> = MapDeque::new();
//! dq.push_back(1);
//! dq.push_back(2);
//! dq.push_back(3);
//! dq.push_front(0);
//! assert_eq!(dq, [0, 1, 2, 3]);
//!
//! let pos = (dq.begin() + 1).position();
//! let next = dq.erase(pos);
//! assert_eq!(dq[next], 2);
//! assert_eq!(dq.at(3).unwrap_err().to_string(), "deque::_M_range_check");
//! ```

mod chunk;
mod cmp;
mod cursor;
mod iter;
mod map;

#[cfg(feature = "proptest")]
mod arbitrary;

pub use cursor::{Cursor, Position};
pub use iter::{IntoIter, Iter, IterMut};
pub use map::MIN_MAP_LEN;

use crate::alloc::{ChunkAlloc, Global};
use crate::error::{infallible, OutOfRange, ReserveError};
use chunk::chunks_for;
use core::marker::PhantomData;
use core::ops::{Index, IndexMut};
use core::ptr::NonNull;
use cursor::Generation;
use map::ChunkMap;

/// Default number of element slots per chunk.
pub const DEFAULT_CHUNK_SIZE: usize = 10;

/// A double-ended queue stored as a map of `K`-slot chunks.
///
/// `A` supplies both the chunk buffers and the map array; see
/// [`ChunkAlloc`].
pub struct MapDeque<T, const K: usize = DEFAULT_CHUNK_SIZE, A: ChunkAlloc = Global> {
    map: ChunkMap<T>,
    /// First map slot of the used window.
    used_begin: usize,
    /// One past the last map slot of the used window.
    used_end: usize,
    /// Offset of the first element inside the chunk at `used_begin`.
    head: usize,
    len: usize,
    generation: Generation,
    alloc: A,
    _marker: PhantomData<T>,
}

// SAFETY: `MapDeque` owns its elements and storage like `Vec<T, A>` does.
unsafe impl<T: Send, const K: usize, A: ChunkAlloc + Send> Send for MapDeque<T, K, A> {}
// SAFETY: shared access only hands out `&T` and `&A`.
unsafe impl<T: Sync, const K: usize, A: ChunkAlloc + Sync> Sync for MapDeque<T, K, A> {}

impl<T, const K: usize> MapDeque<T, K, Global> {
    /// Creates an empty deque. Does not allocate.
    ///
    /// A chunk size of zero is rejected when the constructor is instantiated:
    ///
    /// ```compile_fail
    /// let _ = mapdeque::MapDeque::<u8, 0>::new();
    /// ```
    pub const fn new() -> Self {
        Self::new_in(Global)
    }

    /// Creates a deque of `n` clones of `value`, backed by a map of exactly
    /// `ceil(n / K)` chunks.
    pub fn from_elem(n: usize, value: T) -> Self
    where
        T: Clone,
    {
        Self::from_elem_in(n, value, Global)
    }
}

impl<T, const K: usize, A: ChunkAlloc> MapDeque<T, K, A> {
    /// Evaluated by every constructor, so a zero chunk size fails to build.
    const NONZERO_CHUNK: () = assert!(K != 0, "MapDeque chunk size K must be > 0");

    /// Creates an empty deque that will allocate from `alloc`.
    pub const fn new_in(alloc: A) -> Self {
        let () = Self::NONZERO_CHUNK;
        Self {
            map: ChunkMap::empty(),
            used_begin: 0,
            used_end: 0,
            head: 0,
            len: 0,
            generation: Generation::new(),
            alloc,
            _marker: PhantomData,
        }
    }

    /// Like [`from_elem`](MapDeque::from_elem), allocating from `alloc`.
    pub fn from_elem_in(n: usize, value: T, alloc: A) -> Self
    where
        T: Clone,
    {
        infallible(Self::try_from_elem_in(n, value, alloc))
    }

    /// Fallible form of [`from_elem_in`](MapDeque::from_elem_in).
    ///
    /// # Errors
    /// Returns `ReserveError` if the map or a chunk cannot be allocated.
    /// Elements cloned so far are dropped.
    pub fn try_from_elem_in(n: usize, value: T, alloc: A) -> Result<Self, ReserveError>
    where
        T: Clone,
    {
        let mut deque = Self::new_in(alloc);
        deque.init_exact(chunks_for::<K>(n))?;
        deque.try_extend_exact(core::iter::repeat(value), n)?;
        Ok(deque)
    }

    /// Returns the chunk size parameter as a runtime value.
    #[inline(always)]
    pub const fn chunk_size() -> usize {
        K
    }

    /// Returns the number of elements.
    #[inline(always)]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if there are no elements.
    #[inline(always)]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of elements the deque can hold, growing at the back, before
    /// the map has to be rebuilt.
    pub fn capacity(&self) -> usize {
        if self.map.len() == 0 {
            return 0;
        }
        (self.map.len() - self.used_begin) * K - self.head
    }

    /// Number of chunks currently backing elements.
    #[inline]
    pub const fn chunk_count(&self) -> usize {
        self.chunks_in_use()
    }

    /// Length of the chunk map, used slots and slack included.
    #[inline]
    pub const fn map_len(&self) -> usize {
        self.map.len()
    }

    /// Returns a reference to the allocator.
    #[inline]
    pub const fn allocator(&self) -> &A {
        &self.alloc
    }

    #[inline(always)]
    fn slot(&self, index: usize) -> NonNull<T> {
        debug_assert!(index <= self.len && self.head + index < self.chunks_in_use() * K);
        // SAFETY: callers only address slots inside the used window.
        unsafe { self.window().slot(index) }
    }

    /// Returns a reference to the element at `index`, or `None` if out of bounds.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&T> {
        if index >= self.len {
            return None;
        }
        // SAFETY: `index < len`, so the slot is initialized.
        Some(unsafe { self.get_unchecked(index) })
    }

    /// Returns a mutable reference to the element at `index`, or `None` if out of bounds.
    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        if index >= self.len {
            return None;
        }
        // SAFETY: `index < len`, so the slot is initialized.
        Some(unsafe { &mut *self.slot(index).as_ptr() })
    }

    /// Returns a reference to the element at `index` without bounds checks.
    ///
    /// # Safety
    /// Caller must ensure `index < self.len()`.
    #[inline(always)]
    pub unsafe fn get_unchecked(&self, index: usize) -> &T {
        &*self.window().slot(index).as_ptr()
    }

    /// Checked access.
    ///
    /// # Errors
    /// Returns [`OutOfRange`] when `index >= self.len()`; its message is
    /// always [`OutOfRange::MESSAGE`].
    pub fn at(&self, index: usize) -> Result<&T, OutOfRange> {
        let len = self.len;
        self.get(index).ok_or(OutOfRange { index, len })
    }

    /// Checked mutable access.
    ///
    /// # Errors
    /// Returns [`OutOfRange`] when `index >= self.len()`.
    pub fn at_mut(&mut self, index: usize) -> Result<&mut T, OutOfRange> {
        let len = self.len;
        self.get_mut(index).ok_or(OutOfRange { index, len })
    }

    /// Returns the first element, or `None` if empty.
    #[inline]
    pub fn front(&self) -> Option<&T> {
        self.get(0)
    }

    /// Returns the last element, or `None` if empty.
    #[inline]
    pub fn back(&self) -> Option<&T> {
        self.get(self.len.wrapping_sub(1))
    }

    /// Returns the first element mutably, or `None` if empty.
    #[inline]
    pub fn front_mut(&mut self) -> Option<&mut T> {
        self.get_mut(0)
    }

    /// Returns the last element mutably, or `None` if empty.
    #[inline]
    pub fn back_mut(&mut self) -> Option<&mut T> {
        self.get_mut(self.len.wrapping_sub(1))
    }

    /// Returns `true` if the deque contains an element equal to `x`.
    pub fn contains(&self, x: &T) -> bool
    where
        T: PartialEq,
    {
        self.iter().any(|e| e == x)
    }

    /// Appends an element to the back.
    ///
    /// # Panics
    /// Panics on capacity overflow; aborts through `handle_alloc_error` if
    /// the allocator fails.
    #[inline]
    pub fn push_back(&mut self, value: T) {
        infallible(self.try_push_back(value));
    }

    /// Fallible form of [`push_back`](Self::push_back).
    ///
    /// # Errors
    /// Returns `ReserveError` if a chunk or a larger map cannot be
    /// allocated. The deque is unchanged and `value` is dropped.
    pub fn try_push_back(&mut self, value: T) -> Result<(), ReserveError> {
        self.reserve_back_slot()?;
        // SAFETY: the slot at `len` was just made writable and is vacant.
        unsafe { self.alloc.construct(self.slot(self.len), value) };
        self.len += 1;
        self.generation.bump();
        debug_assert!(self.is_valid());
        Ok(())
    }

    /// Prepends an element to the front.
    ///
    /// # Panics
    /// Panics on capacity overflow; aborts through `handle_alloc_error` if
    /// the allocator fails.
    #[inline]
    pub fn push_front(&mut self, value: T) {
        infallible(self.try_push_front(value));
    }

    /// Fallible form of [`push_front`](Self::push_front).
    ///
    /// # Errors
    /// Returns `ReserveError` if a chunk or a larger map cannot be
    /// allocated. The deque is unchanged and `value` is dropped.
    pub fn try_push_front(&mut self, value: T) -> Result<(), ReserveError> {
        self.reserve_front_slot()?;
        self.head -= 1;
        // SAFETY: the slot before the old front is vacant and inside the window.
        unsafe { self.alloc.construct(self.slot(0), value) };
        self.len += 1;
        self.generation.bump();
        debug_assert!(self.is_valid());
        Ok(())
    }

    /// Removes and returns the last element, or `None` if empty.
    pub fn pop_back(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        // SAFETY: the slot held the last live element; it is vacant from now on.
        let value = unsafe { self.slot(self.len).as_ptr().read() };
        self.trim_window();
        self.generation.bump();
        debug_assert!(self.is_valid());
        Some(value)
    }

    /// Removes and returns the first element, or `None` if empty.
    pub fn pop_front(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        // SAFETY: the slot held the first live element; it is vacant from now on.
        let value = unsafe { self.slot(0).as_ptr().read() };
        self.head += 1;
        self.len -= 1;
        self.trim_window();
        self.generation.bump();
        debug_assert!(self.is_valid());
        Some(value)
    }

    /// Moves the element at `from` into the vacant slot `to`.
    ///
    /// # Safety
    /// `from` must be initialized and `to` vacant; `from` is vacant afterwards.
    #[inline(always)]
    unsafe fn move_slot(&self, from: usize, to: usize) {
        core::ptr::copy_nonoverlapping(self.slot(from).as_ptr(), self.slot(to).as_ptr(), 1);
    }

    /// Inserts `value` at `index`, shifting the elements on the nearer side.
    ///
    /// # Panics
    /// Panics if `index > len`, on capacity overflow, or (through
    /// `handle_alloc_error`) on allocation failure.
    pub fn insert_at(&mut self, index: usize, value: T) {
        infallible(self.try_insert_at(index, value));
    }

    /// Fallible form of [`insert_at`](Self::insert_at).
    ///
    /// # Errors
    /// Returns `ReserveError` if the deque needed storage it could not get.
    /// The deque is unchanged and `value` is dropped.
    ///
    /// # Panics
    /// Panics if `index > len`.
    pub fn try_insert_at(&mut self, index: usize, value: T) -> Result<(), ReserveError> {
        assert!(
            index <= self.len,
            "insertion index (is {index}) should be <= len (is {})",
            self.len
        );
        if index < self.len - index {
            self.reserve_front_slot()?;
            self.head -= 1;
            // Old element `i` is now at `i + 1`; pull the prefix one slot forward.
            for i in 0..index {
                // SAFETY: `i + 1` holds a live element, `i` was vacated by the previous step.
                unsafe { self.move_slot(i + 1, i) };
            }
        } else {
            self.reserve_back_slot()?;
            for i in (index..self.len).rev() {
                // SAFETY: `i` holds a live element, `i + 1` was vacated by the previous step.
                unsafe { self.move_slot(i, i + 1) };
            }
        }
        // SAFETY: the shifts above left `index` vacant.
        unsafe { self.alloc.construct(self.slot(index), value) };
        self.len += 1;
        self.generation.bump();
        debug_assert!(self.is_valid());
        Ok(())
    }

    /// Removes and returns the element at `index`, closing the gap from the
    /// nearer side. Returns `None` if `index` is out of bounds.
    pub fn remove(&mut self, index: usize) -> Option<T> {
        if index >= self.len {
            return None;
        }
        // SAFETY: `index < len`; the slot is vacant from now on.
        let value = unsafe { self.slot(index).as_ptr().read() };
        if index < self.len - 1 - index {
            for i in (0..index).rev() {
                // SAFETY: `i` is live and `i + 1` is the current gap.
                unsafe { self.move_slot(i, i + 1) };
            }
            self.head += 1;
        } else {
            for i in index + 1..self.len {
                // SAFETY: `i` is live and `i - 1` is the current gap.
                unsafe { self.move_slot(i, i - 1) };
            }
        }
        self.len -= 1;
        self.trim_window();
        self.generation.bump();
        debug_assert!(self.is_valid());
        Some(value)
    }

    /// Returns a cursor at the first element.
    #[inline]
    pub fn begin(&self) -> Cursor<'_, T, K, A> {
        Cursor::new(self, 0)
    }

    /// Returns a cursor one past the last element.
    #[inline]
    pub fn end(&self) -> Cursor<'_, T, K, A> {
        Cursor::new(self, self.len)
    }

    /// Returns a detached position for `index`, valid until the next
    /// structural mutation.
    ///
    /// # Panics
    /// Panics if `index > len`.
    #[track_caller]
    pub fn position(&self, index: usize) -> Position {
        assert!(index <= self.len, "position {index} is past the end (len {})", self.len);
        Position::new(index, self.generation.stamp())
    }

    /// Re-attaches a position to this deque.
    ///
    /// # Panics
    /// In debug builds, panics if the deque was modified after `pos` was issued.
    #[track_caller]
    pub fn cursor_at(&self, pos: Position) -> Cursor<'_, T, K, A> {
        self.generation.check(pos.stamp());
        Cursor::new(self, pos.index())
    }

    /// Inserts `value` before `pos` and returns the position of the new
    /// element. Every other position is invalidated.
    ///
    /// # Panics
    /// Panics if `pos` is past the end, and in debug builds if `pos` is stale.
    #[track_caller]
    pub fn insert(&mut self, pos: Position, value: T) -> Position {
        self.generation.check(pos.stamp());
        self.insert_at(pos.index(), value);
        self.position(pos.index())
    }

    /// Destroys the element at `pos` and returns the position of the element
    /// that now occupies its index (the end position if it was the last).
    ///
    /// # Panics
    /// Panics if `pos` is the end position, and in debug builds if `pos` is stale.
    #[track_caller]
    pub fn erase(&mut self, pos: Position) -> Position {
        self.generation.check(pos.stamp());
        let index = pos.index();
        match self.remove(index) {
            Some(value) => drop(value),
            None => panic!("erase position (is {index}) should be < len (is {})", self.len),
        }
        self.position(index)
    }

    /// Shortens the deque to `len` elements, dropping the rest from the back.
    /// Has no effect if `len >= self.len()`.
    pub fn truncate(&mut self, len: usize) {
        if len >= self.len {
            if self.len == 0 && self.map.len() != 0 {
                self.trim_window();
            }
            return;
        }
        let old_len = core::mem::replace(&mut self.len, len);
        let window = self.window();
        let guard = Settle(self);
        for index in len..old_len {
            // SAFETY: the slot held a live element and is no longer counted in `len`.
            unsafe { guard.0.alloc.destroy(window.slot(index)) };
        }
        drop(guard);
    }

    /// Removes all elements and releases all storage.
    pub fn clear(&mut self) {
        self.truncate(0);
    }

    /// Resizes to `new_len`, cloning `value` into new slots at the back.
    ///
    /// # Panics
    /// Panics on capacity overflow; aborts through `handle_alloc_error` if
    /// the allocator fails.
    pub fn resize(&mut self, new_len: usize, value: T)
    where
        T: Clone,
    {
        infallible(self.try_resize(new_len, value));
    }

    /// Fallible form of [`resize`](Self::resize).
    ///
    /// # Errors
    /// Returns `ReserveError` if the deque could not grow. Elements added
    /// before the failure stay in the deque.
    pub fn try_resize(&mut self, new_len: usize, value: T) -> Result<(), ReserveError>
    where
        T: Clone,
    {
        self.try_resize_with(new_len, || value.clone())
    }

    /// Resizes to `new_len`, filling new slots with `T::default()`.
    pub fn resize_default(&mut self, new_len: usize)
    where
        T: Default,
    {
        self.resize_with(new_len, T::default);
    }

    /// Resizes to `new_len`, filling new slots with values returned by `f`.
    pub fn resize_with(&mut self, new_len: usize, f: impl FnMut() -> T) {
        infallible(self.try_resize_with(new_len, f));
    }

    fn try_resize_with(&mut self, new_len: usize, mut f: impl FnMut() -> T) -> Result<(), ReserveError> {
        if new_len <= self.len {
            self.truncate(new_len);
            return Ok(());
        }
        let additional = new_len - self.len;
        self.try_extend_exact(core::iter::from_fn(|| Some(f())), additional)
    }

    /// Appends exactly `count` items from `items` (fewer if it runs dry),
    /// reserving map space once up front.
    fn try_extend_exact<I>(&mut self, items: I, count: usize) -> Result<(), ReserveError>
    where
        I: Iterator<Item = T>,
    {
        if count == 0 {
            return Ok(());
        }
        let guard = Settle(self);
        guard.0.reserve_back(count)?;
        for value in items.take(count) {
            guard.0.reserve_back_slot()?;
            let deque = &mut *guard.0;
            // SAFETY: the slot at `len` is writable and vacant.
            unsafe { deque.alloc.construct(deque.slot(deque.len), value) };
            deque.len += 1;
        }
        Ok(())
    }

    /// Replaces the contents with `n` clones of `value`, reusing existing
    /// elements and storage where possible.
    pub fn assign(&mut self, n: usize, value: T)
    where
        T: Clone,
    {
        if n > self.capacity() {
            self.clear();
            infallible(self.init_exact(chunks_for::<K>(n)));
            infallible(self.try_extend_exact(core::iter::repeat(value), n));
            return;
        }
        for slot in self.iter_mut().take(n) {
            slot.clone_from(&value);
        }
        if n < self.len {
            self.truncate(n);
        } else {
            let additional = n - self.len;
            infallible(self.try_extend_exact(core::iter::repeat(value), additional));
        }
        self.generation.bump();
    }

    /// Swaps the contents of two deques in O(1). No element is touched.
    pub fn swap(&mut self, other: &mut Self) {
        core::mem::swap(self, other);
        self.generation.bump();
        other.generation.bump();
    }

    /// Fallible form of `clone`.
    ///
    /// # Errors
    /// Returns `ReserveError` if storage for the copy cannot be allocated.
    pub fn try_clone(&self) -> Result<Self, ReserveError>
    where
        T: Clone,
        A: Clone,
    {
        let mut copy = Self::new_in(self.alloc.clone());
        copy.init_exact(chunks_for::<K>(self.len))?;
        copy.try_extend_exact(self.iter().cloned(), self.len)?;
        Ok(copy)
    }

    /// Returns a front-to-back iterator.
    #[inline]
    pub fn iter(&self) -> Iter<'_, T, K> {
        Iter::new(self.window(), 0, self.len)
    }

    /// Returns a front-to-back iterator that allows modifying each element.
    #[inline]
    pub fn iter_mut(&mut self) -> IterMut<'_, T, K> {
        IterMut::new(self.window(), 0, self.len)
    }

    /// Checks the window invariants. Used by `debug_assert!` after every
    /// structural mutation.
    fn is_valid(&self) -> bool {
        if self.len == 0 {
            return self.map.len() == 0
                && self.used_begin == 0
                && self.used_end == 0
                && self.head == 0;
        }
        self.head < K
            && self.used_begin < self.used_end
            && self.used_end <= self.map.len()
            && self.chunks_in_use() == chunks_for::<K>(self.head + self.len)
            && self.map.get(self.used_begin).is_some()
            && self.map.get(self.used_end - 1).is_some()
            && (self.used_begin == 0 || self.map.get(self.used_begin - 1).is_none())
            && (self.used_end == self.map.len() || self.map.get(self.used_end).is_none())
    }
}

/// Retires surplus chunks and invalidates positions when dropped, so a
/// bulk mutation leaves a valid deque on every exit, unwinding included.
struct Settle<'a, T, const K: usize, A: ChunkAlloc>(&'a mut MapDeque<T, K, A>);

impl<T, const K: usize, A: ChunkAlloc> Drop for Settle<'_, T, K, A> {
    fn drop(&mut self) {
        self.0.trim_window();
        self.0.generation.bump();
        debug_assert!(self.0.is_valid());
    }
}

impl<T, const K: usize, A: ChunkAlloc> Drop for MapDeque<T, K, A> {
    fn drop(&mut self) {
        /// Frees the storage even if an element's destructor panics.
        struct Release<'a, T, const K: usize, A: ChunkAlloc>(&'a mut MapDeque<T, K, A>);

        impl<T, const K: usize, A: ChunkAlloc> Drop for Release<'_, T, K, A> {
            fn drop(&mut self) {
                self.0.release_storage();
            }
        }

        let len = core::mem::replace(&mut self.len, 0);
        let window = self.window();
        let guard = Release(self);
        let mut index = 0;
        while index < len {
            let (slot, offset) = window.locate(index);
            let run = (K - offset).min(len - index);
            if let Some(chunk) = guard.0.map.get(slot) {
                // SAFETY: `offset..offset + run` are live elements of this chunk,
                // each dropped exactly once.
                unsafe { chunk.drop_run(offset, offset + run, &guard.0.alloc) };
            }
            index += run;
        }
        drop(guard);
    }
}

impl<T, const K: usize> Default for MapDeque<T, K, Global> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone, const K: usize, A: ChunkAlloc + Clone> Clone for MapDeque<T, K, A> {
    fn clone(&self) -> Self {
        infallible(self.try_clone())
    }

    /// Copy-assignment that reuses `self`'s elements and storage:
    /// equal lengths overwrite in place, a shorter source truncates, a longer
    /// source that fits `capacity()` overwrites then appends, anything larger
    /// starts over on a map sized exactly for `source`.
    fn clone_from(&mut self, source: &Self) {
        let n = source.len;
        if n > self.capacity() {
            self.clear();
            infallible(self.init_exact(chunks_for::<K>(n)));
            infallible(self.try_extend_exact(source.iter().cloned(), n));
            return;
        }
        let common = n.min(self.len);
        for (dst, src) in self.iter_mut().zip(source.iter()) {
            dst.clone_from(src);
        }
        if n < self.len {
            self.truncate(n);
        } else {
            infallible(self.try_extend_exact(source.iter().skip(common).cloned(), n - common));
        }
        self.generation.bump();
    }
}

impl<T: core::fmt::Debug, const K: usize, A: ChunkAlloc> core::fmt::Debug for MapDeque<T, K, A> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

#[cold]
#[inline(never)]
#[track_caller]
fn index_out_of_bounds(index: usize, len: usize) -> ! {
    panic!("index out of bounds: the len is {len} but the index is {index}")
}

impl<T, const K: usize, A: ChunkAlloc> Index<usize> for MapDeque<T, K, A> {
    type Output = T;

    #[inline]
    #[track_caller]
    fn index(&self, index: usize) -> &T {
        match self.get(index) {
            Some(value) => value,
            None => index_out_of_bounds(index, self.len),
        }
    }
}

impl<T, const K: usize, A: ChunkAlloc> IndexMut<usize> for MapDeque<T, K, A> {
    #[inline]
    #[track_caller]
    fn index_mut(&mut self, index: usize) -> &mut T {
        let len = self.len;
        match self.get_mut(index) {
            Some(value) => value,
            None => index_out_of_bounds(index, len),
        }
    }
}

impl<T, const K: usize, A: ChunkAlloc> Index<Position> for MapDeque<T, K, A> {
    type Output = T;

    #[inline]
    #[track_caller]
    fn index(&self, pos: Position) -> &T {
        self.generation.check(pos.stamp());
        &self[pos.index()]
    }
}

impl<T, const K: usize, A: ChunkAlloc> Extend<T> for MapDeque<T, K, A> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        let (lower, _) = iter.size_hint();
        let guard = Settle(self);
        if lower > 0 {
            infallible(guard.0.reserve_back(lower));
        }
        for value in iter {
            guard.0.push_back(value);
        }
    }
}

impl<'a, T: Copy + 'a, const K: usize, A: ChunkAlloc> Extend<&'a T> for MapDeque<T, K, A> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied());
    }
}

impl<T, const K: usize> FromIterator<T> for MapDeque<T, K, Global> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut deque = Self::new();
        deque.extend(iter);
        deque
    }
}

impl<T, const K: usize> From<Vec<T>> for MapDeque<T, K, Global> {
    fn from(vec: Vec<T>) -> Self {
        let n = vec.len();
        let mut deque = Self::new();
        infallible(deque.init_exact(chunks_for::<K>(n)));
        infallible(deque.try_extend_exact(vec.into_iter(), n));
        deque
    }
}

impl<T, const K: usize, const N: usize> From<[T; N]> for MapDeque<T, K, Global> {
    fn from(array: [T; N]) -> Self {
        let mut deque = Self::new();
        infallible(deque.init_exact(chunks_for::<K>(N)));
        infallible(deque.try_extend_exact(array.into_iter(), N));
        deque
    }
}

impl<T, const K: usize, A: ChunkAlloc> IntoIterator for MapDeque<T, K, A> {
    type Item = T;
    type IntoIter = IntoIter<T, K, A>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter::new(self)
    }
}

impl<'a, T, const K: usize, A: ChunkAlloc> IntoIterator for &'a MapDeque<T, K, A> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T, K>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T, const K: usize, A: ChunkAlloc> IntoIterator for &'a mut MapDeque<T, K, A> {
    type Item = &'a mut T;
    type IntoIter = IterMut<'a, T, K>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}
