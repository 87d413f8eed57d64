//! Positions into a deque: borrowed [`Cursor`]s and detached [`Position`]s.
//!
//! A cursor borrows the deque, so the borrow checker already rules out using
//! one across a mutation. A `Position` is just an index that can outlive the
//! borrow and be handed back to [`MapDeque::insert`], [`MapDeque::erase`] or
//! indexing. Every structural mutation invalidates all positions; debug
//! builds stamp each position with the deque's generation and panic when a
//! stale one comes back.

use super::iter::Iter;
use super::MapDeque;
use crate::alloc::{ChunkAlloc, Global};
use core::cmp::Ordering;
use core::fmt;
use core::ops::{Add, AddAssign, Deref, Sub, SubAssign};

#[cfg(debug_assertions)]
use core::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

#[cfg(debug_assertions)]
static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

/// Modification counter of one deque. Zero-sized in release builds.
#[derive(Debug)]
pub(crate) struct Generation {
    #[cfg(debug_assertions)]
    value: u64,
}

/// The generation a [`Position`] was issued under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct Stamp {
    #[cfg(debug_assertions)]
    value: u64,
}

impl Generation {
    pub(crate) const fn new() -> Self {
        Self {
            #[cfg(debug_assertions)]
            value: 0,
        }
    }

    /// Invalidates every position issued so far.
    #[inline(always)]
    pub(crate) fn bump(&mut self) {
        #[cfg(debug_assertions)]
        {
            self.value = NEXT_GENERATION.fetch_add(1, AtomicOrdering::Relaxed);
        }
    }

    #[inline(always)]
    pub(crate) fn stamp(&self) -> Stamp {
        Stamp {
            #[cfg(debug_assertions)]
            value: self.value,
        }
    }

    #[inline(always)]
    #[track_caller]
    pub(crate) fn check(&self, stamp: Stamp) {
        #[cfg(debug_assertions)]
        assert!(
            self.value == stamp.value,
            "position used after the deque was modified"
        );
        let _ = stamp;
    }
}

/// A detached position: a logical index plus (in debug builds) the
/// generation it was issued under.
///
/// Obtain one from [`MapDeque::position`] or [`Cursor::position`]; it stays
/// valid until the deque is next modified structurally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    index: usize,
    stamp: Stamp,
}

impl Position {
    #[inline(always)]
    pub(crate) const fn new(index: usize, stamp: Stamp) -> Self {
        Self { index, stamp }
    }

    /// Logical index this position refers to.
    #[inline(always)]
    pub const fn index(&self) -> usize {
        self.index
    }

    #[inline(always)]
    pub(crate) const fn stamp(&self) -> Stamp {
        self.stamp
    }
}

/// A random-access cursor over a borrowed deque.
///
/// Ranges over `0..=len`; `len` is the end position, which compares and
/// subtracts like any other but has no element. Cursor arithmetic is O(1)
/// and never leaves `0..=len`.
pub struct Cursor<'a, T, const K: usize, A: ChunkAlloc = Global> {
    deque: &'a MapDeque<T, K, A>,
    index: usize,
}

impl<T, const K: usize, A: ChunkAlloc> Clone for Cursor<'_, T, K, A> {
    #[inline(always)]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, const K: usize, A: ChunkAlloc> Copy for Cursor<'_, T, K, A> {}

impl<'a, T, const K: usize, A: ChunkAlloc> Cursor<'a, T, K, A> {
    #[inline(always)]
    pub(super) const fn new(deque: &'a MapDeque<T, K, A>, index: usize) -> Self {
        Self { deque, index }
    }

    /// Logical index of the cursor; `len` at the end position.
    #[inline(always)]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// The element under the cursor, or `None` at the end position.
    #[inline]
    pub fn get(&self) -> Option<&'a T> {
        self.deque.get(self.index)
    }

    /// Returns `true` at the end position.
    #[inline]
    pub fn is_end(&self) -> bool {
        self.index == self.deque.len()
    }

    /// Steps to the next element.
    ///
    /// # Panics
    /// Panics at the end position.
    #[track_caller]
    pub fn move_next(&mut self) {
        assert!(!self.is_end(), "cursor advanced past the end");
        self.index += 1;
    }

    /// Steps to the previous element.
    ///
    /// # Panics
    /// Panics at index 0.
    #[track_caller]
    pub fn move_prev(&mut self) {
        assert!(self.index > 0, "cursor moved before the first element");
        self.index -= 1;
    }

    /// Detaches the cursor into a [`Position`].
    #[inline]
    pub fn position(&self) -> Position {
        self.deque.position(self.index)
    }

    /// Iterates from this cursor up to (not including) `end`.
    ///
    /// # Panics
    /// Panics if `end` belongs to another deque or lies before `self`.
    #[track_caller]
    pub fn to(self, end: Self) -> Iter<'a, T, K> {
        assert!(core::ptr::eq(self.deque, end.deque), "cursors from different deques");
        assert!(self.index <= end.index, "cursor range is reversed");
        Iter::new(self.deque.window(), self.index, end.index)
    }

    #[inline(always)]
    #[track_caller]
    fn moved_to(self, index: Option<usize>) -> Self {
        match index {
            Some(index) if index <= self.deque.len() => Self { index, ..self },
            _ => panic!("cursor moved outside 0..={}", self.deque.len()),
        }
    }
}

impl<T, const K: usize, A: ChunkAlloc> Add<usize> for Cursor<'_, T, K, A> {
    type Output = Self;

    #[inline]
    #[track_caller]
    fn add(self, n: usize) -> Self {
        self.moved_to(self.index.checked_add(n))
    }
}

impl<T, const K: usize, A: ChunkAlloc> Sub<usize> for Cursor<'_, T, K, A> {
    type Output = Self;

    #[inline]
    #[track_caller]
    fn sub(self, n: usize) -> Self {
        self.moved_to(self.index.checked_sub(n))
    }
}

impl<T, const K: usize, A: ChunkAlloc> AddAssign<usize> for Cursor<'_, T, K, A> {
    #[inline]
    #[track_caller]
    fn add_assign(&mut self, n: usize) {
        *self = *self + n;
    }
}

impl<T, const K: usize, A: ChunkAlloc> SubAssign<usize> for Cursor<'_, T, K, A> {
    #[inline]
    #[track_caller]
    fn sub_assign(&mut self, n: usize) {
        *self = *self - n;
    }
}

/// Signed distance between two cursors of the same deque.
impl<T, const K: usize, A: ChunkAlloc> Sub for Cursor<'_, T, K, A> {
    type Output = isize;

    #[inline]
    #[track_caller]
    fn sub(self, other: Self) -> isize {
        debug_assert!(core::ptr::eq(self.deque, other.deque));
        self.index.wrapping_sub(other.index) as isize
    }
}

impl<T, const K: usize, A: ChunkAlloc> PartialEq for Cursor<'_, T, K, A> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        core::ptr::eq(self.deque, other.deque) && self.index == other.index
    }
}

impl<T, const K: usize, A: ChunkAlloc> Eq for Cursor<'_, T, K, A> {}

/// Cursors into different deques are unordered.
impl<T, const K: usize, A: ChunkAlloc> PartialOrd for Cursor<'_, T, K, A> {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        core::ptr::eq(self.deque, other.deque).then(|| self.index.cmp(&other.index))
    }
}

impl<T, const K: usize, A: ChunkAlloc> Deref for Cursor<'_, T, K, A> {
    type Target = T;

    #[inline]
    #[track_caller]
    fn deref(&self) -> &T {
        match self.deque.get(self.index) {
            Some(value) => value,
            None => panic!("dereferenced the end cursor"),
        }
    }
}

impl<T, const K: usize, A: ChunkAlloc> fmt::Debug for Cursor<'_, T, K, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("index", &self.index)
            .field("len", &self.deque.len())
            .finish()
    }
}
