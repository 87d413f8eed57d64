//! Borrowing and owning iterators over a [`MapDeque`].

use super::map::Window;
use super::MapDeque;
use crate::alloc::ChunkAlloc;
use core::fmt;
use core::iter::FusedIterator;
use core::marker::PhantomData;

/// Iterator over `&T` for a `MapDeque`.
pub struct Iter<'a, T, const K: usize> {
    window: Window<T, K>,
    front: usize,
    back: usize,
    _marker: PhantomData<&'a T>,
}

// SAFETY: behaves like `&'a [T]`.
unsafe impl<T: Sync, const K: usize> Send for Iter<'_, T, K> {}
// SAFETY: behaves like `&'a [T]`.
unsafe impl<T: Sync, const K: usize> Sync for Iter<'_, T, K> {}

impl<'a, T, const K: usize> Iter<'a, T, K> {
    #[inline]
    pub(super) fn new(window: Window<T, K>, front: usize, back: usize) -> Self {
        debug_assert!(front <= back);
        Self {
            window,
            front,
            back,
            _marker: PhantomData,
        }
    }

    /// Returns how many items remain.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.back - self.front
    }
}

impl<T, const K: usize> Clone for Iter<'_, T, K> {
    fn clone(&self) -> Self {
        Self {
            window: self.window,
            front: self.front,
            back: self.back,
            _marker: PhantomData,
        }
    }
}

impl<'a, T, const K: usize> Iterator for Iter<'a, T, K> {
    type Item = &'a T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.front == self.back {
            return None;
        }
        let i = self.front;
        self.front += 1;
        // SAFETY: `front..back` only covers live elements of the borrowed deque.
        Some(unsafe { &*self.window.slot(i).as_ptr() })
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let rem = self.remaining();
        (rem, Some(rem))
    }

    #[inline]
    fn nth(&mut self, n: usize) -> Option<Self::Item> {
        self.front = self.front.saturating_add(n).min(self.back);
        self.next()
    }

    #[inline]
    fn last(mut self) -> Option<Self::Item> {
        self.next_back()
    }

    #[inline]
    fn count(self) -> usize {
        self.remaining()
    }
}

impl<T, const K: usize> DoubleEndedIterator for Iter<'_, T, K> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front == self.back {
            return None;
        }
        self.back -= 1;
        // SAFETY: `back` was inside the live range.
        Some(unsafe { &*self.window.slot(self.back).as_ptr() })
    }

    #[inline]
    fn nth_back(&mut self, n: usize) -> Option<Self::Item> {
        self.back = self.back.saturating_sub(n).max(self.front);
        self.next_back()
    }
}

impl<T, const K: usize> ExactSizeIterator for Iter<'_, T, K> {}
impl<T, const K: usize> FusedIterator for Iter<'_, T, K> {}

impl<T: fmt::Debug, const K: usize> fmt::Debug for Iter<'_, T, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Iter").field(&self.clone().collect::<Vec<_>>()).finish()
    }
}

/// Iterator over `&mut T` for a `MapDeque`.
pub struct IterMut<'a, T, const K: usize> {
    window: Window<T, K>,
    front: usize,
    back: usize,
    _marker: PhantomData<&'a mut T>,
}

// SAFETY: behaves like `&'a mut [T]`.
unsafe impl<T: Send, const K: usize> Send for IterMut<'_, T, K> {}
// SAFETY: behaves like `&'a mut [T]`.
unsafe impl<T: Sync, const K: usize> Sync for IterMut<'_, T, K> {}

impl<'a, T, const K: usize> IterMut<'a, T, K> {
    #[inline]
    pub(super) fn new(window: Window<T, K>, front: usize, back: usize) -> Self {
        debug_assert!(front <= back);
        Self {
            window,
            front,
            back,
            _marker: PhantomData,
        }
    }

    /// Returns how many items remain.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.back - self.front
    }
}

impl<'a, T, const K: usize> Iterator for IterMut<'a, T, K> {
    type Item = &'a mut T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.front == self.back {
            return None;
        }
        let i = self.front;
        self.front += 1;
        // SAFETY: each live slot is yielded at most once while the deque is
        // mutably borrowed.
        Some(unsafe { &mut *self.window.slot(i).as_ptr() })
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let rem = self.remaining();
        (rem, Some(rem))
    }

    #[inline]
    fn nth(&mut self, n: usize) -> Option<Self::Item> {
        self.front = self.front.saturating_add(n).min(self.back);
        self.next()
    }
}

impl<T, const K: usize> DoubleEndedIterator for IterMut<'_, T, K> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front == self.back {
            return None;
        }
        self.back -= 1;
        // SAFETY: as in `next`.
        Some(unsafe { &mut *self.window.slot(self.back).as_ptr() })
    }
}

impl<T, const K: usize> ExactSizeIterator for IterMut<'_, T, K> {}
impl<T, const K: usize> FusedIterator for IterMut<'_, T, K> {}

impl<T, const K: usize> fmt::Debug for IterMut<'_, T, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IterMut")
            .field("remaining", &self.remaining())
            .finish()
    }
}

/// Owning iterator for a `MapDeque`. Chunks are released as they drain.
pub struct IntoIter<T, const K: usize, A: ChunkAlloc> {
    deque: MapDeque<T, K, A>,
}

impl<T, const K: usize, A: ChunkAlloc> IntoIter<T, K, A> {
    #[inline]
    pub(super) fn new(deque: MapDeque<T, K, A>) -> Self {
        Self { deque }
    }
}

impl<T, const K: usize, A: ChunkAlloc> Iterator for IntoIter<T, K, A> {
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<T> {
        self.deque.pop_front()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.deque.len();
        (len, Some(len))
    }
}

impl<T, const K: usize, A: ChunkAlloc> DoubleEndedIterator for IntoIter<T, K, A> {
    #[inline]
    fn next_back(&mut self) -> Option<T> {
        self.deque.pop_back()
    }
}

impl<T, const K: usize, A: ChunkAlloc> ExactSizeIterator for IntoIter<T, K, A> {}
impl<T, const K: usize, A: ChunkAlloc> FusedIterator for IntoIter<T, K, A> {}

impl<T: fmt::Debug, const K: usize, A: ChunkAlloc> fmt::Debug for IntoIter<T, K, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IntoIter").field(&self.deque).finish()
    }
}
