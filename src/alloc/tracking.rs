//! An accounting wrapper around another [`ChunkAlloc`].
//!
//! Counts allocations, deallocations and live bytes, and can be told to
//! start failing after a number of successful allocations. The counters are
//! plain `Cell`s: the wrapper is meant to be shared by reference with one or
//! more deques on a single thread.
//!
//! ```rust
//! use mapdeque::alloc::TrackingAlloc;
//! use mapdeque::MapDeque;
//!
//! let tracker = TrackingAlloc::new();
//! {
//!     let mut dq: MapDeque<u32, 4, _> = MapDeque::new_in(&tracker);
//!     dq.extend(0..10);
//!     assert!(tracker.stats().live_blocks() > 0);
//! }
//! assert_eq!(tracker.stats().live_blocks(), 0);
//! ```

use crate::alloc::{AllocError, ChunkAlloc, Global};
use core::alloc::Layout;
use core::cell::Cell;
use core::ptr::NonNull;

/// A snapshot of a [`TrackingAlloc`]'s counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AllocStats {
    /// Successful allocations so far.
    pub allocations: usize,
    /// Deallocations so far.
    pub deallocations: usize,
    /// Allocation requests refused by fault injection or the inner allocator.
    pub failures: usize,
    /// Bytes currently allocated.
    pub live_bytes: usize,
    /// High-water mark of `live_bytes`.
    pub peak_bytes: usize,
}

impl AllocStats {
    /// Blocks allocated and not yet released.
    #[inline]
    pub const fn live_blocks(&self) -> usize {
        self.allocations - self.deallocations
    }
}

/// Allocation accounting and fault injection over an inner allocator.
#[derive(Debug, Default)]
pub struct TrackingAlloc<A: ChunkAlloc = Global> {
    inner: A,
    allocations: Cell<usize>,
    deallocations: Cell<usize>,
    failures: Cell<usize>,
    live_bytes: Cell<usize>,
    peak_bytes: Cell<usize>,
    /// Remaining successful allocations before every request fails.
    budget: Cell<Option<usize>>,
}

impl TrackingAlloc<Global> {
    /// Creates a tracker over the global allocator.
    pub const fn new() -> Self {
        Self::wrap(Global)
    }
}

impl<A: ChunkAlloc> TrackingAlloc<A> {
    /// Creates a tracker over `inner`.
    pub const fn wrap(inner: A) -> Self {
        Self {
            inner,
            allocations: Cell::new(0),
            deallocations: Cell::new(0),
            failures: Cell::new(0),
            live_bytes: Cell::new(0),
            peak_bytes: Cell::new(0),
            budget: Cell::new(None),
        }
    }

    /// Returns the current counters.
    pub fn stats(&self) -> AllocStats {
        AllocStats {
            allocations: self.allocations.get(),
            deallocations: self.deallocations.get(),
            failures: self.failures.get(),
            live_bytes: self.live_bytes.get(),
            peak_bytes: self.peak_bytes.get(),
        }
    }

    /// Lets `successes` more allocations through, then fails every request.
    pub fn fail_after(&self, successes: usize) {
        self.budget.set(Some(successes));
    }

    /// Removes any failure budget set by [`fail_after`](Self::fail_after).
    pub fn stop_failing(&self) {
        self.budget.set(None);
    }

    /// Returns a reference to the wrapped allocator.
    pub fn inner(&self) -> &A {
        &self.inner
    }
}

impl<A: ChunkAlloc> ChunkAlloc for TrackingAlloc<A> {
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        if let Some(left) = self.budget.get() {
            if left == 0 {
                self.failures.set(self.failures.get() + 1);
                return Err(AllocError);
            }
            self.budget.set(Some(left - 1));
        }

        let ptr = self.inner.allocate(layout).map_err(|err| {
            self.failures.set(self.failures.get() + 1);
            err
        })?;

        self.allocations.set(self.allocations.get() + 1);
        let live = self.live_bytes.get() + layout.size();
        self.live_bytes.set(live);
        if live > self.peak_bytes.get() {
            self.peak_bytes.set(live);
        }
        Ok(ptr)
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        self.deallocations.set(self.deallocations.get() + 1);
        self.live_bytes.set(self.live_bytes.get() - layout.size());
        self.inner.deallocate(ptr, layout);
    }

    #[inline]
    unsafe fn construct<T>(&self, ptr: NonNull<T>, value: T) {
        self.inner.construct(ptr, value);
    }

    #[inline]
    unsafe fn destroy<T>(&self, ptr: NonNull<T>) {
        self.inner.destroy(ptr);
    }
}
