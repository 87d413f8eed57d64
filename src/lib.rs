//! # `mapdeque` - Map-of-chunks double-ended queue
//!
//! A double-ended sequence container stored as fixed-size chunks reached
//! through a central map of chunk handles. Both ends grow and shrink in
//! amortized O(1), any element is reachable in O(1) by index, and pushing at
//! either end never moves an existing element.
//!
//! ## Guarantees
//!
//! ### Element stability
//! - **Push at either end**: existing elements stay at their addresses. Only
//!   chunk handles move when the map is rebuilt.
//! - **insert/erase**: shift only the elements between the position and the
//!   nearer end.
//!
//! ### Failure atomicity
//! - **Map rebuilds are all-or-nothing**: the new map is fully built before the
//!   old one is released, so an allocation failure leaves the deque unchanged.
//! - **Fallible entry points**: `try_push_back`, `try_push_front`,
//!   `try_insert_at`, `try_resize`, `try_clone` and `try_from_elem_in` report
//!   [`ReserveError`] instead of aborting.
//! - **Checked access**: [`MapDeque::at`] returns [`OutOfRange`], whose message
//!   is always `deque::_M_range_check`.
//!
//! ### Memory
//! - **Eager release**: a chunk is freed as soon as no live element lives in
//!   it; an empty deque owns no memory at all.
//! - **Pluggable allocation**: chunk buffers and the map come from a
//!   [`ChunkAlloc`](alloc::ChunkAlloc). [`TrackingAlloc`](alloc::TrackingAlloc)
//!   counts requests and can inject failures.
//!
//! ## Architecture
//!
//! ```text
//!   MapDeque { map, used_begin, used_end, head, len }
//!
//!   map:   [ -- | C0 | C1 | C2 | -- | -- ]
//!                  |    |    |
//!                  v    v    v
//!          [..xxx] [xxxx] [xx..]      chunks of K slots
//!             ^head
//! ```
//!
//! Element `i` lives in chunk `used_begin + (head + i) / K` at offset
//! `(head + i) % K`. Growth at either end consumes the slack around the used
//! window; when it runs out the map is rebuilt at twice the needed size and
//! the window is re-centered.
//!
//! ## Features
//!
//! - `tracing`: emit `trace`/`debug` events for chunk and map traffic under
//!   the `mapdeque` target.
//! - `proptest`: `Arbitrary` for `MapDeque<T, K>`.
//! - `alloc-mimalloc`, `alloc-snmalloc`, `alloc-jemalloc`, `alloc-system`:
//!   select the global allocator used by the benchmark suite.
//!
//! ## Example
//!
//! ```rust
//! use mapdeque::MapDeque;
//!
//! let mut dq: MapDeque<u32, 4> = MapDeque::new();
//! for i in 0..10 {
//!     dq.push_back(i);
//! }
//! dq.push_front(100);
//! assert_eq!(dq.len(), 11);
//! assert_eq!(dq[0], 100);
//! assert_eq!(dq.pop_back(), Some(9));
//!
//! let tail: Vec<_> = (dq.end() - 3).to(dq.end()).copied().collect();
//! assert_eq!(tail, [6, 7, 8]);
//! ```

#![warn(missing_docs, clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

/// Fine-grained allocation events. Compiled out without the `tracing` feature.
macro_rules! trace_event {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        tracing::trace!(target: "mapdeque", $($arg)*);
    };
}

/// Map-level events such as rebuilds. Compiled out without the `tracing` feature.
macro_rules! debug_event {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        tracing::debug!(target: "mapdeque", $($arg)*);
    };
}

pub mod alloc;
pub mod collections;
pub mod error;

pub use collections::{Cursor, IntoIter, Iter, IterMut, MapDeque, Position, DEFAULT_CHUNK_SIZE, MIN_MAP_LEN};
pub use error::{OutOfRange, ReserveError};

// Compile-time assertions for memory layout
const _: () = {
    use core::mem;

    // Position stamps cost nothing in release builds.
    #[cfg(not(debug_assertions))]
    assert!(mem::size_of::<Position>() == mem::size_of::<usize>());

    // map ptr + map len + used_begin + used_end + head + len (+ generation in debug).
    assert!(mem::size_of::<MapDeque<u64>>() <= mem::size_of::<usize>() * 7);
};
