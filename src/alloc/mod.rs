//! Memory sources for chunk buffers and the chunk map.
//!
//! - `allocator`: the [`ChunkAlloc`] trait and [`AllocError`]
//! - `global`: [`Global`], backed by the process-wide allocator
//! - `tracking`: [`TrackingAlloc`], accounting and fault injection

pub mod allocator;
pub mod global;
pub mod tracking;

pub use allocator::{AllocError, ChunkAlloc};
pub use global::Global;
pub use tracking::{AllocStats, TrackingAlloc};
