//! Collections provided by the crate.
//!
//! - `deque`: the map-of-chunks double-ended queue and its cursors/iterators

pub mod deque;

pub use deque::{Cursor, IntoIter, Iter, IterMut, MapDeque, Position, DEFAULT_CHUNK_SIZE, MIN_MAP_LEN};
