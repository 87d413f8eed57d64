//! Error types reported by [`MapDeque`](crate::MapDeque).

use crate::alloc::AllocError;
use core::alloc::Layout;
use core::fmt;

/// Returned by [`MapDeque::at`](crate::MapDeque::at) when the index is not
/// below the deque's length.
///
/// The `Display` output is the fixed identifier [`OutOfRange::MESSAGE`] so
/// callers and test suites can match on it regardless of the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutOfRange {
    /// The rejected index.
    pub index: usize,
    /// The deque's length at the time of the access.
    pub len: usize,
}

impl OutOfRange {
    /// Stable diagnostic identifier carried by every range-check failure.
    pub const MESSAGE: &'static str = "deque::_M_range_check";

    /// Returns [`OutOfRange::MESSAGE`].
    #[inline]
    pub const fn message(&self) -> &'static str {
        Self::MESSAGE
    }
}

impl fmt::Display for OutOfRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(Self::MESSAGE)
    }
}

impl std::error::Error for OutOfRange {}

/// Failure to obtain storage for chunks or for the chunk map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReserveError {
    /// The requested map or chunk size does not fit in `isize::MAX` bytes.
    CapacityOverflow,
    /// The allocator refused a request of the given layout.
    Alloc {
        /// Layout of the failed request.
        layout: Layout,
    },
}

impl ReserveError {
    #[inline]
    pub(crate) fn alloc(layout: Layout) -> impl FnOnce(AllocError) -> Self {
        move |AllocError| Self::Alloc { layout }
    }

    /// Converts the error into the behavior of an infallible operation:
    /// panics on overflow, defers to `handle_alloc_error` on allocation failure.
    #[cold]
    #[track_caller]
    pub(crate) fn handle(self) -> ! {
        match self {
            Self::CapacityOverflow => panic!("capacity overflow"),
            Self::Alloc { layout } => std::alloc::handle_alloc_error(layout),
        }
    }
}

impl fmt::Display for ReserveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityOverflow => f.write_str("deque capacity overflow"),
            Self::Alloc { layout } => write!(
                f,
                "memory allocation of {} bytes (align {}) failed",
                layout.size(),
                layout.align()
            ),
        }
    }
}

impl std::error::Error for ReserveError {}

#[inline]
#[track_caller]
pub(crate) fn infallible<T>(result: Result<T, ReserveError>) -> T {
    match result {
        Ok(value) => value,
        Err(err) => err.handle(),
    }
}
