//! Equality, ordering and hashing. All of them compare element sequences;
//! chunk size, map layout and allocator never matter.

use super::MapDeque;
use crate::alloc::ChunkAlloc;
use core::cmp::Ordering;
use core::hash::{Hash, Hasher};

impl<T, U, const K: usize, const K2: usize, A, B> PartialEq<MapDeque<U, K2, B>> for MapDeque<T, K, A>
where
    T: PartialEq<U>,
    A: ChunkAlloc,
    B: ChunkAlloc,
{
    fn eq(&self, other: &MapDeque<U, K2, B>) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T: Eq, const K: usize, A: ChunkAlloc> Eq for MapDeque<T, K, A> {}

/// Lexicographic, like slices.
impl<T, const K: usize, const K2: usize, A, B> PartialOrd<MapDeque<T, K2, B>> for MapDeque<T, K, A>
where
    T: PartialOrd,
    A: ChunkAlloc,
    B: ChunkAlloc,
{
    fn partial_cmp(&self, other: &MapDeque<T, K2, B>) -> Option<Ordering> {
        self.iter().partial_cmp(other.iter())
    }
}

impl<T: Ord, const K: usize, A: ChunkAlloc> Ord for MapDeque<T, K, A> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.iter().cmp(other.iter())
    }
}

impl<T: Hash, const K: usize, A: ChunkAlloc> Hash for MapDeque<T, K, A> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.len());
        for item in self {
            item.hash(state);
        }
    }
}

macro_rules! eq_sequence {
    ($rhs:ty $(, $n:ident)?) => {
        impl<T, U, const K: usize, A: ChunkAlloc $(, const $n: usize)?> PartialEq<$rhs> for MapDeque<T, K, A>
        where
            T: PartialEq<U>,
        {
            fn eq(&self, other: &$rhs) -> bool {
                self.len() == other.len() && self.iter().eq(other.iter())
            }
        }
    };
}

eq_sequence!(Vec<U>);
eq_sequence!([U]);
eq_sequence!(&[U]);
eq_sequence!(&mut [U]);
eq_sequence!([U; N], N);
