//! `proptest` integration: arbitrary deques whose window starts anywhere
//! inside its first chunk.

use super::MapDeque;
use proptest::arbitrary::{any_with, Arbitrary};
use proptest::collection::{vec, SizeRange};
use proptest::prelude::*;
use proptest::strategy::BoxedStrategy;

/// Builds each deque from a mixed sequence of `push_front`/`push_back`, so
/// generated values cover every `head` offset, not only `head == 0`.
impl<T, const K: usize> Arbitrary for MapDeque<T, K>
where
    T: Arbitrary + 'static,
{
    type Parameters = (SizeRange, T::Parameters);
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with((size, element): Self::Parameters) -> Self::Strategy {
        vec((any::<bool>(), any_with::<T>(element)), size)
            .prop_map(|ops| {
                let mut deque = MapDeque::new();
                for (front, value) in ops {
                    if front {
                        deque.push_front(value);
                    } else {
                        deque.push_back(value);
                    }
                }
                deque
            })
            .boxed()
    }
}
