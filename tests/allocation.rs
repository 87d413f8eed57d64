use mapdeque::alloc::{AllocError, ChunkAlloc, Global, TrackingAlloc};
use mapdeque::{MapDeque, ReserveError};
use std::alloc::Layout;
use std::cell::Cell;
use std::mem::size_of;
use std::ptr::NonNull;

/// Counts the element hooks of the allocator interface.
#[derive(Default)]
struct HookCounter {
    constructs: Cell<usize>,
    destroys: Cell<usize>,
}

impl ChunkAlloc for HookCounter {
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        Global.allocate(layout)
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        Global.deallocate(ptr, layout);
    }

    unsafe fn construct<T>(&self, ptr: NonNull<T>, value: T) {
        self.constructs.set(self.constructs.get() + 1);
        ptr.as_ptr().write(value);
    }

    unsafe fn destroy<T>(&self, ptr: NonNull<T>) {
        self.destroys.set(self.destroys.get() + 1);
        ptr.as_ptr().drop_in_place();
    }
}

#[test]
fn test_fill_allocates_map_and_chunks_exactly() {
    let tracker = TrackingAlloc::new();
    {
        let dq: MapDeque<u64, 10, _> = MapDeque::from_elem_in(25, 0, &tracker);
        let stats = tracker.stats();
        assert_eq!(stats.allocations, 4);
        assert_eq!(stats.live_bytes, 3 * 10 * size_of::<u64>() + 3 * size_of::<usize>());
        assert_eq!(dq.map_len(), 3);
    }
    let stats = tracker.stats();
    assert_eq!(stats.live_blocks(), 0);
    assert_eq!(stats.live_bytes, 0);
}

#[test]
fn test_empty_deque_never_allocates() {
    let tracker = TrackingAlloc::new();
    let dq: MapDeque<String, 8, _> = MapDeque::new_in(&tracker);
    let copy = dq.try_clone().unwrap();
    drop(copy);
    drop(dq);
    assert_eq!(tracker.stats().allocations, 0);
}

#[test]
fn test_chunks_released_as_front_drains() {
    let tracker = TrackingAlloc::new();
    let mut dq: MapDeque<u32, 4, _> = MapDeque::new_in(&tracker);
    dq.extend(0..40);
    // One map plus ten chunks.
    assert_eq!(tracker.stats().live_blocks(), 11);

    for expected in 0..4 {
        assert_eq!(dq.pop_front(), Some(expected));
    }
    assert_eq!(tracker.stats().live_blocks(), 10);

    for _ in 0..35 {
        dq.pop_front();
    }
    assert_eq!(tracker.stats().live_blocks(), 2);
    dq.pop_back();
    assert_eq!(tracker.stats().live_blocks(), 0);
    assert_eq!(dq.map_len(), 0);
}

#[test]
fn test_every_operation_balances() {
    let tracker = TrackingAlloc::new();
    {
        let mut dq: MapDeque<String, 3, _> = MapDeque::new_in(&tracker);
        for i in 0..50 {
            dq.push_front(i.to_string());
            dq.push_back(i.to_string());
        }
        dq.insert_at(17, "x".into());
        dq.remove(80);
        dq.resize(300, "y".into());
        dq.truncate(20);
        let mut other = dq.clone();
        other.assign(7, "z".into());
        dq.clone_from(&other);
        other.swap(&mut dq);
        let drained: Vec<String> = other.into_iter().collect();
        assert_eq!(drained.len(), 7);
    }
    assert_eq!(tracker.stats().live_blocks(), 0);
    assert_eq!(tracker.stats().live_bytes, 0);
}

#[test]
fn test_failed_chunk_allocation_leaves_deque_unchanged() {
    let tracker = TrackingAlloc::new();
    let mut dq: MapDeque<u32, 4, _> = MapDeque::new_in(&tracker);
    dq.extend(0..4);

    tracker.fail_after(0);
    let err = dq.try_push_back(4).unwrap_err();
    assert_eq!(
        err,
        ReserveError::Alloc {
            layout: Layout::array::<u32>(4).unwrap()
        }
    );
    assert!(dq.try_push_front(9).is_err());
    assert!(dq.try_insert_at(2, 9).is_err());
    assert!(dq.iter().copied().eq(0..4));

    tracker.stop_failing();
    dq.try_push_back(4).unwrap();
    dq.try_push_front(99).unwrap();
    assert_eq!(dq.len(), 6);
}

#[test]
fn test_failed_rebuild_is_all_or_nothing() {
    let tracker = TrackingAlloc::new();
    let mut dq: MapDeque<u32, 4, _> = MapDeque::from_elem_in(8, 3, &tracker);
    assert_eq!(dq.map_len(), 2);
    let before = tracker.stats();

    tracker.fail_after(0);
    assert!(matches!(dq.try_push_back(0), Err(ReserveError::Alloc { .. })));
    assert!(matches!(dq.try_push_front(0), Err(ReserveError::Alloc { .. })));
    tracker.stop_failing();

    assert_eq!(dq.map_len(), 2);
    assert_eq!(dq.len(), 8);
    assert_eq!(tracker.stats().live_blocks(), before.live_blocks());
}

#[test]
fn test_rebuild_succeeds_but_chunk_fails() {
    let tracker = TrackingAlloc::new();
    {
        let mut dq: MapDeque<u32, 4, _> = MapDeque::from_elem_in(8, 3, &tracker);
        tracker.fail_after(1);
        assert!(dq.try_push_back(0).is_err());
        tracker.stop_failing();

        // The larger map is kept; no chunk was leaked.
        assert!(dq.map_len() > 2);
        assert_eq!(dq.chunk_count(), 2);
        dq.push_back(0);
        assert_eq!(dq.len(), 9);
    }
    assert_eq!(tracker.stats().live_blocks(), 0);
}

#[test]
fn test_failed_resize_keeps_prefix() {
    let tracker = TrackingAlloc::new();
    let mut dq: MapDeque<u32, 4, _> = MapDeque::new_in(&tracker);

    tracker.fail_after(2);
    assert!(dq.try_resize(10, 1).is_err());
    tracker.stop_failing();

    assert_eq!(dq.len(), 4);
    assert!(dq.iter().all(|&x| x == 1));
    drop(dq);
    assert_eq!(tracker.stats().live_blocks(), 0);
}

#[test]
fn test_failed_clone_releases_partial_copy() {
    let tracker = TrackingAlloc::new();
    let source: MapDeque<u32, 4, _> = {
        let mut dq = MapDeque::new_in(&tracker);
        dq.extend(0..10);
        dq
    };
    let before = tracker.stats().live_blocks();

    tracker.fail_after(2);
    assert!(source.try_clone().is_err());
    tracker.stop_failing();

    assert_eq!(tracker.stats().live_blocks(), before);
    let copy = source.try_clone().unwrap();
    assert_eq!(copy, source);
}

#[test]
fn test_failed_fill_construction() {
    let tracker = TrackingAlloc::new();
    tracker.fail_after(0);
    let result = MapDeque::<u8, 16, _>::try_from_elem_in(100, 1, &tracker);
    assert!(result.is_err());
    assert_eq!(tracker.stats().failures, 1);
    assert_eq!(tracker.stats().live_blocks(), 0);
}

#[test]
fn test_reserve_error_converts_to_anyhow() {
    fn push_all(dq: &mut MapDeque<u32, 2, &TrackingAlloc>, n: u32) -> anyhow::Result<()> {
        for i in 0..n {
            dq.try_push_back(i)?;
        }
        Ok(())
    }

    let tracker = TrackingAlloc::new();
    let mut dq = MapDeque::new_in(&tracker);
    tracker.fail_after(3);
    let err = push_all(&mut dq, 100).unwrap_err();
    assert!(err.to_string().starts_with("memory allocation of"));
    tracker.stop_failing();
    assert_eq!(dq.len(), 4);
}

#[test]
fn test_element_hooks_run_through_borrowed_allocator() {
    let hooks = HookCounter::default();
    {
        let mut dq: MapDeque<String, 3, _> = MapDeque::new_in(&hooks);
        for i in 0..5 {
            dq.push_back(i.to_string());
        }
        assert_eq!(hooks.constructs.get(), 5);

        dq.push_front("front".into());
        dq.insert_at(3, "mid".into());
        dq.truncate(6);
        assert_eq!(hooks.constructs.get(), 7);
        assert_eq!(hooks.destroys.get(), 1);

        // Popped values are moved out, not destroyed in place.
        assert_eq!(dq.pop_front().as_deref(), Some("front"));
        assert_eq!(hooks.destroys.get(), 1);
    }
    // The remaining five elements are destroyed by the deque's drop.
    assert_eq!(hooks.constructs.get(), 7);
    assert_eq!(hooks.destroys.get(), 6);
}

#[test]
fn test_tracker_forwards_element_hooks() {
    let hooks = HookCounter::default();
    let tracker = TrackingAlloc::wrap(&hooks);
    {
        let dq: MapDeque<u32, 4, _> = MapDeque::from_elem_in(10, 1, &tracker);
        assert_eq!(dq.len(), 10);
    }
    assert_eq!(hooks.constructs.get(), 10);
    assert_eq!(hooks.destroys.get(), 10);
    assert_eq!(tracker.stats().live_blocks(), 0);
}
