use mapdeque::{MapDeque, OutOfRange, MIN_MAP_LEN};

fn contents<const K: usize>(dq: &MapDeque<i32, K>) -> Vec<i32> {
    dq.iter().copied().collect()
}

#[test]
fn test_push_back_then_front() {
    let mut dq: MapDeque<i32> = MapDeque::new();
    dq.push_back(1);
    dq.push_back(2);
    dq.push_back(3);
    dq.push_front(0);

    assert_eq!(contents(&dq), vec![0, 1, 2, 3]);
    assert_eq!(dq.len(), 4);
}

#[test]
fn test_erase_middle_returns_next() {
    let mut dq: MapDeque<i32> = MapDeque::from([10, 20, 30]);
    let pos = (dq.begin() + 1).position();

    let next = dq.erase(pos);
    assert_eq!(contents(&dq), vec![10, 30]);
    assert_eq!(*dq.cursor_at(next), 30);
}

#[test]
fn test_one_past_full_chunk() {
    const K: usize = 10;
    let mut dq: MapDeque<i32, K> = MapDeque::from_elem(K, 5);
    assert_eq!(dq.map_len(), 1);

    dq.push_back(6);
    assert_eq!(dq.len(), K + 1);
    assert_eq!(dq.map_len(), MIN_MAP_LEN);
    assert_eq!(dq.chunk_count(), 2);
    assert!(dq.iter().take(K).all(|&x| x == 5));
    assert_eq!(dq.back(), Some(&6));
}

#[test]
fn test_at_bounds() -> anyhow::Result<()> {
    let dq: MapDeque<i32, 4> = (0..9).collect();

    let err = dq.at(dq.len()).unwrap_err();
    assert_eq!(err, OutOfRange { index: 9, len: 9 });
    assert_eq!(err.to_string(), "deque::_M_range_check");

    let last = dq.at(dq.len() - 1)?;
    assert_eq!(*last, 8);
    Ok(())
}

#[test]
fn test_at_on_empty() {
    let dq: MapDeque<i32> = MapDeque::new();
    assert!(dq.at(0).is_err());
    assert!(dq.front().is_none());
    assert!(dq.back().is_none());
}

#[test]
fn test_at_mut_propagates_errors() -> anyhow::Result<()> {
    let mut dq: MapDeque<i32> = MapDeque::from([1, 2, 3]);
    *dq.at_mut(1)? += 40;
    assert_eq!(dq[1], 42);

    let err: anyhow::Error = dq.at_mut(3).unwrap_err().into();
    assert_eq!(err.to_string(), "deque::_M_range_check");
    Ok(())
}

#[test]
fn test_front_pushes_reverse_back_pushes_preserve() {
    let mut dq: MapDeque<i32, 3> = MapDeque::new();
    for i in 0..20 {
        dq.push_front(i);
    }
    for i in 100..120 {
        dq.push_back(i);
    }
    let expected: Vec<i32> = (0..20).rev().chain(100..120).collect();
    assert_eq!(contents(&dq), expected);
    for (i, value) in expected.iter().enumerate() {
        assert_eq!(dq[i], *value);
    }
}

#[test]
fn test_push_pop_roundtrip_is_identity() {
    let mut dq: MapDeque<i32, 4> = (0..13).collect();
    let before = contents(&dq);

    dq.push_back(99);
    assert_eq!(dq.pop_back(), Some(99));
    dq.push_front(-99);
    assert_eq!(dq.pop_front(), Some(-99));

    assert_eq!(contents(&dq), before);
}

#[test]
fn test_alternating_ends_grow_and_drain() {
    let mut dq: MapDeque<u32, 5> = MapDeque::new();
    for i in 0..500 {
        if i % 3 == 0 {
            dq.push_front(i);
        } else {
            dq.push_back(i);
        }
    }
    assert_eq!(dq.len(), 500);

    let mut drained = 0;
    loop {
        let popped = if drained % 2 == 0 { dq.pop_front() } else { dq.pop_back() };
        if popped.is_none() {
            break;
        }
        drained += 1;
    }
    assert_eq!(drained, 500);
    assert_eq!(dq.map_len(), 0);
    assert_eq!(dq.capacity(), 0);
}

#[test]
fn test_insert_then_erase_restores() {
    let original: MapDeque<i32, 4> = (0..17).collect();
    for index in [0, 1, 5, 8, 12, 16, 17] {
        let mut dq = original.clone();
        let pos = dq.position(index);
        let at = dq.insert(pos, -1);
        assert_eq!(dq[at], -1);
        assert_eq!(dq.len(), 18);

        dq.erase(at);
        assert_eq!(dq, original, "insert/erase at {index}");
    }
}

#[test]
fn test_insert_move_only_values() {
    let mut dq: MapDeque<Box<i32>, 3> = (0..8).map(Box::new).collect();
    dq.insert_at(2, Box::new(100));
    dq.insert_at(7, Box::new(200));
    let values: Vec<i32> = dq.iter().map(|b| **b).collect();
    assert_eq!(values, vec![0, 1, 100, 2, 3, 4, 5, 200, 6, 7]);

    assert_eq!(dq.remove(2).map(|b| *b), Some(100));
    assert_eq!(dq.remove(6).map(|b| *b), Some(200));
    assert!(dq.iter().map(|b| **b).eq(0..8));
}

#[test]
fn test_resize_roundtrip() {
    let mut dq: MapDeque<i32, 4> = (0..10).collect();
    dq.resize(25, 7);
    assert_eq!(dq.len(), 25);
    assert!(dq.iter().skip(10).all(|&x| x == 7));

    dq.resize(10, 0);
    assert_eq!(contents(&dq), (0..10).collect::<Vec<_>>());

    dq.resize(10, 0);
    assert_eq!(dq.len(), 10);

    let mut next = 100;
    dq.resize_with(12, || {
        next += 1;
        next
    });
    assert_eq!(&contents(&dq)[10..], &[101, 102]);
}

#[test]
fn test_clear_releases_everything() {
    let mut dq: MapDeque<String, 2> = (0..9).map(|i| i.to_string()).collect();
    dq.clear();
    assert!(dq.is_empty());
    assert_eq!(dq.chunk_count(), 0);
    assert_eq!(dq.map_len(), 0);

    dq.push_back("again".to_string());
    assert_eq!(dq.front().map(String::as_str), Some("again"));
}

#[test]
fn test_clone_equals_original_in_many_states() {
    let mut states: Vec<MapDeque<i32, 4>> = Vec::new();
    states.push(MapDeque::new());
    states.push(MapDeque::from([1]));
    states.push((0..30).collect());

    let mut rebuilt: MapDeque<i32, 4> = MapDeque::new();
    for i in 0..100 {
        rebuilt.push_front(i);
    }
    states.push(rebuilt);

    let mut shrunk: MapDeque<i32, 4> = (0..50).collect();
    shrunk.truncate(7);
    for _ in 0..3 {
        shrunk.pop_front();
    }
    states.push(shrunk);

    for dq in &states {
        let copy = dq.clone();
        assert_eq!(&copy, dq);
        assert_eq!(copy.len(), dq.len());
    }
}

#[test]
fn test_clone_is_deep() {
    let original: MapDeque<Vec<i32>, 2> = (0..5).map(|i| vec![i]).collect();
    let mut copy = original.clone();
    copy[0].push(99);
    assert_eq!(original[0], vec![0]);
    assert_eq!(copy[0], vec![0, 99]);
}

#[test]
fn test_clone_from_all_size_relations() {
    let target_base: MapDeque<i32, 4> = (100..110).collect();
    for source_len in [0, 3, 10, 12, 40] {
        let source: MapDeque<i32, 4> = (0..source_len).collect();
        let mut target = target_base.clone();
        target.clone_from(&source);
        assert_eq!(target, source, "source of {source_len}");
    }
}

#[test]
fn test_assign_fill() {
    let mut dq: MapDeque<i32, 4> = (0..6).collect();
    dq.assign(6, 1);
    assert_eq!(contents(&dq), vec![1; 6]);
    dq.assign(2, 2);
    assert_eq!(contents(&dq), vec![2; 2]);
    dq.assign(9, 3);
    assert_eq!(contents(&dq), vec![3; 9]);
    dq.assign(64, 4);
    assert_eq!(contents(&dq), vec![4; 64]);
}

#[test]
fn test_swap_and_std_swap() {
    let mut a: MapDeque<i32, 4> = (0..10).collect();
    let mut b: MapDeque<i32, 4> = (50..53).collect();
    a.swap(&mut b);
    assert_eq!(contents(&a), vec![50, 51, 52]);
    assert_eq!(contents(&b), (0..10).collect::<Vec<_>>());

    std::mem::swap(&mut a, &mut b);
    assert_eq!(a.len(), 10);
    assert_eq!(b.len(), 3);
}

#[test]
fn test_relational_operators() {
    let a: MapDeque<i32> = MapDeque::from([1, 2, 3]);
    let b: MapDeque<i32> = MapDeque::from([1, 2, 4]);
    let prefix: MapDeque<i32> = MapDeque::from([1, 2]);

    assert!(a < b);
    assert!(b > a);
    assert!(prefix < a);
    assert!(a >= prefix);
    assert!(a <= a.clone());
    assert!(a != b);
    assert_eq!(a, vec![1, 2, 3]);
}

#[test]
fn test_equality_across_chunk_sizes() {
    let a: MapDeque<i32, 2> = (0..20).collect();
    let b: MapDeque<i32, 16> = (0..20).collect();
    assert_eq!(a, b);
    assert!(a <= b && a >= b);
}

#[test]
fn test_iterator_arithmetic() {
    let dq: MapDeque<i32, 3> = (0..30).collect();
    let begin = dq.begin();
    let end = dq.end();

    assert_eq!(end - begin, 30);
    let mut c = begin;
    c += 17;
    assert_eq!(*c, 17);
    c -= 16;
    assert_eq!(*c, 1);
    assert_eq!((c + 28).index(), 29);
    assert!(c > begin && c < end);
    assert_eq!((end - 1).get(), Some(&29));

    let rev: Vec<i32> = dq.iter().rev().take(3).copied().collect();
    assert_eq!(rev, vec![29, 28, 27]);
}

#[test]
fn test_mutation_through_accessors() {
    let mut dq: MapDeque<i32, 4> = (0..10).collect();
    if let Some(front) = dq.front_mut() {
        *front = -1;
    }
    if let Some(back) = dq.back_mut() {
        *back = -2;
    }
    dq[5] = 55;
    if let Some(x) = dq.get_mut(6) {
        *x = 66;
    }
    assert_eq!(contents(&dq), vec![-1, 1, 2, 3, 4, 55, 66, 7, 8, -2]);
    assert!(dq.contains(&55));
    assert!(!dq.contains(&5));
}

#[test]
fn test_extend_by_reference_and_conversions() {
    let mut dq: MapDeque<i32, 4> = MapDeque::from(vec![1, 2]);
    dq.extend(&[3, 4, 5]);
    dq.extend(vec![6]);
    assert_eq!(dq, [1, 2, 3, 4, 5, 6]);

    let from_array: MapDeque<i32, 4> = MapDeque::from([1, 2, 3, 4, 5, 6]);
    assert_eq!(from_array.map_len(), 2);
    assert_eq!(dq, from_array);
    assert_eq!(format!("{dq:?}"), "[1, 2, 3, 4, 5, 6]");
}
