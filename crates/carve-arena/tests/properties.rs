//! Integration test: allocator contract properties for both layouts.
//!
//! Each property is checked against `Box<dyn ChunkAllocator>` built from an
//! [`ArenaConfig`], so both layouts go through the same public surface.

use carve_arena::{
    AllocError, ArenaConfig, ChunkAllocator, ChunkDump, ChunkLayout, FreeError, TableAllocator,
    HEADER_SIZE,
};
use carve_core::{Allocation, ChunkInfo};
use carve_test_utils::{assert_consistent, replay, Workload};

fn build(layout: ChunkLayout, capacity: u32) -> Box<dyn ChunkAllocator> {
    ArenaConfig::new(layout)
        .with_capacity(capacity)
        .build()
        .unwrap()
}

fn both(capacity: u32) -> [Box<dyn ChunkAllocator>; 2] {
    [
        build(ChunkLayout::Table, capacity),
        build(ChunkLayout::Inline, capacity),
    ]
}

/// Bytes the layout spends on the remainder's header when splitting.
fn split_cost(layout: ChunkLayout) -> u32 {
    match layout {
        ChunkLayout::Table => 0,
        ChunkLayout::Inline => HEADER_SIZE,
    }
}

fn snapshot(a: &dyn ChunkAllocator) -> Vec<ChunkInfo> {
    a.chunks()
}

// ── Coverage and split ───────────────────────────────────────────────

#[test]
fn fresh_arena_is_one_free_chunk_covering_usable_bytes() {
    for a in both(4096) {
        let chunks = a.chunks();
        assert_eq!(chunks.len(), 1, "{}", a.layout());
        assert!(chunks[0].is_free());
        assert_eq!(chunks[0].size, a.usable_capacity());
        assert_consistent(&*a);
    }
}

#[test]
fn split_leaves_remainder_immediately_after() {
    for mut a in both(4096) {
        let before = a.chunks()[0];
        let h = a.allocate(100).unwrap();
        let chunks = a.chunks();
        assert_eq!(chunks.len(), 2);
        assert_eq!(h.offset(), before.offset);
        assert_eq!((chunks[0].size, chunks[0].allocated), (100, true));
        let cost = split_cost(a.layout());
        assert_eq!(chunks[1].offset.0, before.offset.0 + 100 + cost);
        assert_eq!(chunks[1].size, before.size - 100 - cost);
        assert!(chunks[1].is_free());
    }
}

// ── Coalescing ───────────────────────────────────────────────────────

#[test]
fn free_between_two_free_neighbours_yields_their_union() {
    for mut a in both(4096) {
        let cost = split_cost(a.layout());
        let x = a.allocate(100).unwrap();
        let y = a.allocate(200).unwrap();
        let z = a.allocate(300).unwrap();
        let _guard = a.allocate(50).unwrap();
        a.free(Some(x)).unwrap();
        a.free(Some(z)).unwrap();
        a.free(Some(y)).unwrap();

        let chunks = a.chunks();
        assert_eq!(chunks.len(), 3, "{}", a.layout());
        assert_eq!(chunks[0].offset, x.offset());
        assert_eq!(chunks[0].size, 100 + 200 + 300 + 2 * cost);
        assert!(chunks[0].is_free());
        assert_consistent(&*a);
    }
}

#[test]
fn freeing_everything_restores_initial_chunk() {
    for mut a in both(4096) {
        let initial = a.chunks();
        let handles: Vec<_> = [10, 20, 30, 40, 50]
            .iter()
            .filter_map(|&s| a.allocate(s))
            .collect();
        // Odd positions first, so the even frees merge in both directions.
        for h in handles.iter().skip(1).step_by(2).chain(handles.iter().step_by(2)) {
            a.free(Some(*h)).unwrap();
        }
        assert_eq!(a.chunks(), initial, "{}", a.layout());
    }
}

#[test]
fn coalesced_descriptor_slots_are_reusable() {
    let config = ArenaConfig::table()
        .with_capacity(1000)
        .with_max_chunks(3);
    let mut a = TableAllocator::new(&config).unwrap();
    let x = a.allocate(10).unwrap();
    let y = a.allocate(10).unwrap();
    assert_eq!(a.live_descriptors(), 3);
    a.free(Some(x)).unwrap();
    a.free(Some(y)).unwrap();
    assert_eq!(a.live_descriptors(), 1);
    assert!(a.allocate(10).is_some());
    assert!(a.allocate(10).is_some());
    assert_eq!(a.live_descriptors(), 3);
}

// ── Capacity ─────────────────────────────────────────────────────────

#[test]
fn usable_capacity_is_the_exact_limit() {
    for mut a in both(4096) {
        let usable = a.usable_capacity();
        assert!(matches!(
            a.try_allocate(usable + 1),
            Err(AllocError::OutOfSpace { largest_free, .. }) if largest_free == usable
        ));
        let all = a.allocate(usable).unwrap();
        assert_eq!(all.len(), usable);
        assert_eq!(a.chunks().len(), 1);
        assert!(a.allocate(1).is_none());
        a.free(Some(all)).unwrap();
        assert!(a.allocate(1).is_some());
    }
}

// ── Zero-size and null ───────────────────────────────────────────────

#[test]
fn zero_size_and_null_free_change_nothing() {
    for mut a in both(4096) {
        let _x = a.allocate(64).unwrap();
        let before = snapshot(&*a);
        assert!(a.allocate(0).is_none());
        assert_eq!(a.try_allocate(0), Ok(None));
        assert_eq!(a.free(None), Ok(()));
        assert_eq!(snapshot(&*a), before);
        assert_eq!(a.metrics().frees, 0);
        assert_eq!(a.metrics().zero_size_requests, 2);
    }
}

// ── Stale handles ────────────────────────────────────────────────────

#[test]
fn double_free_is_rejected_without_mutation() {
    for mut a in both(4096) {
        let x = a.allocate(64).unwrap();
        let _y = a.allocate(64).unwrap();
        a.free(Some(x)).unwrap();
        let before = snapshot(&*a);
        assert_eq!(
            a.free(Some(x)),
            Err(FreeError::StaleHandle {
                offset: x.offset(),
                stamp: x.stamp(),
            })
        );
        assert_eq!(snapshot(&*a), before);
        assert_eq!(a.metrics().rejected_frees, 1);
    }
}

#[test]
fn handle_from_before_init_is_stale() {
    for mut a in both(4096) {
        let old = a.allocate(64).unwrap();
        a.init();
        assert!(matches!(a.free(Some(old)), Err(FreeError::StaleHandle { .. })));
        let new = a.allocate(64).unwrap();
        assert_eq!(new.offset(), old.offset());
        assert!(matches!(a.free(Some(old)), Err(FreeError::StaleHandle { .. })));
        assert!(a.bytes(&old).is_none());
        assert_eq!(a.free(Some(new)), Ok(()));
    }
}

#[test]
fn widened_handle_cannot_reach_the_next_chunk() {
    for mut a in both(4096) {
        let x = a.allocate(8).unwrap();
        let y = a.allocate(8).unwrap();
        a.bytes_mut(&y).unwrap().copy_from_slice(b"SECRET!!");
        for len in [9, 16, 8 + HEADER_SIZE, 4096] {
            let widened = Allocation::new(x.offset(), len, x.stamp());
            assert!(a.bytes(&widened).is_none(), "{} len {len}", a.layout());
            assert!(a.bytes_mut(&widened).is_none(), "{} len {len}", a.layout());
        }
        assert_eq!(a.bytes(&y).unwrap(), b"SECRET!!");
        assert_consistent(&*a);
    }
}

// ── Descriptor exhaustion ────────────────────────────────────────────

#[test]
fn exhausted_descriptors_block_splits_but_not_exact_fits() {
    let k = 5;
    let config = ArenaConfig::table()
        .with_capacity(1000)
        .with_max_chunks(k);
    let mut a = TableAllocator::new(&config).unwrap();
    for _ in 0..k - 1 {
        assert!(a.allocate(10).is_some());
    }
    assert_eq!(a.live_descriptors(), k as usize);
    assert_eq!(
        a.try_allocate(10),
        Err(AllocError::DescriptorsExhausted { capacity: k })
    );
    let tail = a.chunks().last().copied().unwrap();
    assert!(tail.is_free());
    let h = a.allocate(tail.size).unwrap();
    assert_eq!(h.offset(), tail.offset);
    assert_consistent(&a);
}

#[test]
fn exhaustion_does_not_fall_back_to_a_later_chunk() {
    // Slots: [x alloc][hole 40 free][y alloc][tail free]. The hole is the
    // first fit for 20 bytes and needs a slot to split; none is free.
    let config = ArenaConfig::table()
        .with_capacity(200)
        .with_max_chunks(4);
    let mut a = TableAllocator::new(&config).unwrap();
    let _x = a.allocate(10).unwrap();
    let hole = a.allocate(40).unwrap();
    let _y = a.allocate(10).unwrap();
    a.free(Some(hole)).unwrap();
    assert_eq!(a.live_descriptors(), 4);
    assert_eq!(
        a.try_allocate(20),
        Err(AllocError::DescriptorsExhausted { capacity: 4 })
    );
    assert_eq!(a.allocate(40).map(|h| h.offset()), Some(hole.offset()));
}

// ── Determinism and churn ────────────────────────────────────────────

#[test]
fn same_ops_give_same_offsets() {
    for layout in [ChunkLayout::Table, ChunkLayout::Inline] {
        let ops = Workload::new(0xC0FFEE, 512).ops(2_000);
        let mut first = build(layout, 1 << 16);
        let mut second = build(layout, 1 << 16);
        assert_eq!(replay(&mut *first, &ops), replay(&mut *second, &ops));
        assert_eq!(first.chunks(), second.chunks());
    }
}

#[test]
fn dump_never_reports_gaps_under_churn() {
    for seed in 0..8u64 {
        for layout in [ChunkLayout::Table, ChunkLayout::Inline] {
            let mut a = build(layout, 8192);
            let ops = Workload::new(seed, 300).ops(400);
            replay(&mut *a, &ops);
            let dump = ChunkDump::capture(&*a);
            assert!(!dump.has_gaps(), "seed {seed}, {layout}:\n{dump}");
            assert!(dump.verify().is_ok(), "seed {seed}, {layout}:\n{dump}");
        }
    }
}
