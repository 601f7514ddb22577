use tandem_arena::{kib, Arena, ArenaConfig, ArenaError, HeapBuffer, ScratchRegion};
use tandem_test_utils::{arena_buffer, init_tracing};

#[test]
fn push_save_restore_partition_walkthrough() {
    init_tracing();
    let mut buf = vec![0u8; 1024];
    let mut arena = Arena::new(&mut buf);

    let a = arena.push(100).unwrap();
    assert_eq!(a.len(), 100);
    assert_eq!(arena.free_size(), 924);

    let mark = arena.save();
    arena.push(200).unwrap();
    assert_eq!(arena.free_size(), 724);
    arena.restore(mark).unwrap();
    assert_eq!(arena.free_size(), 924);

    let child = arena.partition(500).unwrap();
    assert_eq!(arena.free_size(), 424);
    assert_eq!(child.free_size(), 500);
    assert!(child.push(500).is_ok());
    assert_eq!(
        child.push(1).unwrap_err(),
        ArenaError::CapacityExceeded {
            requested: 1,
            available: 0,
        }
    );
}

#[test]
fn engine_state_below_frame_scratch_above() {
    init_tracing();
    let mut buffer = arena_buffer(kib(4));
    let mut arena = buffer.arena();

    // Long-lived state grows from the bottom once.
    arena.push_copy(b"engine state").unwrap();
    let persistent = arena.commit_size();

    // Each frame pushes scratch from the top and drops all of it.
    for frame in 0..8usize {
        let mark = arena.save_top();
        let scratch = arena.push_top(256 + frame * 64).unwrap();
        scratch.fill(frame as u8);
        arena.push_value_top(frame as u32).unwrap();
        arena.restore_top(mark).unwrap();
        assert_eq!(arena.commit_size(), persistent);
    }

    let stats = arena.stats();
    assert_eq!(stats.bottom, persistent);
    assert_eq!(stats.top, 0);
    assert!(stats.top_high_water >= 256 + 7 * 64 + 4);
}

#[test]
fn temporary_decode_buffer_is_discarded() {
    let mut buffer = HeapBuffer::new(ArenaConfig::new(kib(1))).unwrap();
    let mut arena = buffer.arena();

    let checksum: u32 = arena.with_scope(|scope| {
        let raw = scope.load_nul_terminated("#version 330\nvoid main() {}").unwrap();
        raw.iter().map(|&b| u32::from(b)).sum()
    });

    assert!(checksum > 0);
    assert_eq!(arena.commit_size(), 0);
}

#[test]
fn oversized_startup_allocation_is_detectable() {
    let mut buffer = HeapBuffer::new(ArenaConfig::new(kib(1))).unwrap();
    let arena = buffer.arena();
    assert!(!arena.can_accommodate(kib(2)));
    assert!(matches!(
        arena.partition(kib(2)),
        Err(ArenaError::CapacityExceeded { .. })
    ));
    assert_eq!(arena.commit_size(), 0);
}

#[test]
fn scratch_region_reuses_one_buffer() {
    let mut scratch = ScratchRegion::new(ArenaConfig::new(kib(1))).unwrap();
    let mut first = 0;
    for i in 0..4 {
        let addr = scratch.frame(|arena| {
            let bytes = arena.push(512).unwrap();
            bytes.as_ptr().addr()
        });
        if i == 0 {
            first = addr;
        }
        assert_eq!(addr, first);
    }
    assert_eq!(scratch.frames(), 4);
    assert_eq!(scratch.peak_commit(), 512);
}
