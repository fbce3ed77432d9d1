/// INTEGRATION TESTS: Sets shared between threads
///
/// A writer edits a reference set while tracking replicas follow it from other threads.

use std::{
    sync::atomic::{AtomicBool, Ordering},
    thread,
};

use seqset::{IterationOptions, ReferenceSet, SetIdentity, TrackingConfig, UpdateState};
use seqset_test::{
    assert_same_records,
    assertions::{assert_well_formed, seq_nums_of},
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn numbers(capacity: usize) -> ReferenceSet<u32> {
    ReferenceSet::new(SetIdentity::new("numbers", "numbers-id"), capacity)
}

#[test]
fn tracker_follows_writer_on_another_thread() {
    init_logging();
    let set = numbers(16);
    let tracker = set.create_tracking_set_with(TrackingConfig::builder().block_budget(2).build());
    let writing = AtomicBool::new(true);

    thread::scope(|scope| {
        scope.spawn(|| {
            for value in 0..500u32 {
                set.add_one(value).unwrap();
                if value % 7 == 0 {
                    set.remove_all(|item| item % 3 == 0).unwrap();
                }
            }
            writing.store(false, Ordering::Release);
        });
        scope.spawn(|| {
            while writing.load(Ordering::Acquire) {
                tracker
                    .update_iteration(IterationOptions::default())
                    .unwrap();
                assert_well_formed(&tracker.snapshot().unwrap());
            }
        });
    });

    tracker.synchronize().unwrap();
    assert_same_records!(tracker, set);
    assert_eq!(tracker.update_state(), UpdateState::Complete);
}

#[test]
fn two_threads_share_one_tracker() {
    init_logging();
    let set = numbers(0);
    let tracker = set.create_tracking_set_with(TrackingConfig::builder().block_budget(1).build());
    let writing = AtomicBool::new(true);

    thread::scope(|scope| {
        scope.spawn(|| {
            for batch in 0..100u32 {
                set.add((0..5).map(|offset| batch * 5 + offset)).unwrap();
                set.remove_all(|item| item % 4 == 1).unwrap();
            }
            writing.store(false, Ordering::Release);
        });
        for _ in 0..2 {
            scope.spawn(|| {
                while writing.load(Ordering::Acquire) {
                    tracker.synchronize().unwrap();
                }
            });
        }
    });

    tracker.synchronize().unwrap();
    assert_same_records!(tracker, set);
    assert!(!tracker.is_update_needed().unwrap());
}

#[test]
fn other_threads_read_through_snapshots() {
    init_logging();
    let set = numbers(0);
    set.add(1..=4u32).unwrap();
    assert!(set.is_owner_thread());

    let seen = thread::scope(|scope| {
        scope
            .spawn(|| {
                assert!(!set.is_owner_thread());
                let mut seen = Vec::new();
                set.for_each_item(|record| seen.push(record.seq_num()))
                    .unwrap();
                seen
            })
            .join()
            .unwrap()
    });

    assert_eq!(seen, seq_nums_of(&set.snapshot().unwrap()));
}
