/// INTEGRATION TESTS: end to end synchronization scenarios
///
/// A reference set feeds a tracking replica, whose deltas travel (optionally as bytes)
/// to independent peer replicas.

use std::sync::Arc;

use seqset::{
    AdjustableTrackingSet, IterationOptions, RangeSummary, ReferenceSet, RemoveRange,
    SetIdentity, TrackingConfig, TrackingSet, UpdateState,
};
use seqset_test::{
    assert_same_records, assertions::seq_nums_of, json_codec, reference_with, text_codec,
    through_wire, values, Reading,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn letters(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| item.to_string()).collect()
}

#[test]
fn capacity_three_keeps_newest() {
    init_logging();
    let set = ReferenceSet::new(SetIdentity::new("S", "u1"), 3);
    set.add(letters(&["a"])).unwrap();
    set.add(letters(&["b", "c"])).unwrap();
    set.add(letters(&["d"])).unwrap();

    assert_eq!(values(set.to_vec().unwrap()), letters(&["b", "c", "d"]));
    assert_eq!(seq_nums_of(&set.snapshot().unwrap()), vec![2, 3, 4]);
    assert_eq!(set.range_summary().unwrap(), RangeSummary::new(2, 4, 3));
}

#[test]
fn delta_describes_eviction_and_append() {
    init_logging();
    let set = ReferenceSet::new(SetIdentity::new("S", "u1"), 3);
    set.add(letters(&["a", "b", "c"])).unwrap();
    let tracker = set.create_tracking_set();
    tracker.synchronize().unwrap();

    set.add(letters(&["d"])).unwrap();
    let options = IterationOptions::builder().generate_delta().build();
    let outcome = tracker.update_iteration(options).unwrap();
    let delta = outcome.delta.unwrap();

    assert!(!delta.clear_at_start);
    assert_eq!(
        delta.remove_ranges,
        vec![RemoveRange {
            start_seq_num: 1,
            last_seq_num: 1,
            start_index: 0,
            count: 1,
        }]
    );
    assert_eq!(delta.add_ranges.len(), 1);
    assert_eq!(delta.add_ranges[0].start_seq_num, 4);
    let added = delta.add_ranges[0].items.clone().unwrap();
    assert_eq!(values(added), letters(&["d"]));
    assert_eq!(values(tracker.to_vec().unwrap()), letters(&["b", "c", "d"]));
}

#[test]
fn delta_brings_peer_replica_in_line() {
    init_logging();
    let set = ReferenceSet::new(SetIdentity::new("S", "u1"), 3);
    set.add(letters(&["a", "b", "c"])).unwrap();
    let tracker = set.create_tracking_set();
    let peer = TrackingSet::for_deltas(set.identity().clone(), TrackingConfig::default());
    let options = IterationOptions::builder().generate_delta().build();

    let first = tracker.update_iteration(options).unwrap().delta.unwrap();
    peer.apply_delta(&first).unwrap();
    assert_eq!(values(peer.to_vec().unwrap()), letters(&["a", "b", "c"]));

    set.add(letters(&["d"])).unwrap();
    let second = tracker.update_iteration(options).unwrap().delta.unwrap();
    peer.apply_delta(&second).unwrap();

    assert_eq!(values(peer.to_vec().unwrap()), letters(&["b", "c", "d"]));
    assert_same_records!(peer, set);
    assert_eq!(peer.update_state(), UpdateState::Complete);
}

#[test]
fn wire_round_trip_preserves_delta() {
    init_logging();
    let codec = text_codec::<String>();
    let set = reference_with("S", 0, letters(&["a", "b", "c", "d"]));
    let tracker = set.create_tracking_set_with(TrackingConfig::builder().codec(codec.clone()).build());
    let peer = TrackingSet::for_deltas(
        set.identity().clone(),
        TrackingConfig::builder().codec(codec.clone()).build(),
    );
    let options = IterationOptions::builder().serialize_items().build();

    let delta = tracker.update_iteration(options).unwrap().delta.unwrap();
    peer.apply_delta(&through_wire(&delta, codec.as_ref()).unwrap())
        .unwrap();

    set.remove_all(|item| item == "b" || item == "c").unwrap();
    set.add(letters(&["e"])).unwrap();
    let delta = tracker.update_iteration(options).unwrap().delta.unwrap();
    let received = through_wire(&delta, codec.as_ref()).unwrap();

    assert_eq!(received.remove_ranges, delta.remove_ranges);
    assert_eq!(received.clear_at_start, delta.clear_at_start);
    assert_eq!(received.source_update_state, delta.source_update_state);
    assert!(!received.has_items());
    peer.apply_delta(&received).unwrap();

    assert_eq!(values(peer.to_vec().unwrap()), letters(&["a", "d", "e"]));
    assert_same_records!(peer, set);
}

#[test]
fn json_items_reach_accumulator() {
    init_logging();
    let codec = json_codec::<Reading>();
    let set = reference_with(
        "temperatures",
        2,
        vec![Reading::new("t1", 20), Reading::new("t2", 21)],
    );
    let tracker = set.create_tracking_set_with(TrackingConfig::builder().codec(codec.clone()).build());
    let history = AdjustableTrackingSet::new(
        set.identity().clone(),
        TrackingConfig::builder().codec(codec.clone()).build(),
    );
    history.disable_removal().unwrap();
    history.set_filter(|reading: &Reading| reading.value >= 0).unwrap();
    let options = IterationOptions::builder().serialize_items().build();

    for value in [22, -5, 23] {
        let delta = tracker.update_iteration(options).unwrap().delta.unwrap();
        history
            .apply_delta(&through_wire(&delta, codec.as_ref()).unwrap())
            .unwrap();
        set.add_one(Reading::new("t1", value)).unwrap();
    }
    let delta = tracker.update_iteration(options).unwrap().delta.unwrap();
    history
        .apply_delta(&through_wire(&delta, codec.as_ref()).unwrap())
        .unwrap();

    // the source only keeps two, the accumulator keeps everything it accepted
    assert_eq!(set.count().unwrap(), 2);
    let kept: Vec<i64> = values(history.to_vec().unwrap())
        .iter()
        .map(|reading| reading.value)
        .collect();
    assert_eq!(kept, vec![20, 21, 22, 23]);
    assert_eq!(seq_nums_of(&history.snapshot().unwrap()), vec![1, 2, 3, 5]);
}

#[test]
fn first_delta_clears_at_start() {
    init_logging();
    let set = reference_with("S", 0, vec![1u32, 2, 3]);
    let tracker = set.create_tracking_set();
    let options = IterationOptions::builder().generate_delta().build();
    let delta = tracker.update_iteration(options).unwrap().delta.unwrap();

    assert!(delta.clear_at_start);
    assert_eq!(delta.added_count(), 3);
    assert_eq!(delta.add_ranges.len(), 1);
}

#[test]
fn replaced_contents_remove_then_add() {
    init_logging();
    let set = reference_with("S", 0, vec![1u32, 2, 3]);
    let tracker = set.create_tracking_set();
    tracker.synchronize().unwrap();

    set.clear().unwrap();
    set.add(vec![7, 8]).unwrap();
    let options = IterationOptions::builder().generate_delta().build();
    let delta = tracker.update_iteration(options).unwrap().delta.unwrap();

    assert!(!delta.clear_at_start);
    assert_eq!(delta.removed_count(), 3);
    assert_eq!(delta.added_count(), 2);
    assert_eq!(values(tracker.to_vec().unwrap()), vec![7, 8]);
    assert_eq!(seq_nums_of(&tracker.snapshot().unwrap()), vec![4, 5]);
}

#[test]
fn snapshot_can_be_a_fixed_baseline() {
    init_logging();
    let set = reference_with("S", 0, vec![1u32, 2]);
    let baseline = set.snapshot().unwrap();
    set.add(vec![3]).unwrap();

    let tracker = TrackingSet::new(&baseline, TrackingConfig::default());
    tracker.synchronize().unwrap();
    assert_eq!(values(tracker.to_vec().unwrap()), vec![1, 2]);
    assert!(!tracker.is_update_needed().unwrap());
}

#[test]
fn shared_items_are_not_copied() {
    let set = reference_with("S", 0, vec![Reading::new("t1", 1)]);
    let tracker = set.create_tracking_set();
    tracker.synchronize().unwrap();
    let source_item = set.get(0).unwrap().into_item();
    let tracked_item = tracker.get(0).unwrap().into_item();
    assert!(Arc::ptr_eq(&source_item, &tracked_item));
}
