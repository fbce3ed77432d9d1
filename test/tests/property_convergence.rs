/// PROPERTY-BASED TESTS: Synchronization invariants
///
/// Uses proptest to drive reference sets through random edits and check that the
/// replicas following them hold up.
///
/// Key invariants:
/// 1. Seq nums strictly increase and capacity is never exceeded
/// 2. A tracker converges to its source whatever the block budget
/// 3. A peer fed the tracker's deltas over the wire matches the tracker after every step
/// 4. An accumulator holds every item the tracker ever held

use std::collections::BTreeSet;

use proptest::prelude::*;
use seqset::{
    AdjustableTrackingSet, IterationOptions, ReferenceSet, SeqNum, SetIdentity, TrackingConfig,
    TrackingSet,
};
use seqset_test::{
    assertions::{assert_well_formed, records_of, seq_nums_of},
    text_codec, through_wire, SetOp,
};

// Strategy for a single edit
fn set_op_strategy() -> impl Strategy<Value = SetOp> {
    let values = prop::collection::vec(0u32..50, 0..6);
    prop_oneof![
        4 => values.clone().prop_map(SetOp::Add),
        1 => (0u32..50).prop_map(SetOp::RemoveFirst),
        1 => (2u32..7).prop_map(SetOp::RemoveMultiplesOf),
        1 => (0usize..12).prop_map(SetOp::RemoveAt),
        1 => Just(SetOp::Clear),
        1 => ((0u32..50), values).prop_map(|(value, items)| SetOp::RemoveAndAdd(value, items)),
    ]
}

// Edits whose effect does not depend on which items were evicted
fn tail_stable_op_strategy() -> impl Strategy<Value = SetOp> {
    prop_oneof![
        4 => prop::collection::vec(0u32..50, 0..6).prop_map(SetOp::Add),
        1 => Just(SetOp::Clear),
    ]
}

fn batches() -> impl Strategy<Value = Vec<Vec<SetOp>>> {
    prop::collection::vec(prop::collection::vec(set_op_strategy(), 0..5), 1..8)
}

fn numbers(capacity: usize) -> ReferenceSet<u32> {
    ReferenceSet::new(SetIdentity::new("numbers", "numbers-id"), capacity)
}

proptest! {
    /// Every edit leaves the set well formed
    #[test]
    fn prop_edits_keep_set_well_formed(
        capacity in 0usize..6,
        ops in prop::collection::vec(set_op_strategy(), 0..40),
    ) {
        let set = numbers(capacity);
        let mut high_water: SeqNum = 0;
        for op in &ops {
            op.apply(&set);
            let snapshot = set.snapshot().unwrap();
            assert_well_formed(&snapshot);
            high_water = high_water.max(snapshot.range_summary().last_seq_num);
            // seq nums are never reused, even after the newest item was removed
            let next = set.add_one(0).unwrap();
            prop_assert_eq!(next, high_water + 1);
            high_water = next;
        }
    }

    /// A bounded set holds the newest items of an unbounded set fed the same edits
    #[test]
    fn prop_bounded_set_is_tail_of_unbounded(
        capacity in 1usize..6,
        ops in prop::collection::vec(tail_stable_op_strategy(), 0..30),
    ) {
        let bounded = numbers(capacity);
        let unbounded = numbers(0);
        for op in &ops {
            op.apply(&bounded);
            op.apply(&unbounded);
        }
        let all = records_of(&unbounded.snapshot().unwrap());
        let tail = all[all.len().saturating_sub(capacity)..].to_vec();
        prop_assert_eq!(records_of(&bounded.snapshot().unwrap()), tail);
    }

    /// A tracker converges to its source whatever its block budget
    #[test]
    fn prop_tracker_converges(
        capacity in 0usize..6,
        block_budget in 0usize..4,
        batches in batches(),
    ) {
        let set = numbers(capacity);
        let tracker = set.create_tracking_set_with(
            TrackingConfig::builder().block_budget(block_budget).build(),
        );
        for batch in &batches {
            for op in batch {
                op.apply(&set);
            }
            // one budgeted step first, then the rest
            tracker.update_iteration(IterationOptions::default()).unwrap();
            assert_well_formed(&tracker.snapshot().unwrap());
            tracker.synchronize().unwrap();

            prop_assert_eq!(
                records_of(&tracker.snapshot().unwrap()),
                records_of(&set.snapshot().unwrap())
            );
            prop_assert!(!tracker.is_update_needed().unwrap());
        }
    }

    /// A peer applying the tracker's deltas, twice over, stays equal to the tracker
    #[test]
    fn prop_peer_follows_tracker_over_wire(
        capacity in 0usize..6,
        block_budget in 0usize..4,
        batches in batches(),
    ) {
        let codec = text_codec::<u32>();
        let set = numbers(capacity);
        let tracker = set.create_tracking_set_with(
            TrackingConfig::builder()
                .block_budget(block_budget)
                .codec(codec.clone())
                .build(),
        );
        let peer = TrackingSet::for_deltas(
            set.identity().clone(),
            TrackingConfig::builder().codec(codec.clone()).build(),
        );
        let options = IterationOptions::builder().serialize_items().build();

        for batch in &batches {
            for op in batch {
                op.apply(&set);
            }
            loop {
                let outcome = tracker.update_iteration(options).unwrap();
                let delta = outcome.delta.unwrap();
                let received = through_wire(&delta, codec.as_ref()).unwrap();
                peer.apply_delta(&received).unwrap();
                let once = records_of(&peer.snapshot().unwrap());
                peer.apply_delta(&received).unwrap();

                prop_assert_eq!(&once, &records_of(&peer.snapshot().unwrap()));
                prop_assert_eq!(&once, &records_of(&tracker.snapshot().unwrap()));
                prop_assert_eq!(peer.update_state(), tracker.update_state());
                if !outcome.work_remaining {
                    break;
                }
            }
        }
    }

    /// With removal disabled, a replica ends up with every item the tracker ever held
    #[test]
    fn prop_accumulator_holds_union(
        capacity in 0usize..6,
        block_budget in 0usize..4,
        batches in batches(),
    ) {
        let set = numbers(capacity);
        let tracker = set.create_tracking_set_with(
            TrackingConfig::builder().block_budget(block_budget).build(),
        );
        let history = AdjustableTrackingSet::new(set.identity().clone(), TrackingConfig::default());
        history.disable_removal().unwrap();
        let options = IterationOptions::builder().generate_delta().build();
        let mut ever_tracked = BTreeSet::new();

        for batch in &batches {
            for op in batch {
                op.apply(&set);
            }
            loop {
                let outcome = tracker.update_iteration(options).unwrap();
                history.apply_delta(&outcome.delta.unwrap()).unwrap();
                ever_tracked.extend(seq_nums_of(&tracker.snapshot().unwrap()));
                if !outcome.work_remaining {
                    break;
                }
            }
            let expected: Vec<SeqNum> = ever_tracked.iter().copied().collect();
            prop_assert_eq!(seq_nums_of(&history.snapshot().unwrap()), expected);
        }
    }
}
