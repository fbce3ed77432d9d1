use std::sync::Arc;

use log::trace;

use crate::{
    tracking::{
        diff::{apply_plan, plan_sync, SyncPlan},
        replica::Replica,
        tracking_state::TrackingState,
    },
    AddRange, ItemObserver, ItemRecord, IterationOptions, Locked, RangeSummary, SetDelta,
    SetError, SetIdentity, SetLock, SetSeqNum, SetSource, SetVariant, Snapshot,
    TrackingConfig, Unlocked, UpdateState,
};

/// What a single call to [`TrackingSet::update_iteration`] did
#[derive(Debug)]
pub struct IterationOutcome<T> {
    /// The tracker's contents changed and its set seq num was bumped
    pub changed: bool,
    /// More blocks remain beyond the budget, call again
    pub work_remaining: bool,
    pub update_state: UpdateState,
    /// Present when requested through `IterationOptions::generate_delta`
    pub delta: Option<SetDelta<T>>,
}

/// A replica that incrementally follows a source set.
///
/// The tracker borrows its source and never owns it. Each call to `update_iteration`
/// snapshots the source if it changed, diffs the snapshot against the tracker's own
/// contents and applies the result, optionally describing it as a [`SetDelta`] that a
/// peer replica can apply with `apply_delta`.
///
/// `L` selects the lock cell. The default `Locked` tracker may be shared between
/// threads and followed by other trackers; an [`UnlockedTrackingSet`] belongs to one
/// owner and is the only kind that accepts observers.
pub struct TrackingSet<'s, T, L = Locked<TrackingState<T>>> {
    source: Option<&'s dyn SetSource<T>>,
    replica: Replica<T, L>,
}

pub type UnlockedTrackingSet<'s, T> = TrackingSet<'s, T, Unlocked<TrackingState<T>>>;

impl<'s, T> TrackingSet<'s, T> {
    /// Creates a tracker following `source`. It is empty and `Initial` until the first
    /// iteration.
    pub fn new(source: &'s dyn SetSource<T>, config: TrackingConfig<T>) -> Self {
        Self::build(Some(source), source.identity().clone(), config)
    }

    /// Creates a tracker that only ever advances through `apply_delta`.
    pub fn for_deltas(identity: SetIdentity, config: TrackingConfig<T>) -> Self {
        Self::build(None, identity, config)
    }
}

impl<'s, T> UnlockedTrackingSet<'s, T> {
    pub fn unlocked(source: &'s dyn SetSource<T>, config: TrackingConfig<T>) -> Self {
        Self::build(Some(source), source.identity().clone(), config)
    }

    pub fn unlocked_for_deltas(identity: SetIdentity, config: TrackingConfig<T>) -> Self {
        Self::build(None, identity, config)
    }
}

impl<'s, T, L: SetLock<TrackingState<T>>> TrackingSet<'s, T, L> {
    fn build(
        source: Option<&'s dyn SetSource<T>>,
        identity: SetIdentity,
        config: TrackingConfig<T>,
    ) -> Self {
        // a tracker holds exactly what its source holds, bounds only apply to delta consumers
        let capacity = match source {
            Some(_) => 0,
            None => config.capacity.unwrap_or(0),
        };
        Self {
            source,
            replica: Replica::new(identity, SetVariant::Tracking, capacity, config),
        }
    }

    pub fn identity(&self) -> &SetIdentity {
        self.replica.identity()
    }

    pub fn has_source(&self) -> bool {
        self.source.is_some()
    }

    /// Change counter, readable without taking the lock.
    pub fn set_seq_num(&self) -> SetSeqNum {
        self.replica.set_seq_num()
    }

    /// Freshness relative to the source, readable without taking the lock.
    pub fn update_state(&self) -> UpdateState {
        self.replica.update_state()
    }

    pub fn capacity(&self) -> Result<usize, SetError> {
        self.replica.capacity()
    }

    pub fn count(&self) -> Result<usize, SetError> {
        self.replica.count()
    }

    pub fn get(&self, index: usize) -> Result<ItemRecord<T>, SetError> {
        self.replica.get(index)
    }

    pub fn to_vec(&self) -> Result<Vec<Arc<T>>, SetError> {
        self.replica.to_vec()
    }

    pub fn range_summary(&self) -> Result<RangeSummary, SetError> {
        self.replica.range_summary()
    }

    pub fn snapshot(&self) -> Result<Snapshot<T>, SetError> {
        self.replica.snapshot()
    }

    /// Attaches an observer notified inline with every change. Only unlocked trackers
    /// accept observers; locked ones are followed through iterations and deltas instead.
    pub fn add_observer(
        &self,
        observer: impl ItemObserver<T> + Send + 'static,
    ) -> Result<(), SetError> {
        self.replica.add_observer(observer)
    }

    /// Whether an iteration would find anything to do. Always false without a source.
    pub fn is_update_needed(&self) -> Result<bool, SetError> {
        let Some(source) = self.source else {
            return Ok(false);
        };
        let source_seq_num = source.set_seq_num();
        self.replica.with_state(|state| match &state.baseline {
            Some(baseline) => state.work_remaining || baseline.set_seq_num() != source_seq_num,
            None => true,
        })
    }

    /// Runs one bounded synchronization step against the source.
    pub fn update_iteration(
        &self,
        options: IterationOptions,
    ) -> Result<IterationOutcome<T>, SetError> {
        let replica = &self.replica;
        let source = self.source.ok_or_else(|| SetError::NoSource {
            name: replica.identity().name().to_string(),
        })?;
        let codec = if options.serialize_items {
            Some(replica.serialization_codec()?)
        } else {
            None
        };
        let block_budget = options.block_budget.unwrap_or(replica.block_budget());

        // the source's lock is only ever taken while ours is released
        let source_seq_num = source.set_seq_num();
        let stale = replica.with_state(|state| {
            state
                .baseline
                .as_ref()
                .map_or(true, |baseline| baseline.set_seq_num() != source_seq_num)
        })?;
        let fresh = if stale {
            Some(source.snapshot()?)
        } else {
            None
        };

        replica.with_state(|state| -> Result<IterationOutcome<T>, SetError> {
            if let Some(snapshot) = fresh {
                state.offer_baseline(snapshot);
            }
            let Some(baseline) = state.baseline.clone() else {
                return Ok(IterationOutcome {
                    changed: false,
                    work_remaining: false,
                    update_state: state.update_state,
                    delta: None,
                });
            };

            let plan = plan_sync(&state.store, &baseline, block_budget);
            let mut delta = if options.generate_delta {
                Some(delta_from_plan(replica.identity(), &baseline, &plan))
            } else {
                None
            };
            if let (Some(delta), Some(codec)) = (delta.as_mut(), codec) {
                delta.serialize_with(codec)?;
            }

            apply_plan(&mut state.store, &baseline, &plan)?;
            let changed = state.store.commit();
            state.work_remaining = plan.work_remaining;
            state.update_state = state.iteration_state(baseline.update_state());
            replica.publish(state);

            if let Some(delta) = delta.as_mut() {
                delta.source_update_state = state.update_state;
            }
            trace!(
                "TrackingSet: iteration on set {:?} changed={} work_remaining={} state={:?}",
                replica.identity().name(),
                changed,
                plan.work_remaining,
                state.update_state
            );
            Ok(IterationOutcome {
                changed,
                work_remaining: plan.work_remaining,
                update_state: state.update_state,
                delta,
            })
        })?
    }

    /// Iterates with the configured budget until no work remains. Returns whether
    /// anything changed.
    pub fn synchronize(&self) -> Result<bool, SetError> {
        let mut changed = false;
        loop {
            let outcome = self.update_iteration(IterationOptions::default())?;
            changed |= outcome.changed;
            if !outcome.work_remaining {
                return Ok(changed);
            }
        }
    }

    /// Applies a delta produced by a peer with the same identity, as one atomic change.
    ///
    /// Items arriving only in serialized form are deserialized through the configured
    /// codec before anything is touched. Returns whether the contents changed.
    pub fn apply_delta(&self, delta: &SetDelta<T>) -> Result<bool, SetError> {
        self.replica.apply_delta(delta)
    }
}

fn delta_from_plan<T>(
    identity: &SetIdentity,
    baseline: &Snapshot<T>,
    plan: &SyncPlan,
) -> SetDelta<T> {
    let mut delta = SetDelta::new(identity.clone(), baseline.update_state());
    delta.clear_at_start = plan.clear_at_start;
    delta.remove_ranges = plan.removals.clone();
    let target = baseline.records();
    delta.add_ranges = plan
        .additions
        .iter()
        .map(|run| {
            let items = target[run.start..run.start + run.len]
                .iter()
                .map(|record| record.item().clone())
                .collect();
            AddRange::with_items(run.start_seq_num, run.start, items)
        })
        .collect();
    delta
}

impl<'s, T: Send + Sync> SetSource<T> for TrackingSet<'s, T> {
    fn identity(&self) -> &SetIdentity {
        self.replica.identity()
    }

    fn set_seq_num(&self) -> SetSeqNum {
        self.set_seq_num()
    }

    fn snapshot(&self) -> Result<Snapshot<T>, SetError> {
        self.snapshot()
    }
}
