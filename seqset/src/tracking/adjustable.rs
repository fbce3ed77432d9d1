use std::sync::Arc;

use log::info;

use crate::{
    tracking::{replica::Replica, tracking_set::IterationOutcome, tracking_state::ItemFilter},
    ItemObserver, ItemRecord, IterationOptions, Locked, RangeSummary, SetDelta, SetError,
    SetIdentity, SetLock, SetSeqNum, SetSource, SetVariant, Snapshot, TrackingConfig,
    TrackingState, Unlocked, UpdateState,
};

/// Delta-only replica with its own capacity, an optional filter and optionally no removal.
///
/// With removal disabled the set only ever grows, bounded by its own capacity, which
/// lets it keep a longer rolling history than the source it is fed from.
pub struct AdjustableTrackingSet<T, L = Locked<TrackingState<T>>> {
    inner: Replica<T, L>,
}

pub type UnlockedAdjustableTrackingSet<T> = AdjustableTrackingSet<T, Unlocked<TrackingState<T>>>;

impl<T> AdjustableTrackingSet<T> {
    pub fn new(identity: SetIdentity, config: TrackingConfig<T>) -> Self {
        Self::build(identity, config)
    }
}

impl<T> UnlockedAdjustableTrackingSet<T> {
    pub fn unlocked(identity: SetIdentity, config: TrackingConfig<T>) -> Self {
        Self::build(identity, config)
    }
}

impl<T, L: SetLock<TrackingState<T>>> AdjustableTrackingSet<T, L> {
    fn build(identity: SetIdentity, config: TrackingConfig<T>) -> Self {
        let capacity = config.capacity.unwrap_or(0);
        Self {
            inner: Replica::new(identity, SetVariant::AdjustableTracking, capacity, config),
        }
    }

    /// Installs the accept/reject predicate for items added by later deltas.
    pub fn set_filter(
        &self,
        filter: impl Fn(&T) -> bool + Send + Sync + 'static,
    ) -> Result<(), SetError> {
        let filter: ItemFilter<T> = Arc::new(filter);
        self.inner.with_state(|state| state.filter = Some(filter))
    }

    pub fn clear_filter(&self) -> Result<(), SetError> {
        self.inner.with_state(|state| state.filter = None)
    }

    /// Turns the set into an accumulator: remove ranges in later deltas are ignored.
    pub fn disable_removal(&self) -> Result<(), SetError> {
        self.inner.with_state(|state| {
            if state.removal_enabled {
                info!(
                    "AdjustableTrackingSet: removal disabled on set {:?}",
                    state.store.name()
                );
            }
            state.removal_enabled = false;
        })
    }

    pub fn is_removal_enabled(&self) -> Result<bool, SetError> {
        self.inner.with_state(|state| state.removal_enabled)
    }

    /// Always fails, this set only advances through [`apply_delta`](Self::apply_delta).
    pub fn update_iteration(
        &self,
        _options: IterationOptions,
    ) -> Result<IterationOutcome<T>, SetError> {
        Err(SetError::OperationDisabled {
            name: self.inner.identity().name().to_string(),
            variant: self.inner.variant().as_str(),
            operation: "update_iteration",
        })
    }

    pub fn apply_delta(&self, delta: &SetDelta<T>) -> Result<bool, SetError> {
        self.inner.apply_delta(delta)
    }

    pub fn add_observer(
        &self,
        observer: impl ItemObserver<T> + Send + 'static,
    ) -> Result<(), SetError> {
        self.inner.add_observer(observer)
    }

    pub fn identity(&self) -> &SetIdentity {
        self.inner.identity()
    }

    pub fn set_seq_num(&self) -> SetSeqNum {
        self.inner.set_seq_num()
    }

    pub fn update_state(&self) -> UpdateState {
        self.inner.update_state()
    }

    pub fn capacity(&self) -> Result<usize, SetError> {
        self.inner.capacity()
    }

    pub fn count(&self) -> Result<usize, SetError> {
        self.inner.count()
    }

    pub fn get(&self, index: usize) -> Result<ItemRecord<T>, SetError> {
        self.inner.get(index)
    }

    pub fn to_vec(&self) -> Result<Vec<Arc<T>>, SetError> {
        self.inner.to_vec()
    }

    pub fn range_summary(&self) -> Result<RangeSummary, SetError> {
        self.inner.range_summary()
    }

    pub fn snapshot(&self) -> Result<Snapshot<T>, SetError> {
        self.inner.snapshot()
    }
}

impl<T: Send + Sync> SetSource<T> for AdjustableTrackingSet<T> {
    fn identity(&self) -> &SetIdentity {
        self.inner.identity()
    }

    fn set_seq_num(&self) -> SetSeqNum {
        self.inner.set_seq_num()
    }

    fn snapshot(&self) -> Result<Snapshot<T>, SetError> {
        self.inner.snapshot()
    }
}
