use std::sync::{
    atomic::{AtomicU64, AtomicU8, Ordering},
    Arc, OnceLock,
};

use log::warn;

use crate::{
    tracking::tracking_state::TrackingState, ItemCodec, ItemObserver, ItemRecord, ItemStore,
    RangeSummary, SetDelta, SetError, SetIdentity, SetLock, SetSeqNum, SetVariant, Snapshot,
    TrackingConfig, UpdateState,
};

/// The locked state of a replica plus the counters mirrored outside of the lock.
/// Shared by both tracking set flavors.
pub(crate) struct Replica<T, L> {
    identity: SetIdentity,
    variant: SetVariant,
    state: L,
    set_seq_num: AtomicU64,
    update_state: AtomicU8,
    codec: Option<Arc<dyn ItemCodec<T>>>,
    codec_supported: OnceLock<bool>,
    block_budget: usize,
}

impl<T, L: SetLock<TrackingState<T>>> Replica<T, L> {
    pub fn new(
        identity: SetIdentity,
        variant: SetVariant,
        capacity: usize,
        config: TrackingConfig<T>,
    ) -> Self {
        let store = ItemStore::new(identity.clone(), variant, capacity);
        Self {
            identity,
            variant,
            state: L::new(TrackingState::new(store)),
            set_seq_num: AtomicU64::new(0),
            update_state: AtomicU8::new(UpdateState::Initial.to_u8()),
            codec: config.codec,
            codec_supported: OnceLock::new(),
            block_budget: config.block_budget,
        }
    }

    pub fn identity(&self) -> &SetIdentity {
        &self.identity
    }

    pub fn variant(&self) -> SetVariant {
        self.variant
    }

    pub fn block_budget(&self) -> usize {
        self.block_budget
    }

    pub fn set_seq_num(&self) -> SetSeqNum {
        self.set_seq_num.load(Ordering::Acquire)
    }

    pub fn update_state(&self) -> UpdateState {
        UpdateState::from_u8(self.update_state.load(Ordering::Acquire))
            .unwrap_or(UpdateState::Initial)
    }

    pub fn capacity(&self) -> Result<usize, SetError> {
        self.with_state(|state| state.store.capacity())
    }

    pub fn count(&self) -> Result<usize, SetError> {
        self.with_state(|state| state.store.count())
    }

    pub fn get(&self, index: usize) -> Result<ItemRecord<T>, SetError> {
        self.with_state(|state| state.store.get(index).cloned())?
    }

    pub fn to_vec(&self) -> Result<Vec<Arc<T>>, SetError> {
        self.with_state(|state| state.store.to_items())
    }

    pub fn range_summary(&self) -> Result<RangeSummary, SetError> {
        self.with_state(|state| state.store.range_summary())
    }

    pub fn snapshot(&self) -> Result<Snapshot<T>, SetError> {
        self.with_state(|state| Snapshot::from_store(&state.store, state.update_state))
    }

    pub fn add_observer(
        &self,
        observer: impl ItemObserver<T> + Send + 'static,
    ) -> Result<(), SetError> {
        if !L::ALLOWS_OBSERVERS {
            return Err(SetError::NotificationsRequireUnlocked {
                name: self.identity.name().to_string(),
            });
        }
        self.with_state(|state| state.store.add_observer(Box::new(observer)))
    }

    pub fn apply_delta(&self, delta: &SetDelta<T>) -> Result<bool, SetError> {
        if delta.identity != self.identity {
            warn!(
                "TrackingSet: rejecting delta for {} on set {}",
                delta.identity, self.identity
            );
            return Err(SetError::IdentityMismatch {
                expected: self.identity.to_string(),
                actual: delta.identity.to_string(),
            });
        }
        delta.validate_seq_nums()?;
        let missing_items = delta
            .add_ranges
            .iter()
            .any(|range| range.items.is_none() && range.serialized_items.is_none());
        if missing_items {
            return Err(SetError::DeltaMissingItems {
                name: self.identity.name().to_string(),
            });
        }

        let resolved;
        let delta = if delta.has_items() {
            delta
        } else {
            let codec = self.serialization_codec()?;
            let mut owned = delta.clone();
            owned.deserialize_items(codec)?;
            resolved = owned;
            &resolved
        };

        self.with_state(|state| -> Result<bool, SetError> {
            let changed = state.apply(delta)?;
            self.publish(state);
            Ok(changed)
        })?
    }

    pub fn with_state<R>(&self, f: impl FnOnce(&mut TrackingState<T>) -> R) -> Result<R, SetError> {
        self.state
            .with(f)
            .map_err(|error| error.into_set_error(self.identity.name()))
    }

    /// Mirrors the counters that are read without the lock.
    pub fn publish(&self, state: &TrackingState<T>) {
        self.set_seq_num
            .store(state.store.set_seq_num(), Ordering::Release);
        self.update_state
            .store(state.update_state.to_u8(), Ordering::Release);
    }

    /// The configured codec, if it supports the item type. Support is asked once.
    pub fn serialization_codec(&self) -> Result<&dyn ItemCodec<T>, SetError> {
        let unsupported = || SetError::SerializationUnsupported {
            name: self.identity.name().to_string(),
            type_name: std::any::type_name::<T>(),
        };
        let codec = self.codec.as_deref().ok_or_else(unsupported)?;
        if *self.codec_supported.get_or_init(|| codec.is_supported()) {
            Ok(codec)
        } else {
            Err(unsupported())
        }
    }
}
