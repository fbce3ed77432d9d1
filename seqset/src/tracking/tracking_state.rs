use std::sync::Arc;

use log::debug;

use crate::{ItemRecord, ItemStore, SetDelta, SetError, Snapshot, UpdateState};

/// Accept/reject predicate run on every item a delta would add.
///
/// Evaluated while the set's lock is held, so it must be fast and must not block.
pub type ItemFilter<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

/// Everything a tracking set guards with its lock.
pub struct TrackingState<T> {
    pub(crate) store: ItemStore<T>,
    // most recent snapshot of the source, the target of the diff
    pub(crate) baseline: Option<Snapshot<T>>,
    pub(crate) work_remaining: bool,
    pub(crate) update_state: UpdateState,
    pub(crate) filter: Option<ItemFilter<T>>,
    pub(crate) removal_enabled: bool,
}

impl<T> TrackingState<T> {
    pub(crate) fn new(store: ItemStore<T>) -> Self {
        Self {
            store,
            baseline: None,
            work_remaining: false,
            update_state: UpdateState::Initial,
            filter: None,
            removal_enabled: true,
        }
    }

    /// Keeps `snapshot` as the diff target unless a newer one is already held.
    pub(crate) fn offer_baseline(&mut self, snapshot: Snapshot<T>) {
        if let Some(baseline) = &self.baseline {
            if baseline.set_seq_num() > snapshot.set_seq_num() {
                debug!(
                    "TrackingSet: discarding stale snapshot {} of set {:?}, already at {}",
                    snapshot.set_seq_num(),
                    self.store.name(),
                    baseline.set_seq_num()
                );
                return;
            }
        }
        debug!(
            "TrackingSet: set {:?} now follows snapshot {} with {} item(s)",
            self.store.name(),
            snapshot.set_seq_num(),
            snapshot.count()
        );
        self.baseline = Some(snapshot);
    }

    /// State after an iteration against a source reporting `source_state`.
    pub(crate) fn iteration_state(&self, source_state: UpdateState) -> UpdateState {
        if source_state.dominates() {
            return source_state;
        }
        let caught_up = self.baseline.as_ref().map_or(true, |baseline| {
            self.store
                .range_summary()
                .same_contents(&baseline.range_summary())
        });
        if self.work_remaining || !caught_up {
            return UpdateState::InProgress;
        }
        match source_state {
            UpdateState::Initial => UpdateState::Initial,
            UpdateState::Empty if self.store.is_empty() => UpdateState::Empty,
            _ => UpdateState::Complete,
        }
    }

    /// Applies a delta whose add ranges all carry items. One commit covers the whole delta.
    pub(crate) fn apply(&mut self, delta: &SetDelta<T>) -> Result<bool, SetError> {
        self.store.ensure_changeable("apply_delta")?;
        delta.validate_seq_nums()?;

        if delta.clear_at_start {
            if self.removal_enabled {
                self.store.clear();
            }
            self.store.reset_last_seq_num();
        }

        if self.removal_enabled {
            for range in &delta.remove_ranges {
                self.store
                    .remove_seq_range(range.start_seq_num, range.last_seq_num);
            }
        }

        let mut rejected = 0;
        for range in &delta.add_ranges {
            let items = range.items.as_deref().unwrap_or(&[]);
            for (offset, item) in items.iter().enumerate() {
                // in range, checked by validate_seq_nums
                let seq_num = range.start_seq_num + offset as u64;
                // already seen, re-applied deltas land here
                if seq_num <= self.store.last_seq_num() {
                    continue;
                }
                let accepted = self.filter.as_ref().map_or(true, |filter| filter(item));
                if accepted {
                    self.store
                        .append_record(ItemRecord::new(seq_num, item.clone()))?;
                } else {
                    self.store.skip_seq_num(seq_num);
                    rejected += 1;
                }
            }
        }

        let changed = self.store.commit();
        self.update_state = delta.source_update_state;
        debug!(
            "TrackingSet: applied delta to set {:?}, {} removed, {} added, {} rejected, now {} item(s)",
            self.store.name(),
            delta.removed_count(),
            delta.added_count() - rejected,
            rejected,
            self.store.count()
        );
        Ok(changed)
    }
}
