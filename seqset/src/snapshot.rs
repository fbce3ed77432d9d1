use std::sync::Arc;

use crate::{
    ItemRecord, ItemStore, RangeSummary, SetError, SetIdentity, SetSeqNum, UpdateState,
};

/// Anything a tracking set can follow.
///
/// `set_seq_num` must be cheap and must not take the source's lock, trackers poll it
/// to decide whether a new snapshot is needed. `snapshot` may hold the source's lock,
/// but only for as long as it takes to copy record references.
pub trait SetSource<T>: Send + Sync {
    fn identity(&self) -> &SetIdentity;
    fn set_seq_num(&self) -> SetSeqNum;
    fn snapshot(&self) -> Result<Snapshot<T>, SetError>;
}

// Snapshot
/// Immutable point in time copy of a set, used as a diff baseline.
pub struct Snapshot<T> {
    identity: SetIdentity,
    set_seq_num: SetSeqNum,
    capacity: usize,
    summary: RangeSummary,
    update_state: UpdateState,
    records: Arc<[ItemRecord<T>]>,
}

impl<T> Snapshot<T> {
    pub(crate) fn from_store(store: &ItemStore<T>, update_state: UpdateState) -> Self {
        Self {
            identity: store.identity().clone(),
            set_seq_num: store.set_seq_num(),
            capacity: store.capacity(),
            summary: store.range_summary(),
            update_state,
            records: store.records().cloned().collect(),
        }
    }

    pub fn identity(&self) -> &SetIdentity {
        &self.identity
    }

    pub fn set_seq_num(&self) -> SetSeqNum {
        self.set_seq_num
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn range_summary(&self) -> RangeSummary {
        self.summary
    }

    pub fn update_state(&self) -> UpdateState {
        self.update_state
    }

    pub fn count(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[ItemRecord<T>] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Result<&ItemRecord<T>, SetError> {
        self.records.get(index).ok_or(SetError::IndexOutOfRange {
            index,
            count: self.records.len(),
        })
    }

    pub fn items(&self) -> impl Iterator<Item = &Arc<T>> {
        self.records.iter().map(ItemRecord::item)
    }

    pub fn to_items(&self) -> Vec<Arc<T>> {
        self.items().cloned().collect()
    }
}

impl<T> Clone for Snapshot<T> {
    fn clone(&self) -> Self {
        Self {
            identity: self.identity.clone(),
            set_seq_num: self.set_seq_num,
            capacity: self.capacity,
            summary: self.summary,
            update_state: self.update_state,
            records: self.records.clone(),
        }
    }
}

impl<T: Send + Sync> SetSource<T> for Snapshot<T> {
    fn identity(&self) -> &SetIdentity {
        &self.identity
    }

    fn set_seq_num(&self) -> SetSeqNum {
        self.set_seq_num
    }

    fn snapshot(&self) -> Result<Snapshot<T>, SetError> {
        Ok(self.clone())
    }
}
