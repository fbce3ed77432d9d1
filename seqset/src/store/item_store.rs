use std::{collections::VecDeque, sync::Arc};

use log::{debug, trace};

use crate::{
    store::{
        change::{ChangeEvent, ItemChange, ItemObserver, ObserverList},
        range_summary::{RangeSummary, RemovedPosition},
    },
    Changeability, ItemRecord, SeqNum, SetError, SetIdentity, SetSeqNum, SetVariant,
};

/// The ordered, capacity bounded item engine shared by every set variant.
///
/// Mutating methods only stage changes. Callers finish each public operation with
/// [`ItemStore::commit`], which bumps the set seq num once and delivers the staged
/// notifications, so a batch of removals and additions is seen as one change.
pub struct ItemStore<T> {
    identity: SetIdentity,
    variant: SetVariant,
    capacity: usize,
    records: VecDeque<ItemRecord<T>>,
    // highest seq num ever assigned or accepted, may exceed the tail's seq num
    last_seq_num: SeqNum,
    set_seq_num: SetSeqNum,
    summary: RangeSummary,
    changeability: Changeability,
    ever_had_items: bool,
    dirty: bool,
    observers: ObserverList<T>,
    staged: Vec<ChangeEvent<T>>,
    changes: Vec<ItemChange>,
    last_changes: Vec<ItemChange>,
}

impl<T> ItemStore<T> {
    /// Creates an empty store. A `capacity` of 0 means the store is unbounded.
    pub fn new(identity: SetIdentity, variant: SetVariant, capacity: usize) -> Self {
        Self {
            identity,
            variant,
            capacity,
            records: VecDeque::new(),
            last_seq_num: 0,
            set_seq_num: 0,
            summary: RangeSummary::default(),
            changeability: Changeability::Changeable,
            ever_had_items: false,
            dirty: false,
            observers: ObserverList::new(),
            staged: Vec::new(),
            changes: Vec::new(),
            last_changes: Vec::new(),
        }
    }

    // Accessors

    pub fn identity(&self) -> &SetIdentity {
        &self.identity
    }

    pub fn name(&self) -> &str {
        self.identity.name()
    }

    pub fn variant(&self) -> SetVariant {
        self.variant
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn count(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn range_summary(&self) -> RangeSummary {
        self.summary
    }

    pub fn set_seq_num(&self) -> SetSeqNum {
        self.set_seq_num
    }

    pub fn last_seq_num(&self) -> SeqNum {
        self.last_seq_num
    }

    pub fn changeability(&self) -> Changeability {
        self.changeability
    }

    pub fn is_fixed(&self) -> bool {
        self.changeability == Changeability::Fixed
    }

    pub fn ever_had_items(&self) -> bool {
        self.ever_had_items
    }

    pub fn get(&self, index: usize) -> Result<&ItemRecord<T>, SetError> {
        self.records.get(index).ok_or(SetError::IndexOutOfRange {
            index,
            count: self.records.len(),
        })
    }

    pub fn records(&self) -> impl Iterator<Item = &ItemRecord<T>> {
        self.records.iter()
    }

    pub fn to_records(&self) -> Vec<ItemRecord<T>> {
        self.records.iter().cloned().collect()
    }

    pub fn to_items(&self) -> Vec<Arc<T>> {
        self.records.iter().map(|record| record.item().clone()).collect()
    }

    /// Index of the record carrying `seq_num`, or the index it would occupy.
    pub fn search_seq_num(&self, seq_num: SeqNum) -> Result<usize, usize> {
        self.records
            .binary_search_by(|record| record.seq_num().cmp(&seq_num))
    }

    /// Structural changes made by the most recently committed operation.
    pub fn last_changes(&self) -> &[ItemChange] {
        &self.last_changes
    }

    // Observers

    pub fn add_observer(&mut self, observer: Box<dyn ItemObserver<T> + Send>) {
        self.observers.push(observer);
    }

    // Mutation

    pub fn ensure_changeable(&self, operation: &'static str) -> Result<(), SetError> {
        if self.is_fixed() {
            return Err(SetError::SetIsFixed {
                name: self.name().to_string(),
                operation,
            });
        }
        Ok(())
    }

    /// Marks the store Fixed. Returns false if it already was.
    pub fn set_fixed(&mut self) -> bool {
        if self.is_fixed() {
            return false;
        }
        self.changeability = Changeability::Fixed;
        self.dirty = true;
        true
    }

    /// Appends an item under the next seq num, evicting the oldest items if the
    /// store would exceed its capacity.
    pub fn append(&mut self, item: Arc<T>) -> SeqNum {
        self.last_seq_num += 1;
        let seq_num = self.last_seq_num;
        self.push_record(ItemRecord::new(seq_num, item));
        seq_num
    }

    /// Appends a record that already carries a seq num, as tracking stores do.
    pub fn append_record(&mut self, record: ItemRecord<T>) -> Result<(), SetError> {
        if record.seq_num() <= self.last_seq_num {
            return Err(SetError::SeqNumNotIncreasing {
                name: self.name().to_string(),
                seq_num: record.seq_num(),
                last_seq_num: self.last_seq_num,
            });
        }
        self.last_seq_num = record.seq_num();
        self.push_record(record);
        Ok(())
    }

    /// Consumes `seq_num` without storing an item for it.
    pub fn skip_seq_num(&mut self, seq_num: SeqNum) {
        if seq_num > self.last_seq_num {
            self.last_seq_num = seq_num;
        }
    }

    fn push_record(&mut self, record: ItemRecord<T>) {
        self.summary.on_appended(record.seq_num());
        self.ever_had_items = true;
        self.dirty = true;
        let index = self.records.len();
        self.stage(ChangeEvent::Added(index, record.clone()));
        self.records.push_back(record);
        self.evict_over_capacity();
    }

    fn evict_over_capacity(&mut self) {
        if self.capacity == 0 || self.records.len() <= self.capacity {
            return;
        }
        let excess = self.records.len() - self.capacity;
        debug!(
            "ItemStore: evicting {} oldest item(s) from set {:?} with capacity {}",
            excess,
            self.name(),
            self.capacity
        );
        self.remove_range(0, excess);
    }

    /// Removes the records at indices `start..end`, preserving the order of survivors.
    pub fn remove_range(&mut self, start: usize, end: usize) -> Vec<ItemRecord<T>> {
        let count_before = self.records.len();
        let end = end.min(count_before);
        if start >= end {
            return Vec::new();
        }
        trace!(
            "ItemStore: removing indices {}..{} from set {:?}",
            start,
            end,
            self.name()
        );

        // every record in the range is removed at `start`, one after another
        for original_index in start..end {
            let remaining = count_before - (original_index - start);
            let position = RemovedPosition::classify(start, remaining);
            let new_front = if start > 0 {
                self.records.front().map(ItemRecord::seq_num)
            } else {
                self.records.get(original_index + 1).map(ItemRecord::seq_num)
            };
            let new_back = if original_index + 1 < count_before {
                self.records.back().map(ItemRecord::seq_num)
            } else if start > 0 {
                self.records.get(start - 1).map(ItemRecord::seq_num)
            } else {
                None
            };
            self.summary.on_removed(position, new_front, new_back);
            let record = self.records[original_index].clone();
            self.stage(ChangeEvent::Removed(start, position, record));
        }

        self.dirty = true;
        self.records.drain(start..end).collect()
    }

    pub fn remove_at(&mut self, index: usize) -> Result<ItemRecord<T>, SetError> {
        if index >= self.records.len() {
            return Err(SetError::IndexOutOfRange {
                index,
                count: self.records.len(),
            });
        }
        let mut removed = self.remove_range(index, index + 1);
        removed.pop().ok_or(SetError::IndexOutOfRange {
            index,
            count: self.records.len(),
        })
    }

    pub fn remove_first_where(
        &mut self,
        mut predicate: impl FnMut(&T) -> bool,
    ) -> Option<ItemRecord<T>> {
        let index = self
            .records
            .iter()
            .position(|record| predicate(record.item()))?;
        self.remove_range(index, index + 1).pop()
    }

    /// Removes every record whose item matches, coalescing adjacent matches into
    /// contiguous ranges. Returns the number of removed records.
    pub fn remove_all_where(&mut self, mut predicate: impl FnMut(&T) -> bool) -> usize {
        let matches: Vec<bool> = self
            .records
            .iter()
            .map(|record| predicate(record.item()))
            .collect();

        let mut removed = 0;
        let mut index = 0;
        let mut original = 0;
        while original < matches.len() {
            if !matches[original] {
                index += 1;
                original += 1;
                continue;
            }
            let run_start = original;
            while original < matches.len() && matches[original] {
                original += 1;
            }
            let run_length = original - run_start;
            self.remove_range(index, index + run_length);
            removed += run_length;
        }
        removed
    }

    /// Removes every record with `first <= seq_num <= last`.
    pub fn remove_seq_range(&mut self, first: SeqNum, last: SeqNum) -> usize {
        if first > last {
            return 0;
        }
        let start = self.records.partition_point(|record| record.seq_num() < first);
        let end = self.records.partition_point(|record| record.seq_num() <= last);
        self.remove_range(start, end).len()
    }

    pub fn clear(&mut self) -> usize {
        let count = self.records.len();
        self.remove_range(0, count);
        count
    }

    /// Forgets every seq num seen so far. Only tracking stores rewind, when their
    /// source has replaced everything they knew about.
    pub fn reset_last_seq_num(&mut self) {
        self.last_seq_num = self.records.back().map(ItemRecord::seq_num).unwrap_or(0);
    }

    /// Finishes the current operation: bumps the set seq num once if anything changed
    /// and delivers staged notifications. Returns whether anything changed.
    pub fn commit(&mut self) -> bool {
        if !self.dirty {
            return false;
        }
        self.dirty = false;
        self.set_seq_num += 1;
        self.last_changes = std::mem::take(&mut self.changes);
        let staged = std::mem::take(&mut self.staged);
        self.observers.deliver(&staged);
        true
    }

    fn stage(&mut self, event: ChangeEvent<T>) {
        self.changes.push(event.to_change());
        if !self.observers.is_empty() {
            self.staged.push(event);
        }
    }
}
