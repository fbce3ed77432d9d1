//! Planning how a tracking store catches up with a snapshot of its source.
//!
//! Both sides are strictly increasing in seq num, and a tracker only ever holds items
//! its source once held. Within the window they share, the tracker therefore holds
//! every item the snapshot holds plus, possibly, items the source has since removed.
//! The first index at which the two diverge is found by binary search, the tracker's
//! run of removed items starting there becomes one remove block, and the search repeats
//! from the same index. Once nothing is left to remove, the tracker is a prefix of the
//! snapshot and the rest of the snapshot is appended in runs of consecutive seq nums.

use log::{debug, trace};

use crate::{ItemRecord, ItemStore, RemoveRange, SeqNum, SetError, Snapshot};

/// A run of snapshot records to append, `snapshot[start..start + len]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct AddRun {
    pub start: usize,
    pub len: usize,
    pub start_seq_num: SeqNum,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct SyncPlan {
    pub clear_at_start: bool,
    pub removals: Vec<RemoveRange>,
    pub additions: Vec<AddRun>,
    pub work_remaining: bool,
}

// Tracker records as they will be after the removals planned so far. Blocks are planned
// front to back, so only indices at or after the latest block are ever read.
struct TrackerView<'a, T> {
    store: &'a ItemStore<T>,
    // number of tracker records already planned for removal
    shift: usize,
}

impl<'a, T> TrackerView<'a, T> {
    fn len(&self) -> usize {
        self.store.count() - self.shift
    }

    fn seq_num(&self, index: usize) -> SeqNum {
        self.store
            .get(index + self.shift)
            .map(ItemRecord::seq_num)
            .unwrap_or(SeqNum::MAX)
    }

    // first virtual index in `from..len` whose seq num is >= `seq_num`
    fn lower_bound(&self, from: usize, seq_num: SeqNum) -> usize {
        let (mut low, mut high) = (from, self.len());
        while low < high {
            let middle = low + (high - low) / 2;
            if self.seq_num(middle) < seq_num {
                low = middle + 1;
            } else {
                high = middle;
            }
        }
        low
    }
}

/// Whether the tracker must be emptied before it can follow `target`.
fn needs_clear<T>(store: &ItemStore<T>, target: &[ItemRecord<T>]) -> bool {
    let (Some(target_first), Some(target_last)) = (target.first(), target.last()) else {
        return false;
    };
    let Some(tracker_first) = store.records().next() else {
        return true;
    };
    // the source replaced everything since the last sync, or holds items the tracker never saw
    tracker_first.seq_num() > target_last.seq_num()
        || target_first.seq_num() < tracker_first.seq_num()
}

/// Plans at most `block_budget` blocks (0 is unlimited) of work bringing `store` in line
/// with `snapshot`. Does not mutate anything.
pub(crate) fn plan_sync<T>(
    store: &ItemStore<T>,
    snapshot: &Snapshot<T>,
    block_budget: usize,
) -> SyncPlan {
    let target = snapshot.records();
    let mut plan = SyncPlan::default();
    let within_budget = |plan: &SyncPlan| {
        block_budget == 0 || plan.removals.len() + plan.additions.len() < block_budget
    };

    let mut view = TrackerView { store, shift: 0 };

    if needs_clear(store, target) {
        debug!(
            "TrackingSet: set {:?} clears at start, {} tracked vs {} in snapshot",
            store.name(),
            store.count(),
            target.len()
        );
        plan.clear_at_start = true;
        view.shift = store.count();
    }

    // Removal phase
    let mut from = 0;
    loop {
        let shared = view.len().min(target.len());
        let (mut low, mut high) = (from, shared);
        while low < high {
            let middle = low + (high - low) / 2;
            if view.seq_num(middle) == target[middle].seq_num() {
                low = middle + 1;
            } else {
                high = middle;
            }
        }
        let divergence = low;
        if divergence >= view.len() {
            break;
        }

        let end = match target.get(divergence) {
            None => view.len(),
            Some(record) if record.seq_num() > view.seq_num(divergence) => {
                let end = view.lower_bound(divergence, record.seq_num());
                if end < view.len() && view.seq_num(end) != record.seq_num() {
                    // the snapshot holds an item the tracker lacks, start over
                    return restart_plan(store, target, block_budget);
                }
                end
            }
            Some(_) => return restart_plan(store, target, block_budget),
        };

        if !within_budget(&plan) {
            plan.work_remaining = true;
            return plan;
        }

        let count = end - divergence;
        trace!(
            "TrackingSet: remove block at index {} of {} item(s) from set {:?}",
            divergence,
            count,
            store.name()
        );
        plan.removals.push(RemoveRange {
            start_seq_num: view.seq_num(divergence),
            last_seq_num: view.seq_num(end - 1),
            start_index: divergence,
            count,
        });
        view.shift += count;
        from = divergence;
    }

    // Addition phase, the tracker is now a prefix of the snapshot
    let mut start = view.len();
    while start < target.len() {
        if !within_budget(&plan) {
            plan.work_remaining = true;
            return plan;
        }
        let mut len = 1;
        while start + len < target.len()
            && target[start + len].seq_num() == target[start + len - 1].seq_num() + 1
        {
            len += 1;
        }
        trace!(
            "TrackingSet: add block at index {} of {} item(s) to set {:?}",
            start,
            len,
            store.name()
        );
        plan.additions.push(AddRun {
            start,
            len,
            start_seq_num: target[start].seq_num(),
        });
        start += len;
    }

    plan
}

fn restart_plan<T>(store: &ItemStore<T>, target: &[ItemRecord<T>], block_budget: usize) -> SyncPlan {
    debug!(
        "TrackingSet: set {:?} diverged from its source, clearing and starting over",
        store.name()
    );
    let mut plan = SyncPlan {
        clear_at_start: true,
        ..SyncPlan::default()
    };
    let mut start = 0;
    while start < target.len() {
        if block_budget != 0 && plan.additions.len() >= block_budget {
            plan.work_remaining = true;
            break;
        }
        let mut len = 1;
        while start + len < target.len()
            && target[start + len].seq_num() == target[start + len - 1].seq_num() + 1
        {
            len += 1;
        }
        plan.additions.push(AddRun {
            start,
            len,
            start_seq_num: target[start].seq_num(),
        });
        start += len;
    }
    plan
}

/// Applies a plan made by [`plan_sync`] against the same store and snapshot.
pub(crate) fn apply_plan<T>(
    store: &mut ItemStore<T>,
    snapshot: &Snapshot<T>,
    plan: &SyncPlan,
) -> Result<(), SetError> {
    if plan.clear_at_start {
        store.clear();
        store.reset_last_seq_num();
    }
    for removal in &plan.removals {
        store.remove_range(removal.start_index, removal.start_index + removal.count);
    }
    let target = snapshot.records();
    for run in &plan.additions {
        for record in &target[run.start..run.start + run.len] {
            store.append_record(record.clone())?;
        }
    }
    Ok(())
}
