use crate::SeqNum;

/// Where in the sequence a removed item was, at the moment of its removal
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RemovedPosition {
    First,
    Middle,
    Last,
}

impl RemovedPosition {
    /// Classifies a removal at `index` from a sequence of `count` items.
    /// The sole item of a one item sequence counts as the first.
    pub fn classify(index: usize, count: usize) -> Self {
        if index == 0 {
            RemovedPosition::First
        } else if index + 1 == count {
            RemovedPosition::Last
        } else {
            RemovedPosition::Middle
        }
    }
}

// RangeSummary
/// Cheap description of a set's contents: oldest and newest seq num, and item count.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct RangeSummary {
    pub first_seq_num: SeqNum,
    pub last_seq_num: SeqNum,
    pub count: usize,
}

impl RangeSummary {
    pub fn new(first_seq_num: SeqNum, last_seq_num: SeqNum, count: usize) -> Self {
        Self {
            first_seq_num,
            last_seq_num,
            count,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Whether both summaries describe the same contents. Empty summaries match
    /// regardless of the seq nums they remember.
    pub fn same_contents(&self, other: &RangeSummary) -> bool {
        if self.count != other.count {
            return false;
        }
        self.count == 0
            || (self.first_seq_num == other.first_seq_num
                && self.last_seq_num == other.last_seq_num)
    }

    pub(crate) fn on_appended(&mut self, seq_num: SeqNum) {
        if self.count == 0 {
            self.first_seq_num = seq_num;
        }
        self.last_seq_num = seq_num;
        self.count += 1;
    }

    pub(crate) fn on_removed(
        &mut self,
        position: RemovedPosition,
        new_front: Option<SeqNum>,
        new_back: Option<SeqNum>,
    ) {
        self.count = self.count.saturating_sub(1);
        match position {
            // an emptied set keeps remembering its newest seq num
            RemovedPosition::First => {
                self.first_seq_num = new_front.unwrap_or(self.last_seq_num);
            }
            RemovedPosition::Last => {
                self.last_seq_num = new_back.unwrap_or(self.first_seq_num);
            }
            RemovedPosition::Middle => {}
        }
    }
}
