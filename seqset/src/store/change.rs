use crate::{store::range_summary::RemovedPosition, ItemRecord, SeqNum};

/// A single structural change produced by a mutating call
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ItemChange {
    Added {
        index: usize,
        seq_num: SeqNum,
    },
    Removed {
        index: usize,
        seq_num: SeqNum,
        position: RemovedPosition,
    },
}

impl ItemChange {
    pub fn seq_num(&self) -> SeqNum {
        match self {
            ItemChange::Added { seq_num, .. } | ItemChange::Removed { seq_num, .. } => *seq_num,
        }
    }

    pub fn index(&self) -> usize {
        match self {
            ItemChange::Added { index, .. } | ItemChange::Removed { index, .. } => *index,
        }
    }
}

/// Receives change notifications from a set built without a lock.
///
/// Notifications are delivered synchronously, inline with the mutating call that
/// caused them: one call per affected item in the order the changes happened,
/// followed by a single `on_contents_changed`.
pub trait ItemObserver<T> {
    fn on_item_added(&mut self, _index: usize, _record: &ItemRecord<T>) {}
    fn on_item_removed(
        &mut self,
        _index: usize,
        _position: RemovedPosition,
        _record: &ItemRecord<T>,
    ) {
    }
    fn on_contents_changed(&mut self);
}

pub(crate) enum ChangeEvent<T> {
    Added(usize, ItemRecord<T>),
    Removed(usize, RemovedPosition, ItemRecord<T>),
}

impl<T> ChangeEvent<T> {
    pub(crate) fn to_change(&self) -> ItemChange {
        match self {
            ChangeEvent::Added(index, record) => ItemChange::Added {
                index: *index,
                seq_num: record.seq_num(),
            },
            ChangeEvent::Removed(index, position, record) => ItemChange::Removed {
                index: *index,
                seq_num: record.seq_num(),
                position: *position,
            },
        }
    }
}

// ObserverList
pub struct ObserverList<T> {
    observers: Vec<Box<dyn ItemObserver<T> + Send>>,
}

impl<T> ObserverList<T> {
    pub fn new() -> Self {
        Self {
            observers: Vec::new(),
        }
    }

    pub fn push(&mut self, observer: Box<dyn ItemObserver<T> + Send>) {
        self.observers.push(observer);
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub(crate) fn deliver(&mut self, events: &[ChangeEvent<T>]) {
        if events.is_empty() {
            return;
        }
        for observer in self.observers.iter_mut() {
            for event in events {
                match event {
                    ChangeEvent::Added(index, record) => observer.on_item_added(*index, record),
                    ChangeEvent::Removed(index, position, record) => {
                        observer.on_item_removed(*index, *position, record)
                    }
                }
            }
            observer.on_contents_changed();
        }
    }
}

impl<T> Default for ObserverList<T> {
    fn default() -> Self {
        Self::new()
    }
}
