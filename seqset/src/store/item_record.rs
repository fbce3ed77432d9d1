use std::{fmt, sync::Arc};

use crate::SeqNum;

// ItemRecord
/// An immutable item together with the sequence number it was appended under.
pub struct ItemRecord<T> {
    seq_num: SeqNum,
    item: Arc<T>,
}

impl<T> ItemRecord<T> {
    pub fn new(seq_num: SeqNum, item: Arc<T>) -> Self {
        Self { seq_num, item }
    }

    pub fn seq_num(&self) -> SeqNum {
        self.seq_num
    }

    pub fn item(&self) -> &Arc<T> {
        &self.item
    }

    pub fn into_item(self) -> Arc<T> {
        self.item
    }
}

// copying a record only copies the reference to its item
impl<T> Clone for ItemRecord<T> {
    fn clone(&self) -> Self {
        Self {
            seq_num: self.seq_num,
            item: self.item.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for ItemRecord<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ItemRecord")
            .field("seq_num", &self.seq_num)
            .field("item", &self.item)
            .finish()
    }
}

impl<T: PartialEq> PartialEq for ItemRecord<T> {
    fn eq(&self, other: &Self) -> bool {
        self.seq_num == other.seq_num && self.item == other.item
    }
}
