use std::sync::Arc;

use crate::{ItemCodec, SeqNum, SetError, SetIdentity, UpdateState};

use super::wire_delta::{WireAddRange, WireDelta};

// RemoveRange
/// A contiguous block of items removed by the producer of a delta.
///
/// Consumers remove by seq num, every local item with
/// `start_seq_num <= seq_num <= last_seq_num`, since their local positions may have
/// drifted from the producer's.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RemoveRange {
    pub start_seq_num: SeqNum,
    pub last_seq_num: SeqNum,
    /// Index of the first removed item at the time it was removed
    pub start_index: usize,
    pub count: usize,
}

// AddRange
/// A run of appended items with consecutive seq nums: item `i` carries
/// `start_seq_num + i`.
#[derive(Debug, PartialEq)]
pub struct AddRange<T> {
    pub start_seq_num: SeqNum,
    pub start_index: usize,
    pub items: Option<Vec<Arc<T>>>,
    pub serialized_items: Option<Vec<String>>,
}

impl<T> AddRange<T> {
    pub fn with_items(start_seq_num: SeqNum, start_index: usize, items: Vec<Arc<T>>) -> Self {
        Self {
            start_seq_num,
            start_index,
            items: Some(items),
            serialized_items: None,
        }
    }

    pub fn with_serialized_items(
        start_seq_num: SeqNum,
        start_index: usize,
        serialized_items: Vec<String>,
    ) -> Self {
        Self {
            start_seq_num,
            start_index,
            items: None,
            serialized_items: Some(serialized_items),
        }
    }

    pub fn len(&self) -> usize {
        match (&self.items, &self.serialized_items) {
            (Some(items), _) => items.len(),
            (None, Some(serialized_items)) => serialized_items.len(),
            (None, None) => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Seq num of the last item in the run.
    pub fn last_seq_num(&self) -> SeqNum {
        self.start_seq_num
            .saturating_add((self.len() as u64).saturating_sub(1))
    }
}

impl<T> Clone for AddRange<T> {
    fn clone(&self) -> Self {
        Self {
            start_seq_num: self.start_seq_num,
            start_index: self.start_index,
            items: self.items.clone(),
            serialized_items: self.serialized_items.clone(),
        }
    }
}

// SetDelta
/// Compact description of the removals and additions that advance one state of a set
/// to another.
#[derive(Debug, PartialEq)]
pub struct SetDelta<T> {
    pub identity: SetIdentity,
    pub source_update_state: UpdateState,
    pub clear_at_start: bool,
    pub remove_ranges: Vec<RemoveRange>,
    pub add_ranges: Vec<AddRange<T>>,
}

impl<T> SetDelta<T> {
    pub fn new(identity: SetIdentity, source_update_state: UpdateState) -> Self {
        Self {
            identity,
            source_update_state,
            clear_at_start: false,
            remove_ranges: Vec::new(),
            add_ranges: Vec::new(),
        }
    }

    /// Whether every add range carries its items.
    pub fn has_items(&self) -> bool {
        self.add_ranges.iter().all(|range| range.items.is_some())
    }

    /// Whether every add range carries the serialized form of its items.
    pub fn has_serialized_items(&self) -> bool {
        self.add_ranges
            .iter()
            .all(|range| range.serialized_items.is_some())
    }

    /// True when applying the delta changes nothing.
    pub fn is_empty(&self) -> bool {
        !self.clear_at_start && self.remove_ranges.is_empty() && self.add_ranges.is_empty()
    }

    pub fn added_count(&self) -> usize {
        self.add_ranges.iter().map(AddRange::len).sum()
    }

    pub fn removed_count(&self) -> usize {
        self.remove_ranges.iter().map(|range| range.count).sum()
    }

    /// Fails unless every add range fits below the largest seq num.
    pub fn validate_seq_nums(&self) -> Result<(), SetError> {
        for range in &self.add_ranges {
            let span = (range.len() as u64).saturating_sub(1);
            if range.start_seq_num.checked_add(span).is_none() {
                return Err(SetError::InvalidDelta {
                    name: self.identity.name().to_string(),
                    start_seq_num: range.start_seq_num,
                    count: range.len(),
                });
            }
        }
        Ok(())
    }

    /// Fills in the serialized form of every add range that lacks it.
    pub fn serialize_items(&mut self, codec: &dyn ItemCodec<T>) -> Result<(), SetError> {
        if !codec.is_supported() {
            return Err(self.unsupported());
        }
        self.serialize_with(codec)
    }

    // callers have already checked `codec.is_supported()`
    pub(crate) fn serialize_with(&mut self, codec: &dyn ItemCodec<T>) -> Result<(), SetError> {
        for index in 0..self.add_ranges.len() {
            let range = &self.add_ranges[index];
            if range.serialized_items.is_some() {
                continue;
            }
            let Some(items) = &range.items else {
                return Err(SetError::DeltaMissingItems {
                    name: self.identity.name().to_string(),
                });
            };
            let mut serialized_items = Vec::with_capacity(items.len());
            for item in items {
                let text = codec.item_to_text(item).map_err(|_| self.unsupported())?;
                serialized_items.push(text);
            }
            self.add_ranges[index].serialized_items = Some(serialized_items);
        }
        Ok(())
    }

    fn unsupported(&self) -> SetError {
        SetError::SerializationUnsupported {
            name: self.identity.name().to_string(),
            type_name: std::any::type_name::<T>(),
        }
    }

    /// Fills in the items of every add range that only carries serialized items.
    pub fn deserialize_items(&mut self, codec: &dyn ItemCodec<T>) -> Result<(), SetError> {
        for range in self.add_ranges.iter_mut() {
            if range.items.is_some() {
                continue;
            }
            let Some(serialized_items) = &range.serialized_items else {
                return Err(SetError::DeltaMissingItems {
                    name: self.identity.name().to_string(),
                });
            };
            let mut items = Vec::with_capacity(serialized_items.len());
            for (offset, text) in serialized_items.iter().enumerate() {
                let item = codec.text_to_item(text).map_err(|error| SetError::Deserialization {
                    name: self.identity.name().to_string(),
                    seq_num: range.start_seq_num.saturating_add(offset as u64),
                    message: error.message,
                })?;
                items.push(Arc::new(item));
            }
            range.items = Some(items);
        }
        Ok(())
    }

    /// Drops item references, keeping only the serialized form.
    pub fn strip_items(&mut self) {
        for range in self.add_ranges.iter_mut() {
            range.items = None;
        }
    }

    /// Converts into the transport form, serializing items through `codec` where needed.
    pub fn to_wire(&self, codec: Option<&dyn ItemCodec<T>>) -> Result<WireDelta, SetError> {
        let mut add_ranges = Vec::with_capacity(self.add_ranges.len());
        for range in &self.add_ranges {
            let serialized_items = match (&range.serialized_items, &range.items, codec) {
                (Some(serialized_items), _, _) => serialized_items.clone(),
                (None, Some(items), Some(codec)) if codec.is_supported() => {
                    let mut serialized_items = Vec::with_capacity(items.len());
                    for item in items {
                        serialized_items
                            .push(codec.item_to_text(item).map_err(|_| self.unsupported())?);
                    }
                    serialized_items
                }
                (None, Some(_), _) => return Err(self.unsupported()),
                (None, None, _) => {
                    return Err(SetError::DeltaMissingItems {
                        name: self.identity.name().to_string(),
                    });
                }
            };
            add_ranges.push(WireAddRange {
                start_seq_num: range.start_seq_num,
                start_index: range.start_index,
                serialized_items,
            });
        }

        Ok(WireDelta {
            name: self.identity.name().to_string(),
            uuid: self.identity.uuid().to_string(),
            source_update_state: self.source_update_state,
            clear_at_start: self.clear_at_start,
            remove_ranges: self.remove_ranges.clone(),
            add_ranges,
        })
    }
}

impl<T> Clone for SetDelta<T> {
    fn clone(&self) -> Self {
        Self {
            identity: self.identity.clone(),
            source_update_state: self.source_update_state,
            clear_at_start: self.clear_at_start,
            remove_ranges: self.remove_ranges.clone(),
            add_ranges: self.add_ranges.clone(),
        }
    }
}
