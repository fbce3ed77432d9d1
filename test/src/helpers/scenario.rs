use std::sync::Arc;

use log::trace;
use seqset::{ItemCodec, ReferenceSet, SetDelta, SetError, SetIdentity, WireDelta};

/// A reference set named `name` holding `items`, added in one call
pub fn reference_with<T>(name: &str, capacity: usize, items: Vec<T>) -> ReferenceSet<T> {
    let set = ReferenceSet::new(SetIdentity::new(name, format!("{}-id", name)), capacity);
    if !items.is_empty() {
        set.add(items).expect("fresh set accepts items");
    }
    set
}

pub fn values<T: Clone>(items: Vec<Arc<T>>) -> Vec<T> {
    items.iter().map(|item| (**item).clone()).collect()
}

/// Sends `delta` through its byte encoding and back, as a peer would receive it.
pub fn through_wire<T>(
    delta: &SetDelta<T>,
    codec: &dyn ItemCodec<T>,
) -> Result<SetDelta<T>, SetError> {
    let bytes = delta.to_wire(Some(codec))?.to_bytes();
    trace!("delta for {} encoded to {} bytes", delta.identity, bytes.len());
    Ok(WireDelta::from_bytes(&bytes)?.into_delta())
}

/// One mutating call on a reference set of numbers
#[derive(Clone, Debug)]
pub enum SetOp {
    Add(Vec<u32>),
    RemoveFirst(u32),
    // removes every multiple of the value
    RemoveMultiplesOf(u32),
    RemoveAt(usize),
    Clear,
    RemoveAndAdd(u32, Vec<u32>),
}

impl SetOp {
    /// Applies the operation. Out of range removals are expected and ignored.
    pub fn apply(&self, set: &ReferenceSet<u32>) {
        let result = match self {
            SetOp::Add(items) => set.add(items.clone()).map(|_| ()),
            SetOp::RemoveFirst(value) => set.remove_first(|item| item == value).map(|_| ()),
            SetOp::RemoveMultiplesOf(divisor) => set
                .remove_all(|item| item % divisor.max(&1) == 0)
                .map(|_| ()),
            SetOp::RemoveAt(index) => set.remove_at(*index).map(|_| ()),
            SetOp::Clear => set.clear().map(|_| ()),
            SetOp::RemoveAndAdd(value, items) => set
                .remove_and_add(|item| item == value, items.clone())
                .map(|_| ()),
        };
        match result {
            Ok(()) => {}
            Err(error) if error.is_range_error() => {}
            Err(error) => panic!("unexpected error from {:?}: {}", self, error),
        }
    }
}
