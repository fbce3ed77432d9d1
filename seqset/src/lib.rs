//! # Seqset
//! Sequenced reference sets, the tracking replicas that follow them, and the deltas
//! that carry changes between replicas.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

#[macro_use]
extern crate cfg_if;

mod codec;
mod config;
mod delta;
mod error;
mod identity;
mod reference_set;
mod snapshot;
mod state;
mod store;
mod tracking;
mod types;

pub mod catalog;

pub use codec::{CodecError, ItemCodec, TextCodec};
pub use config::{IterationOptions, TrackingConfig};
pub use delta::{AddRange, RemoveRange, SetDelta, WireAddRange, WireDelta};
pub use error::{ErrorKind, SetError};
pub use identity::SetIdentity;
pub use reference_set::ReferenceSet;
pub use snapshot::{SetSource, Snapshot};
pub use state::{Changeability, SetVariant, UpdateState};
pub use store::{
    change::{ItemChange, ItemObserver, ObserverList},
    item_record::ItemRecord,
    item_store::ItemStore,
    lock::{LockError, Locked, SetLock, Unlocked},
    range_summary::{RangeSummary, RemovedPosition},
};
pub use tracking::{
    AdjustableTrackingSet, ItemFilter, IterationOutcome, TrackingSet, TrackingState,
    UnlockedAdjustableTrackingSet, UnlockedTrackingSet,
};
pub use types::{SeqNum, SetSeqNum};

cfg_if! {
    if #[cfg(feature = "json_codec")] {
        pub use codec::JsonCodec;
    }
}
