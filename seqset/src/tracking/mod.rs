mod adjustable;
mod diff;
mod replica;
mod tracking_set;
mod tracking_state;

pub use adjustable::{AdjustableTrackingSet, UnlockedAdjustableTrackingSet};
pub use tracking_set::{IterationOutcome, TrackingSet, UnlockedTrackingSet};
pub use tracking_state::{ItemFilter, TrackingState};
