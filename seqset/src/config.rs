//! # `TrackingConfig` and `IterationOptions`
//!
//! Knobs for building tracking sets and for driving a single synchronization
//! iteration. Both follow the same builder style: start from `builder()` (or
//! `Default`), chain setters, then `build()`.

use std::sync::Arc;

use crate::ItemCodec;

// TrackingConfig
pub struct TrackingConfig<T> {
    /// Maximum number of items retained by a set built without a source. `None` and
    /// `Some(0)` are unbounded. Sets following a source hold exactly what the source
    /// holds and ignore this.
    pub capacity: Option<usize>,
    /// Default number of contiguous blocks processed by one `synchronize` step.
    /// 0 means no limit.
    pub block_budget: usize,
    /// Codec used to produce and consume serialized item payloads.
    pub codec: Option<Arc<dyn ItemCodec<T>>>,
}

impl<T> Default for TrackingConfig<T> {
    fn default() -> Self {
        Self {
            capacity: None,
            block_budget: 0,
            codec: None,
        }
    }
}

impl<T> TrackingConfig<T> {
    pub fn builder() -> Self {
        Self::default()
    }

    pub fn capacity(&mut self, capacity: usize) -> &mut Self {
        self.capacity = Some(capacity);
        self
    }

    pub fn block_budget(&mut self, block_budget: usize) -> &mut Self {
        self.block_budget = block_budget;
        self
    }

    pub fn codec(&mut self, codec: Arc<dyn ItemCodec<T>>) -> &mut Self {
        self.codec = Some(codec);
        self
    }

    pub fn build(&mut self) -> Self {
        std::mem::take(self)
    }
}

// IterationOptions
/// Options for a single call to `update_iteration`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IterationOptions {
    /// Maximum number of contiguous remove/add blocks to process. `None` uses the
    /// tracking set's configured budget, `Some(0)` means no limit.
    pub block_budget: Option<usize>,
    /// Whether to describe the changes as a delta.
    pub generate_delta: bool,
    /// Whether the delta's added items should also carry their serialized form.
    pub serialize_items: bool,
}

impl IterationOptions {
    pub fn builder() -> Self {
        Self::default()
    }

    pub fn block_budget(&mut self, block_budget: usize) -> &mut Self {
        self.block_budget = Some(block_budget);
        self
    }

    pub fn generate_delta(&mut self) -> &mut Self {
        self.generate_delta = true;
        self
    }

    /// Implies `generate_delta`.
    pub fn serialize_items(&mut self) -> &mut Self {
        self.generate_delta = true;
        self.serialize_items = true;
        self
    }

    pub fn build(&mut self) -> Self {
        std::mem::take(self)
    }
}
