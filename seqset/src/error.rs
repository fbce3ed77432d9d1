use thiserror::Error;

/// Broad classification of a [`SetError`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The caller violated the contract of the set (never transient)
    Usage,
    /// An index was outside of the current contents
    Range,
    /// The set's internal machinery could not be reached or decoded
    Internal,
}

/// Errors that can occur during set operations
///
/// None of these represent transient failures. Nothing is retried internally and a
/// failed call leaves no partial mutation behind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SetError {
    /// Attempted to mutate a set that has been marked Fixed
    #[error("Set {name:?} is fixed and cannot be changed by {operation}")]
    SetIsFixed {
        name: String,
        operation: &'static str,
    },

    /// A delta was applied to a set with a different identity
    #[error("Delta for set {actual} cannot be applied to set {expected}")]
    IdentityMismatch { expected: String, actual: String },

    /// Serialized payloads were requested but the codec does not support the item type
    #[error("Serialization of {type_name} items is not supported for set {name:?}")]
    SerializationUnsupported {
        name: String,
        type_name: &'static str,
    },

    /// A serialized item could not be converted back into an item
    #[error("Failed to deserialize item with seq num {seq_num} for set {name:?}: {message}")]
    Deserialization {
        name: String,
        seq_num: u64,
        message: String,
    },

    /// A delta with add ranges carried neither items nor serialized items
    #[error("Delta for set {name:?} has add ranges without items or serialized items")]
    DeltaMissingItems { name: String },

    /// A delta's add range runs past the largest representable seq num
    #[error("Delta for set {name:?} has an add range starting at {start_seq_num} with {count} items, past the last seq num")]
    InvalidDelta {
        name: String,
        start_seq_num: u64,
        count: usize,
    },

    /// The operation is disabled on this variant of set
    #[error("{operation} is disabled on {variant} set {name:?}")]
    OperationDisabled {
        name: String,
        variant: &'static str,
        operation: &'static str,
    },

    /// Change observers may only be attached to sets built without a lock
    #[error("Cannot attach an observer to lock-bearing set {name:?}, use the iteration/delta path instead")]
    NotificationsRequireUnlocked { name: String },

    /// Pull style synchronization was requested on a set that was built without a source
    #[error("Tracking set {name:?} has no source to synchronize from")]
    NoSource { name: String },

    /// Records appended to a tracking store must keep sequence numbers strictly increasing
    #[error("Seq num {seq_num} does not follow last seq num {last_seq_num} in set {name:?}")]
    SeqNumNotIncreasing {
        name: String,
        seq_num: u64,
        last_seq_num: u64,
    },

    /// Index out of bounds on indexed access or removal
    #[error("Index {index} is out of range for set with {count} items")]
    IndexOutOfRange { index: usize, count: usize },

    /// The set's mutex was poisoned by a panicking holder
    #[error("Lock for set {name:?} was poisoned")]
    LockPoisoned { name: String },

    /// The set was re-entered while already borrowed on the current thread
    #[error("Set {name:?} is already borrowed on the current thread")]
    ReentrantAccess { name: String },

    /// An encoded delta could not be read back
    #[error("Failed to decode wire delta: {context}")]
    WireDecode { context: &'static str },
}

impl SetError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SetError::IndexOutOfRange { .. } => ErrorKind::Range,
            SetError::LockPoisoned { .. }
            | SetError::ReentrantAccess { .. }
            | SetError::WireDecode { .. } => ErrorKind::Internal,
            _ => ErrorKind::Usage,
        }
    }

    pub fn is_usage_error(&self) -> bool {
        self.kind() == ErrorKind::Usage
    }

    pub fn is_range_error(&self) -> bool {
        self.kind() == ErrorKind::Range
    }
}
