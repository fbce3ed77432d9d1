/// Freshness of a set relative to the source it follows
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UpdateState {
    /// Never synchronized
    Initial,
    /// Synchronized, and no item has ever existed in the source
    Empty,
    /// Synchronization has started but more work remains
    InProgress,
    /// Fully caught up with the most recent snapshot
    Complete,
    /// The source reported a failure
    Failed,
}

impl UpdateState {
    /// Whether this state, reported by a source, overrides whatever a follower computes locally.
    pub fn dominates(self) -> bool {
        matches!(self, UpdateState::InProgress | UpdateState::Failed)
    }

    pub fn is_complete(self) -> bool {
        matches!(self, UpdateState::Complete | UpdateState::Empty)
    }

    pub(crate) fn to_u8(self) -> u8 {
        match self {
            UpdateState::Initial => 0,
            UpdateState::Empty => 1,
            UpdateState::InProgress => 2,
            UpdateState::Complete => 3,
            UpdateState::Failed => 4,
        }
    }

    pub(crate) fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(UpdateState::Initial),
            1 => Some(UpdateState::Empty),
            2 => Some(UpdateState::InProgress),
            3 => Some(UpdateState::Complete),
            4 => Some(UpdateState::Failed),
            _ => None,
        }
    }
}

/// Which mutating operations a set accepts
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SetVariant {
    Reference,
    Snapshot,
    Tracking,
    AdjustableTracking,
}

impl SetVariant {
    pub fn as_str(self) -> &'static str {
        match self {
            SetVariant::Reference => "reference",
            SetVariant::Snapshot => "snapshot",
            SetVariant::Tracking => "tracking",
            SetVariant::AdjustableTracking => "adjustable tracking",
        }
    }
}

/// One way transition from `Changeable` to `Fixed`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Changeability {
    Changeable,
    Fixed,
}
