/// Sequence number assigned to an item when it is appended to a Reference Set.
pub type SeqNum = u64;

/// Change counter of a whole set, bumped once per mutating call.
pub type SetSeqNum = u64;
