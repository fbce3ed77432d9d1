use thiserror::Error;

/// Errors that can occur when registering sets in a catalog
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// Another set is already registered under this name
    #[error("A set named {name:?} is already registered")]
    DuplicateName { name: String },

    /// Another set is already registered under this id
    #[error("A set with id {uuid:?} is already registered")]
    DuplicateId { uuid: String },

    /// No set is registered with this identity
    #[error("Set {identity} is not registered")]
    NotFound { identity: String },

    /// The set is already registered in a catalog and must be detached first
    #[error("Set {name:?} is already registered in a catalog")]
    AlreadyRegistered { name: String },
}
