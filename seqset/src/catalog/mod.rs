//! # Set catalog
//!
//! Lets components that know nothing about each other's item types find shared sets
//! by name or id. A host provides its own [`SetCatalog`]; [`MemoryCatalog`] is a
//! small in-memory one.

mod error;
mod memory_catalog;

use std::{any::Any, sync::Arc};

pub use error::CatalogError;
pub use memory_catalog::MemoryCatalog;

use crate::SetIdentity;

/// A set as seen through a catalog, with its item type erased.
pub trait CatalogedSet: Send + Sync {
    fn identity(&self) -> &SetIdentity;

    fn item_type_name(&self) -> &'static str;

    fn as_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

/// Recovers the concrete set behind a catalog entry, e.g. `ReferenceSet<Reading>`.
pub fn downcast_set<S: Any + Send + Sync>(set: Arc<dyn CatalogedSet>) -> Option<Arc<S>> {
    set.as_any().downcast::<S>().ok()
}

pub trait SetCatalog: Send + Sync {
    fn register(&self, set: Arc<dyn CatalogedSet>) -> Result<(), CatalogError>;

    fn unregister(&self, identity: &SetIdentity) -> Result<Arc<dyn CatalogedSet>, CatalogError>;

    fn find_by_name(&self, name: &str) -> Option<Arc<dyn CatalogedSet>>;

    fn find_by_id(&self, uuid: &str) -> Option<Arc<dyn CatalogedSet>>;
}
