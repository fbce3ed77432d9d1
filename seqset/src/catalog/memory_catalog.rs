use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use log::{info, warn};

use super::{CatalogError, CatalogedSet, SetCatalog};
use crate::SetIdentity;

struct Entries {
    by_name: HashMap<String, Arc<dyn CatalogedSet>>,
    // uuid -> name
    names_by_id: HashMap<String, String>,
}

// MemoryCatalog
/// In-memory [`SetCatalog`] where names and ids must both be unique.
pub struct MemoryCatalog {
    entries: Mutex<Entries>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(Entries {
                by_name: HashMap::new(),
                names_by_id: HashMap::new(),
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.entries().by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries().by_name.keys().cloned().collect();
        names.sort();
        names
    }

    // nothing panics between the paired map updates, so poisoned entries are still consistent
    fn entries(&self) -> MutexGuard<'_, Entries> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MemoryCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl SetCatalog for MemoryCatalog {
    fn register(&self, set: Arc<dyn CatalogedSet>) -> Result<(), CatalogError> {
        let identity = set.identity().clone();
        let mut entries = self.entries();
        if entries.by_name.contains_key(identity.name()) {
            warn!("MemoryCatalog: duplicate registration of name {:?}", identity.name());
            return Err(CatalogError::DuplicateName {
                name: identity.name().to_string(),
            });
        }
        if entries.names_by_id.contains_key(identity.uuid()) {
            warn!("MemoryCatalog: duplicate registration of id {:?}", identity.uuid());
            return Err(CatalogError::DuplicateId {
                uuid: identity.uuid().to_string(),
            });
        }

        entries
            .names_by_id
            .insert(identity.uuid().to_string(), identity.name().to_string());
        entries.by_name.insert(identity.name().to_string(), set);
        info!(
            "MemoryCatalog: registered {} of {} item(s)",
            identity,
            entries.by_name[identity.name()].item_type_name()
        );
        Ok(())
    }

    fn unregister(&self, identity: &SetIdentity) -> Result<Arc<dyn CatalogedSet>, CatalogError> {
        let mut entries = self.entries();
        let registered = entries
            .by_name
            .get(identity.name())
            .is_some_and(|set| set.identity() == identity);
        if !registered {
            return Err(CatalogError::NotFound {
                identity: identity.to_string(),
            });
        }

        entries.names_by_id.remove(identity.uuid());
        let set = entries
            .by_name
            .remove(identity.name())
            .ok_or_else(|| CatalogError::NotFound {
                identity: identity.to_string(),
            })?;
        info!("MemoryCatalog: unregistered {}", identity);
        Ok(set)
    }

    fn find_by_name(&self, name: &str) -> Option<Arc<dyn CatalogedSet>> {
        self.entries().by_name.get(name).cloned()
    }

    fn find_by_id(&self, uuid: &str) -> Option<Arc<dyn CatalogedSet>> {
        let entries = self.entries();
        let name = entries.names_by_id.get(uuid)?;
        entries.by_name.get(name).cloned()
    }
}
