use std::{
    any::Any,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex, PoisonError,
    },
    thread::{self, ThreadId},
};

use log::{debug, info};

use crate::{
    catalog::{CatalogError, CatalogedSet, SetCatalog},
    ItemRecord, ItemStore, Locked, RangeSummary, SeqNum, SetError, SetIdentity, SetLock,
    SetSeqNum, SetSource, SetVariant, Snapshot, TrackingConfig, TrackingSet, UpdateState,
};

/// The source of truth for one logical set.
///
/// Always lock-bearing. Every mutating call takes the lock once, applies its whole batch
/// (including capacity eviction) and bumps the set seq num at most once.
pub struct ReferenceSet<T> {
    identity: SetIdentity,
    capacity: usize,
    store: Locked<ItemStore<T>>,
    set_seq_num: AtomicU64,
    owner: ThreadId,
    registration: Mutex<Option<Arc<dyn SetCatalog>>>,
}

impl<T> ReferenceSet<T> {
    /// Creates an empty set owned by the calling thread. A `capacity` of 0 means unbounded.
    pub fn new(identity: SetIdentity, capacity: usize) -> Self {
        let store = ItemStore::new(identity.clone(), SetVariant::Reference, capacity);
        Self {
            identity,
            capacity,
            store: Locked::new(store),
            set_seq_num: AtomicU64::new(0),
            owner: thread::current().id(),
            registration: Mutex::new(None),
        }
    }

    pub fn identity(&self) -> &SetIdentity {
        &self.identity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Change counter, readable without taking the lock.
    pub fn set_seq_num(&self) -> SetSeqNum {
        self.set_seq_num.load(Ordering::Acquire)
    }

    pub fn is_owner_thread(&self) -> bool {
        thread::current().id() == self.owner
    }

    // Mutation

    /// Appends `items` in order, evicting the oldest items past capacity. Returns the
    /// seq num of the last item added, or the current high-water mark if `items` is empty.
    pub fn add(&self, items: impl IntoIterator<Item = T>) -> Result<SeqNum, SetError> {
        let items: Vec<Arc<T>> = items.into_iter().map(Arc::new).collect();
        self.add_shared(items)
    }

    pub fn add_one(&self, item: T) -> Result<SeqNum, SetError> {
        self.add_shared([Arc::new(item)])
    }

    /// Like [`add`](Self::add), for items already behind an `Arc`.
    pub fn add_shared(&self, items: impl IntoIterator<Item = Arc<T>>) -> Result<SeqNum, SetError> {
        self.mutate("add", |store| {
            for item in items {
                store.append(item);
            }
            Ok(store.last_seq_num())
        })
    }

    /// Removes the first item matching `predicate`.
    pub fn remove_first(
        &self,
        predicate: impl FnMut(&T) -> bool,
    ) -> Result<Option<Arc<T>>, SetError> {
        self.mutate("remove_first", |store| {
            Ok(store
                .remove_first_where(predicate)
                .map(ItemRecord::into_item))
        })
    }

    /// Removes every item matching `predicate`. Returns how many were removed.
    pub fn remove_all(&self, predicate: impl FnMut(&T) -> bool) -> Result<usize, SetError> {
        self.mutate("remove_all", |store| Ok(store.remove_all_where(predicate)))
    }

    pub fn remove_at(&self, index: usize) -> Result<Arc<T>, SetError> {
        self.mutate("remove_at", |store| {
            store.remove_at(index).map(ItemRecord::into_item)
        })
    }

    pub fn clear(&self) -> Result<usize, SetError> {
        self.mutate("clear", |store| Ok(store.clear()))
    }

    /// Removes every item matching `predicate` and then appends `items`, as a single
    /// change. Returns the number removed and the seq num of the last item added.
    pub fn remove_and_add(
        &self,
        predicate: impl FnMut(&T) -> bool,
        items: impl IntoIterator<Item = T>,
    ) -> Result<(usize, SeqNum), SetError> {
        let items: Vec<Arc<T>> = items.into_iter().map(Arc::new).collect();
        self.mutate("remove_and_add", |store| {
            let removed = store.remove_all_where(predicate);
            for item in items {
                store.append(item);
            }
            Ok((removed, store.last_seq_num()))
        })
    }

    /// Marks the set Fixed. Idempotent; returns whether this call made the change.
    pub fn set_fixed(&self) -> Result<bool, SetError> {
        let fixed = self.with_store(|store| {
            let fixed = store.set_fixed();
            if store.commit() {
                self.set_seq_num
                    .store(store.set_seq_num(), Ordering::Release);
            }
            fixed
        })?;
        if fixed {
            info!("ReferenceSet: set {} is now fixed", self.identity);
        }
        Ok(fixed)
    }

    pub fn is_fixed(&self) -> Result<bool, SetError> {
        self.with_store(|store| store.is_fixed())
    }

    // Access

    pub fn get(&self, index: usize) -> Result<ItemRecord<T>, SetError> {
        self.with_store(|store| store.get(index).cloned())?
    }

    pub fn to_vec(&self) -> Result<Vec<Arc<T>>, SetError> {
        self.with_store(|store| store.to_items())
    }

    pub fn count(&self) -> Result<usize, SetError> {
        self.with_store(|store| store.count())
    }

    pub fn range_summary(&self) -> Result<RangeSummary, SetError> {
        self.with_store(|store| store.range_summary())
    }

    /// `Empty` until an item has ever been added, then `Complete`.
    pub fn update_state(&self) -> Result<UpdateState, SetError> {
        self.with_store(|store| Self::state_of(store))
    }

    pub fn snapshot(&self) -> Result<Snapshot<T>, SetError> {
        let snapshot =
            self.with_store(|store| Snapshot::from_store(store, Self::state_of(store)))?;
        debug!(
            "ReferenceSet: snapshot {} of set {:?} with {} item(s)",
            snapshot.set_seq_num(),
            self.identity.name(),
            snapshot.count()
        );
        Ok(snapshot)
    }

    /// Calls `f` on every record in order.
    ///
    /// On the owning thread this runs in place over the live records. The lock is still
    /// taken, once, and held for the whole walk, so `f` must not call back into this set.
    /// Other threads iterate over a snapshot instead and hold no lock during `f`.
    pub fn for_each_item(&self, mut f: impl FnMut(&ItemRecord<T>)) -> Result<(), SetError> {
        if self.is_owner_thread() {
            return self.with_store(|store| store.records().for_each(&mut f));
        }
        let snapshot = self.snapshot()?;
        snapshot.records().iter().for_each(f);
        Ok(())
    }

    fn state_of(store: &ItemStore<T>) -> UpdateState {
        if store.ever_had_items() {
            UpdateState::Complete
        } else {
            UpdateState::Empty
        }
    }

    fn with_store<R>(&self, f: impl FnOnce(&mut ItemStore<T>) -> R) -> Result<R, SetError> {
        self.store
            .with(f)
            .map_err(|error| error.into_set_error(self.identity.name()))
    }

    // one lock acquisition, one commit, nothing changes if the set is fixed
    fn mutate<R>(
        &self,
        operation: &'static str,
        f: impl FnOnce(&mut ItemStore<T>) -> Result<R, SetError>,
    ) -> Result<R, SetError> {
        self.with_store(|store| {
            store.ensure_changeable(operation)?;
            let result = f(store);
            if store.commit() {
                self.set_seq_num
                    .store(store.set_seq_num(), Ordering::Release);
            }
            result
        })?
    }
}

impl<T: Send + Sync> ReferenceSet<T> {
    pub fn create_tracking_set(&self) -> TrackingSet<'_, T> {
        self.create_tracking_set_with(TrackingConfig::default())
    }

    pub fn create_tracking_set_with(&self, config: TrackingConfig<T>) -> TrackingSet<'_, T> {
        TrackingSet::new(self, config)
    }
}

// Catalog
impl<T: Send + Sync + 'static> ReferenceSet<T> {
    /// Registers this set in `catalog` so others can find it by name or id.
    pub fn register(self: &Arc<Self>, catalog: Arc<dyn SetCatalog>) -> Result<(), CatalogError> {
        let mut registration = self
            .registration
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if registration.is_some() {
            return Err(CatalogError::AlreadyRegistered {
                name: self.identity.name().to_string(),
            });
        }
        catalog.register(self.clone())?;
        info!("ReferenceSet: registered set {}", self.identity);
        *registration = Some(catalog);
        Ok(())
    }
}

impl<T> ReferenceSet<T> {
    /// Unregisters from the catalog this set was registered in. Idempotent; returns
    /// whether the set was registered.
    pub fn detach(&self) -> Result<bool, CatalogError> {
        let catalog = self
            .registration
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let Some(catalog) = catalog else {
            return Ok(false);
        };
        catalog.unregister(&self.identity)?;
        info!("ReferenceSet: detached set {}", self.identity);
        Ok(true)
    }

    pub fn is_registered(&self) -> bool {
        self.registration
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

impl<T: Send + Sync> SetSource<T> for ReferenceSet<T> {
    fn identity(&self) -> &SetIdentity {
        &self.identity
    }

    fn set_seq_num(&self) -> SetSeqNum {
        self.set_seq_num()
    }

    fn snapshot(&self) -> Result<Snapshot<T>, SetError> {
        self.snapshot()
    }
}

impl<T: Send + Sync + 'static> CatalogedSet for ReferenceSet<T> {
    fn identity(&self) -> &SetIdentity {
        &self.identity
    }

    fn item_type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn as_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}
