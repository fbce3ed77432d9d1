use std::{
    cell::RefCell,
    sync::{Mutex, MutexGuard},
};

use crate::SetError;

/// Failure to reach the state guarded by a [`SetLock`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LockError {
    Poisoned,
    Reentrant,
}

impl LockError {
    pub(crate) fn into_set_error(self, name: &str) -> SetError {
        match self {
            LockError::Poisoned => SetError::LockPoisoned {
                name: name.to_string(),
            },
            LockError::Reentrant => SetError::ReentrantAccess {
                name: name.to_string(),
            },
        }
    }
}

/// The cell a set keeps its state in.
///
/// `Locked` sets may be shared between threads and snapshotted by followers on any
/// thread. `Unlocked` sets belong to a single owner and are the only ones allowed to
/// carry change observers.
pub trait SetLock<S> {
    const ALLOWS_OBSERVERS: bool;

    fn new(state: S) -> Self;

    fn with<R>(&self, f: impl FnOnce(&mut S) -> R) -> Result<R, LockError>;
}

// Locked
pub struct Locked<S> {
    inner: Mutex<S>,
}

impl<S> Locked<S> {
    fn guard(&self) -> Result<MutexGuard<'_, S>, LockError> {
        self.inner.lock().map_err(|_| LockError::Poisoned)
    }
}

impl<S> SetLock<S> for Locked<S> {
    const ALLOWS_OBSERVERS: bool = false;

    fn new(state: S) -> Self {
        Self {
            inner: Mutex::new(state),
        }
    }

    fn with<R>(&self, f: impl FnOnce(&mut S) -> R) -> Result<R, LockError> {
        let mut guard = self.guard()?;
        Ok(f(&mut guard))
    }
}

// Unlocked
pub struct Unlocked<S> {
    inner: RefCell<S>,
}

impl<S> SetLock<S> for Unlocked<S> {
    const ALLOWS_OBSERVERS: bool = true;

    fn new(state: S) -> Self {
        Self {
            inner: RefCell::new(state),
        }
    }

    fn with<R>(&self, f: impl FnOnce(&mut S) -> R) -> Result<R, LockError> {
        let mut state = self
            .inner
            .try_borrow_mut()
            .map_err(|_| LockError::Reentrant)?;
        Ok(f(&mut state))
    }
}
