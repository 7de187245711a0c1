//! Open/closed state of a store handle.
//!
//! A handle starts `Open` (a failed open never produces one) and moves to
//! `Closed` exactly once. Operations borrow the resource under a shared
//! lock, so `release` waits for in-flight operations and every later
//! operation observes [`Error::ClosedHandle`] instead of a released
//! resource.

use parking_lot::RwLock;

use crate::error::{Error, Result};

/// Observable lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Open,
    Closed,
}

/// Owns a resource until it is released.
pub struct Lifecycle<T> {
    slot: RwLock<Option<T>>,
}

impl<T> Lifecycle<T> {
    /// Wraps an opened resource.
    pub fn new(resource: T) -> Self {
        Self {
            slot: RwLock::new(Some(resource)),
        }
    }

    /// Runs `f` against the resource while it is open.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ClosedHandle`] after release, otherwise whatever `f`
    /// returns.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> Result<R>) -> Result<R> {
        let slot = self.slot.read();
        let resource = slot.as_ref().ok_or(Error::ClosedHandle)?;
        f(resource)
    }

    /// Takes the resource out, closing the handle.
    ///
    /// Returns `Some` to exactly one caller; concurrent and repeated calls
    /// get `None`.
    pub fn release(&self) -> Option<T> {
        self.slot.write().take()
    }

    /// Current state.
    pub fn state(&self) -> LifecycleState {
        if self.slot.read().is_some() {
            LifecycleState::Open
        } else {
            LifecycleState::Closed
        }
    }
}
