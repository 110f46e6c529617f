//! Registry of replay-success callbacks.
//!
//! Descriptors persist a stable [`CallbackId`]; the host application
//! registers the matching callback here. Resolution never reaches into the
//! environment, and a missing or panicking callback is contained and
//! logged rather than aborting the rest of a replay batch.

use crate::descriptor::{CallbackId, ReplayOutcome};
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, PoisonError, RwLock};

type ReplayCallback = Arc<dyn Fn(&ReplayOutcome) + Send + Sync>;

/// Lookup table from callback id to callback, owned by the host.
#[derive(Default, Clone)]
pub struct CallbackRegistry {
    callbacks: Arc<RwLock<HashMap<CallbackId, ReplayCallback>>>,
}

impl std::fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let ids: Vec<_> = self
            .callbacks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        f.debug_struct("CallbackRegistry").field("ids", &ids).finish()
    }
}

impl CallbackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback` under `id`, replacing any previous registration.
    pub fn register<F>(&self, id: impl Into<CallbackId>, callback: F)
    where
        F: Fn(&ReplayOutcome) + Send + Sync + 'static,
    {
        self.callbacks
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.into(), Arc::new(callback));
    }

    /// Remove the callback registered under `id`. Returns whether one existed.
    pub fn deregister(&self, id: &CallbackId) -> bool {
        self.callbacks
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id)
            .is_some()
    }

    pub fn contains(&self, id: &CallbackId) -> bool {
        self.callbacks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(id)
    }

    /// Invoke the callback for `id` with a replay outcome.
    ///
    /// A missing registration or a panicking callback is logged and
    /// swallowed; replay progress never depends on callback health.
    pub(crate) fn notify(&self, id: &CallbackId, outcome: &ReplayOutcome) {
        let callback = self
            .callbacks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned();
        match callback {
            Some(callback) => {
                if catch_unwind(AssertUnwindSafe(|| callback(outcome))).is_err() {
                    tracing::warn!(
                        callback = %id,
                        url = %outcome.request.url,
                        "replay-success callback panicked"
                    );
                }
            }
            None => {
                tracing::warn!(
                    callback = %id,
                    url = %outcome.request.url,
                    "no replay-success callback registered under this id"
                );
            }
        }
    }
}
