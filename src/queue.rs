//! Durable ordered queue of pending request descriptors.
//!
//! Invariant: the in-memory queue and the durable record are in sync after
//! every operation returns. Mutations that cannot be persisted are rolled
//! back in memory before the error surfaces. All state sits behind one
//! mutex so the queue stays correct off a single-threaded event loop too.

use crate::descriptor::RequestDescriptor;
use crate::error::StoreError;
use crate::storage::StorageBackend;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

const ENVELOPE_VERSION: u32 = 1;

/// Durable record shape. The version field tolerates future schema
/// changes; loads also accept the pre-versioning bare array.
#[derive(Debug, Deserialize)]
struct StoredEnvelope {
    #[allow(dead_code)]
    version: u32,
    pending: Vec<RequestDescriptor>,
}

#[derive(Debug, Serialize)]
struct StoredEnvelopeRef<'a> {
    version: u32,
    pending: &'a [RequestDescriptor],
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StoredRecord {
    Envelope(StoredEnvelope),
    Legacy(Vec<RequestDescriptor>),
}

/// Ordered, durably-stored sequence of pending requests.
///
/// Oldest first, append-only until a flush or an explicit clear. Owns all
/// reads and writes to its storage key; no other component touches the
/// durable store.
pub struct PersistentQueue {
    storage: Arc<dyn StorageBackend>,
    key: String,
    pending: Mutex<Vec<RequestDescriptor>>,
}

impl std::fmt::Debug for PersistentQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistentQueue")
            .field("key", &self.key)
            .field("len", &self.len())
            .finish()
    }
}

impl PersistentQueue {
    /// Construct the queue, loading any previously persisted descriptors.
    ///
    /// An absent record yields an empty queue. A corrupt or unreadable
    /// record also yields an empty queue (fail-open) with a warning; local
    /// state corruption must never make the host unusable.
    pub fn load(storage: Arc<dyn StorageBackend>, key: impl Into<String>) -> Self {
        let key = key.into();
        let pending = match storage.get(&key) {
            Ok(Some(bytes)) => match serde_json::from_slice::<StoredRecord>(&bytes) {
                Ok(StoredRecord::Envelope(envelope)) => envelope.pending,
                Ok(StoredRecord::Legacy(pending)) => pending,
                Err(err) => {
                    tracing::warn!(
                        key = %key,
                        error = %err,
                        "discarding corrupt pending-request record"
                    );
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(err) => {
                tracing::warn!(
                    key = %key,
                    error = %err,
                    "durable store unreadable, starting with an empty queue"
                );
                Vec::new()
            }
        };
        Self { storage, key, pending: Mutex::new(pending) }
    }

    /// Append a descriptor and rewrite the durable record in full.
    ///
    /// On a write failure the append is rolled back in memory and
    /// [`StoreError::Persist`] surfaces.
    pub fn add(&self, descriptor: RequestDescriptor) -> Result<(), StoreError> {
        let mut pending = self.lock();
        pending.push(descriptor);
        if let Err(err) = self.persist(&pending) {
            pending.pop();
            return Err(err);
        }
        tracing::debug!(key = %self.key, len = pending.len(), "captured request persisted");
        Ok(())
    }

    /// Empty the queue and remove the durable record. Idempotent; safe to
    /// call from outside the interceptor path (e.g. on logout).
    pub fn clear(&self) {
        let mut pending = self.lock();
        pending.clear();
        if let Err(err) = self.storage.remove(&self.key) {
            tracing::warn!(key = %self.key, error = %err, "failed to remove durable record");
        }
    }

    /// Point-in-time copy of the queue, stable under concurrent captures.
    pub fn snapshot(&self) -> Vec<RequestDescriptor> {
        self.lock().clone()
    }

    /// Snapshot and clear in one step, removing the durable record before
    /// the caller sees the drained batch. Used by replay so that a crash
    /// mid-flush drops requests rather than duplicating them.
    pub fn drain(&self) -> Result<Vec<RequestDescriptor>, StoreError> {
        let mut pending = self.lock();
        if pending.is_empty() {
            return Ok(Vec::new());
        }
        let drained = std::mem::take(&mut *pending);
        if let Err(source) = self.storage.remove(&self.key) {
            *pending = drained;
            return Err(StoreError::Persist { key: self.key.clone(), source });
        }
        Ok(drained)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn storage_key(&self) -> &str {
        &self.key
    }

    fn persist(&self, pending: &[RequestDescriptor]) -> Result<(), StoreError> {
        let envelope = StoredEnvelopeRef { version: ENVELOPE_VERSION, pending };
        let bytes = serde_json::to_vec(&envelope)?;
        // Remove-then-write: the record always mirrors memory exactly.
        self.storage
            .remove(&self.key)
            .and_then(|()| self.storage.set(&self.key, &bytes))
            .map_err(|source| StoreError::Persist { key: self.key.clone(), source })
    }

    fn lock(&self) -> MutexGuard<'_, Vec<RequestDescriptor>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
