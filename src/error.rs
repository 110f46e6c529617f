//! Error types for capture and persistence bookkeeping.

use crate::storage::StorageError;
use thiserror::Error;

/// Failure of the store-and-forward bookkeeping itself.
///
/// Network failures never appear here: a failed request is forwarded to its
/// caller untouched, whether or not it was captured. Corrupt durable state
/// is not an error either; the queue loads it as empty.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The durable store rejected a mutation; pending requests may no
    /// longer survive a restart.
    #[error("failed to persist pending requests under {key:?}")]
    Persist {
        key: String,
        #[source]
        source: StorageError,
    },
    /// Pending requests could not be serialized for persistence.
    #[error("failed to serialize pending requests")]
    Serialize(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn persist_error_names_the_storage_key() {
        let err = StoreError::Persist {
            key: "ns.pending".into(),
            source: StorageError::Backend("quota exceeded".into()),
        };
        assert!(err.to_string().contains("ns.pending"));
        assert!(err.source().unwrap().to_string().contains("quota exceeded"));
    }
}
