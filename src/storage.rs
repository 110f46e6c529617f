//! Injected durable key-value capability.
//!
//! The queue never touches an ambient global store; it is handed a
//! [`StorageBackend`] at construction. Access is synchronous because the
//! backends are local (process memory or a file on disk) and never suspend.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;

/// Failure of the durable store itself.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failure")]
    Io(#[from] io::Error),
    #[error("storage backend failure: {0}")]
    Backend(String),
}

/// Synchronous durable key-value store.
///
/// One record per key, written in full on every mutation. `get` of an
/// absent key yields `Ok(None)`; `remove` of an absent key is a no-op.
pub trait StorageBackend: Send + Sync + std::fmt::Debug {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;
    fn set(&self, key: &str, value: &[u8]) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// In-memory backend for tests and in-process queues.
///
/// Clones share the same records. `fail_writes` injects write failures for
/// exercising persistence error paths.
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    records: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    fail_writes: Arc<AtomicBool>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `set` fail until switched back off.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Vec<u8>>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl StorageBackend for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Backend("write failure injected".into()));
        }
        self.lock().insert(key.to_owned(), value.to_vec());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.lock().remove(key);
        Ok(())
    }
}

/// File-per-key backend rooted at a directory, for hosts without a
/// browser-style local store.
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        // Keys may contain namespace separators; keep the filename flat.
        let name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') { c } else { '_' })
            .collect();
        self.root.join(format!("{}.json", name))
    }
}

impl StorageBackend for FileStorage {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        match fs::read(self.path_for(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        fs::create_dir_all(&self.root)?;
        let path = self.path_for(key);
        // Write-then-rename so a crash never leaves a half-written record.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
