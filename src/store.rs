//! Facade wiring policy, storage, queue, callbacks, replayer, interceptor.
//!
//! One [`StoreAndForward`] instance owns one queue over one storage
//! namespace. Construction replaces the original's provider phase:
//! configuration is fixed at `build()` and immutable afterwards, and
//! multiple independent instances may coexist over different namespaces.

use crate::callbacks::CallbackRegistry;
use crate::descriptor::RequestDescriptor;
use crate::error::StoreError;
use crate::interceptor::Interceptor;
use crate::layer::StoreAndForwardLayer;
use crate::policy::{CapturePolicy, CapturePolicyBuilder};
use crate::queue::PersistentQueue;
use crate::replay::{FlushReport, Replayer};
use crate::storage::{MemoryStorage, StorageBackend};
use crate::transport::Transport;
use std::sync::Arc;

/// Default durable-store namespace.
pub const DEFAULT_STORAGE_KEY: &str = "storeAndForward.pending";

/// The assembled store-and-forward layer.
#[derive(Debug, Clone)]
pub struct StoreAndForward {
    policy: Arc<CapturePolicy>,
    queue: Arc<PersistentQueue>,
    callbacks: CallbackRegistry,
    replayer: Replayer,
    interceptor: Interceptor,
}

impl StoreAndForward {
    pub fn builder() -> StoreAndForwardBuilder {
        StoreAndForwardBuilder::new()
    }

    /// Hook pair to wire into the transport boundary.
    pub fn interceptor(&self) -> Interceptor {
        self.interceptor.clone()
    }

    /// The same hooks as a `tower` layer.
    pub fn layer(&self) -> StoreAndForwardLayer {
        StoreAndForwardLayer::new(self.interceptor.clone())
    }

    /// Registry the host uses to attach replay-success callbacks.
    pub fn callbacks(&self) -> &CallbackRegistry {
        &self.callbacks
    }

    pub fn policy(&self) -> &CapturePolicy {
        &self.policy
    }

    /// Read-only ordered view of the pending queue.
    pub fn pending_requests(&self) -> Vec<RequestDescriptor> {
        self.queue.snapshot()
    }

    pub fn pending_len(&self) -> usize {
        self.queue.len()
    }

    /// Drop all pending requests, in memory and on disk. Idempotent;
    /// intended for host events like logout.
    pub fn clear(&self) {
        self.queue.clear();
    }

    /// Replay all pending requests now, without waiting for a successful
    /// response. Useful when the host has its own connectivity signal.
    pub async fn flush(&self) -> Result<FlushReport, StoreError> {
        self.replayer.flush().await
    }
}

/// Errors produced while assembling a [`StoreAndForward`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// No transport was supplied.
    MissingTransport,
    /// The storage key must be non-empty.
    EmptyStorageKey,
    /// `max_replay_attempts` must be > 0 when set.
    InvalidReplayCeiling,
}

impl std::fmt::Display for BuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildError::MissingTransport => write!(f, "a transport is required"),
            BuildError::EmptyStorageKey => write!(f, "storage key must be non-empty"),
            BuildError::InvalidReplayCeiling => {
                write!(f, "max_replay_attempts must be > 0 when set")
            }
        }
    }
}

impl std::error::Error for BuildError {}

/// Builder for [`StoreAndForward`].
pub struct StoreAndForwardBuilder {
    policy: CapturePolicyBuilder,
    storage: Option<Arc<dyn StorageBackend>>,
    storage_key: String,
    transport: Option<Arc<dyn Transport>>,
    callbacks: CallbackRegistry,
    max_replay_attempts: Option<u32>,
}

impl StoreAndForwardBuilder {
    pub fn new() -> Self {
        Self {
            policy: CapturePolicyBuilder::new(),
            storage: None,
            storage_key: DEFAULT_STORAGE_KEY.to_owned(),
            transport: None,
            callbacks: CallbackRegistry::new(),
            max_replay_attempts: None,
        }
    }

    /// Statuses treated as capturable failures. Default `{0}`.
    pub fn fail_codes<I>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = u16>,
    {
        self.policy = self.policy.fail_codes(codes);
        self
    }

    /// Statuses never captured, overriding every other signal. Default `{404}`.
    pub fn fail_code_exceptions<I>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = u16>,
    {
        self.policy = self.policy.fail_code_exceptions(codes);
        self
    }

    /// Capture every failure whose status is not an exception. Default off.
    pub fn include_all_failing_requests(mut self, include: bool) -> Self {
        self.policy = self.policy.include_all_failing_requests(include);
        self
    }

    /// Durable-store namespace. Pick a unique one per application to avoid
    /// collisions. Default [`DEFAULT_STORAGE_KEY`].
    pub fn storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    /// Durable backend. Defaults to an in-process [`MemoryStorage`], which
    /// does not survive restarts; inject a durable backend for real use.
    pub fn storage<B>(mut self, backend: B) -> Self
    where
        B: StorageBackend + 'static,
    {
        self.storage = Some(Arc::new(backend));
        self
    }

    /// Transport used for original requests' replays.
    pub fn transport<T>(mut self, transport: T) -> Self
    where
        T: Transport + 'static,
    {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Share a callback registry built ahead of time.
    pub fn callbacks(mut self, callbacks: CallbackRegistry) -> Self {
        self.callbacks = callbacks;
        self
    }

    /// Drop a descriptor after this many failed replays. Unset by default:
    /// a failing replay is requeued indefinitely, as in the classic
    /// behavior.
    pub fn max_replay_attempts(mut self, attempts: u32) -> Self {
        self.max_replay_attempts = Some(attempts);
        self
    }

    /// Assemble the layer, loading any previously persisted queue.
    pub fn build(self) -> Result<StoreAndForward, BuildError> {
        if self.storage_key.is_empty() {
            return Err(BuildError::EmptyStorageKey);
        }
        if self.max_replay_attempts == Some(0) {
            return Err(BuildError::InvalidReplayCeiling);
        }
        let transport = self.transport.ok_or(BuildError::MissingTransport)?;
        let storage = self
            .storage
            .unwrap_or_else(|| Arc::new(MemoryStorage::new()));

        let policy = Arc::new(self.policy.build());
        let queue = Arc::new(PersistentQueue::load(storage, self.storage_key));
        let replayer = Replayer::new(
            queue.clone(),
            transport,
            self.callbacks.clone(),
            policy.clone(),
            self.max_replay_attempts,
        );
        let interceptor = Interceptor::new(policy.clone(), queue.clone(), replayer.clone());
        Ok(StoreAndForward { policy, queue, callbacks: self.callbacks, replayer, interceptor })
    }
}

impl Default for StoreAndForwardBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{Rejection, RequestDescriptor, Response};
    use async_trait::async_trait;

    struct AlwaysOk;

    #[async_trait]
    impl Transport for AlwaysOk {
        async fn send(&self, _request: RequestDescriptor) -> Result<Response, Rejection> {
            Ok(Response::new(200))
        }
    }

    #[test]
    fn builder_requires_a_transport() {
        let err = StoreAndForward::builder().build().unwrap_err();
        assert_eq!(err, BuildError::MissingTransport);
    }

    #[test]
    fn builder_rejects_an_empty_storage_key() {
        let err = StoreAndForward::builder()
            .transport(AlwaysOk)
            .storage_key("")
            .build()
            .unwrap_err();
        assert_eq!(err, BuildError::EmptyStorageKey);
    }

    #[test]
    fn builder_rejects_a_zero_replay_ceiling() {
        let err = StoreAndForward::builder()
            .transport(AlwaysOk)
            .max_replay_attempts(0)
            .build()
            .unwrap_err();
        assert_eq!(err, BuildError::InvalidReplayCeiling);
    }

    #[test]
    fn defaults_match_the_classic_configuration() {
        // A shared transport handle works too.
        let store = StoreAndForward::builder()
            .transport(Arc::new(AlwaysOk))
            .build()
            .unwrap();
        assert!(store.policy().fail_codes().contains(&0));
        assert!(store.policy().fail_code_exceptions().contains(&404));
        assert!(!store.policy().include_all_failing_requests());
        assert!(store.pending_requests().is_empty());
    }

    #[test]
    fn policy_options_flow_through() {
        let store = StoreAndForward::builder()
            .transport(AlwaysOk)
            .fail_codes([999])
            .fail_code_exceptions([418])
            .include_all_failing_requests(true)
            .storage_key("custom.pending")
            .build()
            .unwrap();
        assert!(store.policy().should_capture(999, false));
        assert!(store.policy().should_capture(500, false));
        assert!(!store.policy().should_capture(418, true));
    }
}
