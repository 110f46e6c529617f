//! Convenience re-exports for common usage.

pub use crate::callbacks::CallbackRegistry;
pub use crate::descriptor::{CallbackId, Rejection, ReplayOutcome, RequestDescriptor, Response};
pub use crate::error::StoreError;
pub use crate::interceptor::Interceptor;
pub use crate::layer::StoreAndForwardLayer;
pub use crate::policy::CapturePolicy;
pub use crate::replay::FlushReport;
pub use crate::storage::{FileStorage, MemoryStorage, StorageBackend};
pub use crate::store::{StoreAndForward, StoreAndForwardBuilder};
pub use crate::transport::Transport;
