#![forbid(unsafe_code)]
#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::all))]

//! # Squirrel 🐿️
//!
//! Store-and-forward resilience for async Rust clients: capture failed
//! requests by policy, persist them across process restarts, and replay
//! them automatically once connectivity returns.
//!
//! ## Features
//!
//! - **Capture policy** with fail codes, exception codes, force-capture
//!   markers, and an include-all switch
//! - **Durable queue** over an injected storage backend (in-memory or
//!   file-backed), fail-open on corrupt local state
//! - **Interceptor hooks** for any transport boundary, plus a `tower`
//!   layer for tower-shaped transports
//! - **Replay** in insertion order with per-request failure containment
//!   and replay-success callbacks resolved by stable id
//!
//! ## Quick Start
//!
//! ```rust
//! use squirrel::{Rejection, RequestDescriptor, Response, StoreAndForward, Transport};
//! use async_trait::async_trait;
//!
//! struct OfflineClient;
//!
//! #[async_trait]
//! impl Transport for OfflineClient {
//!     async fn send(&self, request: RequestDescriptor) -> Result<Response, Rejection> {
//!         // Status 0: the network was unreachable.
//!         Err(Rejection::new(0, request))
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = StoreAndForward::builder()
//!         .fail_codes([0, 503])
//!         .transport(OfflineClient)
//!         .build()
//!         .unwrap();
//!
//!     // The transport boundary reports a failed exchange; policy decides
//!     // it should survive, and the rejection flows back to its caller.
//!     let rejection = Rejection::new(0, RequestDescriptor::get("/reports"));
//!     let _ = store.interceptor().on_response_error(rejection);
//!     assert_eq!(store.pending_len(), 1);
//!
//!     // The next successful response would trigger a replay of /reports.
//! }
//! ```

pub mod callbacks;
pub mod descriptor;
pub mod error;
pub mod interceptor;
pub mod layer;
pub mod policy;
pub mod prelude;
pub mod queue;
pub mod replay;
pub mod storage;
pub mod store;
pub mod transport;

// Re-exports
pub use callbacks::CallbackRegistry;
pub use descriptor::{CallbackId, Rejection, ReplayOutcome, RequestDescriptor, Response};
pub use error::StoreError;
pub use interceptor::Interceptor;
pub use layer::{StoreAndForwardLayer, StoreAndForwardService};
pub use policy::{CapturePolicy, CapturePolicyBuilder};
pub use queue::PersistentQueue;
pub use replay::{FlushReport, Replayer};
pub use storage::{FileStorage, MemoryStorage, StorageBackend, StorageError};
pub use store::{BuildError, StoreAndForward, StoreAndForwardBuilder, DEFAULT_STORAGE_KEY};
pub use transport::Transport;
