//! Transport hook pair: observe failures, flush on success.
//!
//! The transport boundary calls [`Interceptor::on_response_error`] for
//! every failed exchange and [`Interceptor::on_response_success`] for
//! every successful one. Capture is an observation, not a recovery: the
//! original outcome always flows back to the caller unchanged.

use crate::descriptor::{Rejection, Response};
use crate::policy::CapturePolicy;
use crate::queue::PersistentQueue;
use crate::replay::Replayer;
use std::sync::Arc;

/// Hook pair wired between the transport and the rest of the layer.
///
/// Cheap to clone; clones share the same queue and replayer.
#[derive(Debug, Clone)]
pub struct Interceptor {
    policy: Arc<CapturePolicy>,
    queue: Arc<PersistentQueue>,
    replayer: Replayer,
}

impl Interceptor {
    pub(crate) fn new(
        policy: Arc<CapturePolicy>,
        queue: Arc<PersistentQueue>,
        replayer: Replayer,
    ) -> Self {
        Self { policy, queue, replayer }
    }

    /// Pass a successful response through after triggering a flush.
    ///
    /// Any success is taken as evidence of connectivity, so the flush runs
    /// unconditionally (a no-op on an empty queue). Flush bookkeeping
    /// failures are logged here, never surfaced; callers that need to
    /// observe them flush through
    /// [`StoreAndForward::flush`](crate::store::StoreAndForward::flush).
    pub async fn on_response_success(&self, response: Response) -> Response {
        if let Err(err) = self.replayer.flush().await {
            tracing::error!(error = %err, "flush failed while handling a successful response");
        }
        response
    }

    /// Observe a failed exchange and hand the rejection back for the
    /// caller to propagate.
    ///
    /// When policy says the failure should survive, its request is
    /// persisted. A persistence write failure is logged; the original
    /// failure path is unaffected either way.
    pub fn on_response_error(&self, rejection: Rejection) -> Rejection {
        if self
            .policy
            .should_capture(rejection.status, rejection.request.force_capture)
        {
            if let Err(err) = self.queue.add(rejection.request.clone()) {
                tracing::error!(
                    error = %err,
                    url = %rejection.request.url,
                    "failed to persist captured request"
                );
            }
        }
        rejection
    }
}
