//! Replay of captured requests once connectivity returns.

use crate::callbacks::CallbackRegistry;
use crate::descriptor::ReplayOutcome;
use crate::error::StoreError;
use crate::policy::CapturePolicy;
use crate::queue::PersistentQueue;
use crate::transport::Transport;
use std::sync::Arc;

/// Summary of one flush pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushReport {
    /// Descriptors taken from the queue and dispatched.
    pub replayed: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Failed replays captured again for the next flush.
    pub requeued: usize,
    /// Failed replays discarded at the replay ceiling.
    pub dropped: usize,
}

impl FlushReport {
    /// True when the queue was empty and nothing was dispatched.
    pub fn is_noop(&self) -> bool {
        self.replayed == 0
    }
}

/// Drains the queue and resubmits each stored request through the transport.
#[derive(Clone)]
pub struct Replayer {
    queue: Arc<PersistentQueue>,
    transport: Arc<dyn Transport>,
    callbacks: CallbackRegistry,
    policy: Arc<CapturePolicy>,
    max_replay_attempts: Option<u32>,
}

impl std::fmt::Debug for Replayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Replayer")
            .field("queue", &self.queue)
            .field("max_replay_attempts", &self.max_replay_attempts)
            .finish_non_exhaustive()
    }
}

impl Replayer {
    pub(crate) fn new(
        queue: Arc<PersistentQueue>,
        transport: Arc<dyn Transport>,
        callbacks: CallbackRegistry,
        policy: Arc<CapturePolicy>,
        max_replay_attempts: Option<u32>,
    ) -> Self {
        Self { queue, transport, callbacks, policy, max_replay_attempts }
    }

    /// Resubmit every captured request in insertion order.
    ///
    /// An empty queue returns immediately without touching storage.
    /// Otherwise the queue and its durable record are cleared *before* the
    /// first resubmission: a crash mid-replay drops requests instead of
    /// duplicating already-replayed ones.
    ///
    /// Each replay is independent. A failing replay re-enters the capture
    /// decision and may be queued for the next flush, so partial success
    /// is the expected steady state, not an error. Requeues that cannot be
    /// persisted are the one thing that surfaces as `Err`; remaining
    /// replays still run first, and the error reports the first write
    /// failure encountered.
    pub async fn flush(&self) -> Result<FlushReport, StoreError> {
        if self.queue.is_empty() {
            return Ok(FlushReport::default());
        }
        let batch = self.queue.drain()?;
        let mut report = FlushReport { replayed: batch.len(), ..FlushReport::default() };
        let mut persist_failure: Option<StoreError> = None;

        for mut request in batch {
            request.replay_attempts = request.replay_attempts.saturating_add(1);
            match self.transport.send(request.clone()).await {
                Ok(response) => {
                    report.succeeded += 1;
                    if let Some(id) = request.on_replay_success.clone() {
                        let outcome = ReplayOutcome { request, response };
                        self.callbacks.notify(&id, &outcome);
                    }
                }
                Err(rejection) => {
                    report.failed += 1;
                    // Same decision the interceptor applies to a first-time
                    // failure; the rejection echoes the attempted request.
                    let request = rejection.request;
                    if !self.policy.should_capture(rejection.status, request.force_capture) {
                        continue;
                    }
                    if self.reached_ceiling(request.replay_attempts) {
                        report.dropped += 1;
                        tracing::warn!(
                            url = %request.url,
                            attempts = request.replay_attempts,
                            "dropping request at the replay ceiling"
                        );
                        continue;
                    }
                    match self.queue.add(request) {
                        Ok(()) => report.requeued += 1,
                        Err(err) => {
                            tracing::error!(error = %err, "failed to requeue a failing replay");
                            persist_failure.get_or_insert(err);
                        }
                    }
                }
            }
        }

        tracing::debug!(
            replayed = report.replayed,
            succeeded = report.succeeded,
            failed = report.failed,
            requeued = report.requeued,
            dropped = report.dropped,
            "flush complete"
        );
        match persist_failure {
            Some(err) => Err(err),
            None => Ok(report),
        }
    }

    fn reached_ceiling(&self, attempts: u32) -> bool {
        self.max_replay_attempts.is_some_and(|max| attempts >= max)
    }
}
