//! Failure-classification policy.
//!
//! Decides whether a failed request should be captured for later replay.
//! The decision is a pure function of configuration and inputs, with a
//! strict precedence:
//!
//! 1. A status in `fail_code_exceptions` is never captured, even when the
//!    request carries the force-capture marker.
//! 2. Otherwise a request is captured when it is force-marked, its status
//!    is a configured fail code, or `include_all_failing_requests` is on.
//!
//! Defaults match the classic browser configuration: fail code `0`
//! (network unreachable), exception `404`.

use std::collections::HashSet;

/// Immutable capture configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturePolicy {
    fail_codes: HashSet<u16>,
    fail_code_exceptions: HashSet<u16>,
    include_all_failing_requests: bool,
}

impl CapturePolicy {
    pub fn builder() -> CapturePolicyBuilder {
        CapturePolicyBuilder::new()
    }

    /// Should a failure with this status survive for replay?
    pub fn should_capture(&self, status: u16, force_capture: bool) -> bool {
        if self.fail_code_exceptions.contains(&status) {
            return false;
        }
        force_capture
            || self.fail_codes.contains(&status)
            || self.include_all_failing_requests
    }

    pub fn fail_codes(&self) -> &HashSet<u16> {
        &self.fail_codes
    }

    pub fn fail_code_exceptions(&self) -> &HashSet<u16> {
        &self.fail_code_exceptions
    }

    pub fn include_all_failing_requests(&self) -> bool {
        self.include_all_failing_requests
    }
}

impl Default for CapturePolicy {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Builder for [`CapturePolicy`].
#[derive(Debug, Clone)]
pub struct CapturePolicyBuilder {
    fail_codes: HashSet<u16>,
    fail_code_exceptions: HashSet<u16>,
    include_all_failing_requests: bool,
}

impl CapturePolicyBuilder {
    pub fn new() -> Self {
        Self {
            fail_codes: HashSet::from([0]),
            fail_code_exceptions: HashSet::from([404]),
            include_all_failing_requests: false,
        }
    }

    /// Replace the set of statuses treated as capturable failures.
    pub fn fail_codes<I>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = u16>,
    {
        self.fail_codes = codes.into_iter().collect();
        self
    }

    /// Replace the set of statuses that are never captured.
    pub fn fail_code_exceptions<I>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = u16>,
    {
        self.fail_code_exceptions = codes.into_iter().collect();
        self
    }

    /// Capture every failure whose status is not an exception.
    pub fn include_all_failing_requests(mut self, include: bool) -> Self {
        self.include_all_failing_requests = include;
        self
    }

    pub fn build(self) -> CapturePolicy {
        CapturePolicy {
            fail_codes: self.fail_codes,
            fail_code_exceptions: self.fail_code_exceptions,
            include_all_failing_requests: self.include_all_failing_requests,
        }
    }
}

impl Default for CapturePolicyBuilder {
    fn default() -> Self {
        Self::new()
    }
}
