//! Serializable request descriptors and the transport exchange types.
//!
//! A [`RequestDescriptor`] is the unit of persistence: everything needed to
//! reissue a request later, and nothing that cannot survive serialization.
//! There are no function handles or transform pipelines to strip at capture
//! time because the type cannot hold one; replay-success handlers travel as
//! stable [`CallbackId`]s resolved through
//! [`CallbackRegistry`](crate::callbacks::CallbackRegistry).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier for a replay-success callback.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallbackId(pub String);

impl fmt::Display for CallbackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CallbackId {
    fn from(id: &str) -> Self {
        CallbackId(id.to_owned())
    }
}

impl From<String> for CallbackId {
    fn from(id: String) -> Self {
        CallbackId(id)
    }
}

/// The serializable representation of an outbound request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestDescriptor {
    pub method: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub headers: Vec<(String, String)>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<serde_json::Value>,
    /// Capture this request on failure even when its status is not a
    /// configured fail code. Exception codes still win over this marker.
    #[serde(default, skip_serializing_if = "is_false")]
    pub force_capture: bool,
    /// Callback to notify after this request replays successfully.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_replay_success: Option<CallbackId>,
    /// Number of times this descriptor has been dispatched for replay.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub replay_attempts: u32,
}

fn is_false(value: &bool) -> bool {
    !*value
}

fn is_zero(value: &u32) -> bool {
    *value == 0
}

impl RequestDescriptor {
    /// Descriptor with the given method and URL and nothing else.
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            headers: Vec::new(),
            body: None,
            force_capture: false,
            on_replay_success: None,
            replay_attempts: 0,
        }
    }

    /// Shorthand for a GET descriptor.
    pub fn get(url: impl Into<String>) -> Self {
        Self::new("GET", url)
    }

    /// Shorthand for a POST descriptor.
    pub fn post(url: impl Into<String>) -> Self {
        Self::new("POST", url)
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Mark this request for capture regardless of the configured fail codes.
    pub fn force_capture(mut self) -> Self {
        self.force_capture = true;
        self
    }

    /// Register interest in this request's successful replay.
    pub fn on_replay_success(mut self, id: impl Into<CallbackId>) -> Self {
        self.on_replay_success = Some(id.into());
        self
    }
}

/// A successful transport exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub status: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<serde_json::Value>,
}

impl Response {
    pub fn new(status: u16) -> Self {
        Self { status, body: None }
    }

    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// A failed transport exchange.
///
/// Carries the original request so capture can decide its fate. Status `0`
/// means the network was unreachable and no response arrived at all.
#[derive(Debug, Clone, PartialEq)]
pub struct Rejection {
    pub status: u16,
    pub request: RequestDescriptor,
    pub message: Option<String>,
}

impl Rejection {
    pub fn new(status: u16, request: RequestDescriptor) -> Self {
        Self { status, request, message: None }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(message) => write!(
                f,
                "{} {} failed with status {}: {}",
                self.request.method, self.request.url, self.status, message
            ),
            None => write!(
                f,
                "{} {} failed with status {}",
                self.request.method, self.request.url, self.status
            ),
        }
    }
}

impl std::error::Error for Rejection {}

/// Outcome handed to a replay-success callback.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayOutcome {
    pub request: RequestDescriptor,
    pub response: Response,
}
