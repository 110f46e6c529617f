//! Shared test transport: answers by URL and records everything sent.

use async_trait::async_trait;
use squirrel::{Rejection, RequestDescriptor, Response, Transport};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Default, Clone)]
pub struct ScriptedTransport {
    statuses: Arc<Mutex<HashMap<String, u16>>>,
    sent: Arc<Mutex<Vec<RequestDescriptor>>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer requests for `url` with `status`. Unscripted URLs get 200.
    pub fn respond(&self, url: &str, status: u16) {
        self.statuses.lock().unwrap().insert(url.to_owned(), status);
    }

    pub fn sent(&self) -> Vec<RequestDescriptor> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_urls(&self) -> Vec<String> {
        self.sent().into_iter().map(|r| r.url).collect()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: RequestDescriptor) -> Result<Response, Rejection> {
        self.sent.lock().unwrap().push(request.clone());
        let status = self
            .statuses
            .lock()
            .unwrap()
            .get(&request.url)
            .copied()
            .unwrap_or(200);
        if (200..300).contains(&status) {
            Ok(Response::new(status))
        } else {
            Err(Rejection::new(status, request))
        }
    }
}
