//! End-to-end capture, persistence, and replay scenarios.

mod common;

use common::ScriptedTransport;
use squirrel::{
    FileStorage, MemoryStorage, Rejection, RequestDescriptor, Response, StorageBackend,
    StoreAndForward,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn store_with(transport: &ScriptedTransport) -> StoreAndForward {
    StoreAndForward::builder()
        .transport(transport.clone())
        .build()
        .unwrap()
}

#[tokio::test]
async fn network_failure_is_captured_and_replayed_once() {
    let transport = ScriptedTransport::new();
    let store = store_with(&transport);
    let interceptor = store.interceptor();

    // GET /missing fails with status 0 (network unreachable).
    let rejection = Rejection::new(0, RequestDescriptor::get("/missing"));
    interceptor.on_response_error(rejection);
    assert_eq!(store.pending_len(), 1);
    assert_eq!(store.pending_requests()[0].url, "/missing");

    // A later GET /exists succeeds with 201, which triggers the flush.
    let response = interceptor.on_response_success(Response::new(201)).await;
    assert_eq!(response.status, 201);

    assert_eq!(store.pending_len(), 0);
    assert_eq!(transport.sent_urls(), vec!["/missing"]);
}

#[tokio::test]
async fn not_found_is_never_captured_under_default_policy() {
    let transport = ScriptedTransport::new();
    let store = store_with(&transport);

    store
        .interceptor()
        .on_response_error(Rejection::new(404, RequestDescriptor::get("/missing")));
    assert_eq!(store.pending_len(), 0);
}

#[tokio::test]
async fn default_exception_overrides_force_capture() {
    let transport = ScriptedTransport::new();
    let store = store_with(&transport);

    let request = RequestDescriptor::get("/missing").force_capture();
    store.interceptor().on_response_error(Rejection::new(404, request));
    assert_eq!(store.pending_len(), 0);
}

#[tokio::test]
async fn force_capture_wins_when_the_status_is_not_an_exception() {
    let transport = ScriptedTransport::new();
    // 404 removed from the exception set; force now applies to it.
    let store = StoreAndForward::builder()
        .transport(transport.clone())
        .fail_code_exceptions([])
        .build()
        .unwrap();

    let request = RequestDescriptor::get("/missing").force_capture();
    store.interceptor().on_response_error(Rejection::new(404, request));
    assert_eq!(store.pending_len(), 1);

    // Without the marker the same failure is still not capturable.
    store
        .interceptor()
        .on_response_error(Rejection::new(404, RequestDescriptor::get("/other")));
    assert_eq!(store.pending_len(), 1);
}

#[tokio::test]
async fn custom_fail_codes_replace_the_default_set() {
    let transport = ScriptedTransport::new();
    let store = StoreAndForward::builder()
        .transport(transport.clone())
        .fail_codes([999])
        .build()
        .unwrap();
    let interceptor = store.interceptor();

    interceptor.on_response_error(Rejection::new(999, RequestDescriptor::get("/a")));
    assert_eq!(store.pending_len(), 1);

    // 0 is no longer an active fail code, 404 is still the exception.
    interceptor.on_response_error(Rejection::new(0, RequestDescriptor::get("/b")));
    interceptor.on_response_error(Rejection::new(404, RequestDescriptor::get("/c")));
    assert_eq!(store.pending_len(), 1);
}

#[tokio::test]
async fn queue_survives_a_restart() {
    let storage = MemoryStorage::new();
    let transport = ScriptedTransport::new();

    {
        let store = StoreAndForward::builder()
            .transport(transport.clone())
            .storage(storage.clone())
            .build()
            .unwrap();
        store
            .interceptor()
            .on_response_error(Rejection::new(0, RequestDescriptor::get("/missing")));
        assert_eq!(store.pending_len(), 1);
    }

    // A fresh instance over the same backend sees the persisted queue and
    // replays it on the first successful response.
    let store = StoreAndForward::builder()
        .transport(transport.clone())
        .storage(storage)
        .build()
        .unwrap();
    assert_eq!(store.pending_requests()[0].url, "/missing");

    store.interceptor().on_response_success(Response::new(200)).await;
    assert_eq!(store.pending_len(), 0);
    assert_eq!(transport.sent_urls(), vec!["/missing"]);
}

#[tokio::test]
async fn file_backed_queue_survives_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    let transport = ScriptedTransport::new();

    {
        let store = StoreAndForward::builder()
            .transport(transport.clone())
            .storage(FileStorage::new(dir.path()))
            .storage_key("app.pending")
            .build()
            .unwrap();
        store
            .interceptor()
            .on_response_error(Rejection::new(0, RequestDescriptor::post("/reports")));
    }

    let store = StoreAndForward::builder()
        .transport(transport)
        .storage(FileStorage::new(dir.path()))
        .storage_key("app.pending")
        .build()
        .unwrap();
    let pending = store.pending_requests();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].method, "POST");
    assert_eq!(pending[0].url, "/reports");
}

#[tokio::test]
async fn clear_resets_queue_and_store_idempotently() {
    let storage = MemoryStorage::new();
    let transport = ScriptedTransport::new();
    let store = StoreAndForward::builder()
        .transport(transport)
        .storage(storage.clone())
        .storage_key("app.pending")
        .build()
        .unwrap();

    store
        .interceptor()
        .on_response_error(Rejection::new(0, RequestDescriptor::get("/missing")));
    assert_eq!(store.pending_len(), 1);

    store.clear();
    assert_eq!(store.pending_len(), 0);
    assert!(storage.get("app.pending").unwrap().is_none());

    store.clear();
    assert_eq!(store.pending_len(), 0);
    assert!(storage.get("app.pending").unwrap().is_none());
}

#[tokio::test]
async fn replay_success_callback_fires_with_the_outcome() {
    let transport = ScriptedTransport::new();
    let store = store_with(&transport);
    let calls = Arc::new(AtomicUsize::new(0));
    let calls_clone = calls.clone();
    store.callbacks().register("reports.saved", move |outcome| {
        assert_eq!(outcome.request.url, "/reports");
        assert_eq!(outcome.response.status, 200);
        calls_clone.fetch_add(1, Ordering::SeqCst);
    });

    let request = RequestDescriptor::post("/reports").on_replay_success("reports.saved");
    store.interceptor().on_response_error(Rejection::new(0, request));
    store.interceptor().on_response_success(Response::new(200)).await;

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(store.pending_len(), 0);
}

#[tokio::test]
async fn failing_replay_is_requeued_then_dropped_at_the_ceiling() {
    let transport = ScriptedTransport::new();
    transport.respond("/down", 0);
    let store = StoreAndForward::builder()
        .transport(transport.clone())
        .max_replay_attempts(2)
        .build()
        .unwrap();

    store
        .interceptor()
        .on_response_error(Rejection::new(0, RequestDescriptor::get("/down")));

    let first = store.flush().await.unwrap();
    assert_eq!(first.requeued, 1);
    assert_eq!(store.pending_len(), 1);

    let second = store.flush().await.unwrap();
    assert_eq!(second.dropped, 1);
    assert_eq!(store.pending_len(), 0);

    assert!(store.flush().await.unwrap().is_noop());
    assert_eq!(transport.sent_urls(), vec!["/down", "/down"]);
}

#[tokio::test]
async fn flush_on_empty_queue_is_safe_from_outside() {
    let transport = ScriptedTransport::new();
    let store = store_with(&transport);
    let report = store.flush().await.unwrap();
    assert!(report.is_noop());
    assert!(transport.sent_urls().is_empty());
}
