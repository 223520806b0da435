//! Client facade: async fetch, helpers and the ping server.

mod common;

use cachenet::base::neterror::NetError;
use cachenet::http::response::{Payload, RequestError};
use cachenet::{FetchError, NetEvent, Request};
use common::{Harness, Outcomes};
use serde_json::json;
use std::sync::{Arc, Mutex};

#[tokio::test]
async fn test_fetch_returns_payload() {
    let h = Harness::new();
    h.transport
        .auto_respond(200, &[("content-type", "application/json")], r#"{"id":7}"#);

    let payload = h.client.fetch(Request::get("/items/7")).await.unwrap();
    assert_eq!(payload, Payload::Json(json!({"id": 7})));

    #[derive(serde::Deserialize)]
    struct Item {
        id: u32,
    }
    let item: Item = payload.json().unwrap();
    assert_eq!(item.id, 7);
}

#[tokio::test]
async fn test_fetch_reports_server_error() {
    let h = Harness::new();
    h.transport.auto_respond(
        422,
        &[("content-type", "application/json")],
        r#"{"error":{"message":"invalid name"}}"#,
    );

    let err = h.client.fetch(Request::post("/items")).await.unwrap_err();
    assert_eq!(
        err,
        FetchError::Failed(RequestError {
            message: "invalid name".to_string(),
            code: 422,
        })
    );
}

#[tokio::test]
async fn test_fetch_offline_is_rejected() {
    let h = Harness::new();
    h.network.set_online(false);

    let err = h.client.fetch(Request::get("/items")).await.unwrap_err();
    assert_eq!(err, FetchError::Rejected(NetError::InternetDisconnected));
    assert_eq!(h.transport.calls(), 0);
}

#[tokio::test]
async fn test_fetch_completed_later() {
    let h = Harness::new();
    let client = h.client.clone();
    let task = tokio::spawn(async move { client.fetch(Request::get("/slow")).await });

    while h.transport.calls() == 0 {
        tokio::task::yield_now().await;
    }
    h.transport.last().respond(200, &[], "done");

    let payload = task.await.unwrap().unwrap();
    assert_eq!(payload, Payload::Raw(bytes::Bytes::from_static(b"done")));
}

#[test]
fn test_json_helpers_force_json() {
    let h = Harness::new();
    let got = Outcomes::<Payload>::default();
    h.client
        .get_json("/cfg", Some(json!({"v": 1})), got.recorder(), |_| {})
        .unwrap();
    assert_eq!(h.transport.last().url().as_deref(), Some("http://localhost/cfg?v=1"));
    h.transport.last().respond(200, &[("content-type", "text/plain")], r#"{"a":true}"#);
    assert_eq!(got.all(), vec![Payload::Json(json!({"a": true}))]);

    h.client
        .post_json("/cfg", json!({"nested": {"ok": 1}}), |_| {}, |_| {})
        .unwrap();
    let handle = h.transport.last();
    assert_eq!(handle.header("content-type").as_deref(), Some("application/json"));
    assert_eq!(
        handle.body().unwrap(),
        bytes::Bytes::from_static(br#"{"nested":{"ok":1}}"#)
    );
}

#[test]
fn test_plain_helpers() {
    let h = Harness::new();
    let got = Outcomes::<Payload>::default();
    let fp = h.client.get("/plain", got.recorder(), |_| {}).unwrap();
    h.transport.last().respond(200, &[], "text");
    assert_eq!(got.all(), vec![Payload::Raw(bytes::Bytes::from_static(b"text"))]);

    let errors = Outcomes::<RequestError>::default();
    let fp2 = h
        .client
        .post("/plain", json!({"a": 1}), |_| {}, errors.recorder())
        .unwrap();
    assert_ne!(fp, fp2);
    h.transport.last().respond(400, &[], "");
    assert_eq!(errors.all()[0].code, 400);
}

#[test]
fn test_connect_to_server_success() {
    let mut h = Harness::new();
    assert!(h.client.use_ping_server());
    assert_eq!(h.client.is_server_connected(), None);

    let result = Arc::new(Mutex::new(None));
    let slot = result.clone();
    h.client
        .connect_to_server(move |ok| *slot.lock().unwrap() = Some(ok))
        .unwrap();

    let handle = h.transport.last();
    assert_eq!(handle.method(), Some(http::Method::POST));
    assert_eq!(handle.url().as_deref(), Some("http://localhost/ping"));
    handle.respond(
        200,
        &[("content-type", "application/json")],
        r#"{"theme":"dark","build":42}"#,
    );

    assert_eq!(*result.lock().unwrap(), Some(true));
    assert_eq!(h.client.is_server_connected(), Some(true));
    assert_eq!(h.client.app_setting("theme").as_deref(), Some("dark"));
    assert_eq!(h.client.app_setting("build").as_deref(), Some("42"));

    // Silent: only the ping outcome is announced.
    assert_eq!(h.drain_events(), vec![NetEvent::PingSuccess]);
}

#[test]
fn test_connect_to_server_failure() {
    let mut h = Harness::new();
    let result = Arc::new(Mutex::new(None));
    let slot = result.clone();
    h.client
        .connect_to_server(move |ok| *slot.lock().unwrap() = Some(ok))
        .unwrap();
    h.transport.last().fail(NetError::ConnectionRefused);

    assert_eq!(*result.lock().unwrap(), Some(false));
    assert_eq!(h.client.is_server_connected(), Some(false));
    assert_eq!(h.drain_events(), vec![NetEvent::PingError]);
}

#[test]
fn test_connect_to_server_offline() {
    let mut h = Harness::new();
    h.network.set_online(false);

    let result = Arc::new(Mutex::new(None));
    let slot = result.clone();
    let err = h
        .client
        .connect_to_server(move |ok| *slot.lock().unwrap() = Some(ok))
        .unwrap_err();

    assert_eq!(err, NetError::InternetDisconnected);
    assert_eq!(*result.lock().unwrap(), Some(false));
    assert_eq!(h.client.is_server_connected(), Some(false));
    let names: Vec<_> = h.drain_events().iter().map(NetEvent::name).collect();
    assert_eq!(names, vec!["offline-no-cache", "ping-error"]);
}

#[test]
fn test_default_headers_management() {
    let h = Harness::new();
    h.client.add_header("Authorization", "Bearer t");
    h.client.send(Request::get("/a")).unwrap();
    assert_eq!(
        h.transport.last().header("authorization").as_deref(),
        Some("Bearer t")
    );

    h.client.remove_header("Authorization");
    h.client.send(Request::get("/b")).unwrap();
    assert_eq!(h.transport.last().header("authorization"), None);

    h.client.add_header("X-A", "1");
    h.client.reset_headers();
    h.client.send(Request::get("/c")).unwrap();
    assert_eq!(h.transport.last().header("x-a"), None);
}

#[test]
fn test_default_header_names_ignore_case() {
    let h = Harness::new();
    h.client.add_header("X-Token", "a");
    h.client.add_header("x-token", "b");
    h.client.send(Request::get("/a")).unwrap();
    assert_eq!(h.transport.last().header("x-token").as_deref(), Some("b"));

    h.client.remove_header("X-TOKEN");
    h.client.send(Request::get("/b")).unwrap();
    assert_eq!(h.transport.last().header("x-token"), None);
}

#[test]
fn test_is_online_reads_probe() {
    let h = Harness::new();
    assert!(h.client.is_online());
    h.network.set_online(false);
    assert!(!h.client.is_online());
}
