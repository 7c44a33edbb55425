//! End-to-end tests against a live listener.
//!
//! One server instance exists per process, so every test in this binary
//! shares the listener started below. Tests that mutate the task list are
//! kept in a single scenario so parallel tests never race on the store.

mod common;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::OnceCell;

use common::http::{send_raw, send_request};
use taskstream::server::{ConcurrencyMode, ServerConfig, ServerLifecycle};

static SERVER: OnceCell<SocketAddr> = OnceCell::new();

fn server_addr() -> SocketAddr {
    *SERVER.get_or_init(|| {
        let config = ServerConfig {
            addr: "127.0.0.1:0".parse().unwrap(),
            concurrency: ConcurrencyMode::PerConnection,
            chunk_size: 50,
            read_timeout: Some(Duration::from_secs(2)),
        };
        let server = ServerLifecycle::instance(config);
        let handle = server.start().expect("bind failed");
        handle.wait_ready().expect("server never became ready");
        let addr = handle.addr();
        // The accept loop runs for the life of the test process.
        std::mem::forget(handle);
        addr
    })
}

#[test]
fn instance_is_process_wide() {
    let addr = server_addr();
    let a = ServerLifecycle::instance(ServerConfig::default());
    let b = ServerLifecycle::instance(ServerConfig::default());
    assert!(Arc::ptr_eq(a, b));
    assert_eq!(a.local_addr(), Some(addr));
}

#[test]
fn get_unknown_path_echoes_metadata() {
    let resp = send_request(
        server_addr(),
        "GET",
        "/some/other/path",
        &[("User-Agent", "server-tests")],
        None,
    );
    assert_eq!(resp.status, 200);
    assert_eq!(resp.header("Content-Type"), Some("application/json"));
    assert_eq!(resp.header("Connection"), Some("close"));

    let body = resp.json();
    assert_eq!(body["status"], "success");
    assert_eq!(body["method"], "GET");
    assert_eq!(body["path"], "/some/other/path");
    assert_eq!(body["message"], "GET request response");
    assert_eq!(body["client_info"]["client_ip"], "127.0.0.1");
    assert_eq!(body["client_info"]["user_agent"], "server-tests");
}

#[test]
fn post_unknown_path_echoes_the_body() {
    let resp = send_request(
        server_addr(),
        "POST",
        "/anything",
        &[("Content-Type", "text/plain")],
        Some("hello over the wire"),
    );
    assert_eq!(resp.status, 200);

    let body = resp.json();
    assert_eq!(body["method"], "POST");
    assert_eq!(body["message"], "POST request data: hello over the wire");
    assert_eq!(body["client_info"]["content_type"], "text/plain");
}

#[test]
fn query_string_is_stripped_from_the_echoed_path() {
    let resp = send_request(server_addr(), "GET", "/echo?x=1&y=2", &[], None);
    assert_eq!(resp.json()["path"], "/echo");
}

#[test]
fn post_without_content_length_is_rejected() {
    let resp = send_raw(
        server_addr(),
        "POST /tasklist/new HTTP/1.1\r\nHost: server-tests\r\n\r\n",
    );
    assert_eq!(resp.status, 400);
    assert_eq!(resp.json()["error"], "400 Bad Request");
}

#[test]
fn garbled_request_line_is_rejected() {
    let resp = send_raw(server_addr(), "NOT A REQUEST\r\n\r\n");
    assert_eq!(resp.status, 400);
}

#[test]
fn long_body_survives_chunked_streaming() {
    // The pretty-printed echo body is well over one 50-char chunk; JSON
    // parsing proves the chunks reassemble byte-exact.
    let long = "x".repeat(400);
    let resp = send_request(server_addr(), "POST", "/big", &[], Some(&long));
    assert!(resp.body.len() > 400);
    assert_eq!(
        resp.json()["message"],
        format!("POST request data: {long}")
    );
}

#[test]
fn task_list_scenario() {
    let addr = server_addr();

    let form = send_request(addr, "GET", "/tasklist/new", &[], None);
    assert_eq!(form.status, 200);
    assert!(form.body.contains("form"));
    assert!(form.body.contains("/tasklist/new"));

    let add = send_request(
        addr,
        "POST",
        "/tasklist/new",
        &[("Content-Type", "application/x-www-form-urlencoded")],
        Some("task=buy+milk"),
    );
    assert_eq!(add.status, 301);
    assert_eq!(add.header("Location"), Some("/tasklist"));
    assert!(add.body.is_empty());

    let decoded = send_request(
        addr,
        "POST",
        "/tasklist/new",
        &[("Content-Type", "application/x-www-form-urlencoded")],
        Some("task=caf%C3%A9"),
    );
    assert_eq!(decoded.status, 301);

    let empty = send_request(
        addr,
        "POST",
        "/tasklist/new",
        &[("Content-Type", "application/x-www-form-urlencoded")],
        Some("task="),
    );
    assert_eq!(empty.status, 301, "empty submissions still redirect");

    let list = send_request(addr, "GET", "/tasklist", &[], None);
    assert_eq!(list.status, 200);
    assert_eq!(
        list.header("Content-Type"),
        Some("text/html; charset=utf-8")
    );
    assert_eq!(list.body.matches("buy milk").count(), 1);
    assert!(list.body.contains("café"));
    assert!(!list.body.contains("No tasks yet"));
    // Insertion order is preserved in the rendered list.
    let first = list.body.find("buy milk").unwrap();
    let second = list.body.find("café").unwrap();
    assert!(first < second);
}
