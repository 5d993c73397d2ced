//! Mock server helpers for client contract tests

#![allow(dead_code)]

use esgob_client::EsgobClient;
use esgob_core::Credentials;
use std::path::PathBuf;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(format!("{name}.json"))
}

pub fn read_fixture(name: &str) -> String {
    std::fs::read_to_string(fixture_path(name)).expect("fixture exists")
}

/// Serve the fixture named after `operation` (dots become underscores)
pub async fn register_fixture(server: &MockServer, operation: &str) {
    let name = operation.replace('.', "_");
    Mock::given(method("GET"))
        .and(path(format!("/1.0/{operation}")))
        .and(header("accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(read_fixture(&name), "application/json"))
        .expect(1)
        .mount(server)
        .await;
}

/// Serve `body` with `status` and `content_type` for any path
pub async fn register_response(server: &MockServer, status: u16, content_type: &str, body: &str) {
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(status).set_body_raw(body.to_string(), content_type))
        .mount(server)
        .await;
}

/// Client for account `acct` with key `xxxx`, pointed at the mock server
pub fn client_for(server: &MockServer) -> EsgobClient {
    let credentials =
        Credentials::with_endpoint("acct", "xxxx", format!("{}/1.0/", server.uri())).unwrap();
    EsgobClient::new(credentials).unwrap()
}

/// Path and query of the most recent request, e.g. `/1.0/accounts.get?account=acct&...`
pub async fn last_request_path(server: &MockServer) -> String {
    let requests = server.received_requests().await.expect("recording enabled");
    let last = requests.last().expect("at least one request");
    match last.url.query() {
        Some(query) => format!("{}?{}", last.url.path(), query),
        None => last.url.path().to_string(),
    }
}

/// Number of requests received so far
pub async fn request_count(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .map(|requests| requests.len())
        .unwrap_or_default()
}
