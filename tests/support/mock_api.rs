//! Mock timeline API shared by the integration tests.
//!
//! [`start`] returns `None` when localhost cannot be bound (some sandboxes
//! forbid it) and the calling test returns early. Set
//! `X2PDF_REQUIRE_SOCKET_TESTS=1` to turn that skip into a failure.

use std::net::TcpListener;

use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const REQUIRE_SOCKETS_ENV: &str = "X2PDF_REQUIRE_SOCKET_TESTS";

fn sockets_required() -> bool {
    std::env::var(REQUIRE_SOCKETS_ENV)
        .is_ok_and(|value| matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
}

/// Starts a mock API server, or `None` when no localhost socket is available.
pub async fn start() -> Option<MockServer> {
    if TcpListener::bind("127.0.0.1:0").is_ok() {
        return Some(MockServer::start().await);
    }

    let message = "[mock-api] cannot bind a localhost socket; timeline API tests cannot run here";
    assert!(!sockets_required(), "{message} ({REQUIRE_SOCKETS_ENV} is set)");
    eprintln!("{message}. Skipping. Set {REQUIRE_SOCKETS_ENV}=1 to fail instead.");
    None
}

/// Serves the user lookup for `username` (resolving to `id`) and that
/// account's timeline with `posts` as its `data` array.
#[allow(dead_code)]
pub async fn mount_timeline(server: &MockServer, username: &str, id: &str, posts: Value) {
    Mock::given(method("GET"))
        .and(path(format!("/2/users/by/username/{username}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": { "id": id } })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/2/users/{id}/tweets")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": posts })))
        .mount(server)
        .await;
}
