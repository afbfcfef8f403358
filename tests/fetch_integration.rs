//! Integration tests for the timeline client against a mock API.

mod support;
use support::mock_api;

use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};
use x2pdf_core::fetch::HttpTimeouts;
use x2pdf_core::{ApiCredentials, FetchError, Post, PostSource, TimelineClient};

const TOKEN: &str = "test-bearer-token";

fn client_for(server: &MockServer) -> TimelineClient {
    TimelineClient::with_base_url(
        ApiCredentials::new(TOKEN).unwrap(),
        &server.uri(),
        HttpTimeouts::default(),
    )
    .unwrap()
}

async fn mount_lookup(server: &MockServer, username: &str, id: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/2/users/by/username/{username}")))
        .and(header("authorization", format!("Bearer {TOKEN}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "id": id, "name": "Someone", "username": username }
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_recent_posts_looks_up_user_then_fetches_timeline() {
    let Some(server) = mock_api::start().await else {
        return;
    };
    mount_lookup(&server, "someone", "42").await;
    Mock::given(method("GET"))
        .and(path("/2/users/42/tweets"))
        .and(query_param("max_results", "10"))
        .and(query_param("tweet.fields", "created_at,text"))
        .and(header("authorization", format!("Bearer {TOKEN}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                { "id": "1", "created_at": "2024-06-01T08:00:00.000Z", "text": "shipping rust code" },
                { "id": "2", "created_at": "2024-05-31T08:00:00.000Z", "text": "morning routine" }
            ],
            "meta": { "result_count": 2 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let posts = client_for(&server)
        .recent_posts("@someone", 10)
        .await
        .unwrap();

    assert_eq!(
        posts,
        vec![
            Post::new("2024-06-01T08:00:00.000Z", "shipping rust code"),
            Post::new("2024-05-31T08:00:00.000Z", "morning routine"),
        ]
    );
}

#[tokio::test]
async fn test_fetch_clamps_max_results_to_api_range() {
    let Some(server) = mock_api::start().await else {
        return;
    };
    Mock::given(method("GET"))
        .and(path("/2/users/7/tweets"))
        .and(query_param("max_results", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let posts = client_for(&server).fetch_recent_posts("7", 1).await.unwrap();
    assert!(posts.is_empty());
}

#[tokio::test]
async fn test_timeline_without_data_is_empty() {
    let Some(server) = mock_api::start().await else {
        return;
    };
    mount_lookup(&server, "quiet_account", "9").await;
    Mock::given(method("GET"))
        .and(path("/2/users/9/tweets"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "meta": { "result_count": 0 } })),
        )
        .mount(&server)
        .await;

    let posts = client_for(&server)
        .recent_posts("quiet_account", 5)
        .await
        .unwrap();
    assert!(posts.is_empty());
}

#[tokio::test]
async fn test_unknown_user_is_user_not_found() {
    let Some(server) = mock_api::start().await else {
        return;
    };
    Mock::given(method("GET"))
        .and(path("/2/users/by/username/ghost"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errors": [{ "title": "Not Found Error" }]
        })))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .recent_posts("ghost", 5)
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::UserNotFound { ref username } if username == "ghost"));
}

#[tokio::test]
async fn test_unauthorized_is_auth_error_with_hint() {
    let Some(server) = mock_api::start().await else {
        return;
    };
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .recent_posts("someone", 5)
        .await
        .unwrap_err();
    assert!(err.is_auth(), "expected auth error, got {err:?}");
    assert!(err.to_string().contains("BEARER_TOKEN"));
    assert!(!err.to_string().contains(TOKEN), "token must not leak");
}

#[tokio::test]
async fn test_server_error_is_not_retried() {
    let Some(server) = mock_api::start().await else {
        return;
    };
    Mock::given(method("GET"))
        .and(path("/2/users/by/username/someone"))
        .respond_with(ResponseTemplate::new(503).set_body_string("over capacity"))
        .expect(1)
        .mount(&server)
        .await;

    let err = client_for(&server)
        .recent_posts("someone", 5)
        .await
        .unwrap_err();
    match err {
        FetchError::HttpStatus { status, body, .. } => {
            assert_eq!(status, 503);
            assert_eq!(body, "over capacity");
        }
        other => panic!("expected HttpStatus, got {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_body_is_decode_error() {
    let Some(server) = mock_api::start().await else {
        return;
    };
    Mock::given(method("GET"))
        .and(path("/2/users/by/username/someone"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .lookup_user_id("someone")
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Decode { .. }));
}

#[tokio::test]
async fn test_base_url_with_path_prefix() {
    let Some(server) = mock_api::start().await else {
        return;
    };
    Mock::given(method("GET"))
        .and(path("/proxy/2/users/by/username/someone"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": { "id": "5" } })))
        .mount(&server)
        .await;

    let client = TimelineClient::with_base_url(
        ApiCredentials::new(TOKEN).unwrap(),
        &format!("{}/proxy/", server.uri()),
        HttpTimeouts::default(),
    )
    .unwrap();
    assert_eq!(client.lookup_user_id("someone").await.unwrap(), "5");
}
