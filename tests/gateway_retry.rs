//! Gateway retry protocol tests against a scripted mock backend.
//!
//! Covers the full failure table: pass-through success, transparent
//! refresh-and-retry on a first 401, the no-refresh-token boundary, refresh
//! failure escalating to a dead session, the retry-once limit, and
//! single-flight behavior under concurrent 401s.

use std::sync::Arc;

use menumate_core::auth::{MemoryTokens, TokenStore};
use menumate_core::{ApiClient, ApiError};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_with(server: &MockServer, tokens: Arc<MemoryTokens>) -> ApiClient {
    ApiClient::new(server.uri(), tokens as Arc<dyn TokenStore>).expect("client should build")
}

async fn mount_refresh(server: &MockServer, new_token: &str, times: u64) {
    Mock::given(method("POST"))
        .and(path("/auth/refresh-token"))
        .and(body_json(json!({ "refreshToken": "ref" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "accessToken": new_token })))
        .expect(times)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_successful_request_never_calls_refresh() {
    let server = MockServer::start().await;
    let tokens = Arc::new(MemoryTokens::with_pair("acc", "ref"));
    let client = client_with(&server, tokens);
    client.set_access_token(Some("acc".to_string()));

    Mock::given(method("GET"))
        .and(path("/sales/records"))
        .and(header("Authorization", "acc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh-token"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let sales = client.fetch_sales().await.expect("request should succeed");
    assert!(sales.is_empty());
}

#[tokio::test]
async fn test_first_401_refreshes_and_resends_once() {
    let server = MockServer::start().await;
    let tokens = Arc::new(MemoryTokens::with_pair("stale", "ref"));
    let client = client_with(&server, tokens.clone());
    client.set_access_token(Some("stale".to_string()));

    Mock::given(method("GET"))
        .and(path("/sales/records"))
        .and(header("Authorization", "stale"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    mount_refresh(&server, "new", 1).await;
    Mock::given(method("GET"))
        .and(path("/sales/records"))
        .and(header("Authorization", "new"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": 1,
            "staffId": 4,
            "itemName": "Espresso",
            "amount": 3.5,
            "createdAt": "2026-08-01T09:30:00Z"
        }])))
        .expect(1)
        .mount(&server)
        .await;

    let sales = client.fetch_sales().await.expect("retry should succeed");
    assert_eq!(sales.len(), 1);
    assert_eq!(sales[0].item_name, "Espresso");

    // Only the access token rotates; the refresh token stays put.
    assert_eq!(tokens.access_token().unwrap().as_deref(), Some("new"));
    assert_eq!(tokens.refresh_token().unwrap().as_deref(), Some("ref"));
    assert_eq!(client.access_token().as_deref(), Some("new"));
}

#[tokio::test]
async fn test_401_without_refresh_token_surfaces_original_error() {
    let server = MockServer::start().await;
    let tokens = Arc::new(MemoryTokens::new());
    let client = client_with(&server, tokens);
    client.set_access_token(Some("stale".to_string()));

    Mock::given(method("GET"))
        .and(path("/sales/records"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh-token"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = client.fetch_sales().await.expect_err("401 should surface");
    assert!(matches!(err, ApiError::Unauthorized));
}

#[tokio::test]
async fn test_failed_refresh_kills_the_session() {
    let server = MockServer::start().await;
    let tokens = Arc::new(MemoryTokens::with_pair("stale", "ref"));
    let client = client_with(&server, tokens.clone());
    client.set_access_token(Some("stale".to_string()));

    Mock::given(method("GET"))
        .and(path("/sales/records"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh-token"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let err = client.fetch_sales().await.expect_err("session should die");
    assert!(err.is_session_expired(), "got {err:?}");

    // Both persisted tokens and the default header are gone.
    assert_eq!(tokens.access_token().unwrap(), None);
    assert_eq!(tokens.refresh_token().unwrap(), None);
    assert_eq!(client.access_token(), None);
}

#[tokio::test]
async fn test_second_401_is_final_and_refresh_runs_once() {
    let server = MockServer::start().await;
    let tokens = Arc::new(MemoryTokens::with_pair("stale", "ref"));
    let client = client_with(&server, tokens);
    client.set_access_token(Some("stale".to_string()));

    Mock::given(method("GET"))
        .and(path("/sales/records"))
        .and(header("Authorization", "stale"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    mount_refresh(&server, "new", 1).await;
    Mock::given(method("GET"))
        .and(path("/sales/records"))
        .and(header("Authorization", "new"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let err = client.fetch_sales().await.expect_err("retry 401 is final");
    assert!(matches!(err, ApiError::Unauthorized));
}

#[tokio::test]
async fn test_concurrent_401s_share_one_refresh() {
    let server = MockServer::start().await;
    let tokens = Arc::new(MemoryTokens::with_pair("stale", "ref"));
    let client = client_with(&server, tokens);
    client.set_access_token(Some("stale".to_string()));

    Mock::given(method("GET"))
        .and(path("/sales/records"))
        .and(header("Authorization", "stale"))
        .respond_with(ResponseTemplate::new(401))
        .expect(2)
        .mount(&server)
        .await;
    mount_refresh(&server, "new", 1).await;
    Mock::given(method("GET"))
        .and(path("/sales/records"))
        .and(header("Authorization", "new"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(2)
        .mount(&server)
        .await;

    let second = client.clone();
    let (a, b) = tokio::join!(client.fetch_sales(), second.fetch_sales());
    assert!(a.is_ok(), "{a:?}");
    assert!(b.is_ok(), "{b:?}");
}

#[tokio::test]
async fn test_non_401_errors_pass_through_with_backend_message() {
    let server = MockServer::start().await;
    let tokens = Arc::new(MemoryTokens::with_pair("acc", "ref"));
    let client = client_with(&server, tokens);
    client.set_access_token(Some("acc".to_string()));

    Mock::given(method("GET"))
        .and(path("/sales/records"))
        .respond_with(
            ResponseTemplate::new(503).set_body_json(json!({ "message": "down for maintenance" })),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh-token"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = client.fetch_sales().await.expect_err("503 should surface");
    match err {
        ApiError::Backend { status, message } => {
            assert_eq!(status, 503);
            assert_eq!(message, "down for maintenance");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}
