//! OAuth flow tests: configuration, code exchange, refresh and token storage

use std::time::Duration;

use basecamp_cli::auth::{Authenticator, CallbackListener, MemoryTokenStore, TokenStore, usable_token};
use basecamp_cli::config::{DEFAULT_REDIRECT_URI, OAuthConfig, resolve_oauth};
use basecamp_cli::errors::BasecampError;
use chrono::{Duration as ChronoDuration, Utc};
use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use test_fixtures::TestEnvironment;

fn authenticator_for(server: &MockServer, oauth: OAuthConfig) -> Authenticator {
    Authenticator::new(oauth).with_endpoints(
        format!("{}/authorization/new", server.uri()),
        format!("{}/authorization/token", server.uri()),
    )
}

fn stored_oauth(env: &TestEnvironment) -> OAuthConfig {
    // Resolved without environment overrides so the host environment can't interfere
    resolve_oauth(env.config.load().unwrap().oauth, None, None).unwrap()
}

#[tokio::test]
async fn test_configure_then_exchange_code_stores_token() {
    let env = TestEnvironment::configured();
    let oauth = stored_oauth(&env);
    assert_eq!(oauth.client_id, "abc");
    assert_eq!(oauth.client_secret, "xyz");
    assert_eq!(oauth.redirect_uri, DEFAULT_REDIRECT_URI);

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/authorization/token"))
        .and(body_string_contains("code=CODE1"))
        .and(body_string_contains("client_id=abc"))
        .and(body_string_contains("client_secret=xyz"))
        .and(body_string_contains("grant_type=authorization_code"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"access_token": "T1", "expires_in": 3600})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let store = MemoryTokenStore::new();
    let before = Utc::now();
    let record = authenticator_for(&server, oauth)
        .exchange_code_for_token("CODE1")
        .await
        .unwrap();
    let after = Utc::now();
    store.save(&record).unwrap();

    let stored = store.load().unwrap().unwrap();
    assert_eq!(stored.access_token, "T1");
    assert_eq!(stored.refresh_token, None);

    let expires_at = stored.expires_at.unwrap();
    assert!(expires_at >= before + ChronoDuration::seconds(3600));
    assert!(expires_at <= after + ChronoDuration::seconds(3600));
    assert_eq!(usable_token(&store).unwrap().access_token, "T1");
}

#[tokio::test]
async fn test_rejected_exchange_reports_server_reason() {
    let env = TestEnvironment::configured();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/authorization/token"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"error": "invalid_client"})))
        .mount(&server)
        .await;

    let err = authenticator_for(&server, stored_oauth(&env))
        .exchange_code_for_token("CODE1")
        .await
        .unwrap_err();

    match &err {
        BasecampError::Authentication { status, reason } => {
            assert_eq!(*status, 401);
            assert_eq!(reason, "invalid_client");
        }
        other => panic!("expected authentication error, got {:?}", other),
    }
    assert!(err.requires_reauth());
}

#[tokio::test]
async fn test_success_without_access_token_is_an_error() {
    let env = TestEnvironment::configured();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token_type": "bearer"})))
        .mount(&server)
        .await;

    let err = authenticator_for(&server, stored_oauth(&env))
        .exchange_code_for_token("CODE1")
        .await
        .unwrap_err();
    assert!(matches!(err, BasecampError::Authentication { .. }));
}

#[tokio::test]
async fn test_out_of_range_expires_in_is_an_authentication_error() {
    let env = TestEnvironment::configured();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/authorization/token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"access_token": "T1", "expires_in": 10_000_000_000_000_i64})),
        )
        .mount(&server)
        .await;

    let err = authenticator_for(&server, stored_oauth(&env))
        .exchange_code_for_token("CODE1")
        .await
        .unwrap_err();

    match err {
        BasecampError::Authentication { status, reason } => {
            assert_eq!(status, 200);
            assert_eq!(reason, "invalid expires_in");
        }
        other => panic!("expected authentication error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_refresh_keeps_refresh_token() {
    let env = TestEnvironment::configured();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/authorization/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=R1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"access_token": "T2", "expires_in": 1209600})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let record = authenticator_for(&server, stored_oauth(&env))
        .refresh_token("R1")
        .await
        .unwrap();

    assert_eq!(record.access_token, "T2");
    assert_eq!(record.refresh_token.as_deref(), Some("R1"));
    assert!(!record.is_expired());
}

#[tokio::test]
async fn test_rotated_refresh_token_replaces_old_one() {
    let env = TestEnvironment::configured();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            json!({"access_token": "T2", "refresh_token": "R2", "expires_in": 60}),
        ))
        .mount(&server)
        .await;

    let record = authenticator_for(&server, stored_oauth(&env))
        .refresh_token("R1")
        .await
        .unwrap();
    assert_eq!(record.refresh_token.as_deref(), Some("R2"));
}

#[tokio::test]
async fn test_redirect_listener_feeds_code_exchange() {
    let env = TestEnvironment::configured();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_string_contains("code=FROM_BROWSER"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "T3"})))
        .expect(1)
        .mount(&server)
        .await;

    let listener = CallbackListener::bind(0, "/callback").unwrap();
    let redirect = format!("http://{}/callback?code=FROM_BROWSER", listener.local_addr());
    let browser = tokio::spawn(async move { reqwest::get(redirect).await.map(|r| r.status()) });

    let code = listener.wait_for_code(Duration::from_secs(5)).await.unwrap();
    let record = authenticator_for(&server, stored_oauth(&env))
        .exchange_code_for_token(&code)
        .await
        .unwrap();

    assert_eq!(record.access_token, "T3");
    assert_eq!(record.expires_at, None);
    assert!(browser.await.unwrap().unwrap().is_success());
}

#[test]
fn test_expired_token_is_not_usable() {
    let store = MemoryTokenStore::new();
    let expired = basecamp_cli::models::TokenRecord::new(
        "T1",
        Some("R1".to_string()),
        Some(Utc::now() - ChronoDuration::seconds(1)),
    );
    store.save(&expired).unwrap();

    let err = usable_token(&store).unwrap_err();
    assert!(matches!(err, BasecampError::TokenExpired));
    assert!(err.to_string().contains("basecamp refresh"));
}

#[test]
fn test_clearing_absent_token_is_ok() {
    let store = MemoryTokenStore::new();
    store.clear().unwrap();
    assert!(store.load().unwrap().is_none());
}
