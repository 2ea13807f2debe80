use axum::{Router, http::StatusCode, response::IntoResponse};
use axum_test::TestServer;
use basic_oauth::{
    AppState,
    api::build_router,
    config::{AppConfig, CredentialConfig},
    error::{SessionError, StoreError},
    response::ErrorBody,
    session::SessionStore,
};
use std::time::Duration;

#[test]
fn test_store_error_display() {
    let timeout_err = StoreError::Timeout(Duration::from_millis(500));
    assert!(
        timeout_err
            .to_string()
            .contains("Session store did not answer within 500ms")
    );

    let backend_err = StoreError::Backend("connection refused".to_string());
    assert!(
        backend_err
            .to_string()
            .contains("Session store backend error: connection refused")
    );
}

#[test]
fn test_session_error_from_store_error() {
    let err: SessionError = StoreError::Backend("broken pipe".to_string()).into();
    match err {
        SessionError::StoreUnavailable(StoreError::Backend(ref msg)) => {
            assert_eq!(msg, "broken pipe");
        }
        _ => panic!("Unexpected SessionError variant"),
    }
    assert!(err.to_string().contains("broken pipe"));
}

#[test]
fn test_session_error_codes_and_status() {
    let cases = [
        (
            SessionError::InvalidRequest,
            "invalid_request",
            StatusCode::BAD_REQUEST,
        ),
        (
            SessionError::UnsupportedGrantType,
            "unsupported_grant_type",
            StatusCode::BAD_REQUEST,
        ),
        (
            SessionError::InvalidGrant,
            "invalid_grant",
            StatusCode::BAD_REQUEST,
        ),
        (
            SessionError::StoreUnavailable(StoreError::Timeout(Duration::from_secs(2))),
            "temporarily_unavailable",
            StatusCode::SERVICE_UNAVAILABLE,
        ),
        (
            SessionError::TokenGeneration("entropy source failed".to_string()),
            "server_error",
            StatusCode::INTERNAL_SERVER_ERROR,
        ),
    ];

    for (err, code, status) in cases {
        assert_eq!(err.code(), code);
        assert_eq!(err.status(), status);
        assert_eq!(err.is_server_fault(), status.is_server_error());
    }
}

#[test]
fn test_client_error_display_is_the_code() {
    assert_eq!(SessionError::InvalidGrant.to_string(), "invalid_grant");
    assert_eq!(SessionError::InvalidRequest.to_string(), "invalid_request");
}

#[test]
fn test_server_fault_response_hides_detail() {
    let err = SessionError::StoreUnavailable(StoreError::Backend(
        "redis://:secret@cache:6379 refused".to_string(),
    ));
    let response = err.into_response();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(response.headers()["cache-control"], "no-store");
}

/// Store whose backend is always down.
#[derive(Clone)]
struct UnreachableStore;

impl SessionStore for UnreachableStore {
    async fn create(&self, _: &str, _: &[String], _: Duration) -> Result<(), StoreError> {
        Err(StoreError::Backend("connection refused".into()))
    }

    async fn read_prefix(&self, _: &str, _: usize) -> Result<Vec<String>, StoreError> {
        Err(StoreError::Backend("connection refused".into()))
    }

    async fn refresh_ttl(&self, _: &str, _: Duration) -> Result<bool, StoreError> {
        Err(StoreError::Backend("connection refused".into()))
    }

    async fn delete(&self, _: &str) -> Result<(), StoreError> {
        Err(StoreError::Backend("connection refused".into()))
    }
}

fn create_unreachable_server() -> TestServer {
    let config = AppConfig {
        secure_cookie: false,
        credentials: vec![CredentialConfig {
            username: "johndoe".into(),
            password: "foobar42".into(),
        }],
        ..AppConfig::default()
    };
    let state = AppState::new(UnreachableStore, config);
    TestServer::new(build_router(state, Router::new())).expect("create test server")
}

#[tokio::test]
async fn test_login_reports_store_outage() {
    let server = create_unreachable_server();

    let response = server
        .post("/login")
        .form(&[
            ("grant_type", "password"),
            ("username", "johndoe"),
            ("password", "foobar42"),
        ])
        .await;

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    assert!(!response.headers().contains_key("set-cookie"));
    let body: ErrorBody = response.json();
    assert_eq!(body.error, "temporarily_unavailable");
    assert!(body.error_description.is_none());
}

#[tokio::test]
async fn test_bad_credentials_never_reach_store() {
    let server = create_unreachable_server();

    let response = server
        .post("/login")
        .form(&[
            ("grant_type", "password"),
            ("username", "johndoe"),
            ("password", "wrong"),
        ])
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: ErrorBody = response.json();
    assert_eq!(body.error, "invalid_grant");
}

#[tokio::test]
async fn test_logout_reports_store_outage() {
    let server = create_unreachable_server();

    let response = server
        .get("/logout")
        .add_query_param("access_token", "some-token")
        .await;

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    let body: ErrorBody = response.json();
    assert_eq!(body.error, "temporarily_unavailable");
}
