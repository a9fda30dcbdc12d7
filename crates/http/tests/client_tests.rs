//! Integration tests for the campus HTTP client

use campus_core::{CredentialStore, Role, Session};
use campus_http::types::LoginRequest;
use campus_http::{CampusClient, ClientError};
use serde_json::json;
use wiremock::matchers::{body_json, header, header_exists, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

fn auth_body(token: &str, id: &str, role: &str) -> serde_json::Value {
    json!({"access_token": token, "id": id, "role": role})
}

fn user_body() -> serde_json::Value {
    json!({
        "user": {
            "id": "u1",
            "email": "student@example.com",
            "age": 30,
            "birthdate": "1995-04-01",
            "city": "Kazan",
            "employment": "employed",
            "is_business_owner": "no",
            "month_income": 1000.0,
            "name": "Student",
            "phone_number": "+79991234567",
            "position_at_work": "engineer",
            "telegram": "@campus_student"
        }
    })
}

#[tokio::test]
async fn test_signin_posts_credentials() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/signin"))
        .and(body_json(json!({"email": "student@example.com", "password": "12345678"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(auth_body("t1", "u1", "User")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = CampusClient::new(mock_server.uri(), CredentialStore::new()).unwrap();
    let response = client
        .signin(&LoginRequest::new("student@example.com", "12345678"))
        .await
        .unwrap();

    assert_eq!(response.access_token, "t1");
    assert_eq!(response.id.as_deref(), Some("u1"));
    assert_eq!(response.role, Some(Role::User));
}

#[tokio::test]
async fn test_profile_carries_current_bearer() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/me"))
        .and(header("authorization", "Bearer abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_body()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = CredentialStore::new();
    store.set_session(Session::authenticated("abc", "u1", Role::User));
    let client = CampusClient::new(mock_server.uri(), store).unwrap();

    let profile = client.me().await.unwrap();
    assert_eq!(profile.user.id, "u1");
    assert_eq!(profile.user.telegram.as_deref(), Some("@campus_student"));
}

#[tokio::test]
async fn test_refresh_never_sends_bearer() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(|request: &Request| {
            if request.headers.contains_key("authorization") {
                ResponseTemplate::new(400)
            } else {
                ResponseTemplate::new(200).set_body_json(auth_body("t2", "u1", "Admin"))
            }
        })
        .mount(&mock_server)
        .await;

    let store = CredentialStore::new();
    store.set_session(Session::authenticated("old", "u1", Role::Admin));
    let client = CampusClient::new(mock_server.uri(), store).unwrap();

    let response = client.refresh().await.unwrap();
    assert_eq!(response.access_token, "t2");
}

#[tokio::test]
async fn test_refresh_cookie_is_sent_back() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/signin"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "refresh_token=long-lived; Path=/; HttpOnly")
                .set_body_json(auth_body("t1", "u1", "User")),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .and(header("cookie", "refresh_token=long-lived"))
        .respond_with(ResponseTemplate::new(200).set_body_json(auth_body("t2", "u1", "User")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = CampusClient::new(mock_server.uri(), CredentialStore::new()).unwrap();
    client
        .signin(&LoginRequest::new("student@example.com", "12345678"))
        .await
        .unwrap();

    let refreshed = client.refresh().await.unwrap();
    assert_eq!(refreshed.access_token, "t2");
}

#[tokio::test]
async fn test_logout_ignores_response_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/logout"))
        .and(header_exists("authorization"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = CredentialStore::new();
    store.set_session(Session::authenticated("abc", "u1", Role::User));
    let client = CampusClient::new(mock_server.uri(), store).unwrap();

    assert!(client.logout().await.is_ok());
}

#[tokio::test]
async fn test_error_handling() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/me"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(403).set_body_string("Forbidden"))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/auth/signin"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&mock_server)
        .await;

    let client = CampusClient::new(mock_server.uri(), CredentialStore::new()).unwrap();

    let result = client.me().await;
    assert!(matches!(result, Err(ClientError::AuthenticationFailed(ref m)) if m == "Unauthorized"));

    let result = client.refresh().await;
    assert!(matches!(result, Err(ClientError::Forbidden(_))));

    let result = client
        .signin(&LoginRequest::new("student@example.com", "12345678"))
        .await;
    match result {
        Err(error @ ClientError::ServerError { status: 500, .. }) => {
            assert!(!error.is_auth_expired());
        }
        other => panic!("Expected server error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_body_is_serialization_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&mock_server)
        .await;

    let client = CampusClient::new(mock_server.uri(), CredentialStore::new()).unwrap();
    let result = client.refresh().await;
    assert!(matches!(result, Err(ClientError::Serialization(_))));
}

#[tokio::test]
async fn test_network_failure_is_request_error() {
    // Nothing listens on the discard port
    let client = CampusClient::new("http://127.0.0.1:9", CredentialStore::new()).unwrap();
    let result = client.refresh().await;
    assert!(matches!(result, Err(ClientError::Request(_))));
}
