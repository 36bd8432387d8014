//! End-to-end scenarios against the router, driven in-process with
//! `tower::ServiceExt::oneshot`.

mod common;

use auth_service::jwt::TokenType;
use auth_service::middleware::GATEWAY_SECRET_HEADER;
use auth_service::users::{InMemoryUserStore, UserStore};
use auth_service::{build_router, AppState, RouterOptions};
use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE, COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, Method, Request, StatusCode};
use axum::Router;
use common::{app_state, keys, register_alice, settings, REFRESH_TTL, TEST_BCRYPT_COST};
use secrecy::SecretString;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tower::ServiceExt;

const SECRET: &str = "gateway-shared-secret";

struct TestResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl TestResponse {
    fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }

    fn set_cookie(&self) -> Option<&str> {
        self.headers.get(SET_COOKIE).map(|v| v.to_str().unwrap())
    }

    fn refresh_token(&self) -> String {
        let cookie = self.set_cookie().expect("Set-Cookie header");
        cookie
            .split(';')
            .next()
            .and_then(|pair| pair.strip_prefix("refreshToken="))
            .unwrap()
            .to_string()
    }

    fn access_token(&self) -> String {
        self.json()["responseData"]["accessToken"]
            .as_str()
            .unwrap()
            .to_string()
    }
}

async fn send(app: &Router, request: Request<Body>) -> TestResponse {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec();

    TestResponse {
        status,
        headers,
        body,
    }
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn post_with_cookie(uri: &str, cookie: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(COOKIE, cookie)
        .body(Body::empty())
        .unwrap()
}

fn empty(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn standalone_app() -> (Router, AppState) {
    let state = app_state();
    register_alice(&state.users).await;
    (build_router(state.clone(), RouterOptions::default()), state)
}

fn alice_login() -> Request<Body> {
    post_json(
        "/auth/login",
        &json!({"identifier": "alice", "password": "correct-horse"}),
    )
}

#[tokio::test]
async fn test_login_sets_refresh_cookie_and_returns_access_token() {
    let (app, state) = standalone_app().await;

    let response = send(&app, alice_login()).await;
    assert_eq!(response.status, StatusCode::OK);

    let cookie = response.set_cookie().unwrap();
    assert!(cookie.starts_with("refreshToken="));
    for attribute in ["HttpOnly", "Secure", "SameSite=Lax", "Path=/auth/refresh"] {
        assert!(cookie.contains(attribute), "missing {attribute} in {cookie}");
    }
    assert!(cookie.contains(&format!("Max-Age={REFRESH_TTL}")));

    let json = response.json();
    assert_eq!(json["statusCode"], "OK");
    assert_eq!(json["responseStatus"], 0);
    assert_eq!(json["responseMessage"], "Access Token Successfully Created");

    let access = response.access_token();
    assert!(!access.is_empty());
    let claims = state.verifier.verify_access_token(&access).unwrap();
    assert_eq!(claims.roles(), vec!["ROLE_USER".to_string()]);

    // The refresh token names the user id, not the login identifier
    let subject = state.verifier.verify_refresh_token(&response.refresh_token()).unwrap();
    assert_eq!(subject, claims.sub);
    assert_ne!(subject, "alice");
}

#[tokio::test]
async fn test_login_by_email() {
    let (app, _) = standalone_app().await;

    let response = send(
        &app,
        post_json(
            "/auth/login",
            &json!({"identifier": "alice@example.com", "password": "correct-horse"}),
        ),
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_login_wrong_password() {
    let (app, _) = standalone_app().await;

    let response = send(
        &app,
        post_json("/auth/login", &json!({"identifier": "alice", "password": "nope"})),
    )
    .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.set_cookie().is_none());
    let json = response.json();
    assert_eq!(json["responseMessage"], "Invalid credentials");
    assert_eq!(json["responseStatus"], 1);
}

#[tokio::test]
async fn test_login_validation_and_bad_json() {
    let (app, _) = standalone_app().await;

    let response = send(&app, post_json("/auth/login", &json!({"identifier": ""}))).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    let json = response.json();
    assert_eq!(json["responseMessage"], "Validation Failed");
    assert_eq!(json["responseData"]["identifier"], "Username or Email is required");
    assert_eq!(json["responseData"]["password"], "Password is required");

    let garbled = Request::builder()
        .method(Method::POST)
        .uri("/auth/login")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = send(&app, garbled).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["statusCode"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_refresh_rotates_cookie() {
    let (app, state) = standalone_app().await;
    let login = send(&app, alice_login()).await;
    let old_refresh = login.refresh_token();

    let response = send(
        &app,
        post_with_cookie("/auth/refresh", &format!("refreshToken={old_refresh}")),
    )
    .await;

    assert_eq!(response.status, StatusCode::OK);
    let new_refresh = response.refresh_token();
    assert_ne!(new_refresh, old_refresh);
    assert!(state.verifier.verify_refresh_token(&new_refresh).is_ok());

    let claims = state.verifier.verify_access_token(&response.access_token()).unwrap();
    assert_eq!(claims.roles(), vec!["ROLE_USER".to_string()]);
}

#[tokio::test]
async fn test_refresh_with_expired_cookie() {
    let (app, state) = standalone_app().await;
    let login = send(&app, alice_login()).await;
    let user_id = state
        .verifier
        .verify_refresh_token(&login.refresh_token())
        .unwrap();

    let long_ago = chrono::Utc::now().timestamp() - i64::try_from(REFRESH_TTL).unwrap() - 10;
    let expired = state
        .issuer
        .issue_at(TokenType::Refresh, &user_id, Map::new(), long_ago)
        .unwrap();

    let response = send(
        &app,
        post_with_cookie("/auth/refresh", &format!("refreshToken={expired}")),
    )
    .await;

    assert!(response.status.is_client_error());
    assert!(response.set_cookie().is_none());
    let json = response.json();
    assert_eq!(json["responseMessage"], "Token expired");
    assert_eq!(json["responseData"], json!({}));
}

#[tokio::test]
async fn test_refresh_without_cookie() {
    let (app, _) = standalone_app().await;

    let response = send(&app, empty(Method::POST, "/auth/refresh")).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.set_cookie().is_none());
    assert_eq!(response.json()["responseMessage"], "Refresh Token Missing in Cookie");

    let response = send(&app, post_with_cookie("/auth/refresh", "refreshToken=")).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_refresh_with_access_token_in_cookie() {
    let (app, _) = standalone_app().await;
    let access = send(&app, alice_login()).await.access_token();

    let response = send(
        &app,
        post_with_cookie("/auth/refresh", &format!("refreshToken={access}")),
    )
    .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["responseMessage"], "Invalid token type");
}

#[tokio::test]
async fn test_refresh_with_corrupt_cookie_is_server_error() {
    let (app, _) = standalone_app().await;

    let response = send(&app, post_with_cookie("/auth/refresh", "refreshToken=not-a-token")).await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(response.set_cookie().is_none());
}

#[tokio::test]
async fn test_signup_then_duplicate() {
    let (app, _) = standalone_app().await;
    let body = json!({"userName": "bob", "email": "bob@example.com", "password": "hunter22"});

    let response = send(&app, post_json("/auth/signup", &body)).await;
    assert_eq!(response.status, StatusCode::CREATED);
    let json = response.json();
    assert_eq!(json["statusCode"], "CREATED");
    assert_eq!(json["responseMessage"], "Created User : bob");
    assert_eq!(json["responseData"]["userName"], "bob");
    assert_eq!(json["responseData"]["userMail"], "bob@example.com");
    assert_eq!(json["responseData"]["userRoles"], json!(["ROLE_USER"]));

    let response = send(&app, post_json("/auth/signup", &body)).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["responseMessage"], "Email Already In Use");

    let same_name = json!({"userName": "bob", "email": "robert@example.com", "password": "x"});
    let response = send(&app, post_json("/auth/signup", &same_name)).await;
    assert_eq!(response.json()["responseMessage"], "Username Already Taken");
}

#[tokio::test]
async fn test_signup_checks_presence_only() {
    let (app, _) = standalone_app().await;

    let response = send(
        &app,
        post_json("/auth/signup", &json!({"userName": "dave", "email": "dave-at-home", "password": "pw"})),
    )
    .await;
    assert_eq!(response.status, StatusCode::CREATED);

    let response = send(&app, post_json("/auth/signup", &json!({"userName": "erin", "email": " "}))).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    let json = response.json();
    assert_eq!(json["responseMessage"], "Validation Failed");
    assert_eq!(json["responseData"]["email"], "Email is required");
    assert_eq!(json["responseData"]["password"], "Password is required");
}

#[tokio::test]
async fn test_new_account_can_log_in() {
    let (app, _) = standalone_app().await;
    send(
        &app,
        post_json(
            "/auth/signup",
            &json!({"userName": "carol", "email": "carol@example.com", "password": "pw"}),
        ),
    )
    .await;

    let response = send(
        &app,
        post_json("/auth/login", &json!({"identifier": "carol", "password": "pw"})),
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_logout_clears_cookie() {
    let (app, _) = standalone_app().await;

    let response = send(&app, empty(Method::POST, "/auth/logout")).await;

    assert_eq!(response.status, StatusCode::OK);
    let cookie = response.set_cookie().unwrap();
    assert!(cookie.starts_with("refreshToken=;"));
    assert!(cookie.contains("Max-Age=0"));
    assert!(cookie.contains("Path=/auth/refresh"));
    assert_eq!(response.json()["responseMessage"], "Logged out successfully");
}

#[tokio::test]
async fn test_introspect_checks_token_type() {
    let (app, state) = standalone_app().await;
    let login = send(&app, alice_login()).await;

    let bearer = |token: String| {
        Request::builder()
            .method(Method::POST)
            .uri("/auth/introspect")
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap()
    };

    let response = send(&app, bearer(login.access_token())).await;
    assert_eq!(response.status, StatusCode::OK);
    let data = &response.json()["responseData"];
    let user_id = state.verifier.verify_refresh_token(&login.refresh_token()).unwrap();
    assert_eq!(data["userId"], user_id);
    assert_eq!(data["roles"], json!(["ROLE_USER"]));

    let response = send(&app, bearer(login.refresh_token())).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = send(&app, empty(Method::POST, "/auth/introspect")).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_health_and_jwks() {
    let (app, state) = standalone_app().await;

    let response = send(&app, empty(Method::GET, "/actuator/health")).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, b"OK - auth-service");

    let expected = serde_json::to_value(state.jwks.public_key_set()).unwrap();
    for path in ["/.well-known/jwks.json", "/auth/.well-known/jwks.json"] {
        let response = send(&app, empty(Method::GET, path)).await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.json(), expected);
    }
}

#[tokio::test]
async fn test_metrics_exposed() {
    let (app, _) = standalone_app().await;
    send(&app, alice_login()).await;

    let response = send(&app, empty(Method::GET, "/actuator/metrics")).await;
    assert_eq!(response.status, StatusCode::OK);
    let text = String::from_utf8(response.body).unwrap();
    assert!(text.contains("auth_service_tokens_issued_total"));
}

#[tokio::test]
async fn test_wrong_method_and_unknown_path() {
    let (app, _) = standalone_app().await;

    let response = send(&app, empty(Method::GET, "/auth/login")).await;
    assert_eq!(response.status, StatusCode::METHOD_NOT_ALLOWED);
    let json = response.json();
    assert_eq!(json["statusCode"], "METHOD_NOT_ALLOWED");
    assert_eq!(json["responseMessage"], "HTTP method not allowed for this endpoint");

    let response = send(&app, empty(Method::GET, "/nowhere")).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

mod gateway {
    use super::*;

    async fn guarded_app() -> (Router, Arc<InMemoryUserStore>) {
        let store = Arc::new(InMemoryUserStore::new());
        let state = AppState::new(keys(), settings(), store.clone(), TEST_BCRYPT_COST);
        register_alice(&state.users).await;

        let options = RouterOptions {
            gateway_secret: Some(SecretString::from(SECRET.to_string())),
            ..RouterOptions::default()
        };
        (build_router(state, options), store)
    }

    fn with_secret(mut request: Request<Body>, secret: &str) -> Request<Body> {
        request
            .headers_mut()
            .insert(GATEWAY_SECRET_HEADER, secret.parse().unwrap());
        request
    }

    fn every_endpoint() -> Vec<Request<Body>> {
        vec![
            empty(Method::GET, "/.well-known/jwks.json"),
            empty(Method::GET, "/auth/.well-known/jwks.json"),
            alice_login(),
            post_with_cookie("/auth/refresh", "refreshToken=whatever"),
            post_json(
                "/auth/signup",
                &json!({"userName": "eve", "email": "eve@example.com", "password": "pw"}),
            ),
            empty(Method::POST, "/auth/logout"),
            empty(Method::POST, "/auth/introspect"),
            empty(Method::GET, "/actuator/health"),
            empty(Method::GET, "/actuator/metrics"),
            empty(Method::GET, "/auth/login"),
            empty(Method::GET, "/nowhere"),
        ]
    }

    async fn assert_all_rejected(app: &Router, secret: Option<&str>) {
        for request in every_endpoint() {
            let uri = request.uri().clone();
            let request = match secret {
                Some(secret) => with_secret(request, secret),
                None => request,
            };

            let response = send(app, request).await;
            assert_eq!(response.status, StatusCode::UNAUTHORIZED, "{uri} was not rejected");
            assert!(response.set_cookie().is_none(), "{uri} set a cookie");
            assert_eq!(response.json()["responseMessage"], "Unauthorized Gateway");
        }
    }

    #[tokio::test]
    async fn test_missing_secret_rejected_everywhere() {
        let (app, store) = guarded_app().await;

        assert_all_rejected(&app, None).await;
        assert!(store.find_by_identifier("eve").await.unwrap().is_none());
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_wrong_secret_rejected_everywhere() {
        let (app, store) = guarded_app().await;

        assert_all_rejected(&app, Some("not-the-secret")).await;
        assert_all_rejected(&app, Some("")).await;
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_correct_secret_passes() {
        let (app, _) = guarded_app().await;

        let response = send(&app, with_secret(alice_login(), SECRET)).await;
        assert_eq!(response.status, StatusCode::OK);
        assert!(response.set_cookie().is_some());

        let response = send(&app, with_secret(empty(Method::GET, "/actuator/health"), SECRET)).await;
        assert_eq!(response.body, b"OK - auth-service");
    }
}
