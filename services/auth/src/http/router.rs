//! Route table and middleware stack.

use crate::http::handlers;
use crate::jwks::JwksPublisher;
use crate::jwt::{IssuerSettings, TokenIssuer, TokenVerifier};
use crate::keys::KeyMaterial;
use crate::middleware::{GatewayTrustLayer, GATEWAY_SECRET_HEADER};
use crate::refresh::TokenRotator;
use crate::users::{UserService, UserStore};
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, HeaderValue, Method};
use axum::routing::{get, post, MethodRouter};
use axum::Router;
use secrecy::SecretString;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Shared handles for every handler. Cloned per request.
#[derive(Clone)]
pub struct AppState {
    /// Token minting
    pub issuer: Arc<TokenIssuer>,
    /// Token verification
    pub verifier: Arc<TokenVerifier>,
    /// Login pairs and refresh rotation
    pub rotator: Arc<TokenRotator>,
    /// Credential checks and registration
    pub users: Arc<UserService>,
    /// Key set projection
    pub jwks: Arc<JwksPublisher>,
}

impl AppState {
    /// Wire all components around one loaded key pair.
    pub fn new(
        keys: Arc<KeyMaterial>,
        settings: IssuerSettings,
        store: Arc<dyn UserStore>,
        bcrypt_cost: u32,
    ) -> Self {
        let issuer = Arc::new(TokenIssuer::new(Arc::clone(&keys), settings));
        let verifier = Arc::new(TokenVerifier::new(Arc::clone(&keys)));
        let users = Arc::new(UserService::new(store, bcrypt_cost));
        let rotator = Arc::new(TokenRotator::new(
            Arc::clone(&issuer),
            Arc::clone(&verifier),
            Arc::clone(&users),
        ));
        let jwks = Arc::new(JwksPublisher::new(keys));

        AppState {
            issuer,
            verifier,
            rotator,
            users,
            jwks,
        }
    }
}

/// Middleware settings.
#[derive(Debug)]
pub struct RouterOptions {
    /// Installs the gateway trust layer when set
    pub gateway_secret: Option<SecretString>,
    /// Upper bound on handling a single request
    pub request_timeout: Duration,
    /// Browser origin allowed to call with credentials
    pub cors_allowed_origin: HeaderValue,
}

impl Default for RouterOptions {
    fn default() -> Self {
        RouterOptions {
            gateway_secret: None,
            request_timeout: Duration::from_secs(30),
            cors_allowed_origin: HeaderValue::from_static("http://localhost:5173"),
        }
    }
}

/// Build the service router with its middleware stack.
pub fn build_router(state: AppState, options: RouterOptions) -> Router {
    let router = Router::new()
        .route("/.well-known/jwks.json", only(get(handlers::jwks)))
        .route("/auth/.well-known/jwks.json", only(get(handlers::jwks)))
        .route("/auth/login", only(post(handlers::login)))
        .route("/auth/refresh", only(post(handlers::refresh)))
        .route("/auth/signup", only(post(handlers::signup)))
        .route("/auth/logout", only(post(handlers::logout)))
        .route("/auth/introspect", only(post(handlers::introspect)))
        .route("/actuator/health", only(get(handlers::health)))
        .route("/actuator/metrics", only(get(handlers::prometheus_metrics)))
        .fallback(handlers::not_found)
        .with_state(state)
        .layer(TimeoutLayer::new(options.request_timeout))
        .layer(cors(options.cors_allowed_origin))
        .layer(TraceLayer::new_for_http());

    // Outermost, so rejected requests reach nothing else
    match options.gateway_secret {
        Some(secret) => router.layer(GatewayTrustLayer::new(secret)),
        None => router,
    }
}

fn only(route: MethodRouter<AppState>) -> MethodRouter<AppState> {
    route.fallback(handlers::method_not_allowed)
}

fn cors(origin: HeaderValue) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            CONTENT_TYPE,
            AUTHORIZATION,
            HeaderName::from_static(GATEWAY_SECRET_HEADER),
        ])
}
