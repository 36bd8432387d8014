//! Gateway trust layer
//!
//! Admits only requests carrying the pre-shared `X-GATEWAY-SECRET` value,
//! i.e. requests that came through the internal router. It says nothing
//! about who the caller is. Standalone deployments do not install it.

use std::sync::Arc;
use std::task::{Context, Poll};

use axum::http::Request;
use axum::response::{IntoResponse, Response};
use futures::future::BoxFuture;
use secrecy::{ExposeSecret, SecretString};
use subtle::ConstantTimeEq;
use tower::{Layer, Service};
use tracing::warn;

use crate::error::AuthError;
use crate::metrics::GATEWAY_REJECTIONS;

/// Header carrying the shared secret.
pub const GATEWAY_SECRET_HEADER: &str = "x-gateway-secret";

/// Layer installing [`GatewayTrustService`].
#[derive(Clone)]
pub struct GatewayTrustLayer {
    secret: Arc<SecretString>,
}

impl GatewayTrustLayer {
    /// Layer expecting `secret` in every request.
    pub fn new(secret: SecretString) -> Self {
        Self {
            secret: Arc::new(secret),
        }
    }
}

impl<S> Layer<S> for GatewayTrustLayer {
    type Service = GatewayTrustService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        GatewayTrustService {
            inner,
            secret: Arc::clone(&self.secret),
        }
    }
}

/// Rejects with 401 before `inner` is called unless the header matches.
pub struct GatewayTrustService<S> {
    inner: S,
    secret: Arc<SecretString>,
}

impl<S: Clone> Clone for GatewayTrustService<S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            secret: Arc::clone(&self.secret),
        }
    }
}

impl<S> GatewayTrustService<S> {
    fn is_trusted<B>(&self, req: &Request<B>) -> bool {
        req.headers()
            .get(GATEWAY_SECRET_HEADER)
            .is_some_and(|value| {
                value
                    .as_bytes()
                    .ct_eq(self.secret.expose_secret().as_bytes())
                    .into()
            })
    }
}

impl<S, B> Service<Request<B>> for GatewayTrustService<S>
where
    S: Service<Request<B>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<B>) -> Self::Future {
        if !self.is_trusted(&req) {
            GATEWAY_REJECTIONS.inc();
            warn!(
                method = %req.method(),
                path = %req.uri().path(),
                "Rejected request without valid gateway secret"
            );
            return Box::pin(async { Ok(AuthError::GatewayRejected.into_response()) });
        }

        // The clone may not be ready; swap so the instance polled ready is
        // the one that serves this request.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        Box::pin(async move { inner.call(req).await })
    }
}
