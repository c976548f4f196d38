//! Axum web framework integration for ferrous-inject.
//!
//! This module provides:
//! - [`DependencyLayer`], a `tower::Layer` that resolves a service for each
//!   request and attaches it to the request's [`RequestContext`]
//! - a `FromRequestParts` extractor for [`RequestContext`], so handlers can
//!   read what the layers attached
//! - `IntoResponse` for [`DependencyError`]
//!
//! Stacked layers share one context per request: the first layer to see a
//! request creates it, later layers pick it up from the request extensions.
//!
//! ```rust
//! use axum::{routing::get, Router};
//! use ferrous_inject::{Dependency, RequestContext, Scope};
//!
//! struct TestService { name: String }
//!
//! async fn hello(ctx: RequestContext) -> String {
//!     let service = ctx.require::<TestService>("service").unwrap();
//!     format!("Hello {}", service.name)
//! }
//!
//! let dep = Dependency::from_fn(|_| Ok(TestService { name: "foo".into() }))
//!     .with_scope(Scope::Request);
//!
//! let app: Router = Router::new()
//!     .route("/", get(hello))
//!     .layer(dep.layer("service"));
//! ```

use crate::{Dependency, DependencyError, Middleware, RequestContext};
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, Request, StatusCode},
    response::{IntoResponse, Response},
};
use std::any::type_name;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tower::{Layer, Service};

impl<T> Dependency<T>
where
    T: Send + Sync + 'static,
{
    /// Returns a tower layer that attaches the service under `key`.
    ///
    /// # Panics
    ///
    /// Panics if `key` is empty.
    pub fn layer(&self, key: impl Into<String>) -> DependencyLayer<T> {
        DependencyLayer {
            step: self.middleware(key),
        }
    }
}

/// Layer produced by [`Dependency::layer`].
pub struct DependencyLayer<T> {
    step: Middleware<T>,
}

impl<T> DependencyLayer<T> {
    /// The step this layer runs for each request.
    pub fn middleware(&self) -> &Middleware<T> {
        &self.step
    }
}

impl<T> Clone for DependencyLayer<T> {
    fn clone(&self) -> Self {
        Self {
            step: self.step.clone(),
        }
    }
}

impl<T> std::fmt::Debug for DependencyLayer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DependencyLayer")
            .field("step", &self.step)
            .finish()
    }
}

impl<S, T> Layer<S> for DependencyLayer<T> {
    type Service = DependencyService<S, T>;

    fn layer(&self, inner: S) -> Self::Service {
        DependencyService {
            inner,
            step: self.step.clone(),
        }
    }
}

/// Service wrapper installed by [`DependencyLayer`].
pub struct DependencyService<S, T> {
    inner: S,
    step: Middleware<T>,
}

impl<S: Clone, T> Clone for DependencyService<S, T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            step: self.step.clone(),
        }
    }
}

impl<S, T, B> Service<Request<B>> for DependencyService<S, T>
where
    S: Service<Request<B>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
    T: Send + Sync + 'static,
    B: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<B>) -> Self::Future {
        // Keep the service that was driven to readiness; leave a fresh clone behind.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let step = self.step.clone();

        Box::pin(async move {
            let mut ctx = req
                .extensions_mut()
                .remove::<RequestContext>()
                .unwrap_or_default();

            if let Err(source) = step.attach(&mut ctx).await {
                let err = DependencyError::Factory {
                    service: type_name::<T>(),
                    source,
                };
                tracing::error!(
                    key = step.key(),
                    request = %ctx.id(),
                    error = %err,
                    "dependency factory failed"
                );
                return Ok(err.into_response());
            }

            req.extensions_mut().insert(ctx);
            inner.call(req).await
        })
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = DependencyError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestContext>()
            .cloned()
            .ok_or(DependencyError::NoContext)
    }
}

impl IntoResponse for DependencyError {
    fn into_response(self) -> Response {
        (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
    }
}
