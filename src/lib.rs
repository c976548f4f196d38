//! # ferrous-inject
//!
//! Scoped service injection for request pipelines.
//!
//! A [`Dependency`] wraps a factory and exposes the service it produces to
//! request handlers through a per-request [`RequestContext`]. Two scopes
//! decide how long a produced instance is reused:
//!
//! - **Default**: created once, reused for the lifetime of the provider
//! - **Request**: created once per request, reused along that request's chain
//!
//! Tests and configuration code can replace the produced service with
//! [`Dependency::override_with`] and go back to the factory with
//! [`Dependency::clear_override`].
//!
//! ## Quick Start
//!
//! ```rust
//! use ferrous_inject::{Dependency, RequestContext, Scope};
//! use std::sync::Arc;
//!
//! struct UserService {
//!     name: String,
//! }
//!
//! # let rt = tokio::runtime::Runtime::new().unwrap();
//! # rt.block_on(async {
//! let users = Dependency::new(|_ctx| async {
//!     Ok(UserService { name: "foo".to_string() })
//! })
//! .with_scope(Scope::Request);
//!
//! let step = users.middleware("users");
//! let name = step
//!     .run(RequestContext::new(), |ctx| async move {
//!         ctx.require::<UserService>("users").unwrap().name.clone()
//!     })
//!     .await
//!     .unwrap();
//! assert_eq!(name, "foo");
//! # });
//! ```
//!
//! ## Axum
//!
//! With the `axum-integration` feature (on by default),
//! [`Dependency::layer`] returns a `tower::Layer` and [`RequestContext`] is
//! an extractor. See [`axum_integration`].
//!
//! ## Feature flags
//!
//! - `axum-integration`: tower layer and axum extractor
//! - `config`: serde support for [`DependencyOptions`], JSON and environment loading

pub mod context;
pub mod dependency;
pub mod error;
pub mod factory;
pub mod middleware;
pub mod options;
pub mod scope;

#[cfg(feature = "axum-integration")]
pub mod axum_integration;

pub use context::{RequestContext, RequestId};
pub use dependency::Dependency;
pub use error::{BoxError, DependencyError, InjectResult};
pub use factory::Factory;
pub use middleware::Middleware;
pub use options::DependencyOptions;
pub use scope::Scope;

#[cfg(feature = "axum-integration")]
pub use axum_integration::{DependencyLayer, DependencyService};
