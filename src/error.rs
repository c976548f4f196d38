//! Error types for service injection.

use std::error::Error;

/// Error produced by a service factory.
///
/// Factories report failures as a boxed error so that database drivers,
/// HTTP clients and hand-written errors can all be returned without an
/// adapter. [`Dependency::resolve`](crate::Dependency::resolve) hands this
/// value back to the caller exactly as the factory produced it.
pub type BoxError = Box<dyn Error + Send + Sync>;

/// Errors raised around the injection pipeline.
///
/// Resolution itself never fails on its own account: a failing factory is
/// surfaced through [`BoxError`] untouched. `DependencyError` covers the
/// places where the pipeline has to *describe* a failure, such as a handler
/// asking for a key no layer attached, or the axum layer turning a factory
/// failure into a response.
///
/// # Examples
///
/// ```rust
/// use ferrous_inject::{DependencyError, RequestContext};
///
/// let ctx = RequestContext::new();
/// match ctx.require::<String>("service") {
///     Err(DependencyError::Missing { key }) => assert_eq!(key, "service"),
///     _ => unreachable!(),
/// }
/// ```
#[derive(Debug, thiserror::Error)]
pub enum DependencyError {
    /// The factory for `service` failed.
    #[error("failed to construct {service}: {source}")]
    Factory {
        service: &'static str,
        #[source]
        source: BoxError,
    },
    /// Nothing was attached to the request context under `key`.
    #[error("no service attached under key `{key}`; is its dependency layer installed?")]
    Missing { key: String },
    /// A value is attached under `key`, but it is not of the requested type.
    #[error("service under key `{key}` is not a {expected}")]
    TypeMismatch { key: String, expected: &'static str },
    /// A handler asked for the request context outside the injection pipeline.
    #[error("request context not found in extensions; add a dependency layer to the router")]
    NoContext,
}

/// Result type for pipeline operations.
pub type InjectResult<T> = Result<T, DependencyError>;
