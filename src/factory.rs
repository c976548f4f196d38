//! Factory support for service construction.
//!
//! A factory receives the current [`RequestContext`] and produces the
//! service, either synchronously or through a future. Async factories are
//! the common case for services that need a network handshake or a pool
//! warm-up before first use.

use crate::{BoxError, RequestContext};
use async_trait::async_trait;
use std::future::Future;

/// Trait for factories that create services.
///
/// Implement it directly for factories that carry their own configuration;
/// closures are accepted through [`Dependency::new`](crate::Dependency::new)
/// and [`Dependency::from_fn`](crate::Dependency::from_fn).
///
/// # Examples
///
/// ```
/// use ferrous_inject::{BoxError, Dependency, Factory, RequestContext};
/// use async_trait::async_trait;
///
/// struct DatabasePool {
///     url: String,
/// }
///
/// struct PoolFactory {
///     url: String,
/// }
///
/// #[async_trait]
/// impl Factory<DatabasePool> for PoolFactory {
///     async fn create(&self, _ctx: &RequestContext) -> Result<DatabasePool, BoxError> {
///         Ok(DatabasePool { url: self.url.clone() })
///     }
/// }
///
/// let pool: Dependency<DatabasePool> = Dependency::from_factory(PoolFactory {
///     url: "postgres://localhost".to_string(),
/// });
/// ```
#[async_trait]
pub trait Factory<T>: Send + Sync + 'static {
    /// Creates a new instance of the service.
    ///
    /// Values attached to `ctx` by earlier pipeline steps are visible here.
    async fn create(&self, ctx: &RequestContext) -> Result<T, BoxError>;
}

/// Adapter for `Fn(&RequestContext) -> impl Future<Output = Result<T, BoxError>>`.
pub(crate) struct AsyncFn<F>(pub(crate) F);

#[async_trait]
impl<T, F, Fut> Factory<T> for AsyncFn<F>
where
    T: Send + 'static,
    F: Fn(&RequestContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, BoxError>> + Send + 'static,
{
    async fn create(&self, ctx: &RequestContext) -> Result<T, BoxError> {
        (self.0)(ctx).await
    }
}

/// Adapter for `Fn(&RequestContext) -> Result<T, BoxError>`.
pub(crate) struct SyncFn<F>(pub(crate) F);

#[async_trait]
impl<T, F> Factory<T> for SyncFn<F>
where
    T: Send + 'static,
    F: Fn(&RequestContext) -> Result<T, BoxError> + Send + Sync + 'static,
{
    async fn create(&self, ctx: &RequestContext) -> Result<T, BoxError> {
        (self.0)(ctx)
    }
}
