//! Framework-neutral pipeline step.
//!
//! [`Middleware`] is the plain form of the injection step: resolve the
//! service, attach it to the [`RequestContext`], hand control onward. The
//! axum layer in [`axum_integration`](crate::axum_integration) does the same
//! against a request's extensions.

use crate::{BoxError, Dependency, RequestContext};
use std::future::Future;
use std::sync::Arc;

/// A pipeline step attaching a [`Dependency`]'s service under a fixed key.
///
/// Built with [`Dependency::middleware`].
///
/// # Examples
///
/// ```rust
/// use ferrous_inject::{Dependency, RequestContext};
///
/// struct Greeter { name: String }
///
/// # let rt = tokio::runtime::Runtime::new().unwrap();
/// # rt.block_on(async {
/// let dep = Dependency::from_fn(|_| Ok(Greeter { name: "foo".into() }));
/// let step = dep.middleware("service");
///
/// let body = step
///     .run(RequestContext::new(), |ctx| async move {
///         let greeter = ctx.require::<Greeter>("service").unwrap();
///         format!("Hello {}", greeter.name)
///     })
///     .await
///     .unwrap();
/// assert_eq!(body, "Hello foo");
/// # });
/// ```
pub struct Middleware<T> {
    dependency: Dependency<T>,
    key: Arc<str>,
}

impl<T> Middleware<T>
where
    T: Send + Sync + 'static,
{
    pub(crate) fn new(dependency: Dependency<T>, key: String) -> Self {
        assert!(!key.is_empty(), "dependency key must not be empty");
        Self {
            dependency,
            key: key.into(),
        }
    }

    /// The key the service is attached under.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The provider this step resolves from.
    pub fn dependency(&self) -> &Dependency<T> {
        &self.dependency
    }

    /// Resolves the service and attaches it to `ctx`.
    pub async fn attach(&self, ctx: &mut RequestContext) -> Result<Arc<T>, BoxError> {
        let service = self.dependency.resolve(ctx).await?;
        ctx.insert(self.key.as_ref(), service.clone());
        Ok(service)
    }

    /// Attaches the service, then runs `next` to completion.
    ///
    /// `next` is called exactly once, after the service is in the context,
    /// and its output is returned untouched. If the factory fails, `next`
    /// is not called and the factory's error is returned.
    pub async fn run<F, Fut, R>(&self, mut ctx: RequestContext, next: F) -> Result<R, BoxError>
    where
        F: FnOnce(RequestContext) -> Fut,
        Fut: Future<Output = R>,
    {
        self.attach(&mut ctx).await?;
        Ok(next(ctx).await)
    }
}

impl<T> Clone for Middleware<T> {
    fn clone(&self) -> Self {
        Self {
            dependency: self.dependency.clone(),
            key: self.key.clone(),
        }
    }
}

impl<T> std::fmt::Debug for Middleware<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Middleware")
            .field("key", &self.key)
            .field("dependency", &self.dependency)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[test]
    #[should_panic(expected = "dependency key must not be empty")]
    fn empty_key_panics() {
        let dep = Dependency::from_fn(|_| Ok(1u8));
        let _ = dep.middleware("");
    }

    #[tokio::test]
    async fn step_shares_provider_with_dependency() {
        let dep = Dependency::from_fn(|_| Ok(7u8)).with_scope(crate::Scope::Request);
        let step = dep.middleware("n");

        assert_eq!(step.key(), "n");
        assert_eq!(step.dependency().scope(), crate::Scope::Request);

        let mut ctx = RequestContext::new();
        let attached = step.attach(&mut ctx).await.unwrap();
        assert!(dep.is_cached());
        assert!(step.dependency().is_cached());
        assert!(Arc::ptr_eq(&attached, &ctx.require::<u8>("n").unwrap()));
    }

    #[tokio::test]
    async fn next_is_skipped_when_factory_fails() {
        let dep: Dependency<u8> = Dependency::from_fn(|_| Err("no service".into()));
        let called = AtomicBool::new(false);
        let flag = &called;

        let err = dep
            .middleware("service")
            .run(RequestContext::new(), move |_ctx| async move {
                flag.store(true, Ordering::SeqCst);
            })
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "no service");
        assert!(!called.load(Ordering::SeqCst));
    }
}
