//! The scoped service provider.

use crate::factory::{AsyncFn, Factory, SyncFn};
use crate::{BoxError, DependencyOptions, Middleware, RequestContext, RequestId, Scope};
use parking_lot::Mutex;
use std::any::type_name;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// A service exposed to request handlers through a shared context.
///
/// `Dependency` owns a factory and caches at most one instance of the
/// service it produces. How long that instance lives is decided by the
/// [`Scope`]:
///
/// - [`Scope::Default`]: created on first resolution, reused until
///   [`clear_override`](Self::clear_override) is called.
/// - [`Scope::Request`]: created once per [`RequestId`] and reused for the
///   rest of that request's chain.
///
/// An instance installed with [`override_with`](Self::override_with) wins
/// over the factory in both scopes until it is cleared or replaced.
///
/// Cloning is cheap; clones share the factory, the options and the cache,
/// so an override installed through one handle is seen by every layer built
/// from another.
///
/// # Concurrency
///
/// The cache lock is never held across the factory's `.await`. Two requests
/// resolving an empty provider at the same time may therefore both run the
/// factory. The first result to land is cached and the later caller is
/// handed the cached instance instead of its own; a request-scoped result is
/// only cached if its request still owns the slot.
///
/// # Examples
///
/// ```rust
/// use ferrous_inject::{Dependency, RequestContext, Scope};
/// use std::sync::Arc;
///
/// struct TestService { name: String }
///
/// # let rt = tokio::runtime::Runtime::new().unwrap();
/// # rt.block_on(async {
/// let dep = Dependency::from_fn(|_| Ok(TestService { name: "foo".into() }));
///
/// let ctx = RequestContext::new();
/// let a = dep.resolve(&ctx).await.unwrap();
/// let b = dep.resolve(&RequestContext::new()).await.unwrap();
/// assert!(Arc::ptr_eq(&a, &b));
///
/// dep.override_with(TestService { name: "bar".into() });
/// assert_eq!(dep.resolve(&ctx).await.unwrap().name, "bar");
/// # });
/// ```
pub struct Dependency<T> {
    shared: Arc<Shared<T>>,
}

struct Shared<T> {
    factory: Arc<dyn Factory<T>>,
    /// Fixed for the lifetime of the cache below.
    options: DependencyOptions,
    cache: Mutex<Cache<T>>,
}

struct Cache<T> {
    instance: Option<Instance<T>>,
    /// Request that last claimed the slot; only tracked under `Scope::Request`.
    request: Option<RequestId>,
}

struct Instance<T> {
    value: Arc<T>,
    overridden: bool,
}

impl<T> Cache<T> {
    fn empty() -> Self {
        Self {
            instance: None,
            request: None,
        }
    }

    fn is_overridden(&self) -> bool {
        self.instance.as_ref().is_some_and(|i| i.overridden)
    }
}

impl<T> Dependency<T>
where
    T: Send + Sync + 'static,
{
    /// Creates a provider from an async factory.
    ///
    /// ```rust
    /// use ferrous_inject::Dependency;
    ///
    /// struct Pool { size: usize }
    ///
    /// let dep = Dependency::new(|_ctx| async { Ok(Pool { size: 8 }) });
    /// ```
    pub fn new<F, Fut>(factory: F) -> Self
    where
        F: Fn(&RequestContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, BoxError>> + Send + 'static,
    {
        Self::from_factory(AsyncFn(factory))
    }

    /// Creates a provider from a synchronous factory.
    pub fn from_fn<F>(factory: F) -> Self
    where
        F: Fn(&RequestContext) -> Result<T, BoxError> + Send + Sync + 'static,
    {
        Self::from_factory(SyncFn(factory))
    }

    /// Creates a provider from any [`Factory`] implementation.
    pub fn from_factory(factory: impl Factory<T>) -> Self {
        Self {
            shared: Arc::new(Shared {
                factory: Arc::new(factory),
                options: DependencyOptions::default(),
                cache: Mutex::new(Cache::empty()),
            }),
        }
    }

    /// Sets the provider options.
    ///
    /// The options and the cache they govern travel together: the returned
    /// provider starts with an empty cache of its own. Called on a clone, it
    /// detaches from the original, which keeps its scope and its instance.
    pub fn with_options(self, options: impl Into<DependencyOptions>) -> Self {
        Self {
            shared: Arc::new(Shared {
                factory: self.shared.factory.clone(),
                options: options.into(),
                cache: Mutex::new(Cache::empty()),
            }),
        }
    }

    /// Shorthand for `with_options(DependencyOptions::new().scope(scope))`.
    pub fn with_scope(self, scope: Scope) -> Self {
        self.with_options(DependencyOptions::new().scope(scope))
    }

    /// The options this provider was built with.
    pub fn options(&self) -> DependencyOptions {
        self.shared.options
    }

    /// The caching scope of this provider.
    pub fn scope(&self) -> Scope {
        self.shared.options.scope
    }

    /// Installs `service` as the instance every resolution returns.
    ///
    /// The override survives request changes under [`Scope::Request`] and
    /// stays until [`clear_override`](Self::clear_override) or another
    /// override replaces it.
    pub fn override_with(&self, service: T) -> &Self {
        self.override_with_arc(Arc::new(service))
    }

    /// Like [`override_with`](Self::override_with), for an already shared instance.
    pub fn override_with_arc(&self, service: Arc<T>) -> &Self {
        tracing::debug!(service = type_name::<T>(), "installing override");
        self.shared.cache.lock().instance = Some(Instance {
            value: service,
            overridden: true,
        });
        self
    }

    /// Drops the cached instance, overridden or not.
    ///
    /// The next resolution runs the factory again. Clearing an empty
    /// provider does nothing.
    pub fn clear_override(&self) -> &Self {
        if self.shared.cache.lock().instance.take().is_some() {
            tracing::debug!(service = type_name::<T>(), "cleared cached instance");
        }
        self
    }

    /// Returns `true` if an instance is currently cached.
    pub fn is_cached(&self) -> bool {
        self.shared.cache.lock().instance.is_some()
    }

    /// Returns the service for the unit of work behind `ctx`.
    ///
    /// Runs the factory if nothing valid is cached. A factory error is
    /// returned exactly as produced and leaves the cache as it was, so the
    /// next call tries again.
    pub async fn resolve(&self, ctx: &RequestContext) -> Result<Arc<T>, BoxError> {
        let request = ctx.id();
        if let Some(cached) = self.lookup(request) {
            tracing::trace!(service = type_name::<T>(), %request, "cache hit");
            return Ok(cached);
        }

        tracing::debug!(
            service = type_name::<T>(),
            %request,
            scope = %self.scope(),
            "running factory"
        );
        let created = Arc::new(self.shared.factory.create(ctx).await?);
        Ok(self.store(request, created))
    }

    /// Returns a pipeline step that attaches the service under `key`.
    ///
    /// # Panics
    ///
    /// Panics if `key` is empty.
    pub fn middleware(&self, key: impl Into<String>) -> Middleware<T> {
        Middleware::new(self.clone(), key.into())
    }

    fn lookup(&self, request: RequestId) -> Option<Arc<T>> {
        let mut cache = self.shared.cache.lock();
        if self.scope() == Scope::Request && cache.request != Some(request) {
            cache.request = Some(request);
            if !cache.is_overridden() {
                cache.instance = None;
            }
        }
        cache.instance.as_ref().map(|i| i.value.clone())
    }

    fn store(&self, request: RequestId, created: Arc<T>) -> Arc<T> {
        let mut cache = self.shared.cache.lock();
        if self.scope() == Scope::Request && cache.request != Some(request) {
            // Another request claimed the slot while the factory ran.
            return created;
        }
        match &cache.instance {
            Some(existing) => existing.value.clone(),
            None => {
                cache.instance = Some(Instance {
                    value: created.clone(),
                    overridden: false,
                });
                created
            }
        }
    }
}

impl<T> Clone for Dependency<T> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<T> fmt::Debug for Dependency<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cache = self.shared.cache.lock();
        f.debug_struct("Dependency")
            .field("service", &type_name::<T>())
            .field("scope", &self.shared.options.scope)
            .field("cached", &cache.instance.is_some())
            .field("overridden", &cache.is_overridden())
            .finish()
    }
}
