//! Per-request context shared along a handler chain.
//!
//! Every unit of work gets one [`RequestContext`]. It carries a
//! [`RequestId`] that providers compare to decide whether a request-scoped
//! instance is still valid, and a string-keyed map through which pipeline
//! steps hand services to downstream handlers.

use crate::error::{DependencyError, InjectResult};
use std::any::{type_name, Any};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

type AnyArc = Arc<dyn Any + Send + Sync>;

static NEXT_REQUEST_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of one unit of work.
///
/// Ids are allocated from a process-wide counter, so two live contexts never
/// share one. Clones of a context keep the id of the original.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(u64);

impl RequestId {
    /// Allocates a fresh id.
    pub fn next() -> Self {
        RequestId(NEXT_REQUEST_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// The raw counter value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "req-{}", self.0)
    }
}

/// Context for a single request.
///
/// Values are stored as `Arc`s under string keys; reading one back is
/// checked against the requested type. Writing a key twice replaces the
/// earlier value.
///
/// # Examples
///
/// ```rust
/// use ferrous_inject::RequestContext;
/// use std::sync::Arc;
///
/// struct Config { name: &'static str }
///
/// let mut ctx = RequestContext::new();
/// ctx.insert("config", Arc::new(Config { name: "foo" }));
///
/// assert_eq!(ctx.get::<Config>("config").unwrap().name, "foo");
/// assert!(ctx.get::<String>("config").is_none());
/// assert!(ctx.require::<Config>("missing").is_err());
/// ```
#[derive(Clone)]
pub struct RequestContext {
    id: RequestId,
    vars: HashMap<String, AnyArc>,
}

impl RequestContext {
    /// Creates an empty context with a fresh [`RequestId`].
    pub fn new() -> Self {
        Self::with_id(RequestId::next())
    }

    /// Creates an empty context carrying an existing id.
    pub fn with_id(id: RequestId) -> Self {
        Self {
            id,
            vars: HashMap::new(),
        }
    }

    /// Identity of the unit of work this context belongs to.
    pub fn id(&self) -> RequestId {
        self.id
    }

    /// Attaches `value` under `key`, returning the value it replaced.
    pub fn insert<V>(&mut self, key: impl Into<String>, value: Arc<V>) -> Option<AnyArc>
    where
        V: Send + Sync + 'static,
    {
        self.vars.insert(key.into(), value)
    }

    /// Returns the value under `key` if present and of type `V`.
    pub fn get<V>(&self, key: &str) -> Option<Arc<V>>
    where
        V: Send + Sync + 'static,
    {
        self.vars
            .get(key)
            .and_then(|value| value.clone().downcast::<V>().ok())
    }

    /// Like [`get`](Self::get), but says why nothing came back.
    pub fn require<V>(&self, key: &str) -> InjectResult<Arc<V>>
    where
        V: Send + Sync + 'static,
    {
        let value = self.vars.get(key).ok_or_else(|| DependencyError::Missing {
            key: key.to_string(),
        })?;
        value
            .clone()
            .downcast::<V>()
            .map_err(|_| DependencyError::TypeMismatch {
                key: key.to_string(),
                expected: type_name::<V>(),
            })
    }

    /// Returns `true` if anything is attached under `key`.
    pub fn contains_key(&self, key: &str) -> bool {
        self.vars.contains_key(key)
    }

    /// Attached keys, in no particular order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.vars.keys().map(String::as_str)
    }

    /// Number of attached keys.
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// Returns `true` if nothing is attached.
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&str> = self.keys().collect();
        keys.sort_unstable();
        f.debug_struct("RequestContext")
            .field("id", &self.id)
            .field("keys", &keys)
            .finish()
    }
}
