//! Provider configuration.
//!
//! A [`Dependency`](crate::Dependency) recognizes a single option, `scope`.
//! Options can be built in code, or (with the `config` feature) read from
//! JSON or from the process environment. Missing or unknown values fall back
//! to [`Scope::Default`].

use crate::Scope;

/// Options accepted when constructing a [`Dependency`](crate::Dependency).
///
/// # Examples
///
/// ```rust
/// use ferrous_inject::{DependencyOptions, Scope};
///
/// let opts = DependencyOptions::new().scope(Scope::Request);
/// assert_eq!(opts.scope, Scope::Request);
/// assert_eq!(DependencyOptions::default().scope, Scope::Default);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct DependencyOptions {
    /// Caching policy for produced instances.
    pub scope: Scope,
}

impl DependencyOptions {
    /// Options with every field at its default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the scope.
    pub fn scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }
}

#[cfg(feature = "config")]
impl DependencyOptions {
    /// Parses options from a JSON document such as `{"scope": "request"}`.
    ///
    /// Unknown fields are ignored and an unknown scope name becomes
    /// [`Scope::Default`]; only malformed JSON is an error.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Reads options from the environment.
    ///
    /// The scope is taken from `<PREFIX>_SCOPE` (prefix upper-cased). An
    /// unset or non-unicode variable yields the defaults.
    ///
    /// ```rust,no_run
    /// use ferrous_inject::{DependencyOptions, Scope};
    ///
    /// // APP_SCOPE=request
    /// let opts = DependencyOptions::from_env("app");
    /// assert_eq!(opts.scope, Scope::Request);
    /// ```
    pub fn from_env(prefix: &str) -> Self {
        let var = format!("{}_SCOPE", prefix.to_uppercase());
        match std::env::var(&var) {
            Ok(value) => Self::new().scope(Scope::parse(&value)),
            Err(_) => Self::default(),
        }
    }
}

impl From<Scope> for DependencyOptions {
    fn from(scope: Scope) -> Self {
        Self { scope }
    }
}
