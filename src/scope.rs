//! Service scope definitions.

use std::fmt;
use std::str::FromStr;

/// Scope controlling how long a produced service stays cached.
///
/// # Scope Characteristics
///
/// - **Default**: created on first use, reused for the provider's lifetime
/// - **Request**: created once per request, reused across that request's
///   handler chain, recreated when the next request arrives
///
/// Parsing is permissive: anything other than `"request"` falls back to
/// [`Scope::Default`] instead of failing.
///
/// # Examples
///
/// ```rust
/// use ferrous_inject::Scope;
///
/// assert_eq!("request".parse::<Scope>().unwrap(), Scope::Request);
/// assert_eq!("default".parse::<Scope>().unwrap(), Scope::Default);
/// assert_eq!("per-thread".parse::<Scope>().unwrap(), Scope::Default);
/// assert_eq!(Scope::default(), Scope::Default);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Scope {
    /// Single instance per provider, cached until overridden or cleared.
    #[default]
    Default,
    /// Single instance per request.
    ///
    /// The provider remembers which request produced the cached instance
    /// and discards it as soon as a different request resolves.
    Request,
}

impl Scope {
    /// Parses a scope name, falling back to [`Scope::Default`].
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "request" => Scope::Request,
            "default" | "" => Scope::Default,
            other => {
                tracing::warn!(scope = other, "unrecognized scope, using `default`");
                Scope::Default
            }
        }
    }

    /// The configuration name of this scope.
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Default => "default",
            Scope::Request => "request",
        }
    }
}

impl FromStr for Scope {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Scope::parse(s))
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(feature = "config")]
impl serde::Serialize for Scope {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Accepts any value: strings go through [`Scope::parse`], `null` and
/// everything else become [`Scope::Default`].
#[cfg(feature = "config")]
impl<'de> serde::Deserialize<'de> for Scope {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ScopeVisitor)
    }
}

#[cfg(feature = "config")]
struct ScopeVisitor;

#[cfg(feature = "config")]
impl ScopeVisitor {
    fn fallback(kind: &str) -> Scope {
        tracing::warn!(kind, "scope is not a string, using `default`");
        Scope::Default
    }
}

#[cfg(feature = "config")]
impl<'de> serde::de::Visitor<'de> for ScopeVisitor {
    type Value = Scope;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a scope name")
    }

    fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<Scope, E> {
        Ok(Scope::parse(v))
    }

    fn visit_none<E: serde::de::Error>(self) -> Result<Scope, E> {
        Ok(Scope::Default)
    }

    fn visit_unit<E: serde::de::Error>(self) -> Result<Scope, E> {
        Ok(Scope::Default)
    }

    fn visit_some<D: serde::Deserializer<'de>>(self, deserializer: D) -> Result<Scope, D::Error> {
        deserializer.deserialize_any(self)
    }

    fn visit_bool<E: serde::de::Error>(self, _: bool) -> Result<Scope, E> {
        Ok(Self::fallback("bool"))
    }

    fn visit_i64<E: serde::de::Error>(self, _: i64) -> Result<Scope, E> {
        Ok(Self::fallback("integer"))
    }

    fn visit_u64<E: serde::de::Error>(self, _: u64) -> Result<Scope, E> {
        Ok(Self::fallback("integer"))
    }

    fn visit_f64<E: serde::de::Error>(self, _: f64) -> Result<Scope, E> {
        Ok(Self::fallback("float"))
    }

    fn visit_seq<A: serde::de::SeqAccess<'de>>(self, mut seq: A) -> Result<Scope, A::Error> {
        while seq.next_element::<serde::de::IgnoredAny>()?.is_some() {}
        Ok(Self::fallback("sequence"))
    }

    fn visit_map<A: serde::de::MapAccess<'de>>(self, mut map: A) -> Result<Scope, A::Error> {
        while map
            .next_entry::<serde::de::IgnoredAny, serde::de::IgnoredAny>()?
            .is_some()
        {}
        Ok(Self::fallback("map"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_trims_whitespace() {
        assert_eq!(Scope::parse("  request "), Scope::Request);
    }

    #[test]
    fn parse_is_case_sensitive() {
        assert_eq!(Scope::parse("Request"), Scope::Default);
    }

    #[test]
    fn display_round_trips_known_names() {
        for scope in [Scope::Default, Scope::Request] {
            assert_eq!(Scope::parse(&scope.to_string()), scope);
        }
    }
}
