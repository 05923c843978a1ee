//! Path parameter extraction and storage.
//!
//! Parameters are produced fresh for every match and never written back onto
//! the shared route. Storage uses a small-vector so that the common case of a
//! handful of parameters stays on the stack.

use std::fmt;

use smallvec::SmallVec;

/// Maximum number of parameters stored inline (stack allocated).
const INLINE_PARAMS: usize = 4;

/// A captured parameter value.
///
/// Every captured value that parses as an `i64` is stored as [`ParamValue::Int`],
/// regardless of the declared parameter kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParamValue {
    /// An integer value.
    Int(i64),
    /// Any other text.
    Str(String),
}

impl ParamValue {
    /// Coerces raw captured text.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        raw.parse::<i64>()
            .map_or_else(|_| Self::Str(raw.to_string()), Self::Int)
    }

    /// Returns the integer, if this is one.
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            Self::Str(_) => None,
        }
    }

    /// Returns the text, if this is not an integer.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(value) => Some(value),
            Self::Int(_) => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(value) => write!(f, "{value}"),
            Self::Str(value) => f.write_str(value),
        }
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Param {
    name: String,
    raw: String,
    value: ParamValue,
}

/// Extracted path parameters from a route match.
///
/// # Example
///
/// ```rust
/// use doze_router::{ParamValue, Params};
///
/// let mut params = Params::new();
/// params.push("id", "10");
/// params.push("name", "job");
///
/// assert_eq!(params.get("id"), Some(&ParamValue::Int(10)));
/// assert_eq!(params.get_str("name"), Some("job"));
/// assert_eq!(params.raw("id"), Some("10"));
/// assert_eq!(params.get("unknown"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Params {
    inner: SmallVec<[Param; INLINE_PARAMS]>,
}

impl Params {
    /// Creates a new empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a params set with the given capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: SmallVec::with_capacity(capacity),
        }
    }

    /// Adds a captured parameter, coercing integers.
    pub fn push(&mut self, name: impl Into<String>, raw: impl Into<String>) {
        let raw = raw.into();
        let value = ParamValue::parse(&raw);
        self.inner.push(Param {
            name: name.into(),
            raw,
            value,
        });
    }

    /// Returns the typed value for a parameter by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.find(name).map(|p| &p.value)
    }

    /// Returns the value as an integer, if it was captured as one.
    #[must_use]
    pub fn get_int(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(ParamValue::as_int)
    }

    /// Returns the value as text, if it was not coerced to an integer.
    #[must_use]
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(ParamValue::as_str)
    }

    /// Returns the captured text exactly as it appeared in the path.
    #[must_use]
    pub fn raw(&self, name: &str) -> Option<&str> {
        self.find(name).map(|p| p.raw.as_str())
    }

    /// Returns true if there are no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns the number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns an iterator over `(name, value)` pairs in path order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.inner.iter().map(|p| (p.name.as_str(), &p.value))
    }

    fn find(&self, name: &str) -> Option<&Param> {
        self.inner.iter().find(|p| p.name == name)
    }
}
