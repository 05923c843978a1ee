//! Registered routes and reverse path building.

use http::Method;
use indexmap::IndexMap;

use crate::encoding::encode_value;
use crate::error::BuildError;
use crate::method_router::MethodRouter;
use crate::params::{ParamValue, Params};
use crate::pattern::{ParamKind, Pattern, Segment, ANONYMOUS_WILDCARD};

/// A registered route: a compiled template, an optional name and its
/// per-method handlers.
///
/// Routes are immutable once the owning router is shared. Parameter values
/// from a match live in [`Params`], never on the route itself.
#[derive(Debug, Clone)]
pub struct Route<H> {
    name: Option<String>,
    pattern: Pattern,
    methods: MethodRouter<H>,
}

impl<H> Route<H> {
    pub(crate) fn new(name: Option<String>, pattern: Pattern, methods: MethodRouter<H>) -> Self {
        Self {
            name,
            pattern,
            methods,
        }
    }

    /// The route name, if one was given.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The prefix-qualified template this route was registered with.
    #[must_use]
    pub fn path(&self) -> &str {
        self.pattern.template()
    }

    /// The compiled template.
    #[must_use]
    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    /// Named parameters in left-to-right order.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.pattern.param_names()
    }

    /// The handlers registered for this route.
    #[must_use]
    pub fn methods(&self) -> &MethodRouter<H> {
        &self.methods
    }

    pub(crate) fn methods_mut(&mut self) -> &mut MethodRouter<H> {
        &mut self.methods
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = Some(name);
    }

    /// Returns the handler for a method.
    #[must_use]
    pub fn handler(&self, method: &Method) -> Option<&H> {
        self.methods.handler(method)
    }

    /// Builds a concrete path by substituting parameter values.
    ///
    /// The number of distinct names supplied must equal the number of named
    /// parameters, and every supplied name must appear in the template.
    /// Integers are written in base 10. Strings are percent-encoded, except
    /// that wildcard values keep their `/` separators. An anonymous `*` is
    /// left as is.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::ParamCount`] or [`BuildError::UnknownParam`];
    /// a partially substituted path is never produced.
    ///
    /// # Example
    ///
    /// ```rust
    /// use doze_router::{ParamValue, Router};
    /// use http::Method;
    ///
    /// let mut router = Router::new();
    /// router
    ///     .register("/people/{id:i}/details/{name:a}", Some("details"), Method::GET, ())
    ///     .unwrap();
    ///
    /// let route = router.get("details").unwrap();
    /// let path = route
    ///     .build([("id", ParamValue::from(10)), ("name", ParamValue::from("job"))])
    ///     .unwrap();
    /// assert_eq!(path, "/people/10/details/job");
    /// ```
    pub fn build<I, K, V>(&self, params: I) -> Result<String, BuildError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<ParamValue>,
    {
        let supplied: IndexMap<String, ParamValue> = params
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();

        let required = self.pattern.param_count();
        if supplied.len() != required {
            return Err(BuildError::ParamCount {
                given: supplied.len(),
                required,
            });
        }

        if let Some(unknown) = supplied
            .keys()
            .find(|name| !self.pattern.param_names().any(|n| n == name.as_str()))
        {
            return Err(BuildError::UnknownParam(unknown.clone()));
        }

        let mut path = String::with_capacity(self.path().len());
        for (i, segment) in self.pattern.segments().iter().enumerate() {
            if i > 0 {
                path.push('/');
            }
            match segment {
                Segment::Literal(text) => path.push_str(text),
                Segment::Param { name: Some(name), kind } => {
                    // Every named parameter is present after the checks above.
                    if let Some(value) = supplied.get(name) {
                        let text = value.to_string();
                        path.push_str(&encode_value(&text, *kind == ParamKind::Wildcard));
                    }
                }
                Segment::Param { name: None, .. } => path.push_str(ANONYMOUS_WILDCARD),
            }
        }

        if self.path().len() > 1 && self.path().ends_with('/') && !path.ends_with('/') {
            path.push('/');
        }

        Ok(path)
    }
}

/// A declarative route definition.
///
/// # Example
///
/// ```rust
/// use doze_router::{RouteDef, Router};
/// use http::Method;
///
/// let mut router = Router::new();
/// router
///     .add(
///         RouteDef::new("/users/{id:i}")
///             .named("user")
///             .with(Method::GET, "show")
///             .and(Method::DELETE, "destroy"),
///     )
///     .unwrap();
///
/// let route = router.get("user").unwrap();
/// assert_eq!(route.methods().allowed_methods(), vec![Method::GET, Method::DELETE]);
/// ```
#[derive(Debug, Clone)]
pub struct RouteDef<H> {
    pub(crate) path: String,
    pub(crate) name: Option<String>,
    pub(crate) methods: MethodRouter<H>,
}

impl<H> RouteDef<H> {
    /// Starts a definition for a template.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: None,
            methods: MethodRouter::new(),
        }
    }

    /// Names the route for reverse building.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Binds a handler to a method.
    #[must_use]
    pub fn with(mut self, method: Method, handler: H) -> Self {
        self.methods = self.methods.on(method, handler);
        self
    }

    /// Same as [`RouteDef::with`]; reads better when chaining.
    #[must_use]
    pub fn and(self, method: Method, handler: H) -> Self {
        self.with(method, handler)
    }

    /// Replaces the method table wholesale.
    #[must_use]
    pub fn methods(mut self, methods: MethodRouter<H>) -> Self {
        self.methods = methods;
        self
    }
}

/// A path resolved to a route, before method selection.
#[derive(Debug)]
pub struct MatchResult<'r, H> {
    /// The matched route.
    pub route: &'r Route<H>,
    /// Parameters captured from the path.
    pub params: Params,
}

/// A path and method resolved to a handler.
#[derive(Debug)]
pub struct RouteMatch<'r, H> {
    /// The matched route.
    pub route: &'r Route<H>,
    /// The handler for the requested method.
    pub handler: &'r H,
    /// Parameters captured from the path.
    pub params: Params,
}
