//! High-level router API.
//!
//! This module provides the main [`Router`] struct which is the primary
//! interface for registering, matching and reverse-building routes.

use http::Method;
use indexmap::IndexMap;
use tracing::debug;

use crate::encoding::{decode_path, unescape};
use crate::error::{BuildError, MatchError, RouteError};
use crate::method_router::MethodRouter;
use crate::node::{Node, Spans};
use crate::params::{ParamValue, Params};
use crate::pattern::{CompileOptions, Pattern, ANONYMOUS_WILDCARD};
use crate::route::{MatchResult, Route, RouteDef, RouteMatch};

/// Behaviour switches for a [`Router`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouterOptions {
    /// Ignore one trailing `/` on incoming paths.
    pub strip_trailing_slash: bool,
    /// Allow wildcard segments before the end of a template.
    pub inner_wildcards: bool,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            strip_trailing_slash: true,
            inner_wildcards: false,
        }
    }
}

/// A trie-backed router.
///
/// Matching runs in time proportional to the path length, independent of the
/// number of registered routes.
///
/// # Example
///
/// ```rust
/// use doze_router::{MatchError, Router};
/// use http::Method;
///
/// let mut router = Router::new();
/// router.register("/users", None, Method::GET, "listUsers").unwrap();
/// router.register("/users/{id:i}", Some("user"), Method::GET, "getUser").unwrap();
///
/// let m = router.match_route(&Method::GET, "/users/123").unwrap();
/// assert_eq!(*m.handler, "getUser");
/// assert_eq!(m.params.get_int("id"), Some(123));
///
/// let err = router.match_route(&Method::POST, "/users").unwrap_err();
/// assert!(matches!(err, MatchError::MethodNotAllowed { .. }));
///
/// assert_eq!(router.build("user", [("id", 7)]).unwrap(), "/users/7");
/// ```
///
/// # Route Priority
///
/// When several templates could match, branches are tried in a fixed order
/// at each position, and the first one whose continuation matches wins:
///
/// 1. **Literal text** (e.g., `/users/me`)
/// 2. **Integer** parameters (`{id:i}`)
/// 3. **Alphabetic** parameters (`{name:a}`)
/// 4. **Alphanumeric** parameters (`{slug:an}`)
/// 5. **Untyped** parameters (`{any}`)
/// 6. **Wildcards** (`*rest`)
///
/// Registration order never affects the outcome.
#[derive(Debug, Clone)]
pub struct Router<H> {
    /// Prepended to every template registered from now on
    prefix: String,
    options: RouterOptions,
    routes: Vec<Route<H>>,
    /// Route names to indices into `routes`
    by_name: IndexMap<String, usize>,
    /// Normalized templates to indices into `routes`
    by_path: IndexMap<String, usize>,
    root: Node,
}

impl<H> Default for Router<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> Router<H> {
    /// Creates a new empty router with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(RouterOptions::default())
    }

    /// Creates a new empty router.
    #[must_use]
    pub fn with_options(options: RouterOptions) -> Self {
        Self {
            prefix: String::new(),
            options,
            routes: Vec::new(),
            by_name: IndexMap::new(),
            by_path: IndexMap::new(),
            root: Node::root(),
        }
    }

    /// Builds a router from a list of route definitions.
    ///
    /// # Errors
    ///
    /// Fails on the first definition that cannot be registered.
    pub fn from_route_map<I>(defs: I) -> Result<Self, RouteError>
    where
        I: IntoIterator<Item = RouteDef<H>>,
    {
        let mut router = Self::new();
        router.route_map(defs)?;
        Ok(router)
    }

    /// Returns the current prefix.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Sets the prefix applied to routes registered afterwards.
    pub fn set_prefix(&mut self, prefix: impl Into<String>) {
        self.prefix = prefix.into();
    }

    /// Returns the router options.
    #[must_use]
    pub const fn options(&self) -> RouterOptions {
        self.options
    }

    /// Registers a single handler.
    ///
    /// Registering a template that already exists adds the method to the
    /// existing route.
    ///
    /// # Errors
    ///
    /// See [`Router::add`].
    pub fn register(
        &mut self,
        pattern: &str,
        name: Option<&str>,
        method: Method,
        handler: H,
    ) -> Result<(), RouteError> {
        let mut def = RouteDef::new(pattern).with(method, handler);
        if let Some(name) = name {
            def = def.named(name);
        }
        self.add(def)
    }

    /// Registers a route definition.
    ///
    /// # Errors
    ///
    /// - [`RouteError::Pattern`] if the template does not compile
    /// - [`RouteError::DuplicateMethod`] if the template already handles one
    ///   of the methods
    /// - [`RouteError::DuplicateName`] if another route owns the name
    /// - [`RouteError::Renamed`] if the template is already registered under
    ///   a different name
    /// - [`RouteError::Conflict`] if a different template occupies the same
    ///   position, like `/users/{id}` next to `/users/{uid}`
    pub fn add(&mut self, def: RouteDef<H>) -> Result<(), RouteError> {
        let RouteDef {
            path,
            name,
            methods,
        } = def;
        let full = format!("{}{}", self.prefix, path);
        let key = self.normalize(&full).to_string();

        if let Some(&idx) = self.by_path.get(&key) {
            return self.merge_into(idx, &full, name, methods);
        }

        let pattern = Pattern::compile_with(
            &full,
            CompileOptions {
                inner_wildcards: self.options.inner_wildcards,
                keep_trailing_slash: !self.options.strip_trailing_slash,
            },
        )?;

        if let Some(name) = &name {
            if self.by_name.contains_key(name) {
                return Err(RouteError::DuplicateName(name.clone()));
            }
        }

        let idx = self.routes.len();
        self.root
            .insert(pattern.segments(), idx)
            .map_err(|existing| RouteError::Conflict {
                path: full.clone(),
                existing: self.routes[existing].path().to_string(),
            })?;

        debug!(
            path = %full,
            name = name.as_deref().unwrap_or(""),
            methods = ?methods.allowed_methods(),
            "route registered"
        );

        if let Some(name) = &name {
            self.by_name.insert(name.clone(), idx);
        }
        self.by_path.insert(key, idx);
        self.routes.push(Route::new(name, pattern, methods));
        Ok(())
    }

    fn merge_into(
        &mut self,
        idx: usize,
        full: &str,
        name: Option<String>,
        methods: MethodRouter<H>,
    ) -> Result<(), RouteError> {
        if let Some(name) = &name {
            if self.by_name.get(name).is_some_and(|&owner| owner != idx) {
                return Err(RouteError::DuplicateName(name.clone()));
            }
            if let Some(existing) = self.routes[idx].name().filter(|e| *e != name.as_str()) {
                return Err(RouteError::Renamed {
                    path: full.to_string(),
                    existing: existing.to_string(),
                    name: name.clone(),
                });
            }
        }

        let allowed = methods.allowed_methods();
        let route = &mut self.routes[idx];
        route
            .methods_mut()
            .merge(methods)
            .map_err(|method| RouteError::DuplicateMethod {
                path: full.to_string(),
                method,
            })?;

        debug!(path = %full, methods = ?allowed, "methods added to route");

        if let Some(name) = name {
            if route.name().is_none() {
                route.set_name(name.clone());
                self.by_name.insert(name, idx);
            }
        }
        Ok(())
    }

    /// Registers many route definitions, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// See [`Router::add`].
    pub fn route_map<I>(&mut self, defs: I) -> Result<(), RouteError>
    where
        I: IntoIterator<Item = RouteDef<H>>,
    {
        defs.into_iter().try_for_each(|def| self.add(def))
    }

    /// Registers routes under an additional prefix.
    ///
    /// The group prefix is appended to the router prefix for the duration of
    /// `f` and removed afterwards, even if `f` fails. Groups nest.
    ///
    /// # Errors
    ///
    /// Returns whatever `f` returns.
    ///
    /// # Example
    ///
    /// ```rust
    /// use doze_router::Router;
    /// use http::Method;
    ///
    /// let mut router = Router::new();
    /// router
    ///     .group("/api", |api| {
    ///         api.group("/v1", |v1| v1.register("/users", None, Method::GET, "list"))
    ///     })
    ///     .unwrap();
    ///
    /// assert!(router.match_route(&Method::GET, "/api/v1/users").is_ok());
    /// assert_eq!(router.prefix(), "");
    /// ```
    pub fn group<F>(&mut self, prefix: &str, f: F) -> Result<(), RouteError>
    where
        F: FnOnce(&mut Self) -> Result<(), RouteError>,
    {
        let saved = self.prefix.len();
        self.prefix.push_str(prefix);
        let result = f(self);
        self.prefix.truncate(saved);
        result
    }

    /// Resolves a path to a route, ignoring the method.
    ///
    /// The path is percent-decoded segment by segment before matching, so
    /// `/people/%31%30` matches `/people/{id:i}`. An encoded `/` stays inside
    /// its segment. Captured values are stored decoded.
    ///
    /// Useful for telling "not found" apart from "method not allowed".
    #[must_use]
    pub fn match_path(&self, path: &str) -> Option<MatchResult<'_, H>> {
        let decoded = decode_path(path);
        let path = self.normalize(&decoded);

        let mut spans = Spans::new();
        let idx = self.root.find(path.as_bytes(), &mut spans)?;
        let route = &self.routes[idx];

        let mut params = Params::with_capacity(spans.len());
        let slots = route.pattern().segments().iter().filter(|s| s.is_param());
        for (segment, &(start, end)) in slots.zip(spans.iter()) {
            params.push(
                segment.param_name().unwrap_or(ANONYMOUS_WILDCARD),
                unescape(&path[start..end]),
            );
        }

        debug!(path, route = route.path(), "path matched");
        Some(MatchResult { route, params })
    }

    /// Resolves a method and path to a handler.
    ///
    /// # Errors
    ///
    /// [`MatchError::NotFound`] when no template matches the path, and
    /// [`MatchError::MethodNotAllowed`] when one does but has no handler for
    /// `method`.
    pub fn match_route(&self, method: &Method, path: &str) -> Result<RouteMatch<'_, H>, MatchError> {
        let MatchResult { route, params } =
            self.match_path(path).ok_or_else(|| MatchError::NotFound {
                path: path.to_string(),
            })?;

        let handler = route
            .handler(method)
            .ok_or_else(|| MatchError::MethodNotAllowed {
                path: path.to_string(),
                method: method.clone(),
                allowed: route.methods().allowed_methods(),
            })?;

        Ok(RouteMatch {
            route,
            handler,
            params,
        })
    }

    /// Looks a route up by name, falling back to its template for unnamed
    /// routes.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Route<H>> {
        self.by_name
            .get(name)
            .or_else(|| self.by_path.get(self.normalize(name)))
            .map(|&idx| &self.routes[idx])
    }

    /// Builds a concrete path for a named route.
    ///
    /// # Errors
    ///
    /// [`BuildError::RouteNotFound`] if no route has that name, otherwise as
    /// [`Route::build`].
    pub fn build<I, K, V>(&self, name: &str, params: I) -> Result<String, BuildError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<ParamValue>,
    {
        self.get(name)
            .ok_or_else(|| BuildError::RouteNotFound(name.to_string()))?
            .build(params)
    }

    /// Iterates routes in registration order.
    pub fn routes(&self) -> impl Iterator<Item = &Route<H>> {
        self.routes.iter()
    }

    /// Returns the number of routes registered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns true if no routes are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Applies the trailing slash rule shared by templates and paths.
    fn normalize<'p>(&self, path: &'p str) -> &'p str {
        if self.options.strip_trailing_slash {
            path_key(path)
        } else {
            path
        }
    }
}

/// Drops a single trailing slash, keeping `/` itself.
fn path_key(path: &str) -> &str {
    match path.strip_suffix('/') {
        Some(stripped) if !stripped.is_empty() => stripped,
        _ => path,
    }
}
