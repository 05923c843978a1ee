//! Named router namespaces.
//!
//! An application that serves several independent route sets (API versions,
//! an admin surface) keeps one [`Router`] per name in a [`RouterRegistry`]
//! owned by its composition root. There is no process-wide registry.

use indexmap::IndexMap;
use tracing::debug;

use crate::error::RouteError;
use crate::router::{Router, RouterOptions};

/// Name of the router returned by [`RouterRegistry::default_router_mut`].
pub const DEFAULT_ROUTER: &str = "default";

/// A set of independently named routers.
///
/// # Example
///
/// ```rust
/// use doze_router::RouterRegistry;
/// use http::Method;
///
/// let mut registry = RouterRegistry::new();
/// registry.create("v1").unwrap().set_prefix("/v1");
/// registry
///     .router_mut("v1")
///     .register("/users", None, Method::GET, "list_v1")
///     .unwrap();
///
/// let v1 = registry.get("v1").unwrap();
/// assert!(v1.match_path("/v1/users").is_some());
/// assert!(registry.create("v1").is_err());
/// ```
#[derive(Debug, Clone)]
pub struct RouterRegistry<H> {
    options: RouterOptions,
    routers: IndexMap<String, Router<H>>,
}

impl<H> Default for RouterRegistry<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> RouterRegistry<H> {
    /// Creates an empty registry whose routers use default options.
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(RouterOptions::default())
    }

    /// Creates an empty registry whose routers use `options`.
    #[must_use]
    pub fn with_options(options: RouterOptions) -> Self {
        Self {
            options,
            routers: IndexMap::new(),
        }
    }

    /// Creates a new router under `name`.
    ///
    /// # Errors
    ///
    /// [`RouteError::DuplicateRouter`] if the name is taken.
    pub fn create(&mut self, name: &str) -> Result<&mut Router<H>, RouteError> {
        if self.routers.contains_key(name) {
            return Err(RouteError::DuplicateRouter(name.to_string()));
        }
        Ok(self.router_mut(name))
    }

    /// Returns the router named `name`, creating it on first use.
    pub fn router_mut(&mut self, name: &str) -> &mut Router<H> {
        let options = self.options;
        self.routers.entry(name.to_string()).or_insert_with(|| {
            debug!(router = name, "router created");
            Router::with_options(options)
        })
    }

    /// Returns the router named `"default"`, creating it on first use.
    pub fn default_router_mut(&mut self) -> &mut Router<H> {
        self.router_mut(DEFAULT_ROUTER)
    }

    /// Returns an existing router.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Router<H>> {
        self.routers.get(name)
    }

    /// Returns the default router, if it has been created.
    #[must_use]
    pub fn default_router(&self) -> Option<&Router<H>> {
        self.get(DEFAULT_ROUTER)
    }

    /// Sets the prefix of a router, creating it on first use.
    pub fn set_prefix(&mut self, name: &str, prefix: impl Into<String>) {
        self.router_mut(name).set_prefix(prefix);
    }

    /// Removes a router from the registry and hands it to the caller.
    pub fn take(&mut self, name: &str) -> Option<Router<H>> {
        self.routers.shift_remove(name)
    }

    /// Router names in creation order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.routers.keys().map(String::as_str)
    }

    /// Returns the number of routers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routers.len()
    }

    /// Returns true if no routers exist.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routers.is_empty()
    }
}
