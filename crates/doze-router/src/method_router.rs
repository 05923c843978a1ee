//! HTTP method-based routing.
//!
//! [`MethodRouter`] maps HTTP methods to handlers for a single route. Method
//! keys are unique; registration order is preserved so that `Allow` headers
//! list methods the way they were declared.

use http::Method;

/// Maps HTTP methods to handlers for a single route.
///
/// # Example
///
/// ```rust
/// use doze_router::MethodRouter;
/// use http::Method;
///
/// let router = MethodRouter::new()
///     .get("listUsers")
///     .post("createUser")
///     .options("userOptions");
///
/// assert_eq!(router.handler(&Method::GET), Some(&"listUsers"));
/// assert_eq!(router.handler(&Method::POST), Some(&"createUser"));
/// assert_eq!(router.handler(&Method::DELETE), None);
/// ```
#[derive(Debug, Clone)]
pub struct MethodRouter<H> {
    handlers: Vec<(Method, H)>,
}

impl<H> Default for MethodRouter<H> {
    fn default() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }
}

impl<H> MethodRouter<H> {
    /// Creates a new empty method router.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a GET handler.
    #[must_use]
    pub fn get(self, handler: H) -> Self {
        self.on(Method::GET, handler)
    }

    /// Registers a POST handler.
    #[must_use]
    pub fn post(self, handler: H) -> Self {
        self.on(Method::POST, handler)
    }

    /// Registers a PUT handler.
    #[must_use]
    pub fn put(self, handler: H) -> Self {
        self.on(Method::PUT, handler)
    }

    /// Registers a DELETE handler.
    #[must_use]
    pub fn delete(self, handler: H) -> Self {
        self.on(Method::DELETE, handler)
    }

    /// Registers a PATCH handler.
    #[must_use]
    pub fn patch(self, handler: H) -> Self {
        self.on(Method::PATCH, handler)
    }

    /// Registers a HEAD handler.
    #[must_use]
    pub fn head(self, handler: H) -> Self {
        self.on(Method::HEAD, handler)
    }

    /// Registers an OPTIONS handler.
    #[must_use]
    pub fn options(self, handler: H) -> Self {
        self.on(Method::OPTIONS, handler)
    }

    /// Registers a handler for any method, including extension methods.
    ///
    /// A later call for the same method replaces the earlier handler.
    #[must_use]
    pub fn on(mut self, method: Method, handler: H) -> Self {
        match self.handlers.iter_mut().find(|(m, _)| *m == method) {
            Some(slot) => slot.1 = handler,
            None => self.handlers.push((method, handler)),
        }
        self
    }

    /// Adds a handler, refusing to replace an existing one.
    ///
    /// Returns the handler back when the method is already taken.
    pub fn insert(&mut self, method: Method, handler: H) -> Result<(), (Method, H)> {
        if self.contains(&method) {
            return Err((method, handler));
        }
        self.handlers.push((method, handler));
        Ok(())
    }

    /// Merges another method router into this one.
    ///
    /// If any method is handled by both routers, nothing is merged and the
    /// first such method is returned.
    ///
    /// # Example
    ///
    /// ```rust
    /// use doze_router::MethodRouter;
    /// use http::Method;
    ///
    /// let mut router = MethodRouter::new().get("getUsers");
    /// router.merge(MethodRouter::new().post("createUser")).unwrap();
    ///
    /// assert_eq!(router.handler(&Method::GET), Some(&"getUsers"));
    /// assert_eq!(router.handler(&Method::POST), Some(&"createUser"));
    ///
    /// let clash = router.merge(MethodRouter::new().get("again"));
    /// assert_eq!(clash, Err(Method::GET));
    /// ```
    pub fn merge(&mut self, other: Self) -> Result<(), Method> {
        if let Some((method, _)) = other.handlers.iter().find(|(m, _)| self.contains(m)) {
            return Err(method.clone());
        }
        self.handlers.extend(other.handlers);
        Ok(())
    }

    /// Returns the handler for a given HTTP method.
    #[must_use]
    pub fn handler(&self, method: &Method) -> Option<&H> {
        self.handlers
            .iter()
            .find(|(m, _)| m == method)
            .map(|(_, h)| h)
    }

    /// Returns true if the method has a handler.
    #[must_use]
    pub fn contains(&self, method: &Method) -> bool {
        self.handler(method).is_some()
    }

    /// Returns true if any methods are registered.
    #[must_use]
    pub fn has_any_method(&self) -> bool {
        !self.handlers.is_empty()
    }

    /// Returns the allowed methods, in registration order.
    #[must_use]
    pub fn allowed_methods(&self) -> Vec<Method> {
        self.handlers.iter().map(|(m, _)| m.clone()).collect()
    }

    /// Iterates `(method, handler)` pairs in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&Method, &H)> {
        self.handlers.iter().map(|(m, h)| (m, h))
    }
}
