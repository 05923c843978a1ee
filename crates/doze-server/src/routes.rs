//! Route registration surface.

use doze_core::{ActionResult, BoxedAction, Context};
use doze_router::{RouteDef, RouteError, Router};
use http::Method;

/// Registration handle over the dispatcher's router.
///
/// Closures passed to [`get`](Self::get) and friends take the request
/// [`Context`] and return an [`ActionResult`]. Actions implemented as types
/// go through [`route_boxed`](Self::route_boxed).
///
/// # Example
///
/// ```
/// use doze_core::Response;
/// use doze_server::Dispatcher;
/// use http::StatusCode;
///
/// let dispatcher = Dispatcher::builder()
///     .routes(|r| {
///         r.get("/health", |_ctx| Ok(Some(Response::text(StatusCode::OK, "ok"))))?;
///         r.group("/users", |users| {
///             users.named(http::Method::GET, "/{id:i}", "user", |ctx| {
///                 let id = ctx.param_int("id").unwrap_or_default();
///                 Ok(Some(Response::text(StatusCode::OK, id.to_string())))
///             })?;
///             Ok(())
///         })?;
///         Ok(())
///     })
///     .build()
///     .unwrap();
///
/// assert_eq!(dispatcher.build_path("user", [("id", 7)]).unwrap(), "/users/7");
/// ```
pub struct Routes<'r> {
    router: &'r mut Router<BoxedAction>,
}

impl<'r> Routes<'r> {
    pub(crate) fn new(router: &'r mut Router<BoxedAction>) -> Self {
        Self { router }
    }

    /// Registers a closure for a method and template.
    pub fn route<F>(&mut self, method: Method, pattern: &str, action: F) -> Result<&mut Self, RouteError>
    where
        F: Fn(&mut Context<'_>) -> ActionResult + Send + Sync + 'static,
    {
        self.route_boxed(method, pattern, None, doze_core::boxed(action))
    }

    /// Registers a closure under a route name, for reverse building.
    pub fn named<F>(
        &mut self,
        method: Method,
        pattern: &str,
        name: &str,
        action: F,
    ) -> Result<&mut Self, RouteError>
    where
        F: Fn(&mut Context<'_>) -> ActionResult + Send + Sync + 'static,
    {
        self.route_boxed(method, pattern, Some(name), doze_core::boxed(action))
    }

    /// Registers an already boxed action.
    pub fn route_boxed(
        &mut self,
        method: Method,
        pattern: &str,
        name: Option<&str>,
        action: BoxedAction,
    ) -> Result<&mut Self, RouteError> {
        self.router.register(pattern, name, method, action)?;
        Ok(self)
    }

    /// Registers a `GET` route.
    pub fn get<F>(&mut self, pattern: &str, action: F) -> Result<&mut Self, RouteError>
    where
        F: Fn(&mut Context<'_>) -> ActionResult + Send + Sync + 'static,
    {
        self.route(Method::GET, pattern, action)
    }

    /// Registers a `POST` route.
    pub fn post<F>(&mut self, pattern: &str, action: F) -> Result<&mut Self, RouteError>
    where
        F: Fn(&mut Context<'_>) -> ActionResult + Send + Sync + 'static,
    {
        self.route(Method::POST, pattern, action)
    }

    /// Registers a `PUT` route.
    pub fn put<F>(&mut self, pattern: &str, action: F) -> Result<&mut Self, RouteError>
    where
        F: Fn(&mut Context<'_>) -> ActionResult + Send + Sync + 'static,
    {
        self.route(Method::PUT, pattern, action)
    }

    /// Registers a `PATCH` route.
    pub fn patch<F>(&mut self, pattern: &str, action: F) -> Result<&mut Self, RouteError>
    where
        F: Fn(&mut Context<'_>) -> ActionResult + Send + Sync + 'static,
    {
        self.route(Method::PATCH, pattern, action)
    }

    /// Registers a `DELETE` route.
    pub fn delete<F>(&mut self, pattern: &str, action: F) -> Result<&mut Self, RouteError>
    where
        F: Fn(&mut Context<'_>) -> ActionResult + Send + Sync + 'static,
    {
        self.route(Method::DELETE, pattern, action)
    }

    /// Registers a route definition.
    pub fn add(&mut self, def: RouteDef<BoxedAction>) -> Result<&mut Self, RouteError> {
        self.router.add(def)?;
        Ok(self)
    }

    /// Registers routes under an additional prefix.
    pub fn group<F>(&mut self, prefix: &str, f: F) -> Result<&mut Self, RouteError>
    where
        F: FnOnce(&mut Routes<'_>) -> Result<(), RouteError>,
    {
        self.router.group(prefix, |router| f(&mut Routes::new(router)))?;
        Ok(self)
    }
}

impl std::fmt::Debug for Routes<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Routes")
            .field("prefix", &self.router.prefix())
            .field("routes", &self.router.len())
            .finish()
    }
}
