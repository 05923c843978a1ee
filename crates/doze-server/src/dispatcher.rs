//! Request dispatch.
//!
//! The [`Dispatcher`] owns the router, the global middleware pipeline and the
//! interceptors. For every request it:
//!
//! 1. matches method and path, answering `404` or `405` (with `Allow`) itself
//! 2. records the matched route and its parameters on the [`Context`]
//! 3. runs the interceptors, stopping at the first that returns `false`
//! 4. runs the middleware chain around the route's action, which sends the
//!    action's response at most once
//! 5. turns an error or a panic into a `500`-class response when nothing has
//!    been sent yet
//!
//! Dispatch is synchronous. Hosts call it from one task per request; the
//! dispatcher holds no per-request state and is shared behind an `Arc`.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};

use bytes::Bytes;
use doze_config::DozeConfig;
use doze_core::{
    ActionResult, BoxedAction, BufferedSink, Context, DispatchError, Response, ResponseSender,
    ResponseSink, RouteInfo,
};
use doze_middleware::{
    run_interceptors, BoxedInterceptor, BoxedMiddleware, Interceptor, Middleware, Next, Pipeline,
    PipelineBuilder,
};
use doze_router::{BuildError, MatchError, ParamValue, RouteDef, RouteError, RouteMatch, Router};
use doze_telemetry::metrics::{record_miss, MissKind};
use http::{Method, Request, StatusCode};
use tracing::{debug, error, warn};

use crate::error::ServerError;
use crate::routes::Routes;

/// How dispatch of one request ended.
#[derive(Debug)]
pub enum Outcome {
    /// The chain ran to the end or was short-circuited by a middleware.
    Completed {
        /// Status sent, or `None` if nothing was written.
        status: Option<StatusCode>,
        /// Body bytes sent.
        bytes: usize,
    },
    /// No route matches the path; `404` was sent.
    NotFound,
    /// A route matches the path but not the method; `405` was sent.
    MethodNotAllowed {
        /// Methods the route handles.
        allowed: Vec<Method>,
    },
    /// An interceptor stopped dispatch before the chain.
    Intercepted {
        /// Position of the interceptor that returned `false`.
        index: usize,
    },
    /// A middleware or the action failed or panicked.
    Failed(DispatchError),
}

impl Outcome {
    /// Returns true if the chain completed.
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }
}

/// Routes requests through interceptors and the middleware chain.
///
/// # Example
///
/// ```
/// use bytes::Bytes;
/// use doze_core::Response;
/// use doze_server::Dispatcher;
/// use http::{Request, StatusCode};
///
/// let dispatcher = Dispatcher::builder()
///     .get("/people/{id:i}", |ctx| {
///         let id = ctx.param_int("id").unwrap_or_default();
///         Ok(Some(Response::text(StatusCode::OK, format!("person {id}"))))
///     })
///     .build()
///     .unwrap();
///
/// let response = dispatcher.handle(Request::get("/people/10").body(Bytes::new()).unwrap());
/// assert_eq!(response.status(), StatusCode::OK);
/// assert_eq!(response.body(), "person 10");
///
/// let response = dispatcher.handle(Request::get("/people/abc").body(Bytes::new()).unwrap());
/// assert_eq!(response.status(), StatusCode::NOT_FOUND);
/// ```
pub struct Dispatcher {
    router: Router<BoxedAction>,
    pipeline: Pipeline,
    interceptors: Vec<BoxedInterceptor>,
}

impl Dispatcher {
    /// Creates a new dispatcher builder.
    #[must_use]
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::new()
    }

    /// The router.
    #[must_use]
    pub const fn router(&self) -> &Router<BoxedAction> {
        &self.router
    }

    /// The global middleware pipeline.
    #[must_use]
    pub const fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Builds the path of a named route.
    ///
    /// # Errors
    ///
    /// See [`Router::build`].
    pub fn build_path<I, K, V>(&self, name: &str, params: I) -> Result<String, BuildError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<ParamValue>,
    {
        self.router.build(name, params)
    }

    /// Dispatches a request whose response goes to `sink`.
    ///
    /// Nothing is written to `sink` when the action returns no response and
    /// writes none itself, or when an interceptor stops dispatch silently.
    pub fn dispatch(&self, request: Request<Bytes>, sink: &mut dyn ResponseSink) -> Outcome {
        let mut ctx = Context::new(request, sink);
        self.dispatch_context(&mut ctx)
    }

    /// Dispatches a request and returns the buffered response.
    ///
    /// A request that produced no response gets `200 OK` with an empty body
    /// and whatever headers were staged.
    pub fn handle(&self, request: Request<Bytes>) -> http::Response<Bytes> {
        let mut sink = BufferedSink::new();
        {
            let mut ctx = Context::new(request, &mut sink);
            self.dispatch_context(&mut ctx);
            if !ctx.is_written() {
                if let Err(e) = ctx.writer_mut().write_head(StatusCode::OK) {
                    warn!(error = %e, "failed to finish empty response");
                }
            }
        }
        sink.into_response()
    }

    /// Dispatches a request on an existing context.
    ///
    /// Panics raised by interceptors, middleware or the action are caught here
    /// and reported as [`Outcome::Failed`].
    pub fn dispatch_context(&self, ctx: &mut Context<'_>) -> Outcome {
        match catch_unwind(AssertUnwindSafe(|| self.run(ctx))) {
            Ok(outcome) => outcome,
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                self.fail(ctx, DispatchError::Panic(message))
            }
        }
    }

    fn run(&self, ctx: &mut Context<'_>) -> Outcome {
        let method = ctx.method().clone();
        let RouteMatch {
            route,
            handler,
            params,
        } = match self.router.match_route(&method, ctx.path()) {
            Ok(found) => found,
            Err(MatchError::NotFound { path }) => {
                debug!(%method, path, "no route");
                record_miss(MissKind::NotFound);
                return reject(ctx, &Response::not_found(), Outcome::NotFound);
            }
            Err(MatchError::MethodNotAllowed { path, allowed, .. }) => {
                debug!(%method, path, ?allowed, "method not allowed");
                record_miss(MissKind::MethodNotAllowed);
                let response = Response::method_not_allowed(&allowed);
                return reject(ctx, &response, Outcome::MethodNotAllowed { allowed });
            }
        };

        ctx.set_route(RouteInfo {
            template: route.path().to_string(),
            name: route.name().map(ToString::to_string),
        });
        ctx.set_params(params);

        if let Some(index) = run_interceptors(&self.interceptors, ctx) {
            debug!(
                request_id = %ctx.request_id(),
                route = route.path(),
                index,
                "stopped by interceptor"
            );
            return Outcome::Intercepted { index };
        }

        match self.pipeline.chain(handler.as_ref()).run(ctx) {
            Ok(()) => Outcome::Completed {
                status: ctx.status(),
                bytes: ctx.bytes_written(),
            },
            Err(err) => self.fail(ctx, err),
        }
    }

    fn fail(&self, ctx: &mut Context<'_>, err: DispatchError) -> Outcome {
        error!(
            request_id = %ctx.request_id(),
            method = %ctx.method(),
            path = ctx.path(),
            error = %err,
            "request failed"
        );

        // A failed send means the transport is gone.
        if !ctx.is_written() && !matches!(err, DispatchError::Send(_)) {
            let request_id = ctx.request_id().to_string();
            let response = Response::from_error(&err, Some(&request_id));
            if let Err(send_err) = ctx.send(&response) {
                warn!(request_id, error = %send_err, "failed to send error response");
            }
        }
        Outcome::Failed(err)
    }
}

fn reject<S: ResponseSender + ?Sized>(ctx: &mut Context<'_>, response: &S, outcome: Outcome) -> Outcome {
    match ctx.send(response) {
        Ok(_) => outcome,
        Err(err) => Outcome::Failed(err),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("prefix", &self.router.prefix())
            .field("routes", &self.router.len())
            .field("pipeline", &self.pipeline)
            .field("interceptors", &self.interceptors.len())
            .finish()
    }
}

/// Builder for a [`Dispatcher`].
///
/// Registration errors are kept and reported by [`build`](Self::build), so
/// registration calls chain without `?`.
#[derive(Default)]
pub struct DispatcherBuilder {
    router: Router<BoxedAction>,
    pipeline: PipelineBuilder,
    interceptors: Vec<BoxedInterceptor>,
    error: Option<RouteError>,
}

impl DispatcherBuilder {
    /// Creates a builder with a default router.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder whose router follows the configured prefix and
    /// matching options.
    #[must_use]
    pub fn from_config(config: &DozeConfig) -> Self {
        let mut router = Router::with_options(config.router.options());
        router.set_prefix(config.router.prefix.clone());
        Self::with_router(router)
    }

    /// Creates a builder around a router configured elsewhere, such as one
    /// taken out of a [`RouterRegistry`](doze_router::RouterRegistry).
    #[must_use]
    pub fn with_router(router: Router<BoxedAction>) -> Self {
        Self {
            router,
            ..Self::default()
        }
    }

    /// Sets the prefix for routes registered afterwards.
    #[must_use]
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.router.set_prefix(prefix);
        self
    }

    /// Registers a closure for a method and template.
    #[must_use]
    pub fn route<F>(self, method: Method, pattern: &str, action: F) -> Self
    where
        F: Fn(&mut Context<'_>) -> ActionResult + Send + Sync + 'static,
    {
        self.routes(|r| r.route(method, pattern, action).map(drop))
    }

    /// Registers a named closure for a method and template.
    #[must_use]
    pub fn named<F>(self, method: Method, pattern: &str, name: &str, action: F) -> Self
    where
        F: Fn(&mut Context<'_>) -> ActionResult + Send + Sync + 'static,
    {
        self.routes(|r| r.named(method, pattern, name, action).map(drop))
    }

    /// Registers a `GET` route.
    #[must_use]
    pub fn get<F>(self, pattern: &str, action: F) -> Self
    where
        F: Fn(&mut Context<'_>) -> ActionResult + Send + Sync + 'static,
    {
        self.route(Method::GET, pattern, action)
    }

    /// Registers a `POST` route.
    #[must_use]
    pub fn post<F>(self, pattern: &str, action: F) -> Self
    where
        F: Fn(&mut Context<'_>) -> ActionResult + Send + Sync + 'static,
    {
        self.route(Method::POST, pattern, action)
    }

    /// Registers a route definition.
    #[must_use]
    pub fn add(self, def: RouteDef<BoxedAction>) -> Self {
        self.routes(|r| r.add(def).map(drop))
    }

    /// Registers a declarative route map.
    #[must_use]
    pub fn route_map<I>(mut self, defs: I) -> Self
    where
        I: IntoIterator<Item = RouteDef<BoxedAction>>,
    {
        if self.error.is_none() {
            if let Err(e) = self.router.route_map(defs) {
                self.error = Some(e);
            }
        }
        self
    }

    /// Registers routes through a [`Routes`] handle.
    #[must_use]
    pub fn routes<F>(mut self, f: F) -> Self
    where
        F: FnOnce(&mut Routes<'_>) -> Result<(), RouteError>,
    {
        if self.error.is_none() {
            if let Err(e) = f(&mut Routes::new(&mut self.router)) {
                self.error = Some(e);
            }
        }
        self
    }

    /// Registers routes under an additional prefix.
    #[must_use]
    pub fn group<F>(self, prefix: &str, f: F) -> Self
    where
        F: FnOnce(&mut Routes<'_>) -> Result<(), RouteError>,
    {
        self.routes(|r| r.group(prefix, f).map(drop))
    }

    /// Appends a global middleware. Middleware runs in the order added.
    #[must_use]
    pub fn middleware<M: Middleware>(mut self, middleware: M) -> Self {
        self.pipeline = self.pipeline.middleware(middleware);
        self
    }

    /// Appends an already shared middleware.
    #[must_use]
    pub fn boxed_middleware(mut self, middleware: BoxedMiddleware) -> Self {
        self.pipeline = self.pipeline.boxed(middleware);
        self
    }

    /// Appends a closure as global middleware.
    #[must_use]
    pub fn middleware_fn<F>(mut self, name: &'static str, func: F) -> Self
    where
        F: Fn(&mut Context<'_>, Next<'_>) -> doze_core::DispatchResult<()> + Send + Sync + 'static,
    {
        self.pipeline = self.pipeline.middleware_fn(name, func);
        self
    }

    /// Appends an interceptor.
    #[must_use]
    pub fn intercept<I: Interceptor>(mut self, interceptor: I) -> Self {
        self.interceptors.push(std::sync::Arc::new(interceptor));
        self
    }

    /// Builds the dispatcher.
    ///
    /// # Errors
    ///
    /// Returns the first registration error.
    pub fn build(self) -> Result<Dispatcher, ServerError> {
        if let Some(e) = self.error {
            return Err(e.into());
        }
        debug!(
            routes = self.router.len(),
            interceptors = self.interceptors.len(),
            "dispatcher built"
        );
        Ok(Dispatcher {
            router: self.router,
            pipeline: self.pipeline.build(),
            interceptors: self.interceptors,
        })
    }
}

impl std::fmt::Debug for DispatcherBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatcherBuilder")
            .field("routes", &self.router.len())
            .field("interceptors", &self.interceptors.len())
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}
