//! Middleware chains.
//!
//! A [`Pipeline`] is the ordered list of global middleware, built once at
//! startup and shared read-only by every request. For each request the
//! dispatcher pairs it with the matched route's action into a [`Chain`] and
//! runs it against that request's [`Context`].
//!
//! ```text
//! Request → M1 → M2 → … → Mn → Action → send (at most once)
//!            ↑ short-circuit: any step that does not call `next` ends here
//! ```

use std::sync::Arc;

use doze_core::{Action, Context, DispatchResult};

use crate::middleware::{BoxedMiddleware, FnMiddleware, Middleware, Next};

/// An ordered set of middleware bound to a terminal action.
pub struct Chain<'c> {
    middlewares: &'c [BoxedMiddleware],
    action: &'c dyn Action,
}

/// Binds `middlewares` and `action` into a runnable chain.
pub fn chain<'c>(middlewares: &'c [BoxedMiddleware], action: &'c dyn Action) -> Chain<'c> {
    Chain {
        middlewares,
        action,
    }
}

impl Chain<'_> {
    /// Runs the chain from the first middleware.
    pub fn run(&self, ctx: &mut Context<'_>) -> DispatchResult<()> {
        ctx.set_chain_index(0);
        Next::new(self.middlewares, self.action).run(ctx)
    }

    /// Number of middleware in front of the action.
    #[must_use]
    pub fn len(&self) -> usize {
        self.middlewares.len()
    }

    /// Returns true if the action runs directly.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.middlewares.is_empty()
    }
}

impl std::fmt::Debug for Chain<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chain")
            .field(
                "middlewares",
                &self.middlewares.iter().map(|m| m.name()).collect::<Vec<_>>(),
            )
            .finish_non_exhaustive()
    }
}

/// The global middleware list.
///
/// # Example
///
/// ```
/// use bytes::Bytes;
/// use doze_core::{action, BufferedSink, Context, Response};
/// use doze_middleware::Pipeline;
/// use http::{Request, StatusCode};
///
/// let pipeline = Pipeline::builder()
///     .middleware_fn("greet", |ctx, next| {
///         ctx.set("greeting", "hello");
///         next.run(ctx)
///     })
///     .build();
///
/// let hello = action(|ctx| {
///     let greeting = ctx.get::<&str>("greeting").copied().unwrap_or("?");
///     Ok(Some(Response::text(StatusCode::OK, greeting)))
/// });
///
/// let mut sink = BufferedSink::new();
/// let request = Request::get("/").body(Bytes::new()).unwrap();
/// let mut ctx = Context::new(request, &mut sink);
/// pipeline.chain(&hello).run(&mut ctx).unwrap();
/// drop(ctx);
/// assert_eq!(sink.body(), b"hello");
/// ```
#[derive(Clone, Default)]
pub struct Pipeline {
    middlewares: Vec<BoxedMiddleware>,
}

impl Pipeline {
    /// Creates a new pipeline builder.
    #[must_use]
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// Creates an empty pipeline.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds this pipeline to an action.
    pub fn chain<'c>(&'c self, action: &'c dyn Action) -> Chain<'c> {
        chain(&self.middlewares, action)
    }

    /// Runs this pipeline and `action` against a request.
    pub fn run(&self, ctx: &mut Context<'_>, action: &dyn Action) -> DispatchResult<()> {
        self.chain(action).run(ctx)
    }

    /// Returns the names of all middleware in order.
    #[must_use]
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.middlewares.iter().map(|m| m.name()).collect()
    }

    /// Returns the number of middleware.
    #[must_use]
    pub fn len(&self) -> usize {
        self.middlewares.len()
    }

    /// Returns true if there is no middleware.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.middlewares.is_empty()
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("stages", &self.stage_names())
            .finish()
    }
}

/// Builder for constructing a [`Pipeline`].
#[derive(Default)]
pub struct PipelineBuilder {
    middlewares: Vec<BoxedMiddleware>,
}

impl PipelineBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a middleware. Middleware runs in the order it was added.
    #[must_use]
    pub fn middleware<M: Middleware>(mut self, middleware: M) -> Self {
        self.middlewares.push(Arc::new(middleware));
        self
    }

    /// Appends an already shared middleware.
    #[must_use]
    pub fn boxed(mut self, middleware: BoxedMiddleware) -> Self {
        self.middlewares.push(middleware);
        self
    }

    /// Appends a closure as middleware.
    #[must_use]
    pub fn middleware_fn<F>(self, name: &'static str, func: F) -> Self
    where
        F: Fn(&mut Context<'_>, Next<'_>) -> DispatchResult<()> + Send + Sync + 'static,
    {
        self.middleware(FnMiddleware::new(name, func))
    }

    /// Builds the pipeline.
    #[must_use]
    pub fn build(self) -> Pipeline {
        Pipeline {
            middlewares: self.middlewares,
        }
    }
}
