//! Core middleware trait and types.
//!
//! A [`Middleware`] wraps everything that runs after it. It receives the
//! request [`Context`] and a [`Next`] continuation. Calling
//! [`Next::run`] resumes the chain synchronously; returning without calling
//! it short-circuits the chain, so neither the action nor any later
//! middleware runs.
//!
//! # Example
//!
//! ```
//! use doze_core::{Context, DispatchResult};
//! use doze_middleware::{Middleware, Next};
//!
//! struct Timing;
//!
//! impl Middleware for Timing {
//!     fn name(&self) -> &'static str {
//!         "timing"
//!     }
//!
//!     fn handle(&self, ctx: &mut Context<'_>, next: Next<'_>) -> DispatchResult<()> {
//!         next.run(ctx)?;
//!         tracing::debug!(elapsed = ?ctx.elapsed(), "request finished");
//!         Ok(())
//!     }
//! }
//! ```

use std::sync::Arc;

use doze_core::{Action, Context, DispatchResult};
use tracing::debug;

/// A type-erased middleware that can be stored in a vector.
pub type BoxedMiddleware = Arc<dyn Middleware>;

/// The core middleware trait.
///
/// # Invariants
///
/// - `next` is consumed by [`Next::run`], so it can run at most once
/// - Any state a middleware needs for one request lives in the [`Context`]
pub trait Middleware: Send + Sync + 'static {
    /// Returns the name of this middleware, used in logs.
    fn name(&self) -> &'static str;

    /// Processes the request.
    ///
    /// Errors returned here abort the rest of the chain and are reported to
    /// the dispatcher.
    fn handle(&self, ctx: &mut Context<'_>, next: Next<'_>) -> DispatchResult<()>;
}

/// The rest of the chain after the current middleware.
///
/// Each request builds its own `Next` values over the shared, immutable
/// middleware list; the cursor position is mirrored into the context.
pub struct Next<'c> {
    middlewares: &'c [BoxedMiddleware],
    action: &'c dyn Action,
    index: usize,
}

impl<'c> Next<'c> {
    /// Creates the continuation for the start of a chain.
    pub(crate) fn new(middlewares: &'c [BoxedMiddleware], action: &'c dyn Action) -> Self {
        Self {
            middlewares,
            action,
            index: 0,
        }
    }

    /// Number of steps left, counting the action.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.middlewares.len().saturating_sub(self.index) + 1
    }

    /// Runs the next middleware, or the action when no middleware is left.
    ///
    /// Does nothing once a response has been written. When the action returns
    /// a response it is sent through [`Context::send`], which writes it at
    /// most once.
    pub fn run(self, ctx: &mut Context<'_>) -> DispatchResult<()> {
        if ctx.is_written() {
            debug!(
                request_id = %ctx.request_id(),
                step = self.index,
                "response already sent, skipping rest of chain"
            );
            return Ok(());
        }

        ctx.set_chain_index(self.index);
        match self.middlewares.get(self.index) {
            Some(middleware) => {
                let next = Next {
                    index: self.index + 1,
                    ..self
                };
                middleware.handle(ctx, next)
            }
            None => {
                if let Some(response) = self.action.call(ctx)? {
                    ctx.send(&response)?;
                }
                Ok(())
            }
        }
    }
}

impl std::fmt::Debug for Next<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Next")
            .field("index", &self.index)
            .field("middlewares", &self.middlewares.len())
            .finish_non_exhaustive()
    }
}

/// A middleware built from a closure.
///
/// # Example
///
/// ```
/// use doze_middleware::{FnMiddleware, Middleware};
///
/// let tag = FnMiddleware::new("tag", |ctx, next| {
///     ctx.set("tagged", true);
///     next.run(ctx)
/// });
/// assert_eq!(tag.name(), "tag");
/// ```
pub struct FnMiddleware<F> {
    name: &'static str,
    func: F,
}

impl<F> FnMiddleware<F>
where
    F: Fn(&mut Context<'_>, Next<'_>) -> DispatchResult<()> + Send + Sync + 'static,
{
    /// Creates a new function-based middleware.
    pub const fn new(name: &'static str, func: F) -> Self {
        Self { name, func }
    }
}

impl<F> Middleware for FnMiddleware<F>
where
    F: Fn(&mut Context<'_>, Next<'_>) -> DispatchResult<()> + Send + Sync + 'static,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn handle(&self, ctx: &mut Context<'_>, next: Next<'_>) -> DispatchResult<()> {
        (self.func)(ctx, next)
    }
}

impl<F> std::fmt::Debug for FnMiddleware<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnMiddleware")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use doze_core::{action, BufferedSink, DispatchError, Response};
    use http::{Request, StatusCode};

    struct Visit(&'static str);

    impl Middleware for Visit {
        fn name(&self) -> &'static str {
            self.0
        }

        fn handle(&self, ctx: &mut Context<'_>, next: Next<'_>) -> DispatchResult<()> {
            let index = ctx.chain_index();
            ctx.get_mut::<Vec<String>>("trail")
                .unwrap()
                .push(format!("{}@{index}", self.0));
            next.run(ctx)
        }
    }

    fn request() -> Request<Bytes> {
        Request::get("/").body(Bytes::new()).unwrap()
    }

    #[test]
    fn test_middleware_name() {
        assert_eq!(Visit("first").name(), "first");
    }

    #[test]
    fn test_next_runs_in_order_then_action() {
        let middlewares: Vec<BoxedMiddleware> = vec![Arc::new(Visit("a")), Arc::new(Visit("b"))];
        let act = action(|ctx| {
            let trail = ctx.get::<Vec<String>>("trail").unwrap().join(",");
            Ok(Some(Response::text(StatusCode::OK, trail)))
        });

        let mut sink = BufferedSink::new();
        {
            let mut ctx = Context::new(request(), &mut sink);
            ctx.set("trail", Vec::<String>::new());
            let next = Next::new(&middlewares, &act);
            assert_eq!(next.remaining(), 3);
            next.run(&mut ctx).unwrap();
            assert_eq!(ctx.chain_index(), 2);
        }
        assert_eq!(sink.body(), b"a@0,b@1");
    }

    #[test]
    fn test_next_skips_when_written() {
        let middlewares: Vec<BoxedMiddleware> = vec![Arc::new(Visit("a"))];
        let act = action(|_ctx| panic!("action must not run"));

        let mut sink = BufferedSink::new();
        let mut ctx = Context::new(request(), &mut sink);
        ctx.send(&Response::no_content()).unwrap();
        Next::new(&middlewares, &act).run(&mut ctx).unwrap();
        assert!(ctx.get::<Vec<String>>("trail").is_none());
    }

    #[test]
    fn test_action_error_propagates() {
        let act = action(|_ctx| Err(DispatchError::handler("boom")));
        let mut sink = BufferedSink::new();
        let mut ctx = Context::new(request(), &mut sink);
        let err = Next::new(&[], &act).run(&mut ctx).unwrap_err();
        assert!(matches!(err, DispatchError::Handler { .. }));
        assert!(!ctx.is_written());
    }

    #[test]
    fn test_fn_middleware_short_circuits() {
        let middlewares: Vec<BoxedMiddleware> = vec![Arc::new(FnMiddleware::new(
            "deny",
            |ctx, _next| {
                ctx.send(&Response::text(StatusCode::FORBIDDEN, "no"))?;
                Ok(())
            },
        ))];
        let act = action(|_ctx| panic!("action must not run"));

        let mut sink = BufferedSink::new();
        {
            let mut ctx = Context::new(request(), &mut sink);
            Next::new(&middlewares, &act).run(&mut ctx).unwrap();
        }
        assert_eq!(sink.status(), Some(StatusCode::FORBIDDEN));
    }
}
