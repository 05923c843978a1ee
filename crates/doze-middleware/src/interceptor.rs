//! Interceptors.
//!
//! An [`Interceptor`] is a boolean guard the dispatcher runs after routing and
//! before the middleware chain. Returning `false` stops dispatch; whatever the
//! interceptor wrote to the response stays the response.

use std::sync::Arc;

use doze_core::Context;

/// A guard that decides whether a request reaches the chain.
///
/// Any `Fn(&mut Context<'_>) -> bool` is an interceptor.
///
/// # Example
///
/// ```
/// use doze_core::{Context, Response};
/// use doze_middleware::Interceptor;
/// use http::StatusCode;
///
/// let require_key = |ctx: &mut Context<'_>| {
///     if ctx.headers().contains_key("x-api-key") {
///         return true;
///     }
///     let _ = ctx.send(&Response::text(StatusCode::UNAUTHORIZED, "missing key"));
///     false
/// };
/// # fn assert_interceptor<I: Interceptor>(_: &I) {}
/// # assert_interceptor(&require_key);
/// ```
pub trait Interceptor: Send + Sync + 'static {
    /// Returns true to continue dispatch.
    fn intercept(&self, ctx: &mut Context<'_>) -> bool;
}

impl<F> Interceptor for F
where
    F: Fn(&mut Context<'_>) -> bool + Send + Sync + 'static,
{
    fn intercept(&self, ctx: &mut Context<'_>) -> bool {
        self(ctx)
    }
}

/// A shareable, type-erased interceptor.
pub type BoxedInterceptor = Arc<dyn Interceptor>;

/// Runs interceptors in order until one returns false.
///
/// Returns the index of the interceptor that stopped dispatch, or `None` if
/// all of them let the request through.
pub fn run_interceptors(interceptors: &[BoxedInterceptor], ctx: &mut Context<'_>) -> Option<usize> {
    interceptors
        .iter()
        .position(|interceptor| !interceptor.intercept(ctx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use doze_core::BufferedSink;
    use http::Request;

    fn counting(pass: bool) -> BoxedInterceptor {
        Arc::new(move |ctx: &mut Context<'_>| {
            let seen = ctx.get::<u32>("seen").copied().unwrap_or(0);
            ctx.set("seen", seen + 1);
            pass
        })
    }

    #[test]
    fn test_all_pass() {
        let interceptors = vec![counting(true), counting(true)];
        let mut sink = BufferedSink::new();
        let mut ctx = Context::new(Request::get("/").body(Bytes::new()).unwrap(), &mut sink);
        assert_eq!(run_interceptors(&interceptors, &mut ctx), None);
        assert_eq!(ctx.get::<u32>("seen"), Some(&2));
    }

    #[test]
    fn test_first_false_stops() {
        let interceptors = vec![counting(true), counting(false), counting(true)];
        let mut sink = BufferedSink::new();
        let mut ctx = Context::new(Request::get("/").body(Bytes::new()).unwrap(), &mut sink);
        assert_eq!(run_interceptors(&interceptors, &mut ctx), Some(1));
        assert_eq!(ctx.get::<u32>("seen"), Some(&2));
    }

    #[test]
    fn test_empty_list_passes() {
        let mut sink = BufferedSink::new();
        let mut ctx = Context::new(Request::get("/").body(Bytes::new()).unwrap(), &mut sink);
        assert_eq!(run_interceptors(&[], &mut ctx), None);
    }
}
