//! The action contract.
//!
//! An [`Action`] is the terminal step of a request: it receives the
//! [`Context`] and returns an optional [`Response`]. Returning `Ok(None)`
//! means there is nothing further to send, either because the action wrote
//! the response itself or because it deliberately produced none.

use std::sync::Arc;

use crate::context::Context;
use crate::error::DispatchError;
use crate::response::Response;

/// What an action returns.
pub type ActionResult = Result<Option<Response>, DispatchError>;

/// The terminal handler of a route.
///
/// Any `Fn(&mut Context<'_>) -> ActionResult` closure or function is an
/// action. Types that carry their own state implement the trait directly.
///
/// # Example
///
/// ```
/// use doze_core::{action, Action, ActionResult, Context, Response};
/// use http::StatusCode;
///
/// struct Greeter {
///     greeting: &'static str,
/// }
///
/// impl Action for Greeter {
///     fn call(&self, ctx: &mut Context<'_>) -> ActionResult {
///         let name = ctx.param_str("name").unwrap_or("stranger");
///         Ok(Some(Response::text(StatusCode::OK, format!("{} {name}", self.greeting))))
///     }
/// }
///
/// let hello = Greeter { greeting: "hello" };
/// let ping = action(|_ctx| Ok(Some(Response::text(StatusCode::OK, "pong"))));
/// # let _ = (hello, ping);
/// ```
pub trait Action: Send + Sync {
    /// Runs the action.
    fn call(&self, ctx: &mut Context<'_>) -> ActionResult;
}

impl<F> Action for F
where
    F: Fn(&mut Context<'_>) -> ActionResult + Send + Sync,
{
    fn call(&self, ctx: &mut Context<'_>) -> ActionResult {
        self(ctx)
    }
}

/// A shareable, type-erased action.
pub type BoxedAction = Arc<dyn Action>;

/// Pins a closure to the action signature.
///
/// Closures stored before they are called need their argument type spelled
/// out for the compiler; passing them through this function does that.
pub fn action<F>(f: F) -> F
where
    F: Fn(&mut Context<'_>) -> ActionResult + Send + Sync + 'static,
{
    f
}

/// Boxes an action for storage in a router.
pub fn boxed<A: Action + 'static>(action: A) -> BoxedAction {
    Arc::new(action)
}
