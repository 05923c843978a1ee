//! # Doze Middleware
//!
//! The synchronous middleware chain for doze.
//!
//! Each middleware receives the request [`Context`](doze_core::Context) and a
//! [`Next`] continuation. Calling `next.run(ctx)` resumes the chain; not
//! calling it short-circuits. Once a response has been written, any further
//! attempt to advance the chain is a no-op, so a response goes out at most
//! once per request.
//!
//! ```text
//! Request → Interceptors → M1 → M2 → … → Action → send
//! ```
//!
//! ## Example
//!
//! ```
//! use doze_middleware::stages::{AccessLogMiddleware, RequestIdMiddleware};
//! use doze_middleware::Pipeline;
//!
//! let pipeline = Pipeline::builder()
//!     .middleware(RequestIdMiddleware::new())
//!     .middleware(AccessLogMiddleware::new())
//!     .middleware_fn("noop", |ctx, next| next.run(ctx))
//!     .build();
//!
//! assert_eq!(pipeline.stage_names(), vec!["request_id", "access_log", "noop"]);
//! ```

#![doc(html_root_url = "https://docs.rs/doze-middleware/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod interceptor;
pub mod middleware;
pub mod pipeline;
pub mod stages;

// Re-export main types at crate root
pub use interceptor::{run_interceptors, BoxedInterceptor, Interceptor};
pub use middleware::{BoxedMiddleware, FnMiddleware, Middleware, Next};
pub use pipeline::{chain, Chain, Pipeline, PipelineBuilder};
