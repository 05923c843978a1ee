//! # doze
//!
//! **Trie-based HTTP routing with typed parameters and a synchronous
//! middleware chain.**
//!
//! - **Typed templates** – `/people/{id:i}/details/{name:a}`, with integer,
//!   alpha, alphanumeric, any and wildcard parameters
//! - **Deterministic matching** – literal > int > alpha > alnum > any >
//!   wildcard, with backtracking
//! - **Reverse routing** – build paths from named routes
//! - **Once-only responses** – a response is sent at most once per request,
//!   however the middleware chain unwinds
//! - **Ambient stack** – layered configuration, structured logging and
//!   request metrics
//!
//! ## Quick Start
//!
//! ```rust
//! use doze::prelude::*;
//!
//! let dispatcher = Dispatcher::builder()
//!     .middleware(RequestIdMiddleware::new())
//!     .named(Method::GET, "/people/{id:i}", "person", |ctx| {
//!         let id = ctx.param_int("id").unwrap_or_default();
//!         Ok(Some(Response::text(StatusCode::OK, format!("person {id}"))))
//!     })
//!     .build()
//!     .unwrap();
//!
//! let path = dispatcher.build_path("person", [("id", 10)]).unwrap();
//! let response = dispatcher.handle(http::Request::get(path).body(Default::default()).unwrap());
//! assert_eq!(response.status(), StatusCode::OK);
//! ```
//!
//! ## Architecture
//!
//! ```text
//! Request → Router (404 / 405) → Interceptors → Middleware… → Action
//!                                                               ↓
//! Response ←──────────────── sent at most once ←────────────────┘
//! ```

#![doc(html_root_url = "https://docs.rs/doze/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export core types
pub use doze_core as core;

// Re-export server types
pub use doze_server as server;

// Re-export middleware types
pub use doze_middleware as middleware;

// Re-export router types
pub use doze_router as router;

// Re-export configuration types
pub use doze_config as config;

// Re-export telemetry types
pub use doze_telemetry as telemetry;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust
/// use doze::prelude::*;
/// ```
pub mod prelude {
    pub use doze_core::{
        action, boxed, Action, ActionResult, BoxedAction, BufferedSink, Context, DispatchError,
        DispatchResult, RequestId, Response, ResponseSender, ResponseSink, RouteInfo,
    };

    pub use doze_router::{
        BuildError, MethodRouter, ParamValue, Params, RouteDef, RouteError, Router, RouterOptions,
        RouterRegistry, DEFAULT_ROUTER,
    };

    pub use doze_middleware::stages::{AccessLogMiddleware, RequestIdMiddleware};
    pub use doze_middleware::{Interceptor, Middleware, Next, Pipeline};

    pub use doze_server::{Dispatcher, DispatcherBuilder, Outcome, Routes, ServerError};
    #[cfg(feature = "hyper")]
    pub use doze_server::{Server, ShutdownSignal};

    pub use doze_config::{ConfigLoader, DozeConfig};
    pub use doze_telemetry::{init_logging, LogConfig, LogFormat};

    pub use http::{Method, StatusCode};
}
