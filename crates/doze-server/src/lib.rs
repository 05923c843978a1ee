//! # doze-server
//!
//! Request dispatch for doze.
//!
//! - [`Dispatcher`] matches a request, answers `404`/`405` itself, runs
//!   interceptors and the middleware chain, and contains handler panics
//! - [`Routes`] is the registration surface: routes, named routes, groups
//!   and declarative route maps
//! - [`service`] (feature `hyper`, on by default) serves a dispatcher over
//!   HTTP/1.1 with graceful shutdown
//!
//! ## Example
//!
//! ```rust
//! use bytes::Bytes;
//! use doze_core::Response;
//! use doze_middleware::stages::RequestIdMiddleware;
//! use doze_server::Dispatcher;
//! use http::{Request, StatusCode};
//!
//! let dispatcher = Dispatcher::builder()
//!     .middleware(RequestIdMiddleware::new())
//!     .get("/ping", |_ctx| Ok(Some(Response::text(StatusCode::OK, "pong"))))
//!     .build()
//!     .unwrap();
//!
//! let response = dispatcher.handle(Request::get("/ping").body(Bytes::new()).unwrap());
//! assert_eq!(response.status(), StatusCode::OK);
//! assert!(response.headers().contains_key("x-request-id"));
//! ```

#![doc(html_root_url = "https://docs.rs/doze-server/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod dispatcher;
pub mod error;
pub mod routes;
#[cfg(feature = "hyper")]
pub mod service;
#[cfg(feature = "hyper")]
pub mod shutdown;

pub use dispatcher::{Dispatcher, DispatcherBuilder, Outcome};
pub use error::ServerError;
pub use routes::Routes;
#[cfg(feature = "hyper")]
pub use service::{serve, serve_with_shutdown, Server};
#[cfg(feature = "hyper")]
pub use shutdown::{ConnectionToken, ConnectionTracker, ShutdownSignal};
