//! Trie router with typed path parameters for doze.
//!
//! This crate compiles route templates into a byte-keyed trie and resolves
//! incoming paths against it in time proportional to the path length.
//!
//! # Features
//!
//! - **Typed Parameters**: `{id:i}` (digits), `{name:a}` (letters),
//!   `{slug:an}` (letters and digits), `{any}` (anything but `/`)
//! - **Wildcards**: rest-of-path captures (`/files/*path`, `/static/*`)
//! - **Deterministic Priority**: literal text, then integer, alphabetic,
//!   alphanumeric, untyped and wildcard branches, with backtracking
//! - **Reverse Routing**: build concrete paths from named routes
//! - **Named Routers**: independent namespaces in a [`RouterRegistry`]
//!
//! # Example
//!
//! ```rust
//! use doze_router::{RouteDef, Router};
//! use http::Method;
//!
//! let mut router = Router::new();
//! router
//!     .route_map([
//!         RouteDef::new("/people/{id:i}").named("person").with(Method::GET, "show"),
//!         RouteDef::new("/files/*path").with(Method::GET, "serve"),
//!     ])
//!     .unwrap();
//!
//! let m = router.match_route(&Method::GET, "/people/10").unwrap();
//! assert_eq!(*m.handler, "show");
//! assert_eq!(m.params.get_int("id"), Some(10));
//!
//! let m = router.match_route(&Method::GET, "/files/css/site.css").unwrap();
//! assert_eq!(m.params.get_str("path"), Some("css/site.css"));
//!
//! assert_eq!(router.build("person", [("id", 42)]).unwrap(), "/people/42");
//! ```
//!
//! # Architecture
//!
//! Each literal byte is a trie edge; parameters occupy reserved typed slots
//! on the node where their segment starts:
//!
//! ```text
//!   (root) -/- p-e-o-p-l-e -/- [Int] -> /people/{id:i}
//!          \
//!           f-i-l-e-s -/- [Wildcard] -> /files/*path
//! ```

mod encoding;
mod error;
mod method_router;
mod node;
mod params;
mod pattern;
mod registry;
mod route;
mod router;

pub use error::{BuildError, MatchError, PatternError, RouteError};
pub use method_router::MethodRouter;
pub use params::{ParamValue, Params};
pub use pattern::{CompileOptions, ParamKind, Pattern, Segment, ANONYMOUS_WILDCARD};
pub use registry::{RouterRegistry, DEFAULT_ROUTER};
pub use route::{MatchResult, Route, RouteDef, RouteMatch};
pub use router::{Router, RouterOptions};
