//! Built-in middleware stages.
//!
//! - [`request_id`] - Adopt or generate the request ID and echo it back
//! - [`access_log`] - Structured access log and request metrics

pub mod access_log;
pub mod request_id;

pub use access_log::{AccessLogMiddleware, AccessRecord};
pub use request_id::{RequestIdMiddleware, REQUEST_ID_HEADER};
