//! # Doze Core
//!
//! Per-request types shared by the doze middleware chain and dispatcher.
//!
//! - [`Context`] - Request, response writer, route parameters and a value bag
//! - [`ResponseWriter`] / [`ResponseSink`] - Byte-counting writer over the transport
//! - [`Response`] / [`ResponseSender`] - Buffered responses and the send contract
//! - [`Action`] - The terminal handler contract
//! - [`DispatchError`] - Errors raised while dispatching a request
//! - [`RequestId`] - UUID v7 request identifier

#![doc(html_root_url = "https://docs.rs/doze-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod context;
mod error;
mod handler;
mod response;
mod writer;

pub use context::{Context, RequestId, RouteInfo};
pub use error::{DispatchError, DispatchResult, ErrorDetail, ErrorEnvelope};
pub use handler::{action, boxed, Action, ActionResult, BoxedAction};
pub use response::{Response, ResponseSender};
pub use writer::{BufferedSink, ResponseSink, ResponseWriter};
