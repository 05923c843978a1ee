//! Request ID middleware.
//!
//! Every context is created with a fresh UUID v7 request ID. This middleware
//! optionally adopts the caller's `x-request-id` instead, and always stages
//! the ID as an `x-request-id` response header before the rest of the chain
//! runs, so it goes out with whatever response is eventually sent.

use doze_core::{Context, DispatchResult, RequestId};
use http::HeaderValue;

use crate::middleware::{Middleware, Next};

/// The header name for request ID propagation.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Middleware that propagates request IDs.
///
/// # Example
///
/// ```
/// use doze_middleware::stages::RequestIdMiddleware;
/// use doze_middleware::Pipeline;
///
/// let pipeline = Pipeline::builder()
///     .middleware(RequestIdMiddleware::trust_incoming())
///     .build();
/// assert_eq!(pipeline.stage_names(), vec!["request_id"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RequestIdMiddleware {
    /// Whether to adopt a valid incoming `x-request-id`.
    ///
    /// Only enable this behind something that controls the header.
    trust_incoming: bool,
}

impl RequestIdMiddleware {
    /// Creates a middleware that ignores incoming request IDs.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a middleware that adopts incoming `x-request-id` headers.
    #[must_use]
    pub fn trust_incoming() -> Self {
        Self {
            trust_incoming: true,
        }
    }

    fn incoming(&self, ctx: &Context<'_>) -> Option<RequestId> {
        if !self.trust_incoming {
            return None;
        }
        ctx.headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(RequestId::parse)
    }
}

impl Middleware for RequestIdMiddleware {
    fn name(&self) -> &'static str {
        "request_id"
    }

    fn handle(&self, ctx: &mut Context<'_>, next: Next<'_>) -> DispatchResult<()> {
        if let Some(request_id) = self.incoming(ctx) {
            ctx.set_request_id(request_id);
        }

        // a hyphenated UUID is always a valid header value
        if let Ok(value) = HeaderValue::from_str(&ctx.request_id().to_string()) {
            ctx.writer_mut()
                .headers_mut()
                .insert(REQUEST_ID_HEADER, value);
        }

        next.run(ctx)
    }
}
