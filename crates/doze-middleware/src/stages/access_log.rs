//! Access log middleware.
//!
//! Runs the rest of the chain, then emits one structured `info!` event per
//! request and records the request metrics from `doze-telemetry`.
//!
//! # Log fields
//!
//! - `request_id` - Unique request identifier
//! - `method`, `path` - From the request line
//! - `route` - The matched template, or `-`
//! - `status` - The status that was sent (or that the error maps to)
//! - `bytes` - Body bytes written
//! - `duration_ms` - Time spent in the rest of the chain

use std::time::Instant;

use doze_core::{Context, DispatchResult};
use doze_telemetry::metrics::{self, InFlight};
use http::StatusCode;
use tracing::info;

use crate::middleware::{Middleware, Next};

/// One request as seen by the access log.
///
/// The middleware stores it in the context extensions after the chain has
/// run, so outer middleware can read it.
#[derive(Debug, Clone, PartialEq)]
pub struct AccessRecord {
    /// The request ID.
    pub request_id: String,
    /// The HTTP method.
    pub method: String,
    /// The request path.
    pub path: String,
    /// The matched route template.
    pub route: Option<String>,
    /// The response status.
    pub status: u16,
    /// Body bytes written.
    pub bytes: usize,
    /// Time spent in the rest of the chain, in milliseconds.
    pub duration_ms: f64,
}

/// Middleware that logs and measures every request.
#[derive(Debug, Clone)]
pub struct AccessLogMiddleware {
    record_metrics: bool,
}

impl AccessLogMiddleware {
    /// Creates an access log that also records metrics.
    #[must_use]
    pub fn new() -> Self {
        Self {
            record_metrics: true,
        }
    }

    /// Enables or disables metric recording.
    #[must_use]
    pub fn with_metrics(mut self, enabled: bool) -> Self {
        self.record_metrics = enabled;
        self
    }
}

impl Default for AccessLogMiddleware {
    fn default() -> Self {
        Self::new()
    }
}

impl Middleware for AccessLogMiddleware {
    fn name(&self) -> &'static str {
        "access_log"
    }

    fn handle(&self, ctx: &mut Context<'_>, next: Next<'_>) -> DispatchResult<()> {
        let start = Instant::now();
        let in_flight = self.record_metrics.then(InFlight::start);

        let result = next.run(ctx);

        drop(in_flight);
        let duration = start.elapsed();
        let status = match &result {
            Ok(()) => ctx.status().unwrap_or(StatusCode::OK),
            Err(err) => err.status_code(),
        };

        let record = AccessRecord {
            request_id: ctx.request_id().to_string(),
            method: ctx.method().to_string(),
            path: ctx.path().to_string(),
            route: ctx.route().map(|r| r.template.clone()),
            status: status.as_u16(),
            bytes: ctx.bytes_written(),
            duration_ms: duration.as_secs_f64() * 1000.0,
        };

        info!(
            request_id = %record.request_id,
            method = %record.method,
            path = %record.path,
            route = record.route.as_deref().unwrap_or("-"),
            status = record.status,
            bytes = record.bytes,
            duration_ms = record.duration_ms,
            "request completed"
        );

        if self.record_metrics {
            let route = record.route.as_deref().unwrap_or("-");
            metrics::record_request(&record.method, route, record.status, duration);
            metrics::record_response_size(route, record.bytes as u64);
        }

        ctx.insert_extension(record);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::Pipeline;
    use bytes::Bytes;
    use doze_core::{action, BufferedSink, DispatchError, Response, RouteInfo};
    use http::Request;

    fn run_with(act: &dyn doze_core::Action) -> (DispatchResult<()>, Option<AccessRecord>) {
        let pipeline = Pipeline::builder()
            .middleware(AccessLogMiddleware::new())
            .build();
        let request = Request::post("/users/7").body(Bytes::new()).unwrap();

        let mut sink = BufferedSink::new();
        let mut ctx = Context::new(request, &mut sink);
        ctx.set_route(RouteInfo {
            template: "/users/{id:i}".to_string(),
            name: None,
        });
        let result = pipeline.run(&mut ctx, act);
        let record = ctx.extension::<AccessRecord>().cloned();
        (result, record)
    }

    #[test]
    fn test_records_completed_request() {
        let act = action(|_ctx| Ok(Some(Response::text(StatusCode::CREATED, "made"))));
        let (result, record) = run_with(&act);
        assert!(result.is_ok());

        let record = record.unwrap();
        assert_eq!(record.method, "POST");
        assert_eq!(record.path, "/users/7");
        assert_eq!(record.route.as_deref(), Some("/users/{id:i}"));
        assert_eq!(record.status, 201);
        assert_eq!(record.bytes, 4);
        assert!(record.duration_ms >= 0.0);
    }

    #[test]
    fn test_records_error_status() {
        let act = action(|_ctx| Err(DispatchError::handler("boom")));
        let (result, record) = run_with(&act);
        assert!(result.is_err());
        assert_eq!(record.unwrap().status, 500);
    }

    #[test]
    fn test_middleware_name() {
        assert_eq!(AccessLogMiddleware::new().name(), "access_log");
        assert!(!AccessLogMiddleware::new().with_metrics(false).record_metrics);
    }
}
