//! Request metrics.
//!
//! Metrics go through the `metrics` facade. Installing a recorder (and
//! exporter) is up to the host; without one every call here is a no-op.
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `doze_requests_total` | Counter | `method`, `route`, `status` | Completed requests |
//! | `doze_request_duration_seconds` | Histogram | `method`, `route` | Request latency |
//! | `doze_response_size_bytes` | Histogram | `route` | Response body size |
//! | `doze_in_flight_requests` | Gauge | - | Requests currently in the chain |
//! | `doze_route_misses_total` | Counter | `kind` | Requests answered 404 or 405 |

use std::time::Duration;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};

/// Registers descriptions for all doze metrics with the installed recorder.
pub fn describe_metrics() {
    describe_counter!("doze_requests_total", "Total number of requests completed");
    describe_histogram!(
        "doze_request_duration_seconds",
        "Request duration in seconds"
    );
    describe_histogram!("doze_response_size_bytes", "Response body size in bytes");
    describe_gauge!(
        "doze_in_flight_requests",
        "Number of requests currently being processed"
    );
    describe_counter!(
        "doze_route_misses_total",
        "Requests that matched no route or no method"
    );
}

/// Records a completed request.
pub fn record_request(method: &str, route: &str, status: u16, duration: Duration) {
    counter!(
        "doze_requests_total",
        "method" => method.to_string(),
        "route" => route.to_string(),
        "status" => status.to_string()
    )
    .increment(1);

    histogram!(
        "doze_request_duration_seconds",
        "method" => method.to_string(),
        "route" => route.to_string()
    )
    .record(duration.as_secs_f64());
}

/// Records the response body size.
pub fn record_response_size(route: &str, size_bytes: u64) {
    histogram!("doze_response_size_bytes", "route" => route.to_string()).record(size_bytes as f64);
}

/// Kind of routing miss.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissKind {
    /// No route matched the path.
    NotFound,
    /// A route matched the path but not the method.
    MethodNotAllowed,
}

impl MissKind {
    /// The label value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::MethodNotAllowed => "method_not_allowed",
        }
    }
}

/// Records a request that no route handled.
pub fn record_miss(kind: MissKind) {
    counter!("doze_route_misses_total", "kind" => kind.as_str()).increment(1);
}

/// Counts a request as in flight until dropped.
///
/// Dropping on unwind keeps the gauge right when a handler panics.
#[derive(Debug)]
pub struct InFlight(());

impl InFlight {
    /// Increments the in-flight gauge.
    #[must_use]
    pub fn start() -> Self {
        gauge!("doze_in_flight_requests").increment(1.0);
        Self(())
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        gauge!("doze_in_flight_requests").decrement(1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_without_recorder_is_noop() {
        describe_metrics();
        record_request("GET", "/users/{id:i}", 200, Duration::from_millis(3));
        record_response_size("/users/{id:i}", 42);
        record_miss(MissKind::NotFound);
        drop(InFlight::start());
    }

    #[test]
    fn test_miss_kind_labels() {
        assert_eq!(MissKind::NotFound.as_str(), "not_found");
        assert_eq!(MissKind::MethodNotAllowed.as_str(), "method_not_allowed");
    }
}
