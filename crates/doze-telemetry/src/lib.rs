//! Logging and request metrics for doze.
//!
//! - **Logging**: [`init_logging`] installs a `tracing-subscriber` registry
//!   with an env filter and a JSON, pretty or compact `fmt` layer.
//! - **Metrics**: [`metrics`] records request counters and histograms through
//!   the `metrics` facade. Exporting them is left to the host.
//!
//! # Example
//!
//! ```rust,ignore
//! use doze_telemetry::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig::production())?;
//! doze_telemetry::metrics::describe_metrics();
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::TelemetryError;
pub use logging::{create_env_filter, init_logging, LogConfig, LogFormat};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
