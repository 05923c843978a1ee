//! Server error types.

use std::io;

use doze_config::ConfigError;
use doze_router::RouteError;
use thiserror::Error;

/// Errors raised while building a dispatcher or running the server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// A route could not be registered.
    #[error("route registration failed: {0}")]
    Route(#[from] RouteError),

    /// The configuration is invalid.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// The listener could not be bound.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// The address that failed.
        addr: String,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// An I/O error outside of a single connection.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
