//! Typed configuration for doze.
//!
//! This crate provides a strongly-typed configuration for doze hosts with
//! support for:
//! - TOML and JSON configuration files
//! - Environment variable overrides
//! - Strict validation (fails on unknown fields)
//! - Layered configuration (defaults → files → env)
//!
//! # Overview
//!
//! [`DozeConfig`] has three sections:
//!
//! - [`ServerConfig`] - bind address, body limit and shutdown timeout
//! - [`RouterConfig`] - prefix and matching options of the default router
//! - [`LoggingConfig`] - log filter and format
//!
//! # Example
//!
//! ```no_run
//! use doze_config::ConfigLoader;
//!
//! # fn main() -> Result<(), doze_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_defaults()
//!     .with_optional_file("doze.toml")?
//!     .with_env_prefix("DOZE")
//!     .load()?;
//!
//! println!("listening on {}", config.server.http_addr);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration File Format
//!
//! ```toml
//! [server]
//! http_addr = "0.0.0.0:8080"
//! max_body_bytes = 2097152
//! shutdown_timeout_secs = 30
//!
//! [router]
//! prefix = "/api"
//! strip_trailing_slash = true
//! inner_wildcards = false
//!
//! [logging]
//! enabled = true
//! level = "info"
//! format = "json"
//! ```
//!
//! # Environment Variable Overrides
//!
//! Values can be overridden with variables of the form `PREFIX__SECTION__KEY`:
//!
//! - `DOZE__SERVER__HTTP_ADDR=0.0.0.0:9000`
//! - `DOZE__ROUTER__PREFIX=/v2`
//! - `DOZE__LOGGING__FORMAT=pretty`

#![warn(missing_docs)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::DozeConfig;
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::{LoggingConfig, RouterConfig, ServerConfig};
