//! Configuration schema types.
//!
//! Every section rejects unknown fields and fills missing ones from its
//! defaults.

use doze_router::RouterOptions;
use doze_telemetry::{LogConfig, LogFormat};
use serde::{Deserialize, Serialize};

/// Server configuration section.
///
/// # Example
///
/// ```
/// use doze_config::ServerConfig;
///
/// let config = ServerConfig::default();
/// assert_eq!(config.http_addr, "0.0.0.0:8080");
/// assert_eq!(config.max_body_bytes, 2 * 1024 * 1024);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// HTTP server bind address (e.g., "0.0.0.0:8080").
    #[serde(default = "default_http_addr")]
    pub http_addr: String,

    /// Largest request body the host adapter buffers, in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    /// How long to wait for in-flight connections on shutdown.
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: default_http_addr(),
            max_body_bytes: default_max_body_bytes(),
            shutdown_timeout_secs: default_shutdown_timeout(),
        }
    }
}

fn default_http_addr() -> String {
    "0.0.0.0:8080".to_string()
}

const fn default_max_body_bytes() -> usize {
    2 * 1024 * 1024
}

const fn default_shutdown_timeout() -> u64 {
    30
}

/// Router configuration section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RouterConfig {
    /// Prefix for every route of the default router, e.g. `/api/v1`.
    #[serde(default)]
    pub prefix: String,

    /// Ignore one trailing `/` on incoming paths.
    #[serde(default = "default_true")]
    pub strip_trailing_slash: bool,

    /// Allow wildcards before the last segment of a template.
    #[serde(default)]
    pub inner_wildcards: bool,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            strip_trailing_slash: true,
            inner_wildcards: false,
        }
    }
}

impl RouterConfig {
    /// The router options this section describes.
    #[must_use]
    pub const fn options(&self) -> RouterOptions {
        RouterOptions {
            strip_trailing_slash: self.strip_trailing_slash,
            inner_wildcards: self.inner_wildcards,
        }
    }
}

impl From<&RouterConfig> for RouterOptions {
    fn from(config: &RouterConfig) -> Self {
        config.options()
    }
}

/// Logging configuration section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Enable logging.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Filter directive (e.g., "info", "doze_router=debug,info").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: LogFormat::Json,
        }
    }
}

impl LoggingConfig {
    /// The telemetry logging config this section describes.
    ///
    /// Pretty output also turns on source locations and span events.
    #[must_use]
    pub fn log_config(&self) -> LogConfig {
        let base = match self.format {
            LogFormat::Pretty => LogConfig::development(),
            LogFormat::Json | LogFormat::Compact => LogConfig::production(),
        };
        LogConfig {
            enabled: self.enabled,
            ..base.with_level(self.level.clone()).with_format(self.format)
        }
    }
}

impl From<&LoggingConfig> for LogConfig {
    fn from(config: &LoggingConfig) -> Self {
        config.log_config()
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

const fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_defaults_fill_missing_fields() {
        let config: ServerConfig = toml::from_str(r#"http_addr = "127.0.0.1:3000""#).unwrap();
        assert_eq!(config.http_addr, "127.0.0.1:3000");
        assert_eq!(config.shutdown_timeout_secs, 30);
    }

    #[test]
    fn test_router_config_to_options() {
        let config = RouterConfig {
            inner_wildcards: true,
            ..RouterConfig::default()
        };
        let options = RouterOptions::from(&config);
        assert!(options.strip_trailing_slash);
        assert!(options.inner_wildcards);
    }

    #[test]
    fn test_router_config_rejects_unknown_fields() {
        let result: Result<RouterConfig, _> = toml::from_str("case_insensitive = true");
        assert!(result.is_err());
    }

    #[test]
    fn test_logging_config_to_log_config() {
        let config = LoggingConfig {
            enabled: false,
            level: "warn".to_string(),
            format: LogFormat::Pretty,
        };
        let log = config.log_config();
        assert!(!log.enabled);
        assert_eq!(log.level, "warn");
        assert_eq!(log.format, LogFormat::Pretty);
        assert!(log.file_line_info);

        let log = LogConfig::from(&LoggingConfig::default());
        assert_eq!(log.format, LogFormat::Json);
        assert!(!log.file_line_info);
    }
}
