//! Main configuration type.

use serde::{Deserialize, Serialize};

use crate::{ConfigError, LoggingConfig, RouterConfig, ServerConfig};

/// Complete doze configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load it from files and
/// environment variables.
///
/// # Example
///
/// ```
/// use doze_config::DozeConfig;
///
/// let config = DozeConfig::default();
/// assert_eq!(config.server.http_addr, "0.0.0.0:8080");
/// assert!(config.router.strip_trailing_slash);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct DozeConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// Router configuration.
    #[serde(default)]
    pub router: RouterConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl DozeConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if:
    /// - `server.http_addr` is not a socket address
    /// - `server.max_body_bytes` is zero
    /// - `router.prefix` is non-empty and does not start with `/`, or ends with `/`
    /// - `logging.level` is not a valid filter directive
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self
            .server
            .http_addr
            .parse::<std::net::SocketAddr>()
            .is_err()
        {
            return Err(ConfigError::invalid_value(
                "server.http_addr",
                format!("invalid socket address: {}", self.server.http_addr),
            ));
        }

        if self.server.max_body_bytes == 0 {
            return Err(ConfigError::invalid_value(
                "server.max_body_bytes",
                "must be greater than zero",
            ));
        }

        let prefix = &self.router.prefix;
        if !prefix.is_empty() {
            if !prefix.starts_with('/') {
                return Err(ConfigError::invalid_value(
                    "router.prefix",
                    format!("must start with '/': {prefix}"),
                ));
            }
            if prefix.ends_with('/') {
                return Err(ConfigError::invalid_value(
                    "router.prefix",
                    format!("must not end with '/': {prefix}"),
                ));
            }
        }

        if self.logging.enabled {
            doze_telemetry::create_env_filter(&self.logging.level)
                .map_err(|e| ConfigError::invalid_value("logging.level", e.to_string()))?;
        }

        Ok(())
    }

    /// Development preset: pretty `debug` logs.
    ///
    /// # Example
    ///
    /// ```
    /// use doze_config::DozeConfig;
    ///
    /// let config = DozeConfig::development();
    /// assert_eq!(config.logging.level, "debug");
    /// ```
    #[must_use]
    pub fn development() -> Self {
        let mut config = Self::default();
        config.server.http_addr = "127.0.0.1:8080".to_string();
        config.logging.level = "debug".to_string();
        config.logging.format = doze_telemetry::LogFormat::Pretty;
        config
    }

    /// Production preset: JSON `info` logs.
    #[must_use]
    pub fn production() -> Self {
        let mut config = Self::default();
        config.logging.level = "info".to_string();
        config.logging.format = doze_telemetry::LogFormat::Json;
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(DozeConfig::default().validate().is_ok());
        assert!(DozeConfig::development().validate().is_ok());
        assert!(DozeConfig::production().validate().is_ok());
    }

    #[test]
    fn test_invalid_addr() {
        let mut config = DozeConfig::default();
        config.server.http_addr = "localhost".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { field, .. }) if field == "server.http_addr"
        ));
    }

    #[test]
    fn test_prefix_rules() {
        let mut config = DozeConfig::default();

        config.router.prefix = "/api/v1".to_string();
        assert!(config.validate().is_ok());

        config.router.prefix = "api".to_string();
        assert!(config.validate().is_err());

        config.router.prefix = "/api/".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_body_limit() {
        let mut config = DozeConfig::default();
        config.server.max_body_bytes = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_log_level() {
        let mut config = DozeConfig::default();
        config.logging.level = "doze=shouting".to_string();
        assert!(config.validate().is_err());

        config.logging.enabled = false;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unknown_section_rejected() {
        let result: Result<DozeConfig, _> = toml::from_str("[metrics]\nenabled = true\n");
        assert!(result.is_err());
    }
}
