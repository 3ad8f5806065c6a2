//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, attempts >= 1, delays ordered)
//! - Validate addresses and URLs before anything binds or connects
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<SettingError>>
//! - Runs before config is accepted into the system

use std::fmt;
use std::net::SocketAddr;

use crate::config::schema::AppConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// One rejected setting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingError {
    /// Dotted key of the offending setting (e.g. `service.base_url`).
    pub key: &'static str,
    pub message: String,
}

impl SettingError {
    fn new(key: &'static str, message: impl Into<String>) -> Self {
        Self {
            key,
            message: message.into(),
        }
    }
}

impl fmt::Display for SettingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.key, self.message)
    }
}

/// Check every semantic constraint of `config`.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<SettingError>> {
    let mut errors = Vec::new();

    match url::Url::parse(&config.service.base_url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => errors.push(SettingError::new(
            "service.base_url",
            format!("unsupported scheme `{}`", url.scheme()),
        )),
        Err(e) => errors.push(SettingError::new("service.base_url", e.to_string())),
    }

    if !config.service.configs_path.starts_with('/') {
        errors.push(SettingError::new(
            "service.configs_path",
            "must start with `/`",
        ));
    }
    if !config.service.methods_path.starts_with('/') {
        errors.push(SettingError::new(
            "service.methods_path",
            "must start with `/`",
        ));
    }

    if config.service.timeout_secs == 0 {
        errors.push(SettingError::new("service.timeout_secs", "must be > 0"));
    }

    let retries = &config.service.retries;
    if retries.max_attempts == 0 {
        errors.push(SettingError::new(
            "service.retries.max_attempts",
            "must be >= 1",
        ));
    }
    if retries.base_delay_ms > retries.max_delay_ms {
        errors.push(SettingError::new(
            "service.retries.base_delay_ms",
            format!(
                "must not exceed max_delay_ms ({} > {})",
                retries.base_delay_ms, retries.max_delay_ms
            ),
        ));
    }

    if config.store.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(SettingError::new(
            "store.bind_address",
            format!("`{}` is not a socket address", config.store.bind_address),
        ));
    }

    if config.store.request_timeout_secs == 0 {
        errors.push(SettingError::new("store.request_timeout_secs", "must be > 0"));
    }

    let observability = &config.observability;
    if !LOG_LEVELS.contains(&observability.log_level.as_str()) {
        errors.push(SettingError::new(
            "observability.log_level",
            format!("must be one of {}", LOG_LEVELS.join(", ")),
        ));
    }
    if observability.metrics_enabled
        && observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(SettingError::new(
            "observability.metrics_address",
            format!("`{}` is not a socket address", observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(validate_config(&AppConfig::default()), Ok(()));
    }

    #[test]
    fn reports_every_problem() {
        let mut config = AppConfig::default();
        config.service.base_url = "ftp://store".into();
        config.service.configs_path = "api/configs".into();
        config.service.methods_path = "api/methods".into();
        config.service.retries.max_attempts = 0;
        config.store.bind_address = "nowhere".into();
        config.observability.log_level = "loud".into();

        let errors = validate_config(&config).unwrap_err();
        let keys: Vec<&str> = errors.iter().map(|e| e.key).collect();
        assert_eq!(
            keys,
            vec![
                "service.base_url",
                "service.configs_path",
                "service.methods_path",
                "service.retries.max_attempts",
                "store.bind_address",
                "observability.log_level",
            ]
        );
        assert!(errors[0].to_string().contains("ftp"));
    }

    #[test]
    fn metrics_address_checked_only_when_enabled() {
        let mut config = AppConfig::default();
        config.observability.metrics_address = "bogus".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].key, "observability.metrics_address");
    }

    #[test]
    fn inverted_backoff_window_is_rejected() {
        let mut config = AppConfig::default();
        config.service.retries.base_delay_ms = 5000;
        config.service.retries.max_delay_ms = 100;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].key, "service.retries.base_delay_ms");
    }
}
