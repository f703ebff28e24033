//! Gateway settings, read from the environment with fixed fallbacks.

use log::warn;
use rb_core::models::DEFAULT_PASSWORD;
use std::env;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_LATENCY_MS: u64 = 100;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    /// Artificial delay before every call is answered.
    pub latency: Duration,
    pub default_password: String,
    /// Per-file limit for `/upload-image`.
    pub max_upload_bytes: usize,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            latency: Duration::from_millis(DEFAULT_LATENCY_MS),
            default_password: DEFAULT_PASSWORD.to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl GatewayConfig {
    /// Reads `RB_LATENCY_MS`, `RB_DEFAULT_PASSWORD` and `RB_MAX_UPLOAD_BYTES`.
    /// Unset or unparsable values fall back to the defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            latency: parse_var("RB_LATENCY_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.latency),
            default_password: env::var("RB_DEFAULT_PASSWORD")
                .ok()
                .filter(|p| !p.is_empty())
                .unwrap_or(defaults.default_password),
            max_upload_bytes: parse_var("RB_MAX_UPLOAD_BYTES").unwrap_or(defaults.max_upload_bytes),
        }
    }

    /// Same settings, answered immediately.
    pub fn without_latency(self) -> Self {
        Self {
            latency: Duration::ZERO,
            ..self
        }
    }
}

fn parse_var<T: FromStr>(key: &str) -> Option<T> {
    let raw = env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("ignoring {key}={raw:?}: not a valid number, using default");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = GatewayConfig::default();
        assert_eq!(config.latency, Duration::from_millis(100));
        assert_eq!(config.default_password, "1234567");
        assert_eq!(config.max_upload_bytes, 5 * 1024 * 1024);
        assert_eq!(config.without_latency().latency, Duration::ZERO);
    }

    #[test]
    fn env_overrides_and_bad_values_fall_back() {
        env::set_var("RB_LATENCY_MS", "7");
        env::set_var("RB_MAX_UPLOAD_BYTES", "lots");
        let config = GatewayConfig::from_env();
        env::remove_var("RB_LATENCY_MS");
        env::remove_var("RB_MAX_UPLOAD_BYTES");
        assert_eq!(config.latency, Duration::from_millis(7));
        assert_eq!(config.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
    }
}
