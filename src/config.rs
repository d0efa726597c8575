//! Configuration types.

use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;
use crate::tour::placement::Size;

/// Tour engine configuration.
#[derive(Debug, Clone)]
pub struct TourConfig {
    /// Spotlight padding applied to steps that don't set their own.
    pub default_padding: f64,
    /// Distance between the spotlight edge and the tooltip.
    pub tooltip_gap: f64,
    /// Minimum distance between the tooltip and the viewport edges.
    pub viewport_margin: f64,
    /// Tooltip size used when the overlay can't measure its own.
    pub tooltip_size: Size,
    /// Wait after a smooth scroll before re-measuring the target.
    pub settle_delay: Duration,
    /// How long the completion summary stays up without interaction.
    pub summary_timeout: Duration,
    /// Upper bound on the remote status check.
    pub status_timeout: Duration,
    /// Flip the tooltip to the opposite side when the preferred side doesn't fit.
    pub auto_flip: bool,
}

impl Default for TourConfig {
    fn default() -> Self {
        Self {
            default_padding: 10.0,
            tooltip_gap: 12.0,
            viewport_margin: 16.0,
            tooltip_size: Size::new(320.0, 180.0),
            settle_delay: Duration::from_millis(350),
            summary_timeout: Duration::from_secs(9),
            status_timeout: Duration::from_secs(3),
            auto_flip: true,
        }
    }
}

impl TourConfig {
    /// Build a config from `WORKFORCE_TOUR_*` environment variables,
    /// falling back to defaults for anything unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let settle_delay = env_millis("WORKFORCE_TOUR_SETTLE_MS")?.unwrap_or(defaults.settle_delay);
        let summary_timeout =
            env_millis("WORKFORCE_TOUR_SUMMARY_TIMEOUT_MS")?.unwrap_or(defaults.summary_timeout);
        let status_timeout =
            env_millis("WORKFORCE_TOUR_STATUS_TIMEOUT_MS")?.unwrap_or(defaults.status_timeout);

        let viewport_margin =
            env_pixels("WORKFORCE_TOUR_VIEWPORT_MARGIN")?.unwrap_or(defaults.viewport_margin);

        let auto_flip = std::env::var("WORKFORCE_TOUR_AUTO_FLIP")
            .map(|v| v != "0" && !v.eq_ignore_ascii_case("false"))
            .unwrap_or(defaults.auto_flip);

        Ok(Self {
            settle_delay,
            summary_timeout,
            status_timeout,
            viewport_margin,
            auto_flip,
            ..defaults
        })
    }
}

fn env_millis(key: &str) -> Result<Option<Duration>, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map(|ms| Some(Duration::from_millis(ms)))
            .map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            }),
        Err(_) => Ok(None),
    }
}

/// Remote status endpoint configuration.
#[derive(Debug, Clone)]
pub struct StatusClientConfig {
    /// Base URL of the backend, e.g. `https://app.example.com`.
    pub base_url: String,
    /// Bearer token forwarded from the sign-in session.
    pub auth_token: Option<SecretString>,
}

/// Reference status server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 8080 }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let port: u16 = std::env::var("WORKFORCE_TOUR_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(8080);
        Self { port }
    }
}

/// Non-negative, finite pixel length.
fn env_pixels(key: &str) -> Result<Option<f64>, ConfigError> {
    let Ok(raw) = std::env::var(key) else {
        return Ok(None);
    };
    let invalid = |message: String| ConfigError::InvalidValue {
        key: key.to_string(),
        message,
    };
    let value = raw
        .trim()
        .parse::<f64>()
        .map_err(|e| invalid(e.to_string()))?;
    if !value.is_finite() || value < 0.0 {
        return Err(invalid(format!("expected a non-negative length, got {raw}")));
    }
    Ok(Some(value))
}
