//! Configuration types for the notification relay

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::dispatcher::AlertDurations;

/// Environment variable consulted when `inbox.ha_url` is not configured
pub const HA_URL_ENV: &str = "HA_URL";
/// Environment variable consulted when `inbox.ha_token` is not configured
pub const HA_TOKEN_ENV: &str = "HA_TOKEN";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub polling: PollingConfig,
    #[serde(default)]
    pub alerts: AlertsConfig,
    #[serde(default)]
    pub inbox: InboxConfig,
}

/// Where the relay finds its backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_request_timeout", with = "humantime_serde")]
    pub request_timeout: Duration,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout: default_request_timeout(),
        }
    }
}

/// Poll cadence of the two timers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    #[serde(default = "default_notification_interval", with = "humantime_serde")]
    pub notification_interval: Duration,
    #[serde(default = "default_stats_interval", with = "humantime_serde")]
    pub stats_interval: Duration,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            notification_interval: default_notification_interval(),
            stats_interval: default_stats_interval(),
        }
    }
}

/// Which host presenter the binary uses
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresenterKind {
    #[default]
    Desktop,
    Log,
}

/// Alert presentation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertsConfig {
    #[serde(default = "default_delivered_duration", with = "humantime_serde")]
    pub delivered_duration: Duration,
    #[serde(default = "default_test_duration", with = "humantime_serde")]
    pub test_duration: Duration,
    #[serde(default)]
    pub presenter: PresenterKind,
}

impl AlertsConfig {
    pub fn durations(&self) -> AlertDurations {
        AlertDurations {
            delivered: self.delivered_duration,
            test: self.test_duration,
        }
    }
}

impl Default for AlertsConfig {
    fn default() -> Self {
        Self {
            delivered_duration: default_delivered_duration(),
            test_duration: default_test_duration(),
            presenter: PresenterKind::default(),
        }
    }
}

/// Inbox service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboxConfig {
    #[serde(default = "default_inbox_port")]
    pub port: u16,
    #[serde(default)]
    pub ha_url: Option<String>,
    #[serde(default = "default_dashboard_path")]
    pub dashboard_path: String,
    #[serde(default = "default_max_pending")]
    pub max_pending: usize,
    /// Long-lived access token for the Home Assistant WebSocket API
    #[serde(default)]
    pub ha_token: Option<String>,
    /// Home Assistant event type carrying notifications
    #[serde(default = "default_event_type")]
    pub event_type: String,
    #[serde(default = "default_reconnect_delay", with = "humantime_serde")]
    pub reconnect_delay: Duration,
}

impl Default for InboxConfig {
    fn default() -> Self {
        Self {
            port: default_inbox_port(),
            ha_url: None,
            dashboard_path: default_dashboard_path(),
            max_pending: default_max_pending(),
            ha_token: None,
            event_type: default_event_type(),
            reconnect_delay: default_reconnect_delay(),
        }
    }
}

impl Config {
    /// Check invariants serde cannot express
    pub fn validate(&self) -> crate::Result<()> {
        if self.polling.notification_interval.is_zero() || self.polling.stats_interval.is_zero()
        {
            return Err(crate::NotifyError::Config(
                "Polling intervals must be greater than zero".to_string(),
            ));
        }
        if self.alerts.test_duration >= self.alerts.delivered_duration {
            return Err(crate::NotifyError::Config(format!(
                "alerts.test_duration ({:?}) must be shorter than alerts.delivered_duration ({:?})",
                self.alerts.test_duration, self.alerts.delivered_duration
            )));
        }
        if self.inbox.max_pending == 0 {
            return Err(crate::NotifyError::Config(
                "inbox.max_pending must be at least 1".to_string(),
            ));
        }
        if self.inbox.reconnect_delay.is_zero() {
            return Err(crate::NotifyError::Config(
                "inbox.reconnect_delay must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Fill unset values from the environment
    pub fn resolve_environment(&mut self) {
        self.resolve_environment_with(|key| std::env::var(key).ok());
    }

    fn resolve_environment_with(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if self.inbox.ha_url.is_none() {
            if let Some(url) = lookup(HA_URL_ENV).filter(|url| !url.is_empty()) {
                tracing::debug!("Using {} from environment: {}", HA_URL_ENV, url);
                self.inbox.ha_url = Some(url);
            }
        }
        if self.inbox.ha_token.is_none() {
            if let Some(token) = lookup(HA_TOKEN_ENV).filter(|token| !token.is_empty()) {
                tracing::debug!("Using {} from environment", HA_TOKEN_ENV);
                self.inbox.ha_token = Some(token);
            }
        }
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:8888".to_string()
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_notification_interval() -> Duration {
    Duration::from_millis(1000)
}

fn default_stats_interval() -> Duration {
    Duration::from_millis(5000)
}

fn default_delivered_duration() -> Duration {
    Duration::from_millis(8000)
}

fn default_test_duration() -> Duration {
    Duration::from_millis(5000)
}

fn default_inbox_port() -> u16 {
    8888
}

fn default_dashboard_path() -> String {
    "/lovelace/0".to_string()
}

fn default_max_pending() -> usize {
    100
}

fn default_event_type() -> String {
    "steamdeck_notify".to_string()
}

fn default_reconnect_delay() -> Duration {
    Duration::from_secs(10)
}

/// Load configuration from a JSON file
pub fn load_config(path: &Path) -> crate::Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        crate::NotifyError::Config(format!("Failed to read config file {:?}: {}", path, e))
    })?;
    let config: Config = serde_json::from_str(&content)?;
    Ok(config)
}
