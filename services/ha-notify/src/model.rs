//! Wire types shared by the relay and the inbox

use serde::{Deserialize, Deserializer, Serialize};

/// One pending alert surfaced by the backend
///
/// Missing or `null` fields fall back to their defaults so that one sloppy
/// item never costs the rest of an already drained batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    #[serde(default = "default_title", deserialize_with = "title_or_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
    /// Epoch seconds; informational, not unique and never used for sorting
    #[serde(default, deserialize_with = "null_as_default")]
    pub timestamp: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<String>,
}

impl Notification {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            timestamp: 0.0,
            action: None,
            entity_id: None,
        }
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }
}

pub(crate) fn default_title() -> String {
    "Notification".to_string()
}

fn title_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(default_title))
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Point-in-time snapshot of backend health
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginStats {
    pub status: String,
    pub websocket_status: String,
    #[serde(default)]
    pub ha_url: Option<String>,
    #[serde(default)]
    pub pending_notifications: u64,
}

/// Result of an explicit connection check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionStatus {
    pub connected: bool,
    pub message: String,
}

impl ConnectionStatus {
    /// Synthetic status used when the backend itself could not be reached
    pub fn unreachable(error: &crate::NotifyError) -> Self {
        Self {
            connected: false,
            message: format!("Failed to reach backend: {}", error),
        }
    }
}

/// Body of the dashboard URL call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardUrl {
    #[serde(default)]
    pub url: Option<String>,
}
