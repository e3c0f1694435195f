//! Backend client: the four remote calls the relay makes
//!
//! Every call returns `crate::Result`; transport and decoding failures are
//! converted to `NotifyError` here so callers only ever choose a default.

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::io::HttpClient;
use crate::model::{ConnectionStatus, DashboardUrl, Notification, PluginStats};

pub const STATS_PATH: &str = "/api/stats";
pub const PENDING_PATH: &str = "/api/notifications/pending";
pub const DASHBOARD_URL_PATH: &str = "/api/dashboard_url";
pub const VERIFY_PATH: &str = "/api/verify_connection";

/// Remote call surface of the notification backend
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait Backend: Send + Sync {
    /// Fetch the current stats snapshot
    async fn get_stats(&self) -> crate::Result<PluginStats>;

    /// Fetch (and drain) the pending notifications, in backend order
    async fn get_pending_notifications(&self) -> crate::Result<Vec<Notification>>;

    /// Fetch the dashboard URL, `None` when the backend has none configured
    async fn get_dashboard_url(&self) -> crate::Result<Option<String>>;

    /// Ask the backend to verify its upstream connection
    async fn verify_connection(&self) -> crate::Result<ConnectionStatus>;
}

/// Backend reached over its REST endpoints
pub struct HttpBackend {
    base_url: String,
    http: Arc<dyn HttpClient>,
}

impl std::fmt::Debug for HttpBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpBackend")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl HttpBackend {
    pub fn new(base_url: &str, http: Arc<dyn HttpClient>) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        tracing::debug!("Created HttpBackend at {}", base_url);
        Self { base_url, http }
    }

    async fn fetch_json<T: DeserializeOwned>(&self, path: &str) -> crate::Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.http.get(&url).await?;

        if !response.is_success() {
            return Err(crate::NotifyError::Backend(format!(
                "{} returned status {}: {}",
                path, response.status, response.body
            )));
        }

        serde_json::from_str(&response.body).map_err(|e| {
            crate::NotifyError::Backend(format!("Failed to decode {} response: {}", path, e))
        })
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn get_stats(&self) -> crate::Result<PluginStats> {
        self.fetch_json(STATS_PATH).await
    }

    async fn get_pending_notifications(&self) -> crate::Result<Vec<Notification>> {
        let notifications: Option<Vec<Notification>> = self.fetch_json(PENDING_PATH).await?;
        Ok(notifications.unwrap_or_default())
    }

    async fn get_dashboard_url(&self) -> crate::Result<Option<String>> {
        let dashboard: DashboardUrl = self.fetch_json(DASHBOARD_URL_PATH).await?;
        Ok(dashboard.url.filter(|url| !url.is_empty()))
    }

    async fn verify_connection(&self) -> crate::Result<ConnectionStatus> {
        self.fetch_json(VERIFY_PATH).await
    }
}
