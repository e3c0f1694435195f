//! Click-action grammar and its resolution to a navigation target
//!
//! A notification's `action` is parsed once, at dispatch time, into an
//! [`Action`]. The target URL is only computed when the user clicks, because
//! the dashboard URL may change (or need a fresh fetch) in the meantime.

use std::sync::Arc;

use crate::backend::Backend;

/// Everything from this marker onward is stripped from the dashboard URL to
/// get the base that relative actions are appended to.
pub const DASHBOARD_PATH_MARKER: &str = "/lovelace";

/// Where a click on an alert should lead
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// No action given: open the dashboard
    Dashboard,
    /// Path relative to the dashboard host, e.g. `/lovelace/cameras`
    Path(String),
    /// Absolute URL, opened as-is
    Url(String),
    /// Unrecognized value; opens the dashboard like [`Action::Dashboard`]
    Other(String),
}

impl Action {
    pub fn parse(action: Option<&str>) -> Self {
        match action {
            None | Some("") => Action::Dashboard,
            Some(path) if path.starts_with('/') => Action::Path(path.to_string()),
            Some(url) if url.starts_with("http") => Action::Url(url.to_string()),
            Some(other) => Action::Other(other.to_string()),
        }
    }
}

/// Outcome of resolving an action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Navigate(String),
    /// No dashboard URL was available to resolve against
    Unavailable,
}

/// Resolves actions against the backend's dashboard URL
pub struct ActionResolver {
    backend: Arc<dyn Backend>,
}

impl std::fmt::Debug for ActionResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionResolver").finish_non_exhaustive()
    }
}

impl ActionResolver {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    pub async fn resolve(&self, action: &Action) -> Resolution {
        match action {
            Action::Url(url) => Resolution::Navigate(url.clone()),
            Action::Path(path) => match self.dashboard_url().await {
                Some(dashboard) => {
                    Resolution::Navigate(format!("{}{}", dashboard_base(&dashboard), path))
                }
                None => Resolution::Unavailable,
            },
            Action::Dashboard | Action::Other(_) => match self.dashboard_url().await {
                Some(dashboard) => Resolution::Navigate(dashboard),
                None => Resolution::Unavailable,
            },
        }
    }

    async fn dashboard_url(&self) -> Option<String> {
        match self.backend.get_dashboard_url().await {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!("Failed to fetch dashboard URL: {}", e);
                None
            }
        }
    }
}

/// Strip the dashboard path from `dashboard_url`, leaving scheme and host
pub fn dashboard_base(dashboard_url: &str) -> &str {
    match dashboard_url.find(DASHBOARD_PATH_MARKER) {
        Some(idx) => &dashboard_url[..idx],
        None => dashboard_url.trim_end_matches('/'),
    }
}
