//! Host capabilities: alert presentation and external navigation

use std::sync::Arc;
use std::time::Duration;

use crate::action::{Action, ActionResolver, Resolution};

/// An alert ready to be shown by the host
#[derive(Debug, Clone)]
pub struct PresentationRequest {
    pub title: String,
    pub body: String,
    pub duration: Duration,
    pub on_click: Option<ClickHandler>,
}

/// Click behaviour bound to one alert
///
/// The action is captured when the alert is built; the destination is only
/// resolved when [`ClickHandler::click`] runs.
#[derive(Clone)]
pub struct ClickHandler {
    action: Action,
    resolver: Arc<ActionResolver>,
    navigator: Arc<dyn Navigator>,
}

impl std::fmt::Debug for ClickHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClickHandler")
            .field("action", &self.action)
            .finish()
    }
}

impl ClickHandler {
    pub fn new(action: Action, resolver: Arc<ActionResolver>, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            action,
            resolver,
            navigator,
        }
    }

    pub fn action(&self) -> &Action {
        &self.action
    }

    /// Resolve the action and hand the result to the navigator.
    ///
    /// Returns the resolution so the host can surface `Unavailable` to the
    /// user; a failing navigator is logged, never propagated.
    pub async fn click(&self) -> Resolution {
        let resolution = self.resolver.resolve(&self.action).await;
        match &resolution {
            Resolution::Navigate(url) => {
                tracing::debug!("Alert clicked, opening {}", url);
                if let Err(e) = self.navigator.open(url) {
                    tracing::warn!("Failed to open {}: {}", url, e);
                }
            }
            Resolution::Unavailable => {
                tracing::warn!(
                    "Alert clicked but no dashboard URL is available for {:?}",
                    self.action
                );
            }
        }
        resolution
    }
}

/// Host toast/alert mechanism
pub trait AlertPresenter: Send + Sync {
    fn present(&self, request: PresentationRequest) -> crate::Result<()>;
}

/// Host primitive for opening an absolute URL
pub trait Navigator: Send + Sync {
    fn open(&self, url: &str) -> crate::Result<()>;
}

/// Presenter that only logs, for headless hosts
#[derive(Debug, Default)]
pub struct LogPresenter;

impl AlertPresenter for LogPresenter {
    fn present(&self, request: PresentationRequest) -> crate::Result<()> {
        tracing::info!(
            "Alert ({} ms): {} - {}",
            request.duration.as_millis(),
            request.title,
            request.body
        );
        Ok(())
    }
}

/// Navigator that only logs the destination
#[derive(Debug, Default)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn open(&self, url: &str) -> crate::Result<()> {
        tracing::info!("Navigate to {}", url);
        Ok(())
    }
}
