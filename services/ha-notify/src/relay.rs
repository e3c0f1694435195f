//! Relay: the mounted component tying backend, timers and alerts together
//!
//! While mounted, two independent timers run: one drains pending
//! notifications into alerts, the other refreshes the status view model.
//! Unmounting stops both exactly once; ticks still in flight finish their
//! fetch but no longer present alerts or touch the status model.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::action::{Action, ActionResolver, Resolution};
use crate::backend::Backend;
use crate::config::{Config, PollingConfig};
use crate::dispatcher::NotificationDispatcher;
use crate::model::ConnectionStatus;
use crate::presenter::{AlertPresenter, ClickHandler, Navigator};
use crate::scheduler::PollScheduler;
use crate::status::{new_status_handle, StatusHandle};

pub const TEST_TITLE: &str = "Test Notification";
pub const TEST_BODY: &str = "This is a test from HA Notify!";

/// The notification relay component
pub struct Relay {
    backend: Arc<dyn Backend>,
    resolver: Arc<ActionResolver>,
    dispatcher: Arc<NotificationDispatcher>,
    navigator: Arc<dyn Navigator>,
    status: StatusHandle,
    polling: PollingConfig,
    notification_poll: PollScheduler,
    stats_poll: PollScheduler,
    mounted: Option<CancellationToken>,
}

impl std::fmt::Debug for Relay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Relay")
            .field("mounted", &self.is_mounted())
            .field("polling", &self.polling)
            .finish_non_exhaustive()
    }
}

impl Relay {
    pub fn new(
        backend: Arc<dyn Backend>,
        presenter: Arc<dyn AlertPresenter>,
        navigator: Arc<dyn Navigator>,
        config: &Config,
    ) -> Self {
        let resolver = Arc::new(ActionResolver::new(Arc::clone(&backend)));
        let dispatcher = Arc::new(NotificationDispatcher::new(
            presenter,
            Arc::clone(&resolver),
            Arc::clone(&navigator),
            config.alerts.durations(),
        ));

        Self {
            backend,
            resolver,
            dispatcher,
            navigator,
            status: new_status_handle(),
            polling: config.polling.clone(),
            notification_poll: PollScheduler::new("notification poll"),
            stats_poll: PollScheduler::new("stats refresh"),
            mounted: None,
        }
    }

    pub fn status(&self) -> StatusHandle {
        Arc::clone(&self.status)
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.is_some()
    }

    /// Start both timers and kick off the initial stats load. Mounting twice
    /// is a no-op.
    ///
    /// The initial load runs on its own task, so a hung backend delays the
    /// first snapshot but never the first notification poll.
    pub fn mount(&mut self) -> crate::Result<()> {
        if self.is_mounted() {
            tracing::debug!("Relay already mounted");
            return Ok(());
        }
        let alive = CancellationToken::new();
        self.mounted = Some(alive.clone());

        let backend = Arc::clone(&self.backend);
        let dispatcher = Arc::clone(&self.dispatcher);
        let token = alive.clone();
        let started = self
            .notification_poll
            .start(self.polling.notification_interval, move || {
                poll_notifications(Arc::clone(&backend), Arc::clone(&dispatcher), token.clone())
            });
        if let Err(e) = started {
            self.unmount();
            return Err(e);
        }

        let backend = Arc::clone(&self.backend);
        let status = self.status();
        let token = alive.clone();
        let started = self
            .stats_poll
            .start(self.polling.stats_interval, move || {
                let refresh = refresh_stats(Arc::clone(&backend), Arc::clone(&status), token.clone());
                async move {
                    refresh.await;
                    Ok(())
                }
            });
        if let Err(e) = started {
            self.unmount();
            return Err(e);
        }

        tokio::spawn(refresh_stats(Arc::clone(&self.backend), self.status(), alive));

        tracing::info!(
            "Relay mounted (notifications every {} ms, stats every {} ms)",
            self.polling.notification_interval.as_millis(),
            self.polling.stats_interval.as_millis()
        );
        Ok(())
    }

    /// Stop both timers. Returns false if the relay was not mounted.
    pub fn unmount(&mut self) -> bool {
        let Some(alive) = self.mounted.take() else {
            return false;
        };
        alive.cancel();
        self.notification_poll.stop();
        self.stats_poll.stop();
        tracing::info!("Relay unmounted");
        true
    }

    /// On-demand stats fetch; returns true if the snapshot was replaced
    pub async fn refresh_stats(&self) -> bool {
        let result = self.backend.get_stats().await;
        self.status.write().await.apply(result)
    }

    /// Show a local test alert; no backend call involved
    pub fn send_test_notification(&self) -> crate::Result<()> {
        tracing::debug!("Sending test notification");
        self.dispatcher.present_user_alert(TEST_TITLE, TEST_BODY)
    }

    /// Ask the backend to verify its connection and show the outcome
    pub async fn test_connection(&self) -> ConnectionStatus {
        let status = self
            .backend
            .verify_connection()
            .await
            .unwrap_or_else(|e| {
                tracing::warn!("Connection check failed: {}", e);
                ConnectionStatus::unreachable(&e)
            });

        let title = if status.connected {
            "Connection OK"
        } else {
            "Connection Failed"
        };
        if let Err(e) = self.dispatcher.present_user_alert(title, &status.message) {
            tracing::warn!("Failed to present connection result: {}", e);
        }
        status
    }

    /// Open the dashboard, showing an error alert if there is none
    pub async fn open_dashboard(&self) -> Resolution {
        let handler = ClickHandler::new(
            Action::Dashboard,
            Arc::clone(&self.resolver),
            Arc::clone(&self.navigator),
        );
        let resolution = handler.click().await;
        if resolution == Resolution::Unavailable {
            if let Err(e) = self
                .dispatcher
                .present_user_alert("Dashboard Unavailable", "No dashboard URL is configured")
            {
                tracing::warn!("Failed to present dashboard error: {}", e);
            }
        }
        resolution
    }
}

impl Drop for Relay {
    fn drop(&mut self) {
        self.unmount();
    }
}

async fn poll_notifications(
    backend: Arc<dyn Backend>,
    dispatcher: Arc<NotificationDispatcher>,
    alive: CancellationToken,
) -> crate::Result<()> {
    let batch = backend.get_pending_notifications().await?;

    if alive.is_cancelled() {
        tracing::debug!(
            "Relay unmounted during poll, dropping {} notification(s)",
            batch.len()
        );
        return Ok(());
    }

    dispatcher.dispatch(batch);
    Ok(())
}

async fn refresh_stats(backend: Arc<dyn Backend>, status: StatusHandle, alive: CancellationToken) {
    let result = backend.get_stats().await;

    let mut model = status.write().await;
    if alive.is_cancelled() {
        tracing::debug!("Relay unmounted during stats refresh, discarding result");
        return;
    }
    model.apply(result);
}
