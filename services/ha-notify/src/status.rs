//! Status view model: the latest successful stats snapshot

use std::fmt;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::model::PluginStats;

/// Latest stats as shown on the status panel
#[derive(Debug, Default)]
pub struct StatusViewModel {
    snapshot: Option<PluginStats>,
    consecutive_failures: u32,
}

impl StatusViewModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply the outcome of one stats fetch.
    ///
    /// A success replaces the snapshot wholesale; a failure leaves it as is.
    /// Returns true when the snapshot was replaced.
    pub fn apply(&mut self, result: crate::Result<PluginStats>) -> bool {
        match result {
            Ok(stats) => {
                self.snapshot = Some(stats);
                self.consecutive_failures = 0;
                true
            }
            Err(e) => {
                self.consecutive_failures += 1;
                tracing::debug!(
                    "Stats fetch failed ({} in a row), keeping last snapshot: {}",
                    self.consecutive_failures,
                    e
                );
                false
            }
        }
    }

    pub fn snapshot(&self) -> Option<&PluginStats> {
        self.snapshot.as_ref()
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    pub fn is_running(&self) -> bool {
        self.snapshot.as_ref().is_some_and(|s| s.status == "running")
    }

    pub fn is_websocket_connected(&self) -> bool {
        self.snapshot
            .as_ref()
            .is_some_and(|s| s.websocket_status == "connected")
    }

    pub fn pending_count(&self) -> u64 {
        self.snapshot
            .as_ref()
            .map(|s| s.pending_notifications)
            .unwrap_or(0)
    }

    pub fn ha_url(&self) -> Option<&str> {
        self.snapshot.as_ref().and_then(|s| s.ha_url.as_deref())
    }
}

/// Plain-text rendering of the status panel
impl fmt::Display for StatusViewModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let service = self.snapshot.as_ref().map_or("Unknown", |s| s.status.as_str());
        let websocket = self
            .snapshot
            .as_ref()
            .map_or("Unknown", |s| s.websocket_status.as_str());
        let marker = |ok: bool| if ok { "+" } else { "-" };

        writeln!(f, "[{}] Service: {}", marker(self.is_running()), service)?;
        writeln!(
            f,
            "[{}] WebSocket: {}",
            marker(self.is_websocket_connected()),
            websocket
        )?;
        writeln!(f, "    Pending: {}", self.pending_count())?;
        write!(f, "    Home Assistant: {}", self.ha_url().unwrap_or("Unknown"))
    }
}

/// Shared handle to the status view model
pub type StatusHandle = Arc<RwLock<StatusViewModel>>;

pub fn new_status_handle() -> StatusHandle {
    Arc::new(RwLock::new(StatusViewModel::new()))
}
