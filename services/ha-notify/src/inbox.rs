//! Inbox: the backend side of the relay contract
//!
//! Queues events from the Home Assistant subscriber and from the legacy
//! `POST /notify` path, and serves the four calls the relay polls. Fetching
//! the pending list drains it, which is what keeps the relay from showing the
//! same event twice.

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use crate::backend::{DASHBOARD_URL_PATH, PENDING_PATH, STATS_PATH, VERIFY_PATH};
use crate::config::InboxConfig;
use crate::io::HttpClient;
use crate::model::{default_title, ConnectionStatus, DashboardUrl, Notification, PluginStats};

/// Body accepted by `POST /notify`
#[derive(Debug, Clone, Deserialize)]
pub struct NotifyRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    /// Accepted for compatibility; alert durations are fixed by the relay
    #[serde(default)]
    pub duration: Option<u64>,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub entity_id: Option<String>,
}

/// Queue and upstream bookkeeping
#[derive(Debug)]
pub struct InboxState {
    pub queue: VecDeque<Notification>,
    pub max_pending: usize,
    pub ha_url: Option<String>,
    pub dashboard_path: String,
    /// True while the Home Assistant event subscription is live
    pub websocket_connected: bool,
}

impl InboxState {
    pub fn new(config: &InboxConfig) -> Self {
        Self {
            queue: VecDeque::with_capacity(config.max_pending),
            max_pending: config.max_pending.max(1),
            ha_url: config
                .ha_url
                .as_deref()
                .map(|url| url.trim_end_matches('/').to_string()),
            dashboard_path: config.dashboard_path.clone(),
            websocket_connected: false,
        }
    }

    /// Queue a notification, dropping the oldest one when full
    pub fn enqueue(&mut self, notification: Notification) {
        if self.queue.len() >= self.max_pending {
            if let Some(dropped) = self.queue.pop_front() {
                tracing::warn!(
                    "Inbox full ({}), dropping oldest notification '{}'",
                    self.max_pending,
                    dropped.title
                );
            }
        }
        self.queue.push_back(notification);
    }

    /// Take every pending notification in arrival order
    pub fn drain(&mut self) -> Vec<Notification> {
        self.queue.drain(..).collect()
    }

    pub fn dashboard_url(&self) -> Option<String> {
        self.ha_url
            .as_ref()
            .map(|base| format!("{}{}", base, self.dashboard_path))
    }

    pub fn stats(&self) -> PluginStats {
        PluginStats {
            status: "running".to_string(),
            websocket_status: if self.websocket_connected {
                "connected"
            } else {
                "disconnected"
            }
            .to_string(),
            ha_url: self.ha_url.clone(),
            pending_notifications: self.queue.len() as u64,
        }
    }
}

/// Shared inbox state handle
pub type InboxHandle = Arc<RwLock<InboxState>>;

pub fn new_inbox_handle(config: &InboxConfig) -> InboxHandle {
    Arc::new(RwLock::new(InboxState::new(config)))
}

/// Router state
#[derive(Clone)]
pub struct InboxService {
    pub state: InboxHandle,
    pub http: Arc<dyn HttpClient>,
}

/// Build the inbox axum router
pub fn build_router(state: InboxHandle, http: Arc<dyn HttpClient>) -> Router {
    Router::new()
        .route("/notify", post(notify_handler))
        .route(STATS_PATH, get(stats_handler))
        .route(PENDING_PATH, get(pending_handler))
        .route(DASHBOARD_URL_PATH, get(dashboard_url_handler))
        .route(VERIFY_PATH, get(verify_handler))
        .route("/health", get(health_handler))
        .with_state(InboxService { state, http })
}

/// Serve the inbox until `cancel` fires
pub async fn serve(
    config: &InboxConfig,
    state: InboxHandle,
    http: Arc<dyn HttpClient>,
    cancel: CancellationToken,
) -> crate::Result<()> {
    let router = build_router(state, http);
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
        crate::NotifyError::Inbox(format!("Failed to bind port {}: {}", config.port, e))
    })?;
    tracing::info!("Inbox listening on http://{}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            cancel.cancelled().await;
        })
        .await?;

    tracing::debug!("Inbox stopped");
    Ok(())
}

async fn notify_handler(
    State(inbox): State<InboxService>,
    Json(request): Json<NotifyRequest>,
) -> impl IntoResponse {
    if let Some(duration) = request.duration {
        tracing::debug!("Ignoring requested duration {} ms", duration);
    }
    let notification = Notification {
        title: request.title.unwrap_or_else(default_title),
        message: request.message.unwrap_or_default(),
        timestamp: epoch_seconds(),
        action: request.action,
        entity_id: request.entity_id,
    };
    tracing::info!(
        "Received: {} - {}",
        notification.title,
        notification.message
    );

    let mut state = inbox.state.write().await;
    state.enqueue(notification);

    Json(serde_json::json!({
        "status": "queued",
        "pending": state.queue.len(),
    }))
}

async fn pending_handler(State(inbox): State<InboxService>) -> impl IntoResponse {
    let notifications = inbox.state.write().await.drain();
    if !notifications.is_empty() {
        tracing::info!("Returning {} notification(s)", notifications.len());
    }
    Json(notifications)
}

async fn stats_handler(State(inbox): State<InboxService>) -> impl IntoResponse {
    Json(inbox.state.read().await.stats())
}

async fn dashboard_url_handler(State(inbox): State<InboxService>) -> impl IntoResponse {
    Json(DashboardUrl {
        url: inbox.state.read().await.dashboard_url(),
    })
}

async fn verify_handler(State(inbox): State<InboxService>) -> impl IntoResponse {
    let ha_url = inbox.state.read().await.ha_url.clone();

    let status = match ha_url {
        None => ConnectionStatus {
            connected: false,
            message: "No Home Assistant URL configured".to_string(),
        },
        Some(base) => {
            let url = format!("{}/api/", base);
            match inbox.http.get(&url).await {
                Ok(response) if response.status < 500 => ConnectionStatus {
                    connected: true,
                    message: format!("Connected to {} (HTTP {})", base, response.status),
                },
                Ok(response) => ConnectionStatus {
                    connected: false,
                    message: format!("{} returned HTTP {}", base, response.status),
                },
                Err(e) => ConnectionStatus {
                    connected: false,
                    message: e.to_string(),
                },
            }
        }
    };

    tracing::debug!(
        "Connection check: connected={} ({})",
        status.connected,
        status.message
    );
    Json(status)
}

async fn health_handler() -> impl IntoResponse {
    "OK"
}

pub(crate) fn epoch_seconds() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}
