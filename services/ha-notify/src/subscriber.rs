//! Home Assistant event subscriber
//!
//! Keeps a WebSocket open to Home Assistant, authenticates with a long-lived
//! access token, subscribes to one event type and queues every event in the
//! inbox. A dropped connection is retried after a fixed delay. The inbox
//! reports `websocket_status` as connected only while a subscription is live.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;

use crate::config::InboxConfig;
use crate::inbox::{epoch_seconds, InboxHandle};
use crate::model::{default_title, Notification};

type HaStream = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

const SUBSCRIPTION_ID: u64 = 1;

/// Envelope shared by every Home Assistant WebSocket message
#[derive(Debug, Deserialize)]
struct HaMessage {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    event: Option<Value>,
    #[serde(default)]
    message: Option<String>,
}

/// Home Assistant WebSocket URL for a base URL such as `https://ha.local`
pub fn websocket_url(ha_url: &str) -> String {
    let base = ha_url.trim_end_matches('/');
    let base = if let Some(host) = base.strip_prefix("https://") {
        format!("wss://{}", host)
    } else if let Some(host) = base.strip_prefix("http://") {
        format!("ws://{}", host)
    } else {
        base.to_string()
    };
    format!("{}/api/websocket", base)
}

/// Build a notification from an event's `data` payload
pub fn notification_from_event(event: &Value) -> Notification {
    let field = |name: &str| {
        event
            .get("data")
            .and_then(|data| data.get(name))
            .and_then(Value::as_str)
            .map(str::to_string)
    };
    Notification {
        title: field("title").unwrap_or_else(default_title),
        message: field("message").unwrap_or_default(),
        timestamp: epoch_seconds(),
        action: field("action"),
        entity_id: field("entity_id"),
    }
}

/// Subscription to Home Assistant events, feeding the inbox queue
#[derive(Clone)]
pub struct EventSubscriber {
    ws_url: String,
    token: String,
    event_type: String,
    reconnect_delay: Duration,
    inbox: InboxHandle,
}

impl std::fmt::Debug for EventSubscriber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventSubscriber")
            .field("ws_url", &self.ws_url)
            .field("event_type", &self.event_type)
            .finish_non_exhaustive()
    }
}

impl EventSubscriber {
    pub fn new(ha_url: &str, token: impl Into<String>, config: &InboxConfig, inbox: InboxHandle) -> Self {
        Self {
            ws_url: websocket_url(ha_url),
            token: token.into(),
            event_type: config.event_type.clone(),
            reconnect_delay: config.reconnect_delay,
            inbox,
        }
    }

    pub fn ws_url(&self) -> &str {
        &self.ws_url
    }

    /// Keep a subscription alive until `cancel` fires
    pub async fn run(self, cancel: CancellationToken) {
        loop {
            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                result = self.connect_once() => result,
            };
            self.set_connected(false).await;

            match result {
                Ok(()) => tracing::warn!(
                    "Home Assistant closed the WebSocket, reconnecting in {:?}",
                    self.reconnect_delay
                ),
                Err(e) => tracing::warn!(
                    "Home Assistant WebSocket failed: {}, retrying in {:?}",
                    e,
                    self.reconnect_delay
                ),
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.reconnect_delay) => {}
            }
        }
        self.set_connected(false).await;
        tracing::info!("Home Assistant subscriber stopped");
    }

    /// One connection: authenticate, subscribe, then queue events until the
    /// server closes the socket. Returns `Ok` on a clean close.
    pub async fn connect_once(&self) -> crate::Result<()> {
        tracing::info!("Connecting to {}", self.ws_url);
        let (mut ws, _) = connect_async(self.ws_url.as_str()).await?;

        self.authenticate(&mut ws).await?;
        send_json(
            &mut ws,
            json!({
                "id": SUBSCRIPTION_ID,
                "type": "subscribe_events",
                "event_type": self.event_type,
            }),
        )
        .await?;

        while let Some(message) = ws.next().await {
            match message? {
                Message::Text(text) => self.handle_text(&text).await?,
                Message::Ping(data) => ws.send(Message::Pong(data)).await?,
                Message::Close(_) => break,
                _ => {}
            }
        }
        Ok(())
    }

    async fn authenticate(&self, ws: &mut HaStream) -> crate::Result<()> {
        let hello = next_message(ws).await?;
        if hello.kind != "auth_required" {
            return Err(crate::NotifyError::HomeAssistant(format!(
                "Expected auth_required, got {}",
                hello.kind
            )));
        }

        send_json(ws, json!({"type": "auth", "access_token": self.token})).await?;

        let reply = next_message(ws).await?;
        if reply.kind != "auth_ok" {
            return Err(crate::NotifyError::HomeAssistant(format!(
                "Authentication failed: {}",
                reply.message.unwrap_or(reply.kind)
            )));
        }
        tracing::info!("Authenticated with Home Assistant");
        Ok(())
    }

    async fn handle_text(&self, text: &str) -> crate::Result<()> {
        let message: HaMessage = serde_json::from_str(text)?;
        match message.kind.as_str() {
            "event" => {
                let notification =
                    notification_from_event(message.event.as_ref().unwrap_or(&Value::Null));
                tracing::info!(
                    "Received: {} - {}",
                    notification.title,
                    notification.message
                );
                self.inbox.write().await.enqueue(notification);
            }
            "result" if message.success == Some(true) => {
                tracing::info!("Subscribed to {} events", self.event_type);
                self.set_connected(true).await;
            }
            "result" => {
                return Err(crate::NotifyError::HomeAssistant(format!(
                    "Subscription to {} rejected",
                    self.event_type
                )));
            }
            other => tracing::debug!("Ignoring Home Assistant message {}", other),
        }
        Ok(())
    }

    async fn set_connected(&self, connected: bool) {
        self.inbox.write().await.websocket_connected = connected;
    }
}

async fn next_message(ws: &mut HaStream) -> crate::Result<HaMessage> {
    while let Some(message) = ws.next().await {
        if let Message::Text(text) = message? {
            return Ok(serde_json::from_str(&text)?);
        }
    }
    Err(crate::NotifyError::HomeAssistant(
        "Connection closed during authentication".to_string(),
    ))
}

async fn send_json(ws: &mut HaStream, value: Value) -> crate::Result<()> {
    ws.send(Message::text(value.to_string())).await?;
    Ok(())
}
