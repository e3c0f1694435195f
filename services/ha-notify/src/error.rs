//! Error types for the notification relay

/// Errors that can occur in the notification relay
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Presenter error: {0}")]
    Presenter(String),

    #[error("Inbox error: {0}")]
    Inbox(String),

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("Home Assistant error: {0}")]
    HomeAssistant(String),
}

/// Result type alias for relay operations
pub type Result<T> = std::result::Result<T, NotifyError>;
