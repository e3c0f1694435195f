//! HA Notify - notification relay
//!
//! Polls a notification backend, shows pending notifications as alerts and
//! routes alert clicks to the Home Assistant dashboard. The `inbox` module
//! provides the backend side for hubs that push events over HTTP.

pub mod action;
pub mod backend;
pub mod config;
pub mod desktop;
pub mod dispatcher;
pub mod error;
pub mod inbox;
pub mod io;
pub mod model;
pub mod presenter;
pub mod relay;
pub mod scheduler;
pub mod status;
pub mod subscriber;

pub use config::{load_config, Config};
pub use error::{NotifyError, Result};
pub use relay::Relay;

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::backend::HttpBackend;
use crate::config::PresenterKind;
use crate::desktop::{DesktopPresenter, SystemNavigator};
use crate::io::{HttpClient, ReqwestHttpClient};
use crate::presenter::{AlertPresenter, LogNavigator, LogPresenter, Navigator};
use crate::subscriber::EventSubscriber;

/// Build a relay wired to the configured backend and host capabilities
pub fn build_relay(config: &Config) -> Result<Relay> {
    config.validate()?;
    let http: Arc<dyn HttpClient> =
        Arc::new(ReqwestHttpClient::with_timeout(config.backend.request_timeout)?);
    let backend = Arc::new(HttpBackend::new(&config.backend.base_url, http));

    let (presenter, navigator): (Arc<dyn AlertPresenter>, Arc<dyn Navigator>) =
        match config.alerts.presenter {
            PresenterKind::Desktop => (
                Arc::new(DesktopPresenter::default()),
                Arc::new(SystemNavigator),
            ),
            PresenterKind::Log => (Arc::new(LogPresenter), Arc::new(LogNavigator)),
        };

    Ok(Relay::new(backend, presenter, navigator, config))
}

/// Run the relay until interrupted
pub async fn run_relay(config: Config) -> Result<()> {
    let mut relay = build_relay(&config)?;
    let cancel = shutdown_on_ctrl_c();

    relay.mount()?;
    cancel.cancelled().await;

    relay.unmount();
    let status = relay.status();
    let panel = status.read().await.to_string();
    tracing::info!("Status at shutdown:\n{}", panel);
    Ok(())
}

/// Run the inbox service until interrupted
pub async fn run_inbox(config: Config) -> Result<()> {
    config.validate()?;
    let http: Arc<dyn HttpClient> =
        Arc::new(ReqwestHttpClient::with_timeout(config.backend.request_timeout)?);
    let cancel = shutdown_on_ctrl_c();

    let state = inbox::new_inbox_handle(&config.inbox);
    match (&config.inbox.ha_url, &config.inbox.ha_token) {
        (Some(ha_url), Some(token)) => {
            let subscriber =
                EventSubscriber::new(ha_url, token.clone(), &config.inbox, state.clone());
            tokio::spawn(subscriber.run(cancel.clone()));
        }
        (None, _) => {
            tracing::warn!(
                "No Home Assistant URL configured; dashboard links and event subscription are disabled"
            );
        }
        (Some(_), None) => {
            tracing::warn!("No Home Assistant token configured; event subscription is disabled");
        }
    }

    inbox::serve(&config.inbox, state, http, cancel).await
}

fn shutdown_on_ctrl_c() -> CancellationToken {
    let cancel = CancellationToken::new();
    let cancel_for_signal = cancel.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for ctrl-c: {}", e);
            return;
        }
        tracing::info!("Shutdown signal received");
        cancel_for_signal.cancel();
    });
    cancel
}
