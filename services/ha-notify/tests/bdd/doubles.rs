//! Test doubles for the backend and the host capabilities

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use ha_notify::backend::Backend;
use ha_notify::model::{ConnectionStatus, Notification, PluginStats};
use ha_notify::presenter::{AlertPresenter, Navigator, PresentationRequest};
use ha_notify::NotifyError;

fn refused() -> NotifyError {
    NotifyError::Http("connection refused".to_string())
}

/// Backend with scripted responses and call counters
#[derive(Debug, Default)]
pub struct ScriptedBackend {
    batches: Mutex<VecDeque<ha_notify::Result<Vec<Notification>>>>,
    stats: Mutex<VecDeque<ha_notify::Result<PluginStats>>>,
    dashboard_url: Mutex<Option<String>>,
    unreachable: AtomicBool,
    pending_calls: AtomicUsize,
    stats_calls: AtomicUsize,
    dashboard_calls: AtomicUsize,
}

impl ScriptedBackend {
    pub fn push_batch(&self, batch: ha_notify::Result<Vec<Notification>>) {
        self.batches.lock().unwrap().push_back(batch);
    }

    pub fn push_stats(&self, stats: ha_notify::Result<PluginStats>) {
        self.stats.lock().unwrap().push_back(stats);
    }

    pub fn set_dashboard_url(&self, url: Option<String>) {
        *self.dashboard_url.lock().unwrap() = url;
    }

    pub fn set_unreachable(&self) {
        self.unreachable.store(true, Ordering::SeqCst);
    }

    pub fn pending_calls(&self) -> usize {
        self.pending_calls.load(Ordering::SeqCst)
    }

    pub fn stats_calls(&self) -> usize {
        self.stats_calls.load(Ordering::SeqCst)
    }

    pub fn dashboard_calls(&self) -> usize {
        self.dashboard_calls.load(Ordering::SeqCst)
    }

    fn is_unreachable(&self) -> bool {
        self.unreachable.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Backend for ScriptedBackend {
    async fn get_stats(&self) -> ha_notify::Result<PluginStats> {
        self.stats_calls.fetch_add(1, Ordering::SeqCst);
        if self.is_unreachable() {
            return Err(refused());
        }
        let next = self.stats.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Err(refused()))
    }

    async fn get_pending_notifications(&self) -> ha_notify::Result<Vec<Notification>> {
        self.pending_calls.fetch_add(1, Ordering::SeqCst);
        if self.is_unreachable() {
            return Err(refused());
        }
        let next = self.batches.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn get_dashboard_url(&self) -> ha_notify::Result<Option<String>> {
        self.dashboard_calls.fetch_add(1, Ordering::SeqCst);
        if self.is_unreachable() {
            return Err(refused());
        }
        Ok(self.dashboard_url.lock().unwrap().clone())
    }

    async fn verify_connection(&self) -> ha_notify::Result<ConnectionStatus> {
        if self.is_unreachable() {
            return Err(refused());
        }
        Ok(ConnectionStatus {
            connected: true,
            message: "Connected to Home Assistant".to_string(),
        })
    }
}

/// Presenter that keeps every request it receives
#[derive(Debug, Default)]
pub struct RecordingPresenter {
    requests: Mutex<Vec<PresentationRequest>>,
}

impl RecordingPresenter {
    pub fn requests(&self) -> Vec<PresentationRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn titles(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.title).collect()
    }
}

impl AlertPresenter for RecordingPresenter {
    fn present(&self, request: PresentationRequest) -> ha_notify::Result<()> {
        self.requests.lock().unwrap().push(request);
        Ok(())
    }
}

/// Navigator that keeps every URL it is asked to open
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    opened: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn open(&self, url: &str) -> ha_notify::Result<()> {
        self.opened.lock().unwrap().push(url.to_string());
        Ok(())
    }
}
