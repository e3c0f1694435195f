//! BDD test world for the notification relay

use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use std::time::Duration;

use cucumber::World;
use ha_notify::action::Resolution;
use ha_notify::model::ConnectionStatus;
use ha_notify::presenter::PresentationRequest;
use ha_notify::scheduler::PollScheduler;
use ha_notify::{Config, Relay};

use crate::doubles::{RecordingNavigator, RecordingPresenter, ScriptedBackend};

#[derive(Debug, Default, World)]
pub struct RelayWorld {
    pub backend: Arc<ScriptedBackend>,
    pub presenter: Arc<RecordingPresenter>,
    pub navigator: Arc<RecordingNavigator>,

    // Relay testing
    pub relay: Option<Relay>,
    pub calls_at_unmount: Option<(usize, usize)>,
    pub connection: Option<ConnectionStatus>,

    // Click testing
    pub alert: Option<PresentationRequest>,
    pub resolution: Option<Resolution>,

    // Timer testing
    pub fast_timer: Option<PollScheduler>,
    pub slow_timer: Option<PollScheduler>,
    pub fast_ticks: Arc<AtomicUsize>,
    pub slow_ticks: Arc<AtomicUsize>,
    pub ticks_at_stop: Option<(usize, usize)>,
}

impl RelayWorld {
    /// Config with intervals short enough for real-time scenarios
    pub fn fast_config() -> Config {
        let mut config = Config::default();
        config.polling.notification_interval = Duration::from_millis(50);
        config.polling.stats_interval = Duration::from_millis(120);
        config
    }

    /// The relay under test, built on first use
    pub fn relay(&mut self) -> &mut Relay {
        let backend = Arc::clone(&self.backend);
        let presenter = Arc::clone(&self.presenter);
        let navigator = Arc::clone(&self.navigator);
        self.relay
            .get_or_insert_with(|| Relay::new(backend, presenter, navigator, &Self::fast_config()))
    }
}
