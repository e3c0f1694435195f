//! Fixed-period tick scheduler
//!
//! Each expiry spawns the tick body and moves on, so a slow tick never delays
//! or blocks the next one. This is only sound while ticks are read-only
//! fetches; a tick with side effects on the backend would need a single-flight
//! guard here.
//!
//! Tick failures are logged at warn level and otherwise swallowed.

use std::future::Future;
use std::time::Duration;

use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Periodic timer owned by the component that started it
#[derive(Debug)]
pub struct PollScheduler {
    name: String,
    cancel: Option<CancellationToken>,
}

impl PollScheduler {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cancel: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_running(&self) -> bool {
        self.cancel.is_some()
    }

    /// Start ticking every `interval`, first tick one interval from now.
    ///
    /// Starting a running scheduler stops the old timer first. A tick that
    /// returns an error is logged and the timer keeps going.
    pub fn start<F, Fut>(&mut self, interval: Duration, on_tick: F) -> crate::Result<()>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = crate::Result<()>> + Send + 'static,
    {
        if interval.is_zero() {
            return Err(crate::NotifyError::Config(format!(
                "{} interval must be greater than zero",
                self.name
            )));
        }
        if self.stop() {
            tracing::debug!("Restarting {} scheduler", self.name);
        }

        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let name = self.name.clone();

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => {
                        tracing::debug!("{} scheduler stopped", name);
                        break;
                    }
                    _ = ticker.tick() => {
                        let tick = on_tick();
                        let name = name.clone();
                        tokio::spawn(async move {
                            if let Err(e) = tick.await {
                                tracing::warn!("{} tick failed: {}", name, e);
                            }
                        });
                    }
                }
            }
        });

        tracing::debug!(
            "{} scheduler started ({} ms)",
            self.name,
            interval.as_millis()
        );
        self.cancel = Some(cancel);
        Ok(())
    }

    /// Stop the timer. Returns false if it was not running.
    ///
    /// A tick already in flight is not aborted.
    pub fn stop(&mut self) -> bool {
        match self.cancel.take() {
            Some(cancel) => {
                cancel.cancel();
                true
            }
            None => false,
        }
    }
}

impl Drop for PollScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}
