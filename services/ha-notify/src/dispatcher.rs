//! Notification dispatcher: one poll batch in, presentation requests out

use std::sync::Arc;
use std::time::Duration;

use crate::action::{Action, ActionResolver};
use crate::model::Notification;
use crate::presenter::{AlertPresenter, ClickHandler, Navigator, PresentationRequest};

/// How long alerts stay on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertDurations {
    /// Alerts delivered by the notification poll
    pub delivered: Duration,
    /// Alerts triggered by the user from the panel; shorter than `delivered`
    pub test: Duration,
}

impl Default for AlertDurations {
    fn default() -> Self {
        Self {
            delivered: Duration::from_millis(8000),
            test: Duration::from_millis(5000),
        }
    }
}

/// Turns notifications into alerts for the host presenter
///
/// Batches are presented in the order the backend returned them. Nothing is
/// remembered between batches, so a notification the backend returns twice is
/// shown twice.
pub struct NotificationDispatcher {
    presenter: Arc<dyn AlertPresenter>,
    resolver: Arc<ActionResolver>,
    navigator: Arc<dyn Navigator>,
    durations: AlertDurations,
}

impl NotificationDispatcher {
    pub fn new(
        presenter: Arc<dyn AlertPresenter>,
        resolver: Arc<ActionResolver>,
        navigator: Arc<dyn Navigator>,
        durations: AlertDurations,
    ) -> Self {
        Self {
            presenter,
            resolver,
            navigator,
            durations,
        }
    }

    /// Present every notification of one poll. Returns how many the presenter
    /// accepted.
    pub fn dispatch(&self, batch: Vec<Notification>) -> usize {
        if batch.is_empty() {
            return 0;
        }
        tracing::debug!("Dispatching {} notification(s)", batch.len());

        let mut presented = 0;
        for notification in batch {
            let request = self.request_for(&notification);
            match self.presenter.present(request) {
                Ok(()) => presented += 1,
                Err(e) => tracing::warn!(
                    "Failed to present notification '{}': {}",
                    notification.title,
                    e
                ),
            }
        }
        presented
    }

    /// Build the alert for a delivered notification
    pub fn request_for(&self, notification: &Notification) -> PresentationRequest {
        PresentationRequest {
            title: notification.title.clone(),
            body: notification.message.clone(),
            duration: self.durations.delivered,
            on_click: Some(self.click_handler(Action::parse(notification.action.as_deref()))),
        }
    }

    /// Present a user-triggered alert (test notification, connection result)
    pub fn present_user_alert(&self, title: &str, body: &str) -> crate::Result<()> {
        self.presenter.present(PresentationRequest {
            title: title.to_string(),
            body: body.to_string(),
            duration: self.durations.test,
            on_click: Some(self.click_handler(Action::Dashboard)),
        })
    }

    fn click_handler(&self, action: Action) -> ClickHandler {
        ClickHandler::new(
            action,
            Arc::clone(&self.resolver),
            Arc::clone(&self.navigator),
        )
    }
}
