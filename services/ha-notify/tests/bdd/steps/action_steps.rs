//! BDD step definitions for the alert click feature

use std::sync::Arc;

use cucumber::{given, then, when};

use ha_notify::action::ActionResolver;
use ha_notify::dispatcher::{AlertDurations, NotificationDispatcher};
use ha_notify::model::Notification;

use crate::world::RelayWorld;

#[given(expr = "a delivered notification with action {string}")]
fn delivered_notification(world: &mut RelayWorld, action: String) {
    let resolver = Arc::new(ActionResolver::new(world.backend.clone()));
    let dispatcher = NotificationDispatcher::new(
        world.presenter.clone(),
        resolver,
        world.navigator.clone(),
        AlertDurations::default(),
    );

    let mut notification = Notification::new("Motion", "Someone is at the door");
    if action != "none" {
        notification = notification.with_action(action);
    }
    assert_eq!(dispatcher.dispatch(vec![notification]), 1);
    world.alert = world.presenter.requests().pop();
}

#[when("the alert is clicked")]
async fn alert_clicked(world: &mut RelayWorld) {
    let handler = world
        .alert
        .as_ref()
        .and_then(|alert| alert.on_click.clone())
        .expect("alert has no click handler");
    world.resolution = Some(handler.click().await);
}

#[then("the dashboard URL should not have been fetched")]
fn dashboard_not_fetched(world: &mut RelayWorld) {
    assert_eq!(world.backend.dashboard_calls(), 0);
}
