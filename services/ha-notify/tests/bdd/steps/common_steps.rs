//! Step definitions shared by several features

use std::time::Duration;

use cucumber::{given, then};

use ha_notify::model::Notification;

use super::parse_list;
use crate::world::RelayWorld;

#[given("a backend with no pending notifications")]
fn backend_without_notifications(_world: &mut RelayWorld) {}

#[given(expr = "a backend with pending notifications {string}")]
fn backend_with_notifications(world: &mut RelayWorld, titles: String) {
    let batch = parse_list(&titles)
        .into_iter()
        .map(|title| Notification::new(title, "from the backend"))
        .collect();
    world.backend.push_batch(Ok(batch));
}

#[given("an unreachable backend")]
fn unreachable_backend(world: &mut RelayWorld) {
    world.backend.set_unreachable();
}

#[given(expr = "a backend with dashboard URL {string}")]
fn backend_with_dashboard(world: &mut RelayWorld, url: String) {
    world.backend.set_dashboard_url(Some(url));
}

#[given("a backend without a dashboard URL")]
fn backend_without_dashboard(world: &mut RelayWorld) {
    world.backend.set_dashboard_url(None);
}

#[given("a mounted relay")]
fn mounted_relay(world: &mut RelayWorld) {
    world.relay().mount().expect("relay should mount");
}

#[then(expr = "the alert {string} should be shown for {int} milliseconds")]
fn alert_shown_for(world: &mut RelayWorld, title: String, millis: u64) {
    let requests = world.presenter.requests();
    let request = requests
        .iter()
        .find(|r| r.title == title)
        .unwrap_or_else(|| panic!("no alert titled '{}' in {:?}", title, world.presenter.titles()));
    assert_eq!(request.duration, Duration::from_millis(millis));
}

#[then(expr = "the browser should open {string}")]
fn browser_opens(world: &mut RelayWorld, url: String) {
    assert_eq!(world.navigator.opened(), vec![url]);
}

#[then("no navigation should happen")]
fn no_navigation(world: &mut RelayWorld) {
    assert!(
        world.navigator.opened().is_empty(),
        "unexpected navigation to {:?}",
        world.navigator.opened()
    );
}
