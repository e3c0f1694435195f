//! BDD step definitions for the status panel feature

use std::time::Duration;

use cucumber::{given, then};

use ha_notify::model::PluginStats;

use crate::world::RelayWorld;

fn stats(service: &str) -> PluginStats {
    PluginStats {
        status: service.to_string(),
        websocket_status: "connected".to_string(),
        ha_url: Some("https://ha.local".to_string()),
        pending_notifications: 0,
    }
}

#[given(expr = "a backend whose stats report service {string}")]
fn backend_stats(world: &mut RelayWorld, service: String) {
    world.backend.push_stats(Ok(stats(&service)));
}

// the scripted backend fails every stats call once its queue is empty
#[given(expr = "a backend whose stats report service {string} once and then fail")]
fn backend_stats_once(world: &mut RelayWorld, service: String) {
    world.backend.push_stats(Ok(stats(&service)));
}

// the initial stats load runs in the background, so allow it a moment
#[then(expr = "the status should show service {string}")]
async fn status_shows(world: &mut RelayWorld, expected: String) {
    let status = world.relay().status();
    let mut service = String::new();
    for _ in 0..50 {
        service = status
            .read()
            .await
            .snapshot()
            .map(|s| s.status.clone())
            .unwrap_or_else(|| "Unknown".to_string());
        if service == expected {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(service, expected);
}

#[then(expr = "the stats should have been fetched at least {int} times")]
fn stats_fetched(world: &mut RelayWorld, times: usize) {
    assert!(
        world.backend.stats_calls() >= times,
        "stats fetched only {} times",
        world.backend.stats_calls()
    );
}
