//! BDD step definitions for the notification polling feature

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use cucumber::{given, then, when};

use ha_notify::model::Notification;
use ha_notify::scheduler::PollScheduler;
use ha_notify::NotifyError;

use super::parse_list;
use crate::world::RelayWorld;

#[given(expr = "a backend that returns {string} in two consecutive polls")]
fn backend_repeats(world: &mut RelayWorld, title: String) {
    let notification = Notification::new(title, "delivered twice");
    world.backend.push_batch(Ok(vec![notification.clone()]));
    world.backend.push_batch(Ok(vec![notification]));
}

#[given(expr = "a backend whose next poll fails before returning {string}")]
fn backend_fails_then_recovers(world: &mut RelayWorld, title: String) {
    world
        .backend
        .push_batch(Err(NotifyError::Http("connection reset".to_string())));
    world
        .backend
        .push_batch(Ok(vec![Notification::new(title, "after the failure")]));
}

#[when(expr = "the relay has run for {int} milliseconds")]
async fn relay_runs(_world: &mut RelayWorld, millis: u64) {
    tokio::time::sleep(Duration::from_millis(millis)).await;
}

#[when(expr = "{int} milliseconds pass")]
async fn time_passes(_world: &mut RelayWorld, millis: u64) {
    tokio::time::sleep(Duration::from_millis(millis)).await;
}

#[when("the relay is unmounted")]
fn relay_unmounted(world: &mut RelayWorld) {
    world.relay().unmount();
    world.calls_at_unmount = Some((world.backend.pending_calls(), world.backend.stats_calls()));
}

#[then(expr = "alerts {string} should have been shown in that order")]
fn alerts_in_order(world: &mut RelayWorld, titles: String) {
    assert_eq!(world.presenter.titles(), parse_list(&titles));
}

#[then("no further backend calls should have been made")]
fn no_further_calls(world: &mut RelayWorld) {
    let (pending, stats) = world.calls_at_unmount.expect("relay was never unmounted");
    assert!(pending > 0, "relay never polled before unmount");
    assert_eq!(world.backend.pending_calls(), pending);
    assert_eq!(world.backend.stats_calls(), stats);
}

#[then("the relay should not be mounted")]
fn relay_not_mounted(world: &mut RelayWorld) {
    assert!(!world.relay().is_mounted());
}

#[given(expr = "a fast timer every {int} milliseconds and a slow timer every {int} milliseconds")]
fn two_timers(world: &mut RelayWorld, fast_ms: u64, slow_ms: u64) {
    let mut fast = PollScheduler::new("fast");
    let fast_ticks = Arc::clone(&world.fast_ticks);
    fast.start(Duration::from_millis(fast_ms), move || {
        fast_ticks.fetch_add(1, Ordering::SeqCst);
        std::future::ready(Ok(()))
    })
    .expect("fast timer should start");

    let mut slow = PollScheduler::new("slow");
    let slow_ticks = Arc::clone(&world.slow_ticks);
    slow.start(Duration::from_millis(slow_ms), move || {
        slow_ticks.fetch_add(1, Ordering::SeqCst);
        std::future::ready(Ok(()))
    })
    .expect("slow timer should start");

    world.fast_timer = Some(fast);
    world.slow_timer = Some(slow);
}

#[when(expr = "the timers have run for {int} milliseconds")]
async fn timers_run(_world: &mut RelayWorld, millis: u64) {
    tokio::time::sleep(Duration::from_millis(millis)).await;
}

#[when("the fast timer is stopped")]
fn fast_timer_stopped(world: &mut RelayWorld) {
    let fast = world.fast_timer.as_mut().expect("fast timer not started");
    assert!(fast.stop());
    world.ticks_at_stop = Some((
        world.fast_ticks.load(Ordering::SeqCst),
        world.slow_ticks.load(Ordering::SeqCst),
    ));
}

#[then("the fast timer should not have ticked since it was stopped")]
fn fast_timer_quiet(world: &mut RelayWorld) {
    let (fast_at_stop, _) = world.ticks_at_stop.expect("fast timer was never stopped");
    assert!(fast_at_stop > 0, "fast timer never ticked");
    assert_eq!(world.fast_ticks.load(Ordering::SeqCst), fast_at_stop);
}

#[then("the slow timer should have kept ticking")]
fn slow_timer_ticking(world: &mut RelayWorld) {
    let (_, slow_at_stop) = world.ticks_at_stop.expect("fast timer was never stopped");
    assert!(world.slow_ticks.load(Ordering::SeqCst) > slow_at_stop);
    assert!(world.slow_timer.as_ref().is_some_and(|t| t.is_running()));
}
