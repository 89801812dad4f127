// SPDX-FileCopyrightText: 2026 Catmove Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scheduler lifecycle under a paused clock.

use std::sync::Arc;
use std::time::Duration;

use catmove_core::TicketStatus;
use catmove_daemon::{CycleRunner, CycleSettings, Scheduler, SchedulerState};
use catmove_test_utils::{MockPublisher, MockStore, entry, panel};
use tokio::time::{Instant, sleep};

const FREQUENCY: Duration = Duration::from_secs(600);

fn scheduler(
    store: Arc<MockStore>,
    publisher: Arc<MockPublisher>,
    execution_timeout: Duration,
) -> Arc<Scheduler> {
    let settings = CycleSettings {
        execution_timeout,
        move_category_after: Duration::from_secs(600),
        topic: "tickets.status-updates".into(),
    };
    Arc::new(Scheduler::new(
        CycleRunner::new(store, publisher, settings),
        FREQUENCY,
    ))
}

fn ready_store() -> MockStore {
    MockStore::new()
        .with_ready(vec![entry(5, 100, 9, TicketStatus::Open)])
        .with_panel(panel(9, 200, Some(300)))
}

async fn wait_for_state(scheduler: &Scheduler, wanted: SchedulerState) {
    let mut rx = scheduler.subscribe();
    rx.wait_for(|state| *state == wanted).await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn runs_one_cycle_per_interval() {
    let store = Arc::new(ready_store());
    let publisher = Arc::new(MockPublisher::new());
    let s = scheduler(store.clone(), publisher.clone(), Duration::from_secs(300));

    let handle = tokio::spawn({
        let s = s.clone();
        async move { s.start().await }
    });
    wait_for_state(&s, SchedulerState::Running).await;

    sleep(FREQUENCY - Duration::from_secs(1)).await;
    assert_eq!(store.ready_calls(), 0, "first cycle waits one interval");

    sleep(Duration::from_secs(2)).await;
    assert_eq!(store.ready_calls(), 1);

    sleep(FREQUENCY).await;
    assert_eq!(store.ready_calls(), 2);
    assert_eq!(publisher.attempts(), 2);

    s.request_shutdown();
    handle.await.unwrap();
    assert_eq!(s.state(), SchedulerState::Stopped);
}

#[tokio::test(start_paused = true)]
async fn shutdown_lets_in_flight_cycle_finish() {
    let store = Arc::new(ready_store());
    let publisher = Arc::new(MockPublisher::new().with_delay(Duration::from_secs(100)));
    let s = scheduler(store.clone(), publisher.clone(), Duration::from_secs(300));
    let started = Instant::now();

    let handle = tokio::spawn({
        let s = s.clone();
        async move { s.start().await }
    });

    // Cycle starts at 600s and its publish completes at 700s.
    sleep(FREQUENCY + Duration::from_secs(50)).await;
    assert_eq!(publisher.attempts(), 1);
    assert!(publisher.published().await.is_empty());

    s.request_shutdown();
    assert_eq!(s.state(), SchedulerState::ShuttingDown);

    s.wait_stopped().await;
    handle.await.unwrap();

    assert!(started.elapsed() >= FREQUENCY + Duration::from_secs(100));
    assert_eq!(publisher.published().await.len(), 1);

    // The timer is not re-armed after shutdown.
    sleep(FREQUENCY * 3).await;
    assert_eq!(store.ready_calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn failed_fetch_does_not_stop_the_schedule() {
    let store = Arc::new(ready_store().failing_ready());
    let publisher = Arc::new(MockPublisher::new());
    let s = scheduler(store.clone(), publisher.clone(), Duration::from_secs(300));

    let handle = tokio::spawn({
        let s = s.clone();
        async move { s.start().await }
    });

    sleep(FREQUENCY * 2 + Duration::from_secs(1)).await;
    assert_eq!(store.ready_calls(), 2);
    assert_eq!(store.panel_calls(), 0);
    assert_eq!(publisher.attempts(), 0);
    assert_eq!(s.state(), SchedulerState::Running);

    s.request_shutdown();
    handle.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn slow_cycle_is_not_repeated() {
    let store = Arc::new(ready_store());
    let publisher = Arc::new(MockPublisher::new().with_delay(Duration::from_secs(8)));
    let s = scheduler(store.clone(), publisher, Duration::from_secs(10));

    let handle = tokio::spawn({
        let s = s.clone();
        async move { s.start().await }
    });

    sleep(FREQUENCY * 2 - Duration::from_secs(1)).await;
    assert_eq!(store.ready_calls(), 1);

    s.request_shutdown();
    handle.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn overrunning_cycle_delays_next_tick_without_burst() {
    let store = Arc::new(ready_store());
    let publisher = Arc::new(MockPublisher::new().with_delay(Duration::from_secs(1500)));
    let s = scheduler(store.clone(), publisher, FREQUENCY * 4);

    let handle = tokio::spawn({
        let s = s.clone();
        async move { s.start().await }
    });

    // Cycle 1 runs 600s..2100s and misses the ticks at 1200s and 1800s.
    // Later cycles find nothing to publish and return at once.
    sleep(Duration::from_secs(700)).await;
    store.set_ready(Vec::new()).await;

    // One catch-up cycle at 2100s, not one per missed tick.
    sleep(Duration::from_secs(1500)).await;
    assert_eq!(store.ready_calls(), 2);

    // The schedule restarts from the catch-up: next tick at 2700s.
    sleep(Duration::from_secs(450)).await;
    assert_eq!(store.ready_calls(), 2);
    sleep(Duration::from_secs(100)).await;
    assert_eq!(store.ready_calls(), 3);

    s.request_shutdown();
    handle.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn start_after_stop_returns_immediately() {
    let store = Arc::new(ready_store());
    let s = scheduler(store.clone(), Arc::new(MockPublisher::new()), Duration::from_secs(300));

    let handle = tokio::spawn({
        let s = s.clone();
        async move { s.start().await }
    });
    wait_for_state(&s, SchedulerState::Running).await;

    s.request_shutdown();
    s.request_shutdown();
    handle.await.unwrap();
    assert_eq!(s.state(), SchedulerState::Stopped);

    let before = Instant::now();
    s.start().await;
    assert_eq!(before.elapsed(), Duration::ZERO);
    assert_eq!(s.state(), SchedulerState::Stopped);
    assert_eq!(store.ready_calls(), 0);
}
