// SPDX-FileCopyrightText: 2026 Catmove Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Recurring driver for reconciliation cycles.
//!
//! The scheduler owns the timer, a cancellation token and a cycle lock. Its
//! lifecycle is published through a `watch` channel so the process driver
//! and tests can observe transitions:
//!
//! ```text
//! Idle --start--> Running --request_shutdown--> ShuttingDown --> Stopped
//!   \______________request_shutdown_____________________________/
//! ```
//!
//! Shutdown never interrupts a cycle. It only stops the timer from firing
//! again; the cycle in flight runs until it returns or hits its own deadline.

use std::time::Duration;

use tokio::sync::{Mutex, watch};
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::cycle::{CycleReport, CycleRunner};

/// Lifecycle of a [`Scheduler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Running,
    ShuttingDown,
    Stopped,
}

pub struct Scheduler {
    runner: CycleRunner,
    run_frequency: Duration,
    cancel: CancellationToken,
    state: watch::Sender<SchedulerState>,
    /// Held for the whole duration of a cycle.
    cycle_lock: Mutex<()>,
}

impl Scheduler {
    pub fn new(runner: CycleRunner, run_frequency: Duration) -> Self {
        let (state, _) = watch::channel(SchedulerState::Idle);
        Self {
            runner,
            run_frequency,
            cancel: CancellationToken::new(),
            state,
            cycle_lock: Mutex::new(()),
        }
    }

    pub fn state(&self) -> SchedulerState {
        *self.state.borrow()
    }

    /// Subscribe to state transitions.
    pub fn subscribe(&self) -> watch::Receiver<SchedulerState> {
        self.state.subscribe()
    }

    /// Run cycles every `run_frequency` until shutdown is requested.
    ///
    /// The first cycle starts one interval after the call. Returns once the
    /// scheduler is [`SchedulerState::Stopped`]. Calling this on a scheduler
    /// that is not idle returns immediately.
    pub async fn start(&self) {
        let started = self.state.send_if_modified(|state| {
            if *state == SchedulerState::Idle {
                *state = SchedulerState::Running;
                true
            } else {
                false
            }
        });
        if !started {
            debug!(state = ?self.state(), "scheduler is not idle, ignoring start");
            return;
        }

        let Some(first_tick) = Instant::now().checked_add(self.run_frequency) else {
            error!(run_frequency = ?self.run_frequency, "run frequency is out of range");
            self.state.send_replace(SchedulerState::Stopped);
            return;
        };

        info!(run_frequency = ?self.run_frequency, "scheduler started");

        let mut ticker = interval_at(first_tick, self.run_frequency);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                () = self.cancel.cancelled() => break,
                _ = ticker.tick() => {
                    self.run_cycle().await;
                }
            }
        }

        self.state.send_replace(SchedulerState::Stopped);
        info!("scheduler stopped");
    }

    /// Run one cycle under the cycle lock.
    ///
    /// Concurrent callers queue behind the cycle in flight.
    pub async fn run_cycle(&self) -> CycleReport {
        let _guard = self.cycle_lock.lock().await;
        self.runner.run_once().await
    }

    /// Stop scheduling new cycles. Idempotent.
    ///
    /// A running scheduler moves to `ShuttingDown` and reaches `Stopped` once
    /// the cycle in flight (if any) returns. An idle scheduler stops at once.
    pub fn request_shutdown(&self) {
        let changed = self.state.send_if_modified(|state| match *state {
            SchedulerState::Running => {
                *state = SchedulerState::ShuttingDown;
                true
            }
            SchedulerState::Idle => {
                *state = SchedulerState::Stopped;
                true
            }
            SchedulerState::ShuttingDown | SchedulerState::Stopped => false,
        });
        self.cancel.cancel();
        if changed {
            info!(state = ?self.state(), "scheduler shutdown requested");
        }
    }

    /// Wait until the scheduler reaches `Stopped`.
    pub async fn wait_stopped(&self) {
        let mut rx = self.state.subscribe();
        // The sender lives in `self`, so the channel cannot close while we wait.
        let _ = rx.wait_for(|state| *state == SchedulerState::Stopped).await;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use catmove_core::TicketStatus;
    use catmove_test_utils::{MockPublisher, MockStore, entry, panel};

    use super::*;
    use crate::cycle::CycleSettings;

    fn scheduler(store: Arc<MockStore>, publisher: Arc<MockPublisher>) -> Scheduler {
        scheduler_every(store, publisher, Duration::from_secs(600))
    }

    fn scheduler_every(
        store: Arc<MockStore>,
        publisher: Arc<MockPublisher>,
        run_frequency: Duration,
    ) -> Scheduler {
        let settings = CycleSettings {
            execution_timeout: Duration::from_secs(300),
            move_category_after: Duration::from_secs(600),
            topic: "updates".into(),
        };
        Scheduler::new(CycleRunner::new(store, publisher, settings), run_frequency)
    }

    #[test]
    fn new_scheduler_is_idle() {
        let s = scheduler(Arc::new(MockStore::new()), Arc::new(MockPublisher::new()));
        assert_eq!(s.state(), SchedulerState::Idle);
    }

    #[tokio::test]
    async fn shutdown_before_start_stops_immediately() {
        let store = Arc::new(MockStore::new());
        let s = scheduler(store.clone(), Arc::new(MockPublisher::new()));

        s.request_shutdown();
        assert_eq!(s.state(), SchedulerState::Stopped);

        s.start().await;
        s.wait_stopped().await;
        assert_eq!(store.ready_calls(), 0);
    }

    #[tokio::test]
    async fn request_shutdown_is_idempotent() {
        let s = scheduler(Arc::new(MockStore::new()), Arc::new(MockPublisher::new()));
        s.request_shutdown();
        s.request_shutdown();
        assert_eq!(s.state(), SchedulerState::Stopped);
    }

    #[tokio::test]
    async fn out_of_range_frequency_stops_instead_of_panicking() {
        let store = Arc::new(MockStore::new());
        let s = scheduler_every(store.clone(), Arc::new(MockPublisher::new()), Duration::MAX);

        s.start().await;

        assert_eq!(s.state(), SchedulerState::Stopped);
        assert_eq!(store.ready_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_cycles_are_serialised() {
        let store = Arc::new(
            MockStore::new()
                .with_ready(vec![entry(5, 100, 9, TicketStatus::Open)])
                .with_panel(panel(9, 200, Some(300))),
        );
        let publisher = Arc::new(MockPublisher::new().with_delay(Duration::from_secs(10)));
        let s = scheduler(store, publisher);

        let start = Instant::now();
        let (a, b) = tokio::join!(s.run_cycle(), s.run_cycle());

        assert_eq!(a.published + b.published, 2);
        assert!(start.elapsed() >= Duration::from_secs(20));
    }
}
