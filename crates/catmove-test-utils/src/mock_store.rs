// SPDX-FileCopyrightText: 2026 Catmove Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory `TicketStore` for deterministic cycle tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use catmove_core::{
    Adapter, AdapterType, HealthStatus, Panel, ProducerError, QueueEntry, TicketStore,
};

/// A ticket store returning a fixed ready set on every fetch.
///
/// Unlike the SQLite store it neither claims nor removes entries: acks are
/// only recorded, so repeated cycles see the same ready set unless
/// [`MockStore::set_ready`] replaces it.
#[derive(Default)]
pub struct MockStore {
    ready: Mutex<Vec<QueueEntry>>,
    panels: HashMap<i32, Panel>,
    failing_panels: HashSet<i32>,
    fail_ready: bool,
    fail_ack: bool,
    ready_delay: Option<Duration>,
    panel_delay: Option<Duration>,
    ready_calls: AtomicUsize,
    panel_calls: AtomicUsize,
    ages: Mutex<Vec<Duration>>,
    acked: Mutex<Vec<(u64, i32)>>,
}

impl MockStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries returned by `get_ready_for_update`.
    pub fn with_ready(mut self, entries: Vec<QueueEntry>) -> Self {
        self.ready = Mutex::new(entries);
        self
    }

    /// Add a panel served by `get_panel_by_id`.
    pub fn with_panel(mut self, panel: Panel) -> Self {
        self.panels.insert(panel.panel_id, panel);
        self
    }

    /// Make lookups of `panel_id` fail with a storage error.
    pub fn failing_panel(mut self, panel_id: i32) -> Self {
        self.failing_panels.insert(panel_id);
        self
    }

    /// Make every ready-set fetch fail with a storage error.
    pub fn failing_ready(mut self) -> Self {
        self.fail_ready = true;
        self
    }

    /// Make every ack fail with a storage error.
    pub fn failing_ack(mut self) -> Self {
        self.fail_ack = true;
        self
    }

    /// Sleep this long inside every ready-set fetch.
    pub fn with_ready_delay(mut self, delay: Duration) -> Self {
        self.ready_delay = Some(delay);
        self
    }

    /// Sleep this long inside every panel lookup.
    pub fn with_panel_delay(mut self, delay: Duration) -> Self {
        self.panel_delay = Some(delay);
        self
    }

    /// Replace the ready set between cycles.
    pub async fn set_ready(&self, entries: Vec<QueueEntry>) {
        *self.ready.lock().await = entries;
    }

    /// Number of `get_ready_for_update` calls so far.
    pub fn ready_calls(&self) -> usize {
        self.ready_calls.load(Ordering::SeqCst)
    }

    /// Number of `get_panel_by_id` calls so far.
    pub fn panel_calls(&self) -> usize {
        self.panel_calls.load(Ordering::SeqCst)
    }

    /// (guild id, ticket id) of every successful ack, in call order.
    pub async fn acked(&self) -> Vec<(u64, i32)> {
        self.acked.lock().await.clone()
    }

    /// Age thresholds passed to `get_ready_for_update`, in call order.
    pub async fn requested_ages(&self) -> Vec<Duration> {
        self.ages.lock().await.clone()
    }
}

fn storage_error(message: &str) -> ProducerError {
    ProducerError::Storage {
        source: message.to_string().into(),
    }
}

#[async_trait]
impl Adapter for MockStore {
    fn name(&self) -> &str {
        "mock-store"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Store
    }

    async fn health_check(&self) -> Result<HealthStatus, ProducerError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), ProducerError> {
        Ok(())
    }
}

#[async_trait]
impl TicketStore for MockStore {
    async fn get_ready_for_update(&self, age: Duration) -> Result<Vec<QueueEntry>, ProducerError> {
        self.ready_calls.fetch_add(1, Ordering::SeqCst);
        self.ages.lock().await.push(age);
        if let Some(delay) = self.ready_delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_ready {
            return Err(storage_error("connection refused"));
        }
        Ok(self.ready.lock().await.clone())
    }

    async fn ack(&self, entry: &QueueEntry) -> Result<(), ProducerError> {
        if self.fail_ack {
            return Err(storage_error("database is locked"));
        }
        self.acked
            .lock()
            .await
            .push((entry.guild_id, entry.ticket_id));
        Ok(())
    }

    async fn get_panel_by_id(&self, panel_id: i32) -> Result<Option<Panel>, ProducerError> {
        self.panel_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.panel_delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing_panels.contains(&panel_id) {
            return Err(storage_error("panel query failed"));
        }
        Ok(self.panels.get(&panel_id).cloned())
    }
}
