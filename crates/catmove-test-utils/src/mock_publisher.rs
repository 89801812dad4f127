// SPDX-FileCopyrightText: 2026 Catmove Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Recording `EventPublisher` for deterministic cycle tests.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use catmove_core::{
    Adapter, AdapterType, EventPublisher, HealthStatus, ProducerError, TicketStatusUpdate,
};

/// A publisher that records successful publishes in order.
#[derive(Default)]
pub struct MockPublisher {
    published: Mutex<Vec<(String, TicketStatusUpdate)>>,
    failing_tickets: HashSet<i32>,
    delay: Option<Duration>,
    attempts: AtomicUsize,
}

impl MockPublisher {
    /// Create a publisher that accepts everything immediately.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject publishes for this ticket id with a bus error.
    pub fn failing_ticket(mut self, ticket_id: i32) -> Self {
        self.failing_tickets.insert(ticket_id);
        self
    }

    /// Sleep this long inside every publish, before deciding the outcome.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Every successfully published (topic, event) pair.
    pub async fn published(&self) -> Vec<(String, TicketStatusUpdate)> {
        self.published.lock().await.clone()
    }

    /// Number of publish calls, successful or not.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Adapter for MockPublisher {
    fn name(&self) -> &str {
        "mock-publisher"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Publisher
    }

    async fn health_check(&self) -> Result<HealthStatus, ProducerError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), ProducerError> {
        Ok(())
    }
}

#[async_trait]
impl EventPublisher for MockPublisher {
    async fn publish(&self, topic: &str, event: &TicketStatusUpdate) -> Result<(), ProducerError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing_tickets.contains(&event.ticket.id) {
            return Err(ProducerError::Bus {
                message: format!("failed to publish to topic {topic}"),
                source: None,
            });
        }
        self.published
            .lock()
            .await
            .push((topic.to_string(), event.clone()));
        Ok(())
    }
}
