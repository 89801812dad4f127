// SPDX-FileCopyrightText: 2026 Catmove Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound side: hands status updates to the message bus.

use async_trait::async_trait;

use crate::error::ProducerError;
use crate::traits::adapter::Adapter;
use crate::types::TicketStatusUpdate;

/// Publishes ticket status updates to a bus topic.
#[async_trait]
pub trait EventPublisher: Adapter {
    /// Publishes one event and waits for the broker to acknowledge it.
    ///
    /// Retry and backoff, if any, belong to the underlying client.
    async fn publish(&self, topic: &str, event: &TicketStatusUpdate) -> Result<(), ProducerError>;
}
