// SPDX-FileCopyrightText: 2026 Catmove Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Consumer side of the persistent ticket store.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::ProducerError;
use crate::traits::adapter::Adapter;
use crate::types::{Panel, QueueEntry};

/// Source of queued category updates and panel configuration.
#[async_trait]
pub trait TicketStore: Adapter {
    /// Returns every queue entry that has waited at least `age`, oldest first.
    ///
    /// Returned entries are claimed, not removed: until [`TicketStore::ack`]
    /// is called for one, it becomes ready again once its claim lapses.
    async fn get_ready_for_update(&self, age: Duration) -> Result<Vec<QueueEntry>, ProducerError>;

    /// Marks a claimed entry as handled and removes it from the queue.
    ///
    /// A request re-queued for the same ticket after the claim is kept.
    async fn ack(&self, entry: &QueueEntry) -> Result<(), ProducerError>;

    /// Looks up a panel, returning `None` when it does not exist.
    async fn get_panel_by_id(&self, panel_id: i32) -> Result<Option<Panel>, ProducerError>;
}
