// SPDX-FileCopyrightText: 2026 Catmove Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared between the store, the bus adapter and the daemon.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Lifecycle status a ticket is transitioning to.
///
/// Stored and transmitted in its upper-case form (`OPEN`, `PENDING`, `CLOSED`).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TicketStatus {
    Open,
    Pending,
    Closed,
}

/// A queued request to move a ticket's channel into another category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueEntry {
    pub guild_id: u64,
    pub ticket_id: i32,
    /// Absent when the ticket channel was never created or has been deleted.
    pub channel_id: Option<u64>,
    /// Absent when the ticket was not opened from a panel.
    pub panel_id: Option<i32>,
    pub new_status: TicketStatus,
}

/// Panel configuration governing where a ticket's channel lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Panel {
    pub panel_id: i32,
    pub guild_id: u64,
    /// Category used while the ticket is open.
    pub target_category: u64,
    /// Category used while the ticket is pending. `None` disables category moves.
    pub pending_category: Option<u64>,
}

impl Panel {
    /// A zero panel id never refers to a live panel.
    pub fn exists(&self) -> bool {
        self.panel_id != 0
    }
}

/// Identity of a ticket inside a guild, as carried on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketRef {
    pub guild_id: u64,
    pub id: i32,
}

/// Outbound command instructing the consumer to move a ticket channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketStatusUpdate {
    pub ticket: TicketRef,
    pub channel_id: u64,
    pub new_category_id: u64,
}

/// Health status reported by collaborator health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Collaborator is fully operational.
    Healthy,
    /// Collaborator is operational but reporting problems.
    Degraded(String),
    /// Collaborator is not operational.
    Unhealthy(String),
}

/// Identifies which side of the pipeline an adapter serves.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Store,
    Publisher,
}
