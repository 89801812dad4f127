// SPDX-FileCopyrightText: 2026 Catmove Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test doubles for the category update producer.
//!
//! - [`MockStore`] - in-memory ticket store with scripted failures and delays
//! - [`MockPublisher`] - records published events, can fail selected tickets

pub mod mock_publisher;
pub mod mock_store;

pub use mock_publisher::MockPublisher;
pub use mock_store::MockStore;

use catmove_core::{Panel, QueueEntry, TicketStatus};

/// Queue entry with every optional field present.
pub fn entry(ticket_id: i32, channel_id: u64, panel_id: i32, status: TicketStatus) -> QueueEntry {
    QueueEntry {
        guild_id: 1,
        ticket_id,
        channel_id: Some(channel_id),
        panel_id: Some(panel_id),
        new_status: status,
    }
}

/// Panel in guild 1.
pub fn panel(panel_id: i32, target_category: u64, pending_category: Option<u64>) -> Panel {
    Panel {
        panel_id,
        guild_id: 1,
        target_category,
        pending_category,
    }
}
