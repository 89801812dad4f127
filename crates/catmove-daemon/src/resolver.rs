// SPDX-FileCopyrightText: 2026 Catmove Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Status to category mapping.

use catmove_core::TicketStatus;

/// Category a ticket's channel belongs in for `status`.
///
/// Open tickets live in the panel's target category, pending tickets in its
/// pending category. Other statuses have no category of their own and yield
/// `None`.
pub fn resolve_category(status: TicketStatus, target: u64, pending: u64) -> Option<u64> {
    match status {
        TicketStatus::Open => Some(target),
        TicketStatus::Pending => Some(pending),
        TicketStatus::Closed => None,
    }
}
