// SPDX-FileCopyrightText: 2026 Catmove Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the category update producer.
//!
//! Defines the domain types read from the ticket store, the outbound
//! status-update event, the shared error type, and the collaborator traits
//! the reconciliation cycle is written against.

pub mod error;
pub mod traits;
pub mod types;

pub use error::ProducerError;
pub use types::{
    AdapterType, HealthStatus, Panel, QueueEntry, TicketRef, TicketStatus, TicketStatusUpdate,
};

pub use traits::{Adapter, EventPublisher, TicketStore};
