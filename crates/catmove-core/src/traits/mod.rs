// SPDX-FileCopyrightText: 2026 Catmove Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collaborator traits consumed by the reconciliation cycle.
//!
//! All adapters extend the [`Adapter`] base trait and use `#[async_trait]`
//! so they can be held as `Arc<dyn ...>`.

pub mod adapter;
pub mod publisher;
pub mod store;

pub use adapter::Adapter;
pub use publisher::EventPublisher;
pub use store::TicketStore;
