// SPDX-FileCopyrightText: 2026 Catmove Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Base trait shared by the store and publisher adapters.

use async_trait::async_trait;

use crate::error::ProducerError;
use crate::types::{AdapterType, HealthStatus};

/// Identity, health and lifecycle for an external collaborator.
#[async_trait]
pub trait Adapter: Send + Sync + 'static {
    /// Returns the human-readable name of this adapter instance.
    fn name(&self) -> &str;

    /// Returns which collaborator role this adapter fills.
    fn adapter_type(&self) -> AdapterType;

    /// Probes the backing service.
    async fn health_check(&self) -> Result<HealthStatus, ProducerError>;

    /// Flushes pending work and releases held resources.
    async fn shutdown(&self) -> Result<(), ProducerError>;
}
