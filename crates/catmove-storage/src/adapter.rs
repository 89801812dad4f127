// SPDX-FileCopyrightText: 2026 Catmove Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the `TicketStore` trait.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use catmove_core::{
    Adapter, AdapterType, HealthStatus, Panel, ProducerError, QueueEntry, TicketStore,
};

use crate::database::{Database, map_tr_err};
use crate::queries;

/// Claim duration used unless [`SqliteStore::with_claim`] overrides it.
pub const DEFAULT_CLAIM: Duration = Duration::from_secs(5 * 60);

/// SQLite-backed ticket store.
///
/// Wraps a [`Database`] handle and delegates to the typed query modules.
pub struct SqliteStore {
    db: Database,
    claim: Duration,
}

impl SqliteStore {
    /// Open the database at `uri` and run migrations.
    pub async fn open(uri: &str) -> Result<Self, ProducerError> {
        let db = Database::open(uri).await?;
        debug!(path = %db.path(), "SQLite ticket store opened");
        Ok(Self {
            db,
            claim: DEFAULT_CLAIM,
        })
    }

    /// How long a handed-out entry stays claimed without an ack.
    ///
    /// Should cover a whole cycle, so an entry is not handed out again while
    /// the cycle that claimed it is still running.
    pub fn with_claim(mut self, claim: Duration) -> Self {
        self.claim = claim;
        self
    }

    /// The underlying database, for writers and fixtures.
    pub fn database(&self) -> &Database {
        &self.db
    }
}

#[async_trait]
impl Adapter for SqliteStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Store
    }

    async fn health_check(&self) -> Result<HealthStatus, ProducerError> {
        self.db
            .connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.query_row("SELECT 1", [], |_| Ok(()))
            })
            .await
            .map_err(map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), ProducerError> {
        self.db.checkpoint().await?;
        debug!("shutdown: WAL checkpoint complete");
        Ok(())
    }
}

#[async_trait]
impl TicketStore for SqliteStore {
    async fn get_ready_for_update(&self, age: Duration) -> Result<Vec<QueueEntry>, ProducerError> {
        queries::queue::get_ready_for_update(&self.db, age, self.claim).await
    }

    async fn ack(&self, entry: &QueueEntry) -> Result<(), ProducerError> {
        if !queries::queue::ack(&self.db, entry).await? {
            debug!(
                guild_id = entry.guild_id,
                ticket_id = entry.ticket_id,
                "queue entry was re-queued or already removed, nothing to ack"
            );
        }
        Ok(())
    }

    async fn get_panel_by_id(&self, panel_id: i32) -> Result<Option<Panel>, ProducerError> {
        queries::panels::get_panel_by_id(&self.db, panel_id).await
    }
}
