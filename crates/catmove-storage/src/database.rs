// SPDX-FileCopyrightText: 2026 Catmove Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management: URI handling, PRAGMA setup, migrations
//! and shutdown.
//!
//! Every statement runs on tokio-rusqlite's background thread, so one
//! `Database` serializes all reads and writes issued by this process.

use catmove_core::ProducerError;
use tracing::{debug, info};

use crate::migrations;

/// Handle to the ticket store database.
pub struct Database {
    conn: tokio_rusqlite::Connection,
    path: String,
}

impl Database {
    /// Open (or create) the database named by `uri` and bring its schema up to date.
    ///
    /// Accepts a plain path, `sqlite://<path>`, `sqlite:<path>` or `:memory:`.
    pub async fn open(uri: &str) -> Result<Self, ProducerError> {
        let path = path_from_uri(uri)?;
        let conn = tokio_rusqlite::Connection::open(&path)
            .await
            .map_err(|e| ProducerError::Storage { source: Box::new(e) })?;

        conn.call(|conn| -> Result<(), rusqlite::Error> {
            conn.execute_batch(
                "PRAGMA journal_mode = WAL;
                 PRAGMA synchronous = NORMAL;
                 PRAGMA busy_timeout = 5000;
                 PRAGMA foreign_keys = ON;",
            )
        })
        .await
        .map_err(map_tr_err)?;

        let applied = conn
            .call(|conn| migrations::run_migrations(conn))
            .await
            .map_err(map_tr_err)?;

        if applied > 0 {
            info!(path = %path, applied, "database migrations applied");
        }
        debug!(path = %path, "database opened");

        Ok(Self { conn, path })
    }

    /// The underlying async connection.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Filesystem path (or `:memory:`) this handle was opened with.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Checkpoint the WAL so the main database file is self-contained.
    pub async fn checkpoint(&self) -> Result<(), ProducerError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")
            })
            .await
            .map_err(map_tr_err)
    }

    /// Close the connection, waiting for queued statements to finish.
    pub async fn close(self) -> Result<(), ProducerError> {
        self.conn.close().await.map_err(map_tr_err)
    }
}

/// Strip the optional `sqlite:` scheme from a connection URI.
fn path_from_uri(uri: &str) -> Result<String, ProducerError> {
    let uri = uri.trim();
    let path = uri
        .strip_prefix("sqlite://")
        .or_else(|| uri.strip_prefix("sqlite:"))
        .unwrap_or(uri);

    if path.is_empty() {
        return Err(ProducerError::Config(format!(
            "database uri `{uri}` does not name a database"
        )));
    }
    if let Some((scheme, _)) = path.split_once("://") {
        return Err(ProducerError::Config(format!(
            "unsupported database scheme `{scheme}`, expected sqlite"
        )));
    }
    Ok(path.to_string())
}

/// Convert a tokio-rusqlite failure into the storage error variant.
pub(crate) fn map_tr_err<E>(err: tokio_rusqlite::Error<E>) -> ProducerError
where
    E: std::error::Error + Send + Sync + 'static,
{
    ProducerError::Storage {
        source: Box::new(err),
    }
}
