// SPDX-FileCopyrightText: 2026 Catmove Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite ticket store for the category update producer.
//!
//! Holds the category update queue and panel configuration in a WAL-mode
//! SQLite database with embedded migrations. All access goes through the
//! single background thread owned by `tokio-rusqlite`.

pub mod adapter;
pub mod database;
pub mod migrations;
pub mod queries;

pub use adapter::SqliteStore;
pub use database::Database;
