// SPDX-FileCopyrightText: 2026 Catmove Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Panel configuration lookups.

use catmove_core::{Panel, ProducerError};
use rusqlite::{OptionalExtension, params};

use crate::database::{Database, map_tr_err};
use crate::queries::{snowflake_from_sql, snowflake_to_sql};

/// Fetch a panel by id. Returns `None` if no such panel exists.
pub async fn get_panel_by_id(db: &Database, panel_id: i32) -> Result<Option<Panel>, ProducerError> {
    db.connection()
        .call(move |conn| -> Result<Option<Panel>, rusqlite::Error> {
            conn.query_row(
                "SELECT panel_id, guild_id, target_category, pending_category
                 FROM panels WHERE panel_id = ?1",
                params![panel_id],
                |row| {
                    Ok(Panel {
                        panel_id: row.get(0)?,
                        guild_id: snowflake_from_sql(row.get(1)?),
                        target_category: snowflake_from_sql(row.get(2)?),
                        pending_category: row.get::<_, Option<i64>>(3)?.map(snowflake_from_sql),
                    })
                },
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Insert or replace a panel's category settings.
pub async fn upsert_panel(db: &Database, panel: &Panel) -> Result<(), ProducerError> {
    let panel = panel.clone();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "INSERT INTO panels (panel_id, guild_id, target_category, pending_category)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT (panel_id) DO UPDATE SET
                     guild_id = excluded.guild_id,
                     target_category = excluded.target_category,
                     pending_category = excluded.pending_category",
                params![
                    panel.panel_id,
                    snowflake_to_sql(panel.guild_id),
                    snowflake_to_sql(panel.target_category),
                    panel.pending_category.map(snowflake_to_sql),
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Remove a panel. Returns whether a row was deleted.
pub async fn delete_panel(db: &Database, panel_id: i32) -> Result<bool, ProducerError> {
    db.connection()
        .call(move |conn| -> Result<bool, rusqlite::Error> {
            let deleted = conn.execute("DELETE FROM panels WHERE panel_id = ?1", params![panel_id])?;
            Ok(deleted > 0)
        })
        .await
        .map_err(map_tr_err)
}
