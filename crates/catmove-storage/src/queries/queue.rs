// SPDX-FileCopyrightText: 2026 Catmove Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Category update queue operations.
//!
//! One row per (guild, ticket). Writers upsert the latest requested status;
//! the producer claims rows once they have aged past the configured
//! threshold and deletes them only when it acknowledges them. A claim that
//! is never acknowledged lapses and the row is handed out again.

use std::str::FromStr;
use std::time::Duration;

use catmove_core::{ProducerError, QueueEntry, TicketStatus};
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{Row, TransactionBehavior, params};

use crate::database::{Database, map_tr_err};
use crate::queries::{format_timestamp, snowflake_from_sql, snowflake_to_sql};

/// Queue a category update for a ticket, stamped with the current time.
pub async fn enqueue(db: &Database, entry: &QueueEntry) -> Result<(), ProducerError> {
    enqueue_at(db, entry, Utc::now()).await
}

/// Queue a category update with an explicit timestamp.
///
/// A newer request for the same ticket replaces the queued one, drops any
/// claim on it and restarts its waiting period.
pub async fn enqueue_at(
    db: &Database,
    entry: &QueueEntry,
    at: DateTime<Utc>,
) -> Result<(), ProducerError> {
    let entry = entry.clone();
    let updated_at = format_timestamp(at);
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "INSERT INTO category_update_queue
                     (guild_id, ticket_id, channel_id, panel_id, new_status, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT (guild_id, ticket_id) DO UPDATE SET
                     channel_id = excluded.channel_id,
                     panel_id = excluded.panel_id,
                     new_status = excluded.new_status,
                     updated_at = excluded.updated_at,
                     claimed_until = NULL",
                params![
                    snowflake_to_sql(entry.guild_id),
                    entry.ticket_id,
                    entry.channel_id.map(snowflake_to_sql),
                    entry.panel_id,
                    entry.new_status.to_string(),
                    updated_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Claim every unclaimed entry that has been queued for at least `age`,
/// oldest first. The claim holds for `claim`.
pub async fn get_ready_for_update(
    db: &Database,
    age: Duration,
    claim: Duration,
) -> Result<Vec<QueueEntry>, ProducerError> {
    get_ready_for_update_at(db, Utc::now(), age, claim).await
}

/// [`get_ready_for_update`] evaluated at an explicit point in time.
///
/// Rows whose previous claim ended at or before `now` count as unclaimed.
/// Selecting and claiming happen in one immediate transaction, so a row is
/// never held by two overlapping claims.
pub async fn get_ready_for_update_at(
    db: &Database,
    now: DateTime<Utc>,
    age: Duration,
    claim: Duration,
) -> Result<Vec<QueueEntry>, ProducerError> {
    let cutoff = format_timestamp(shift(now, age, Shift::Back, "age threshold")?);
    let claimed_until = format_timestamp(shift(now, claim, Shift::Forward, "claim")?);
    let now = format_timestamp(now);

    db.connection()
        .call(move |conn| -> Result<Vec<QueueEntry>, rusqlite::Error> {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            let entries = {
                let mut stmt = tx.prepare(
                    "SELECT guild_id, ticket_id, channel_id, panel_id, new_status
                     FROM category_update_queue
                     WHERE updated_at <= ?1
                       AND (claimed_until IS NULL OR claimed_until <= ?2)
                     ORDER BY updated_at ASC, guild_id ASC, ticket_id ASC",
                )?;
                let rows = stmt.query_map(params![cutoff, now], row_to_entry)?;
                rows.collect::<Result<Vec<_>, _>>()?
            };

            tx.execute(
                "UPDATE category_update_queue SET claimed_until = ?3
                 WHERE updated_at <= ?1
                   AND (claimed_until IS NULL OR claimed_until <= ?2)",
                params![cutoff, now, claimed_until],
            )?;
            tx.commit()?;

            Ok(entries)
        })
        .await
        .map_err(map_tr_err)
}

/// Delete a claimed entry. Returns `false` when there was nothing to delete,
/// either because the row is gone or because it was re-queued since the
/// claim and now carries a newer request.
pub async fn ack(db: &Database, entry: &QueueEntry) -> Result<bool, ProducerError> {
    let guild_id = snowflake_to_sql(entry.guild_id);
    let ticket_id = entry.ticket_id;
    db.connection()
        .call(move |conn| -> Result<bool, rusqlite::Error> {
            let deleted = conn.execute(
                "DELETE FROM category_update_queue
                 WHERE guild_id = ?1 AND ticket_id = ?2 AND claimed_until IS NOT NULL",
                params![guild_id, ticket_id],
            )?;
            Ok(deleted > 0)
        })
        .await
        .map_err(map_tr_err)
}

enum Shift {
    Back,
    Forward,
}

fn shift(
    at: DateTime<Utc>,
    by: Duration,
    direction: Shift,
    what: &str,
) -> Result<DateTime<Utc>, ProducerError> {
    let shifted = chrono::Duration::from_std(by).ok().and_then(|delta| match direction {
        Shift::Back => at.checked_sub_signed(delta),
        Shift::Forward => at.checked_add_signed(delta),
    });
    shifted.ok_or_else(|| ProducerError::Config(format!("{what} of {by:?} is out of range")))
}

/// Number of queued entries, ready or not.
pub async fn count(db: &Database) -> Result<i64, ProducerError> {
    db.connection()
        .call(|conn| -> Result<i64, rusqlite::Error> {
            conn.query_row("SELECT COUNT(*) FROM category_update_queue", [], |row| {
                row.get(0)
            })
        })
        .await
        .map_err(map_tr_err)
}

fn row_to_entry(row: &Row<'_>) -> Result<QueueEntry, rusqlite::Error> {
    let status: String = row.get(4)?;
    let new_status = TicketStatus::from_str(&status)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))?;

    Ok(QueueEntry {
        guild_id: snowflake_from_sql(row.get(0)?),
        ticket_id: row.get(1)?,
        channel_id: row.get::<_, Option<i64>>(2)?.map(snowflake_from_sql),
        panel_id: row.get(3)?,
        new_status,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("queue.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    fn entry(ticket_id: i32, status: TicketStatus) -> QueueEntry {
        QueueEntry {
            guild_id: 1,
            ticket_id,
            channel_id: Some(100 + ticket_id as u64),
            panel_id: Some(9),
            new_status: status,
        }
    }

    const CLAIM: Duration = Duration::from_secs(300);

    fn minutes_ago(minutes: i64) -> DateTime<Utc> {
        Utc::now() - chrono::Duration::minutes(minutes)
    }

    #[tokio::test]
    async fn only_aged_entries_are_ready() {
        let (db, _dir) = setup_db().await;

        enqueue_at(&db, &entry(1, TicketStatus::Open), minutes_ago(20))
            .await
            .unwrap();
        enqueue_at(&db, &entry(2, TicketStatus::Pending), minutes_ago(1))
            .await
            .unwrap();

        let ready = get_ready_for_update(&db, Duration::from_secs(600), CLAIM)
            .await
            .unwrap();
        assert_eq!(ready, vec![entry(1, TicketStatus::Open)]);

        // Claimed rows stay queued until acknowledged.
        assert_eq!(count(&db).await.unwrap(), 2);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn claimed_entries_are_not_handed_out_twice() {
        let (db, _dir) = setup_db().await;
        let now = Utc::now();

        enqueue_at(&db, &entry(1, TicketStatus::Open), minutes_ago(30))
            .await
            .unwrap();

        let first = get_ready_for_update_at(&db, now, Duration::from_secs(60), CLAIM)
            .await
            .unwrap();
        assert_eq!(first.len(), 1);

        let second = get_ready_for_update_at(&db, now, Duration::from_secs(60), CLAIM)
            .await
            .unwrap();
        assert!(second.is_empty());
        assert_eq!(count(&db).await.unwrap(), 1);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn unacknowledged_claim_lapses() {
        let (db, _dir) = setup_db().await;
        let now = Utc::now();
        let age = Duration::from_secs(60);

        enqueue_at(&db, &entry(1, TicketStatus::Open), minutes_ago(30))
            .await
            .unwrap();

        let claimed = get_ready_for_update_at(&db, now, age, CLAIM).await.unwrap();
        assert_eq!(claimed, vec![entry(1, TicketStatus::Open)]);

        let almost = now + chrono::Duration::seconds(299);
        assert!(
            get_ready_for_update_at(&db, almost, age, CLAIM)
                .await
                .unwrap()
                .is_empty()
        );

        let lapsed = now + chrono::Duration::seconds(300);
        let again = get_ready_for_update_at(&db, lapsed, age, CLAIM).await.unwrap();
        assert_eq!(again, vec![entry(1, TicketStatus::Open)]);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn ack_deletes_claimed_entry() {
        let (db, _dir) = setup_db().await;
        let queued = entry(1, TicketStatus::Open);

        enqueue_at(&db, &queued, minutes_ago(30)).await.unwrap();
        assert!(!ack(&db, &queued).await.unwrap(), "unclaimed rows are not acked");

        get_ready_for_update(&db, Duration::from_secs(60), CLAIM)
            .await
            .unwrap();
        assert!(ack(&db, &queued).await.unwrap());
        assert!(!ack(&db, &queued).await.unwrap());
        assert_eq!(count(&db).await.unwrap(), 0);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn ack_keeps_request_queued_after_claim() {
        let (db, _dir) = setup_db().await;

        enqueue_at(&db, &entry(1, TicketStatus::Pending), minutes_ago(30))
            .await
            .unwrap();
        let claimed = get_ready_for_update(&db, Duration::from_secs(60), CLAIM)
            .await
            .unwrap();

        enqueue(&db, &entry(1, TicketStatus::Open)).await.unwrap();
        assert!(!ack(&db, &claimed[0]).await.unwrap());

        let ready = get_ready_for_update(&db, Duration::ZERO, CLAIM).await.unwrap();
        assert_eq!(ready, vec![entry(1, TicketStatus::Open)]);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn out_of_range_age_is_rejected() {
        let (db, _dir) = setup_db().await;

        let err = get_ready_for_update(&db, Duration::from_secs(u64::MAX), CLAIM)
            .await
            .unwrap_err();
        assert!(matches!(err, ProducerError::Config(_)));

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn ready_entries_are_ordered_oldest_first() {
        let (db, _dir) = setup_db().await;

        enqueue_at(&db, &entry(3, TicketStatus::Open), minutes_ago(15))
            .await
            .unwrap();
        enqueue_at(&db, &entry(1, TicketStatus::Open), minutes_ago(45))
            .await
            .unwrap();
        enqueue_at(&db, &entry(2, TicketStatus::Pending), minutes_ago(30))
            .await
            .unwrap();

        let ready = get_ready_for_update(&db, Duration::from_secs(600), CLAIM)
            .await
            .unwrap();
        let ids: Vec<i32> = ready.iter().map(|e| e.ticket_id).collect();
        assert_eq!(ids, vec![1, 2, 3]);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn requeue_replaces_status_and_restarts_wait() {
        let (db, _dir) = setup_db().await;

        enqueue_at(&db, &entry(1, TicketStatus::Pending), minutes_ago(30))
            .await
            .unwrap();
        enqueue(&db, &entry(1, TicketStatus::Open)).await.unwrap();

        assert_eq!(count(&db).await.unwrap(), 1);
        let ready = get_ready_for_update(&db, Duration::from_secs(600), CLAIM)
            .await
            .unwrap();
        assert!(ready.is_empty(), "re-queued entry must wait again");

        let ready = get_ready_for_update(&db, Duration::ZERO, CLAIM).await.unwrap();
        assert_eq!(ready, vec![entry(1, TicketStatus::Open)]);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn optional_columns_round_trip_as_none() {
        let (db, _dir) = setup_db().await;

        let bare = QueueEntry {
            guild_id: 1,
            ticket_id: 7,
            channel_id: None,
            panel_id: None,
            new_status: TicketStatus::Open,
        };
        enqueue_at(&db, &bare, minutes_ago(20)).await.unwrap();

        let ready = get_ready_for_update(&db, Duration::from_secs(60), CLAIM)
            .await
            .unwrap();
        assert_eq!(ready, vec![bare]);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn large_snowflakes_are_preserved() {
        let (db, _dir) = setup_db().await;

        let discord = QueueEntry {
            guild_id: 508_392_876_359_680_000,
            ticket_id: 42,
            channel_id: Some(u64::MAX - 1),
            panel_id: Some(3),
            new_status: TicketStatus::Closed,
        };
        enqueue_at(&db, &discord, minutes_ago(20)).await.unwrap();

        let ready = get_ready_for_update(&db, Duration::from_secs(60), CLAIM)
            .await
            .unwrap();
        assert_eq!(ready, vec![discord]);

        db.close().await.unwrap();
    }
}
