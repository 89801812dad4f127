// SPDX-FileCopyrightText: 2026 Catmove Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! One reconciliation pass over the category update queue.
//!
//! A cycle fetches the ready set, resolves each entry against its panel and
//! publishes a status update for every entry that resolves. Entries are
//! independent: a skip or failure on one never stops the next. Only a failed
//! ready-set fetch aborts the cycle, since there is nothing to iterate.
//!
//! Every store and bus call shares one deadline, `execution_timeout` after
//! the cycle starts.
//!
//! Published and skipped entries are acknowledged to the store. Failed
//! entries are not, so the store hands them out again in a later cycle.

use std::sync::Arc;
use std::time::Duration;

use catmove_config::ProducerConfig;
use catmove_core::{
    EventPublisher, ProducerError, QueueEntry, TicketRef, TicketStatus, TicketStatusUpdate,
    TicketStore,
};
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::resolver::resolve_category;

/// Inputs of a reconciliation cycle.
#[derive(Debug, Clone)]
pub struct CycleSettings {
    /// Deadline for the whole cycle.
    pub execution_timeout: Duration,
    /// Minimum time an entry waits in the queue before it is ready.
    pub move_category_after: Duration,
    /// Topic receiving status updates.
    pub topic: String,
}

impl From<&ProducerConfig> for CycleSettings {
    fn from(config: &ProducerConfig) -> Self {
        Self {
            execution_timeout: config.execution_timeout,
            move_category_after: config.move_category_after,
            topic: config.kafka.topic.clone(),
        }
    }
}

/// Why an entry was skipped without publishing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    MissingChannel,
    MissingPanel,
    PanelDeleted,
    PendingCategoryUnset,
    UnmappedStatus(TicketStatus),
}

/// Result of processing one queue entry.
#[derive(Debug)]
pub enum EntryOutcome {
    /// Status update published with this category.
    Published(u64),
    /// Entry cannot be acted on; not an error of the cycle.
    Skipped(SkipReason),
    /// Panel lookup or publish failed; the entry is left for a later cycle.
    Failed(ProducerError),
}

/// Summary of a finished cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Entries in the ready set.
    pub fetched: usize,
    pub published: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Published or skipped entries the store could not acknowledge. They
    /// will be handed out again.
    pub unacknowledged: usize,
    /// The ready set could not be fetched; no entry was processed.
    pub aborted: bool,
    /// The cycle used more than half its execution timeout.
    pub over_budget: bool,
    pub elapsed: Duration,
}

/// Runs reconciliation cycles against a store and a publisher.
pub struct CycleRunner {
    store: Arc<dyn TicketStore>,
    publisher: Arc<dyn EventPublisher>,
    settings: CycleSettings,
}

impl CycleRunner {
    pub fn new(
        store: Arc<dyn TicketStore>,
        publisher: Arc<dyn EventPublisher>,
        settings: CycleSettings,
    ) -> Self {
        Self {
            store,
            publisher,
            settings,
        }
    }

    /// Execute one complete cycle.
    pub async fn run_once(&self) -> CycleReport {
        debug!("running reconciliation cycle");

        let budget = self.settings.execution_timeout;
        let start = Instant::now();
        let mut report = CycleReport::default();

        let Some(deadline) = start.checked_add(budget) else {
            error!(timeout = ?budget, "execution timeout is out of range");
            report.aborted = true;
            return report;
        };

        let entries = match within(
            deadline,
            budget,
            self.store
                .get_ready_for_update(self.settings.move_category_after),
        )
        .await
        {
            Ok(entries) => entries,
            Err(e) => {
                error!(error = %e, "failed to get tickets ready for category update");
                report.aborted = true;
                report.elapsed = start.elapsed();
                return report;
            }
        };
        report.fetched = entries.len();

        for entry in &entries {
            match self.process_entry(entry, deadline).await {
                EntryOutcome::Published(_) => report.published += 1,
                EntryOutcome::Skipped(_) => report.skipped += 1,
                EntryOutcome::Failed(_) => {
                    report.failed += 1;
                    continue;
                }
            }
            if !self.acknowledge(entry, deadline).await {
                report.unacknowledged += 1;
            }
        }

        report.elapsed = start.elapsed();
        if report.elapsed > budget / 2 {
            report.over_budget = true;
            warn!(
                duration = ?report.elapsed,
                timeout = ?budget,
                "execution took more than 50% of the timeout"
            );
        }

        debug!(
            fetched = report.fetched,
            published = report.published,
            skipped = report.skipped,
            failed = report.failed,
            unacknowledged = report.unacknowledged,
            "reconciliation cycle complete"
        );
        report
    }

    /// Resolve and publish a single entry. Logs the outcome at its severity
    /// but leaves acknowledging the entry to the caller.
    pub async fn process_entry(&self, entry: &QueueEntry, deadline: Instant) -> EntryOutcome {
        let guild_id = entry.guild_id;
        let ticket_id = entry.ticket_id;
        let budget = self.settings.execution_timeout;

        let Some(channel_id) = entry.channel_id else {
            warn!(guild_id, ticket_id, "channel id is missing");
            return EntryOutcome::Skipped(SkipReason::MissingChannel);
        };

        let Some(panel_id) = entry.panel_id else {
            warn!(guild_id, ticket_id, "panel id is missing");
            return EntryOutcome::Skipped(SkipReason::MissingPanel);
        };

        let panel = match within(deadline, budget, self.store.get_panel_by_id(panel_id)).await {
            Ok(Some(panel)) if panel.exists() => panel,
            Ok(_) => {
                info!(guild_id, ticket_id, panel_id, "panel for ticket has been deleted");
                return EntryOutcome::Skipped(SkipReason::PanelDeleted);
            }
            Err(e) => {
                error!(
                    guild_id,
                    ticket_id,
                    panel_id,
                    error = %e,
                    transient = e.is_transient(),
                    "failed to get panel"
                );
                return EntryOutcome::Failed(e);
            }
        };

        // No pending category means the panel has category moves turned off.
        let Some(pending_category) = panel.pending_category else {
            debug!(guild_id, ticket_id, panel_id, "no pending category set");
            return EntryOutcome::Skipped(SkipReason::PendingCategoryUnset);
        };

        let Some(new_category) =
            resolve_category(entry.new_status, panel.target_category, pending_category)
        else {
            error!(
                guild_id,
                ticket_id,
                status = %entry.new_status,
                "ticket status has no category mapping"
            );
            return EntryOutcome::Skipped(SkipReason::UnmappedStatus(entry.new_status));
        };

        let event = TicketStatusUpdate {
            ticket: TicketRef {
                guild_id,
                id: ticket_id,
            },
            channel_id,
            new_category_id: new_category,
        };

        if let Err(e) = within(
            deadline,
            budget,
            self.publisher.publish(&self.settings.topic, &event),
        )
        .await
        {
            error!(
                guild_id,
                ticket_id,
                error = %e,
                transient = e.is_transient(),
                "failed to send category update command"
            );
            return EntryOutcome::Failed(e);
        }

        info!(guild_id, ticket_id, new_category, "sent category update command");
        EntryOutcome::Published(new_category)
    }

    /// Remove a handled entry from the queue. An entry that cannot be
    /// acknowledged is handed out again, so its update may be published twice.
    async fn acknowledge(&self, entry: &QueueEntry, deadline: Instant) -> bool {
        let budget = self.settings.execution_timeout;
        match within(deadline, budget, self.store.ack(entry)).await {
            Ok(()) => true,
            Err(e) => {
                warn!(
                    guild_id = entry.guild_id,
                    ticket_id = entry.ticket_id,
                    error = %e,
                    "failed to acknowledge queue entry, it will be handed out again"
                );
                false
            }
        }
    }
}

/// Await `op` unless the cycle deadline passes first.
async fn within<T, F>(deadline: Instant, budget: Duration, op: F) -> Result<T, ProducerError>
where
    F: Future<Output = Result<T, ProducerError>>,
{
    tokio::time::timeout_at(deadline, op)
        .await
        .unwrap_or(Err(ProducerError::Timeout { duration: budget }))
}
