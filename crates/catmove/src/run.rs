// SPDX-FileCopyrightText: 2026 Catmove Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Subcommand implementations.
//!
//! Startup order is fixed: tracing, database (bounded by the connect
//! timeout), Kafka producer, then the scheduler. Any failure before the
//! scheduler starts is fatal and no cycle runs.

use std::sync::Arc;

use catmove_bus::KafkaPublisher;
use catmove_config::ProducerConfig;
use catmove_core::{Adapter, ProducerError};
use catmove_daemon::{CycleRunner, CycleSettings, Scheduler, install_signal_handler};
use catmove_storage::SqliteStore;
use catmove_storage::queries::queue;
use tracing::{error, info, warn};

/// Runs the `run` command: schedule cycles until a shutdown signal.
pub async fn run_daemon(config: ProducerConfig) -> Result<(), ProducerError> {
    init_tracing(&config.log_level, config.json_logs);

    info!(
        run_frequency = ?config.run_frequency,
        execution_timeout = ?config.execution_timeout,
        move_category_after = ?config.move_category_after,
        "starting category update producer"
    );

    let (store, publisher) = connect_adapters(&config).await?;

    let runner = CycleRunner::new(
        store.clone(),
        publisher.clone(),
        CycleSettings::from(&config),
    );
    let scheduler = Arc::new(Scheduler::new(runner, config.run_frequency));

    let cancel = install_signal_handler()?;

    let handle = tokio::spawn({
        let scheduler = scheduler.clone();
        async move { scheduler.start().await }
    });

    cancel.cancelled().await;
    scheduler.request_shutdown();
    handle
        .await
        .map_err(|e| ProducerError::Internal(format!("scheduler task failed: {e}")))?;

    shutdown_adapters(store.as_ref(), publisher.as_ref()).await;

    info!("category update producer shutdown complete");
    Ok(())
}

/// Runs the `once` command: a single cycle, then exit.
///
/// Fails when the ready set could not be fetched so operators and scripts
/// see a non-zero exit status.
pub async fn run_single_cycle(config: ProducerConfig) -> Result<(), ProducerError> {
    init_tracing(&config.log_level, config.json_logs);

    let (store, publisher) = connect_adapters(&config).await?;
    let runner = CycleRunner::new(
        store.clone(),
        publisher.clone(),
        CycleSettings::from(&config),
    );

    let report = runner.run_once().await;

    match queue::count(store.database()).await {
        Ok(remaining) => info!(
            fetched = report.fetched,
            published = report.published,
            skipped = report.skipped,
            failed = report.failed,
            remaining,
            elapsed = ?report.elapsed,
            "single cycle finished"
        ),
        Err(e) => warn!(error = %e, "failed to count remaining queue entries"),
    }

    shutdown_adapters(store.as_ref(), publisher.as_ref()).await;

    if report.aborted {
        return Err(ProducerError::Internal(
            "cycle aborted: ready set could not be fetched".to_string(),
        ));
    }
    Ok(())
}

/// Runs the `check-config` command: print the effective configuration.
pub fn print_config(config: &ProducerConfig) -> Result<(), ProducerError> {
    let rendered = toml::to_string_pretty(config)
        .map_err(|e| ProducerError::Config(format!("failed to render config: {e}")))?;
    println!("{rendered}");
    eprintln!("configuration is valid");
    Ok(())
}

async fn connect_adapters(
    config: &ProducerConfig,
) -> Result<(Arc<SqliteStore>, Arc<KafkaPublisher>), ProducerError> {
    info!("connecting to database");
    let connect_timeout = config.database.connect_timeout;
    let store = tokio::time::timeout(connect_timeout, SqliteStore::open(&config.database.uri))
        .await
        .map_err(|_| ProducerError::Timeout {
            duration: connect_timeout,
        })?
        .inspect_err(|e| error!(error = %e, "failed to open database"))?
        .with_claim(config.execution_timeout);
    info!(path = %store.database().path(), "database connected");

    let publisher = KafkaPublisher::connect(&config.kafka)
        .await
        .inspect_err(|e| error!(error = %e, "failed to create kafka producer"))?;
    info!(
        brokers = %config.kafka.bootstrap_servers(),
        topic = %config.kafka.topic,
        "kafka producer created"
    );

    Ok((Arc::new(store), Arc::new(publisher)))
}

async fn shutdown_adapters(store: &dyn Adapter, publisher: &dyn Adapter) {
    for adapter in [publisher, store] {
        if let Err(e) = adapter.shutdown().await {
            warn!(adapter = adapter.name(), error = %e, "adapter shutdown failed");
        }
    }
}

/// Filter directive used when `RUST_LOG` is not set. The `catmove` target
/// prefix also matches every `catmove_*` crate.
fn default_filter(log_level: &str) -> String {
    format!("catmove={log_level},warn")
}

fn init_tracing(log_level: &str, json: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(log_level)));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
