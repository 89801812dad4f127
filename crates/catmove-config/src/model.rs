// SPDX-FileCopyrightText: 2026 Catmove Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs.
//!
//! All structs use `#[serde(deny_unknown_fields)]` so a misspelled key fails
//! startup instead of silently falling back to a default. Durations are
//! written in humantime form (`90s`, `5m`, `1h 30m`).

use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize};

/// Top-level producer configuration.
///
/// Loaded from compiled defaults, optional TOML files and environment
/// variables. `database.uri`, `kafka.brokers` and `kafka.topic` have no
/// usable default and are checked by validation.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProducerConfig {
    /// Hard deadline for a single reconciliation cycle.
    #[serde(default = "default_execution_timeout", with = "humantime_serde")]
    pub execution_timeout: Duration,

    /// Interval between cycle starts.
    #[serde(default = "default_run_frequency", with = "humantime_serde")]
    pub run_frequency: Duration,

    /// How long an entry must sit in the queue before it is ready.
    #[serde(default = "default_move_category_after", with = "humantime_serde")]
    pub move_category_after: Duration,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Emit logs as JSON lines instead of the human-readable format.
    #[serde(default)]
    pub json_logs: bool,

    /// Ticket store settings.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Message bus settings.
    #[serde(default)]
    pub kafka: KafkaConfig,
}

impl Default for ProducerConfig {
    fn default() -> Self {
        Self {
            execution_timeout: default_execution_timeout(),
            run_frequency: default_run_frequency(),
            move_category_after: default_move_category_after(),
            log_level: default_log_level(),
            json_logs: false,
            database: DatabaseConfig::default(),
            kafka: KafkaConfig::default(),
        }
    }
}

fn default_execution_timeout() -> Duration {
    Duration::from_secs(5 * 60)
}

fn default_run_frequency() -> Duration {
    Duration::from_secs(10 * 60)
}

fn default_move_category_after() -> Duration {
    Duration::from_secs(10 * 60)
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Ticket store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Database location: a file path, `sqlite://<path>` or `:memory:`.
    #[serde(default)]
    pub uri: String,

    /// Upper bound on opening the database at startup.
    #[serde(default = "default_connect_timeout", with = "humantime_serde")]
    pub connect_timeout: Duration,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            uri: String::new(),
            connect_timeout: default_connect_timeout(),
        }
    }
}

fn default_connect_timeout() -> Duration {
    Duration::from_secs(15)
}

/// Kafka producer configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct KafkaConfig {
    /// Bootstrap broker addresses. Accepts a list or a comma-separated string.
    #[serde(default, deserialize_with = "deserialize_brokers")]
    pub brokers: Vec<String>,

    /// Topic receiving ticket status updates.
    #[serde(default)]
    pub topic: String,

    /// Client identifier reported to the brokers.
    #[serde(default = "default_client_id")]
    pub client_id: String,

    /// How long a single publish may wait for its delivery report.
    #[serde(default = "default_delivery_timeout", with = "humantime_serde")]
    pub delivery_timeout: Duration,
}

impl Default for KafkaConfig {
    fn default() -> Self {
        Self {
            brokers: Vec::new(),
            topic: String::new(),
            client_id: default_client_id(),
            delivery_timeout: default_delivery_timeout(),
        }
    }
}

impl KafkaConfig {
    /// Broker list in the comma-separated form librdkafka expects.
    pub fn bootstrap_servers(&self) -> String {
        self.brokers.join(",")
    }
}

fn default_client_id() -> String {
    "category-update-producer".to_string()
}

fn default_delivery_timeout() -> Duration {
    Duration::from_secs(5)
}

/// `KAFKA_BROKERS=a:9092,b:9092` arrives as one string; TOML files use arrays.
fn deserialize_brokers<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Brokers {
        List(Vec<String>),
        Csv(String),
    }

    let brokers = match Brokers::deserialize(deserializer)? {
        Brokers::List(list) => list,
        Brokers::Csv(csv) => csv.split(',').map(str::to_string).collect(),
    };

    Ok(brokers
        .into_iter()
        .map(|b| b.trim().to_string())
        .filter(|b| !b.is_empty())
        .collect())
}
