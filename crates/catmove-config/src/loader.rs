// SPDX-FileCopyrightText: 2026 Catmove Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Lookup order: `/etc/catmove/catmove.toml`, `~/.config/catmove/catmove.toml`,
//! `./catmove.toml`, then the deployment environment variables
//! (`EXECUTION_TIMEOUT`, `DATABASE_URI`, `KAFKA_BROKERS`, ...).

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::ProducerConfig;

/// Environment variables recognised by the loader, unprefixed.
pub const ENV_KEYS: &[&str] = &[
    "EXECUTION_TIMEOUT",
    "RUN_FREQUENCY",
    "MOVE_CATEGORY_AFTER",
    "LOG_LEVEL",
    "JSON_LOGS",
    "DATABASE_URI",
    "DATABASE_CONNECT_TIMEOUT",
    "KAFKA_BROKERS",
    "KAFKA_TOPIC",
    "KAFKA_CLIENT_ID",
    "KAFKA_DELIVERY_TIMEOUT",
];

/// Load configuration from the standard file hierarchy with env overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/catmove/catmove.toml`
/// 3. `~/.config/catmove/catmove.toml`
/// 4. `./catmove.toml`
/// 5. Environment variables listed in [`ENV_KEYS`]
pub fn load_config() -> Result<ProducerConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no files, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<ProducerConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ProducerConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from one explicit file, still honouring env overrides.
pub fn load_config_from_path(path: &Path) -> Result<ProducerConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ProducerConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for the default lookup, before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(ProducerConfig::default()))
        .merge(Toml::file("/etc/catmove/catmove.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("catmove/catmove.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("catmove.toml"))
        .merge(env_provider())
}

/// Map the flat deployment variables onto config paths.
///
/// Uses an explicit `map()` rather than `split("_")`: `KAFKA_CLIENT_ID` must
/// become `kafka.client_id`, and `EXECUTION_TIMEOUT` stays top-level.
fn env_provider() -> Env {
    Env::raw().only(ENV_KEYS).map(|key| {
        key.as_str()
            .replacen("database_", "database.", 1)
            .replacen("kafka_", "kafka.", 1)
            .into()
    })
}
