// SPDX-FileCopyrightText: 2026 Catmove Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.

use std::time::Duration;

use crate::diagnostic::ConfigError;
use crate::model::ProducerConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Upper bound for every duration setting. Keeps deadline and timestamp
/// arithmetic far inside the range of the clock types.
pub const MAX_DURATION: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Validate a deserialized configuration.
///
/// Collects every problem instead of stopping at the first one.
pub fn validate_config(config: &ProducerConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.database.uri.trim().is_empty() {
        errors.push(ConfigError::missing("database.uri"));
    }

    if config.kafka.brokers.is_empty() {
        errors.push(ConfigError::missing("kafka.brokers"));
    }

    if config.kafka.topic.trim().is_empty() {
        errors.push(ConfigError::missing("kafka.topic"));
    }

    for (key, value) in [
        ("execution_timeout", config.execution_timeout),
        ("run_frequency", config.run_frequency),
        ("database.connect_timeout", config.database.connect_timeout),
        ("kafka.delivery_timeout", config.kafka.delivery_timeout),
    ] {
        if value == Duration::ZERO {
            errors.push(ConfigError::Validation {
                message: format!("{key} must be greater than zero"),
            });
        }
    }

    for (key, value) in [
        ("execution_timeout", config.execution_timeout),
        ("run_frequency", config.run_frequency),
        ("move_category_after", config.move_category_after),
        ("database.connect_timeout", config.database.connect_timeout),
        ("kafka.delivery_timeout", config.kafka.delivery_timeout),
    ] {
        if value > MAX_DURATION {
            errors.push(ConfigError::Validation {
                message: format!("{key} must not exceed 365 days"),
            });
        }
    }

    if !LOG_LEVELS.contains(&config.log_level.to_lowercase().as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "log_level `{}` is not one of {}",
                config.log_level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
