// SPDX-FileCopyrightText: 2026 Catmove Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the configuration system.

use std::time::Duration;

use catmove_config::diagnostic::ConfigError;
use catmove_config::model::ProducerConfig;
use catmove_config::{load_and_validate_str, load_config_from_str};

const COMPLETE: &str = r#"
execution_timeout = "2m"
run_frequency = "1m"
move_category_after = "30s"
log_level = "debug"
json_logs = true

[database]
uri = "sqlite:///var/lib/catmove/tickets.db"
connect_timeout = "5s"

[kafka]
brokers = ["kafka-0:9092", "kafka-1:9092"]
topic = "tickets.status-updates"
client_id = "producer-test"
delivery_timeout = "3s"
"#;

/// A file setting every key deserializes into the expected values.
#[test]
fn complete_toml_deserializes() {
    let config = load_config_from_str(COMPLETE).expect("valid TOML should deserialize");

    assert_eq!(config.execution_timeout, Duration::from_secs(120));
    assert_eq!(config.run_frequency, Duration::from_secs(60));
    assert_eq!(config.move_category_after, Duration::from_secs(30));
    assert_eq!(config.log_level, "debug");
    assert!(config.json_logs);
    assert_eq!(config.database.uri, "sqlite:///var/lib/catmove/tickets.db");
    assert_eq!(config.database.connect_timeout, Duration::from_secs(5));
    assert_eq!(config.kafka.brokers, vec!["kafka-0:9092", "kafka-1:9092"]);
    assert_eq!(config.kafka.topic, "tickets.status-updates");
    assert_eq!(config.kafka.client_id, "producer-test");
    assert_eq!(config.kafka.delivery_timeout, Duration::from_secs(3));
}

/// Timing keys fall back to the documented defaults.
#[test]
fn empty_toml_uses_defaults() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");

    assert_eq!(config.execution_timeout, Duration::from_secs(5 * 60));
    assert_eq!(config.run_frequency, Duration::from_secs(10 * 60));
    assert_eq!(config.move_category_after, Duration::from_secs(10 * 60));
    assert_eq!(config.log_level, "info");
    assert!(!config.json_logs);
    assert_eq!(config.database.connect_timeout, Duration::from_secs(15));
    assert_eq!(config.kafka.client_id, "category-update-producer");
    assert!(config.kafka.brokers.is_empty());
}

/// Empty TOML parses but fails validation on the three required keys.
#[test]
fn required_keys_enforced() {
    let errors = load_and_validate_str("").expect_err("required keys are missing");
    assert_eq!(errors.len(), 3);
    assert!(
        errors
            .iter()
            .all(|e| matches!(e, ConfigError::MissingKey { .. }))
    );
}

/// A comma-separated broker string, as delivered by `KAFKA_BROKERS`, is split.
#[test]
fn comma_separated_brokers_split() {
    use figment::{Figment, providers::Serialized};

    let config: ProducerConfig = Figment::new()
        .merge(Serialized::defaults(ProducerConfig::default()))
        .merge(("kafka.brokers", "kafka-0:9092, kafka-1:9092,,"))
        .extract()
        .expect("comma separated brokers should parse");

    assert_eq!(config.kafka.brokers, vec!["kafka-0:9092", "kafka-1:9092"]);
}

/// The environment layer overrides values from TOML.
#[test]
fn env_overrides_file_values() {
    figment::Jail::expect_with(|jail| {
        jail.create_file("catmove.toml", COMPLETE)?;
        jail.set_env("EXECUTION_TIMEOUT", "45s");
        jail.set_env("KAFKA_TOPIC", "from-env");
        jail.set_env("KAFKA_BROKERS", "a:9092,b:9092");

        let config = catmove_config::load_config_from_path(std::path::Path::new("catmove.toml"))?;

        assert_eq!(config.execution_timeout, Duration::from_secs(45));
        assert_eq!(config.kafka.topic, "from-env");
        assert_eq!(config.kafka.brokers, vec!["a:9092", "b:9092"]);
        assert_eq!(config.run_frequency, Duration::from_secs(60));
        Ok(())
    });
}

/// Misspelled key in a section is rejected with a suggestion.
#[test]
fn unknown_key_suggests_correction() {
    let toml = r#"
[database]
uri = "tickets.db"

[kafka]
brokers = ["localhost:9092"]
topik = "updates"
"#;

    let errors = load_and_validate_str(toml).expect_err("unknown key should be rejected");
    match &errors[0] {
        ConfigError::UnknownKey {
            key, suggestion, ..
        } => {
            assert_eq!(key, "topik");
            assert_eq!(suggestion.as_deref(), Some("topic"));
        }
        other => panic!("expected UnknownKey, got {other:?}"),
    }
}

/// Unparsable durations are reported instead of defaulting.
#[test]
fn invalid_duration_rejected() {
    let err = load_config_from_str("run_frequency = \"every so often\"")
        .expect_err("bad duration should fail");
    assert!(format!("{err}").contains("run_frequency") || format!("{err}").contains("invalid"));
}

/// Missing config files are silently skipped.
#[test]
fn missing_config_file_skipped() {
    let config = catmove_config::load_config_from_path(std::path::Path::new(
        "/nonexistent/catmove.toml",
    ))
    .expect("missing file should be skipped");
    assert_eq!(config.run_frequency, Duration::from_secs(10 * 60));
}

/// Absurd durations are rejected at load time rather than overflowing later.
#[test]
fn out_of_range_duration_from_env_rejected() {
    figment::Jail::expect_with(|jail| {
        jail.create_file("catmove.toml", COMPLETE)?;
        jail.set_env("MOVE_CATEGORY_AFTER", "300000y");

        let errors = catmove_config::load_and_validate_path(std::path::Path::new("catmove.toml"))
            .expect_err("a 300000 year threshold should be rejected");
        assert!(matches!(
            &errors[0],
            ConfigError::Validation { message } if message.contains("move_category_after")
        ));
        Ok(())
    });
}
