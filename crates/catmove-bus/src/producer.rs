// SPDX-FileCopyrightText: 2026 Catmove Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Kafka event producer.

use std::time::Duration;

use async_trait::async_trait;
use catmove_config::KafkaConfig;
use catmove_core::{
    Adapter, AdapterType, EventPublisher, HealthStatus, ProducerError, TicketStatusUpdate,
};
use rdkafka::config::ClientConfig;
use rdkafka::error::KafkaError;
use rdkafka::producer::{FutureProducer, FutureRecord, Producer};
use tracing::{debug, instrument, warn};

/// How long startup and health checks wait for cluster metadata.
const METADATA_TIMEOUT: Duration = Duration::from_secs(10);

/// How long shutdown waits for in-flight messages to drain.
const FLUSH_TIMEOUT: Duration = Duration::from_secs(10);

/// Publishes [`TicketStatusUpdate`] events to Kafka.
pub struct KafkaPublisher {
    producer: FutureProducer,
    bootstrap_servers: String,
    topic: String,
    delivery_timeout: Duration,
}

impl KafkaPublisher {
    /// Create a producer. librdkafka connects lazily, so this does not touch
    /// the network; use [`KafkaPublisher::connect`] to fail fast at startup.
    pub fn new(config: &KafkaConfig) -> Result<Self, ProducerError> {
        let bootstrap_servers = config.bootstrap_servers();
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", &bootstrap_servers)
            .set("client.id", &config.client_id)
            .set(
                "message.timeout.ms",
                config.delivery_timeout.as_millis().to_string(),
            )
            .set("acks", "all")
            .create()
            .map_err(|e| bus_error(format!("failed to create producer for {bootstrap_servers}"), e))?;

        debug!(
            bootstrap_servers = %bootstrap_servers,
            client_id = %config.client_id,
            "kafka producer configured"
        );

        Ok(Self {
            producer,
            bootstrap_servers,
            topic: config.topic.clone(),
            delivery_timeout: config.delivery_timeout,
        })
    }

    /// Create a producer and verify the cluster is usable.
    ///
    /// An unhealthy cluster fails startup. A degraded one is logged and
    /// accepted.
    pub async fn connect(config: &KafkaConfig) -> Result<Self, ProducerError> {
        let publisher = Self::new(config)?;
        match publisher.health_check().await? {
            HealthStatus::Healthy => {}
            HealthStatus::Degraded(reason) => {
                warn!(%reason, "kafka cluster is degraded");
            }
            HealthStatus::Unhealthy(reason) => {
                return Err(ProducerError::Bus {
                    message: format!(
                        "kafka cluster at {} is unusable: {reason}",
                        publisher.bootstrap_servers
                    ),
                    source: None,
                });
            }
        }
        Ok(publisher)
    }
}

/// Judge cluster metadata. No brokers means nothing can be delivered; a
/// missing topic may still be created on first write.
fn metadata_health(brokers: usize, topic_known: bool, topic: &str) -> HealthStatus {
    if brokers == 0 {
        HealthStatus::Unhealthy("cluster reported no brokers".into())
    } else if !topic_known {
        HealthStatus::Degraded(format!("topic {topic} not found in cluster metadata"))
    } else {
        HealthStatus::Healthy
    }
}

/// JSON body of a status update.
pub fn encode_event(event: &TicketStatusUpdate) -> Result<Vec<u8>, ProducerError> {
    serde_json::to_vec(event).map_err(|source| ProducerError::Serialization { source })
}

fn bus_error(message: String, err: KafkaError) -> ProducerError {
    ProducerError::Bus {
        message,
        source: Some(Box::new(err)),
    }
}

#[async_trait]
impl Adapter for KafkaPublisher {
    fn name(&self) -> &str {
        "kafka"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Publisher
    }

    /// Fetches cluster metadata on a blocking thread.
    async fn health_check(&self) -> Result<HealthStatus, ProducerError> {
        let producer = self.producer.clone();
        let topic = self.topic.clone();
        let metadata = tokio::task::spawn_blocking(move || {
            producer
                .client()
                .fetch_metadata(None, METADATA_TIMEOUT)
                .map(|m| {
                    let topic_known = m.topics().iter().any(|t| t.name() == topic);
                    (m.brokers().len(), m.topics().len(), topic_known)
                })
        })
        .await
        .map_err(|e| ProducerError::Internal(format!("metadata task failed: {e}")))?;

        let (brokers, topics, topic_known) = metadata.map_err(|e| {
            bus_error(
                format!("failed to fetch metadata from {}", self.bootstrap_servers),
                e,
            )
        })?;

        debug!(brokers, topics, topic_known, "kafka metadata fetched");
        Ok(metadata_health(brokers, topic_known, &self.topic))
    }

    async fn shutdown(&self) -> Result<(), ProducerError> {
        let producer = self.producer.clone();
        tokio::task::spawn_blocking(move || producer.flush(FLUSH_TIMEOUT))
            .await
            .map_err(|e| ProducerError::Internal(format!("flush task failed: {e}")))?
            .map_err(|e| bus_error("failed to flush pending messages".into(), e))?;
        debug!("kafka producer flushed");
        Ok(())
    }
}

#[async_trait]
impl EventPublisher for KafkaPublisher {
    #[instrument(skip(self, event), fields(
        guild_id = event.ticket.guild_id,
        ticket_id = event.ticket.id
    ))]
    async fn publish(&self, topic: &str, event: &TicketStatusUpdate) -> Result<(), ProducerError> {
        let key = event.ticket.guild_id.to_string();
        let payload = encode_event(event)?;

        debug!(topic, payload_size = payload.len(), "publishing status update");

        let record = FutureRecord::to(topic).key(&key).payload(&payload);
        let (partition, offset) = self
            .producer
            .send(record, self.delivery_timeout)
            .await
            .map_err(|(err, _)| bus_error(format!("failed to publish to topic {topic}"), err))?;

        debug!(partition, offset, "status update delivered");
        Ok(())
    }
}
