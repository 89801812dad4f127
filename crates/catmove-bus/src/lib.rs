// SPDX-FileCopyrightText: 2026 Catmove Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Kafka publisher for ticket status updates.
//!
//! A thin adapter over rdkafka's `FutureProducer`: events are encoded as
//! JSON, keyed by guild id and produced synchronously (the call returns once
//! the broker acknowledges or the delivery timeout expires).

pub mod producer;

pub use producer::{KafkaPublisher, encode_event};
