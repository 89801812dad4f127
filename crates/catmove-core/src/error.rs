// SPDX-FileCopyrightText: 2026 Catmove Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the category update producer.

use thiserror::Error;

/// The error type shared by every collaborator trait and the reconciliation cycle.
#[derive(Debug, Error)]
pub enum ProducerError {
    /// Configuration errors (missing required keys, unparsable values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (connection, query failure, row decoding).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Message bus errors (producer creation, delivery failure, metadata fetch).
    #[error("bus error: {message}")]
    Bus {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// An outbound event could not be encoded.
    #[error("failed to serialize event: {source}")]
    Serialization { source: serde_json::Error },

    /// The operation did not finish before the cycle deadline.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ProducerError {
    /// Returns true if a later cycle may succeed where this one failed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ProducerError::Storage { .. } | ProducerError::Bus { .. } | ProducerError::Timeout { .. }
        )
    }
}
