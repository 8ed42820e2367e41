// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

/// Errors raised by a document store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Document serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store task failed: {0}")]
    Task(String),

    #[error("Field '{field}' is not an integer counter")]
    InvalidCounter { field: String },

    #[error("Counter '{field}' overflowed")]
    CounterOverflow { field: String },
}

/// A store write failed while persisting a batch. Earlier writes of the batch are kept.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("Failed to insert operation record for device '{device}': {source}")]
    RawInsert {
        device: String,
        #[source]
        source: StoreError,
    },

    #[error("Failed to update statistics for device '{device}': {source}")]
    Upsert {
        device: String,
        #[source]
        source: StoreError,
    },

    /// Nothing of the batch was written.
    #[error("Device name '{device}' is reserved for the statistics collection")]
    ReservedDeviceName { device: String },
}

impl PersistError {
    pub fn device(&self) -> &str {
        match self {
            PersistError::RawInsert { device, .. }
            | PersistError::Upsert { device, .. }
            | PersistError::ReservedDeviceName { device } => device,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl From<device_ops_model::env::EnvError> for ConfigError {
    fn from(error: device_ops_model::env::EnvError) -> Self {
        ConfigError::Invalid(error.to_string())
    }
}
