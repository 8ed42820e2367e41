// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;
use std::time::Duration;

use device_ops_model::ModelError;

/// A blob could not be turned into device records.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("Blob {index} is empty")]
    Empty { index: usize },

    #[error("Blob {index} is not a valid device log: {source}")]
    Malformed {
        index: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Blob {index} holds an invalid device record: {source}")]
    Invalid {
        index: usize,
        #[source]
        source: ModelError,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: DecodeError,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Failed to connect to the collector: {0}")]
    Connect(#[source] reqwest::Error),

    #[error("Call to the collector timed out after {0:?}")]
    Timeout(Duration),

    #[error("Request to the collector failed: {0}")]
    Request(#[source] reqwest::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("Failed to encode batch: {0}")]
    Encode(#[from] serde_json::Error),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Collector rejected the batch with status {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("Invalid response from the collector: {0}")]
    InvalidResponse(String),
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
