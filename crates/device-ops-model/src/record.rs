// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! In-memory model of a device and the operations it performed.
//!
//! The serde layout of these types is the on-disk log format read by the producer:
//!
//! ```json
//! [{"device_name": "sensor1", "operations": [{"type": "CREATE", "has_succeeded": true}]}]
//! ```

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ModelError;

/// A single operation performed by a device.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Operation {
    #[serde(rename = "type")]
    pub kind: String,
    pub has_succeeded: bool,
}

impl Operation {
    pub fn new(kind: impl Into<String>, has_succeeded: bool) -> Self {
        Self {
            kind: kind.into(),
            has_succeeded,
        }
    }

    pub fn state(&self) -> OperationState {
        if self.has_succeeded {
            OperationState::Success
        } else {
            OperationState::Failed
        }
    }
}

/// Outcome of an operation, as recorded in the raw operation documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationState {
    Success,
    Failed,
}

impl OperationState {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationState::Success => "SUCCESS",
            OperationState::Failed => "FAILED",
        }
    }
}

impl std::fmt::Display for OperationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A device name plus its operations, in the order they were logged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRecord {
    pub device_name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub operations: Vec<Operation>,
}

impl DeviceRecord {
    pub fn new(device_name: impl Into<String>, operations: Vec<Operation>) -> Self {
        Self {
            device_name: device_name.into(),
            operations,
        }
    }
}

/// Every device record shipped in one remote call.
///
/// Order is kept as received and records sharing a device name stay separate entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Batch {
    pub devices: Vec<DeviceRecord>,
}

impl Batch {
    pub fn new(devices: Vec<DeviceRecord>) -> Self {
        Self { devices }
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    /// Total number of operations across every record of the batch.
    pub fn operation_count(&self) -> usize {
        self.devices.iter().map(|d| d.operations.len()).sum()
    }

    /// Rejects records whose device name cannot be used as a collection key.
    pub fn validate(&self) -> Result<(), ModelError> {
        match self.devices.iter().position(|d| d.device_name.is_empty()) {
            Some(index) => Err(ModelError::EmptyDeviceName { index }),
            None => Ok(()),
        }
    }
}

impl From<Vec<DeviceRecord>> for Batch {
    fn from(devices: Vec<DeviceRecord>) -> Self {
        Self { devices }
    }
}

/// Decodes a missing or `null` sequence as an empty one.
pub(crate) fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
