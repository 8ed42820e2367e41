// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Request and acknowledgement types of the batch call.
//!
//! Request body format:
//! {
//!     "devices": [
//!         {"deviceName": "sensor1", "operations": [{"type": "CREATE", "hasSucceeded": true}]}
//!     ]
//! }
//!
//! A successful call is acknowledged with an empty object: `{}`.

use serde::{Deserialize, Serialize};

use crate::record::{null_as_empty, Batch, DeviceRecord, Operation};

/// Path of the batch call on the collector.
pub const BATCH_ENDPOINT_PATH: &str = "/v1/device-ops/batch";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireOperation {
    #[serde(rename = "type")]
    pub kind: String,
    pub has_succeeded: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireDevice {
    pub device_name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub operations: Vec<WireOperation>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireRequest {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub devices: Vec<WireDevice>,
}

/// Empty acknowledgement returned for a persisted batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireAck {}

/// Maps a record to its wire form, keeping every operation in order.
pub fn to_wire(record: &DeviceRecord) -> WireDevice {
    WireDevice {
        device_name: record.device_name.clone(),
        operations: record
            .operations
            .iter()
            .map(|op| WireOperation {
                kind: op.kind.clone(),
                has_succeeded: op.has_succeeded,
            })
            .collect(),
    }
}

/// Rebuilds the batch carried by a request, keeping device and operation order.
pub fn from_wire(request: WireRequest) -> Batch {
    let devices = request
        .devices
        .into_iter()
        .map(|device| DeviceRecord {
            device_name: device.device_name,
            operations: device
                .operations
                .into_iter()
                .map(|op| Operation {
                    kind: op.kind,
                    has_succeeded: op.has_succeeded,
                })
                .collect(),
        })
        .collect();
    Batch { devices }
}

impl WireRequest {
    pub fn from_records(records: &[DeviceRecord]) -> Self {
        Self {
            devices: records.iter().map(to_wire).collect(),
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}

impl Batch {
    pub fn to_wire(&self) -> WireRequest {
        WireRequest::from_records(&self.devices)
    }
}
