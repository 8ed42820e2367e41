// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Turns device log files into device records.
//!
//! Every blob holds a JSON array of device records:
//!
//! ```json
//! [
//!     {"device_name": "sensor1", "operations": [{"type": "CREATE", "has_succeeded": true}]},
//!     {"device_name": "sensor2", "operations": []}
//! ]
//! ```
//!
//! Loading stops at the first blob that fails to decode and nothing decoded so far is returned.

use std::path::Path;

use device_ops_model::{Batch, DeviceRecord};
use tracing::debug;

use crate::error::{DecodeError, IngestError};
use crate::file_source::FileSource;

/// Decodes every blob, keeping blob order then record order.
pub fn load<B: AsRef<[u8]>>(blobs: &[B]) -> Result<Vec<DeviceRecord>, DecodeError> {
    let mut records = Vec::new();
    for (index, blob) in blobs.iter().enumerate() {
        records.extend(decode_blob(index, blob.as_ref())?);
    }
    Ok(records)
}

fn decode_blob(index: usize, blob: &[u8]) -> Result<Vec<DeviceRecord>, DecodeError> {
    if blob.iter().all(u8::is_ascii_whitespace) {
        return Err(DecodeError::Empty { index });
    }
    let records: Vec<DeviceRecord> = serde_json::from_slice(blob)
        .map_err(|source| DecodeError::Malformed { index, source })?;

    let batch = Batch::from(records);
    batch
        .validate()
        .map_err(|source| DecodeError::Invalid { index, source })?;
    Ok(batch.devices)
}

/// Reads every file beneath `root` in path order and decodes it.
pub fn load_dir(source: &dyn FileSource, root: &Path) -> Result<Vec<DeviceRecord>, IngestError> {
    let mut paths = source.list_files(root)?;
    paths.sort();

    let mut records = Vec::new();
    for (index, path) in paths.iter().enumerate() {
        let blob = source.read(path)?;
        let decoded = decode_blob(index, &blob).map_err(|source| IngestError::Decode {
            path: path.clone(),
            source,
        })?;
        debug!(
            "Loaded {} device records from {}",
            decoded.len(),
            path.display()
        );
        records.extend(decoded);
    }
    Ok(records)
}
