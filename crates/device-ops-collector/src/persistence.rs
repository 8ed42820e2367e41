// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashMap;
use std::sync::Arc;

use device_ops_model::{Batch, Operation};
use serde_json::Value;
use tracing::{debug, error};

use crate::aggregator::{self, DeviceStatistics};
use crate::error::PersistError;
use crate::store::{Document, DocumentStore};

pub const DEFAULT_STATS_COLLECTION: &str = "StatByDevice";

const NAME_FIELD: &str = "name";
const DEVICE_FIELD: &str = "device";
const TYPE_FIELD: &str = "type";
const STATE_FIELD: &str = "state";

/// Writes a batch to the document store.
///
/// Every operation becomes a raw document in the collection named after its device. Each device
/// name then gets one statistics upsert, issued right after the last record carrying that name.
/// A failed write stops the batch and earlier writes stay in place.
#[derive(Clone)]
pub struct PersistenceCoordinator {
    store: Arc<dyn DocumentStore + Send + Sync>,
    stats_collection: String,
}

impl PersistenceCoordinator {
    pub fn new(
        store: Arc<dyn DocumentStore + Send + Sync>,
        stats_collection: impl Into<String>,
    ) -> Self {
        Self {
            store,
            stats_collection: stats_collection.into(),
        }
    }

    pub fn stats_collection(&self) -> &str {
        &self.stats_collection
    }

    pub async fn persist(&self, batch: &Batch) -> Result<(), PersistError> {
        // raw records of such a device would land among the statistics documents
        if let Some(record) = batch
            .devices
            .iter()
            .find(|record| record.device_name == self.stats_collection)
        {
            error!(
                "Rejecting batch, device name {} is the statistics collection",
                record.device_name
            );
            return Err(PersistError::ReservedDeviceName {
                device: record.device_name.clone(),
            });
        }

        let stats = aggregator::aggregate(batch);

        let mut last_index: HashMap<&str, usize> = HashMap::new();
        for (index, record) in batch.devices.iter().enumerate() {
            last_index.insert(record.device_name.as_str(), index);
        }

        for (index, record) in batch.devices.iter().enumerate() {
            let device = record.device_name.as_str();
            for operation in &record.operations {
                self.store
                    .insert_record(device, raw_document(operation))
                    .await
                    .map_err(|source| {
                        error!("Failed to insert operation record for device {device}: {source}");
                        PersistError::RawInsert {
                            device: device.to_string(),
                            source,
                        }
                    })?;
            }

            if last_index.get(device) == Some(&index) {
                if let Some(device_stats) = stats.get(device) {
                    self.upsert_stats(device_stats).await?;
                }
            }
        }

        debug!(
            "Persisted {} device records with {} operations",
            batch.len(),
            batch.operation_count()
        );
        Ok(())
    }

    async fn upsert_stats(&self, stats: &DeviceStatistics) -> Result<(), PersistError> {
        let device = stats.device_name.as_str();
        let mut filter = Document::new();
        filter.insert(NAME_FIELD.to_string(), Value::from(device));
        let mut create_fields = Document::new();
        create_fields.insert(DEVICE_FIELD.to_string(), Value::from(device));

        self.store
            .upsert(
                &self.stats_collection,
                filter,
                stats.increments(),
                create_fields,
            )
            .await
            .map_err(|source| {
                error!("Failed to update statistics for device {device}: {source}");
                PersistError::Upsert {
                    device: device.to_string(),
                    source,
                }
            })?;

        debug!(
            "Updated statistics for device {device}: total +{}, successful +{}, failed +{}",
            stats.total_ops, stats.success_ops, stats.failed_ops
        );
        Ok(())
    }
}

fn raw_document(operation: &Operation) -> Document {
    let mut document = Document::new();
    document.insert(TYPE_FIELD.to_string(), Value::from(operation.kind.as_str()));
    document.insert(
        STATE_FIELD.to_string(),
        Value::from(operation.state().as_str()),
    );
    document
}
