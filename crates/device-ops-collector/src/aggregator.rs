// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeMap;

use device_ops_model::{Batch, DeviceRecord};
use serde::Serialize;

use crate::store::Increments;

pub const TOTAL_FIELD: &str = "total";
pub const SUCCESSFUL_FIELD: &str = "successful";
pub const FAILED_FIELD: &str = "failed";

/// Operation counters of one device, computed from a single batch.
///
/// `total_ops` is always `success_ops + failed_ops`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeviceStatistics {
    pub device_name: String,
    pub total_ops: i64,
    pub success_ops: i64,
    pub failed_ops: i64,
}

impl DeviceStatistics {
    pub fn empty(device_name: impl Into<String>) -> Self {
        Self {
            device_name: device_name.into(),
            ..Default::default()
        }
    }

    pub fn from_record(record: &DeviceRecord) -> Self {
        let mut stats = Self::empty(record.device_name.as_str());
        stats.add_record(record);
        stats
    }

    fn add_record(&mut self, record: &DeviceRecord) {
        for operation in &record.operations {
            if operation.has_succeeded {
                self.success_ops += 1;
            } else {
                self.failed_ops += 1;
            }
            self.total_ops += 1;
        }
    }

    /// Adds the counters of `other` to this entry.
    pub fn merge(&mut self, other: &DeviceStatistics) {
        self.total_ops += other.total_ops;
        self.success_ops += other.success_ops;
        self.failed_ops += other.failed_ops;
    }

    /// Increment instructions applied to the stored statistics document.
    pub fn increments(&self) -> Increments {
        Increments::from([
            (TOTAL_FIELD.to_string(), self.total_ops),
            (SUCCESSFUL_FIELD.to_string(), self.success_ops),
            (FAILED_FIELD.to_string(), self.failed_ops),
        ])
    }
}

/// Accumulates device records into per-device statistics keyed by device name.
#[derive(Debug, Default)]
pub struct StatsAggregator {
    stats: BTreeMap<String, DeviceStatistics>,
}

impl StatsAggregator {
    /// Records sharing a device name accumulate into the same entry.
    pub fn insert(&mut self, record: &DeviceRecord) {
        self.stats
            .entry(record.device_name.clone())
            .or_insert_with(|| DeviceStatistics::empty(record.device_name.as_str()))
            .add_record(record);
    }

    pub fn get(&self, device_name: &str) -> Option<&DeviceStatistics> {
        self.stats.get(device_name)
    }

    pub fn len(&self) -> usize {
        self.stats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }

    pub fn into_stats(self) -> BTreeMap<String, DeviceStatistics> {
        self.stats
    }
}

/// Computes the batch-local statistics of every device in `batch`.
pub fn aggregate(batch: &Batch) -> BTreeMap<String, DeviceStatistics> {
    let mut aggregator = StatsAggregator::default();
    for record in &batch.devices {
        aggregator.insert(record);
    }
    aggregator.into_stats()
}
