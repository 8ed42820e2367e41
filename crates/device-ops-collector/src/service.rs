// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use device_ops_model::{Batch, WireAck};
use tracing::debug;

use crate::error::PersistError;
use crate::persistence::PersistenceCoordinator;

/// The remote call served by the collector.
#[async_trait]
pub trait DeviceOpsService {
    /// Persists every record of `batch` and acknowledges once the store writes are done.
    async fn send_batch(&self, batch: Batch) -> Result<WireAck, PersistError>;
}

#[derive(Clone)]
pub struct Collector {
    persistence: PersistenceCoordinator,
}

impl Collector {
    pub fn new(persistence: PersistenceCoordinator) -> Self {
        Self { persistence }
    }
}

#[async_trait]
impl DeviceOpsService for Collector {
    async fn send_batch(&self, batch: Batch) -> Result<WireAck, PersistError> {
        debug!(
            "Received batch with {} device records and {} operations",
            batch.len(),
            batch.operation_count()
        );
        self.persistence.persist(&batch).await?;
        Ok(WireAck::default())
    }
}
