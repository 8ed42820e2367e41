// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Mock implementations of collector components for testing

use std::sync::Mutex;

use async_trait::async_trait;
use device_ops_collector::error::{PersistError, StoreError};
use device_ops_collector::service::DeviceOpsService;
use device_ops_collector::store::{Document, DocumentStore, Increments};
use device_ops_model::{Batch, WireAck};

/// Store that refuses every call, as if the database were unreachable
pub struct UnreachableStore;

#[async_trait]
impl DocumentStore for UnreachableStore {
    async fn insert_record(
        &self,
        _collection: &str,
        _document: Document,
    ) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn upsert(
        &self,
        _collection: &str,
        _filter: Document,
        _increments: Increments,
        _create_fields: Document,
    ) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn find_records(&self, _collection: &str) -> Result<Vec<Document>, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn find_one(
        &self,
        _collection: &str,
        _filter: &Document,
    ) -> Result<Option<Document>, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }
}

/// Service that keeps every received batch and acknowledges it
#[derive(Default)]
#[allow(dead_code)]
pub struct RecordingService {
    pub batches: Mutex<Vec<Batch>>,
}

#[async_trait]
impl DeviceOpsService for RecordingService {
    async fn send_batch(&self, batch: Batch) -> Result<WireAck, PersistError> {
        self.batches.lock().expect("lock poisoned").push(batch);
        Ok(WireAck::default())
    }
}
