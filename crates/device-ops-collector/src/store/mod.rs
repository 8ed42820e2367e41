// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Document store abstraction.
//!
//! A store holds named collections of JSON documents. Raw operation records are appended to a
//! collection named after the device, statistics live in one shared collection and are only ever
//! changed through [`DocumentStore::upsert`], which must increment atomically on the store side.
//!
//! # Implementations
//!
//! - [`MemoryStore`]: in-process, used by default and in tests
//! - [`SqliteStore`]: durable, backed by a SQLite database file

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::StoreError;

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// A stored document. Keys are kept sorted, so equal documents serialize identically.
pub type Document = serde_json::Map<String, Value>;

/// Field name to signed delta.
pub type Increments = BTreeMap<String, i64>;

#[async_trait]
pub trait DocumentStore {
    /// Appends `document` to `collection`.
    async fn insert_record(&self, collection: &str, document: Document) -> Result<(), StoreError>;

    /// Atomically adds `increments` to the document of `collection` matching `filter`.
    ///
    /// When no document matches, one is created from `filter` and `create_fields` with every
    /// incremented field starting from zero.
    async fn upsert(
        &self,
        collection: &str,
        filter: Document,
        increments: Increments,
        create_fields: Document,
    ) -> Result<(), StoreError>;

    /// Every document of `collection`, in insertion order.
    async fn find_records(&self, collection: &str) -> Result<Vec<Document>, StoreError>;

    /// First document of `collection` whose fields match every entry of `filter`.
    async fn find_one(
        &self,
        collection: &str,
        filter: &Document,
    ) -> Result<Option<Document>, StoreError>;
}

pub(crate) fn matches_filter(document: &Document, filter: &Document) -> bool {
    filter
        .iter()
        .all(|(field, value)| document.get(field) == Some(value))
}

/// Document created by an upsert that matched nothing.
pub(crate) fn new_upserted_document(filter: &Document, create_fields: Document) -> Document {
    let mut document = filter.clone();
    document.extend(create_fields);
    document
}

pub(crate) fn apply_increments(
    document: &mut Document,
    increments: &Increments,
) -> Result<(), StoreError> {
    for (field, delta) in increments {
        let current = match document.get(field) {
            None => 0,
            Some(value) => value.as_i64().ok_or_else(|| StoreError::InvalidCounter {
                field: field.clone(),
            })?,
        };
        let updated = current
            .checked_add(*delta)
            .ok_or_else(|| StoreError::CounterOverflow {
                field: field.clone(),
            })?;
        document.insert(field.clone(), Value::from(updated));
    }
    Ok(())
}
