// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use super::{
    apply_increments, matches_filter, new_upserted_document, Document, DocumentStore, Increments,
};
use crate::error::StoreError;

/// In-process document store.
///
/// Upserts read and write the matching document under a single lock, which makes every increment
/// atomic with respect to concurrent calls.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: Mutex<HashMap<String, Vec<Document>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of every collection holding at least one document.
    pub fn collection_names(&self) -> Result<Vec<String>, StoreError> {
        let collections = self.lock()?;
        let mut names: Vec<String> = collections
            .iter()
            .filter(|(_, docs)| !docs.is_empty())
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        Ok(names)
    }

    /// Total number of documents across every collection.
    pub fn document_count(&self) -> Result<usize, StoreError> {
        Ok(self.lock()?.values().map(Vec::len).sum())
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, Vec<Document>>>, StoreError> {
        self.collections
            .lock()
            .map_err(|e| StoreError::Unavailable(format!("memory store lock poisoned: {e}")))
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert_record(&self, collection: &str, document: Document) -> Result<(), StoreError> {
        self.lock()?
            .entry(collection.to_string())
            .or_default()
            .push(document);
        Ok(())
    }

    async fn upsert(
        &self,
        collection: &str,
        filter: Document,
        increments: Increments,
        create_fields: Document,
    ) -> Result<(), StoreError> {
        let mut collections = self.lock()?;
        let documents = collections.entry(collection.to_string()).or_default();

        match documents.iter().position(|doc| matches_filter(doc, &filter)) {
            Some(index) => {
                // work on a copy so a failed increment leaves the stored document untouched
                let mut updated = documents[index].clone();
                apply_increments(&mut updated, &increments)?;
                documents[index] = updated;
            }
            None => {
                let mut created = new_upserted_document(&filter, create_fields);
                apply_increments(&mut created, &increments)?;
                documents.push(created);
            }
        }
        Ok(())
    }

    async fn find_records(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        Ok(self.lock()?.get(collection).cloned().unwrap_or_default())
    }

    async fn find_one(
        &self,
        collection: &str,
        filter: &Document,
    ) -> Result<Option<Document>, StoreError> {
        Ok(self.lock()?.get(collection).and_then(|documents| {
            documents
                .iter()
                .find(|doc| matches_filter(doc, filter))
                .cloned()
        }))
    }
}
