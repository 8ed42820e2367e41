// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params, Connection, TransactionBehavior};

use super::{
    apply_increments, matches_filter, new_upserted_document, Document, DocumentStore, Increments,
};
use crate::error::StoreError;

/// SQLite-backed document store.
///
/// Every document is a JSON text row tagged with its collection:
///
/// ```sql
/// CREATE TABLE documents (
///     id INTEGER PRIMARY KEY AUTOINCREMENT,
///     collection TEXT NOT NULL,
///     document TEXT NOT NULL
/// );
/// CREATE INDEX idx_documents_collection ON documents(collection);
/// ```
///
/// Upserts run inside an `IMMEDIATE` transaction, so the read-increment-write sequence holds the
/// database write lock for its whole duration, including against other processes sharing the file.
/// Calls run on the blocking thread pool since `Connection` is synchronous.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Opens (or creates) the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|e| {
            StoreError::Unavailable(format!(
                "failed to open SQLite database at {}: {e}",
                path.display()
            ))
        })?;
        Self::with_schema(conn)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::with_schema(Connection::open_in_memory()?)
    }

    fn with_schema(conn: Connection) -> Result<Self, StoreError> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS documents (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                collection TEXT NOT NULL,
                document TEXT NOT NULL
            )",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_documents_collection ON documents(collection)",
            [],
        )?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    async fn with_connection<F, T>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut Connection) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn
                .lock()
                .map_err(|e| StoreError::Unavailable(format!("SQLite connection poisoned: {e}")))?;
            f(&mut guard)
        })
        .await
        .map_err(|e| StoreError::Task(e.to_string()))?
    }
}

fn load_collection(
    conn: &Connection,
    collection: &str,
) -> Result<Vec<(i64, Document)>, StoreError> {
    let mut stmt =
        conn.prepare("SELECT id, document FROM documents WHERE collection = ?1 ORDER BY id ASC")?;
    let rows = stmt
        .query_map([collection], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    rows.into_iter()
        .map(|(id, text)| Ok((id, serde_json::from_str::<Document>(&text)?)))
        .collect()
}

#[async_trait]
impl DocumentStore for SqliteStore {
    async fn insert_record(&self, collection: &str, document: Document) -> Result<(), StoreError> {
        let collection = collection.to_string();
        let text = serde_json::to_string(&document)?;
        self.with_connection(move |conn| {
            conn.execute(
                "INSERT INTO documents (collection, document) VALUES (?1, ?2)",
                params![collection, text],
            )?;
            Ok(())
        })
        .await
    }

    async fn upsert(
        &self,
        collection: &str,
        filter: Document,
        increments: Increments,
        create_fields: Document,
    ) -> Result<(), StoreError> {
        let collection = collection.to_string();
        self.with_connection(move |conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            let existing = load_collection(&tx, &collection)?
                .into_iter()
                .find(|(_, doc)| matches_filter(doc, &filter));

            match existing {
                Some((id, mut document)) => {
                    apply_increments(&mut document, &increments)?;
                    tx.execute(
                        "UPDATE documents SET document = ?1 WHERE id = ?2",
                        params![serde_json::to_string(&document)?, id],
                    )?;
                }
                None => {
                    let mut document = new_upserted_document(&filter, create_fields);
                    apply_increments(&mut document, &increments)?;
                    tx.execute(
                        "INSERT INTO documents (collection, document) VALUES (?1, ?2)",
                        params![collection, serde_json::to_string(&document)?],
                    )?;
                }
            }

            tx.commit()?;
            Ok(())
        })
        .await
    }

    async fn find_records(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        let collection = collection.to_string();
        self.with_connection(move |conn| {
            Ok(load_collection(conn, &collection)?
                .into_iter()
                .map(|(_, doc)| doc)
                .collect())
        })
        .await
    }

    async fn find_one(
        &self,
        collection: &str,
        filter: &Document,
    ) -> Result<Option<Document>, StoreError> {
        let collection = collection.to_string();
        let filter = filter.clone();
        self.with_connection(move |conn| {
            Ok(load_collection(conn, &collection)?
                .into_iter()
                .map(|(_, doc)| doc)
                .find(|doc| matches_filter(doc, &filter)))
        })
        .await
    }
}
