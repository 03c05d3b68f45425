use async_trait::async_trait;
use futures::stream;
use rusqlite::{Connection, OptionalExtension, params, params_from_iter};
use std::sync::{Mutex, MutexGuard};

use super::{Document, DocumentStore, DocumentStream, Filter, StoreError};

/// SQLite-backed document store. Bodies are stored as JSON.
///
/// Scans yield documents in insertion order. Replacing a document keeps its
/// original position.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create the store at `path`. Use `":memory:"` for tests.
    pub fn open(path: &str) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS documents (
                partition_key TEXT NOT NULL,
                id            TEXT NOT NULL,
                body          TEXT NOT NULL,
                PRIMARY KEY (partition_key, id)
            )",
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn in_memory() -> Result<Self, StoreError> {
        Self::open(":memory:")
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }
}

/// Decode a stored body and check it belongs under the key it was stored at.
fn decode(id: String, body: &str) -> Result<Document, StoreError> {
    let doc: Document =
        serde_json::from_str(body).map_err(|source| StoreError::Malformed {
            id: id.clone(),
            source,
        })?;
    if doc.id() != id {
        return Err(StoreError::KeyMismatch {
            key: id,
            found: doc.id().to_string(),
        });
    }
    Ok(doc)
}

#[async_trait]
impl DocumentStore for SqliteStore {
    async fn read(&self, id: &str, partition_key: &str) -> Result<Document, StoreError> {
        let conn = self.conn()?;
        let body: Option<String> = conn
            .query_row(
                "SELECT body FROM documents WHERE partition_key = ?1 AND id = ?2",
                params![partition_key, id],
                |row| row.get(0),
            )
            .optional()?;
        match body {
            Some(body) => decode(id.to_string(), &body),
            None => Err(StoreError::NotFound(id.to_string())),
        }
    }

    async fn create(&self, doc: &Document) -> Result<(), StoreError> {
        let body = serde_json::to_string(doc)?;
        let conn = self.conn()?;
        let inserted = conn.execute(
            "INSERT INTO documents (partition_key, id, body) VALUES (?1, ?2, ?3)
             ON CONFLICT(partition_key, id) DO NOTHING",
            params![doc.partition_key(), doc.id(), body],
        )?;
        if inserted == 0 {
            return Err(StoreError::AlreadyExists(doc.id().to_string()));
        }
        Ok(())
    }

    async fn replace(&self, doc: &Document) -> Result<(), StoreError> {
        let body = serde_json::to_string(doc)?;
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE documents SET body = ?3 WHERE partition_key = ?1 AND id = ?2",
            params![doc.partition_key(), doc.id(), body],
        )?;
        if updated == 0 {
            return Err(StoreError::NotFound(doc.id().to_string()));
        }
        Ok(())
    }

    async fn upsert(&self, doc: &Document) -> Result<(), StoreError> {
        let body = serde_json::to_string(doc)?;
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO documents (partition_key, id, body) VALUES (?1, ?2, ?3)
             ON CONFLICT(partition_key, id) DO UPDATE SET body = excluded.body",
            params![doc.partition_key(), doc.id(), body],
        )?;
        Ok(())
    }

    async fn scan(
        &self,
        filter: &Filter,
        cross_partition: bool,
    ) -> Result<DocumentStream, StoreError> {
        if !cross_partition && filter.partition().is_none() {
            return Err(StoreError::CrossPartitionRequired);
        }

        let (clause, values) = filter.to_sql();
        let sql = format!("SELECT id, body FROM documents WHERE {clause} ORDER BY rowid ASC");

        let rows = {
            let conn = self.conn()?;
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(params_from_iter(values.iter()), |row| {
                    Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
                })?
                .collect::<Result<Vec<_>, _>>()?;
            rows
        };

        // Bodies are decoded as the stream is consumed.
        let docs = rows.into_iter().map(|(id, body)| decode(id, &body));
        Ok(Box::pin(stream::iter(docs)))
    }
}
