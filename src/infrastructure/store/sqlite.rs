use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::query_as;
use tokio::sync::watch;
use uuid::Uuid;

use crate::domain::errors::StoreError;
use crate::domain::ids::UserId;
use crate::domain::store::{Document, DocumentStore, LiveQuery};

use super::spawn_live_query;

const SCHEMA: &str = r"
    CREATE TABLE IF NOT EXISTS documents (
        collection TEXT NOT NULL,
        key TEXT NOT NULL,
        uid TEXT,
        payload TEXT NOT NULL,
        PRIMARY KEY (collection, key)
    )";

/// Durable document store on SQLite: one table of (collection, key, uid,
/// payload) rows, with the payload's `uid` lifted into a column so
/// user-scoped queries stay indexed.
#[derive(Clone)]
pub struct SqliteDocumentStore {
    pool: SqlitePool,
    revision: Arc<watch::Sender<u64>>,
}

impl SqliteDocumentStore {
    /// Connect and create the schema if missing. Accepts `sqlite::memory:`
    /// or `sqlite://path` URLs.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|err| StoreError::unexpected(err.to_string()))?
            .create_if_missing(true);

        // In-memory SQLite databases are per-connection; a single
        // connection keeps them coherent, and file databases serialize
        // writes anyway.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|err| StoreError::unexpected(err.to_string()))?;

        sqlx::query(SCHEMA)
            .execute(&pool)
            .await
            .map_err(|err| StoreError::unexpected(err.to_string()))?;

        let (revision, _) = watch::channel(0);
        Ok(Self {
            pool,
            revision: Arc::new(revision),
        })
    }

    fn bump(&self) {
        self.revision.send_modify(|revision| *revision += 1);
    }

    fn to_document(record: DocumentRecord) -> Result<Document, StoreError> {
        let data = serde_json::from_str(&record.payload)
            .map_err(|err| StoreError::unexpected(format!("corrupt document payload: {err}")))?;
        Ok(Document {
            key: record.key,
            data,
        })
    }
}

#[async_trait]
impl DocumentStore for SqliteDocumentStore {
    async fn exists(&self, collection: &str, key: &str) -> Result<bool, StoreError> {
        let row: Option<(i64,)> =
            query_as("SELECT 1 FROM documents WHERE collection = ? AND key = ?")
                .bind(collection)
                .bind(key)
                .fetch_optional(&self.pool)
                .await
                .map_err(|err| StoreError::unexpected(err.to_string()))?;
        Ok(row.is_some())
    }

    async fn get(&self, collection: &str, key: &str) -> Result<Option<Document>, StoreError> {
        let record: Option<DocumentRecord> =
            query_as("SELECT key, payload FROM documents WHERE collection = ? AND key = ?")
                .bind(collection)
                .bind(key)
                .fetch_optional(&self.pool)
                .await
                .map_err(|err| StoreError::unexpected(err.to_string()))?;

        record.map(Self::to_document).transpose()
    }

    async fn write(&self, collection: &str, key: &str, payload: Value) -> Result<(), StoreError> {
        let uid = payload
            .get("uid")
            .and_then(Value::as_str)
            .map(ToString::to_string);
        let body = payload.to_string();

        sqlx::query(
            r"INSERT INTO documents (collection, key, uid, payload) VALUES (?, ?, ?, ?)
              ON CONFLICT (collection, key) DO UPDATE SET uid = excluded.uid, payload = excluded.payload",
        )
        .bind(collection)
        .bind(key)
        .bind(uid)
        .bind(body)
        .execute(&self.pool)
        .await
        .map_err(|err| StoreError::unexpected(err.to_string()))?;

        self.bump();
        Ok(())
    }

    async fn delete(&self, collection: &str, key: &str) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = ? AND key = ?")
            .bind(collection)
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(|err| StoreError::unexpected(err.to_string()))?;

        if result.rows_affected() > 0 {
            self.bump();
        }
        Ok(())
    }

    async fn add(&self, collection: &str, payload: Value) -> Result<String, StoreError> {
        let key = Uuid::new_v4().to_string();
        self.write(collection, &key, payload).await?;
        Ok(key)
    }

    async fn query_by_user(
        &self,
        collection: &str,
        uid: &UserId,
    ) -> Result<Vec<Document>, StoreError> {
        let records: Vec<DocumentRecord> = query_as(
            "SELECT key, payload FROM documents WHERE collection = ? AND uid = ? ORDER BY key",
        )
        .bind(collection)
        .bind(uid.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|err| StoreError::unexpected(err.to_string()))?;

        records.into_iter().map(Self::to_document).collect()
    }

    async fn list(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        let records: Vec<DocumentRecord> =
            query_as("SELECT key, payload FROM documents WHERE collection = ? ORDER BY key")
                .bind(collection)
                .fetch_all(&self.pool)
                .await
                .map_err(|err| StoreError::unexpected(err.to_string()))?;

        records.into_iter().map(Self::to_document).collect()
    }

    fn watch_by_user(&self, collection: &str, uid: &UserId) -> LiveQuery {
        spawn_live_query(
            self.clone(),
            self.revision.subscribe(),
            collection.to_string(),
            uid.clone(),
        )
    }
}

#[derive(sqlx::FromRow)]
struct DocumentRecord {
    key: String,
    payload: String,
}
