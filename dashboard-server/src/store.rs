//! Record Store - incident documents in PostgreSQL
//!
//! Each incident is one JSONB document in the `<collection>` table.
//! A `RecordStore` owns a single connection for the duration of one
//! load or ingest and is closed explicitly afterwards.

use serde_json::Value;
use sqlx::{types::Json, Connection, PgConnection, Postgres, QueryBuilder};

use crime_core::logic::dataset::{CrimeFrame, CrimeRecord};

use crate::config::Config;

/// Rows per INSERT statement
const INSERT_BATCH_SIZE: usize = 1000;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("invalid collection name `{0}`")]
    InvalidCollection(String),

    #[error(transparent)]
    Database(#[from] sqlx::Error),

    #[error("failed to encode document: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Why the dashboard has no data
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    #[error("invalid collection name `{0}`; check CRIME_COLLECTION")]
    InvalidCollection(String),

    #[error("cannot connect to the record store: {0}")]
    Connect(String),

    #[error("failed to query the record store: {0}")]
    Query(String),

    #[error("record store returned malformed records: {0}")]
    Malformed(String),

    #[error("record store is empty")]
    Empty,
}

/// Only plain identifiers may name a table
fn check_collection(name: &str) -> Result<(), StoreError> {
    let valid = !name.is_empty()
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !name.starts_with(|c: char| c.is_ascii_digit());

    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidCollection(name.to_string()))
    }
}

pub struct RecordStore {
    conn: PgConnection,
    collection: String,
}

impl RecordStore {
    pub async fn open(database_url: &str, collection: &str) -> Result<Self, StoreError> {
        check_collection(collection)?;
        let conn = PgConnection::connect(database_url).await?;
        Ok(Self { conn, collection: collection.to_string() })
    }

    pub async fn ensure_schema(&mut self) -> Result<(), StoreError> {
        let sql = format!(
            "CREATE TABLE IF NOT EXISTS {} (
                id BIGSERIAL PRIMARY KEY,
                doc JSONB NOT NULL,
                created_at TIMESTAMPTZ DEFAULT NOW()
            )",
            self.collection
        );
        sqlx::query(&sql).execute(&mut self.conn).await?;

        tracing::info!("Collection `{}` ready", self.collection);
        Ok(())
    }

    /// Every document, in insertion order, with the row id as `_id`
    pub async fn fetch_all(&mut self) -> Result<Vec<Value>, StoreError> {
        let sql = format!(
            "SELECT doc || jsonb_build_object('_id', id) FROM {} ORDER BY id",
            self.collection
        );
        let docs = sqlx::query_scalar::<_, Value>(&sql)
            .fetch_all(&mut self.conn)
            .await?;
        Ok(docs)
    }

    /// Insert all records in one transaction
    pub async fn insert_many(&mut self, records: &[CrimeRecord]) -> Result<u64, StoreError> {
        let docs = records
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()?;

        let mut tx = self.conn.begin().await?;
        let mut inserted = 0;

        for chunk in docs.chunks(INSERT_BATCH_SIZE) {
            let mut builder: QueryBuilder<Postgres> =
                QueryBuilder::new(format!("INSERT INTO {} (doc) ", self.collection));
            builder.push_values(chunk, |mut row, doc| {
                row.push_bind(Json(doc.clone()));
            });
            inserted += builder.build().execute(&mut *tx).await?.rows_affected();
        }

        tx.commit().await?;
        tracing::info!("Inserted {} documents into `{}`", inserted, self.collection);
        Ok(inserted)
    }

    pub async fn close(self) -> Result<(), StoreError> {
        self.conn.close().await?;
        Ok(())
    }
}

/// open → query → close. The connection never outlives the load.
pub async fn load_dataset(config: &Config) -> Result<CrimeFrame, LoadError> {
    let mut store = RecordStore::open(&config.database_url, &config.collection)
        .await
        .map_err(|e| match e {
            StoreError::InvalidCollection(name) => LoadError::InvalidCollection(name),
            other => LoadError::Connect(other.to_string()),
        })?;

    let fetched = store.fetch_all().await;

    if let Err(e) = store.close().await {
        tracing::warn!("Failed to close record store connection: {}", e);
    }

    let docs = fetched.map_err(|e| LoadError::Query(e.to_string()))?;
    if docs.is_empty() {
        return Err(LoadError::Empty);
    }

    let frame = CrimeFrame::from_documents(docs).map_err(|e| LoadError::Malformed(e.to_string()))?;
    tracing::info!("Loaded {} incident records from `{}`", frame.len(), config.collection);
    Ok(frame)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_names() {
        assert!(check_collection("crimes").is_ok());
        assert!(check_collection("crimes_2018").is_ok());
        assert!(check_collection("").is_err());
        assert!(check_collection("1crimes").is_err());
        assert!(check_collection("crimes; DROP TABLE x").is_err());
    }

    fn config(database_url: &str, collection: &str) -> Config {
        Config {
            database_url: database_url.to_string(),
            collection: collection.to_string(),
            model_path: "models/crime_model.json".to_string(),
            port: 0,
            environment: "test".to_string(),
            admin_token: None,
        }
    }

    #[tokio::test]
    async fn test_unreachable_store_is_connect_error() {
        let err = load_dataset(&config("not-a-url", "crimes")).await.unwrap_err();
        assert!(matches!(err, LoadError::Connect(_)));
    }

    #[tokio::test]
    async fn test_bad_collection_is_not_a_connect_error() {
        let err = load_dataset(&config("not-a-url", "crimes; DROP TABLE x")).await.unwrap_err();
        assert_eq!(err, LoadError::InvalidCollection("crimes; DROP TABLE x".to_string()));
        assert!(err.to_string().contains("CRIME_COLLECTION"));
    }
}
