//! Prediction Store
//!
//! This module provides the optional SQLite-backed store for prediction
//! records, including connection management, schema creation, and the
//! insert/list operations the predictor service uses. Records are
//! document-shaped: the caller's raw request JSON plus the computed
//! estimate. The internal row id and timestamp are never exposed.

use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use chrono::Utc;
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

/// One persisted prediction: the raw submitted input and the estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    /// Raw request body as submitted by the caller
    pub input: serde_json::Value,
    /// Model output for that input
    pub carbon_footprint: f64,
}

/// SQLite-backed store for prediction records.
pub struct PredictionStore {
    /// Database connection
    connection: Arc<Mutex<Connection>>,
    /// Database path
    db_path: String,
}

impl PredictionStore {
    /// Open (or create) the store and ensure its schema exists.
    pub fn open<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let path = db_path.as_ref().to_string_lossy().to_string();

        info!("Opening prediction store at: {path}");

        let conn = Connection::open(&path)
            .map_err(|e| anyhow::anyhow!("Failed to open prediction store: {e}"))?;

        conn.busy_timeout(std::time::Duration::from_secs(30))
            .map_err(|e| anyhow::anyhow!("Failed to set busy timeout: {e}"))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS predictions (
                id TEXT PRIMARY KEY,
                input TEXT NOT NULL,
                carbon_footprint REAL NOT NULL,
                created_at TEXT NOT NULL
            );",
            [],
        )
        .map_err(|e| anyhow::anyhow!("Failed to create predictions table: {e}"))?;

        Ok(Self {
            connection: Arc::new(Mutex::new(conn)),
            db_path: path,
        })
    }

    /// Get database path
    pub fn database_path(&self) -> &str {
        &self.db_path
    }

    /// Persist one prediction record.
    pub async fn insert_prediction(&self, record: &PredictionRecord) -> Result<()> {
        let id = Uuid::new_v4().to_string();
        debug!("Persisting prediction record: {id}");

        let input_json = serde_json::to_string(&record.input)
            .map_err(|e| anyhow::anyhow!("Failed to serialize prediction input: {e}"))?;

        let conn = self
            .connection
            .lock()
            .map_err(|e| anyhow::anyhow!("Failed to acquire connection lock: {e}"))?;

        conn.execute(
            "INSERT INTO predictions (id, input, carbon_footprint, created_at)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                id,
                input_json,
                record.carbon_footprint,
                Utc::now().to_rfc3339()
            ],
        )
        .map_err(|e| anyhow::anyhow!("Failed to insert prediction record: {e}"))?;

        drop(conn);

        debug!("Prediction record persisted: {id}");
        Ok(())
    }

    /// List every prediction record in insertion order, internal columns
    /// stripped.
    pub async fn list_predictions(&self) -> Result<Vec<PredictionRecord>> {
        debug!("Listing prediction records");

        let conn = self
            .connection
            .lock()
            .map_err(|e| anyhow::anyhow!("Failed to acquire connection lock: {e}"))?;

        let mut stmt = conn
            .prepare("SELECT input, carbon_footprint FROM predictions ORDER BY rowid ASC;")
            .map_err(|e| anyhow::anyhow!("Failed to prepare statement: {e}"))?;

        let records: Vec<PredictionRecord> = stmt
            .query_map([], |row| {
                let input_json: String = row.get(0)?;
                let input = serde_json::from_str(&input_json)
                    .unwrap_or(serde_json::Value::Null);

                Ok(PredictionRecord {
                    input,
                    carbon_footprint: row.get(1)?,
                })
            })
            .map_err(|e| anyhow::anyhow!("Failed to query prediction records: {e}"))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| anyhow::anyhow!("Failed to collect prediction records: {e}"))?;

        drop(stmt);
        drop(conn);

        debug!("Found {} prediction records", records.len());
        Ok(records)
    }

    /// Number of persisted records.
    pub async fn count_predictions(&self) -> Result<i64> {
        let conn = self
            .connection
            .lock()
            .map_err(|e| anyhow::anyhow!("Failed to acquire connection lock: {e}"))?;

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM predictions;", [], |row| row.get(0))
            .map_err(|e| anyhow::anyhow!("Failed to count prediction records: {e}"))?;

        drop(conn);
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_store_creation() {
        let temp_file = NamedTempFile::new().unwrap();
        let store = PredictionStore::open(temp_file.path()).unwrap();

        assert_eq!(store.count_predictions().await.unwrap(), 0);
        assert_eq!(
            store.database_path(),
            temp_file.path().to_string_lossy().as_ref()
        );
    }

    #[tokio::test]
    async fn test_open_is_idempotent() {
        let temp_file = NamedTempFile::new().unwrap();
        let store = PredictionStore::open(temp_file.path()).unwrap();

        let record = PredictionRecord {
            input: json!({"carKmWeek": 100}),
            carbon_footprint: 1234.5,
        };
        store.insert_prediction(&record).await.unwrap();
        drop(store);

        // Reopening must keep existing records and not recreate the table.
        let reopened = PredictionStore::open(temp_file.path()).unwrap();
        assert_eq!(reopened.count_predictions().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_insert_and_list_roundtrip() {
        let temp_file = NamedTempFile::new().unwrap();
        let store = PredictionStore::open(temp_file.path()).unwrap();

        let first = PredictionRecord {
            input: json!({"carKmWeek": 100, "flightHours": 2, "note": "extra field kept"}),
            carbon_footprint: 1820.25,
        };
        let second = PredictionRecord {
            input: json!({"bikeKmWeek": 40}),
            carbon_footprint: 310.0,
        };

        store.insert_prediction(&first).await.unwrap();
        store.insert_prediction(&second).await.unwrap();

        let records = store.list_predictions().await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0], first);
        assert_eq!(records[1], second);
    }

    #[tokio::test]
    async fn test_list_preserves_insertion_order() {
        let temp_file = NamedTempFile::new().unwrap();
        let store = PredictionStore::open(temp_file.path()).unwrap();

        for i in 0..5 {
            store
                .insert_prediction(&PredictionRecord {
                    input: json!({ "carKmWeek": i }),
                    carbon_footprint: i as f64,
                })
                .await
                .unwrap();
        }

        let records = store.list_predictions().await.unwrap();
        let footprints: Vec<f64> = records.iter().map(|r| r.carbon_footprint).collect();
        assert_eq!(footprints, vec![0.0, 1.0, 2.0, 3.0, 4.0]);
    }

    #[tokio::test]
    async fn test_records_carry_no_internal_fields() {
        let temp_file = NamedTempFile::new().unwrap();
        let store = PredictionStore::open(temp_file.path()).unwrap();

        store
            .insert_prediction(&PredictionRecord {
                input: json!({"gasUsage": 20}),
                carbon_footprint: 99.0,
            })
            .await
            .unwrap();

        let records = store.list_predictions().await.unwrap();
        let value = serde_json::to_value(&records[0]).unwrap();
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["carbon_footprint", "input"]);
    }
}
