use anyhow::{Context, Result};
use async_trait::async_trait;
use rusqlite::Connection;
use std::sync::Mutex;

use super::{CalculationRecord, RecordStore};
use crate::dispatch::Outcome;
use crate::request::CalculationRequest;

/// SQLite-backed calculation history. The request is stored as JSON text so
/// the schema survives new categories without a migration.
pub struct SqliteRecords {
    conn: Mutex<Connection>,
}

impl SqliteRecords {
    /// Open or create the history table in the given database.
    /// Use `":memory:"` for tests.
    pub fn new(path: &str) -> Result<Self> {
        let conn = Connection::open(path).context("failed to open records database")?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS calculations (
                id         INTEGER PRIMARY KEY AUTOINCREMENT,
                created_at TEXT NOT NULL DEFAULT (datetime('now')),
                category   TEXT NOT NULL,
                request    TEXT NOT NULL,
                value      REAL NOT NULL,
                succeeded  INTEGER NOT NULL
            )",
        )
        .context("failed to create calculations table")?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn in_memory() -> Result<Self> {
        Self::new(":memory:")
    }
}

#[async_trait]
impl RecordStore for SqliteRecords {
    async fn save(&self, request: &CalculationRequest, outcome: &Outcome) -> Result<i64> {
        let json = serde_json::to_string(request)?;
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO calculations (category, request, value, succeeded)
             VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![
                request.category().tag(),
                json,
                outcome.value,
                outcome.succeeded,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    async fn recent(&self, limit: usize) -> Result<Vec<CalculationRecord>> {
        let conn = self.conn.lock().unwrap();
        // Last `limit` rows, returned in chronological order.
        let mut stmt = conn.prepare(
            "SELECT id, created_at, category, request, value, succeeded FROM (
                SELECT id, created_at, category, request, value, succeeded
                FROM calculations ORDER BY id DESC LIMIT ?1
            ) ORDER BY id ASC",
        )?;
        let rows = stmt
            .query_map([limit as i64], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, f64>(4)?,
                    row.get::<_, bool>(5)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(id, created_at, category, json, value, succeeded)| {
                let request = serde_json::from_str(&json)
                    .with_context(|| format!("corrupt request JSON in record {id}"))?;
                Ok(CalculationRecord {
                    id,
                    category,
                    request,
                    value,
                    succeeded,
                    created_at,
                })
            })
            .collect()
    }

    async fn clear(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM calculations", [])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::ArithmeticOp;

    fn addition(inputs: Vec<f64>) -> CalculationRequest {
        CalculationRequest::Arithmetic {
            op: ArithmeticOp::Addition,
            inputs,
        }
    }

    #[tokio::test]
    async fn save_and_recent_round_trip() {
        let store = SqliteRecords::in_memory().unwrap();
        let request = addition(vec![10.5, 3.0, 2.0]);

        let id = store.save(&request, &Outcome::of(15.5)).await.unwrap();
        assert!(id > 0);

        let records = store.recent(10).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].category, "arithmetic");
        assert_eq!(records[0].request, request);
        assert_eq!(records[0].value, 15.5);
        assert!(records[0].succeeded);
    }

    #[tokio::test]
    async fn failed_outcome_keeps_sentinel_and_flag() {
        let store = SqliteRecords::in_memory().unwrap();
        let request = CalculationRequest::Wacc(crate::request::WaccTerms {
            equity: 100.0,
            debt: 100.0,
            cost_of_equity: 0.10,
            cost_of_debt: 0.0,
            tax_rate: 0.0,
        });
        let outcome = Outcome {
            value: 0.0,
            succeeded: false,
            detail: Some("engine binary not found".to_string()),
        };

        store.save(&request, &outcome).await.unwrap();

        let records = store.recent(1).await.unwrap();
        assert_eq!(records[0].value, 0.0);
        assert!(!records[0].succeeded);
    }

    #[tokio::test]
    async fn recent_limits_and_orders_chronologically() {
        let store = SqliteRecords::in_memory().unwrap();
        for i in 0..5 {
            let request = addition(vec![i as f64, 1.0]);
            store
                .save(&request, &Outcome::of(i as f64 + 1.0))
                .await
                .unwrap();
        }

        let records = store.recent(3).await.unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].value, 3.0);
        assert_eq!(records[2].value, 5.0);
    }

    #[tokio::test]
    async fn clear_empties_history() {
        let store = SqliteRecords::in_memory().unwrap();
        store
            .save(&addition(vec![1.0, 2.0]), &Outcome::of(3.0))
            .await
            .unwrap();
        store.clear().await.unwrap();
        assert!(store.recent(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn persists_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records-test.db");
        let path_str = path.to_str().unwrap();

        {
            let store = SqliteRecords::new(path_str).unwrap();
            store
                .save(&addition(vec![2.0, 2.0]), &Outcome::of(4.0))
                .await
                .unwrap();
        }

        {
            let store = SqliteRecords::new(path_str).unwrap();
            let records = store.recent(10).await.unwrap();
            assert_eq!(records.len(), 1);
            assert_eq!(records[0].value, 4.0);
        }
    }
}
