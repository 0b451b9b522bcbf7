pub mod sqlite;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::dispatch::Outcome;
use crate::request::CalculationRequest;

/// One persisted calculation: the validated request plus its outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculationRecord {
    pub id: i64,
    pub category: String,
    pub request: CalculationRequest,
    pub value: f64,
    pub succeeded: bool,
    pub created_at: String,
}

/// Where finished calculations go. Could be SQLite, a remote store, etc.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn save(&self, request: &CalculationRequest, outcome: &Outcome) -> Result<i64>;
    /// The most recent records, oldest first.
    async fn recent(&self, limit: usize) -> Result<Vec<CalculationRecord>>;
    async fn clear(&self) -> Result<()>;
}
