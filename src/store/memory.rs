//! Implements the `Store` trait using in-memory data.
//!
//! Note: this is compiled even in the "production" version of this app so that we can run the whole
//! app, top-to-bottom, without touching the disk. Tests use its fault injection and its gate to
//! exercise failing and late-resolving store operations.

use crate::model::{month_key, Amount, Category, Transaction, TransactionPayload, TransactionType};
use crate::store::{Store, StoreError, StoreResult, NOT_FOUND};
use crate::Result;
use anyhow::Context;
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::VecDeque;
use std::io::Cursor;
use std::sync::Arc;
use tokio::sync::{Mutex, Semaphore};
use tracing::trace;

/// An implementation of the `Store` trait that holds its documents in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: Mutex<Vec<Transaction>>,
    /// Faults to return, in order, from the next operations.
    failures: Mutex<VecDeque<StoreError>>,
    /// Ids to hand out, in order, before falling back to random ones.
    ids: Mutex<VecDeque<String>>,
    gate: Option<StoreGate>,
}

impl MemoryStore {
    /// Create a new `MemoryStore` holding `data`.
    pub fn new(data: Vec<Transaction>) -> Self {
        Self {
            data: Mutex::new(data),
            ..Self::default()
        }
    }

    /// Create a `MemoryStore` seeded with a month of sample transactions dated in `month`.
    pub fn seeded(month: NaiveDate) -> Result<Self> {
        Ok(Self::new(seed_data(month)?))
    }

    /// Ids returned by the next `create` calls, in order.
    pub fn with_ids<S: Into<String>>(self, ids: impl IntoIterator<Item = S>) -> Self {
        Self {
            ids: Mutex::new(ids.into_iter().map(Into::into).collect()),
            ..self
        }
    }

    /// Every operation waits for a permit from `gate` before it runs.
    pub fn with_gate(self, gate: StoreGate) -> Self {
        Self {
            gate: Some(gate),
            ..self
        }
    }

    /// The next operation fails with `error`. Calls queue up.
    pub async fn fail_next(&self, error: StoreError) {
        self.failures.lock().await.push_back(error);
    }

    /// A copy of the stored documents.
    pub async fn snapshot(&self) -> Vec<Transaction> {
        self.data.lock().await.clone()
    }

    async fn begin(&self, op: &str) -> StoreResult<()> {
        trace!("memory store: {op}");
        if let Some(gate) = &self.gate {
            gate.pass().await?;
        }
        match self.failures.lock().await.pop_front() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    async fn next_id(&self) -> String {
        match self.ids.lock().await.pop_front() {
            Some(id) => id,
            None => uuid::Uuid::new_v4().simple().to_string(),
        }
    }
}

#[async_trait::async_trait]
impl Store for MemoryStore {
    async fn fetch_all(&self) -> StoreResult<Vec<Transaction>> {
        self.begin("fetch_all").await?;
        Ok(self.data.lock().await.clone())
    }

    async fn create(&self, payload: &TransactionPayload) -> StoreResult<String> {
        self.begin("create").await?;
        let id = self.next_id().await;
        self.data
            .lock()
            .await
            .push(Transaction::new(id.clone(), payload.clone()));
        Ok(id)
    }

    async fn update(&self, id: &str, payload: &TransactionPayload) -> StoreResult<()> {
        self.begin("update").await?;
        let mut data = self.data.lock().await;
        match data.iter_mut().find(|t| t.id == id) {
            Some(existing) => {
                existing.apply(payload.clone());
                Ok(())
            }
            None => Err(StoreError::known(
                NOT_FOUND,
                format!("No transaction with id '{id}'"),
            )),
        }
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        self.begin("delete").await?;
        // Deleting a missing document is not an error, same as a document database.
        self.data.lock().await.retain(|t| t.id != id);
        Ok(())
    }
}

/// Holds store operations pending until permits are released. Clones share the same permits.
#[derive(Debug, Clone)]
pub struct StoreGate {
    permits: Arc<Semaphore>,
}

impl Default for StoreGate {
    fn default() -> Self {
        Self {
            permits: Arc::new(Semaphore::new(0)),
        }
    }
}

impl StoreGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lets `n` pending (or future) operations through.
    pub fn release(&self, n: usize) {
        self.permits.add_permits(n);
    }

    async fn pass(&self) -> StoreResult<()> {
        let permit = self
            .permits
            .acquire()
            .await
            .map_err(StoreError::unknown)?;
        permit.forget();
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct SeedRow {
    day: u32,
    r#type: TransactionType,
    amount: Amount,
    category: Category,
    content: String,
}

/// Provides the seed data from this module, dated in the month of `month`.
fn seed_data(month: NaiveDate) -> Result<Vec<Transaction>> {
    let prefix = month_key(month);
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(Cursor::new(SEED_DATA.as_bytes()));

    let mut transactions = Vec::new();
    for (ix, result) in rdr.deserialize().enumerate() {
        let row: SeedRow = result.with_context(|| format!("Bad seed row {}", ix + 2))?;
        let payload = TransactionPayload {
            r#type: row.r#type,
            date: format!("{prefix}-{:02}", row.day),
            amount: row.amount,
            category: row.category,
            content: row.content,
        };
        transactions.push(Transaction::new(format!("seed-{:03}", ix + 1), payload));
    }
    Ok(transactions)
}

/// Seed transaction data. Days are kept at 28 or below so they exist in every month.
const SEED_DATA: &str = r##"day,type,amount,category,content
1,expense,85000,housing,Rent
3,expense,1200,food,Lunch
3,expense,640,transport,Train pass top-up
5,expense,2380,daily-goods,Detergent and tissues
10,income,280000,salary,Monthly salary
12,expense,4500,social,Farewell party
14,expense,3200,entertainment,Movie night
15,income,15000,side-income,Translation job
20,expense,5400,food,Groceries
25,income,5000,allowance,Allowance from parents
28,expense,980,food,Bakery
"##;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::UNAVAILABLE;
    use crate::test::lunch;

    #[tokio::test]
    async fn test_create_assigns_queued_ids_then_random() {
        let store = MemoryStore::default().with_ids(["abc123"]);
        let first = store.create(&lunch("2024-05-03", 1200)).await.unwrap();
        let second = store.create(&lunch("2024-05-04", 800)).await.unwrap();
        assert_eq!(first, "abc123");
        assert_ne!(second, "abc123");
        assert!(!second.is_empty());
        assert_eq!(store.snapshot().await.len(), 2);
    }

    #[tokio::test]
    async fn test_update_unknown_id_is_not_found() {
        let store = MemoryStore::default();
        let err = store
            .update("missing", &lunch("2024-05-03", 1))
            .await
            .unwrap_err();
        assert_eq!(err.code(), Some(NOT_FOUND));
    }

    #[tokio::test]
    async fn test_delete_unknown_id_succeeds() {
        let store = MemoryStore::new(vec![Transaction::new("a", lunch("2024-05-03", 1))]);
        store.delete("missing").await.unwrap();
        assert_eq!(store.snapshot().await.len(), 1);
        store.delete("a").await.unwrap();
        assert!(store.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn test_fail_next_applies_once() {
        let store = MemoryStore::default();
        store
            .fail_next(StoreError::known(UNAVAILABLE, "offline"))
            .await;
        assert!(store.fetch_all().await.is_err());
        assert!(store.fetch_all().await.is_ok());
    }

    #[tokio::test]
    async fn test_gate_holds_operations_until_released() {
        let gate = StoreGate::new();
        let store = Arc::new(MemoryStore::default().with_gate(gate.clone()));
        let pending = tokio::spawn({
            let store = store.clone();
            async move { store.fetch_all().await }
        });
        tokio::task::yield_now().await;
        assert!(!pending.is_finished());
        gate.release(1);
        let fetched = pending.await.unwrap().unwrap();
        assert!(fetched.is_empty());
    }

    #[test]
    fn test_seed_data_is_consistent_and_in_month() {
        let month = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let data = seed_data(month).unwrap();
        assert_eq!(data.len(), 11);
        for txn in &data {
            assert!(txn.is_consistent(), "{txn:?}");
            assert!(txn.in_month(month));
        }
        assert_eq!(data[0].id, "seed-001");
        assert_eq!(data[0].date, "2024-02-01");
    }
}
