//! Implements the `Store` trait on top of a single JSON document on disk.
//!
//! Every operation reads the whole document, changes it and writes it back. Collections are
//! personal-finance sized, so this stays cheap. Records are decoded one at a time: a record this
//! version cannot read is skipped when fetching but kept in the document when writing back.

use crate::model::{Transaction, TransactionPayload};
use crate::store::{Store, StoreError, StoreResult, DECODE, IO, NOT_FOUND, PERMISSION_DENIED};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{trace, warn};

const DOCUMENT_VERSION: u8 = 1;

/// The serialization format of the store document.
///
/// Example:
/// ```json
/// {
///   "version": 1,
///   "transactions": [
///     {
///       "id": "5c1f0e0e9a4b4c1d8b5f3f0d2a7e6c11",
///       "type": "expense",
///       "date": "2024-05-03",
///       "amount": 1200,
///       "category": "food",
///       "content": "lunch"
///     }
///   ]
/// }
/// ```
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub(crate) struct StoreDocument {
    version: u8,
    transactions: Vec<Value>,
}

impl StoreDocument {
    /// The records that decode as transactions, in document order.
    fn decode(&self) -> Vec<Transaction> {
        self.transactions
            .iter()
            .filter_map(|record| match Transaction::deserialize(record) {
                Ok(transaction) => Some(transaction),
                Err(e) => {
                    warn!(
                        "Skipping stored record '{}': {e}",
                        record_id(record).unwrap_or("<no id>")
                    );
                    None
                }
            })
            .collect()
    }
}

fn record_id(record: &Value) -> Option<&str> {
    record.get("id").and_then(Value::as_str)
}

fn encode(transaction: &Transaction) -> StoreResult<Value> {
    serde_json::to_value(transaction).map_err(StoreError::unknown)
}

impl Default for StoreDocument {
    fn default() -> Self {
        Self {
            version: DOCUMENT_VERSION,
            transactions: Vec::new(),
        }
    }
}

/// A `Store` that keeps the collection in a JSON file.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles within this process.
    lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes an empty document at `path`, replacing anything already there.
    pub(crate) async fn init(path: &Path) -> crate::Result<()> {
        let json = serde_json::to_string_pretty(&StoreDocument::default())?;
        crate::utils::write(path, json).await
    }

    async fn read(&self) -> StoreResult<StoreDocument> {
        trace!("Reading store document {}", self.path.display());
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(StoreDocument::default()),
            Err(e) => return Err(io_error(&self.path, e)),
        };
        serde_json::from_str(&content).map_err(|e| {
            StoreError::known(
                DECODE,
                format!("Unable to parse {}: {e}", self.path.display()),
            )
        })
    }

    /// Writes `document` to a sibling temporary file and renames it over the store document, so an
    /// interrupted write never leaves a truncated document behind.
    async fn write(&self, document: &StoreDocument) -> StoreResult<()> {
        let json = serde_json::to_string_pretty(document).map_err(StoreError::unknown)?;
        let temp_path = self.temp_path();
        tokio::fs::write(&temp_path, json)
            .await
            .map_err(|e| io_error(&temp_path, e))?;
        tokio::fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| io_error(&self.path, e))
    }

    fn temp_path(&self) -> PathBuf {
        let mut path = self.path.clone().into_os_string();
        path.push(".tmp");
        PathBuf::from(path)
    }
}

fn io_error(path: &Path, e: std::io::Error) -> StoreError {
    let code = match e.kind() {
        ErrorKind::PermissionDenied => PERMISSION_DENIED,
        _ => IO,
    };
    StoreError::known(code, format!("{}: {e}", path.display()))
}

#[async_trait::async_trait]
impl Store for JsonFileStore {
    async fn fetch_all(&self) -> StoreResult<Vec<Transaction>> {
        let _guard = self.lock.lock().await;
        Ok(self.read().await?.decode())
    }

    async fn create(&self, payload: &TransactionPayload) -> StoreResult<String> {
        let _guard = self.lock.lock().await;
        let mut document = self.read().await?;
        let id = uuid::Uuid::new_v4().simple().to_string();
        let record = encode(&Transaction::new(id.clone(), payload.clone()))?;
        document.transactions.push(record);
        self.write(&document).await?;
        Ok(id)
    }

    async fn update(&self, id: &str, payload: &TransactionPayload) -> StoreResult<()> {
        let _guard = self.lock.lock().await;
        let mut document = self.read().await?;
        let existing = document
            .transactions
            .iter_mut()
            .find(|record| record_id(record) == Some(id))
            .ok_or_else(|| StoreError::known(NOT_FOUND, format!("No transaction with id '{id}'")))?;
        *existing = encode(&Transaction::new(id.to_string(), payload.clone()))?;
        self.write(&document).await
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        let _guard = self.lock.lock().await;
        let mut document = self.read().await?;
        let before = document.transactions.len();
        document
            .transactions
            .retain(|record| record_id(record) != Some(id));
        if document.transactions.len() == before {
            trace!("delete of '{id}' matched nothing");
            return Ok(());
        }
        self.write(&document).await
    }
}
