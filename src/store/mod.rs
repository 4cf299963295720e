//! The transaction store: the remote document collection that holds the canonical copy of every
//! transaction. The rest of the crate only talks to it through the `Store` trait.

mod json_file;
mod memory;

pub use json_file::JsonFileStore;
pub use memory::{MemoryStore, StoreGate};

use crate::model::{Transaction, TransactionPayload};
use crate::{Config, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Codes reported by the bundled stores.
pub const NOT_FOUND: &str = "not-found";
pub const UNAVAILABLE: &str = "unavailable";
pub const IO: &str = "io";
pub const DECODE: &str = "decode";
pub const PERMISSION_DENIED: &str = "permission-denied";

/// A fault raised by a store operation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A fault the store recognised and labelled with a machine-readable code.
    #[error("store error [{code}]: {message}")]
    Known { code: String, message: String },

    /// Anything else, e.g. a failure below the store's own error handling.
    #[error("unexpected store error: {0}")]
    Unknown(#[source] anyhow::Error),
}

impl StoreError {
    pub fn known(code: impl Into<String>, message: impl Into<String>) -> Self {
        StoreError::Known {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn unknown(e: impl Into<anyhow::Error>) -> Self {
        StoreError::Unknown(e.into())
    }

    /// The machine-readable code, if this is a known fault.
    pub fn code(&self) -> Option<&str> {
        match self {
            StoreError::Known { code, .. } => Some(code),
            StoreError::Unknown(_) => None,
        }
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// The operations the client needs from the document store. Implementations are responsible for
/// their own timeouts; callers neither retry nor cancel.
#[async_trait::async_trait]
pub trait Store: Send + Sync {
    /// Fetches the entire transaction collection.
    async fn fetch_all(&self) -> StoreResult<Vec<Transaction>>;

    /// Persists a new transaction and returns the id the store assigned to it.
    async fn create(&self, payload: &TransactionPayload) -> StoreResult<String>;

    /// Overwrites every field of the transaction identified by `id`.
    async fn update(&self, id: &str, payload: &TransactionPayload) -> StoreResult<()>;

    /// Removes the transaction identified by `id`.
    async fn delete(&self, id: &str) -> StoreResult<()>;
}

/// Determines which `Store` implementation the app runs against.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// The JSON document in the kakeibo home directory.
    #[default]
    File,
    /// A seeded, in-memory store that never touches the disk.
    Memory,
}

serde_plain::derive_display_from_serialize!(Mode);
serde_plain::derive_fromstr_from_deserialize!(Mode);

const IN_MEMORY_ENV: &str = "KAKEIBO_IN_MEMORY";

impl Mode {
    /// `Mode::Memory` when `KAKEIBO_IN_MEMORY` is set and non-empty, otherwise `Mode::File`.
    pub fn from_env() -> Self {
        match std::env::var(IN_MEMORY_ENV) {
            Ok(value) if !value.is_empty() => Mode::Memory,
            _ => Mode::File,
        }
    }
}

/// Creates the store selected by `mode`. The in-memory store is seeded with sample data for the
/// month containing `today`.
pub fn store(config: &Config, mode: Mode, today: NaiveDate) -> Result<Arc<dyn Store>> {
    debug!("Using the {mode} store");
    let store: Arc<dyn Store> = match mode {
        Mode::File => Arc::new(JsonFileStore::new(config.store_path())),
        Mode::Memory => Arc::new(MemoryStore::seeded(today)?),
    };
    Ok(store)
}
