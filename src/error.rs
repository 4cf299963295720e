use crate::store::StoreError;
use crate::validation::ValidationErrors;
use serde::{Deserialize, Serialize};

pub type Error = anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// The state-changing operations of the controller, used to give faults and log lines context.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Load,
    Create,
    Update,
    Delete,
}

serde_plain::derive_display_from_serialize!(Operation);

/// A fault reported by a controller operation.
#[derive(Debug, thiserror::Error)]
pub enum Fault {
    /// The payload failed validation and never reached the store.
    #[error("{0}")]
    Validation(#[from] ValidationErrors),

    /// The store failed to carry out the operation. Local state was left as it was.
    #[error("{operation} failed{}: {source}", id_suffix(.id))]
    Store {
        operation: Operation,
        id: Option<String>,
        #[source]
        source: StoreError,
    },
}

impl Fault {
    pub(crate) fn store(operation: Operation, id: Option<&str>, source: StoreError) -> Self {
        Fault::Store {
            operation,
            id: id.map(str::to_string),
            source,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Fault::Validation(_))
    }

    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            Fault::Validation(errors) => Some(errors),
            Fault::Store { .. } => None,
        }
    }
}

fn id_suffix(id: &Option<String>) -> String {
    match id {
        Some(id) => format!(" for transaction '{id}'"),
        None => String::new(),
    }
}
