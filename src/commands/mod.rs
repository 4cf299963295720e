//! Command handlers for the kakeibo CLI.
//!
//! Every handler returns an `Out`: a message for the user and, optionally, structured data.

mod init;
mod mutate;
mod report;

use crate::controller::Controller;
use crate::model::group_thousands;
use crate::store::{self, Mode};
use crate::{Config, Result};
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt::Debug;
use tracing::{debug, info};

pub use init::init;
pub use mutate::{add, delete, update};
pub use report::{calendar, month, report, MonthReport, Report};

/// The output type for a command. This allows the command to return a consistent message and,
/// optionally, structured data.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the command execution.
    message: String,

    /// Any structured data that needs to be output from the call.
    structure: Option<T>,
}

impl<T, S> From<S> for Out<T>
where
    T: Debug + Clone + Serialize,
    S: Into<String>,
{
    fn from(value: S) -> Self {
        Out::new_message(value)
    }
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// Create a new `Out` object that has `Some(structure)`.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: Some(structure),
        }
    }

    /// Create a new `Out` object that has `None` for `structure`.
    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: None,
        }
    }

    /// Get the `message`.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the structured data stored in `structure`.
    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    /// Print the message to `info!` and the structured data (if it exists) as JSON to `debug!`.
    pub fn print(&self) {
        info!("{}", self.message);
        if let Some(structure) = self.structure() {
            if let Ok(json) = serde_json::to_string_pretty(structure) {
                debug!("Command output:\n\n{json}\n\n");
            }
        }
    }

    /// Print the message to `info!` and the structured data (if it exists) as JSON to stdout.
    pub fn print_json(&self) -> Result<()> {
        info!("{}", self.message);
        if let Some(structure) = self.structure() {
            println!("{}", serde_json::to_string_pretty(structure)?);
        }
        Ok(())
    }
}

/// Creates the store selected by `mode` and a controller over it, and loads the transactions.
pub async fn open(config: &Config, mode: Mode, today: NaiveDate) -> Result<Controller> {
    let store = store::store(config, mode, today)?;
    let controller = Controller::with_chart_type(store, today, config.default_chart_type());
    controller.load().await?;
    Ok(controller)
}

/// Formats `value` for display, e.g. `¥1,200` or `-¥1,200`.
pub(crate) fn money(symbol: &str, value: i64) -> String {
    let grouped = group_thousands(value.saturating_abs());
    if value < 0 {
        format!("-{symbol}{grouped}")
    } else {
        format!("{symbol}{grouped}")
    }
}
