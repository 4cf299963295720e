//! These structs provide the CLI interface for the kakeibo CLI.

use crate::model::TransactionType;
use crate::period::parse_month;
use crate::validation::TransactionInput;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// kakeibo: a household account book for the command line.
///
/// Record income and expense transactions, then look at a month of them as a list, as calendar
/// entries with daily totals, or as a category breakdown with daily income/expense bars.
///
/// Set KAKEIBO_IN_MEMORY to any non-empty value to run against seeded sample data held in memory
/// instead of the store document in the kakeibo home directory.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the kakeibo home directory, its config file and an empty store document.
    ///
    /// By default the home directory is $HOME/kakeibo. Pass --kakeibo-home or set KAKEIBO_HOME to
    /// put it somewhere else.
    Init,
    /// Record a new transaction.
    Add(TransactionArgs),
    /// Overwrite every field of an existing transaction.
    Update(UpdateArgs),
    /// Delete a transaction.
    Delete(DeleteArgs),
    /// List a month's transactions with the monthly and daily summaries.
    Month(PeriodArgs),
    /// Print the calendar entries of a month, including the selected-day highlight.
    Calendar(PeriodArgs),
    /// Print the category breakdown and the daily income/expense bars of a month.
    Report(ReportArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where kakeibo data and configuration is held. Defaults to ~/kakeibo
    #[arg(long, env = "KAKEIBO_HOME", default_value_t = default_kakeibo_home())]
    kakeibo_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, kakeibo_home: PathBuf) -> Self {
        Self {
            log_level,
            kakeibo_home: kakeibo_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn kakeibo_home(&self) -> &DisplayPath {
        &self.kakeibo_home
    }
}

/// The fields of a transaction as typed on the command line. They are validated before anything
/// reaches the store.
#[derive(Debug, Parser, Clone)]
pub struct TransactionArgs {
    /// income or expense
    #[arg(long = "type")]
    r#type: String,

    /// The date as YYYY-MM-DD. Defaults to today.
    #[arg(long)]
    date: Option<String>,

    /// The amount in whole currency units, at least 1.
    #[arg(long, allow_negative_numbers = true)]
    amount: i64,

    /// One of salary, side-income, allowance (income) or food, daily-goods, housing, social,
    /// entertainment, transport (expense).
    #[arg(long, default_value = "")]
    category: String,

    /// What the transaction was for, 1 to 50 characters.
    #[arg(long)]
    content: String,
}

impl TransactionArgs {
    pub fn new(
        r#type: impl Into<String>,
        date: Option<String>,
        amount: i64,
        category: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            r#type: r#type.into(),
            date,
            amount,
            category: category.into(),
            content: content.into(),
        }
    }

    /// The raw form input, dated `today` when no date was given.
    pub fn input(&self, today: NaiveDate) -> TransactionInput {
        TransactionInput {
            r#type: self.r#type.clone(),
            date: self
                .date
                .clone()
                .unwrap_or_else(|| today.format("%Y-%m-%d").to_string()),
            amount: self.amount,
            category: self.category.clone(),
            content: self.content.clone(),
        }
    }
}

/// (Not shown): Args for the `kakeibo update` command.
#[derive(Debug, Parser, Clone)]
pub struct UpdateArgs {
    /// The id of the transaction to update.
    #[arg(long)]
    id: String,

    #[clap(flatten)]
    transaction: TransactionArgs,
}

impl UpdateArgs {
    pub fn new(id: impl Into<String>, transaction: TransactionArgs) -> Self {
        Self {
            id: id.into(),
            transaction,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn transaction(&self) -> &TransactionArgs {
        &self.transaction
    }
}

/// (Not shown): Args for the `kakeibo delete` command.
#[derive(Debug, Parser, Clone)]
pub struct DeleteArgs {
    /// The id of the transaction to delete.
    #[arg(long)]
    id: String,
}

impl DeleteArgs {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

/// (Not shown): Selects the month and day for `kakeibo month` and `kakeibo calendar`.
#[derive(Debug, Default, Parser, Clone)]
pub struct PeriodArgs {
    /// The month to show as YYYY-MM. Defaults to the current month.
    #[arg(long, value_parser = month_arg)]
    month: Option<NaiveDate>,

    /// The selected day as YYYY-MM-DD. Defaults to today when showing the current month.
    #[arg(long)]
    day: Option<NaiveDate>,
}

impl PeriodArgs {
    pub fn new(month: Option<NaiveDate>, day: Option<NaiveDate>) -> Self {
        Self { month, day }
    }

    pub fn month(&self) -> Option<NaiveDate> {
        self.month
    }

    pub fn day(&self) -> Option<NaiveDate> {
        self.day
    }
}

/// (Not shown): Args for the `kakeibo report` command.
#[derive(Debug, Default, Parser, Clone)]
pub struct ReportArgs {
    /// The month to report on as YYYY-MM. Defaults to the current month.
    #[arg(long, value_parser = month_arg)]
    month: Option<NaiveDate>,

    /// The transaction type of the category breakdown: income or expense. Defaults to the
    /// default_chart_type in config.json.
    #[arg(long = "type")]
    r#type: Option<TransactionType>,
}

impl ReportArgs {
    pub fn new(month: Option<NaiveDate>, r#type: Option<TransactionType>) -> Self {
        Self { month, r#type }
    }

    pub fn month(&self) -> Option<NaiveDate> {
        self.month
    }

    pub fn r#type(&self) -> Option<TransactionType> {
        self.r#type
    }
}

fn month_arg(s: &str) -> std::result::Result<NaiveDate, String> {
    parse_month(s).ok_or_else(|| format!("'{s}' is not a YYYY-MM month"))
}

fn default_kakeibo_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("kakeibo"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --kakeibo-home or KAKEIBO_HOME instead of relying on the default \
                kakeibo home directory. If you continue using the program right now, you may have \
                problems!",
            );
            PathBuf::from("kakeibo")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn path(&self) -> &Path {
        &self.0
    }
}
