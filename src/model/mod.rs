//! Types that represent the core data model, such as `Transaction` and `Category`.
mod amount;
mod category;
mod transaction;

pub use amount::{group_thousands, Amount, AmountError};
pub use category::{Category, CategorySpec};
pub use transaction::{day_key, month_key, Transaction, TransactionPayload, TransactionType};
