//! Aggregations over a set of transactions: income/expense/balance totals, per-day totals and
//! per-category sums.
//!
//! Everything here is a pure function of its input. Results do not depend on the order of the
//! transactions.

use crate::model::{Category, Transaction, TransactionType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::trace;

/// Income, expense and their difference for a date or a period. Never stored; always derived.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Balance {
    pub income: i64,
    pub expense: i64,
    pub balance: i64,
}

impl Balance {
    fn add(&mut self, transaction: &Transaction) {
        let amount = transaction.amount.signed();
        match transaction.r#type {
            TransactionType::Income => self.income = self.income.saturating_add(amount),
            TransactionType::Expense => self.expense = self.expense.saturating_add(amount),
        }
        self.balance = self.income.saturating_sub(self.expense);
    }
}

/// A loaded transaction whose category is outside its type's category domain.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize, thiserror::Error)]
#[error("transaction '{id}' is {kind} but has the {category} category")]
pub struct DataIntegrityFault {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub category: Category,
}

/// Sums income and expense over `transactions`.
pub fn compute_balance<'a>(transactions: impl IntoIterator<Item = &'a Transaction>) -> Balance {
    transactions
        .into_iter()
        .fold(Balance::default(), |mut acc, transaction| {
            acc.add(transaction);
            acc
        })
}

/// Groups `transactions` by date and computes a `Balance` for each date.
///
/// Only dates that have at least one transaction get an entry. Keys are ISO dates, so iterating
/// the map visits them in chronological order.
pub fn compute_daily_balances<'a>(
    transactions: impl IntoIterator<Item = &'a Transaction>,
) -> BTreeMap<String, Balance> {
    let mut daily: BTreeMap<String, Balance> = BTreeMap::new();
    for transaction in transactions {
        daily
            .entry(transaction.date.clone())
            .or_default()
            .add(transaction);
    }
    daily
}

/// Sums the amounts of the transactions of type `kind`, per category.
///
/// Categories without matching transactions are absent. A transaction whose category does not
/// belong to its type is a data-integrity fault: it is left out of every bucket. `Controller::load`
/// warns about such faults once, so here they are only traced.
pub fn compute_category_sums<'a>(
    transactions: impl IntoIterator<Item = &'a Transaction>,
    kind: TransactionType,
) -> BTreeMap<Category, u64> {
    let mut sums: BTreeMap<Category, u64> = BTreeMap::new();
    for transaction in transactions.into_iter().filter(|t| t.r#type == kind) {
        if let Some(fault) = integrity_fault(transaction) {
            trace!("Excluded from category sums: {fault}");
            continue;
        }
        let sum = sums.entry(transaction.category).or_default();
        *sum = sum.saturating_add(transaction.amount.value());
    }
    sums
}

/// Returns a fault for every transaction whose category is outside its type's domain.
pub fn integrity_faults<'a>(
    transactions: impl IntoIterator<Item = &'a Transaction>,
) -> Vec<DataIntegrityFault> {
    transactions.into_iter().filter_map(integrity_fault).collect()
}

fn integrity_fault(transaction: &Transaction) -> Option<DataIntegrityFault> {
    if transaction.is_consistent() {
        return None;
    }
    Some(DataIntegrityFault {
        id: transaction.id.clone(),
        kind: transaction.r#type,
        category: transaction.category,
    })
}
