use crate::finance::{compute_category_sums, compute_daily_balances, Balance};
use crate::model::{Category, Transaction, TransactionType};
use serde::Serialize;
use std::collections::BTreeMap;

/// What a chart should show. `Loading` and `NoData` get different placeholders.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
#[serde(tag = "state", content = "data", rename_all = "snake_case")]
pub enum ChartData<T> {
    /// The transactions have not been fetched yet.
    Loading,
    /// Fetched, but there are no transactions to chart.
    NoData,
    Ready(T),
}

impl<T> ChartData<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            ChartData::Ready(data) => Some(data),
            _ => None,
        }
    }
}

/// Category breakdown for one transaction type, as parallel arrays.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct CategorySeries {
    pub kind: TransactionType,
    pub labels: Vec<Category>,
    pub values: Vec<u64>,
    pub colors: Vec<&'static str>,
}

impl CategorySeries {
    /// Lays out `sums` in the display order of `kind`'s category table.
    pub fn from_sums(kind: TransactionType, sums: &BTreeMap<Category, u64>) -> Self {
        let mut series = Self {
            kind,
            labels: Vec::new(),
            values: Vec::new(),
            colors: Vec::new(),
        };
        for spec in kind.categories() {
            if let Some(value) = sums.get(&spec.category) {
                series.labels.push(spec.category);
                series.values.push(*value);
                series.colors.push(spec.color);
            }
        }
        series
    }
}

/// Daily income and expense bars, indexed by the sorted dates that have transactions.
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize)]
pub struct DailyBarSeries {
    pub labels: Vec<String>,
    pub income: Vec<i64>,
    pub expense: Vec<i64>,
}

impl DailyBarSeries {
    pub fn from_balances(daily: &BTreeMap<String, Balance>) -> Self {
        let mut series = Self::default();
        for (date, balance) in daily {
            series.labels.push(date.clone());
            series.income.push(balance.income);
            series.expense.push(balance.expense);
        }
        series
    }
}

/// The category pie for `kind` over `transactions`.
pub fn category_chart(
    transactions: &[Transaction],
    kind: TransactionType,
    loading: bool,
) -> ChartData<CategorySeries> {
    if loading {
        return ChartData::Loading;
    }
    if transactions.is_empty() {
        return ChartData::NoData;
    }
    let sums = compute_category_sums(transactions, kind);
    ChartData::Ready(CategorySeries::from_sums(kind, &sums))
}

/// The daily income/expense bars over `transactions`.
pub fn daily_bar_chart(transactions: &[Transaction], loading: bool) -> ChartData<DailyBarSeries> {
    if loading {
        return ChartData::Loading;
    }
    if transactions.is_empty() {
        return ChartData::NoData;
    }
    let daily = compute_daily_balances(transactions);
    ChartData::Ready(DailyBarSeries::from_balances(&daily))
}
