//! Read-only handlers: the month list, the calendar entries and the chart series.

use crate::args::{PeriodArgs, ReportArgs};
use crate::commands::{money, Out};
use crate::controller::{Controller, State};
use crate::finance::{Balance, DataIntegrityFault};
use crate::model::{Transaction, TransactionType};
use crate::view::{CalendarEntry, CategorySeries, ChartData, DailyBarSeries};
use crate::Config;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::warn;

/// A month of transactions with the monthly and daily summaries.
#[derive(Debug, Clone, Serialize)]
pub struct MonthReport {
    pub month: String,
    pub summary: Balance,
    pub day: String,
    pub day_summary: Balance,
    pub day_transactions: Vec<Transaction>,
    pub daily: BTreeMap<String, Balance>,
    pub transactions: Vec<Transaction>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub integrity_faults: Vec<DataIntegrityFault>,
}

/// The chart series of a month.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub month: String,
    pub r#type: TransactionType,
    pub categories: ChartData<CategorySeries>,
    pub daily: ChartData<DailyBarSeries>,
}

/// Lists the transactions of the selected month along with its summary and the summary of the
/// selected day.
pub fn month(config: &Config, controller: &Controller, args: &PeriodArgs) -> Out<MonthReport> {
    select_period(controller, args);
    let state = controller.snapshot();
    let symbol = config.currency_symbol();
    let report = MonthReport {
        month: state.period().month_key(),
        summary: state.monthly_balance(),
        day: state.period().day_key(),
        day_summary: state.daily_balance(),
        day_transactions: state.daily_transactions(),
        daily: state.daily_balances(),
        transactions: state.monthly_transactions(),
        integrity_faults: month_faults(&state),
    };
    let message = format!(
        "{}: {} transactions, income {}, expense {}, balance {}. {}: {} transactions, balance {}",
        report.month,
        report.transactions.len(),
        money(symbol, report.summary.income),
        money(symbol, report.summary.expense),
        money(symbol, report.summary.balance),
        report.day,
        report.day_transactions.len(),
        money(symbol, report.day_summary.balance),
    );
    Out::new(message, report)
}

/// The calendar entries of the selected month: one per date with transactions plus the
/// highlight of the selected day.
pub fn calendar(controller: &Controller, args: &PeriodArgs) -> Out<Vec<CalendarEntry>> {
    select_period(controller, args);
    let state = controller.snapshot();
    let entries = state.calendar_events();
    let message = format!(
        "{}: {} days with transactions, {} selected",
        state.period().month_key(),
        entries.len().saturating_sub(1),
        state.period().day_key(),
    );
    Out::new(message, entries)
}

/// The category breakdown and daily bars of the selected month.
pub fn report(controller: &Controller, args: &ReportArgs) -> Out<Report> {
    select_period(controller, &PeriodArgs::new(args.month(), None));
    if let Some(kind) = args.r#type() {
        controller.set_chart_type(kind);
    }
    let state = controller.snapshot();
    for fault in month_faults(&state) {
        warn!("Left out of the category breakdown: {fault}");
    }
    let report = Report {
        month: state.period().month_key(),
        r#type: state.chart_type(),
        categories: state.category_chart(),
        daily: state.daily_bar_chart(),
    };
    let message = match &report.categories {
        ChartData::Ready(series) => format!(
            "{} {} by category: {} categories over {} days",
            report.month,
            report.r#type,
            series.labels.len(),
            report.daily.ready().map_or(0, |bars| bars.labels.len()),
        ),
        ChartData::NoData | ChartData::Loading => {
            format!("{}: no transactions to report", report.month)
        }
    };
    Out::new(message, report)
}

fn select_period(controller: &Controller, args: &PeriodArgs) {
    if let Some(month) = args.month() {
        controller.set_current_month(month);
    }
    if let Some(day) = args.day() {
        controller.set_current_day(day);
    }
}

fn month_faults(state: &State) -> Vec<DataIntegrityFault> {
    let month = state.period().month_key();
    state
        .integrity_faults()
        .into_iter()
        .filter(|fault| {
            state
                .transactions()
                .iter()
                .any(|t| t.id == fault.id && t.date.starts_with(&month))
        })
        .collect()
}
