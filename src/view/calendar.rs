use crate::finance::Balance;
use crate::model::group_thousands;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How the calendar renders an entry.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryDisplay {
    /// A normal, clickable event showing the day's figures.
    #[default]
    Auto,
    /// A non-interactive background marker.
    Background,
}

/// One item for the month calendar.
///
/// Amounts are grouped with thousands separators and carry no currency symbol.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CalendarEntry {
    /// The figures of a date that has transactions.
    Day {
        start: String,
        income: String,
        expense: String,
        balance: String,
        display: EntryDisplay,
    },
    /// Marks the selected day. Has no figures and is never part of any total.
    Highlight { start: String, display: EntryDisplay },
}

impl CalendarEntry {
    pub fn start(&self) -> &str {
        match self {
            CalendarEntry::Day { start, .. } | CalendarEntry::Highlight { start, .. } => start,
        }
    }

    pub fn is_highlight(&self) -> bool {
        matches!(self, CalendarEntry::Highlight { .. })
    }
}

/// Builds one `Day` entry per date in `daily`, in date order, followed by exactly one
/// `Highlight` entry for `selected_day`.
pub fn build_calendar_events(
    daily: &BTreeMap<String, Balance>,
    selected_day: &str,
) -> Vec<CalendarEntry> {
    daily
        .iter()
        .map(|(date, balance)| CalendarEntry::Day {
            start: date.clone(),
            income: group_thousands(balance.income),
            expense: group_thousands(balance.expense),
            balance: group_thousands(balance.balance),
            display: EntryDisplay::Auto,
        })
        .chain(std::iter::once(CalendarEntry::Highlight {
            start: selected_day.to_string(),
            display: EntryDisplay::Background,
        }))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finance::compute_daily_balances;
    use crate::test::fixture;

    #[test]
    fn test_one_entry_per_date_plus_one_highlight() {
        let daily = compute_daily_balances(&fixture());
        let entries = build_calendar_events(&daily, "2024-05-17");
        assert_eq!(entries.len(), daily.len() + 1);
        let highlights: Vec<&CalendarEntry> =
            entries.iter().filter(|e| e.is_highlight()).collect();
        assert_eq!(highlights.len(), 1);
        assert_eq!(highlights[0].start(), "2024-05-17");
    }

    #[test]
    fn test_day_entry_is_formatted() {
        let daily = compute_daily_balances(&fixture());
        let entries = build_calendar_events(&daily, "2024-05-10");
        let may_10 = entries
            .iter()
            .find(|e| e.start() == "2024-05-10" && !e.is_highlight())
            .unwrap();
        assert_eq!(
            may_10,
            &CalendarEntry::Day {
                start: "2024-05-10".to_string(),
                income: "300,000".to_string(),
                expense: "3,000".to_string(),
                balance: "297,000".to_string(),
                display: EntryDisplay::Auto,
            }
        );
    }

    #[test]
    fn test_empty_month_still_has_highlight() {
        let entries = build_calendar_events(&BTreeMap::new(), "2024-05-17");
        assert_eq!(entries.len(), 1);
        assert!(entries[0].is_highlight());
    }

    #[test]
    fn test_highlight_serializes_without_figures() {
        let entries = build_calendar_events(&BTreeMap::new(), "2024-05-17");
        let json = serde_json::to_value(&entries[0]).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "kind": "highlight",
                "start": "2024-05-17",
                "display": "background"
            })
        );
    }
}
