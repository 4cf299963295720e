//! The month shown on the calendar and the day selected in it.

use crate::model::{day_key, month_key};
use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// The viewed month and selected day.
///
/// `current_month` is always the first day of a month. `current_day` starts at `today` and
/// snaps back to it whenever the viewed month changes back to the month containing `today`.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Period {
    today: NaiveDate,
    current_month: NaiveDate,
    current_day: NaiveDate,
}

impl Period {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today,
            current_month: first_of_month(today),
            current_day: today,
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn current_month(&self) -> NaiveDate {
        self.current_month
    }

    pub fn current_day(&self) -> NaiveDate {
        self.current_day
    }

    /// `YYYY-MM` of the viewed month.
    pub fn month_key(&self) -> String {
        month_key(self.current_month)
    }

    /// `YYYY-MM-DD` of the selected day.
    pub fn day_key(&self) -> String {
        day_key(self.current_day)
    }

    /// Views the month containing `date`.
    pub fn set_current_month(&mut self, date: NaiveDate) {
        let month = first_of_month(date);
        trace!("current month {} -> {}", self.current_month, month);
        self.current_month = month;
        if month == first_of_month(self.today) {
            self.current_day = self.today;
        }
    }

    pub fn set_current_day(&mut self, day: NaiveDate) {
        self.current_day = day;
    }

    pub fn next_month(&mut self) {
        let next = self
            .current_month
            .checked_add_months(Months::new(1))
            .unwrap_or(self.current_month);
        self.set_current_month(next);
    }

    pub fn previous_month(&mut self) {
        let previous = self
            .current_month
            .checked_sub_months(Months::new(1))
            .unwrap_or(self.current_month);
        self.set_current_month(previous);
    }
}

/// The first day of the month containing `date`.
pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Parses a `YYYY-MM` month into its first day.
pub fn parse_month(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d").ok()
}
