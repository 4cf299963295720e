//! Shapes the aggregates into what the calendar and chart widgets consume.

mod calendar;
mod chart;

pub use calendar::{build_calendar_events, CalendarEntry, EntryDisplay};
pub use chart::{category_chart, daily_bar_chart, CategorySeries, ChartData, DailyBarSeries};
