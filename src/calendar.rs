//! Trading calendar
//!
//! Resolves which dates in a range are trading sessions. Only the job runner
//! uses it; the fetch core takes dates as given.

use chrono::{Datelike, NaiveDate, Weekday};
use std::collections::BTreeSet;

/// Source of trading session dates
pub trait TradingCalendar: Send + Sync {
    /// Session dates in `start..=end`, ascending
    fn sessions(&self, start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate>;

    /// True if `date` is a session
    fn is_session(&self, date: NaiveDate) -> bool {
        !self.sessions(date, date).is_empty()
    }
}

/// Monday to Friday, minus a fixed holiday list
#[derive(Debug, Clone, Default)]
pub struct WeekdayCalendar {
    holidays: BTreeSet<NaiveDate>,
}

impl WeekdayCalendar {
    /// Weekdays with no holidays
    pub fn new() -> Self {
        Self::default()
    }

    /// Weekdays minus `holidays`
    pub fn with_holidays(holidays: impl IntoIterator<Item = NaiveDate>) -> Self {
        Self {
            holidays: holidays.into_iter().collect(),
        }
    }

    /// Number of configured holidays
    pub fn holiday_count(&self) -> usize {
        self.holidays.len()
    }
}

impl TradingCalendar for WeekdayCalendar {
    fn sessions(&self, start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
        start
            .iter_days()
            .take_while(|d| *d <= end)
            .filter(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
            .filter(|d| !self.holidays.contains(d))
            .collect()
    }
}
