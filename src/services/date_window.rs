//! UTC calendar-day windows used to bound click timestamps.

use crate::models::analytics::TimeSeriesPoint;
use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};
use std::collections::HashMap;

/// An inclusive range of UTC calendar dates ending at `last_day`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub first_day: NaiveDate,
    pub last_day: NaiveDate,
}

impl DateWindow {
    /// The `days` calendar dates ending with `today`, so `trailing(today, 1)` is today alone.
    ///
    /// `days` below 1 is treated as 1.
    pub fn trailing(today: NaiveDate, days: i64) -> Self {
        Self::reaching_back(today, u64::try_from(days.max(1) - 1).unwrap_or(0))
    }

    /// From `days_back` dates before `today` through `today`.
    ///
    /// `reaching_back(today, 7)` starts at midnight seven days before the
    /// start of today and so spans eight calendar dates.
    pub fn reaching_back(today: NaiveDate, days_back: u64) -> Self {
        let first_day = today
            .checked_sub_days(Days::new(days_back))
            .unwrap_or(NaiveDate::MIN);
        Self {
            first_day,
            last_day: today,
        }
    }

    /// Midnight UTC at the start of `first_day` (inclusive bound).
    pub fn start(&self) -> DateTime<Utc> {
        self.first_day.and_time(NaiveTime::MIN).and_utc()
    }

    /// Midnight UTC after `last_day` (exclusive bound).
    pub fn end(&self) -> DateTime<Utc> {
        self.last_day
            .checked_add_days(Days::new(1))
            .unwrap_or(NaiveDate::MAX)
            .and_time(NaiveTime::MIN)
            .and_utc()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        (self.first_day..=self.last_day).contains(&date)
    }

    /// Every date in the window, ascending.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        let last_day = self.last_day;
        self.first_day
            .iter_days()
            .take_while(move |date| *date <= last_day)
    }

    /// Expand a sparse series into one point per date of the window.
    ///
    /// Dates without a point get `clicks: 0`; points outside the window are dropped.
    pub fn fill_gaps(&self, points: Vec<TimeSeriesPoint>) -> Vec<TimeSeriesPoint> {
        let counts: HashMap<NaiveDate, i64> = points
            .into_iter()
            .filter(|point| self.contains(point.date))
            .map(|point| (point.date, point.clicks))
            .collect();

        self.dates()
            .map(|date| TimeSeriesPoint {
                date,
                clicks: counts.get(&date).copied().unwrap_or(0),
            })
            .collect()
    }
}
