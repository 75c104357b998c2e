// SPDX-License-Identifier: MIT

//!
//! The fiscal calendar: period boundaries (day, week, month, quarter, year)
//! relative to a configurable fiscal year start and first day of week
//!

use crate::Granularity;
use chrono::{Datelike, Days, Months, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can arise in relation to a [`Calendar`]
#[derive(Error, Debug, Clone)]
pub enum CalendarError {
    /// The fiscal start month is not allowed (must be 1 <= month <= 12)
    #[error("Fiscal start month `{0}` is not allowed")]
    InvalidMonth(u32),

    /// A date could not be materialised from the configuration
    #[error("Date {0}-{1}-{2} does not exist")]
    InvalidDate(i32, u32, u32),
}

/// A half-open date interval `[start_date, end_date)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateSpan {
    pub start_date: NaiveDateTime,
    pub end_date: NaiveDateTime,
}

/// The fiscal year start.  The day is clamped so that it never exceeds the
/// number of days in the configured month (February allows 29; when a concrete
/// non-leap year is materialised the day is clamped again to 28).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarConfig {
    month: u32,
    day: u32,
}

impl CalendarConfig {
    /// Create a new [`CalendarConfig`] if the month is valid.  The day is
    /// clamped into the month rather than rejected
    pub fn new(month: u32, day: u32) -> Result<Self, CalendarError> {
        if !(1..=12).contains(&month) {
            return Err(CalendarError::InvalidMonth(month));
        }
        let day = day.clamp(1, max_day_of_month(month));
        Ok(Self { month, day })
    }

    /// The fiscal start month (1 = January)
    pub fn month(&self) -> u32 {
        self.month
    }

    /// The fiscal start day within the month
    pub fn day(&self) -> u32 {
        self.day
    }
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self { month: 1, day: 1 }
    }
}

/// Period-boundary calculations under a fiscal year start and a first day of
/// week.  Quarter and year periods anchor to the fiscal start, not the
/// Gregorian calendar year
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Calendar {
    config: CalendarConfig,
    week_start: Weekday,
}

impl Calendar {
    /// Create a new [`Calendar`]
    pub fn new(config: CalendarConfig, week_start: Weekday) -> Self {
        Self { config, week_start }
    }

    /// Get the calendar's configuration
    pub fn config(&self) -> CalendarConfig {
        self.config
    }

    /// Get the configured first day of week
    pub fn week_start(&self) -> Weekday {
        self.week_start
    }

    /// Check whether the supplied configuration differs from this calendar's
    /// (value equality)
    pub fn is_changed(&self, config: CalendarConfig, week_start: Weekday) -> bool {
        self.config != config || self.week_start != week_start
    }

    /// The start of the day after `date`
    pub fn next_date(&self, date: NaiveDateTime) -> NaiveDateTime {
        date + Days::new(1)
    }

    /// The calendar day bracketing `date`
    pub fn day_period(&self, date: NaiveDateTime) -> DateSpan {
        let start_date = midnight(date);
        DateSpan {
            start_date,
            end_date: start_date + Days::new(1),
        }
    }

    /// The 7-day week bracketing `date`, beginning on the configured week
    /// start day
    pub fn week_period(&self, date: NaiveDateTime) -> DateSpan {
        let days_back = (7 + date.weekday().num_days_from_sunday() as i64
            - self.week_start.num_days_from_sunday() as i64)
            % 7;
        let start_date = midnight(date) - Days::new(days_back as u64);
        DateSpan {
            start_date,
            end_date: start_date + Days::new(7),
        }
    }

    /// The Gregorian month bracketing `date`
    pub fn month_period(&self, date: NaiveDateTime) -> DateSpan {
        // with_day(1) cannot fail: every month has a day 1
        let first = date.date().with_day(1).unwrap_or(date.date());
        DateSpan {
            start_date: first.and_time(NaiveTime::MIN),
            end_date: (first + Months::new(1)).and_time(NaiveTime::MIN),
        }
    }

    /// The fiscal quarter bracketing `date`.  Quarters begin at the fiscal
    /// year start plus 0, 3, 6 and 9 months
    pub fn quarter_period(&self, date: NaiveDateTime) -> DateSpan {
        let year_start = self.year_period(date).start_date.date();
        let mut start = year_start;
        let mut end = year_start + Months::new(3);
        while end.and_time(NaiveTime::MIN) <= date {
            start = end;
            end = end + Months::new(3);
        }
        DateSpan {
            start_date: start.and_time(NaiveTime::MIN),
            end_date: end.and_time(NaiveTime::MIN),
        }
    }

    /// The fiscal year bracketing `date`, i.e. `[anchor, anchor + 1 year)`
    /// where the anchor is the configured fiscal start month/day
    pub fn year_period(&self, date: NaiveDateTime) -> DateSpan {
        let anchor = self.fiscal_anchor(date.year());
        let start_date = if date >= anchor {
            anchor
        } else {
            self.fiscal_anchor(date.year() - 1)
        };
        DateSpan {
            start_date,
            end_date: self.fiscal_anchor(start_date.year() + 1),
        }
    }

    /// The period at the requested granularity bracketing `date`
    pub fn period(&self, granularity: Granularity, date: NaiveDateTime) -> DateSpan {
        match granularity {
            Granularity::Day => self.day_period(date),
            Granularity::Week => self.week_period(date),
            Granularity::Month => self.month_period(date),
            Granularity::Quarter => self.quarter_period(date),
            Granularity::Year => self.year_period(date),
        }
    }

    /// The fiscal year label of `date`.  A fiscal year that begins on the 1st
    /// of January is labelled by its own year; any other start is labelled by
    /// the year it ends in
    pub fn fiscal_year_of(&self, date: NaiveDateTime) -> i32 {
        let start_year = self.year_period(date).start_date.year();
        if self.config.month == 1 && self.config.day == 1 {
            start_year
        } else {
            start_year + 1
        }
    }

    /// The fiscal quarter ordinal (1-4) of `date`
    pub fn quarter_of(&self, date: NaiveDateTime) -> u32 {
        let year_start = self.year_period(date).start_date.date();
        let mut ordinal = 1;
        let mut end = year_start + Months::new(3);
        while end.and_time(NaiveTime::MIN) <= date && ordinal < 4 {
            ordinal += 1;
            end = end + Months::new(3);
        }
        ordinal
    }

    /// The week ordinal of `date` within its fiscal year.  Week 1 begins on
    /// the first configured week start day on or after the fiscal year start;
    /// any earlier days are week 0
    pub fn week_of(&self, date: NaiveDateTime) -> u32 {
        let year_start = self.year_period(date).start_date.date();
        let days_forward = (7 + self.week_start.num_days_from_sunday() as i64
            - year_start.weekday().num_days_from_sunday() as i64)
            % 7;
        let first_week_start = year_start + Days::new(days_forward as u64);
        if date.date() < first_week_start {
            0
        } else {
            ((date.date() - first_week_start).num_days() / 7) as u32 + 1
        }
    }

    /// The fiscal year anchor for `year`, with the configured day clamped to
    /// the month's real length in that year
    fn fiscal_anchor(&self, year: i32) -> NaiveDateTime {
        let day = self.config.day.min(days_in_month(year, self.config.month));
        NaiveDate::from_ymd_opt(year, self.config.month, day)
            .unwrap_or_default()
            .and_time(NaiveTime::MIN)
    }
}

impl Default for Calendar {
    fn default() -> Self {
        Self::new(CalendarConfig::default(), Weekday::Sun)
    }
}

/// Reset the time-of-day component of `date` to midnight
pub fn midnight(date: NaiveDateTime) -> NaiveDateTime {
    date.date().and_time(NaiveTime::MIN)
}

/// The number of days in `month` of a concrete `year`
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match NaiveDate::from_ymd_opt(year, month, 1) {
        Some(first) => ((first + Months::new(1)) - first).num_days() as u32,
        None => 31,
    }
}

/// The number of days `month` can hold in any year
fn max_day_of_month(month: u32) -> u32 {
    match month {
        2 => 29,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}
