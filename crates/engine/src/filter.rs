// SPDX-License-Identifier: GPL-3.0-or-later

//!
//! The emitted range filter and the narrow host capability traits the engine
//! talks through
//!

use crate::FilterColumnTarget;
use chrono::NaiveDateTime;
use chronoslice_core::Granularity;
use serde::Serialize;

/// The comparison a [`FilterCondition`] applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FilterOperator {
    GreaterThanOrEqual,
    LessThan,
}

/// One bound of the emitted filter
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCondition {
    pub operator: FilterOperator,
    pub value: NaiveDateTime,
}

/// How the two conditions compose
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LogicalOperator {
    And,
}

/// A range filter over the target column: `>= start AND < end`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeFilter {
    pub target: FilterColumnTarget,
    pub logical_operator: LogicalOperator,
    pub conditions: [FilterCondition; 2],
}

impl RangeFilter {
    /// Create a filter selecting `[start_date, end_date)` on `target`
    pub fn new(
        target: FilterColumnTarget,
        start_date: NaiveDateTime,
        end_date: NaiveDateTime,
    ) -> Self {
        Self {
            target,
            logical_operator: LogicalOperator::And,
            conditions: [
                FilterCondition {
                    operator: FilterOperator::GreaterThanOrEqual,
                    value: start_date,
                },
                FilterCondition {
                    operator: FilterOperator::LessThan,
                    value: end_date,
                },
            ],
        }
    }

    /// The filter's start bound (inclusive)
    pub fn start_date(&self) -> NaiveDateTime {
        self.conditions[0].value
    }

    /// The filter's end bound (exclusive)
    pub fn end_date(&self) -> NaiveDateTime {
        self.conditions[1].value
    }

    /// Apply the filter as a predicate over a single value
    pub fn matches(&self, value: NaiveDateTime) -> bool {
        self.start_date() <= value && value < self.end_date()
    }
}

/// What the engine pushes to the host's filter channel
#[derive(Debug, Clone, PartialEq)]
pub enum FilterUpdate {
    /// Apply (or replace) the bounded filter
    Apply(RangeFilter),

    /// Remove any filter this slicer committed
    Remove,
}

/// The host's filter channel.  Calls are fire-and-forget; the engine never
/// learns whether the host acted on them
pub trait FilterSink {
    fn push_filter(&mut self, update: FilterUpdate);
}

/// One-shot property writes triggered by explicit user actions
pub trait PropertyStore {
    /// The user picked a different granularity
    fn persist_granularity(&mut self, granularity: Granularity);

    /// The user's gesture turned the force-selection policies off
    fn persist_force_selection_disabled(&mut self);
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn date(year: i32, month: u32, day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(year, month, day)
            .unwrap()
            .and_time(NaiveTime::MIN)
    }

    fn filter() -> RangeFilter {
        RangeFilter::new(
            FilterColumnTarget {
                table: String::from("Sales"),
                column: String::from("OrderDate"),
            },
            date(2023, 1, 15),
            date(2023, 2, 10),
        )
    }

    #[test]
    fn matches_is_inclusive_start_exclusive_end() {
        let filter = filter();
        assert!(filter.matches(date(2023, 1, 15)));
        assert!(filter.matches(date(2023, 2, 9)));
        assert!(!filter.matches(date(2023, 1, 14)));
        assert!(!filter.matches(date(2023, 2, 10)));
    }

    #[test]
    fn serializes_for_json_hosts() {
        let json = serde_json::to_value(filter()).unwrap();
        assert_eq!(json["logicalOperator"], "And");
        assert_eq!(json["target"]["table"], "Sales");
        assert_eq!(json["conditions"][0]["operator"], "GreaterThanOrEqual");
        assert_eq!(json["conditions"][1]["operator"], "LessThan");
        assert_eq!(json["conditions"][0]["value"], "2023-01-15T00:00:00");
    }
}
