// SPDX-License-Identifier: MIT

//!
//! The granularity registry: one partitioned period sequence per granularity
//! over the current date range, plus the generated label data
//!

use crate::labels::extended_labels;
use crate::{Calendar, ExtendedLabels, Granularity, PeriodSeries};
use chrono::NaiveDateTime;
use log::debug;

/// The five partitioned sequences over `[start_date, end_date)`, keyed by
/// granularity.  Rebuilt whenever the date range (or the calendar) changes;
/// individual series are mutated in place by separate/unseparate
#[derive(Debug, Clone, PartialEq)]
pub struct GranularityData {
    start_date: NaiveDateTime,
    end_date: NaiveDateTime,
    series: Vec<PeriodSeries>,
    labels: Vec<ExtendedLabels>,
}

impl GranularityData {
    /// Create an empty registry over `[start_date, end_date)`.  Call
    /// [`create_granularities`](Self::create_granularities) before using the
    /// series
    pub fn new(start_date: NaiveDateTime, end_date: NaiveDateTime) -> Self {
        Self {
            start_date,
            end_date,
            series: Granularity::ALL
                .iter()
                .map(|&granularity| PeriodSeries::build(start_date, start_date, granularity, &Calendar::default()))
                .collect(),
            labels: Granularity::ALL.iter().map(|_| ExtendedLabels::default()).collect(),
        }
    }

    /// Partition the range at all five granularities
    pub fn create_granularities(&mut self, calendar: &Calendar) {
        debug!(
            "partitioning [{}, {}) at all granularities",
            self.start_date, self.end_date
        );
        self.series = Granularity::ALL
            .iter()
            .map(|&granularity| {
                PeriodSeries::build(self.start_date, self.end_date, granularity, calendar)
            })
            .collect();
    }

    /// Generate the label data for every granularity.  Call after
    /// [`create_granularities`](Self::create_granularities)
    pub fn create_labels(&mut self, calendar: &Calendar) {
        self.labels = self
            .series
            .iter()
            .map(|series| extended_labels(series, calendar))
            .collect();
    }

    /// Get one granularity's period sequence
    pub fn series(&self, granularity: Granularity) -> &PeriodSeries {
        &self.series[granularity as usize]
    }

    /// Get one granularity's period sequence mutably (for
    /// separate/unseparate)
    pub fn series_mut(&mut self, granularity: Granularity) -> &mut PeriodSeries {
        &mut self.series[granularity as usize]
    }

    /// Get one granularity's label data
    pub fn labels(&self, granularity: Granularity) -> &ExtendedLabels {
        &self.labels[granularity as usize]
    }

    /// The range start (inclusive)
    pub fn start_date(&self) -> NaiveDateTime {
        self.start_date
    }

    /// The range end (exclusive)
    pub fn end_date(&self) -> NaiveDateTime {
        self.end_date
    }
}
