// SPDX-License-Identifier: MIT

//!
//! Display-label data generated per granularity.  Text layout and drawing
//! belong to a rendering collaborator; only the label data lives here
//!

use crate::{Calendar, Granularity, PeriodSeries};
use chrono::{Datelike, NaiveDateTime};

/// One label covering a run of periods that share a parent period
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodLabel {
    /// Short text, e.g. `Q2`
    pub text: String,

    /// Long text, e.g. `Q2 2023`
    pub title: String,

    /// Position of the first period the label covers
    pub id: usize,
}

/// The label rows for one granularity, grouped by coarser-or-equal level.
/// Rows finer than the granularity stay empty
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtendedLabels {
    pub year_labels: Vec<PeriodLabel>,
    pub quarter_labels: Vec<PeriodLabel>,
    pub month_labels: Vec<PeriodLabel>,
    pub week_labels: Vec<PeriodLabel>,
    pub day_labels: Vec<PeriodLabel>,
}

impl ExtendedLabels {
    /// The label row for `level`
    pub fn level(&self, level: Granularity) -> &[PeriodLabel] {
        match level {
            Granularity::Year => &self.year_labels,
            Granularity::Quarter => &self.quarter_labels,
            Granularity::Month => &self.month_labels,
            Granularity::Week => &self.week_labels,
            Granularity::Day => &self.day_labels,
        }
    }
}

/// Generate the labels for one granularity's series: for every level coarser
/// than or equal to the granularity, one label per run of periods sharing
/// that level's key
pub(crate) fn extended_labels(series: &PeriodSeries, calendar: &Calendar) -> ExtendedLabels {
    let mut labels = ExtendedLabels::default();

    for level in Granularity::ALL {
        if level > series.granularity() {
            continue;
        }
        let row = labels_for_level(series, level, calendar);
        match level {
            Granularity::Year => labels.year_labels = row,
            Granularity::Quarter => labels.quarter_labels = row,
            Granularity::Month => labels.month_labels = row,
            Granularity::Week => labels.week_labels = row,
            Granularity::Day => labels.day_labels = row,
        }
    }

    labels
}

fn labels_for_level(
    series: &PeriodSeries,
    level: Granularity,
    calendar: &Calendar,
) -> Vec<PeriodLabel> {
    let mut labels: Vec<PeriodLabel> = Vec::new();
    let mut previous_key: Option<String> = None;

    for (position, period) in series.periods().iter().enumerate() {
        let key = level_key(level, period.start_date, calendar);
        if previous_key.as_deref() != Some(&key) {
            let (text, title) = level_text(level, period.start_date, calendar);
            labels.push(PeriodLabel {
                text,
                title,
                id: position,
            });
            previous_key = Some(key);
        }
    }

    labels
}

fn level_key(level: Granularity, date: NaiveDateTime, calendar: &Calendar) -> String {
    match level {
        Granularity::Year => calendar.fiscal_year_of(date).to_string(),
        Granularity::Quarter => format!(
            "{}-{}",
            calendar.fiscal_year_of(date),
            calendar.quarter_of(date)
        ),
        Granularity::Month => format!("{}-{}", date.year(), date.month()),
        Granularity::Week => format!(
            "{}-{}",
            calendar.fiscal_year_of(date),
            calendar.week_of(date)
        ),
        Granularity::Day => date.date().to_string(),
    }
}

fn level_text(level: Granularity, date: NaiveDateTime, calendar: &Calendar) -> (String, String) {
    match level {
        Granularity::Year => {
            let year = calendar.fiscal_year_of(date).to_string();
            (year.clone(), year)
        }
        Granularity::Quarter => {
            let quarter = calendar.quarter_of(date);
            (
                format!("Q{quarter}"),
                format!("Q{quarter} {}", calendar.fiscal_year_of(date)),
            )
        }
        Granularity::Month => (
            date.format("%b").to_string(),
            format!("{} {}", date.format("%B"), date.year()),
        ),
        Granularity::Week => {
            let week = calendar.week_of(date);
            (
                format!("W{week}"),
                format!("W{week} {}", calendar.fiscal_year_of(date)),
            )
        }
        Granularity::Day => (
            date.day().to_string(),
            format!("{} {} {}", date.day(), date.format("%b"), date.year()),
        ),
    }
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

    #[test]
    fn month_series_labels() {
        let calendar = Calendar::default();
        let series = PeriodSeries::build(
            date(2023, 1, 1),
            date(2024, 1, 1),
            Granularity::Month,
            &calendar,
        );

        let labels = extended_labels(&series, &calendar);

        assert_eq!(labels.year_labels.len(), 1);
        assert_eq!(labels.year_labels[0].text, "2023");
        assert_eq!(labels.year_labels[0].id, 0);

        assert_eq!(labels.quarter_labels.len(), 4);
        assert_eq!(labels.quarter_labels[1].text, "Q2");
        assert_eq!(labels.quarter_labels[1].title, "Q2 2023");
        assert_eq!(labels.quarter_labels[1].id, 3);

        assert_eq!(labels.month_labels.len(), 12);
        assert_eq!(labels.month_labels[0].text, "Jan");
        assert_eq!(labels.month_labels[0].title, "January 2023");

        // Finer levels than the granularity stay empty
        assert!(labels.week_labels.is_empty());
        assert!(labels.day_labels.is_empty());
    }

    #[test]
    fn day_series_labels() {
        let calendar = Calendar::default();
        let series = PeriodSeries::build(
            date(2023, 1, 30),
            date(2023, 2, 3),
            Granularity::Day,
            &calendar,
        );

        let labels = extended_labels(&series, &calendar);

        assert_eq!(labels.day_labels.len(), 4);
        assert_eq!(labels.day_labels[0].text, "30");
        assert_eq!(labels.day_labels[0].title, "30 Jan 2023");

        assert_eq!(labels.month_labels.len(), 2);
        assert_eq!(labels.month_labels[1].id, 2);
    }
}
