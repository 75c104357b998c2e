// SPDX-License-Identifier: MIT

//!
//! Date periods and the per-granularity period sequence, including the
//! separate/unseparate operations that let an arbitrary selection boundary be
//! represented inside a granularity's index space
//!

use crate::{Calendar, Granularity};
use chrono::NaiveDateTime;

/// One granule at some granularity, or a sub-slice of one after a split.
///
/// `index` is integer-valued until a period is split; the later piece of a
/// split carries the original index plus the earlier piece's fraction, so a
/// cursor at `index + fraction` sits exactly on the split boundary.  The
/// fractions of all pieces of one original period sum to 1
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DatePeriod {
    /// The period's start (inclusive)
    pub start_date: NaiveDateTime,

    /// The period's end (exclusive)
    pub end_date: NaiveDateTime,

    /// Position in fractional period-index units
    pub index: f64,

    /// Portion (0, 1] of the original period this piece covers
    pub fraction: f64,
}

impl DatePeriod {
    /// Check whether `date` falls within `[start_date, end_date)`
    pub fn contains(&self, date: NaiveDateTime) -> bool {
        self.start_date <= date && date < self.end_date
    }
}

/// One granularity's ordered sequence of [`DatePeriod`]s.  Periods are
/// contiguous and non-overlapping, and their union covers the built range
/// exactly
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodSeries {
    granularity: Granularity,
    periods: Vec<DatePeriod>,
}

impl PeriodSeries {
    /// Partition `[start_date, end_date)` by walking the calendar's period
    /// boundaries for `granularity`.  The first period starts at the exact
    /// range start and the last period's end is clamped to the range end;
    /// both carry fraction 1.0 (fraction encodes selection splits, not
    /// partial calendar coverage)
    pub fn build(
        start_date: NaiveDateTime,
        end_date: NaiveDateTime,
        granularity: Granularity,
        calendar: &Calendar,
    ) -> Self {
        let mut periods = Vec::new();
        let mut current = start_date;
        let mut index = 0.0;

        while current < end_date {
            let boundary = calendar.period(granularity, current).end_date;
            periods.push(DatePeriod {
                start_date: current,
                end_date: boundary.min(end_date),
                index,
                fraction: 1.0,
            });
            current = boundary;
            index += 1.0;
        }

        Self {
            granularity,
            periods,
        }
    }

    /// Get the series' granularity
    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    /// Get the ordered periods
    pub fn periods(&self) -> &[DatePeriod] {
        &self.periods
    }

    /// The number of periods (split pieces count individually)
    pub fn len(&self) -> usize {
        self.periods.len()
    }

    /// Check if the series holds no periods
    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    /// The first period, if any
    pub fn first(&self) -> Option<&DatePeriod> {
        self.periods.first()
    }

    /// The last period, if any
    pub fn last(&self) -> Option<&DatePeriod> {
        self.periods.last()
    }

    /// The position of the period containing `date`, if any
    pub fn position_of(&self, date: NaiveDateTime) -> Option<usize> {
        self.periods.iter().position(|period| period.contains(date))
    }

    /// Map a fractional-index offset to the position of the period covering
    /// it, clamping below the first and above the last period
    pub fn period_at_offset(&self, offset: f64) -> usize {
        let mut position = 0;
        for (candidate, period) in self.periods.iter().enumerate() {
            if period.index <= offset {
                position = candidate;
            } else {
                break;
            }
        }
        position
    }

    /// Split the period strictly containing `date` into two pieces meeting at
    /// `date`.  A boundary landing exactly on a period start is already
    /// representable and is left alone.  Fractions scale within
    /// already-split periods so the sum-to-1 invariant holds
    pub fn separate_at(&mut self, date: NaiveDateTime) {
        let Some(position) = self
            .periods
            .iter()
            .position(|period| period.start_date < date && date < period.end_date)
        else {
            return;
        };

        let period = self.periods[position];
        let total = (period.end_date - period.start_date).num_seconds() as f64;
        let elapsed = (date - period.start_date).num_seconds() as f64;
        let earlier_fraction = period.fraction * (elapsed / total);

        self.periods[position] = DatePeriod {
            start_date: period.start_date,
            end_date: date,
            index: period.index,
            fraction: earlier_fraction,
        };
        self.periods.insert(
            position + 1,
            DatePeriod {
                start_date: date,
                end_date: period.end_date,
                index: period.index + earlier_fraction,
                fraction: period.fraction - earlier_fraction,
            },
        );
    }

    /// Merge previously split pieces back into whole periods of fraction 1.0,
    /// restoring the pre-split sequence
    pub fn unseparate(&mut self) {
        let mut merged: Vec<DatePeriod> = Vec::with_capacity(self.periods.len());

        for period in self.periods.drain(..) {
            match merged.last_mut() {
                // A non-integer index marks a continuation piece
                Some(last) if period.index.fract() != 0.0 => {
                    last.end_date = period.end_date;
                    last.fraction = 1.0;
                }
                _ => merged.push(period),
            }
        }

        self.periods = merged;
    }

    /// Split at both selection bounds and return the positions bracketing
    /// them, clamped to the series
    pub fn separate(
        &mut self,
        start_date: NaiveDateTime,
        end_date: NaiveDateTime,
    ) -> (usize, usize) {
        if self.periods.is_empty() {
            return (0, 0);
        }

        self.separate_at(start_date);
        self.separate_at(end_date);

        let last = self.periods.len() - 1;
        let start = self
            .periods
            .iter()
            .position(|period| start_date < period.end_date)
            .unwrap_or(last);
        let end = self
            .periods
            .iter()
            .rposition(|period| period.start_date < end_date)
            .unwrap_or(0);

        (start, end.max(start))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::CalendarConfig;
    use chrono::{NaiveDate, NaiveTime, Weekday};

    fn date(year: i32, month: u32, day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(year, month, day)
            .unwrap()
            .and_time(NaiveTime::MIN)
    }

    fn months_2023() -> PeriodSeries {
        PeriodSeries::build(
            date(2023, 1, 1),
            date(2024, 1, 1),
            Granularity::Month,
            &Calendar::default(),
        )
    }

    #[test]
    fn build_months_over_2023() {
        let series = months_2023();
        assert_eq!(series.len(), 12);

        let january = series.periods()[0];
        assert_eq!(january.start_date, date(2023, 1, 1));
        assert_eq!(january.end_date, date(2023, 2, 1));
        assert_eq!(january.index, 0.0);
        assert_eq!(january.fraction, 1.0);

        let december = series.periods()[11];
        assert_eq!(december.start_date, date(2023, 12, 1));
        assert_eq!(december.end_date, date(2024, 1, 1));
        assert_eq!(december.index, 11.0);
    }

    #[test]
    fn partition_covers_range_exactly() {
        let start = date(2023, 1, 15);
        let end = date(2023, 4, 10);

        for granularity in Granularity::ALL {
            let calendar = Calendar::new(CalendarConfig::new(4, 1).unwrap(), Weekday::Wed);
            let series = PeriodSeries::build(start, end, granularity, &calendar);

            assert_eq!(series.first().unwrap().start_date, start);
            assert_eq!(series.last().unwrap().end_date, end);
            for pair in series.periods().windows(2) {
                assert_eq!(pair[0].end_date, pair[1].start_date);
                assert!(pair[0].start_date < pair[0].end_date);
            }
        }
    }

    #[test]
    fn trailing_period_is_clamped_with_whole_fraction() {
        let series = PeriodSeries::build(
            date(2023, 1, 1),
            date(2023, 2, 15),
            Granularity::Month,
            &Calendar::default(),
        );

        assert_eq!(series.len(), 2);
        assert_eq!(series.last().unwrap().end_date, date(2023, 2, 15));
        assert_eq!(series.last().unwrap().fraction, 1.0);
    }

    #[test]
    fn separate_splits_fractions_and_indices() {
        let mut series = months_2023();
        series.separate_at(date(2023, 1, 15));

        assert_eq!(series.len(), 13);

        let earlier = series.periods()[0];
        let later = series.periods()[1];
        assert_eq!(earlier.end_date, date(2023, 1, 15));
        assert_eq!(later.start_date, date(2023, 1, 15));
        assert!((earlier.fraction - 14.0 / 31.0).abs() < 1e-9);
        assert!((later.fraction - 17.0 / 31.0).abs() < 1e-9);
        assert!((earlier.fraction + later.fraction - 1.0).abs() < 1e-9);
        assert_eq!(earlier.index, 0.0);
        assert!((later.index - 14.0 / 31.0).abs() < 1e-9);

        // February is untouched, one position along
        assert_eq!(series.periods()[2].start_date, date(2023, 2, 1));
        assert_eq!(series.periods()[2].index, 1.0);
    }

    #[test]
    fn separate_on_existing_boundary_is_a_no_op() {
        let mut series = months_2023();
        series.separate_at(date(2023, 3, 1));
        assert_eq!(series.len(), 12);
    }

    #[test]
    fn unseparate_restores_original_sequence() {
        let original = months_2023();

        let mut series = original.clone();
        series.separate_at(date(2023, 1, 15));
        series.separate_at(date(2023, 2, 10));
        series.separate_at(date(2023, 1, 20));
        assert_eq!(series.len(), 15);

        series.unseparate();
        assert_eq!(series, original);
    }

    #[test]
    fn separate_returns_bracketing_positions() {
        let mut series = months_2023();
        let (start, end) = series.separate(date(2023, 1, 15), date(2023, 2, 10));

        // [Jan 1-15) [Jan 15-Feb 1) [Feb 1-10) [Feb 10-Mar 1) Mar ...
        assert_eq!((start, end), (1, 2));
        assert_eq!(series.periods()[start].start_date, date(2023, 1, 15));
        assert_eq!(series.periods()[end].end_date, date(2023, 2, 10));
    }

    #[test]
    fn separate_clamps_out_of_range_bounds() {
        let mut series = months_2023();
        let (start, end) = series.separate(date(2022, 6, 1), date(2024, 6, 1));
        assert_eq!((start, end), (0, 11));
    }

    #[test]
    fn period_at_offset_clamps() {
        let mut series = months_2023();
        series.separate_at(date(2023, 1, 15));

        assert_eq!(series.period_at_offset(-3.0), 0);
        assert_eq!(series.period_at_offset(0.1), 0);
        assert_eq!(series.period_at_offset(0.9), 1);
        assert_eq!(series.period_at_offset(1.5), 2);
        assert_eq!(series.period_at_offset(50.0), 12);
    }
}
