// SPDX-License-Identifier: GPL-3.0-or-later

//!
//! The selection index model: start/end positions into the active
//! granularity's periods plus the two draggable cursors
//!

use chrono::NaiveDateTime;
use chronoslice_core::PeriodSeries;

/// A draggable selection boundary marker.  `selection_index` is expressed in
/// fractional period-index units: the start cursor sits on a period's index,
/// the end cursor on `index + fraction` so it tracks the right edge of a
/// split piece
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CursorPoint {
    pub cursor_index: usize,
    pub selection_index: f64,
}

/// The selection start/end positions and cursor pair.  Invariants:
/// `start <= end` and `cursors[0].selection_index <= cursors[1].selection_index`
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionState {
    selection_start: usize,
    selection_end: usize,
    cursors: [CursorPoint; 2],
}

impl SelectionState {
    /// Create an empty selection at position 0
    pub fn new() -> Self {
        Self {
            selection_start: 0,
            selection_end: 0,
            cursors: [
                CursorPoint {
                    cursor_index: 0,
                    selection_index: 0.0,
                },
                CursorPoint {
                    cursor_index: 1,
                    selection_index: 0.0,
                },
            ],
        }
    }

    /// Select the full range of `series`
    pub fn initialize(&mut self, series: &PeriodSeries) {
        self.selection_start = 0;
        self.selection_end = series.len().saturating_sub(1);
        self.update_cursors(series);
    }

    /// Set the selection to `[start, end]` positions into `series`
    pub fn set(&mut self, start: usize, end: usize, series: &PeriodSeries) {
        self.selection_start = start.min(end);
        self.selection_end = end.max(start);
        self.update_cursors(series);
    }

    /// The selected start position
    pub fn start(&self) -> usize {
        self.selection_start
    }

    /// The selected end position (inclusive)
    pub fn end(&self) -> usize {
        self.selection_end
    }

    /// The two cursors, start cursor first
    pub fn cursors(&self) -> &[CursorPoint; 2] {
        &self.cursors
    }

    /// The start date of the selected range
    pub fn start_date(&self, series: &PeriodSeries) -> Option<NaiveDateTime> {
        series
            .periods()
            .get(self.selection_start)
            .map(|period| period.start_date)
    }

    /// The end date (exclusive) of the selected range
    pub fn end_date(&self, series: &PeriodSeries) -> Option<NaiveDateTime> {
        series
            .periods()
            .get(self.selection_end)
            .map(|period| period.end_date)
    }

    /// Move cursor 0 or 1 to the period at `position`.  A move that would
    /// cross the opposite boundary is rejected and nothing changes.  Returns
    /// whether the cursor moved
    pub fn drag_cursor(&mut self, cursor: usize, position: usize, series: &PeriodSeries) -> bool {
        let Some(period) = series.periods().get(position) else {
            return false;
        };

        match cursor {
            0 if position <= self.selection_end => {
                self.selection_start = position;
                self.cursors[0].selection_index = period.index;
                true
            }
            1 if position >= self.selection_start => {
                self.selection_end = position;
                self.cursors[1].selection_index = period.index + period.fraction;
                true
            }
            _ => false,
        }
    }

    /// Click the period at `position`.  Without the extend modifier the
    /// selection collapses to that single period; with it, the nearer
    /// boundary moves: the end cursor when the click is past the current end,
    /// the start cursor otherwise
    pub fn click_cell(&mut self, position: usize, extend: bool, series: &PeriodSeries) {
        let Some(period) = series.periods().get(position) else {
            return;
        };

        if extend {
            if position > self.selection_end {
                self.selection_end = position;
                self.cursors[1].selection_index = period.index + period.fraction;
            } else {
                self.selection_start = position;
                self.cursors[0].selection_index = period.index;
            }
        } else {
            self.selection_start = position;
            self.selection_end = position;
            self.cursors[0].selection_index = period.index;
            self.cursors[1].selection_index = period.index + period.fraction;
        }
    }

    /// Re-derive both cursors from the boundary periods
    pub fn update_cursors(&mut self, series: &PeriodSeries) {
        if let Some(period) = series.periods().get(self.selection_start) {
            self.cursors[0].selection_index = period.index;
        }
        if let Some(period) = series.periods().get(self.selection_end) {
            self.cursors[1].selection_index = period.index + period.fraction;
        }
    }
}

impl Default for SelectionState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chronoslice_core::{Calendar, Granularity};
    use chrono::{NaiveDate, NaiveTime};

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
    fn initialize_selects_full_range() {
        let series = months_2023();
        let mut selection = SelectionState::new();
        selection.initialize(&series);

        assert_eq!((selection.start(), selection.end()), (0, 11));
        assert_eq!(selection.cursors()[0].selection_index, 0.0);
        assert_eq!(selection.cursors()[1].selection_index, 12.0);
        assert_eq!(selection.start_date(&series), Some(date(2023, 1, 1)));
        assert_eq!(selection.end_date(&series), Some(date(2024, 1, 1)));
    }

    #[test]
    fn drag_rejects_crossing_moves() {
        let series = months_2023();
        let mut selection = SelectionState::new();
        selection.set(3, 6, &series);

        // End cursor cannot cross the start
        assert!(!selection.drag_cursor(1, 2, &series));
        assert_eq!((selection.start(), selection.end()), (3, 6));

        // Start cursor cannot cross the end
        assert!(!selection.drag_cursor(0, 7, &series));
        assert_eq!((selection.start(), selection.end()), (3, 6));

        // Legal moves land
        assert!(selection.drag_cursor(0, 5, &series));
        assert!(selection.drag_cursor(1, 5, &series));
        assert_eq!((selection.start(), selection.end()), (5, 5));
        assert!(selection.cursors()[0].selection_index <= selection.cursors()[1].selection_index);
    }

    #[test]
    fn click_collapses_to_single_period() {
        let series = months_2023();
        let mut selection = SelectionState::new();
        selection.initialize(&series);

        selection.click_cell(4, false, &series);
        assert_eq!((selection.start(), selection.end()), (4, 4));
        assert_eq!(selection.cursors()[0].selection_index, 4.0);
        assert_eq!(selection.cursors()[1].selection_index, 5.0);
    }

    #[test]
    fn extend_click_moves_nearer_boundary() {
        let series = months_2023();
        let mut selection = SelectionState::new();
        selection.set(5, 5, &series);

        // 3 < 5, so the start moves and the end stays
        selection.click_cell(3, true, &series);
        assert_eq!((selection.start(), selection.end()), (3, 5));

        // 9 > 5, so the end moves
        selection.click_cell(9, true, &series);
        assert_eq!((selection.start(), selection.end()), (3, 9));
    }

    #[test]
    fn end_cursor_tracks_split_piece_edge() {
        let mut series = months_2023();
        let (start, end) = series.separate(date(2023, 1, 15), date(2023, 2, 10));

        let mut selection = SelectionState::new();
        selection.set(start, end, &series);

        let start_period = series.periods()[start];
        let end_period = series.periods()[end];
        assert_eq!(selection.cursors()[0].selection_index, start_period.index);
        assert_eq!(
            selection.cursors()[1].selection_index,
            end_period.index + end_period.fraction
        );
    }
}
