// SPDX-License-Identifier: GPL-3.0-or-later

//!
//! The per-update orchestrator: derives the effective date window from the
//! bound data, reconciles persisted filters and force-selection policies,
//! maps user gestures onto the selection index model and pushes filter
//! updates to the host
//!

use crate::{
    BindError, CategoryColumn, CursorPoint, FilterColumnTarget, FilterSink, FilterUpdate,
    PropertyStore, RangeFilter, SelectionState, SlicerSettings,
};
use chrono::{Datelike, Days, Local, Months, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use chronoslice_core::{
    Calendar, DatePeriod, ExtendedLabels, Granularity, GranularityData, midnight,
};
use log::{debug, trace, warn};

/// The clock the engine asks for "now".  Injectable so hosts can pin a
/// reporting timezone and tests can pin a date
pub type Clock = Box<dyn Fn() -> NaiveDateTime>;

/// What the two boundary date-entry widgets should display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundaryInputData {
    pub min_date: NaiveDate,
    pub max_date: NaiveDate,
    pub start_value: NaiveDate,
    pub end_value: NaiveDate,
}

/// The timeline selection engine.
///
/// All mutation happens synchronously inside one update cycle or one gesture
/// call; filter emission and property persistence are fire-and-forget calls
/// on the supplied [`FilterSink`]/[`PropertyStore`]
pub struct TimeSlicer {
    settings: SlicerSettings,
    calendar: Calendar,
    granularity_data: Option<GranularityData>,
    active: Granularity,
    selection: SelectionState,
    target: Option<FilterColumnTarget>,
    boundary_input: Option<BoundaryInputData>,
    prev_filtered_start: Option<NaiveDateTime>,
    prev_filtered_end: Option<NaiveDateTime>,
    force_selection_reset: bool,
    initialized: bool,
    now: Clock,
}

impl TimeSlicer {
    /// Create an engine reading the local clock
    pub fn new() -> Self {
        Self::with_clock(Box::new(|| Local::now().naive_local()))
    }

    /// Create an engine with an injected clock
    pub fn with_clock(now: Clock) -> Self {
        Self {
            settings: SlicerSettings::default(),
            calendar: Calendar::default(),
            granularity_data: None,
            active: Granularity::Month,
            selection: SelectionState::new(),
            target: None,
            boundary_input: None,
            prev_filtered_start: None,
            prev_filtered_end: None,
            force_selection_reset: false,
            initialized: false,
            now,
        }
    }

    //--------------------------------------------------------------------------
    // The update cycle
    //--------------------------------------------------------------------------

    /// Run one update cycle against a (possibly new) data bind and settings
    /// bundle.  An invalid bind clears all engine state and reports not-ready
    pub fn update(
        &mut self,
        column: &CategoryColumn,
        settings: SlicerSettings,
        sink: &mut dyn FilterSink,
    ) -> Result<(), BindError> {
        if let Err(error) = column.validate() {
            warn!("Rejected data bind: {error}");
            self.clear();
            return Err(error);
        }
        let Some((mut first, mut last)) = column.date_range() else {
            warn!("Rejected data bind: no readable dates");
            self.clear();
            return Err(BindError::NoReadableDates);
        };
        self.settings = settings;

        // User-configured date-span clamp.  A limit that would empty the
        // range is ignored
        if let Some(limit) = self.settings.limit_date_span.start() {
            if first < limit && limit <= last {
                first = limit;
            }
        }
        if let Some(limit) = self.settings.limit_date_span.end() {
            if last > limit && limit >= first {
                last = limit;
            }
        }

        // Calendar configuration, compared by value
        let config = self.settings.calendar_config();
        let week_start = self.settings.week_start();
        if self.calendar.is_changed(config, week_start) {
            debug!("Calendar configuration changed");
            self.calendar = Calendar::new(config, week_start);
        }

        // The registry covers [first, day after last)
        let range_start = first;
        let range_end = self.calendar.next_date(last);

        // A changed data range resets the machine to uninitialized
        let previous_selection = self.selected_dates();
        match &self.granularity_data {
            Some(data) if data.start_date() == range_start && data.end_date() == range_end => {}
            _ => {
                if self.initialized {
                    debug!("Available date range changed, reselecting the full range");
                }
                self.initialized = false;
            }
        }

        // Rebuild the registry and re-separate at the previously selected
        // dates so the user's range survives data and calendar changes
        let mut data = GranularityData::new(range_start, range_end);
        data.create_granularities(&self.calendar);
        data.create_labels(&self.calendar);
        self.granularity_data = Some(data);
        self.target = Some(column.filter_target());
        self.active = self.settings.granularity.granularity;

        if self.initialized {
            if let Some((start_date, end_date)) = previous_selection {
                self.apply_selection_dates(start_date, end_date);
            }
        } else {
            if let Some(data) = self.granularity_data.as_ref() {
                self.selection.initialize(data.series(self.active));
            }
            self.initialized = true;
        }

        // Persisted filter bounds from a different, now-narrower bind are
        // discarded
        let (mut filter_start, mut filter_end) = self.settings.general.date_period.window();
        if let Some(start_date) = filter_start {
            if start_date < range_start {
                debug!("Discarding stale persisted filter start {start_date}");
                filter_start = None;
            }
        }
        if let Some(end_date) = filter_end {
            if end_date > range_end {
                debug!("Discarding stale persisted filter end {end_date}");
                filter_end = None;
            }
        }

        // Force selection.  Current-period is tried first; latest-available
        // only runs when current-period is off or found nothing.  The
        // one-shot reset flag suppresses both for exactly one cycle
        let is_current =
            !self.force_selection_reset && self.settings.force_selection.current_period;
        let is_latest =
            !self.force_selection_reset && self.settings.force_selection.latest_available_date;
        let is_forced = is_current || is_latest;
        self.force_selection_reset = false;

        if is_current {
            let today = midnight((self.now)());
            (filter_start, filter_end) = self.force_window(range_start, last, today);
            debug!("Force selection (current period): {filter_start:?}..{filter_end:?}");
        }
        if is_latest && (!is_current || (filter_start.is_none() && filter_end.is_none())) {
            (filter_start, filter_end) = self.force_window(range_start, last, last);
            debug!("Force selection (latest available date): {filter_start:?}..{filter_end:?}");
        }

        let was_filter_changed =
            filter_start != self.prev_filtered_start || filter_end != self.prev_filtered_end;
        if is_forced && was_filter_changed {
            self.apply_date_period(filter_start, filter_end, sink);
        }

        // The boundary inputs always reflect the effective range
        let (start_value, end_value) = match (filter_start, filter_end) {
            (Some(start_date), Some(end_date)) => (start_date, end_date - Days::new(1)),
            _ => (range_start, last),
        };
        self.boundary_input = Some(BoundaryInputData {
            min_date: range_start.date(),
            max_date: last.date(),
            start_value: start_value.date(),
            end_value: end_value.date(),
        });

        self.prev_filtered_start = filter_start;
        self.prev_filtered_end = filter_end;

        if let (Some(start_date), Some(end_date)) = (filter_start, filter_end) {
            self.apply_selection_dates(start_date, end_date);
        }

        Ok(())
    }

    //--------------------------------------------------------------------------
    // Gestures
    //--------------------------------------------------------------------------

    /// Drag cursor 0 or 1 to a fractional-index offset.  A position that
    /// would cross the opposite cursor is a no-op.  Returns whether the
    /// cursor moved (so the caller knows whether to re-render)
    pub fn drag_cursor(&mut self, cursor: usize, offset: f64) -> bool {
        let Some(data) = self.granularity_data.as_ref() else {
            return false;
        };
        let series = data.series(self.active);
        if series.is_empty() {
            return false;
        }

        let position = series.period_at_offset(offset);
        let moved = self.selection.drag_cursor(cursor, position, series);
        trace!("Cursor {cursor} drag to position {position}: moved = {moved}");
        moved
    }

    /// Commit the dragged selection
    pub fn drag_end(&mut self, sink: &mut dyn FilterSink, store: &mut dyn PropertyStore) {
        if !self.is_ready() {
            return;
        }
        self.commit_selection(sink);
        self.disable_force_selection(store);
    }

    /// Click the period at `position`.  Without `extend` the selection
    /// collapses to the clicked period; with it, the nearer boundary moves
    pub fn click_cell(
        &mut self,
        position: usize,
        extend: bool,
        sink: &mut dyn FilterSink,
        store: &mut dyn PropertyStore,
    ) {
        {
            let Some(data) = self.granularity_data.as_ref() else {
                return;
            };
            let series = data.series(self.active);
            if position >= series.len() {
                trace!("Click at position {position} maps to no period");
                return;
            }
            self.selection.click_cell(position, extend, series);
        }
        self.commit_selection(sink);
        self.disable_force_selection(store);
    }

    /// Switch the active granularity, keeping the selected date range
    /// representable: unseparate the old series, separate the new one at the
    /// previous start/end dates
    pub fn change_granularity(&mut self, granularity: Granularity, store: &mut dyn PropertyStore) {
        if self.active == granularity {
            return;
        }
        debug!("Granularity {} -> {granularity}", self.active);
        store.persist_granularity(granularity);
        self.settings.granularity.granularity = granularity;

        let previous_selection = self.selected_dates();
        if let Some(data) = self.granularity_data.as_mut() {
            data.series_mut(self.active).unseparate();
        }
        self.active = granularity;
        if let Some((start_date, end_date)) = previous_selection {
            self.apply_selection_dates(start_date, end_date);
        }
    }

    /// Apply the two boundary date inputs (both inclusive calendar dates)
    pub fn set_boundary_dates(
        &mut self,
        start: NaiveDate,
        end: NaiveDate,
        sink: &mut dyn FilterSink,
        store: &mut dyn PropertyStore,
    ) {
        if start > end {
            debug!("Boundary dates {start} > {end}, ignoring");
            return;
        }
        self.select_window(start, end, sink, store);
    }

    /// Select the current Gregorian month, clamped to the available range
    pub fn select_this_month(&mut self, sink: &mut dyn FilterSink, store: &mut dyn PropertyStore) {
        let today = (self.now)().date();
        if let Some((start, end)) = month_window(today.year(), today.month()) {
            self.select_window(start, end, sink, store);
        }
    }

    /// Select the current Gregorian year, clamped to the available range
    pub fn select_this_year(&mut self, sink: &mut dyn FilterSink, store: &mut dyn PropertyStore) {
        let today = (self.now)().date();
        if let Some((start, end)) = year_window(today.year()) {
            self.select_window(start, end, sink, store);
        }
    }

    /// Select the previous Gregorian month, clamped to the available range
    pub fn select_last_month(&mut self, sink: &mut dyn FilterSink, store: &mut dyn PropertyStore) {
        let today = (self.now)().date();
        let previous = match month_window(today.year(), today.month()) {
            Some((first, _)) => first - Days::new(1),
            None => return,
        };
        if let Some((start, end)) = month_window(previous.year(), previous.month()) {
            self.select_window(start, end, sink, store);
        }
    }

    /// Select the previous Gregorian year, clamped to the available range
    pub fn select_last_year(&mut self, sink: &mut dyn FilterSink, store: &mut dyn PropertyStore) {
        let today = (self.now)().date();
        if let Some((start, end)) = year_window(today.year() - 1) {
            self.select_window(start, end, sink, store);
        }
    }

    /// Select from the start of the current month up to today
    pub fn select_month_to_date(
        &mut self,
        sink: &mut dyn FilterSink,
        store: &mut dyn PropertyStore,
    ) {
        let today = (self.now)().date();
        if let Some((start, _)) = month_window(today.year(), today.month()) {
            self.select_window(start, today, sink, store);
        }
    }

    /// Select from the start of the current year up to today
    pub fn select_year_to_date(
        &mut self,
        sink: &mut dyn FilterSink,
        store: &mut dyn PropertyStore,
    ) {
        let today = (self.now)().date();
        if let Some((start, _)) = year_window(today.year()) {
            self.select_window(start, today, sink, store);
        }
    }

    /// Reset to the full range: emit filter removal, restore the full-range
    /// selection and turn any force-selection policy off
    pub fn clear_selection(&mut self, sink: &mut dyn FilterSink, store: &mut dyn PropertyStore) {
        if !self.is_ready() {
            return;
        }
        debug!("Clearing user selection");
        self.clear_filter(sink);
        self.disable_force_selection(store);

        if let Some(data) = self.granularity_data.as_mut() {
            data.series_mut(self.active).unseparate();
        }
        if let Some(data) = self.granularity_data.as_ref() {
            self.selection.initialize(data.series(self.active));
        }
    }

    //--------------------------------------------------------------------------
    // Query surface for the rendering collaborator
    //--------------------------------------------------------------------------

    /// Check whether a valid bind has been processed
    pub fn is_ready(&self) -> bool {
        self.initialized && self.granularity_data.is_some()
    }

    /// The active granularity
    pub fn granularity(&self) -> Granularity {
        self.active
    }

    /// The active granularity's periods (empty when not ready)
    pub fn periods(&self) -> &[DatePeriod] {
        self.granularity_data
            .as_ref()
            .map(|data| data.series(self.active).periods())
            .unwrap_or(&[])
    }

    /// The selected start/end positions (both inclusive)
    pub fn selection(&self) -> (usize, usize) {
        (self.selection.start(), self.selection.end())
    }

    /// The two cursors, start cursor first
    pub fn cursor_points(&self) -> &[CursorPoint; 2] {
        self.selection.cursors()
    }

    /// The active granularity's label data
    pub fn labels(&self) -> Option<&ExtendedLabels> {
        self.granularity_data
            .as_ref()
            .map(|data| data.labels(self.active))
    }

    /// The selected start/end dates (end exclusive)
    pub fn selected_dates(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let data = self.granularity_data.as_ref()?;
        let series = data.series(self.active);
        Some((
            self.selection.start_date(series)?,
            self.selection.end_date(series)?,
        ))
    }

    /// The selected range header, e.g. `15 Jan 2023 - 10 Feb 2023`
    /// (inclusive display)
    pub fn range_header_text(&self) -> String {
        let Some((start_date, end_date)) = self.selected_dates() else {
            return String::new();
        };
        let inclusive_end = (end_date - TimeDelta::seconds(1)).date();
        format!(
            "{} - {}",
            long_date(start_date.date()),
            long_date(inclusive_end)
        )
    }

    /// Check whether the period at `position` lies inside the selection
    pub fn is_period_selected(&self, position: usize) -> bool {
        self.selection.start() <= position && position <= self.selection.end()
    }

    /// The granularities the user can pick from, coarsest first
    pub fn visible_granularities(&self) -> Vec<Granularity> {
        Granularity::ALL
            .into_iter()
            .filter(|&granularity| self.settings.granularity.is_visible(granularity))
            .collect()
    }

    /// What the boundary date inputs should display
    pub fn boundary_input(&self) -> Option<&BoundaryInputData> {
        self.boundary_input.as_ref()
    }

    /// The settings as of the last update (including in-cycle gesture edits)
    pub fn settings(&self) -> &SlicerSettings {
        &self.settings
    }

    /// The calendar as of the last update
    pub fn calendar(&self) -> &Calendar {
        &self.calendar
    }

    //--------------------------------------------------------------------------
    // Internals
    //--------------------------------------------------------------------------

    /// The period bracketing `at` under the active granularity, or
    /// (None, None) when it misses the available data.  `range_end` is the
    /// latest value date, inclusive
    fn force_window(
        &self,
        range_start: NaiveDateTime,
        range_end: NaiveDateTime,
        at: NaiveDateTime,
    ) -> (Option<NaiveDateTime>, Option<NaiveDateTime>) {
        let span = self.calendar.period(self.active, at);

        if self.active == Granularity::Day {
            let available = (range_start <= span.start_date && span.end_date <= range_end)
                || span.start_date == range_end;
            if !available {
                return (None, None);
            }
        } else {
            let start_available =
                range_start <= span.start_date && span.start_date <= range_end;
            let end_available = range_start <= span.end_date && span.end_date <= range_end;
            if !start_available && !end_available {
                return (None, None);
            }
        }

        (Some(span.start_date), Some(span.end_date))
    }

    /// Separate the active series at the selection bounds and update the
    /// selection indices and cursors
    fn apply_selection_dates(&mut self, start_date: NaiveDateTime, end_date: NaiveDateTime) {
        let Some(data) = self.granularity_data.as_mut() else {
            return;
        };
        let series = data.series_mut(self.active);
        series.unseparate();
        let (start, end) = series.separate(start_date, end_date);
        self.selection.set(start, end, data.series(self.active));
    }

    /// Emit the committed selection.  A full-range selection is
    /// indistinguishable from no filter and collapses to a removal
    fn commit_selection(&mut self, sink: &mut dyn FilterSink) {
        let Some(data) = self.granularity_data.as_ref() else {
            return;
        };
        let full_range = (data.start_date(), data.end_date());
        let Some((start_date, end_date)) = self.selected_dates() else {
            return;
        };

        if (start_date, end_date) == full_range {
            self.clear_filter(sink);
            return;
        }
        self.apply_date_period(Some(start_date), Some(end_date), sink);
    }

    /// Push a bounded filter when both bounds are present, a removal
    /// otherwise
    fn apply_date_period(
        &self,
        start_date: Option<NaiveDateTime>,
        end_date: Option<NaiveDateTime>,
        sink: &mut dyn FilterSink,
    ) {
        match (start_date, end_date, self.target.clone()) {
            (Some(start_date), Some(end_date), Some(target)) => {
                debug!("Pushing filter [{start_date}, {end_date})");
                sink.push_filter(FilterUpdate::Apply(RangeFilter::new(
                    target, start_date, end_date,
                )));
            }
            _ => {
                debug!("Pushing filter removal");
                sink.push_filter(FilterUpdate::Remove);
            }
        }
    }

    /// Push a filter removal and forget the previously emitted window
    fn clear_filter(&mut self, sink: &mut dyn FilterSink) {
        self.prev_filtered_start = None;
        self.prev_filtered_end = None;
        debug!("Pushing filter removal");
        sink.push_filter(FilterUpdate::Remove);
    }

    /// A committing gesture turns any enabled force-selection policy off and
    /// arms the one-shot reset flag
    fn disable_force_selection(&mut self, store: &mut dyn PropertyStore) {
        if !self.settings.force_selection.is_enabled() {
            return;
        }
        debug!("Disabling force selection after explicit user gesture");
        store.persist_force_selection_disabled();
        self.settings.force_selection.current_period = false;
        self.settings.force_selection.latest_available_date = false;
        self.force_selection_reset = true;
    }

    /// Select `[start, end]` (inclusive dates) intersected with the
    /// available range.  An empty intersection is a no-op
    fn select_window(
        &mut self,
        start: NaiveDate,
        end: NaiveDate,
        sink: &mut dyn FilterSink,
        store: &mut dyn PropertyStore,
    ) {
        let Some(data) = self.granularity_data.as_ref() else {
            return;
        };
        let available = (data.start_date(), data.end_date());

        let start_date = start.and_time(NaiveTime::MIN).max(available.0);
        let end_date = (end + Days::new(1)).and_time(NaiveTime::MIN).min(available.1);
        if start_date >= end_date {
            debug!("Window {start}..{end} misses the available range");
            return;
        }

        self.apply_selection_dates(start_date, end_date);
        self.commit_selection(sink);
        self.disable_force_selection(store);
    }

    /// Drop all engine state after an unusable bind
    fn clear(&mut self) {
        self.granularity_data = None;
        self.target = None;
        self.boundary_input = None;
        self.selection = SelectionState::new();
        self.initialized = false;
    }
}

impl Default for TimeSlicer {
    fn default() -> Self {
        Self::new()
    }
}

/// `[1st, last day]` of the given Gregorian month
fn month_window(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    Some((first, (first + Months::new(1)) - Days::new(1)))
}

/// `[1 Jan, 31 Dec]` of the given Gregorian year
fn year_window(year: i32) -> Option<(NaiveDate, NaiveDate)> {
    Some((
        NaiveDate::from_ymd_opt(year, 1, 1)?,
        NaiveDate::from_ymd_opt(year, 12, 31)?,
    ))
}

/// e.g. `15 Jan 2023`
fn long_date(date: NaiveDate) -> String {
    format!("{} {} {}", date.day(), date.format("%b"), date.year())
}
