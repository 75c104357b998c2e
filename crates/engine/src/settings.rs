// SPDX-License-Identifier: GPL-3.0-or-later

//!
//! The settings bundle the host hands to the engine each update: calendar
//! configuration, granularity choice, force-selection policies, a date-span
//! clamp and the persisted filter window
//!

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use chronoslice_core::{CalendarConfig, Granularity};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// Everything the host persists for the slicer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SlicerSettings {
    pub calendar: CalendarSettings,
    pub week_day: WeekDaySettings,
    pub granularity: GranularitySettings,
    pub force_selection: ForceSelectionSettings,
    pub limit_date_span: LimitDateSpanSettings,
    pub general: GeneralSettings,
}

impl SlicerSettings {
    /// The fiscal calendar configuration, falling back to the default on an
    /// invalid month
    pub fn calendar_config(&self) -> CalendarConfig {
        match CalendarConfig::new(self.calendar.month, self.calendar.day) {
            Ok(config) => config,
            Err(error) => {
                warn!("Invalid calendar settings ({error}), using defaults");
                CalendarConfig::default()
            }
        }
    }

    /// The configured first day of week (0 = Sunday).  An out-of-range value
    /// degrades to Sunday
    pub fn week_start(&self) -> Weekday {
        match self.week_day.day {
            0 => Weekday::Sun,
            1 => Weekday::Mon,
            2 => Weekday::Tue,
            3 => Weekday::Wed,
            4 => Weekday::Thu,
            5 => Weekday::Fri,
            6 => Weekday::Sat,
            other => {
                debug!("Week day `{other}` out of range, using Sunday");
                Weekday::Sun
            }
        }
    }
}

/// Fiscal year start (month 1 = January)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CalendarSettings {
    pub month: u32,
    pub day: u32,
}

impl Default for CalendarSettings {
    fn default() -> Self {
        Self { month: 1, day: 1 }
    }
}

/// First day of week, 0 (Sunday) to 6 (Saturday)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WeekDaySettings {
    pub day: u32,
}

/// The chosen granularity and which granularities the user can pick from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GranularitySettings {
    pub granularity: Granularity,
    pub year_visibility: bool,
    pub quarter_visibility: bool,
    pub month_visibility: bool,
    pub week_visibility: bool,
    pub day_visibility: bool,
}

impl GranularitySettings {
    /// Check whether `granularity` is user-visible
    pub fn is_visible(&self, granularity: Granularity) -> bool {
        match granularity {
            Granularity::Year => self.year_visibility,
            Granularity::Quarter => self.quarter_visibility,
            Granularity::Month => self.month_visibility,
            Granularity::Week => self.week_visibility,
            Granularity::Day => self.day_visibility,
        }
    }
}

impl Default for GranularitySettings {
    fn default() -> Self {
        Self {
            granularity: Granularity::Month,
            year_visibility: true,
            quarter_visibility: true,
            month_visibility: true,
            week_visibility: true,
            day_visibility: true,
        }
    }
}

/// The force-selection policies.  Current-period takes precedence; latest
/// available date is only a fallback
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ForceSelectionSettings {
    pub current_period: bool,
    pub latest_available_date: bool,
}

impl ForceSelectionSettings {
    /// Check whether either policy is enabled
    pub fn is_enabled(&self) -> bool {
        self.current_period || self.latest_available_date
    }
}

/// An optional user-configured clamp on the available date range
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LimitDateSpanSettings {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl LimitDateSpanSettings {
    /// The lower clamp, if set and parseable
    pub fn start(&self) -> Option<NaiveDateTime> {
        self.start_date.as_deref().and_then(parse_date)
    }

    /// The upper clamp, if set and parseable
    pub fn end(&self) -> Option<NaiveDateTime> {
        self.end_date.as_deref().and_then(parse_date)
    }
}

/// Settings with no property-pane surface
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GeneralSettings {
    pub date_period: PersistedFilter,
}

/// The last externally committed selection, exactly
/// `{ startDate: ISO-8601 | null, endDate: ISO-8601 | null }` on the wire
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersistedFilter {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl PersistedFilter {
    /// The persisted window.  A bound that fails to parse is treated as
    /// absent, never surfaced as an error
    pub fn window(&self) -> (Option<NaiveDateTime>, Option<NaiveDateTime>) {
        (
            self.start_date.as_deref().and_then(parse_date),
            self.end_date.as_deref().and_then(parse_date),
        )
    }
}

/// Parse an ISO-8601 date or date-time.  Unparseable input degrades to `None`
pub(crate) fn parse_date(value: &str) -> Option<NaiveDateTime> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.naive_utc());
    }
    if let Ok(parsed) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(parsed);
    }
    if let Ok(parsed) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(parsed.and_time(NaiveTime::MIN));
    }
    debug!("Could not parse date `{value}`, treating as absent");
    None
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults() {
        let settings = SlicerSettings::default();
        assert_eq!(settings.granularity.granularity, Granularity::Month);
        assert_eq!(settings.week_start(), Weekday::Sun);
        assert!(!settings.force_selection.is_enabled());
        assert_eq!(settings.general.date_period.window(), (None, None));
        assert!(settings.granularity.is_visible(Granularity::Day));
    }

    #[test]
    fn parse_from_camel_case_json() {
        let json = r#"{
            "calendar": { "month": 4, "day": 1 },
            "weekDay": { "day": 1 },
            "granularity": { "granularity": "week", "dayVisibility": false },
            "forceSelection": { "currentPeriod": true },
            "general": {
                "datePeriod": {
                    "startDate": "2023-01-15T00:00:00.000Z",
                    "endDate": "2023-02-10T00:00:00.000Z"
                }
            }
        }"#;

        let settings: SlicerSettings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.calendar.month, 4);
        assert_eq!(settings.week_start(), Weekday::Mon);
        assert_eq!(settings.granularity.granularity, Granularity::Week);
        assert!(!settings.granularity.is_visible(Granularity::Day));
        assert!(settings.force_selection.current_period);
        assert!(!settings.force_selection.latest_available_date);

        let (start, end) = settings.general.date_period.window();
        assert_eq!(
            start,
            Some(NaiveDate::from_ymd_opt(2023, 1, 15).unwrap().and_time(NaiveTime::MIN))
        );
        assert!(end.is_some());
    }

    #[test]
    fn unparseable_bounds_degrade_to_none() {
        let filter = PersistedFilter {
            start_date: Some(String::from("not a date")),
            end_date: Some(String::from("2023-02-10")),
        };
        let (start, end) = filter.window();
        assert_eq!(start, None);
        assert_eq!(
            end,
            Some(NaiveDate::from_ymd_opt(2023, 2, 10).unwrap().and_time(NaiveTime::MIN))
        );
    }

    #[test]
    fn invalid_calendar_month_falls_back_to_default() {
        let mut settings = SlicerSettings::default();
        settings.calendar.month = 13;
        assert_eq!(settings.calendar_config(), CalendarConfig::default());
    }
}
