// SPDX-License-Identifier: GPL-3.0-or-later

//!
//! The bound data column: date or year values plus stable per-row identities.
//! The engine reads values for partitioning and only ever surfaces
//! identities, never inspects them
//!

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use thiserror::Error;
use uuid::Uuid;

/// Errors that make a data bind unusable
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BindError {
    /// The column carries no values
    #[error("Data bind has no values")]
    NoValues,

    /// The column carries no row identities
    #[error("Data bind has no row identities")]
    NoIdentities,

    /// Values and identities don't line up
    #[error("Data bind has {0} values but {1} identities")]
    LengthMismatch(usize, usize),

    /// No value could be read as a date
    #[error("Data bind has no readable dates")]
    NoReadableDates,
}

/// A stable per-row identity.  Used only for drag/context-menu addressing by
/// the rendering collaborator
#[rustfmt::skip]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(derive_more::Display, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct RowId(Uuid);

impl RowId {
    /// Create a new `RowId`
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a `RowId` from a string if the string is a valid UUID
    pub fn from<S: ToString>(string: S) -> Result<Self, uuid::Error> {
        let string = string.to_string();
        Ok(Self(Uuid::parse_str(&string)?))
    }
}

impl Default for RowId {
    fn default() -> Self {
        Self::new()
    }
}

/// Where the column came from in the host's data model
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ColumnSource {
    pub table: String,
    pub column: String,
}

/// The column the emitted filter applies to.  For numeric year-valued
/// columns the column reference is the synthetic `Date`
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterColumnTarget {
    pub table: String,
    pub column: String,
}

/// The granule source values
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValues {
    /// Date/time values
    Dates(Vec<NaiveDateTime>),

    /// Numeric year values; a year stands for the 1st of January of that year
    Years(Vec<i32>),
}

impl ColumnValues {
    /// The number of values
    pub fn len(&self) -> usize {
        match self {
            Self::Dates(values) => values.len(),
            Self::Years(values) => values.len(),
        }
    }

    /// Check if there are no values
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A categorical column of dates or years plus per-row identities
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryColumn {
    pub source: ColumnSource,
    pub values: ColumnValues,
    pub identities: Vec<RowId>,
}

impl CategoryColumn {
    /// Check the bind has the required shape
    pub fn validate(&self) -> Result<(), BindError> {
        if self.values.is_empty() {
            return Err(BindError::NoValues);
        }
        if self.identities.is_empty() {
            return Err(BindError::NoIdentities);
        }
        if self.values.len() != self.identities.len() {
            return Err(BindError::LengthMismatch(
                self.values.len(),
                self.identities.len(),
            ));
        }
        Ok(())
    }

    /// The earliest and latest value dates (both inclusive), if any value
    /// reads as a date
    pub fn date_range(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let mut earliest: Option<NaiveDateTime> = None;
        let mut latest: Option<NaiveDateTime> = None;

        for value in self.value_dates() {
            earliest = Some(earliest.map_or(value, |current| current.min(value)));
            latest = Some(latest.map_or(value, |current| current.max(value)));
        }

        Some((earliest?, latest?))
    }

    /// The column the emitted filter should address
    pub fn filter_target(&self) -> FilterColumnTarget {
        FilterColumnTarget {
            table: self.source.table.clone(),
            column: match self.values {
                ColumnValues::Dates(_) => self.source.column.clone(),
                ColumnValues::Years(_) => String::from("Date"),
            },
        }
    }

    fn value_dates(&self) -> Vec<NaiveDateTime> {
        match &self.values {
            ColumnValues::Dates(values) => values.clone(),
            ColumnValues::Years(values) => values
                .iter()
                .filter_map(|&year| NaiveDate::from_ymd_opt(year, 1, 1))
                .map(|date| date.and_time(NaiveTime::MIN))
                .collect(),
        }
    }
}
