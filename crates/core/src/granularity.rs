// SPDX-License-Identifier: MIT

//!
//! The five resolutions at which a date range can be partitioned
//!

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A resolution at which the date range is partitioned.  Ordered coarsest
/// first, so `a <= b` means "a is coarser than or equal to b"
#[rustfmt::skip]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(derive_more::Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    #[display("year")]
    Year,

    #[display("quarter")]
    Quarter,

    #[display("month")]
    Month,

    #[display("week")]
    Week,

    #[display("day")]
    Day,
}

impl Granularity {
    /// All granularities, coarsest first
    pub const ALL: [Granularity; 5] = [
        Granularity::Year,
        Granularity::Quarter,
        Granularity::Month,
        Granularity::Week,
        Granularity::Day,
    ];
}

/// The supplied string doesn't name a granularity
#[derive(Error, Debug, Clone)]
#[error("Granularity `{0}` is not recognised")]
pub struct ParseGranularityError(String);

impl std::str::FromStr for Granularity {
    type Err = ParseGranularityError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "year" => Ok(Granularity::Year),
            "quarter" => Ok(Granularity::Quarter),
            "month" => Ok(Granularity::Month),
            "week" => Ok(Granularity::Week),
            "day" => Ok(Granularity::Day),
            other => Err(ParseGranularityError(other.to_string())),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn ordering_is_coarsest_first() {
        assert!(Granularity::Year < Granularity::Day);
        assert!(Granularity::Month <= Granularity::Month);
        assert!(Granularity::Quarter < Granularity::Week);
    }

    #[test]
    fn serde_round_trip() {
        let json = serde_json::to_string(&Granularity::Quarter).unwrap();
        assert_eq!(json, r#""quarter""#);
        let parsed: Granularity = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, Granularity::Quarter);
    }

    #[test]
    fn from_str() {
        assert_eq!("week".parse::<Granularity>().unwrap(), Granularity::Week);
        assert!("fortnight".parse::<Granularity>().is_err());
    }
}
