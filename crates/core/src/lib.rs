// SPDX-License-Identifier: MIT

//!
//! *Part of the wider ChronoSlice project*
//!
//! This crate holds the calendar-aware date mathematics at the heart of the
//! ChronoSlice timeline selector: the fiscal calendar, the date-period
//! partitioner with its separate/unseparate split operations, the granularity
//! registry and the generated label data.
//!
//! Everything here is pure data and date arithmetic - the selection state
//! machine and host orchestration live in the `engine` crate, and rendering
//! is left entirely to a front-end collaborator.
//!

mod calendar;
mod granularity;
mod granularity_data;
mod labels;
mod period;

pub use calendar::*;
pub use granularity::*;
pub use granularity_data::*;
pub use labels::*;
pub use period::*;
