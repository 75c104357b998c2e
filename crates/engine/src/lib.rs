// SPDX-License-Identifier: GPL-3.0-or-later

//!
//! *Part of the wider ChronoSlice project*
//!
//! The timeline selection engine: the data-bind column model, the settings
//! bundle, the selection state machine and the [`TimeSlicer`] orchestrator
//! that reconciles all of them into filter updates for the host.
//!
//! The engine is headless.  Rendering is a front-end collaborator's job; it
//! reads the query surface on [`TimeSlicer`] and feeds gestures back in.
//!

mod column;
mod filter;
mod selection;
mod settings;
mod slicer;

pub use column::*;
pub use filter::*;
pub use selection::*;
pub use settings::*;
pub use slicer::*;
