//! Recurring shift expansion.
//!
//! A [`RecurrencePattern`] describes when a shift repeats. This crate:
//! - validates patterns, collecting every violation before reporting
//! - enumerates the calendar dates a pattern covers inside a query window
//! - materializes those dates into [`ScheduleEntry`](shiftgrid_core::ScheduleEntry) values
//!
//! Everything here is pure: no I/O, no shared state.

mod error;
mod generate;
mod materialize;
mod pattern;


pub use error::{PatternViolation, RecurrenceError, Result};
pub use generate::{generate_occurrence_dates, series_dates};
pub use materialize::{expand, materialize, Expansion};
pub use pattern::{DateWindow, Frequency, RecurrencePattern, RecurringTask, SeriesEnd};
