//! Domain types shared by every shiftgrid crate.
//!
//! - [`ScheduleEntry`] and its flat persistence row [`ScheduleRecord`]
//! - the [`EntryStatus`] lifecycle state machine
//! - weekday numbering and naming helpers
//! - env-driven [`Config`]

pub mod config;
pub mod entry;
pub mod error;
pub mod status;
pub mod weekday;

pub use config::Config;
pub use entry::*;
pub use error::*;
pub use status::EntryStatus;
