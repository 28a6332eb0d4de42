//! Schedule reconciliation and the persistence boundary.
//!
//! This crate provides:
//! - [`ScheduleIndex`]: (client, building, weekday) lookup with double-booking counts
//! - [`WeekGrid`]: building × day layout for one week
//! - collection merge helpers for manual edits and regenerated series
//! - [`EntryStore`] / [`IdentityProvider`] collaborator traits with in-memory implementations
//! - [`ActivityLog`] for supervisor-facing change history
//! - [`ScheduleService`], which wires the above together

pub mod activity_log;
pub mod error;
pub mod grid;
pub mod identity;
pub mod index;
pub mod merge;
pub mod service;
pub mod store;

pub use activity_log::{ActivityAction, ActivityLog, ActivityQuery, ActivityRecord};
pub use error::{Result, ServiceError};
pub use grid::{GridCell, GridRow, WeekGrid};
pub use identity::{Identity, IdentityProvider, StaticIdentity};
pub use index::{GridKey, ScheduleIndex};
pub use merge::{merge_entries, remove_series, replace_series, MergeStats, SeriesMerge};
pub use service::ScheduleService;
pub use store::{EntryFilter, EntryStore, InMemoryStore, StoreError};
