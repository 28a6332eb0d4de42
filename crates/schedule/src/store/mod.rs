//! Persistence collaborator boundary.
//!
//! The schedule core never talks to a database itself. Callers hand it an
//! [`EntryStore`] and the service loads and saves flat [`ScheduleRecord`]s
//! through it. Store failures are passed through unchanged.

mod memory;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use shiftgrid_core::{EntryId, EntryStatus, RecurringId, ScheduleRecord};

pub use self::memory::InMemoryStore;

/// Typed failures a store may report.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("record not found: {0}")]
    NotFound(String),

    #[error("constraint violation: {0}")]
    Constraint(String),

    #[error("store unreachable: {0}")]
    Connectivity(String),
}

/// Exact-match and date-range predicates for [`EntryStore::select`].
/// Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntryFilter {
    pub client_name: Option<String>,
    pub building_name: Option<String>,
    pub recurring_id: Option<RecurringId>,
    pub status: Option<EntryStatus>,
    /// Inclusive lower date bound.
    pub date_from: Option<NaiveDate>,
    /// Inclusive upper date bound.
    pub date_to: Option<NaiveDate>,
}

impl EntryFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn series(recurring_id: RecurringId) -> Self {
        Self {
            recurring_id: Some(recurring_id),
            ..Self::default()
        }
    }

    pub fn between(from: NaiveDate, to: NaiveDate) -> Self {
        Self {
            date_from: Some(from),
            date_to: Some(to),
            ..Self::default()
        }
    }

    pub fn with_client(mut self, client: impl Into<String>) -> Self {
        self.client_name = Some(client.into());
        self
    }

    pub fn with_building(mut self, building: impl Into<String>) -> Self {
        self.building_name = Some(building.into());
        self
    }

    pub fn with_status(mut self, status: EntryStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn matches(&self, record: &ScheduleRecord) -> bool {
        self.client_name.as_ref().map_or(true, |c| *c == record.client_name)
            && self.building_name.as_ref().map_or(true, |b| *b == record.building_name)
            && self.recurring_id.map_or(true, |r| record.recurring_id == Some(r))
            && self.status.map_or(true, |s| record.status == s)
            && self.date_from.map_or(true, |from| record.date >= from)
            && self.date_to.map_or(true, |to| record.date <= to)
    }
}

/// Create/read/update/delete over the schedule entry collection.
#[async_trait]
pub trait EntryStore: Send + Sync {
    /// Insert all records or none. Duplicate ids are a constraint violation.
    async fn insert(&self, records: Vec<ScheduleRecord>) -> Result<(), StoreError>;

    /// Matching records ordered by date, ties in insertion order.
    async fn select(&self, filter: &EntryFilter) -> Result<Vec<ScheduleRecord>, StoreError>;

    async fn get(&self, id: EntryId) -> Result<ScheduleRecord, StoreError>;

    /// Overwrite an existing record.
    async fn update(&self, record: ScheduleRecord) -> Result<(), StoreError>;

    async fn delete(&self, id: EntryId) -> Result<(), StoreError>;

    /// Delete every record of a series, returning how many were removed.
    async fn delete_series(&self, recurring_id: RecurringId) -> Result<usize, StoreError>;
}
