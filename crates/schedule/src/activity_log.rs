//! In-memory activity log of schedule changes, for supervisors.
//!
//! Records are kept per subject (an entry id or a series id) and capped at a
//! configurable maximum (default 500) with FIFO eviction. Uses
//! `std::sync::RwLock` so it can be read from sync and async code alike.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What happened to the subject.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ActivityAction {
    Created,
    SeriesCreated,
    SeriesRescheduled,
    StatusChanged,
    Edited,
    Deleted,
    SeriesDeleted,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActivityRecord {
    pub timestamp: DateTime<Utc>,
    pub subject: Uuid,
    pub action: ActivityAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changed_by: Option<String>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Filters for [`ActivityLog::query`].
#[derive(Debug, Default, Deserialize)]
pub struct ActivityQuery {
    pub action: Option<ActivityAction>,
    /// Maximum number of records to return (default 100).
    pub limit: Option<u32>,
    /// Only records at or after this ISO 8601 timestamp.
    pub since: Option<String>,
}

pub struct ActivityLog {
    records: Arc<RwLock<HashMap<Uuid, VecDeque<ActivityRecord>>>>,
    max_per_subject: usize,
}

impl ActivityLog {
    /// Create a log with the default cap of 500 records per subject.
    pub fn new() -> Self {
        Self::with_max_entries(500)
    }

    pub fn with_max_entries(max: usize) -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
            max_per_subject: max.max(1),
        }
    }

    pub fn record(
        &self,
        subject: Uuid,
        action: ActivityAction,
        changed_by: Option<&str>,
        message: impl Into<String>,
    ) {
        self.record_with_details(subject, action, changed_by, message, None);
    }

    pub fn record_with_details(
        &self,
        subject: Uuid,
        action: ActivityAction,
        changed_by: Option<&str>,
        message: impl Into<String>,
        details: Option<serde_json::Value>,
    ) {
        let record = ActivityRecord {
            timestamp: Utc::now(),
            subject,
            action,
            changed_by: changed_by.map(str::to_string),
            message: message.into(),
            details,
        };

        let mut guard = self.records.write().expect("activity_log lock poisoned");
        let deque = guard.entry(subject).or_default();
        deque.push_back(record);
        while deque.len() > self.max_per_subject {
            deque.pop_front();
        }
    }

    /// Records for one subject, newest first.
    pub fn query(&self, subject: Uuid, params: &ActivityQuery) -> Vec<ActivityRecord> {
        let guard = self.records.read().expect("activity_log lock poisoned");
        let Some(deque) = guard.get(&subject) else {
            return Vec::new();
        };

        let since: Option<DateTime<Utc>> = params
            .since
            .as_ref()
            .and_then(|s| s.parse::<DateTime<Utc>>().ok());
        let limit = params.limit.unwrap_or(100) as usize;

        deque
            .iter()
            .rev()
            .filter(|r| params.action.map_or(true, |a| r.action == a))
            .filter(|r| since.map_or(true, |s| r.timestamp >= s))
            .take(limit)
            .cloned()
            .collect()
    }

    /// The most recent records across all subjects, newest first.
    pub fn recent(&self, limit: usize) -> Vec<ActivityRecord> {
        let guard = self.records.read().expect("activity_log lock poisoned");
        let mut all: Vec<ActivityRecord> = guard.values().flatten().cloned().collect();
        all.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        all.truncate(limit);
        all
    }

    pub fn clear(&self, subject: Uuid) {
        let mut guard = self.records.write().expect("activity_log lock poisoned");
        guard.remove(&subject);
    }
}

impl Default for ActivityLog {
    fn default() -> Self {
        Self::new()
    }
}
