//! [`InMemoryStore`]: process-local [`EntryStore`] for tests, the CLI, and embedding.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use indexmap::IndexMap;
use shiftgrid_core::{EntryId, RecurringId, ScheduleRecord};
use tokio::sync::RwLock;

use super::{EntryFilter, EntryStore, StoreError};

/// Insertion-ordered in-memory record table.
///
/// [`set_offline`](InMemoryStore::set_offline) makes every call fail with
/// [`StoreError::Connectivity`], for exercising error paths.
#[derive(Default)]
pub struct InMemoryStore {
    records: RwLock<IndexMap<EntryId, ScheduleRecord>>,
    offline: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    fn check_online(&self) -> Result<(), StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            Err(StoreError::Connectivity("in-memory store is offline".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl EntryStore for InMemoryStore {
    async fn insert(&self, records: Vec<ScheduleRecord>) -> Result<(), StoreError> {
        self.check_online()?;
        let mut table = self.records.write().await;

        let mut batch_ids = std::collections::HashSet::with_capacity(records.len());
        for record in &records {
            if table.contains_key(&record.id) || !batch_ids.insert(record.id) {
                return Err(StoreError::Constraint(format!("duplicate id {}", record.id)));
            }
        }
        for record in records {
            table.insert(record.id, record);
        }
        Ok(())
    }

    async fn select(&self, filter: &EntryFilter) -> Result<Vec<ScheduleRecord>, StoreError> {
        self.check_online()?;
        let table = self.records.read().await;
        let mut out: Vec<ScheduleRecord> = table
            .values()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        // Stable sort keeps insertion order within a date.
        out.sort_by_key(|r| r.date);
        Ok(out)
    }

    async fn get(&self, id: EntryId) -> Result<ScheduleRecord, StoreError> {
        self.check_online()?;
        self.records
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn update(&self, record: ScheduleRecord) -> Result<(), StoreError> {
        self.check_online()?;
        let mut table = self.records.write().await;
        match table.get_mut(&record.id) {
            Some(slot) => {
                *slot = record;
                Ok(())
            }
            None => Err(StoreError::NotFound(record.id.to_string())),
        }
    }

    async fn delete(&self, id: EntryId) -> Result<(), StoreError> {
        self.check_online()?;
        self.records
            .write()
            .await
            .shift_remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn delete_series(&self, recurring_id: RecurringId) -> Result<usize, StoreError> {
        self.check_online()?;
        let mut table = self.records.write().await;
        let before = table.len();
        table.retain(|_, r| r.recurring_id != Some(recurring_id));
        Ok(before - table.len())
    }
}
