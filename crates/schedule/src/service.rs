//! [`ScheduleService`]: the boundary between the pure core and the collaborators.
//!
//! Loads entries from an [`EntryStore`], runs expansion / reconciliation on
//! plain data, writes the results back, stamps `changed_by` from the
//! [`IdentityProvider`], and records each change in the [`ActivityLog`].

use std::sync::Arc;

use chrono::{Days, NaiveDate};
use shiftgrid_core::config::ScheduleConfig;
use shiftgrid_core::weekday::week_start;
use shiftgrid_core::{
    Config, EntryEdit, EntryId, EntryStatus, RecurringId, ScheduleEntry, ScheduleRecord,
    ShiftTemplate,
};
use shiftgrid_recurrence::{expand, DateWindow, Expansion, RecurringTask};
use tracing::{info, warn};

use crate::activity_log::{ActivityAction, ActivityLog};
use crate::error::Result;
use crate::grid::WeekGrid;
use crate::identity::IdentityProvider;
use crate::merge::{replace_series, SeriesMerge};
use crate::store::{EntryFilter, EntryStore};

/// One week of entries loaded for grid rendering.
#[derive(Debug, Clone)]
pub struct WeekEntries {
    pub week_start: NaiveDate,
    pub entries: Vec<ScheduleEntry>,
}

impl WeekEntries {
    pub fn grid(&self) -> WeekGrid<'_> {
        WeekGrid::assemble(&self.entries, self.week_start)
    }
}

pub struct ScheduleService {
    store: Arc<dyn EntryStore>,
    identity: Arc<dyn IdentityProvider>,
    activity: Arc<ActivityLog>,
    config: ScheduleConfig,
}

impl ScheduleService {
    pub fn new(
        store: Arc<dyn EntryStore>,
        identity: Arc<dyn IdentityProvider>,
        config: &Config,
    ) -> Self {
        Self {
            store,
            identity,
            activity: Arc::new(ActivityLog::with_max_entries(config.activity.max_entries)),
            config: config.schedule.clone(),
        }
    }

    pub fn activity(&self) -> &ActivityLog {
        &self.activity
    }

    fn changed_by(&self) -> Option<String> {
        self.identity.current_user().map(|u| u.display_name)
    }

    /// Load and decode entries. A stored row whose `day` or `is_recurring`
    /// disagrees with its other columns is an error.
    pub async fn load_entries(&self, filter: &EntryFilter) -> Result<Vec<ScheduleEntry>> {
        let records = self.store.select(filter).await?;
        let entries = records
            .into_iter()
            .map(ScheduleEntry::try_from)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    /// Create a single, non-recurring entry.
    pub async fn create_entry(&self, template: &ShiftTemplate, date: NaiveDate) -> Result<ScheduleEntry> {
        let who = self.changed_by();
        let mut entry = ScheduleEntry::from_template(template, date, None)?;
        entry.stamp(who.as_deref());

        self.store.insert(vec![ScheduleRecord::from(&entry)]).await?;

        info!(entry_id = %entry.id(), date = %date, "created entry");
        self.activity.record(
            entry.id(),
            ActivityAction::Created,
            who.as_deref(),
            format!(
                "{} / {} on {} ({})",
                entry.client_name,
                entry.building_name,
                entry.date,
                entry.day_name()
            ),
        );
        Ok(entry)
    }

    /// Window used when the caller gives none: the configured horizon for an
    /// open-ended series, otherwise the whole series.
    fn default_window(&self, task: &RecurringTask) -> DateWindow {
        let start = task.pattern.start_date;
        if task.pattern.is_indefinite() {
            DateWindow::horizon(start, self.config.horizon_days)
        } else {
            DateWindow::new(start, NaiveDate::MAX)
        }
    }

    /// Expand a recurring task and persist every occurrence in one insert.
    pub async fn create_series(&self, task: &RecurringTask, window: Option<DateWindow>) -> Result<Expansion> {
        let window = window.unwrap_or_else(|| self.default_window(task));
        let who = self.changed_by();

        let mut expansion = expand(&task.pattern, &task.template, window)?;
        for entry in &mut expansion.entries {
            entry.stamp(who.as_deref());
        }

        let records = expansion.entries.iter().map(ScheduleRecord::from).collect();
        self.store.insert(records).await?;

        info!(
            task_id = %task.pattern.task_id,
            kind = task.pattern.frequency.kind(),
            count = expansion.entries.len(),
            indefinite = expansion.indefinite,
            "created recurring series"
        );
        self.activity.record_with_details(
            task.pattern.task_id,
            ActivityAction::SeriesCreated,
            who.as_deref(),
            format!(
                "{} occurrences at {} / {}",
                expansion.entries.len(),
                task.template.client_name,
                task.template.building_name
            ),
            Some(serde_json::json!({
                "kind": task.pattern.frequency.kind(),
                "window_start": window.start,
                "window_end": window.end,
                "indefinite": expansion.indefinite,
            })),
        );
        Ok(expansion)
    }

    /// Regenerate a series after its pattern or template changed.
    ///
    /// Pending (`scheduled`) occurrences inside the window are replaced;
    /// occurrences already started, completed, or cancelled, and pending ones
    /// outside the window, are kept as they are. Regenerated entries are
    /// written before the replaced ones are deleted, and a failed delete puts
    /// the series back the way it was.
    pub async fn reschedule_series(&self, task: &RecurringTask, window: Option<DateWindow>) -> Result<SeriesMerge> {
        let recurring_id = task.pattern.task_id;
        let window = window.unwrap_or_else(|| self.default_window(task));
        let who = self.changed_by();

        let mut expansion = expand(&task.pattern, &task.template, window)?;
        for entry in &mut expansion.entries {
            entry.stamp(who.as_deref());
        }

        let mut series = self.load_entries(&EntryFilter::series(recurring_id)).await?;
        let previous: Vec<ScheduleRecord> = series.iter().map(ScheduleRecord::from).collect();
        let merge = replace_series(&mut series, recurring_id, window, expansion.entries);

        let removed: Vec<ScheduleRecord> = previous
            .into_iter()
            .filter(|r| merge.removed.contains(&r.id))
            .collect();
        let added: Vec<ScheduleRecord> = series
            .iter()
            .filter(|e| merge.added.contains(&e.id()))
            .map(ScheduleRecord::from)
            .collect();
        self.apply_series_change(removed, added).await?;

        info!(
            recurring_id = %recurring_id,
            kept = merge.kept.len(),
            removed = merge.removed.len(),
            added = merge.added.len(),
            "rescheduled series"
        );
        self.activity.record_with_details(
            recurring_id,
            ActivityAction::SeriesRescheduled,
            who.as_deref(),
            format!(
                "{} replaced by {}, {} kept",
                merge.removed.len(),
                merge.added.len(),
                merge.kept.len()
            ),
            serde_json::to_value(&merge).ok(),
        );
        Ok(merge)
    }

    /// Insert `added`, then delete `removed`. If a delete fails, the added
    /// records are deleted again and the ones already removed are restored.
    async fn apply_series_change(&self, removed: Vec<ScheduleRecord>, added: Vec<ScheduleRecord>) -> Result<()> {
        let added_ids: Vec<EntryId> = added.iter().map(|r| r.id).collect();
        self.store.insert(added).await?;

        let mut deleted = Vec::with_capacity(removed.len());
        for record in removed {
            if let Err(err) = self.store.delete(record.id).await {
                warn!(entry_id = %record.id, error = %err, "delete failed, rolling back series change");
                self.roll_back_series_change(&added_ids, deleted).await;
                return Err(err.into());
            }
            deleted.push(record);
        }
        Ok(())
    }

    async fn roll_back_series_change(&self, added_ids: &[EntryId], deleted: Vec<ScheduleRecord>) {
        for id in added_ids {
            if let Err(err) = self.store.delete(*id).await {
                warn!(entry_id = %id, error = %err, "rollback could not remove regenerated entry");
            }
        }
        let restored = deleted.len();
        if let Err(err) = self.store.insert(deleted).await {
            warn!(restored, error = %err, "rollback could not restore replaced entries");
        }
    }

    /// Move an entry along its lifecycle. Leaving a terminal state fails.
    pub async fn transition(&self, id: EntryId, next: EntryStatus) -> Result<ScheduleEntry> {
        let who = self.changed_by();
        let mut entry = ScheduleEntry::try_from(self.store.get(id).await?)?;
        let from = entry.status;

        entry.transition(next)?;
        entry.stamp(who.as_deref());
        self.store.update(ScheduleRecord::from(&entry)).await?;

        info!(entry_id = %id, from = %from, to = %next, "status changed");
        self.activity.record(
            id,
            ActivityAction::StatusChanged,
            who.as_deref(),
            format!("{from} -> {next}"),
        );
        Ok(entry)
    }

    pub async fn edit_entry(&self, id: EntryId, edit: &EntryEdit) -> Result<ScheduleEntry> {
        let who = self.changed_by();
        let mut entry = ScheduleEntry::try_from(self.store.get(id).await?)?;

        entry.apply_edit(edit)?;
        entry.stamp(who.as_deref());
        self.store.update(ScheduleRecord::from(&entry)).await?;

        info!(entry_id = %id, "edited entry");
        self.activity.record_with_details(
            id,
            ActivityAction::Edited,
            who.as_deref(),
            "entry edited",
            serde_json::to_value(edit).ok(),
        );
        Ok(entry)
    }

    pub async fn delete_entry(&self, id: EntryId) -> Result<()> {
        self.store.delete(id).await?;
        info!(entry_id = %id, "deleted entry");
        self.activity.record(id, ActivityAction::Deleted, self.changed_by().as_deref(), "entry deleted");
        Ok(())
    }

    /// Delete every occurrence of a series. Returns how many were removed.
    pub async fn delete_series(&self, recurring_id: RecurringId) -> Result<usize> {
        let removed = self.store.delete_series(recurring_id).await?;
        info!(recurring_id = %recurring_id, removed, "deleted series");
        self.activity.record(
            recurring_id,
            ActivityAction::SeriesDeleted,
            self.changed_by().as_deref(),
            format!("{removed} occurrences deleted"),
        );
        Ok(removed)
    }

    /// Entries for the configured week containing `date`.
    pub async fn week_entries(&self, date: NaiveDate) -> Result<WeekEntries> {
        let start = week_start(date, self.config.week_start);
        let end = start.checked_add_days(Days::new(6)).unwrap_or(NaiveDate::MAX);
        let entries = self.load_entries(&EntryFilter::between(start, end)).await?;
        Ok(WeekEntries {
            week_start: start,
            entries,
        })
    }
}
