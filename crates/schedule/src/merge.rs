//! Merging new and regenerated entries into a caller-owned collection.
//!
//! The collection is a plain `Vec<ScheduleEntry>` owned by the caller. Nothing
//! here keeps state between calls; concurrent edits to the same series are
//! last-write-wins.

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;
use shiftgrid_core::{EntryId, EntryStatus, RecurringId, ScheduleEntry};
use shiftgrid_recurrence::DateWindow;
use tracing::{debug, warn};

/// Counts from [`merge_entries`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MergeStats {
    pub inserted: usize,
    pub replaced: usize,
}

/// Upsert by id. Replaced entries keep their position; new ones are appended
/// in the order given. Entries not mentioned in `incoming` are untouched.
pub fn merge_entries(
    existing: &mut Vec<ScheduleEntry>,
    incoming: impl IntoIterator<Item = ScheduleEntry>,
) -> MergeStats {
    let mut positions: HashMap<EntryId, usize> = existing
        .iter()
        .enumerate()
        .map(|(i, e)| (e.id(), i))
        .collect();
    let mut stats = MergeStats::default();

    for entry in incoming {
        match positions.get(&entry.id()) {
            Some(&i) => {
                existing[i] = entry;
                stats.replaced += 1;
            }
            None => {
                positions.insert(entry.id(), existing.len());
                existing.push(entry);
                stats.inserted += 1;
            }
        }
    }

    debug!(inserted = stats.inserted, replaced = stats.replaced, "merged entries");
    stats
}

/// Remove every entry of a series, returning them in their original order.
pub fn remove_series(existing: &mut Vec<ScheduleEntry>, recurring_id: RecurringId) -> Vec<ScheduleEntry> {
    let (removed, kept): (Vec<_>, Vec<_>) = existing
        .drain(..)
        .partition(|e| e.recurring_id() == Some(recurring_id));
    *existing = kept;
    debug!(recurring_id = %recurring_id, removed = removed.len(), "removed series");
    removed
}

/// Outcome of [`replace_series`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct SeriesMerge {
    /// Ids of series entries left in place: history, or pending entries
    /// outside the window.
    pub kept: Vec<EntryId>,
    /// Ids of `scheduled` entries inside the window, dropped in favor of the
    /// regenerated ones.
    pub removed: Vec<EntryId>,
    /// Ids of regenerated entries added to the collection.
    pub added: Vec<EntryId>,
    /// Regenerated entries not added: date already held by a series entry,
    /// dated outside the window, or belonging to a different series.
    pub skipped: usize,
}

/// Swap a series' pending occurrences inside `window` for a freshly
/// generated set.
///
/// Only `scheduled` entries dated inside the window are replaced. Entries that
/// are in progress, completed, or cancelled are history and stay as they are;
/// no regenerated entry is added on a date a remaining series entry holds, so
/// a cancelled occurrence is never brought back. Pending entries outside the
/// window are left alone.
pub fn replace_series(
    existing: &mut Vec<ScheduleEntry>,
    recurring_id: RecurringId,
    window: DateWindow,
    regenerated: Vec<ScheduleEntry>,
) -> SeriesMerge {
    let mut merge = SeriesMerge::default();

    existing.retain(|e| {
        if e.recurring_id() != Some(recurring_id) {
            return true;
        }
        if e.status == EntryStatus::Scheduled && window.contains(e.date) {
            merge.removed.push(e.id());
            false
        } else {
            merge.kept.push(e.id());
            true
        }
    });

    let mut held: BTreeSet<_> = existing
        .iter()
        .filter(|e| e.recurring_id() == Some(recurring_id))
        .map(|e| e.date)
        .collect();

    for entry in regenerated {
        if entry.recurring_id() != Some(recurring_id) {
            warn!(
                recurring_id = %recurring_id,
                entry_id = %entry.id(),
                "regenerated entry belongs to another series, skipping"
            );
            merge.skipped += 1;
            continue;
        }
        if !window.contains(entry.date) || !held.insert(entry.date) {
            merge.skipped += 1;
            continue;
        }
        merge.added.push(entry.id());
        existing.push(entry);
    }

    debug!(
        recurring_id = %recurring_id,
        kept = merge.kept.len(),
        removed = merge.removed.len(),
        added = merge.added.len(),
        skipped = merge.skipped,
        "replaced series"
    );
    merge
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use shiftgrid_core::{EntryEdit, ShiftTemplate};
    use uuid::Uuid;

    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn template() -> ShiftTemplate {
        ShiftTemplate {
            client_name: "Acme".into(),
            building_name: "Tower A".into(),
            cleaner_names: vec!["Rosa".into()],
            hours: 3.0,
            start_time: None,
        }
    }

    fn series(rid: RecurringId, days: &[u32]) -> Vec<ScheduleEntry> {
        days.iter()
            .map(|day| ScheduleEntry::from_template(&template(), d(2024, 1, *day), Some(rid)).unwrap())
            .collect()
    }

    fn january() -> DateWindow {
        DateWindow::new(d(2024, 1, 1), d(2024, 1, 31))
    }

    #[test]
    fn merge_replaces_in_place_and_appends_new() {
        let mut existing = series(Uuid::new_v4(), &[1, 2, 3]);
        let mut edited = existing[1].clone();
        edited
            .apply_edit(&EntryEdit {
                hours: Some(6.0),
                ..Default::default()
            })
            .unwrap();
        let fresh = ScheduleEntry::from_template(&template(), d(2024, 1, 9), None).unwrap();

        let stats = merge_entries(&mut existing, vec![edited.clone(), fresh.clone()]);
        assert_eq!(stats, MergeStats { inserted: 1, replaced: 1 });
        assert_eq!(existing.len(), 4);
        assert_eq!(existing[1], edited);
        assert_eq!(existing[3], fresh);
    }

    #[test]
    fn merge_same_new_id_twice_keeps_last() {
        let mut existing = Vec::new();
        let first = ScheduleEntry::from_template(&template(), d(2024, 1, 1), None).unwrap();
        let mut second = first.clone();
        second.hours = 9.0;
        let stats = merge_entries(&mut existing, vec![first, second]);
        assert_eq!(stats, MergeStats { inserted: 1, replaced: 1 });
        assert_eq!(existing.len(), 1);
        assert_eq!(existing[0].hours, 9.0);
    }

    #[test]
    fn remove_series_leaves_other_entries() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let mut existing = series(a, &[1, 2]);
        existing.extend(series(b, &[3]));
        existing.push(ScheduleEntry::from_template(&template(), d(2024, 1, 4), None).unwrap());

        let removed = remove_series(&mut existing, a);
        assert_eq!(removed.len(), 2);
        assert_eq!(existing.len(), 2);
        assert!(existing.iter().all(|e| e.recurring_id() != Some(a)));
    }

    #[test]
    fn replace_series_keeps_history_and_swaps_pending() {
        let rid = Uuid::new_v4();
        let mut existing = series(rid, &[1, 8, 15, 22]);
        existing[0].transition(EntryStatus::InProgress).unwrap();
        existing[0].transition(EntryStatus::Completed).unwrap();
        existing[1].transition(EntryStatus::Cancelled).unwrap();
        let other = ScheduleEntry::from_template(&template(), d(2024, 1, 2), None).unwrap();
        existing.push(other.clone());

        // New cadence lands on the 8th (cancelled), the 10th, and the 17th.
        let regenerated = series(rid, &[8, 10, 17]);
        let merge = replace_series(&mut existing, rid, january(), regenerated);

        assert_eq!(merge.kept.len(), 2);
        assert_eq!(merge.removed.len(), 2);
        assert_eq!(merge.added.len(), 2);
        assert_eq!(merge.skipped, 1);

        let mut dates: Vec<_> = existing
            .iter()
            .filter(|e| e.recurring_id() == Some(rid))
            .map(|e| (e.date, e.status))
            .collect();
        dates.sort();
        assert_eq!(
            dates,
            vec![
                (d(2024, 1, 1), EntryStatus::Completed),
                (d(2024, 1, 8), EntryStatus::Cancelled),
                (d(2024, 1, 10), EntryStatus::Scheduled),
                (d(2024, 1, 17), EntryStatus::Scheduled),
            ]
        );
        assert!(existing.contains(&other));
    }

    #[test]
    fn replace_series_skips_foreign_entries() {
        let rid = Uuid::new_v4();
        let mut existing = Vec::new();
        let merge = replace_series(&mut existing, rid, january(), series(Uuid::new_v4(), &[1]));
        assert_eq!(merge.skipped, 1);
        assert!(existing.is_empty());
    }

    #[test]
    fn replace_series_leaves_pending_entries_outside_window() {
        let rid = Uuid::new_v4();
        let mut existing = series(rid, &[1, 8, 15, 22, 29]);
        let window = DateWindow::new(d(2024, 1, 1), d(2024, 1, 14));

        // Regenerated set moves the first two weeks to Tuesdays; the 16th lies
        // past the window and must not be added.
        let merge = replace_series(&mut existing, rid, window, series(rid, &[2, 9, 16]));

        assert_eq!(merge.removed.len(), 2);
        assert_eq!(merge.added.len(), 2);
        assert_eq!(merge.skipped, 1);

        let mut dates: Vec<_> = existing.iter().map(|e| e.date).collect();
        dates.sort();
        assert_eq!(
            dates,
            vec![d(2024, 1, 2), d(2024, 1, 9), d(2024, 1, 15), d(2024, 1, 22), d(2024, 1, 29)]
        );
    }

    #[test]
    fn pending_entries_outside_window_count_as_kept() {
        let rid = Uuid::new_v4();
        let mut existing = series(rid, &[1, 20]);
        let window = DateWindow::new(d(2024, 1, 1), d(2024, 1, 10));

        let merge = replace_series(&mut existing, rid, window, series(rid, &[3]));
        assert_eq!(merge.removed.len(), 1);
        assert_eq!(merge.kept.len(), 1);
        assert_eq!(merge.added.len(), 1);
        assert_eq!(existing.len(), 2);
        assert!(existing.iter().any(|e| e.date == d(2024, 1, 20)));
    }
}
