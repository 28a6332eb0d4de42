use chrono::{DateTime, Datelike, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, Result};
use crate::status::EntryStatus;
use crate::weekday;

/// Unique schedule entry identifier.
pub type EntryId = Uuid;

/// Identifier of the recurring task a batch of entries was materialized from.
pub type RecurringId = Uuid;

/// Fields shared by every occurrence of a shift, whether created by hand or
/// expanded from a recurrence pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftTemplate {
    pub client_name: String,
    pub building_name: String,
    /// Assigned cleaners, in display order.
    pub cleaner_names: Vec<String>,
    pub hours: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
}

impl ShiftTemplate {
    pub fn validate(&self) -> Result<()> {
        validate_fields(
            &self.client_name,
            &self.building_name,
            &self.cleaner_names,
            self.hours,
        )
    }
}

fn validate_fields(client: &str, building: &str, cleaners: &[String], hours: f64) -> Result<()> {
    if client.trim().is_empty() {
        return Err(CoreError::InvalidEntry("client name is empty".into()));
    }
    if building.trim().is_empty() {
        return Err(CoreError::InvalidEntry("building name is empty".into()));
    }
    if cleaners.is_empty() {
        return Err(CoreError::InvalidEntry("at least one cleaner is required".into()));
    }
    for (i, name) in cleaners.iter().enumerate() {
        if name.trim().is_empty() {
            return Err(CoreError::InvalidEntry(format!("cleaner #{} has an empty name", i + 1)));
        }
        if cleaners[..i].contains(name) {
            return Err(CoreError::InvalidEntry(format!("cleaner '{name}' is assigned twice")));
        }
    }
    if !hours.is_finite() || hours <= 0.0 {
        return Err(CoreError::InvalidEntry(format!("hours must be positive, got {hours}")));
    }
    Ok(())
}

fn normalize_start_time(start_time: Option<&String>) -> Option<String> {
    start_time
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// One cleaner assignment on one calendar date.
///
/// The weekday is always derived from `date`, and `is_recurring()` is derived
/// from the presence of a recurring id, so neither can drift out of sync.
/// Serialized in the [`ScheduleRecord`] row shape; deserializing runs the same
/// checks as `TryFrom<ScheduleRecord>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ScheduleRecord", into = "ScheduleRecord")]
pub struct ScheduleEntry {
    id: EntryId,
    pub client_name: String,
    pub building_name: String,
    pub cleaner_names: Vec<String>,
    pub date: NaiveDate,
    pub start_time: Option<String>,
    pub hours: f64,
    pub status: EntryStatus,
    recurring_id: Option<RecurringId>,
    /// Display name of whoever last created or changed the entry.
    pub changed_by: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl ScheduleEntry {
    /// Create a `scheduled` entry for `date` from a template.
    pub fn from_template(
        template: &ShiftTemplate,
        date: NaiveDate,
        recurring_id: Option<RecurringId>,
    ) -> Result<Self> {
        template.validate()?;
        Ok(Self {
            id: Uuid::new_v4(),
            client_name: template.client_name.trim().to_string(),
            building_name: template.building_name.trim().to_string(),
            cleaner_names: template.cleaner_names.iter().map(|c| c.trim().to_string()).collect(),
            date,
            start_time: normalize_start_time(template.start_time.as_ref()),
            hours: template.hours,
            status: EntryStatus::Scheduled,
            recurring_id,
            changed_by: None,
            updated_at: Utc::now(),
        })
    }

    pub fn id(&self) -> EntryId {
        self.id
    }

    pub fn recurring_id(&self) -> Option<RecurringId> {
        self.recurring_id
    }

    pub fn is_recurring(&self) -> bool {
        self.recurring_id.is_some()
    }

    pub fn day(&self) -> Weekday {
        self.date.weekday()
    }

    pub fn day_name(&self) -> &'static str {
        weekday::name(self.day())
    }

    /// Record who changed the entry and when.
    pub fn stamp(&mut self, changed_by: Option<&str>) {
        if let Some(who) = changed_by {
            self.changed_by = Some(who.to_string());
        }
        self.updated_at = Utc::now();
    }

    /// Move to `next` status, failing on any edge the lifecycle does not allow.
    pub fn transition(&mut self, next: EntryStatus) -> Result<()> {
        self.status = self.status.transition(next)?;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Apply a partial edit. Fields left as `None` keep their current value.
    ///
    /// The edit is validated as a whole before anything is written, so a
    /// rejected edit leaves the entry untouched. Terminal entries are frozen.
    pub fn apply_edit(&mut self, edit: &EntryEdit) -> Result<()> {
        if self.status.is_terminal() {
            return Err(CoreError::TerminalEntry {
                id: self.id,
                status: self.status,
            });
        }

        let mut next = self.clone();
        if let Some(client) = &edit.client_name {
            next.client_name = client.trim().to_string();
        }
        if let Some(building) = &edit.building_name {
            next.building_name = building.trim().to_string();
        }
        if let Some(cleaners) = &edit.cleaner_names {
            next.cleaner_names = cleaners.iter().map(|c| c.trim().to_string()).collect();
        }
        if let Some(date) = edit.date {
            next.date = date;
        }
        if let Some(start_time) = &edit.start_time {
            next.start_time = normalize_start_time(start_time.as_ref());
        }
        if let Some(hours) = edit.hours {
            next.hours = hours;
        }
        validate_fields(&next.client_name, &next.building_name, &next.cleaner_names, next.hours)?;

        next.updated_at = Utc::now();
        *self = next;
        Ok(())
    }
}

/// Partial update of a [`ScheduleEntry`]. `start_time: Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntryEdit {
    #[serde(default)]
    pub client_name: Option<String>,
    #[serde(default)]
    pub building_name: Option<String>,
    #[serde(default)]
    pub cleaner_names: Option<Vec<String>>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub start_time: Option<Option<String>>,
    #[serde(default)]
    pub hours: Option<f64>,
}

impl EntryEdit {
    pub fn is_empty(&self) -> bool {
        *self == EntryEdit::default()
    }
}

/// Flat row shape exchanged with the persistence collaborator.
///
/// Rows carry `day` and `is_recurring` as stored columns; converting back into
/// a [`ScheduleEntry`] checks both against `date` and `recurring_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRecord {
    pub id: EntryId,
    pub client_name: String,
    pub building_name: String,
    pub cleaner_names: Vec<String>,
    pub date: NaiveDate,
    pub day: String,
    #[serde(default)]
    pub start_time: Option<String>,
    pub hours: f64,
    pub status: EntryStatus,
    pub is_recurring: bool,
    #[serde(default)]
    pub recurring_id: Option<RecurringId>,
    #[serde(default)]
    pub changed_by: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl From<&ScheduleEntry> for ScheduleRecord {
    fn from(entry: &ScheduleEntry) -> Self {
        Self {
            id: entry.id,
            client_name: entry.client_name.clone(),
            building_name: entry.building_name.clone(),
            cleaner_names: entry.cleaner_names.clone(),
            date: entry.date,
            day: entry.day_name().to_string(),
            start_time: entry.start_time.clone(),
            hours: entry.hours,
            status: entry.status,
            is_recurring: entry.is_recurring(),
            recurring_id: entry.recurring_id,
            changed_by: entry.changed_by.clone(),
            updated_at: entry.updated_at,
        }
    }
}

impl From<ScheduleEntry> for ScheduleRecord {
    fn from(entry: ScheduleEntry) -> Self {
        Self::from(&entry)
    }
}

impl TryFrom<ScheduleRecord> for ScheduleEntry {
    type Error = CoreError;

    fn try_from(record: ScheduleRecord) -> Result<Self> {
        let stored_day = weekday::parse(&record.day)?;
        if stored_day != record.date.weekday() {
            return Err(CoreError::InvalidEntry(format!(
                "entry {}: day '{}' does not match date {} ({})",
                record.id,
                record.day,
                record.date,
                weekday::name(record.date.weekday()),
            )));
        }
        if record.is_recurring != record.recurring_id.is_some() {
            return Err(CoreError::InvalidEntry(format!(
                "entry {}: is_recurring={} but recurring_id is {}",
                record.id,
                record.is_recurring,
                if record.recurring_id.is_some() { "set" } else { "missing" },
            )));
        }
        validate_fields(
            &record.client_name,
            &record.building_name,
            &record.cleaner_names,
            record.hours,
        )?;

        Ok(Self {
            id: record.id,
            client_name: record.client_name,
            building_name: record.building_name,
            cleaner_names: record.cleaner_names,
            date: record.date,
            start_time: normalize_start_time(record.start_time.as_ref()),
            hours: record.hours,
            status: record.status,
            recurring_id: record.recurring_id,
            changed_by: record.changed_by,
            updated_at: record.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn template() -> ShiftTemplate {
        ShiftTemplate {
            client_name: "Acme".into(),
            building_name: "Tower A".into(),
            cleaner_names: vec!["Rosa".into(), "Luis".into()],
            hours: 3.5,
            start_time: Some("18:00".into()),
        }
    }

    #[test]
    fn from_template_derives_day_and_status() {
        let entry = ScheduleEntry::from_template(&template(), d(2024, 1, 1), None).unwrap();
        assert_eq!(entry.day(), Weekday::Mon);
        assert_eq!(entry.day_name(), "Monday");
        assert_eq!(entry.status, EntryStatus::Scheduled);
        assert!(!entry.is_recurring());
    }

    #[test]
    fn recurring_flag_follows_recurring_id() {
        let rid = Uuid::new_v4();
        let entry = ScheduleEntry::from_template(&template(), d(2024, 1, 2), Some(rid)).unwrap();
        assert!(entry.is_recurring());
        assert_eq!(entry.recurring_id(), Some(rid));
    }

    #[test]
    fn template_requires_a_cleaner() {
        let mut t = template();
        t.cleaner_names.clear();
        assert!(matches!(t.validate(), Err(CoreError::InvalidEntry(_))));
    }

    #[test]
    fn template_rejects_duplicate_cleaners_and_bad_hours() {
        let mut t = template();
        t.cleaner_names.push("Rosa".into());
        assert!(t.validate().is_err());

        let mut t = template();
        t.hours = 0.0;
        assert!(t.validate().is_err());
        t.hours = f64::NAN;
        assert!(t.validate().is_err());
    }

    #[test]
    fn blank_start_time_becomes_none() {
        let mut t = template();
        t.start_time = Some("   ".into());
        let entry = ScheduleEntry::from_template(&t, d(2024, 1, 1), None).unwrap();
        assert_eq!(entry.start_time, None);
    }

    #[test]
    fn transition_rejects_leaving_terminal_state() {
        let mut entry = ScheduleEntry::from_template(&template(), d(2024, 1, 1), None).unwrap();
        entry.transition(EntryStatus::InProgress).unwrap();
        entry.transition(EntryStatus::Completed).unwrap();
        let err = entry.transition(EntryStatus::InProgress).unwrap_err();
        assert!(matches!(err, CoreError::IllegalTransition { .. }));
        assert_eq!(entry.status, EntryStatus::Completed);
    }

    #[test]
    fn edit_keeps_untouched_fields_and_rederives_day() {
        let mut entry = ScheduleEntry::from_template(&template(), d(2024, 1, 1), None).unwrap();
        let id = entry.id();
        entry
            .apply_edit(&EntryEdit {
                date: Some(d(2024, 1, 5)),
                hours: Some(2.0),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(entry.id(), id);
        assert_eq!(entry.day(), Weekday::Fri);
        assert_eq!(entry.hours, 2.0);
        assert_eq!(entry.cleaner_names, vec!["Rosa", "Luis"]);
        assert_eq!(entry.start_time.as_deref(), Some("18:00"));
    }

    #[test]
    fn edit_can_clear_start_time() {
        let mut entry = ScheduleEntry::from_template(&template(), d(2024, 1, 1), None).unwrap();
        entry
            .apply_edit(&EntryEdit {
                start_time: Some(None),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(entry.start_time, None);
    }

    #[test]
    fn invalid_edit_leaves_entry_untouched() {
        let mut entry = ScheduleEntry::from_template(&template(), d(2024, 1, 1), None).unwrap();
        let before = entry.clone();
        let err = entry
            .apply_edit(&EntryEdit {
                building_name: Some("Tower B".into()),
                cleaner_names: Some(vec![]),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidEntry(_)));
        assert_eq!(entry, before);
    }

    #[test]
    fn terminal_entry_cannot_be_edited() {
        let mut entry = ScheduleEntry::from_template(&template(), d(2024, 1, 1), None).unwrap();
        entry.transition(EntryStatus::Cancelled).unwrap();
        let err = entry
            .apply_edit(&EntryEdit {
                hours: Some(1.0),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, CoreError::TerminalEntry { .. }));
    }

    #[test]
    fn record_round_trip_preserves_entry() {
        let entry =
            ScheduleEntry::from_template(&template(), d(2024, 1, 3), Some(Uuid::new_v4())).unwrap();
        let record = ScheduleRecord::from(&entry);
        assert_eq!(record.day, "Wednesday");
        assert!(record.is_recurring);
        let back = ScheduleEntry::try_from(record).unwrap();
        assert_eq!(back, entry);
    }

    #[test]
    fn record_with_mismatched_day_is_rejected() {
        let entry = ScheduleEntry::from_template(&template(), d(2024, 1, 3), None).unwrap();
        let mut record = ScheduleRecord::from(&entry);
        record.day = "Thursday".into();
        assert!(matches!(
            ScheduleEntry::try_from(record),
            Err(CoreError::InvalidEntry(_))
        ));
    }

    #[test]
    fn record_with_dangling_recurring_flag_is_rejected() {
        let entry = ScheduleEntry::from_template(&template(), d(2024, 1, 3), None).unwrap();
        let mut record = ScheduleRecord::from(&entry);
        record.is_recurring = true;
        assert!(ScheduleEntry::try_from(record).is_err());
    }

    #[test]
    fn serde_uses_record_shape() {
        let entry =
            ScheduleEntry::from_template(&template(), d(2024, 1, 3), Some(Uuid::new_v4())).unwrap();
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["day"], "Wednesday");
        assert_eq!(json["is_recurring"], true);

        let back: ScheduleEntry = serde_json::from_value(json).unwrap();
        assert_eq!(back, entry);
    }

    #[test]
    fn deserializing_runs_entry_checks() {
        let entry = ScheduleEntry::from_template(&template(), d(2024, 1, 3), None).unwrap();

        let mut no_cleaners = serde_json::to_value(&entry).unwrap();
        no_cleaners["cleaner_names"] = serde_json::json!([]);
        assert!(serde_json::from_value::<ScheduleEntry>(no_cleaners).is_err());

        let mut zero_hours = serde_json::to_value(&entry).unwrap();
        zero_hours["hours"] = serde_json::json!(0.0);
        assert!(serde_json::from_value::<ScheduleEntry>(zero_hours).is_err());

        let mut wrong_day = serde_json::to_value(&entry).unwrap();
        wrong_day["day"] = serde_json::json!("Friday");
        assert!(serde_json::from_value::<ScheduleEntry>(wrong_day).is_err());
    }
}
