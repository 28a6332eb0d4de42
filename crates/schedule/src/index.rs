//! [`ScheduleIndex`]: (client, building, weekday) lookup over a flat entry list.
//!
//! The index is derived data: it borrows the caller's entries and is rebuilt
//! whenever they change. Client and building names are matched without regard
//! to case because manually entered names are inconsistently capitalized.

use chrono::Weekday;
use indexmap::IndexMap;
use serde::Serialize;
use shiftgrid_core::ScheduleEntry;

/// Composite lookup key. Names are stored case-folded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct GridKey {
    pub client: String,
    pub building: String,
    pub weekday: Weekday,
}

impl GridKey {
    pub fn new(client: &str, building: &str, weekday: Weekday) -> Self {
        Self {
            client: fold(client),
            building: fold(building),
            weekday,
        }
    }

    pub fn for_entry(entry: &ScheduleEntry) -> Self {
        Self::new(&entry.client_name, &entry.building_name, entry.day())
    }
}

fn fold(name: &str) -> String {
    name.to_lowercase()
}

/// Hash index from [`GridKey`] to the entries filed under it, in insertion order.
///
/// Several entries under one key is a double-booking. The index reports it
/// and leaves resolution to the caller.
#[derive(Debug, Default)]
pub struct ScheduleIndex<'a> {
    slots: IndexMap<GridKey, Vec<&'a ScheduleEntry>>,
    entry_count: usize,
}

impl<'a> ScheduleIndex<'a> {
    /// Index every entry. Linear in `entries.len()`.
    pub fn build(entries: &'a [ScheduleEntry]) -> Self {
        Self::from_entries(entries.iter())
    }

    /// Index a subset of entries, e.g. one week or only non-cancelled ones.
    pub fn from_entries(entries: impl IntoIterator<Item = &'a ScheduleEntry>) -> Self {
        let mut index = Self::default();
        for entry in entries {
            index.insert(entry);
        }
        index
    }

    fn insert(&mut self, entry: &'a ScheduleEntry) {
        self.slots
            .entry(GridKey::for_entry(entry))
            .or_default()
            .push(entry);
        self.entry_count += 1;
    }

    /// Entries for the key, oldest insertion first. Empty when nothing matches.
    pub fn lookup(&self, client: &str, building: &str, weekday: Weekday) -> &[&'a ScheduleEntry] {
        self.get(&GridKey::new(client, building, weekday))
    }

    pub fn get(&self, key: &GridKey) -> &[&'a ScheduleEntry] {
        self.slots.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of entries under the key. More than one means double-booked.
    pub fn count(&self, client: &str, building: &str, weekday: Weekday) -> usize {
        self.lookup(client, building, weekday).len()
    }

    /// The first entry filed under the key.
    pub fn primary(&self, client: &str, building: &str, weekday: Weekday) -> Option<&'a ScheduleEntry> {
        self.lookup(client, building, weekday).first().copied()
    }

    /// Keys holding more than one entry, in the order the keys were first seen.
    pub fn conflicts(&self) -> impl Iterator<Item = (&GridKey, &[&'a ScheduleEntry])> {
        self.slots
            .iter()
            .filter(|(_, entries)| entries.len() > 1)
            .map(|(key, entries)| (key, entries.as_slice()))
    }

    pub fn keys(&self) -> indexmap::map::Keys<'_, GridKey, Vec<&'a ScheduleEntry>> {
        self.slots.keys()
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of indexed entries.
    pub fn entry_count(&self) -> usize {
        self.entry_count
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use shiftgrid_core::ShiftTemplate;

    use super::*;

    fn entry(client: &str, building: &str, date: NaiveDate, cleaner: &str) -> ScheduleEntry {
        let template = ShiftTemplate {
            client_name: client.into(),
            building_name: building.into(),
            cleaner_names: vec![cleaner.into()],
            hours: 2.0,
            start_time: None,
        };
        ScheduleEntry::from_template(&template, date, None).unwrap()
    }

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    #[test]
    fn double_booking_returns_both_in_insertion_order() {
        let entries = vec![
            entry("Acme", "Tower A", monday(), "Rosa"),
            entry("Acme", "Tower A", monday(), "Luis"),
        ];
        let index = ScheduleIndex::build(&entries);
        let found = index.lookup("Acme", "Tower A", Weekday::Mon);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].id(), entries[0].id());
        assert_eq!(found[1].id(), entries[1].id());
        assert_eq!(index.primary("Acme", "Tower A", Weekday::Mon).map(|e| e.id()), Some(entries[0].id()));
    }

    #[test]
    fn lookup_ignores_case() {
        let entries = vec![
            entry("ACME", "tower a", monday(), "Rosa"),
            entry("acme", "Tower A", monday(), "Luis"),
        ];
        let index = ScheduleIndex::build(&entries);
        assert_eq!(index.count("Acme", "TOWER A", Weekday::Mon), 2);
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn names_containing_separators_do_not_collide() {
        // With naive string concatenation these two keys would be identical.
        let entries = vec![
            entry("Acme-North", "Tower", monday(), "Rosa"),
            entry("Acme", "North-Tower", monday(), "Luis"),
        ];
        let index = ScheduleIndex::build(&entries);
        assert_eq!(index.count("Acme-North", "Tower", Weekday::Mon), 1);
        assert_eq!(index.count("Acme", "North-Tower", Weekday::Mon), 1);
        assert_eq!(index.conflicts().count(), 0);
    }

    #[test]
    fn weekday_is_part_of_the_key() {
        let tuesday = monday().succ_opt().unwrap();
        let entries = vec![
            entry("Acme", "Tower A", monday(), "Rosa"),
            entry("Acme", "Tower A", tuesday, "Rosa"),
        ];
        let index = ScheduleIndex::build(&entries);
        assert_eq!(index.count("Acme", "Tower A", Weekday::Mon), 1);
        assert_eq!(index.count("Acme", "Tower A", Weekday::Tue), 1);
        assert!(index.lookup("Acme", "Tower A", Weekday::Wed).is_empty());
    }

    #[test]
    fn conflicts_lists_only_double_booked_keys() {
        let entries = vec![
            entry("Acme", "Tower A", monday(), "Rosa"),
            entry("Globex", "HQ", monday(), "Luis"),
            entry("Acme", "Tower A", monday(), "Mia"),
        ];
        let index = ScheduleIndex::build(&entries);
        let conflicts: Vec<_> = index.conflicts().collect();
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].0, &GridKey::new("acme", "tower a", Weekday::Mon));
        assert_eq!(conflicts[0].1.len(), 2);
        assert_eq!(index.entry_count(), 3);
    }

    #[test]
    fn empty_index() {
        let index = ScheduleIndex::build(&[]);
        assert!(index.is_empty());
        assert_eq!(index.primary("Acme", "Tower A", Weekday::Mon), None);
    }
}
