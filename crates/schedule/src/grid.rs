//! [`WeekGrid`]: building × day layout of one week of entries.

use chrono::{Datelike, Days, NaiveDate};
use indexmap::IndexMap;
use serde::Serialize;
use shiftgrid_core::{EntryStatus, ScheduleEntry};

use crate::index::{GridKey, ScheduleIndex};

/// One (client, building, day) cell.
#[derive(Debug, Clone, Serialize)]
pub struct GridCell<'a> {
    pub date: NaiveDate,
    pub entries: Vec<&'a ScheduleEntry>,
}

impl<'a> GridCell<'a> {
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The entry shown when the cell has room for only one.
    pub fn primary(&self) -> Option<&'a ScheduleEntry> {
        self.entries.first().copied()
    }

    pub fn is_double_booked(&self) -> bool {
        self.entries.len() > 1
    }

    pub fn total_hours(&self) -> f64 {
        self.entries.iter().map(|e| e.hours).sum()
    }
}

/// One client building across the seven days of the week.
#[derive(Debug, Clone, Serialize)]
pub struct GridRow<'a> {
    /// Names as first written in the entries; matching ignores case.
    pub client_name: String,
    pub building_name: String,
    pub cells: Vec<GridCell<'a>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WeekGrid<'a> {
    pub week_start: NaiveDate,
    pub days: Vec<NaiveDate>,
    /// Rows in the order their building first appears in the entry list.
    pub rows: Vec<GridRow<'a>>,
}

impl<'a> WeekGrid<'a> {
    /// Lay out the entries dated within `[week_start, week_start + 6]`.
    /// Cancelled entries are left off the grid.
    pub fn assemble(entries: &'a [ScheduleEntry], week_start: NaiveDate) -> Self {
        let days: Vec<NaiveDate> = (0..7)
            .filter_map(|i| week_start.checked_add_days(Days::new(i)))
            .collect();
        let week_end = days.last().copied().unwrap_or(week_start);

        let visible: Vec<&'a ScheduleEntry> = entries
            .iter()
            .filter(|e| e.date >= week_start && e.date <= week_end)
            .filter(|e| e.status != EntryStatus::Cancelled)
            .collect();

        let mut buildings: IndexMap<(String, String), (String, String)> = IndexMap::new();
        for entry in &visible {
            let key = GridKey::for_entry(entry);
            buildings
                .entry((key.client, key.building))
                .or_insert_with(|| (entry.client_name.clone(), entry.building_name.clone()));
        }

        let index = ScheduleIndex::from_entries(visible);
        let rows = buildings
            .into_iter()
            .map(|((client, building), (client_name, building_name))| {
                let cells = days
                    .iter()
                    .map(|date| GridCell {
                        date: *date,
                        entries: index
                            .get(&GridKey {
                                client: client.clone(),
                                building: building.clone(),
                                weekday: date.weekday(),
                            })
                            .to_vec(),
                    })
                    .collect();
                GridRow {
                    client_name,
                    building_name,
                    cells,
                }
            })
            .collect();

        Self {
            week_start,
            days,
            rows,
        }
    }

    /// Row for a building, matched without regard to case.
    pub fn row(&self, client: &str, building: &str) -> Option<&GridRow<'a>> {
        self.rows.iter().find(|row| {
            row.client_name.to_lowercase() == client.to_lowercase()
                && row.building_name.to_lowercase() == building.to_lowercase()
        })
    }

    /// Every double-booked cell with its row.
    pub fn conflicts(&self) -> impl Iterator<Item = (&GridRow<'a>, &GridCell<'a>)> {
        self.rows.iter().flat_map(|row| {
            row.cells
                .iter()
                .filter(|cell| cell.is_double_booked())
                .map(move |cell| (row, cell))
        })
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
