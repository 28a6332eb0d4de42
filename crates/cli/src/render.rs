//! Plain-text rendering of expansions and week grids.

use std::fmt::Write;

use chrono::NaiveDate;
use shiftgrid_core::weekday;
use shiftgrid_recurrence::{Expansion, SeriesEnd};
use shiftgrid_schedule::WeekGrid;

pub fn expansion_text(expansion: &Expansion) -> String {
    let mut out = String::new();
    for entry in &expansion.entries {
        let _ = writeln!(
            out,
            "{}  {:<9}  {:>5}  {:>5.2}h  {}",
            entry.date,
            entry.day_name(),
            entry.start_time.as_deref().unwrap_or("-"),
            entry.hours,
            entry.cleaner_names.join(", "),
        );
    }
    let _ = writeln!(out, "{} occurrence(s)", expansion.entries.len());
    match expansion.series_end {
        SeriesEnd::Indefinite => {
            let _ = writeln!(out, "series has no end; more occurrences follow the window");
        }
        SeriesEnd::Until(_) | SeriesEnd::Count(_) => {
            if let Some(last) = expansion.last_occurrence {
                let _ = writeln!(out, "series ends {last}");
            }
        }
    }
    out
}

fn day_header(date: NaiveDate) -> String {
    use chrono::Datelike;
    format!("{} {}", &weekday::name(date.weekday())[..3], date.format("%m-%d"))
}

/// One line per building; each cell shows the primary cleaner, with `+N`
/// extra bookings flagged by `!`.
pub fn grid_text(grid: &WeekGrid<'_>) -> String {
    const CELL: usize = 14;
    let label_width = grid
        .rows
        .iter()
        .map(|r| r.client_name.chars().count() + r.building_name.chars().count() + 3)
        .max()
        .unwrap_or(0)
        .max(8);

    let mut out = String::new();
    let _ = write!(out, "{:<label_width$}", "");
    for day in &grid.days {
        let _ = write!(out, " | {:<CELL$}", day_header(*day));
    }
    out.push('\n');

    for row in &grid.rows {
        let label = format!("{} / {}", row.client_name, row.building_name);
        let _ = write!(out, "{label:<label_width$}");
        for cell in &row.cells {
            let text = match cell.primary() {
                None => "-".to_string(),
                Some(entry) if cell.is_double_booked() => {
                    format!("{} +{}!", first_cleaner(entry), cell.count() - 1)
                }
                Some(entry) => first_cleaner(entry).to_string(),
            };
            let _ = write!(out, " | {:<CELL$}", truncate(&text, CELL));
        }
        out.push('\n');
    }

    let conflicts = grid.conflicts().count();
    if conflicts > 0 {
        let _ = writeln!(out, "{conflicts} double-booked cell(s)");
    }
    out
}

fn first_cleaner(entry: &shiftgrid_core::ScheduleEntry) -> &str {
    entry.cleaner_names.first().map(String::as_str).unwrap_or("?")
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut cut: String = s.chars().take(max.saturating_sub(1)).collect();
        cut.push('~');
        cut
    }
}
