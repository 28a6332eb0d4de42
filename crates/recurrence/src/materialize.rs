//! Turning occurrence dates into concrete schedule entries.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::Serialize;
use shiftgrid_core::{ScheduleEntry, ShiftTemplate};
use tracing::{debug, warn};

use crate::error::Result;
use crate::generate::{generate_occurrence_dates, series_dates};
use crate::pattern::{DateWindow, RecurrencePattern, SeriesEnd};

/// Build one `scheduled` entry per date, each tagged with the pattern's task id.
///
/// Dates the validated series does not cover are dropped: anything before
/// `start_date`, after the series' last occurrence, off the pattern's cadence,
/// or repeated. The output is ascending by date. `template` is only read.
pub fn materialize(
    pattern: &RecurrencePattern,
    template: &ShiftTemplate,
    dates: &[NaiveDate],
) -> Result<Vec<ScheduleEntry>> {
    pattern.validate()?;
    template.validate()?;

    let requested: BTreeSet<NaiveDate> = dates.iter().copied().collect();
    let (Some(&first), Some(&last)) = (requested.first(), requested.last()) else {
        return Ok(Vec::new());
    };

    // Everything the series actually covers across the requested span.
    let covered: BTreeSet<NaiveDate> = generate_occurrence_dates(pattern, first, last)?
        .into_iter()
        .collect();

    let dropped = requested.difference(&covered).count();
    if dropped > 0 {
        warn!(
            task_id = %pattern.task_id,
            dropped,
            "skipping dates not covered by the recurrence pattern"
        );
    }

    let entries = requested
        .intersection(&covered)
        .map(|date| ScheduleEntry::from_template(template, *date, Some(pattern.task_id)))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    debug!(
        task_id = %pattern.task_id,
        count = entries.len(),
        "materialized occurrences"
    );
    Ok(entries)
}

/// Result of expanding a pattern over a window.
#[derive(Debug, Clone, Serialize)]
pub struct Expansion {
    pub entries: Vec<ScheduleEntry>,
    pub series_end: SeriesEnd,
    /// The series has no end; more occurrences exist past the window.
    pub indefinite: bool,
    /// Last date of the whole series, when it is bounded.
    pub last_occurrence: Option<NaiveDate>,
}

impl Expansion {
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.entries.iter().map(|e| e.date).collect()
    }
}

/// Generate and materialize in one step.
pub fn expand(
    pattern: &RecurrencePattern,
    template: &ShiftTemplate,
    window: DateWindow,
) -> Result<Expansion> {
    let dates = generate_occurrence_dates(pattern, window.start, window.end)?;
    let entries = materialize(pattern, template, &dates)?;
    let series_end = pattern.series_end();

    Ok(Expansion {
        entries,
        series_end,
        indefinite: series_end == SeriesEnd::Indefinite,
        last_occurrence: last_occurrence(pattern),
    })
}

/// Date of the final occurrence of a bounded series.
fn last_occurrence(pattern: &RecurrencePattern) -> Option<NaiveDate> {
    match pattern.series_end() {
        SeriesEnd::Until(end) => series_dates(pattern, end).last(),
        SeriesEnd::Count(0) => None,
        SeriesEnd::Count(n) => series_dates(pattern, NaiveDate::MAX).nth(n as usize - 1),
        SeriesEnd::Indefinite => None,
    }
}
