//! Occurrence date enumeration.
//!
//! A series is always anchored at its `start_date`: interval alignment and the
//! `max_occurrences` budget are counted from there, whatever window the caller
//! asks for. Occurrences before the window consume budget but are not emitted.

use std::collections::BTreeSet;

use chrono::{Datelike, Days, NaiveDate, Weekday};
use shiftgrid_core::weekday::week_start;
use tracing::debug;

use crate::error::Result;
use crate::pattern::{Frequency, RecurrencePattern};

/// Dates covered by `pattern` inside the inclusive window
/// `[window_start, window_end]`, strictly ascending.
///
/// The pattern is validated first; an invalid pattern yields an error and no
/// dates. Windows that legitimately contain nothing (window before the start
/// date, `start_date > end_date`, `max_occurrences = 0`) yield an empty vec.
pub fn generate_occurrence_dates(
    pattern: &RecurrencePattern,
    window_start: NaiveDate,
    window_end: NaiveDate,
) -> Result<Vec<NaiveDate>> {
    pattern.validate()?;

    let upper = match pattern.end_date {
        Some(end) => end.min(window_end),
        None => window_end,
    };
    let lower = pattern.start_date.max(window_start);

    if pattern.max_occurrences == Some(0) || window_start > window_end || lower > upper {
        debug!(
            task_id = %pattern.task_id,
            kind = pattern.frequency.kind(),
            "window covers no occurrences"
        );
        return Ok(Vec::new());
    }

    let budget = pattern.max_occurrences.map(|n| n as usize).unwrap_or(usize::MAX);
    let dates: Vec<NaiveDate> = series_dates(pattern, upper)
        .take(budget)
        .filter(|d| *d >= lower)
        .collect();

    debug!(
        task_id = %pattern.task_id,
        kind = pattern.frequency.kind(),
        count = dates.len(),
        from = %lower,
        to = %upper,
        "generated occurrence dates"
    );
    Ok(dates)
}

/// Every date of the series from `start_date` up to and including `until`,
/// ignoring `end_date` and `max_occurrences`. The pattern must be valid.
pub fn series_dates(
    pattern: &RecurrencePattern,
    until: NaiveDate,
) -> Box<dyn Iterator<Item = NaiveDate> + '_> {
    let start = pattern.start_date;
    let bounded = move |d: &NaiveDate| *d <= until;

    match &pattern.frequency {
        Frequency::Daily { interval } => Box::new(stepping(start, *interval).take_while(bounded)),
        Frequency::Custom { custom_days } => {
            Box::new(stepping(start, *custom_days).take_while(bounded))
        }
        Frequency::Weekly {
            interval,
            days_of_week,
        } => Box::new(weekly(start, *interval, days_of_week).take_while(bounded)),
        Frequency::Monthly {
            interval,
            day_of_month,
        } => Box::new(monthly(start, *interval, *day_of_month, until)),
    }
}

fn stepping(start: NaiveDate, step: u32) -> impl Iterator<Item = NaiveDate> {
    let step = Days::new(step.max(1) as u64);
    std::iter::successors(Some(start), move |d| d.checked_add_days(step))
}

/// Weeks run Sunday to Saturday. The anchor week is the one holding the first
/// qualifying date on or after `start`; only every `interval`-th week from the
/// anchor contributes dates.
fn weekly(start: NaiveDate, interval: u32, days_of_week: &[u8]) -> impl Iterator<Item = NaiveDate> {
    let offsets: Vec<u64> = days_of_week
        .iter()
        .filter(|d| **d <= 6)
        .map(|d| *d as u64)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let first = (0..7u64)
        .filter_map(|i| start.checked_add_days(Days::new(i)))
        .find(|d| offsets.contains(&(d.weekday().num_days_from_sunday() as u64)));
    let anchor = first.map(|d| week_start(d, Weekday::Sun));
    let stride = 7 * interval.max(1) as u64;

    anchor
        .into_iter()
        .flat_map(move |anchor| {
            (0u64..).map_while(move |k| {
                k.checked_mul(stride)
                    .and_then(|days| anchor.checked_add_days(Days::new(days)))
            })
        })
        .flat_map(move |week| {
            offsets
                .clone()
                .into_iter()
                .filter_map(move |offset| week.checked_add_days(Days::new(offset)))
        })
        .filter(move |d| *d >= start)
}

/// Months with fewer than `day_of_month` days are skipped, never clamped.
fn monthly(
    start: NaiveDate,
    interval: u32,
    day_of_month: u32,
    until: NaiveDate,
) -> impl Iterator<Item = NaiveDate> {
    let first_month = start.year() as i64 * 12 + start.month0() as i64;
    let stride = interval.max(1) as i64;

    (0i64..)
        .map(move |k| first_month + k * stride)
        .map_while(move |m| {
            let year = i32::try_from(m.div_euclid(12)).ok()?;
            let month = m.rem_euclid(12) as u32 + 1;
            let first_of_month = NaiveDate::from_ymd_opt(year, month, 1)?;
            (first_of_month <= until).then_some((year, month))
        })
        .filter_map(move |(year, month)| NaiveDate::from_ymd_opt(year, month, day_of_month))
        .filter(move |d| *d >= start && *d <= until)
}
