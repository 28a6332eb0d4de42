//! Recurrence pattern model and validation.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use shiftgrid_core::{RecurringId, ShiftTemplate};
use uuid::Uuid;

use crate::error::{PatternViolation, RecurrenceError, Result};

/// How often a series repeats. Serialized with a `type` tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Frequency {
    /// Every `interval` days.
    Daily { interval: u32 },
    /// On each listed weekday (0 = Sunday … 6 = Saturday) of every `interval`-th week.
    Weekly {
        interval: u32,
        days_of_week: Vec<u8>,
    },
    /// On `day_of_month` of every `interval`-th month. Months without that day are skipped.
    Monthly { interval: u32, day_of_month: u32 },
    /// Every `custom_days` days, ignoring week and month boundaries.
    Custom { custom_days: u32 },
}

impl Frequency {
    pub fn kind(&self) -> &'static str {
        match self {
            Frequency::Daily { .. } => "daily",
            Frequency::Weekly { .. } => "weekly",
            Frequency::Monthly { .. } => "monthly",
            Frequency::Custom { .. } => "custom",
        }
    }
}

/// How a series ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum SeriesEnd {
    Until(NaiveDate),
    Count(u32),
    /// No end condition. Callers must bound expansion with a window.
    Indefinite,
}

/// A recurring shift rule owned by one recurring task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurrencePattern {
    /// Owning task; becomes the `recurring_id` of every materialized entry.
    #[serde(default = "Uuid::new_v4")]
    pub task_id: RecurringId,
    #[serde(flatten)]
    pub frequency: Frequency,
    pub start_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_occurrences: Option<u32>,
}

impl RecurrencePattern {
    pub fn new(frequency: Frequency, start_date: NaiveDate) -> Self {
        Self {
            task_id: Uuid::new_v4(),
            frequency,
            start_date,
            end_date: None,
            max_occurrences: None,
        }
    }

    pub fn until(mut self, end_date: NaiveDate) -> Self {
        self.end_date = Some(end_date);
        self
    }

    pub fn times(mut self, max_occurrences: u32) -> Self {
        self.max_occurrences = Some(max_occurrences);
        self
    }

    /// Every problem with the pattern, empty when it is valid.
    pub fn violations(&self) -> Vec<PatternViolation> {
        let mut out = Vec::new();
        let mut push = |path: String, message: String| out.push(PatternViolation { path, message });

        match &self.frequency {
            Frequency::Daily { interval } => {
                if *interval == 0 {
                    push("interval".into(), "must be a positive number of days".into());
                }
            }
            Frequency::Weekly {
                interval,
                days_of_week,
            } => {
                if *interval == 0 {
                    push("interval".into(), "must be a positive number of weeks".into());
                }
                if days_of_week.is_empty() {
                    push(
                        "days_of_week".into(),
                        "weekly pattern needs at least one weekday".into(),
                    );
                }
                for (i, day) in days_of_week.iter().enumerate() {
                    if *day > 6 {
                        push(
                            format!("days_of_week[{i}]"),
                            format!("weekday {day} is outside 0 (Sunday) to 6 (Saturday)"),
                        );
                    }
                }
            }
            Frequency::Monthly {
                interval,
                day_of_month,
            } => {
                if *interval == 0 {
                    push("interval".into(), "must be a positive number of months".into());
                }
                if !(1..=31).contains(day_of_month) {
                    push(
                        "day_of_month".into(),
                        format!("day {day_of_month} is outside 1 to 31"),
                    );
                }
            }
            Frequency::Custom { custom_days } => {
                if *custom_days == 0 {
                    push("custom_days".into(), "must be a positive number of days".into());
                }
            }
        }

        if self.end_date.is_some() && self.max_occurrences.is_some() {
            push(
                "end_date".into(),
                "end_date and max_occurrences are mutually exclusive".into(),
            );
        }

        out
    }

    pub fn validate(&self) -> Result<()> {
        let violations = self.violations();
        if violations.is_empty() {
            Ok(())
        } else {
            Err(RecurrenceError::Validation(violations))
        }
    }

    /// The end condition. Assumes the pattern is valid; when both bounds are
    /// set the end date wins.
    pub fn series_end(&self) -> SeriesEnd {
        match (self.end_date, self.max_occurrences) {
            (Some(end), _) => SeriesEnd::Until(end),
            (None, Some(n)) => SeriesEnd::Count(n),
            (None, None) => SeriesEnd::Indefinite,
        }
    }

    pub fn is_indefinite(&self) -> bool {
        self.series_end() == SeriesEnd::Indefinite
    }
}

/// Inclusive calendar range used to bound expansion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// `days` days starting at `start` (inclusive of `start`). Zero days is
    /// an empty window.
    pub fn horizon(start: NaiveDate, days: u32) -> Self {
        let Some(last) = days.checked_sub(1) else {
            return match start.pred_opt() {
                Some(end) => Self { start, end },
                None => Self {
                    start: NaiveDate::MAX,
                    end: NaiveDate::MIN,
                },
            };
        };
        let end = start
            .checked_add_days(Days::new(last as u64))
            .unwrap_or(NaiveDate::MAX);
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }
}

/// A pattern together with the shift it repeats, as stored in a task file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringTask {
    pub pattern: RecurrencePattern,
    pub template: ShiftTemplate,
}
