//! Weekday numbering (0 = Sunday … 6 = Saturday) and naming helpers.

use chrono::{Datelike, Duration, NaiveDate, Weekday};

use crate::error::{CoreError, Result};

/// Map a 0–6 weekday number (0 = Sunday) to a [`Weekday`].
pub fn from_number(n: u8) -> Option<Weekday> {
    match n {
        0 => Some(Weekday::Sun),
        1 => Some(Weekday::Mon),
        2 => Some(Weekday::Tue),
        3 => Some(Weekday::Wed),
        4 => Some(Weekday::Thu),
        5 => Some(Weekday::Fri),
        6 => Some(Weekday::Sat),
        _ => None,
    }
}

pub fn to_number(day: Weekday) -> u8 {
    day.num_days_from_sunday() as u8
}

/// Full English name, as stored in the `day` column.
pub fn name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Parse a weekday name or abbreviation, ignoring case and surrounding whitespace.
pub fn parse(s: &str) -> Result<Weekday> {
    s.trim()
        .parse::<Weekday>()
        .map_err(|_| CoreError::InvalidWeekday(s.to_string()))
}

/// First day of the week containing `date`, for a week beginning on `first_day`.
pub fn week_start(date: NaiveDate, first_day: Weekday) -> NaiveDate {
    let back = (7 + date.weekday().num_days_from_monday() - first_day.num_days_from_monday()) % 7;
    date - Duration::days(back as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn numbering_starts_at_sunday() {
        assert_eq!(from_number(0), Some(Weekday::Sun));
        assert_eq!(from_number(6), Some(Weekday::Sat));
        assert_eq!(from_number(7), None);
        for n in 0..7 {
            assert_eq!(to_number(from_number(n).unwrap()), n);
        }
    }

    #[test]
    fn parse_accepts_names_in_any_case() {
        assert_eq!(parse("monday").unwrap(), Weekday::Mon);
        assert_eq!(parse(" FRIDAY ").unwrap(), Weekday::Fri);
        assert_eq!(parse("Sat").unwrap(), Weekday::Sat);
        assert!(matches!(parse("Someday"), Err(CoreError::InvalidWeekday(_))));
    }

    #[test]
    fn name_round_trips_through_parse() {
        for n in 0..7 {
            let day = from_number(n).unwrap();
            assert_eq!(parse(name(day)).unwrap(), day);
        }
    }

    #[test]
    fn week_start_sunday_and_monday() {
        // 2024-01-03 is a Wednesday.
        assert_eq!(week_start(d(2024, 1, 3), Weekday::Sun), d(2023, 12, 31));
        assert_eq!(week_start(d(2024, 1, 3), Weekday::Mon), d(2024, 1, 1));
        assert_eq!(week_start(d(2024, 1, 1), Weekday::Mon), d(2024, 1, 1));
        assert_eq!(week_start(d(2023, 12, 31), Weekday::Sun), d(2023, 12, 31));
    }
}
