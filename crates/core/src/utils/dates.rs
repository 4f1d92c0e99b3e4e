use chrono::{Datelike, NaiveDate};

use crate::error::{Error, Result};

/// Parse an ISO `YYYY-MM-DD` calendar date.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| Error::InvalidDateRange(format!("unparsable date: {s}")))
}

/// Number of days in the given month, leap-aware.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if NaiveDate::from_ymd_opt(year, 2, 29).is_some() {
                29
            } else {
                28
            }
        }
        _ => 0,
    }
}

fn previous_month(today: NaiveDate) -> (i32, u32) {
    if today.month() == 1 {
        (today.year() - 1, 12)
    } else {
        (today.year(), today.month() - 1)
    }
}

fn first_of_month(date: NaiveDate) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1)
        .ok_or_else(|| Error::Internal(format!("no first day for {date}")))
}

fn last_of_month(date: NaiveDate) -> Result<NaiveDate> {
    let day = days_in_month(date.year(), date.month());
    NaiveDate::from_ymd_opt(date.year(), date.month(), day)
        .ok_or_else(|| Error::Internal(format!("no last day for {date}")))
}

/// Resolve an optionally-missing report window.
///
/// Both missing: the previous calendar month relative to `today`. Only start
/// missing: the first day of the month containing finish. Only finish
/// missing: the last day of the month containing start.
pub fn default_dates(
    start: Option<&str>,
    finish: Option<&str>,
    today: NaiveDate,
) -> Result<(NaiveDate, NaiveDate)> {
    match (start, finish) {
        (Some(s), Some(f)) => Ok((parse_date(s)?, parse_date(f)?)),
        (Some(s), None) => {
            let start = parse_date(s)?;
            Ok((start, last_of_month(start)?))
        }
        (None, Some(f)) => {
            let finish = parse_date(f)?;
            Ok((first_of_month(finish)?, finish))
        }
        (None, None) => {
            let (year, month) = previous_month(today);
            let first = NaiveDate::from_ymd_opt(year, month, 1)
                .ok_or_else(|| Error::Internal(format!("no first day for {year}-{month}")))?;
            Ok((first, last_of_month(first)?))
        }
    }
}

/// The inclusive window covering one whole calendar year.
pub fn year_window(year: i32) -> Result<(NaiveDate, NaiveDate)> {
    let start = NaiveDate::from_ymd_opt(year, 1, 1);
    let finish = NaiveDate::from_ymd_opt(year, 12, 31);
    match (start, finish) {
        (Some(s), Some(f)) => Ok((s, f)),
        _ => Err(Error::InvalidDateRange(format!("invalid year: {year}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_both_missing_uses_previous_month() {
        let (start, finish) = default_dates(None, None, date(2023, 3, 15)).unwrap();
        assert_eq!(start, date(2023, 2, 1));
        assert_eq!(finish, date(2023, 2, 28));
    }

    #[test]
    fn test_both_missing_in_january_wraps_year() {
        let (start, finish) = default_dates(None, None, date(2023, 1, 2)).unwrap();
        assert_eq!(start, date(2022, 12, 1));
        assert_eq!(finish, date(2022, 12, 31));
    }

    #[test]
    fn test_start_missing_takes_first_of_finish_month() {
        let (start, finish) =
            default_dates(None, Some("2024-02-14"), date(2024, 6, 1)).unwrap();
        assert_eq!(start, date(2024, 2, 1));
        assert_eq!(finish, date(2024, 2, 14));
    }

    #[test]
    fn test_finish_missing_takes_last_of_start_month() {
        let (start, finish) =
            default_dates(Some("2024-02-10"), None, date(2024, 6, 1)).unwrap();
        assert_eq!(start, date(2024, 2, 10));
        assert_eq!(finish, date(2024, 2, 29)); // leap year
    }

    #[test]
    fn test_both_given() {
        let (start, finish) =
            default_dates(Some("2023-05-01"), Some("2023-05-20"), date(2024, 1, 1)).unwrap();
        assert_eq!(start, date(2023, 5, 1));
        assert_eq!(finish, date(2023, 5, 20));
    }

    #[test]
    fn test_unparsable_date_is_rejected() {
        let result = default_dates(Some("not-a-date"), None, date(2024, 1, 1));
        assert!(matches!(result, Err(Error::InvalidDateRange(_))));
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(2023, 2), 28);
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(1900, 2), 28); // century, not leap
        assert_eq!(days_in_month(2000, 2), 29);
        assert_eq!(days_in_month(2024, 4), 30);
        assert_eq!(days_in_month(2024, 12), 31);
    }

    #[test]
    fn test_year_window() {
        let (start, finish) = year_window(2022).unwrap();
        assert_eq!(start, date(2022, 1, 1));
        assert_eq!(finish, date(2022, 12, 31));
    }
}
