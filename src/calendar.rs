use crate::error::{Result, RevenuePulseError};
use chrono::{Datelike, Days, Duration, NaiveDate, Weekday};

/// Strict `YYYY-MM-DD` parse. Every date string entering the crate goes
/// through here; nothing else re-parses date text.
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    let bytes = input.as_bytes();
    let shape_ok = bytes.len() == 10 && bytes[4] == b'-' && bytes[7] == b'-';
    if !shape_ok {
        return Err(RevenuePulseError::InvalidDate {
            input: input.to_string(),
        });
    }

    NaiveDate::parse_from_str(input, "%Y-%m-%d").map_err(|_| RevenuePulseError::InvalidDate {
        input: input.to_string(),
    })
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn last_day_of_month(year: i32, month: u32) -> NaiveDate {
    let next_month = if month == 12 { 1 } else { month + 1 };
    let next_year = if month == 12 { year + 1 } else { year };

    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .unwrap()
        .checked_sub_days(Days::new(1))
        .unwrap()
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    last_day_of_month(year, month).day()
}

pub fn is_weekday(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Mon-Fri count over the closed interval `[start, end]`. Returns 0 when
/// `end < start`.
pub fn count_business_days(start: NaiveDate, end: NaiveDate) -> u32 {
    if end < start {
        return 0;
    }

    start
        .iter_days()
        .take_while(|d| *d <= end)
        .filter(|d| is_weekday(*d))
        .count() as u32
}

/// Monday of the ISO week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// All calendar days in the closed interval `[start, end]`, ascending.
pub fn days_inclusive(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    if end < start {
        return Vec::new();
    }
    start.iter_days().take_while(|d| *d <= end).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_strict() {
        assert_eq!(
            parse_date("2025-06-02").unwrap(),
            NaiveDate::from_ymd_opt(2025, 6, 2).unwrap()
        );
        assert!(parse_date("2025-6-2").is_err());
        assert!(parse_date("06/02/2025").is_err());
        assert!(parse_date("2025-02-30").is_err());
        assert!(parse_date("").is_err());
    }

    #[test]
    fn test_format_round_trip() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 9).unwrap();
        assert_eq!(format_date(date), "2025-01-09");
        assert_eq!(parse_date(&format_date(date)).unwrap(), date);
    }

    #[test]
    fn test_last_day_of_month() {
        assert_eq!(
            last_day_of_month(2025, 2),
            NaiveDate::from_ymd_opt(2025, 2, 28).unwrap()
        );
        assert_eq!(
            last_day_of_month(2024, 2),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
        assert_eq!(
            last_day_of_month(2025, 12),
            NaiveDate::from_ymd_opt(2025, 12, 31).unwrap()
        );
    }

    #[test]
    fn test_count_business_days() {
        // 2025-06-02 is a Monday
        let monday = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        let sunday = NaiveDate::from_ymd_opt(2025, 6, 8).unwrap();
        assert_eq!(count_business_days(monday, sunday), 5);
        assert_eq!(count_business_days(monday, monday), 1);
        assert_eq!(count_business_days(sunday, monday), 0);

        let saturday = NaiveDate::from_ymd_opt(2025, 6, 7).unwrap();
        assert_eq!(count_business_days(saturday, sunday), 0);
    }

    #[test]
    fn test_week_start() {
        let wednesday = NaiveDate::from_ymd_opt(2025, 6, 4).unwrap();
        let monday = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        assert_eq!(week_start(wednesday), monday);
        assert_eq!(week_start(monday), monday);

        let sunday = NaiveDate::from_ymd_opt(2025, 6, 8).unwrap();
        assert_eq!(week_start(sunday), monday);
    }

    #[test]
    fn test_days_inclusive() {
        let start = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 6, 4).unwrap();
        let days = days_inclusive(start, end);
        assert_eq!(days.len(), 3);
        assert_eq!(days[0], start);
        assert_eq!(days[2], end);
        assert!(days_inclusive(end, start).is_empty());
    }
}
