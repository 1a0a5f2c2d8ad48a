use crate::calendar::days_inclusive;
use crate::schema::{RevenueRecord, TargetConfiguration};
use crate::targets::is_working_day;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Working days after the last known record that have no data yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissingDataReport {
    pub last_known_date: Option<NaiveDate>,
    pub missing_dates: Vec<NaiveDate>,
    pub missing_count: usize,
}

/// Walk the calendar from the day after the last record through yesterday
/// and report every working day with no record. Data that is current
/// through yesterday (or beyond) reports zero missing days, as does an
/// empty dataset.
pub fn detect_missing_days(
    records: &[RevenueRecord],
    config: &TargetConfiguration,
    today: NaiveDate,
) -> MissingDataReport {
    let last_known_date = records.iter().map(|r| r.date).max();

    let (last, yesterday) = match (last_known_date, today.pred_opt()) {
        (Some(last), Some(yesterday)) if last < yesterday => (last, yesterday),
        _ => {
            return MissingDataReport {
                last_known_date,
                missing_dates: Vec::new(),
                missing_count: 0,
            }
        }
    };

    let missing_dates: Vec<NaiveDate> = days_inclusive(last + Duration::days(1), yesterday)
        .into_iter()
        .filter(|d| is_working_day(*d, config))
        .collect();

    MissingDataReport {
        last_known_date,
        missing_count: missing_dates.len(),
        missing_dates,
    }
}
