use crate::calendar::{count_business_days, days_in_month, is_weekday, last_day_of_month};
use crate::schema::{DailyTargetPair, TargetConfiguration};
use chrono::{Datelike, NaiveDate};

/// Effective per-location daily target for `date` under the layered
/// override rule: default pair, unless a monthly adjustment covers the
/// month, in which case non-working days resolve to zero and working days
/// take the adjustment's override amounts (falling back to the defaults
/// where no override amount is set).
///
/// Total over all inputs; both fields of the result are always >= 0 for
/// non-negative configuration amounts.
pub fn resolve_daily_target(date: NaiveDate, config: &TargetConfiguration) -> DailyTargetPair {
    let adjustment = match config.adjustment_for(date.month0(), date.year()) {
        Some(a) => a,
        None => return config.daily_targets,
    };

    if !adjustment.working_days.contains(&date.day()) {
        return DailyTargetPair::ZERO;
    }

    DailyTargetPair {
        austin: adjustment.austin.unwrap_or(config.daily_targets.austin),
        charlotte: adjustment
            .charlotte
            .unwrap_or(config.daily_targets.charlotte),
    }
}

/// Whether `date` counts as a working day: the monthly adjustment's
/// working-day list when one covers the month, else the Mon-Fri rule.
pub fn is_working_day(date: NaiveDate, config: &TargetConfiguration) -> bool {
    match config.adjustment_for(date.month0(), date.year()) {
        Some(adjustment) => adjustment.working_days.contains(&date.day()),
        None => is_weekday(date),
    }
}

/// Working days in the given calendar month (`month` is 1-based here,
/// matching chrono; the adjustment schema stays 0-based).
pub fn working_days_in_month(config: &TargetConfiguration, year: i32, month: u32) -> u32 {
    if let Some(adjustment) = config.adjustment_for(month - 1, year) {
        let mut days: Vec<u32> = adjustment
            .working_days
            .iter()
            .copied()
            .filter(|d| (1..=days_in_month(year, month)).contains(d))
            .collect();
        days.sort_unstable();
        days.dedup();
        return days.len() as u32;
    }

    let first = NaiveDate::from_ymd_opt(year, month, 1).unwrap();
    count_business_days(first, last_day_of_month(year, month))
}

/// Working days of `today`'s month that are already complete, i.e.
/// strictly before `today`. Never exceeds `working_days_in_month`.
pub fn elapsed_working_days(config: &TargetConfiguration, today: NaiveDate) -> u32 {
    let (year, month) = (today.year(), today.month());

    if let Some(adjustment) = config.adjustment_for(today.month0(), year) {
        let mut days: Vec<u32> = adjustment
            .working_days
            .iter()
            .copied()
            .filter(|d| (1..=days_in_month(year, month)).contains(d) && *d < today.day())
            .collect();
        days.sort_unstable();
        days.dedup();
        return days.len() as u32;
    }

    let first = NaiveDate::from_ymd_opt(year, month, 1).unwrap();
    match today.pred_opt() {
        Some(yesterday) if yesterday >= first => count_business_days(first, yesterday),
        _ => 0,
    }
}

/// Working days in the closed range `[start, end]`, resolved day by day so
/// months with adjustments use their working-day lists while the rest fall
/// back to the weekday rule.
pub fn working_days_in_range(config: &TargetConfiguration, start: NaiveDate, end: NaiveDate) -> u32 {
    crate::calendar::days_inclusive(start, end)
        .into_iter()
        .filter(|d| is_working_day(*d, config))
        .count() as u32
}

/// Attainment percentage, total over its domain: a zero or negative target
/// yields 0 rather than a division error. Unbounded above.
pub fn attainment(revenue: f64, target: f64) -> f64 {
    if target <= 0.0 {
        0.0
    } else {
        revenue / target * 100.0
    }
}
