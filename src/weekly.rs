use crate::calendar::week_start;
use crate::schema::{Location, RevenueRecord, TargetConfiguration};
use crate::targets::{attainment, resolve_daily_target};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Week-level drop (in percent) beyond which a location is flagged.
const WEEK_DROP_THRESHOLD: f64 = 7.0;
/// Day-over-day drop (in percent) beyond which a day pair is flagged.
const DAILY_DROP_THRESHOLD: f64 = 7.0;

/// A day in the current week that fell sharply below the same weekday of
/// the previous week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyAlert {
    pub date: NaiveDate,
    pub location: Location,
    pub current_revenue: f64,
    pub previous_revenue: f64,
    pub drop_percent: f64,
    pub current_attainment: f64,
    pub previous_attainment: f64,
}

/// Day-aligned comparison of the current ISO week against the previous
/// one for a single location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyComparison {
    pub location: Location,
    pub current_week_total: f64,
    pub previous_week_total: f64,
    pub change_percent: f64,
    pub current_week_attainment: f64,
    pub previous_week_attainment: f64,
    pub daily_alerts: Vec<DailyAlert>,
}

/// Display band for a week-over-week change, a pure function of the
/// magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Severe,
    Moderate,
    Informational,
}

impl AlertSeverity {
    pub fn from_change_percent(change_percent: f64) -> AlertSeverity {
        let magnitude = change_percent.abs();
        if magnitude > 20.0 {
            AlertSeverity::Severe
        } else if magnitude > 10.0 {
            AlertSeverity::Moderate
        } else {
            AlertSeverity::Informational
        }
    }
}

/// Compare the current calendar week (Monday-start, containing `today`)
/// against the previous week for Austin, Charlotte, and Combined. Only
/// alert-worthy locations are returned: week change below -7%, or at
/// least one day-level alert. Worst weekly drop sorts first.
pub fn detect_weekly_anomalies(
    records: &[RevenueRecord],
    config: &TargetConfiguration,
    today: NaiveDate,
) -> Vec<WeeklyComparison> {
    let current_monday = week_start(today);
    let previous_monday = current_monday - Duration::days(7);

    let by_date: BTreeMap<NaiveDate, &RevenueRecord> =
        records.iter().map(|r| (r.date, r)).collect();

    let mut comparisons: Vec<WeeklyComparison> = [Location::Austin, Location::Charlotte, Location::Combined]
        .into_iter()
        .filter_map(|location| {
            let comparison =
                compare_weeks(&by_date, config, location, current_monday, previous_monday);
            let flagged = comparison.change_percent < -WEEK_DROP_THRESHOLD
                || !comparison.daily_alerts.is_empty();
            flagged.then_some(comparison)
        })
        .collect();

    comparisons.sort_by(|a, b| {
        a.change_percent
            .partial_cmp(&b.change_percent)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    comparisons
}

fn compare_weeks(
    by_date: &BTreeMap<NaiveDate, &RevenueRecord>,
    config: &TargetConfiguration,
    location: Location,
    current_monday: NaiveDate,
    previous_monday: NaiveDate,
) -> WeeklyComparison {
    let mut current_total = 0.0;
    let mut previous_total = 0.0;
    let mut current_target = 0.0;
    let mut previous_target = 0.0;
    let mut daily_alerts = Vec::new();

    for offset in 0..7 {
        let current_day = current_monday + Duration::days(offset);
        let previous_day = previous_monday + Duration::days(offset);

        let current = by_date.get(&current_day);
        let previous = by_date.get(&previous_day);

        if let Some(record) = current {
            current_total += record.revenue_for(location);
            current_target += resolve_daily_target(current_day, config).target_for(location);
        }
        if let Some(record) = previous {
            previous_total += record.revenue_for(location);
            previous_target += resolve_daily_target(previous_day, config).target_for(location);
        }

        // Day-level check needs data on both sides of the pair
        let (Some(current), Some(previous)) = (current, previous) else {
            continue;
        };

        let current_revenue = current.revenue_for(location);
        let previous_revenue = previous.revenue_for(location);
        if previous_revenue <= 0.0 {
            continue;
        }

        let drop_percent = (previous_revenue - current_revenue) / previous_revenue * 100.0;
        if drop_percent > DAILY_DROP_THRESHOLD {
            daily_alerts.push(DailyAlert {
                date: current_day,
                location,
                current_revenue,
                previous_revenue,
                drop_percent,
                current_attainment: attainment(
                    current_revenue,
                    resolve_daily_target(current_day, config).target_for(location),
                ),
                previous_attainment: attainment(
                    previous_revenue,
                    resolve_daily_target(previous_day, config).target_for(location),
                ),
            });
        }
    }

    let change_percent = if previous_total > 0.0 {
        (current_total - previous_total) / previous_total * 100.0
    } else {
        0.0
    };

    WeeklyComparison {
        location,
        current_week_total: current_total,
        previous_week_total: previous_total,
        change_percent,
        current_week_attainment: attainment(current_total, current_target),
        previous_week_attainment: attainment(previous_total, previous_target),
        daily_alerts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::DailyTargetPair;

    fn config() -> TargetConfiguration {
        TargetConfiguration {
            daily_targets: DailyTargetPair {
                austin: 1000.0,
                charlotte: 1000.0,
            },
            monthly_adjustments: Vec::new(),
        }
    }

    fn record(date: NaiveDate, austin: f64, charlotte: f64) -> RevenueRecord {
        RevenueRecord {
            date,
            austin,
            charlotte,
        }
    }

    // Friday of a week whose Monday is 2025-06-09
    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 13).unwrap()
    }

    fn uniform_two_weeks(current_daily: f64, previous_daily: f64) -> Vec<RevenueRecord> {
        let current_monday = NaiveDate::from_ymd_opt(2025, 6, 9).unwrap();
        let previous_monday = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();

        let mut records = Vec::new();
        for offset in 0..5 {
            records.push(record(
                previous_monday + Duration::days(offset),
                previous_daily,
                0.0,
            ));
            records.push(record(
                current_monday + Duration::days(offset),
                current_daily,
                0.0,
            ));
        }
        records
    }

    #[test]
    fn test_uniform_drop_flags_week_and_days() {
        let records = uniform_two_weeks(1000.0, 1200.0);
        let comparisons = detect_weekly_anomalies(&records, &config(), today());

        let austin = comparisons
            .iter()
            .find(|c| c.location == Location::Austin)
            .expect("austin must be flagged");

        assert!((austin.change_percent - (-16.666666)).abs() < 1e-3);
        assert_eq!(austin.daily_alerts.len(), 5);
        for alert in &austin.daily_alerts {
            assert!((alert.drop_percent - 16.666666).abs() < 1e-3);
        }
    }

    #[test]
    fn test_quiet_location_not_reported() {
        let records = uniform_two_weeks(1000.0, 1200.0);
        let comparisons = detect_weekly_anomalies(&records, &config(), today());
        // Charlotte had no revenue either week: change 0, no alerts
        assert!(comparisons
            .iter()
            .all(|c| c.location != Location::Charlotte));
    }

    #[test]
    fn test_sorted_worst_first() {
        let records = uniform_two_weeks(1000.0, 1200.0);
        let comparisons = detect_weekly_anomalies(&records, &config(), today());
        assert!(comparisons
            .windows(2)
            .all(|w| w[0].change_percent <= w[1].change_percent));
    }

    #[test]
    fn test_zero_previous_week_is_not_a_drop() {
        let records = uniform_two_weeks(1000.0, 0.0);
        let comparisons = detect_weekly_anomalies(&records, &config(), today());
        assert!(comparisons.is_empty());
    }

    #[test]
    fn test_single_bad_day_flags_location() {
        // Strong week overall, but Wednesday collapses
        let mut records = uniform_two_weeks(1400.0, 1200.0);
        let wednesday = NaiveDate::from_ymd_opt(2025, 6, 11).unwrap();
        for r in &mut records {
            if r.date == wednesday {
                r.austin = 300.0;
            }
        }

        let comparisons = detect_weekly_anomalies(&records, &config(), today());
        let austin = comparisons
            .iter()
            .find(|c| c.location == Location::Austin)
            .expect("austin must be flagged by the daily alert");

        // Week change stays above the week threshold; the day alone flags it
        assert!(austin.change_percent > -WEEK_DROP_THRESHOLD);
        assert_eq!(austin.daily_alerts.len(), 1);
        assert_eq!(austin.daily_alerts[0].date, wednesday);
        assert!((austin.daily_alerts[0].drop_percent - 75.0).abs() < 1e-9);
    }

    #[test]
    fn test_severity_banding() {
        assert_eq!(
            AlertSeverity::from_change_percent(-25.0),
            AlertSeverity::Severe
        );
        assert_eq!(
            AlertSeverity::from_change_percent(-15.0),
            AlertSeverity::Moderate
        );
        assert_eq!(
            AlertSeverity::from_change_percent(21.0),
            AlertSeverity::Severe
        );
        assert_eq!(
            AlertSeverity::from_change_percent(-5.0),
            AlertSeverity::Informational
        );
    }
}
