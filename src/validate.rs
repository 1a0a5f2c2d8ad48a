use crate::calendar::parse_date;
use crate::ingestion::RevenueRow;
use crate::schema::TargetConfiguration;
use crate::targets::{attainment, resolve_daily_target};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Outcome of a dataset integrity check. Errors make the dataset invalid;
/// warnings never do.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

const ATTAINMENT_HIGH_WARNING: f64 = 200.0;
const ATTAINMENT_LOW_WARNING: f64 = 10.0;
const ADJUSTMENT_YEAR_RANGE: std::ops::RangeInclusive<i32> = 2020..=2030;

/// Check raw revenue rows and a target configuration for structural
/// errors and statistical warnings. The rest of the engine is tolerant of
/// bad data; authoritative workflows run this first.
pub fn validate_dataset(
    rows: &[RevenueRow],
    config: &TargetConfiguration,
    today: NaiveDate,
) -> ValidationReport {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let mut seen_dates: HashSet<&str> = HashSet::new();

    for row in rows {
        if !seen_dates.insert(row.date.as_str()) {
            errors.push(format!("Duplicate revenue record for {}", row.date));
        }

        let date = match parse_date(&row.date) {
            Ok(d) => Some(d),
            Err(_) => {
                errors.push(format!(
                    "Invalid date '{}': expected YYYY-MM-DD",
                    row.date
                ));
                None
            }
        };

        for (location, value) in [("Austin", row.austin), ("Charlotte", row.charlotte)] {
            if !value.is_finite() || value < 0.0 {
                errors.push(format!(
                    "Invalid {} revenue {} on {}: must be a non-negative number",
                    location, value, row.date
                ));
            }
        }

        if let Some(date) = date {
            if date > today {
                warnings.push(format!("Record dated in the future: {}", row.date));
            }

            let target = resolve_daily_target(date, config).combined();
            let combined = row.austin + row.charlotte;
            if combined.is_finite() && combined >= 0.0 {
                let percent = attainment(combined, target);
                if percent > ATTAINMENT_HIGH_WARNING {
                    warnings.push(format!(
                        "Unusually high attainment ({:.0}%) on {}",
                        percent, row.date
                    ));
                } else if percent < ATTAINMENT_LOW_WARNING && combined > 0.0 {
                    warnings.push(format!(
                        "Unusually low attainment ({:.0}%) on {}",
                        percent, row.date
                    ));
                }
            }
        }
    }

    validate_configuration(config, &mut errors, &mut warnings);

    ValidationReport {
        is_valid: errors.is_empty(),
        errors,
        warnings,
    }
}

fn validate_configuration(
    config: &TargetConfiguration,
    errors: &mut Vec<String>,
    warnings: &mut Vec<String>,
) {
    for (location, value) in [
        ("Austin", config.daily_targets.austin),
        ("Charlotte", config.daily_targets.charlotte),
    ] {
        if !value.is_finite() || value <= 0.0 {
            errors.push(format!(
                "Daily target for {} must be positive (got {})",
                location, value
            ));
        }
    }

    for (idx, adjustment) in config.monthly_adjustments.iter().enumerate() {
        if adjustment.month > 11 {
            errors.push(format!(
                "Adjustment #{} has month {} out of range (0-11)",
                idx, adjustment.month
            ));
        }

        if adjustment.working_days.is_empty() {
            errors.push(format!(
                "Adjustment #{} ({}/{}) has an empty working-day list",
                idx,
                adjustment.month,
                adjustment.year
            ));
        }

        for day in &adjustment.working_days {
            if !(1..=31).contains(day) {
                errors.push(format!(
                    "Adjustment #{} has working day {} out of range (1-31)",
                    idx, day
                ));
            }
        }

        for (location, value) in [("Austin", adjustment.austin), ("Charlotte", adjustment.charlotte)]
        {
            if let Some(value) = value {
                if !value.is_finite() || value <= 0.0 {
                    errors.push(format!(
                        "Adjustment #{} has non-positive {} override {}",
                        idx, location, value
                    ));
                }
            }
        }

        if !ADJUSTMENT_YEAR_RANGE.contains(&adjustment.year) {
            warnings.push(format!(
                "Adjustment #{} year {} is outside the expected range",
                idx, adjustment.year
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{DailyTargetPair, MonthlyAdjustment};

    fn config() -> TargetConfiguration {
        TargetConfiguration {
            daily_targets: DailyTargetPair {
                austin: 1000.0,
                charlotte: 1000.0,
            },
            monthly_adjustments: Vec::new(),
        }
    }

    fn row(date: &str, austin: f64, charlotte: f64) -> RevenueRow {
        RevenueRow {
            date: date.to_string(),
            austin,
            charlotte,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 13).unwrap()
    }

    #[test]
    fn test_clean_dataset_is_valid() {
        let rows = vec![
            row("2025-06-11", 1000.0, 1000.0),
            row("2025-06-12", 900.0, 1100.0),
        ];
        let report = validate_dataset(&rows, &config(), today());
        assert!(report.is_valid);
        assert!(report.errors.is_empty());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_duplicate_dates_invalidate() {
        let rows = vec![
            row("2025-06-11", 1000.0, 1000.0),
            row("2025-06-11", 900.0, 1100.0),
        ];
        let report = validate_dataset(&rows, &config(), today());
        assert!(!report.is_valid);
        assert!(report
            .errors
            .iter()
            .any(|e| e.contains("Duplicate") && e.contains("2025-06-11")));
    }

    #[test]
    fn test_malformed_date_and_negative_revenue() {
        let rows = vec![row("06/11/2025", -50.0, f64::NAN)];
        let report = validate_dataset(&rows, &config(), today());
        assert!(!report.is_valid);
        assert_eq!(report.errors.len(), 3);
    }

    #[test]
    fn test_future_date_warns_but_stays_valid() {
        let rows = vec![row("2025-06-20", 1000.0, 1000.0)];
        let report = validate_dataset(&rows, &config(), today());
        assert!(report.is_valid);
        assert!(report.warnings.iter().any(|w| w.contains("future")));
    }

    #[test]
    fn test_attainment_warnings() {
        let rows = vec![
            row("2025-06-11", 4000.0, 3000.0), // 350% combined
            row("2025-06-12", 50.0, 0.0),      // 2.5% combined
        ];
        let report = validate_dataset(&rows, &config(), today());
        assert!(report.is_valid);
        assert!(report.warnings.iter().any(|w| w.contains("high")));
        assert!(report.warnings.iter().any(|w| w.contains("low")));
    }

    #[test]
    fn test_bad_configuration() {
        let config = TargetConfiguration {
            daily_targets: DailyTargetPair {
                austin: 0.0,
                charlotte: 1000.0,
            },
            monthly_adjustments: vec![MonthlyAdjustment {
                month: 12,
                year: 2019,
                working_days: vec![0, 15, 32],
                austin: Some(-100.0),
                charlotte: None,
            }],
        };

        let report = validate_dataset(&[], &config, today());
        assert!(!report.is_valid);
        // zero daily target, month out of range, two bad working days,
        // negative override
        assert_eq!(report.errors.len(), 5);
        assert!(report.warnings.iter().any(|w| w.contains("year")));
    }

    #[test]
    fn test_empty_working_day_list_is_an_error() {
        let config = TargetConfiguration {
            daily_targets: DailyTargetPair {
                austin: 1000.0,
                charlotte: 1000.0,
            },
            monthly_adjustments: vec![MonthlyAdjustment {
                month: 5,
                year: 2025,
                working_days: Vec::new(),
                austin: None,
                charlotte: None,
            }],
        };

        let report = validate_dataset(&[], &config, today());
        assert!(!report.is_valid);
        assert!(report.errors.iter().any(|e| e.contains("empty working-day")));
    }
}
