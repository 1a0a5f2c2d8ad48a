//! # Revenue Pulse
//!
//! A library for computing target attainment, pacing, and trend analytics
//! over multi-location daily revenue data (Austin and Charlotte).
//!
//! ## Core Concepts
//!
//! - **Daily targets**: a default per-location goal, overridable per month
//!   by a working-day list and optional target amounts
//! - **On-pace target**: the slice of a period's target attributable to
//!   business days already elapsed; the attainment denominator
//! - **Attainment**: revenue over target as a percentage; unbounded above,
//!   defined as 0 when the target is 0
//! - **Time frames**: named reporting windows (This Week, MTD, last30,
//!   last90, YTD, custom, all) with deliberately distinct anchors
//!
//! Every function is pure: `(records, configuration, parameters)` in,
//! derived metrics out, recomputed from scratch on each call.
//!
//! ## Example
//!
//! ```rust,ignore
//! use revenue_pulse::*;
//! use chrono::NaiveDate;
//!
//! let config = TargetConfiguration {
//!     daily_targets: DailyTargetPair { austin: 2000.0, charlotte: 1800.0 },
//!     monthly_adjustments: vec![MonthlyAdjustment {
//!         month: 11, // December
//!         year: 2025,
//!         working_days: vec![1, 2, 3, 4, 5, 8, 9, 10, 11, 12, 15, 16],
//!         austin: Some(2600.0),
//!         charlotte: None,
//!     }],
//! };
//!
//! let rows = vec![
//!     RevenueRow { date: "2025-12-01".into(), austin: 2500.0, charlotte: 1700.0 },
//!     RevenueRow { date: "2025-12-02".into(), austin: 2800.0, charlotte: 1900.0 },
//! ];
//!
//! let snapshot = build_dashboard_snapshot(
//!     &rows,
//!     &config,
//!     NaiveDate::from_ymd_opt(2025, 12, 3).unwrap(),
//! )?;
//! println!("MTD attainment: {:.1}%", snapshot.month_to_date.total.attainment_percent);
//! ```

pub mod calendar;
pub mod coverage;
pub mod error;
pub mod filter;
pub mod ingestion;
pub mod metrics;
pub mod schema;
pub mod targets;
pub mod trends;
pub mod validate;
pub mod weekly;

pub use calendar::{count_business_days, format_date, parse_date};
pub use coverage::{detect_missing_days, MissingDataReport};
pub use error::{Result, RevenuePulseError};
pub use filter::{filter_by_time_frame, resolve_window, DateWindow};
pub use ingestion::{parse_rows, RevenueRow};
pub use metrics::{
    aggregate_for_time_frame, aggregate_metrics, LocationBreakdown, LocationMetrics, PeriodInfo,
    PeriodStrategy,
};
pub use schema::{
    AttainmentRange, DailyTargetPair, Location, MonthlyAdjustment, RevenueRecord,
    TargetConfiguration, TimeFrame,
};
pub use targets::{
    attainment, elapsed_working_days, is_working_day, resolve_daily_target, working_days_in_month,
    working_days_in_range,
};
pub use trends::{
    assess_risk, classify_trend, compute_executive_insights, confidence_score, consistency_score,
    project_month_end, recommendations_for, velocity, ExecutiveInsights, MonthEndProjection,
    RecommendationSet, RiskLevel, TrendDirection,
};
pub use validate::{validate_dataset, ValidationReport};
pub use weekly::{detect_weekly_anomalies, AlertSeverity, DailyAlert, WeeklyComparison};

use chrono::NaiveDate;
use log::{debug, info};
use serde::{Deserialize, Serialize};

/// Everything the dashboard needs for one render, computed in a single
/// pass over the inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub as_of: NaiveDate,
    pub validation: ValidationReport,
    /// Current-month pacing for Austin, Charlotte, and combined.
    pub month_to_date: LocationBreakdown,
    /// Executive summary; `None` when the current month has no data yet.
    pub insights: Option<ExecutiveInsights>,
    pub weekly_alerts: Vec<WeeklyComparison>,
    pub missing_data: MissingDataReport,
}

pub struct DashboardProcessor;

impl DashboardProcessor {
    /// Validate raw rows, then compute the full snapshot as of `today`.
    /// Validation errors abort; warnings are logged and carried in the
    /// snapshot.
    pub fn process(
        rows: &[RevenueRow],
        config: &TargetConfiguration,
        today: NaiveDate,
    ) -> Result<DashboardSnapshot> {
        let validation = validate_dataset(rows, config, today);
        if !validation.is_valid {
            return Err(RevenuePulseError::ValidationFailed(
                validation.errors.join("; "),
            ));
        }
        for warning in &validation.warnings {
            debug!("validation warning: {}", warning);
        }

        let records = parse_rows(rows)?;
        info!(
            "building dashboard snapshot: {} records as of {}",
            records.len(),
            today
        );

        let month_to_date = aggregate_for_time_frame(
            &records,
            &TimeFrame::MonthToDate,
            Location::Combined,
            None,
            config,
            today,
        );

        let insights = match compute_executive_insights(&records, config, today) {
            Ok(insights) => Some(insights),
            Err(RevenuePulseError::NoData(reason)) => {
                debug!("skipping executive insights: {}", reason);
                None
            }
            Err(e) => return Err(e),
        };

        let weekly_alerts = detect_weekly_anomalies(&records, config, today);
        let missing_data = detect_missing_days(&records, config, today);

        Ok(DashboardSnapshot {
            as_of: today,
            validation,
            month_to_date,
            insights,
            weekly_alerts,
            missing_data,
        })
    }

    /// [`process`](Self::process) anchored on the local calendar date,
    /// snapshotted once at entry.
    pub fn process_now(
        rows: &[RevenueRow],
        config: &TargetConfiguration,
    ) -> Result<DashboardSnapshot> {
        Self::process(rows, config, chrono::Local::now().date_naive())
    }
}

pub fn build_dashboard_snapshot(
    rows: &[RevenueRow],
    config: &TargetConfiguration,
    today: NaiveDate,
) -> Result<DashboardSnapshot> {
    DashboardProcessor::process(rows, config, today)
}
