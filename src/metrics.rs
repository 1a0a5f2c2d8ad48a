use crate::filter::{filter_by_time_frame, resolve_window, DateWindow};
use crate::schema::{
    AttainmentRange, DailyTargetPair, Location, RevenueRecord, TargetConfiguration, TimeFrame,
};
use crate::targets::{
    attainment, elapsed_working_days, working_days_in_month, working_days_in_range,
};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Pacing figures for one location (or the combined total) over a period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationMetrics {
    pub revenue: f64,
    /// Target attributable to business days already elapsed; the
    /// attainment denominator.
    pub on_pace_target: f64,
    /// Target for the whole period.
    pub full_period_target: f64,
    /// Revenue over on-pace target, as a percentage. 0 when the on-pace
    /// target is zero; unbounded above.
    pub attainment_percent: f64,
    pub elapsed_business_days: u32,
    pub total_business_days: u32,
}

/// Resolved period boundaries and target context, reported alongside the
/// metrics when an explicit range drives the aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodInfo {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub working_days_in_period: u32,
    /// Daily target pair in effect for the relevant month.
    pub daily_targets: DailyTargetPair,
    /// 0-based month the period resolves to (the month containing the end
    /// date), matching the adjustment schema.
    pub relevant_month: u32,
    pub relevant_year: i32,
    /// Count of records actually present inside the period.
    pub actual_data_days: u32,
    pub has_monthly_adjustment: bool,
}

/// Per-location metrics plus the combined row. The total row sums revenue
/// and on-pace targets before deriving its attainment; it is never an
/// average of the two location attainments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationBreakdown {
    pub austin: LocationMetrics,
    pub charlotte: LocationMetrics,
    pub total: LocationMetrics,
    pub period: Option<PeriodInfo>,
}

/// How the aggregation determines its pacing period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodStrategy {
    /// Pace against the calendar month containing `today`, regardless of
    /// the filtered range the records came from.
    CurrentMonth,
    /// Pace against an explicit inclusive range, reporting a
    /// [`PeriodInfo`] block.
    ExplicitRange(DateWindow),
}

/// Aggregate revenue records into per-location pacing metrics.
///
/// `records` is typically the output of
/// [`filter_by_time_frame`](crate::filter::filter_by_time_frame); this
/// function only sums what it is given. `location` controls the zeroing of
/// the total row's full-period target, mirroring the filter's record
/// zeroing.
pub fn aggregate_metrics(
    records: &[RevenueRecord],
    config: &TargetConfiguration,
    location: Location,
    strategy: PeriodStrategy,
    today: NaiveDate,
) -> LocationBreakdown {
    let revenue_austin: f64 = records.iter().map(|r| r.austin).sum();
    let revenue_charlotte: f64 = records.iter().map(|r| r.charlotte).sum();

    let period = resolve_period(records, config, strategy, today);

    let daily = period.daily_targets;
    let elapsed = period.elapsed_days;
    let total = period.total_days;

    let austin = location_row(revenue_austin, daily.austin, elapsed, total);
    let charlotte = location_row(revenue_charlotte, daily.charlotte, elapsed, total);

    // Combined row: sums first, attainment after. Only the full-period
    // target honors the location filter (the other side contributes 0).
    let total_on_pace = austin.on_pace_target + charlotte.on_pace_target;
    let total_full = filtered_side(location, Location::Austin, austin.full_period_target)
        + filtered_side(location, Location::Charlotte, charlotte.full_period_target);
    let total_revenue = revenue_austin + revenue_charlotte;

    let total_row = LocationMetrics {
        revenue: total_revenue,
        on_pace_target: total_on_pace,
        full_period_target: total_full,
        attainment_percent: attainment(total_revenue, total_on_pace),
        elapsed_business_days: elapsed,
        total_business_days: total,
    };

    LocationBreakdown {
        austin,
        charlotte,
        total: total_row,
        period: period.info,
    }
}

/// Filter by time frame, then aggregate with the frame's own range driving
/// the pacing period. An unresolvable frame (custom with a malformed
/// bound) degrades to an all-zero breakdown with no period block.
pub fn aggregate_for_time_frame(
    records: &[RevenueRecord],
    frame: &TimeFrame,
    location: Location,
    attainment_band: Option<AttainmentRange>,
    config: &TargetConfiguration,
    today: NaiveDate,
) -> LocationBreakdown {
    let window = match resolve_window(frame, today) {
        Some(w) => w,
        None => return LocationBreakdown::empty(),
    };

    let filtered = filter_by_time_frame(records, frame, location, attainment_band, config, today);

    let pacing = match frame {
        // Month-to-date paces against the whole calendar month, exactly as
        // the current-month strategy does; only the record filter stops at
        // today.
        TimeFrame::MonthToDate => DateWindow {
            start: NaiveDate::from_ymd_opt(today.year(), today.month(), 1)
                .unwrap_or(window.start),
            end: crate::calendar::last_day_of_month(today.year(), today.month()),
        },
        // The open-ended "all" frame resolves its period to the span of
        // the data itself rather than iterating from the epoch.
        TimeFrame::All => match filtered.first() {
            Some(first) => DateWindow {
                start: first.date,
                end: window.end,
            },
            None => return LocationBreakdown::empty(),
        },
        _ => window,
    };

    aggregate_metrics(
        &filtered,
        config,
        location,
        PeriodStrategy::ExplicitRange(pacing),
        today,
    )
}

impl LocationBreakdown {
    /// Degenerate breakdown for selections that produce no period at all.
    pub fn empty() -> LocationBreakdown {
        let zero = LocationMetrics {
            revenue: 0.0,
            on_pace_target: 0.0,
            full_period_target: 0.0,
            attainment_percent: 0.0,
            elapsed_business_days: 0,
            total_business_days: 0,
        };
        LocationBreakdown {
            austin: zero.clone(),
            charlotte: zero.clone(),
            total: zero,
            period: None,
        }
    }
}

struct ResolvedPeriod {
    daily_targets: DailyTargetPair,
    elapsed_days: u32,
    total_days: u32,
    info: Option<PeriodInfo>,
}

fn resolve_period(
    records: &[RevenueRecord],
    config: &TargetConfiguration,
    strategy: PeriodStrategy,
    today: NaiveDate,
) -> ResolvedPeriod {
    match strategy {
        PeriodStrategy::CurrentMonth => ResolvedPeriod {
            daily_targets: month_daily_targets(config, today.month0(), today.year()),
            elapsed_days: elapsed_working_days(config, today),
            total_days: working_days_in_month(config, today.year(), today.month()),
            info: None,
        },
        PeriodStrategy::ExplicitRange(window) => {
            let relevant_month = window.end.month0();
            let relevant_year = window.end.year();

            let total_days = working_days_in_range(config, window.start, window.end);
            let elapsed_end = match today.pred_opt() {
                Some(yesterday) if yesterday < window.end => yesterday,
                _ => window.end,
            };
            let elapsed_days = working_days_in_range(config, window.start, elapsed_end);

            let daily_targets = month_daily_targets(config, relevant_month, relevant_year);

            ResolvedPeriod {
                daily_targets,
                elapsed_days,
                total_days,
                info: Some(PeriodInfo {
                    start_date: window.start,
                    end_date: window.end,
                    working_days_in_period: total_days,
                    daily_targets,
                    relevant_month,
                    relevant_year,
                    actual_data_days: records
                        .iter()
                        .filter(|r| window.contains(r.date))
                        .count() as u32,
                    has_monthly_adjustment: config
                        .adjustment_for(relevant_month, relevant_year)
                        .is_some(),
                }),
            }
        }
    }
}

/// Daily target pair in effect for a month: adjustment overrides where
/// present, defaults otherwise.
fn month_daily_targets(config: &TargetConfiguration, month0: u32, year: i32) -> DailyTargetPair {
    match config.adjustment_for(month0, year) {
        Some(adjustment) => DailyTargetPair {
            austin: adjustment.austin.unwrap_or(config.daily_targets.austin),
            charlotte: adjustment
                .charlotte
                .unwrap_or(config.daily_targets.charlotte),
        },
        None => config.daily_targets,
    }
}

fn location_row(revenue: f64, daily_target: f64, elapsed: u32, total: u32) -> LocationMetrics {
    let on_pace = daily_target * elapsed as f64;
    LocationMetrics {
        revenue,
        on_pace_target: on_pace,
        full_period_target: daily_target * total as f64,
        attainment_percent: attainment(revenue, on_pace),
        elapsed_business_days: elapsed,
        total_business_days: total,
    }
}

fn filtered_side(filter: Location, side: Location, value: f64) -> f64 {
    if filter.includes(side) {
        value
    } else {
        0.0
    }
}
