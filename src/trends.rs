use crate::error::{Result, RevenuePulseError};
use crate::filter::filter_by_time_frame;
use crate::schema::{Location, RevenueRecord, TargetConfiguration, TimeFrame};
use crate::targets::{
    attainment, elapsed_working_days, resolve_daily_target, working_days_in_month,
};
use chrono::{Datelike, NaiveDate};
use log::debug;
use serde::{Deserialize, Serialize};

/// Short-horizon direction of combined attainment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Improving,
    Declining,
    Stable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

/// Weighted month-end revenue projection and its inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthEndProjection {
    pub current_revenue: f64,
    pub projected_revenue: f64,
    /// Projected revenue against the full-month combined target.
    pub projected_attainment: f64,
    pub weighted_daily_average: f64,
    pub trend_multiplier: f64,
    /// 10-day rate of change feeding the multiplier, before clamping.
    pub velocity: f64,
    pub elapsed_business_days: u32,
    pub remaining_business_days: u32,
}

/// Tiered recommendation texts selected by risk level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationSet {
    pub immediate: Vec<String>,
    pub short_term: Vec<String>,
    pub long_term: Vec<String>,
}

/// Executive-level summary: trend, projection, scores, risk, and the
/// matching recommendation templates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutiveInsights {
    pub trend: TrendDirection,
    pub projection: MonthEndProjection,
    /// Current month-to-date combined on-pace attainment.
    pub current_attainment: f64,
    pub consistency_score: f64,
    pub confidence_score: f64,
    pub risk_level: RiskLevel,
    pub action_required: bool,
    pub recommendations: RecommendationSet,
}

const TREND_WINDOW: usize = 5;
const TREND_THRESHOLD_POINTS: f64 = 5.0;
const VELOCITY_WINDOW: usize = 10;
const VELOCITY_CLAMP: f64 = 10.0;
const RECENT_WEIGHT: f64 = 0.7;
const MONTH_WEIGHT: f64 = 0.3;
const CONFIDENCE_MIN: f64 = 30.0;
const CONFIDENCE_MAX: f64 = 95.0;
const STABILITY_BONUS_MAX: f64 = 30.0;
// Stand-in until historical projection error is tracked; mid-range of the
// 0-40 accuracy band.
const PROJECTION_ACCURACY_BONUS: f64 = 20.0;

/// Classify the direction of the most recent records: the newest 5 are
/// split in half and the combined attainment of the halves compared.
/// Fewer than 2 records classify as stable.
pub fn classify_trend(records: &[RevenueRecord], config: &TargetConfiguration) -> TrendDirection {
    let recent = &records[records.len().saturating_sub(TREND_WINDOW)..];

    if recent.len() < 2 {
        return TrendDirection::Stable;
    }

    let split = recent.len() / 2;
    let first = combined_attainment(&recent[..split], config);
    let second = combined_attainment(&recent[split..], config);

    if second - first > TREND_THRESHOLD_POINTS {
        TrendDirection::Improving
    } else if first - second > TREND_THRESHOLD_POINTS {
        TrendDirection::Declining
    } else {
        TrendDirection::Stable
    }
}

fn combined_attainment(records: &[RevenueRecord], config: &TargetConfiguration) -> f64 {
    let revenue: f64 = records.iter().map(|r| r.combined()).sum();
    let target: f64 = records
        .iter()
        .map(|r| resolve_daily_target(r.date, config).combined())
        .sum();
    attainment(revenue, target)
}

/// 10-day rate of change: percent difference between the mean daily
/// combined revenue of the newest half of the last 10 records and the half
/// before it. 0 when there is not enough history or the older mean is 0.
pub fn velocity(records: &[RevenueRecord]) -> f64 {
    let window: Vec<f64> = records[records.len().saturating_sub(VELOCITY_WINDOW)..]
        .iter()
        .map(|r| r.combined())
        .collect();

    if window.len() < 2 {
        return 0.0;
    }

    let split = window.len() / 2;
    let older = mean(&window[..split]);
    let newer = mean(&window[split..]);

    if older == 0.0 {
        return 0.0;
    }
    (newer - older) / older * 100.0
}

/// Month-end revenue projection: current revenue plus a 70/30 blend of the
/// recent and full-month daily averages, scaled by the velocity-derived
/// trend multiplier, over the remaining business days of the month.
pub fn project_month_end(
    mtd_records: &[RevenueRecord],
    config: &TargetConfiguration,
    today: NaiveDate,
) -> MonthEndProjection {
    let current_revenue: f64 = mtd_records.iter().map(|r| r.combined()).sum();

    let elapsed = elapsed_working_days(config, today);
    let total = working_days_in_month(config, today.year(), today.month());
    let remaining = total.saturating_sub(elapsed);

    let recent: Vec<f64> = mtd_records
        .iter()
        .rev()
        .take(TREND_WINDOW)
        .map(|r| r.combined())
        .collect();
    let recent_average = mean(&recent);
    let month_average = if elapsed > 0 {
        current_revenue / elapsed as f64
    } else {
        0.0
    };

    let weighted_daily_average = RECENT_WEIGHT * recent_average + MONTH_WEIGHT * month_average;

    let raw_velocity = velocity(mtd_records);
    let trend_multiplier = 1.0 + raw_velocity.clamp(-VELOCITY_CLAMP, VELOCITY_CLAMP) / 100.0;

    let projected_revenue =
        current_revenue + weighted_daily_average * trend_multiplier * remaining as f64;

    let full_month_target = month_combined_target(config, today) * total as f64;

    debug!(
        "month-end projection: current={:.2} weighted_avg={:.2} multiplier={:.4} remaining={}",
        current_revenue, weighted_daily_average, trend_multiplier, remaining
    );

    MonthEndProjection {
        current_revenue,
        projected_revenue,
        projected_attainment: attainment(projected_revenue, full_month_target),
        weighted_daily_average,
        trend_multiplier,
        velocity: raw_velocity,
        elapsed_business_days: elapsed,
        remaining_business_days: remaining,
    }
}

fn month_combined_target(config: &TargetConfiguration, today: NaiveDate) -> f64 {
    match config.adjustment_for(today.month0(), today.year()) {
        Some(adjustment) => {
            adjustment.austin.unwrap_or(config.daily_targets.austin)
                + adjustment
                    .charlotte
                    .unwrap_or(config.daily_targets.charlotte)
        }
        None => config.daily_targets.combined(),
    }
}

/// Stability of daily combined revenue: `(1 - cv) * 100`, floored at 0,
/// where cv is the coefficient of variation. A zero mean defines the score
/// as 0.
pub fn consistency_score(records: &[RevenueRecord]) -> f64 {
    let daily: Vec<f64> = records.iter().map(|r| r.combined()).collect();
    if daily.is_empty() {
        return 0.0;
    }

    let m = mean(&daily);
    if m == 0.0 {
        return 0.0;
    }

    let variance = daily.iter().map(|v| (v - m).powi(2)).sum::<f64>() / daily.len() as f64;
    let cv = variance.sqrt() / m;
    ((1.0 - cv) * 100.0).max(0.0)
}

/// Bounded confidence in the month-end projection: penalized by how much
/// of the month is still open, credited for revenue stability, plus the
/// historical-accuracy stand-in. Clamped to [30, 95].
pub fn confidence_score(remaining_days: u32, total_days: u32, consistency: f64) -> f64 {
    let open_fraction = if total_days == 0 {
        1.0
    } else {
        remaining_days as f64 / total_days as f64
    };

    let stability_bonus = consistency.clamp(0.0, 100.0) / 100.0 * STABILITY_BONUS_MAX;

    (100.0 - open_fraction * 30.0 + stability_bonus + PROJECTION_ACCURACY_BONUS)
        .clamp(CONFIDENCE_MIN, CONFIDENCE_MAX)
}

/// Ordered risk check; the first tier whose floors are all met wins.
pub fn assess_risk(
    current_attainment: f64,
    projected_attainment: f64,
    stability: f64,
    confidence: f64,
) -> RiskLevel {
    if current_attainment >= 95.0
        && projected_attainment >= 100.0
        && stability >= 70.0
        && confidence >= 80.0
    {
        RiskLevel::Low
    } else if current_attainment >= 85.0
        && projected_attainment >= 90.0
        && stability >= 50.0
        && confidence >= 60.0
    {
        RiskLevel::Medium
    } else {
        RiskLevel::High
    }
}

/// Risk-indexed recommendation templates. Text selection is the only
/// presentational concern the engine owns.
pub fn recommendations_for(risk: RiskLevel) -> RecommendationSet {
    match risk {
        RiskLevel::Low => RecommendationSet {
            immediate: vec!["Hold the current sales cadence at both locations".to_string()],
            short_term: vec![
                "Bank the surplus: review whether monthly targets should rise next quarter"
                    .to_string(),
            ],
            long_term: vec![
                "Document what is working this month so it can be repeated".to_string()
            ],
        },
        RiskLevel::Medium => RecommendationSet {
            immediate: vec![
                "Review the weakest weekday at each location and schedule accordingly".to_string(),
                "Confirm upcoming working-day overrides are still realistic".to_string(),
            ],
            short_term: vec![
                "Line up promotions for the remaining business days of the month".to_string(),
            ],
            long_term: vec![
                "Compare Austin and Charlotte pacing to rebalance monthly targets".to_string(),
            ],
        },
        RiskLevel::High => RecommendationSet {
            immediate: vec![
                "Escalate: current pace will not reach the monthly target".to_string(),
                "Audit the last two weeks for days that fell far below target".to_string(),
            ],
            short_term: vec![
                "Shift staffing toward the location with the larger shortfall".to_string(),
                "Re-forecast the month with updated working-day overrides".to_string(),
            ],
            long_term: vec![
                "Revisit whether the default daily targets match seasonal demand".to_string(),
            ],
        },
    }
}

/// Full executive summary over the current month. Returns an explicit
/// error when the month has no data yet, so callers can distinguish "no
/// data" from a computed result.
pub fn compute_executive_insights(
    records: &[RevenueRecord],
    config: &TargetConfiguration,
    today: NaiveDate,
) -> Result<ExecutiveInsights> {
    let mtd = filter_by_time_frame(
        records,
        &TimeFrame::MonthToDate,
        Location::Combined,
        None,
        config,
        today,
    );

    if mtd.is_empty() {
        return Err(RevenuePulseError::NoData(
            "no records in the current month".to_string(),
        ));
    }

    let trend = classify_trend(&mtd, config);
    let projection = project_month_end(&mtd, config, today);

    let current_target =
        month_combined_target(config, today) * projection.elapsed_business_days as f64;
    let current_attainment = attainment(projection.current_revenue, current_target);

    let consistency = consistency_score(&mtd);
    let confidence = confidence_score(
        projection.remaining_business_days,
        projection.elapsed_business_days + projection.remaining_business_days,
        consistency,
    );

    let risk_level = assess_risk(
        current_attainment,
        projection.projected_attainment,
        consistency,
        confidence,
    );

    Ok(ExecutiveInsights {
        trend,
        current_attainment,
        consistency_score: consistency,
        confidence_score: confidence,
        risk_level,
        action_required: risk_level != RiskLevel::Low,
        recommendations: recommendations_for(risk_level),
        projection,
    })
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}
