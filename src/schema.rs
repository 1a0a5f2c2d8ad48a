use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A business location. `Combined` addresses the Austin + Charlotte sum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub enum Location {
    Austin,
    Charlotte,
    Combined,
}

impl Location {
    /// Whether revenue from `other` contributes to figures filtered by `self`.
    pub fn includes(&self, other: Location) -> bool {
        matches!(self, Location::Combined) || *self == other
    }
}

/// One day of revenue, keyed by calendar date. Dates are unique within a
/// dataset; duplicates are a validation error, never silently merged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RevenueRecord {
    pub date: NaiveDate,
    pub austin: f64,
    pub charlotte: f64,
}

impl RevenueRecord {
    pub fn combined(&self) -> f64 {
        self.austin + self.charlotte
    }

    /// Copy of the record with the non-selected location zeroed out, so
    /// downstream aggregation keeps its structure under a location filter.
    pub fn scoped_to(&self, location: Location) -> RevenueRecord {
        RevenueRecord {
            date: self.date,
            austin: if location.includes(Location::Austin) {
                self.austin
            } else {
                0.0
            },
            charlotte: if location.includes(Location::Charlotte) {
                self.charlotte
            } else {
                0.0
            },
        }
    }

    pub fn revenue_for(&self, location: Location) -> f64 {
        match location {
            Location::Austin => self.austin,
            Location::Charlotte => self.charlotte,
            Location::Combined => self.combined(),
        }
    }
}

/// Per-location daily revenue goal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DailyTargetPair {
    #[schemars(description = "Daily revenue goal for the Austin location")]
    pub austin: f64,

    #[schemars(description = "Daily revenue goal for the Charlotte location")]
    pub charlotte: f64,
}

impl DailyTargetPair {
    pub const ZERO: DailyTargetPair = DailyTargetPair {
        austin: 0.0,
        charlotte: 0.0,
    };

    pub fn combined(&self) -> f64 {
        self.austin + self.charlotte
    }

    pub fn target_for(&self, location: Location) -> f64 {
        match location {
            Location::Austin => self.austin,
            Location::Charlotte => self.charlotte,
            Location::Combined => self.combined(),
        }
    }
}

impl Default for DailyTargetPair {
    fn default() -> Self {
        DailyTargetPair {
            austin: 2000.0,
            charlotte: 1800.0,
        }
    }
}

/// Override record narrowing or replacing the default working-day/target
/// rule for one specific month. When present with a non-empty working-day
/// list, the list fully replaces the Mon-Fri weekday rule for that month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MonthlyAdjustment {
    #[schemars(description = "Month index, 0-based (0 = January, 11 = December)")]
    pub month: u32,

    #[schemars(description = "Calendar year the adjustment applies to")]
    pub year: i32,

    #[schemars(
        description = "Days of the month (1-31) that count as working days. Must contain at least one day."
    )]
    pub working_days: Vec<u32>,

    #[serde(default)]
    #[schemars(description = "Optional Austin daily target override for this month")]
    pub austin: Option<f64>,

    #[serde(default)]
    #[schemars(description = "Optional Charlotte daily target override for this month")]
    pub charlotte: Option<f64>,
}

/// Target settings for a computation. Read-only for the duration of every
/// call; no core function mutates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TargetConfiguration {
    #[schemars(description = "Default per-location daily targets, used wherever no monthly adjustment applies")]
    pub daily_targets: DailyTargetPair,

    #[serde(default)]
    #[schemars(description = "Month-specific working-day and target overrides. At most one per (month, year) is meaningful; the first match wins.")]
    pub monthly_adjustments: Vec<MonthlyAdjustment>,
}

impl TargetConfiguration {
    /// First adjustment matching the 0-based month and year, if any.
    pub fn adjustment_for(&self, month0: u32, year: i32) -> Option<&MonthlyAdjustment> {
        self.monthly_adjustments
            .iter()
            .find(|a| a.month == month0 && a.year == year)
    }

    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(TargetConfiguration)
    }

    pub fn schema_as_json() -> crate::error::Result<String> {
        let schema = Self::generate_json_schema();
        Ok(serde_json::to_string_pretty(&schema)?)
    }
}

impl Default for TargetConfiguration {
    fn default() -> Self {
        TargetConfiguration {
            daily_targets: DailyTargetPair::default(),
            monthly_adjustments: Vec::new(),
        }
    }
}

/// Named reporting window. Anchor conventions differ deliberately per
/// frame and are preserved as-is: `ThisWeek` spans the full Monday-Sunday
/// ISO week around today, `MonthToDate` runs through today, while the
/// rolling and year frames anchor on yesterday (the current day is
/// considered incomplete).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "timeFrame")]
pub enum TimeFrame {
    #[serde(rename = "This Week")]
    ThisWeek,
    #[serde(rename = "MTD")]
    MonthToDate,
    #[serde(rename = "last30")]
    Last30,
    #[serde(rename = "last90")]
    Last90,
    #[serde(rename = "YTD")]
    YearToDate,
    /// Explicit inclusive bounds. A `None` bound marks input that failed to
    /// parse at the boundary; filtering then yields an empty set rather
    /// than an error.
    #[serde(rename = "custom")]
    Custom {
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    },
    #[serde(rename = "all")]
    All,
}

impl TimeFrame {
    /// Build a custom frame from raw `YYYY-MM-DD` bounds. Malformed input
    /// becomes a `None` bound instead of an error.
    pub fn custom(start: &str, end: &str) -> TimeFrame {
        TimeFrame::Custom {
            start: crate::calendar::parse_date(start).ok(),
            end: crate::calendar::parse_date(end).ok(),
        }
    }
}

/// Inclusive attainment-percentage band used by the period filter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AttainmentRange {
    pub min: f64,
    pub max: f64,
}

impl AttainmentRange {
    pub fn contains(&self, percent: f64) -> bool {
        percent >= self.min && percent <= self.max
    }
}
