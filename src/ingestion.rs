use crate::calendar::{format_date, parse_date};
use crate::error::{Result, RevenuePulseError};
use crate::schema::RevenueRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A revenue row as it arrives from a data source (spreadsheet export,
/// JSON payload): the date still a string, nothing checked yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenueRow {
    pub date: String,
    pub austin: f64,
    pub charlotte: f64,
}

impl From<&RevenueRecord> for RevenueRow {
    fn from(record: &RevenueRecord) -> Self {
        RevenueRow {
            date: format_date(record.date),
            austin: record.austin,
            charlotte: record.charlotte,
        }
    }
}

/// Convert raw rows into typed records, sorted ascending by date. Strict:
/// a malformed date, a negative or non-finite amount, or a duplicate date
/// rejects the whole batch. Run the validator instead for a full report.
pub fn parse_rows(rows: &[RevenueRow]) -> Result<Vec<RevenueRecord>> {
    let mut by_date: BTreeMap<chrono::NaiveDate, RevenueRecord> = BTreeMap::new();

    for row in rows {
        let date = parse_date(&row.date)?;

        for (location, value) in [("Austin", row.austin), ("Charlotte", row.charlotte)] {
            if !value.is_finite() || value < 0.0 {
                return Err(RevenuePulseError::InvalidRevenue {
                    date: row.date.clone(),
                    location: location.to_string(),
                    value,
                });
            }
        }

        let record = RevenueRecord {
            date,
            austin: row.austin,
            charlotte: row.charlotte,
        };

        if by_date.insert(date, record).is_some() {
            return Err(RevenuePulseError::DuplicateDate {
                date: row.date.clone(),
            });
        }
    }

    Ok(by_date.into_values().collect())
}
