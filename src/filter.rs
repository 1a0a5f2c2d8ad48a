use crate::schema::{AttainmentRange, Location, RevenueRecord, TargetConfiguration, TimeFrame};
use crate::targets::{attainment, resolve_daily_target};
use crate::calendar::week_start;
use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Inclusive date bounds a time frame resolves to for a given `today`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// Resolve a time frame to its window, anchored on `today`. The anchor
/// conventions differ per frame and are kept exactly as documented on
/// [`TimeFrame`]: the rolling and year frames end on yesterday, MTD ends on
/// today, and the week frame covers the whole Monday-Sunday ISO week.
///
/// `None` means the frame cannot produce a window (a custom frame with a
/// missing bound); callers treat that as an empty selection.
pub fn resolve_window(frame: &TimeFrame, today: NaiveDate) -> Option<DateWindow> {
    let yesterday = today.pred_opt()?;

    let window = match frame {
        TimeFrame::ThisWeek => {
            let monday = week_start(today);
            DateWindow {
                start: monday,
                end: monday + Duration::days(6),
            }
        }
        TimeFrame::MonthToDate => DateWindow {
            start: NaiveDate::from_ymd_opt(today.year(), today.month(), 1)?,
            end: today,
        },
        TimeFrame::Last30 => DateWindow {
            start: yesterday - Duration::days(29),
            end: yesterday,
        },
        TimeFrame::Last90 => DateWindow {
            start: yesterday - Duration::days(89),
            end: yesterday,
        },
        TimeFrame::YearToDate => DateWindow {
            start: NaiveDate::from_ymd_opt(today.year(), 1, 1)?,
            end: yesterday,
        },
        TimeFrame::Custom { start, end } => DateWindow {
            start: (*start)?,
            end: (*end)?,
        },
        TimeFrame::All => DateWindow {
            start: NaiveDate::MIN,
            end: yesterday,
        },
    };

    Some(window)
}

/// Select the records matching a time frame, with the non-selected
/// location zeroed out and an optional attainment band applied. The input
/// is never mutated; the result is sorted ascending by date.
///
/// The attainment band keeps a record if any of its Austin, Charlotte, or
/// combined daily attainments (against the resolved target for that date)
/// falls inside the band.
pub fn filter_by_time_frame(
    records: &[RevenueRecord],
    frame: &TimeFrame,
    location: Location,
    attainment_band: Option<AttainmentRange>,
    config: &TargetConfiguration,
    today: NaiveDate,
) -> Vec<RevenueRecord> {
    let window = match resolve_window(frame, today) {
        Some(w) => w,
        None => return Vec::new(),
    };

    let mut selected: Vec<RevenueRecord> = records
        .iter()
        .map(|r| r.scoped_to(location))
        .filter(|r| window.contains(r.date))
        .filter(|r| match attainment_band {
            Some(band) => daily_attainment_in_band(r, config, band),
            None => true,
        })
        .collect();

    selected.sort_by_key(|r| r.date);
    selected
}

fn daily_attainment_in_band(
    record: &RevenueRecord,
    config: &TargetConfiguration,
    band: AttainmentRange,
) -> bool {
    let target = resolve_daily_target(record.date, config);

    let austin = attainment(record.austin, target.austin);
    let charlotte = attainment(record.charlotte, target.charlotte);
    let combined = attainment(record.combined(), target.combined());

    band.contains(austin) || band.contains(charlotte) || band.contains(combined)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(y: i32, m: u32, d: u32, austin: f64, charlotte: f64) -> RevenueRecord {
        RevenueRecord {
            date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            austin,
            charlotte,
        }
    }

    fn config() -> TargetConfiguration {
        TargetConfiguration {
            daily_targets: crate::schema::DailyTargetPair {
                austin: 1000.0,
                charlotte: 1000.0,
            },
            monthly_adjustments: Vec::new(),
        }
    }

    // 2025-06-04 is a Wednesday
    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 4).unwrap()
    }

    #[test]
    fn test_window_this_week() {
        let w = resolve_window(&TimeFrame::ThisWeek, today()).unwrap();
        assert_eq!(w.start, NaiveDate::from_ymd_opt(2025, 6, 2).unwrap());
        assert_eq!(w.end, NaiveDate::from_ymd_opt(2025, 6, 8).unwrap());
    }

    #[test]
    fn test_window_mtd_includes_today() {
        let w = resolve_window(&TimeFrame::MonthToDate, today()).unwrap();
        assert_eq!(w.start, NaiveDate::from_ymd_opt(2025, 6, 1).unwrap());
        assert_eq!(w.end, today());
    }

    #[test]
    fn test_window_rolling_frames_anchor_on_yesterday() {
        let yesterday = NaiveDate::from_ymd_opt(2025, 6, 3).unwrap();

        let w30 = resolve_window(&TimeFrame::Last30, today()).unwrap();
        assert_eq!(w30.end, yesterday);
        assert_eq!(w30.start, yesterday - Duration::days(29));

        let w90 = resolve_window(&TimeFrame::Last90, today()).unwrap();
        assert_eq!(w90.end, yesterday);
        assert_eq!(w90.start, yesterday - Duration::days(89));

        let ytd = resolve_window(&TimeFrame::YearToDate, today()).unwrap();
        assert_eq!(ytd.start, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        assert_eq!(ytd.end, yesterday);
    }

    #[test]
    fn test_custom_with_missing_bound_selects_nothing() {
        let frame = TimeFrame::custom("garbage", "2025-06-03");
        let records = vec![record(2025, 6, 2, 900.0, 800.0)];
        let result =
            filter_by_time_frame(&records, &frame, Location::Combined, None, &config(), today());
        assert!(result.is_empty());
    }

    #[test]
    fn test_location_filter_zeroes_other_side() {
        let records = vec![record(2025, 6, 2, 900.0, 800.0)];
        let result = filter_by_time_frame(
            &records,
            &TimeFrame::MonthToDate,
            Location::Charlotte,
            None,
            &config(),
            today(),
        );
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].austin, 0.0);
        assert_eq!(result[0].charlotte, 800.0);
        // input untouched
        assert_eq!(records[0].austin, 900.0);
    }

    #[test]
    fn test_attainment_band() {
        let records = vec![
            record(2025, 6, 2, 500.0, 0.0),  // austin 50%
            record(2025, 6, 3, 1500.0, 0.0), // austin 150%
        ];
        let band = AttainmentRange {
            min: 100.0,
            max: 200.0,
        };
        let result = filter_by_time_frame(
            &records,
            &TimeFrame::MonthToDate,
            Location::Combined,
            Some(band),
            &config(),
            today(),
        );
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].date, NaiveDate::from_ymd_opt(2025, 6, 3).unwrap());
    }

    #[test]
    fn test_result_sorted_and_filter_idempotent() {
        let records = vec![
            record(2025, 6, 3, 100.0, 100.0),
            record(2025, 6, 1, 300.0, 300.0),
            record(2025, 6, 2, 200.0, 200.0),
            record(2025, 7, 1, 999.0, 999.0), // outside MTD
        ];

        let once = filter_by_time_frame(
            &records,
            &TimeFrame::MonthToDate,
            Location::Combined,
            None,
            &config(),
            today(),
        );
        assert_eq!(once.len(), 3);
        assert!(once.windows(2).all(|w| w[0].date < w[1].date));

        let twice = filter_by_time_frame(
            &once,
            &TimeFrame::MonthToDate,
            Location::Combined,
            None,
            &config(),
            today(),
        );
        assert_eq!(once, twice);
    }

    #[test]
    fn test_all_frame_excludes_today() {
        let records = vec![
            record(2025, 6, 3, 100.0, 100.0),
            record(2025, 6, 4, 200.0, 200.0), // today, incomplete
            record(2024, 12, 31, 50.0, 50.0),
        ];
        let result = filter_by_time_frame(
            &records,
            &TimeFrame::All,
            Location::Combined,
            None,
            &config(),
            today(),
        );
        assert_eq!(result.len(), 2);
        assert!(result.iter().all(|r| r.date < today()));
    }
}
