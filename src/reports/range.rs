use chrono::{DateTime, Datelike, Days, Months, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use super::{ReportError, ReportFilters};
use crate::utils::local_midnight;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TimeRange {
    Today,
    Week,
    #[default]
    Month,
    Quarter,
    Year,
    Custom,
}

/// Half-open `[start, end)` interval of instants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateWindow {
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at < self.end
    }
}

/// Calendar years a report window may touch
const MIN_REPORT_YEAR: i32 = 1;
const MAX_REPORT_YEAR: i32 = 9999;

fn first_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)
}

fn in_supported_range(date: NaiveDate) -> Result<NaiveDate, ReportError> {
    if (MIN_REPORT_YEAR..=MAX_REPORT_YEAR).contains(&date.year()) {
        Ok(date)
    } else {
        Err(ReportError::OutOfRange)
    }
}

fn add_days(date: NaiveDate, days: u64) -> Result<NaiveDate, ReportError> {
    date.checked_add_days(Days::new(days)).ok_or(ReportError::OutOfRange)
}

fn add_months(date: NaiveDate, months: u32) -> Result<NaiveDate, ReportError> {
    date.checked_add_months(Months::new(months)).ok_or(ReportError::OutOfRange)
}

/// Local calendar days `[first, last_exclusive)` mapped to instants in `tz`
fn days_window(first: NaiveDate, last_exclusive: NaiveDate, tz: Tz) -> DateWindow {
    DateWindow {
        start: local_midnight(first, tz),
        end: local_midnight(last_exclusive, tz),
    }
}

/// Window for the selected time range, evaluated in the report timezone.
///
/// Weeks start on Sunday. A custom range covers both end dates in full and must lie
/// within years 1 to 9999.
pub fn report_window(filters: &ReportFilters, now: DateTime<Utc>, tz: Tz) -> Result<DateWindow, ReportError> {
    let today = now.with_timezone(&tz).date_naive();

    let (first, last_exclusive) = match filters.time_range {
        TimeRange::Today => (today, add_days(today, 1)?),
        TimeRange::Week => {
            let sunday = today
                .checked_sub_days(Days::new(u64::from(today.weekday().num_days_from_sunday())))
                .ok_or(ReportError::OutOfRange)?;
            (sunday, add_days(sunday, 7)?)
        }
        TimeRange::Month => {
            let first = first_of_month(today.year(), today.month()).unwrap_or(today);
            (first, add_months(first, 1)?)
        }
        TimeRange::Quarter => {
            let quarter_month = (today.month0() / 3) * 3 + 1;
            let first = first_of_month(today.year(), quarter_month).unwrap_or(today);
            (first, add_months(first, 3)?)
        }
        TimeRange::Year => {
            let first = first_of_month(today.year(), 1).unwrap_or(today);
            (first, add_months(first, 12)?)
        }
        TimeRange::Custom => {
            let (Some(start), Some(end)) = (filters.start_date, filters.end_date) else {
                return Err(ReportError::MissingCustomRange);
            };
            let (start, end) = (in_supported_range(start)?, in_supported_range(end)?);
            if end < start {
                return Err(ReportError::InvertedRange);
            }
            (start, add_days(end, 1)?)
        }
    };

    Ok(days_window(first, last_exclusive, tz))
}
