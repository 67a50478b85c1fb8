//! Date-range presets for list pages

use chrono::{Datelike, Local, NaiveDate};
use foodbooks_config::TimeRange;

use crate::filter::ListFilter;

/// A preset or custom date range, resolved against a reference day
#[derive(Debug, Clone, PartialEq)]
pub struct TimeContext {
    pub range: TimeRange,
    /// Month (1-12) the fiscal year starts in; shifts `year` and `quarter`
    pub fiscal_year_start: u32,
    pub custom_start: Option<NaiveDate>,
    pub custom_end: Option<NaiveDate>,
}

impl Default for TimeContext {
    fn default() -> Self {
        Self::new(TimeRange::All, 1)
    }
}

impl TimeContext {
    pub fn new(range: TimeRange, fiscal_year_start: u32) -> Self {
        Self {
            range,
            fiscal_year_start: fiscal_year_start.clamp(1, 12),
            custom_start: None,
            custom_end: None,
        }
    }

    /// Custom range; either end may be open
    pub fn custom(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self {
            range: TimeRange::Custom,
            fiscal_year_start: 1,
            custom_start: start,
            custom_end: end,
        }
    }

    /// Inclusive `(from, to)` bounds relative to `today`
    pub fn bounds_on(&self, today: NaiveDate) -> (Option<NaiveDate>, Option<NaiveDate>) {
        match self.range {
            TimeRange::Month => {
                let start = first_of_month(today.year(), today.month());
                (start, start.and_then(|s| last_day_after_months(s, 1)))
            }
            TimeRange::Quarter => {
                let start = self.period_start(today, 3);
                (start, start.and_then(|s| last_day_after_months(s, 3)))
            }
            TimeRange::Year => {
                let start = self.period_start(today, 12);
                (start, start.and_then(|s| last_day_after_months(s, 12)))
            }
            TimeRange::All => (None, None),
            TimeRange::Custom => (self.custom_start, self.custom_end),
        }
    }

    /// Bounds relative to the local current date
    pub fn bounds(&self) -> (Option<NaiveDate>, Option<NaiveDate>) {
        self.bounds_on(Local::now().date_naive())
    }

    pub fn contains_on(&self, date: NaiveDate, today: NaiveDate) -> bool {
        let (start, end) = self.bounds_on(today);
        start.map_or(true, |s| date >= s) && end.map_or(true, |e| date <= e)
    }

    pub fn description(&self) -> String {
        match self.range {
            TimeRange::Month => "Current Month".to_string(),
            TimeRange::Quarter => "Current Quarter".to_string(),
            TimeRange::Year if self.fiscal_year_start == 1 => "Current Year".to_string(),
            TimeRange::Year => "Current Financial Year".to_string(),
            TimeRange::All => "All Time".to_string(),
            TimeRange::Custom => match (self.custom_start, self.custom_end) {
                (Some(start), Some(end)) => format!("{} to {}", start, end),
                (Some(start), None) => format!("From {}", start),
                (None, Some(end)) => format!("Until {}", end),
                (None, None) => "Custom Range".to_string(),
            },
        }
    }

    /// Fill the filter's date bounds from this range. Bounds already set on
    /// the filter win.
    pub fn apply_to_on(&self, mut filter: ListFilter, today: NaiveDate) -> ListFilter {
        let (start, end) = self.bounds_on(today);
        filter.from = filter.from.or(start);
        filter.to = filter.to.or(end);
        filter
    }

    pub fn apply_to(&self, filter: ListFilter) -> ListFilter {
        self.apply_to_on(filter, Local::now().date_naive())
    }

    /// Start of the fiscal-aligned period of `months` length containing `today`
    fn period_start(&self, today: NaiveDate, months: u32) -> Option<NaiveDate> {
        let offset = (today.month() + 12 - self.fiscal_year_start) % 12;
        let back = offset % months;
        let mut year = today.year();
        let mut month = today.month() as i32 - back as i32;
        if month < 1 {
            month += 12;
            year -= 1;
        }
        first_of_month(year, month as u32)
    }
}

fn first_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)
}

/// Last day of the span of `months` months starting at `start`
fn last_day_after_months(start: NaiveDate, months: u32) -> Option<NaiveDate> {
    let total = start.month0() + months;
    let year = start.year() + (total / 12) as i32;
    first_of_month(year, total % 12 + 1).and_then(|d| d.pred_opt())
}
