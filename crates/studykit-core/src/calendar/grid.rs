use std::collections::HashMap;

use chrono::{Datelike, Days, Local, NaiveDate};
use serde::{Deserialize, Serialize};

use super::ActivityDay;
use crate::error::ValidationError;
use crate::progression::intensity_level;

pub const GRID_WEEKS: usize = 6;
pub const DAYS_PER_WEEK: usize = 7;

/// One heat-map cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub day_of_month: u32,
    pub is_current_month: bool,
    pub is_today: bool,
    pub minutes_studied: i64,
    pub level: u8,
}

impl CalendarDay {
    fn blank(date: NaiveDate) -> Self {
        Self {
            date,
            day_of_month: date.day(),
            is_current_month: false,
            is_today: false,
            minutes_studied: 0,
            level: 0,
        }
    }
}

/// A month expanded to six Sunday-first weeks, padded with days from the
/// neighbouring months.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthGrid {
    pub year: i32,
    /// Zero-based month.
    pub month0: u32,
    pub weeks: [[CalendarDay; DAYS_PER_WEEK]; GRID_WEEKS],
}

/// Aggregates over the current-month cells of a grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MonthSummary {
    pub total_minutes: i64,
    pub active_days: u32,
    pub best_day: Option<NaiveDate>,
}

impl MonthGrid {
    pub fn days(&self) -> impl Iterator<Item = &CalendarDay> {
        self.weeks.iter().flatten()
    }

    pub fn current_month_days(&self) -> impl Iterator<Item = &CalendarDay> {
        self.days().filter(|d| d.is_current_month)
    }

    pub fn summary(&self) -> MonthSummary {
        let mut summary = MonthSummary::default();
        let mut best = 0i64;
        for day in self.current_month_days() {
            summary.total_minutes += day.minutes_studied;
            if day.minutes_studied > 0 {
                summary.active_days += 1;
                if day.minutes_studied > best {
                    best = day.minutes_studied;
                    summary.best_day = Some(day.date);
                }
            }
        }
        summary
    }
}

/// Build the grid for `month0` of `year` with `is_today` taken from the
/// local wall clock.
pub fn build_month_grid(
    year: i32,
    month0: u32,
    records: &[ActivityDay],
) -> Result<MonthGrid, ValidationError> {
    build_month_grid_on(year, month0, records, Local::now().date_naive())
}

/// Build the grid with an explicit `today`.
///
/// `month0` values above 11 roll into following years. When several
/// records share a date the first one wins.
pub fn build_month_grid_on(
    year: i32,
    month0: u32,
    records: &[ActivityDay],
    today: NaiveDate,
) -> Result<MonthGrid, ValidationError> {
    let year = year
        .checked_add((month0 / 12) as i32)
        .ok_or_else(|| out_of_range(year))?;
    let month0 = month0 % 12;

    let first = NaiveDate::from_ymd_opt(year, month0 + 1, 1).ok_or_else(|| out_of_range(year))?;
    let lead = u64::from(first.weekday().num_days_from_sunday());
    let start = first
        .checked_sub_days(Days::new(lead))
        .ok_or_else(|| out_of_range(year))?;

    let mut minutes: HashMap<NaiveDate, i64> = HashMap::with_capacity(records.len());
    for record in records {
        minutes.entry(record.date).or_insert(record.minutes_studied);
    }

    let mut weeks = [[CalendarDay::blank(start); DAYS_PER_WEEK]; GRID_WEEKS];
    for (offset, cell) in weeks.iter_mut().flatten().enumerate() {
        let date = start
            .checked_add_days(Days::new(offset as u64))
            .ok_or_else(|| out_of_range(year))?;
        let studied = minutes.get(&date).copied().unwrap_or(0);
        *cell = CalendarDay {
            date,
            day_of_month: date.day(),
            is_current_month: date.month0() == month0,
            is_today: date == today,
            minutes_studied: studied,
            level: intensity_level(studied),
        };
    }

    Ok(MonthGrid {
        year,
        month0,
        weeks,
    })
}

/// Consecutive days with study minutes ending at `today`, or at yesterday
/// when nothing has been logged yet today.
pub fn study_streak(records: &[ActivityDay], today: NaiveDate) -> u32 {
    let mut studied: HashMap<NaiveDate, i64> = HashMap::new();
    for record in records {
        *studied.entry(record.date).or_insert(0) += record.minutes_studied;
    }
    let active = |d: &NaiveDate| studied.get(d).is_some_and(|m| *m > 0);

    let mut cursor = if active(&today) {
        today
    } else {
        match today.pred_opt() {
            Some(d) => d,
            None => return 0,
        }
    };
    let mut streak = 0;
    while active(&cursor) {
        streak += 1;
        cursor = match cursor.pred_opt() {
            Some(d) => d,
            None => break,
        };
    }
    streak
}

fn out_of_range(year: i32) -> ValidationError {
    ValidationError::InvalidValue {
        field: "year".into(),
        message: format!("{year} is outside the supported calendar range"),
    }
}
