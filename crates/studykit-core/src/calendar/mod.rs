//! Activity calendar.
//!
//! Expands a month into a fixed Sunday-first 6x7 heat-map grid. Intensity
//! is always recomputed from `minutes_studied`; a `level` carried on an
//! input [`ActivityDay`] is never trusted.

mod grid;

pub use grid::{
    build_month_grid, build_month_grid_on, study_streak, CalendarDay, MonthGrid, MonthSummary,
    DAYS_PER_WEEK, GRID_WEEKS,
};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::progression::intensity_level;

/// Study minutes logged on one local calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityDay {
    /// Serialized as `YYYY-MM-DD`.
    pub date: NaiveDate,
    pub minutes_studied: i64,
    /// Intensity as reported by whoever produced the record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u8>,
}

impl ActivityDay {
    pub fn new(date: NaiveDate, minutes_studied: i64) -> Self {
        Self {
            date,
            minutes_studied,
            level: Some(intensity_level(minutes_studied)),
        }
    }

    /// Intensity derived from the minutes, ignoring any stored level.
    pub fn intensity(&self) -> u8 {
        intensity_level(self.minutes_studied)
    }
}
