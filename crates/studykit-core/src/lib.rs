//! # StudyKit Core Library
//!
//! Business logic for the StudyKit study tools: XP progression, the
//! activity heat-map calendar, and the pomodoro session that ties study
//! time back to both. The `studykit` CLI is a thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Progression**: pure functions from lifetime XP to level, rank and
//!   progress, plus daily study intensity buckets
//! - **Calendar**: Sunday-first 6x7 month grid with recomputed intensity
//! - **Timer**: clock-driven pomodoro state machine with tasks and
//!   reminders; the caller invokes `tick()` for progress
//! - **Storage**: SQLite activity store and TOML configuration
//! - **Remote**: HTTP client for a hosted row-based backend
//!
//! ## Key Components
//!
//! - [`PomodoroSession`]: Pomodoro state machine
//! - [`ExperienceStats`]: Level/rank view of an XP total
//! - [`MonthGrid`]: Heat-map month
//! - [`ActivityStore`]: XP and activity persistence seam

pub mod calendar;
pub mod error;
pub mod events;
pub mod format;
pub mod progression;
pub mod remote;
pub mod storage;
pub mod timer;

pub use calendar::{build_month_grid, build_month_grid_on, ActivityDay, CalendarDay, MonthGrid};
pub use error::{ConfigError, CoreError, DatabaseError, ValidationError};
pub use events::Event;
pub use progression::{
    add_xp, intensity_level, progress_percent, ExperienceStats, RankTitle, XpReward, XpTracker,
    XpUpdate,
};
pub use remote::RestStore;
pub use storage::{open_store, ActivityStore, Config, Database};
pub use timer::{
    Clock, CompletionReporter, ManualClock, Phase, PomodoroSession, PomodoroSettings,
    SessionLogEntry, SystemClock, TaskList,
};
