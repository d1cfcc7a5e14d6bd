//! Integration tests for on-disk storage.
//!
//! This test file verifies:
//! - XP and activity survive reopening the database
//! - Config files are created with defaults and reloaded
//! - The calendar reads what the store aggregates

use chrono::{Datelike, Local, NaiveDate, Utc};
use studykit_core::calendar::build_month_grid_on;
use studykit_core::storage::{ActivityStore, BackendMode, Config, Database};
use studykit_core::timer::{Phase, SessionLogEntry};
use studykit_core::XpTracker;
use tempfile::TempDir;

#[test]
fn database_persists_across_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("studykit.db");

    {
        let db = Database::open_at(&path).unwrap();
        db.add_xp(120, "quiz_perfect").unwrap();
        db.kv_set("pomodoro_session", "{}").unwrap();
    }

    let db = Database::open_at(&path).unwrap();
    let stats = db.fetch_xp_stats().unwrap();
    assert_eq!(stats.total_xp, 120);
    assert_eq!(stats.current_level, 2);
    assert_eq!(db.kv_get("pomodoro_session").unwrap().as_deref(), Some("{}"));
}

#[test]
fn tracker_awards_through_database() {
    let dir = TempDir::new().unwrap();
    let db = Database::open_at(&dir.path().join("studykit.db")).unwrap();
    let mut tracker = XpTracker::new();

    let update = tracker.award(&db, 99.9, "manual").unwrap();
    assert_eq!(update.awarded, 99);
    assert!(!update.leveled_up);

    let update = tracker.award(&db, 1.0, "manual").unwrap();
    assert!(update.leveled_up);
    assert_eq!(tracker.refresh(&db).current_level, 2);
    assert!(tracker.last_error().is_none());
}

#[test]
fn calendar_reflects_logged_sessions() {
    let db = Database::open_memory().unwrap();
    let started = Utc::now();
    let today = started.with_timezone(&Local).date_naive();
    for _ in 0..5 {
        db.log_session(&SessionLogEntry {
            phase: Phase::Work,
            duration_minutes: 25,
            started_at: started,
            completed_at: started,
        })
        .unwrap();
    }

    let records = db.fetch_activity().unwrap();
    let grid = build_month_grid_on(today.year(), today.month0(), &records, today).unwrap();
    let cell = grid.days().find(|d| d.is_today).unwrap();
    assert_eq!(cell.minutes_studied, 125);
    assert_eq!(cell.level, 4);
}

#[test]
fn study_minutes_accumulate_per_date() {
    let db = Database::open_memory().unwrap();
    let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
    db.record_study_minutes(date, 20).unwrap();
    db.record_study_minutes(date, 15).unwrap();
    db.record_study_minutes(date, -5).unwrap();
    let days = db.fetch_activity().unwrap();
    assert_eq!(days[0].minutes_studied, 30);
    assert_eq!(days[0].intensity(), 2);
}

#[test]
fn config_created_with_defaults_then_reloaded() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");

    let cfg = Config::load_from(&path).unwrap();
    assert!(path.exists());
    assert_eq!(cfg.pomodoro.work_minutes, 25);
    assert_eq!(cfg.backend.mode, BackendMode::Local);

    let mut cfg = cfg;
    cfg.apply("pomodoro.long_break_minutes", "30").unwrap();
    cfg.save_to(&path).unwrap();

    let reloaded = Config::load_from(&path).unwrap();
    assert_eq!(reloaded.pomodoro.long_break_minutes, 30);
}

#[test]
fn malformed_config_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "pomodoro = 12").unwrap();
    assert!(Config::load_from(&path).is_err());
}
