//! Integration tests for the pomodoro session.
//!
//! This test file verifies:
//! - The work/break cycle and long-break cadence
//! - Countdown exclusivity under repeated starts
//! - Completion reporting into a real store, including failure paths

use std::cell::RefCell;

use chrono::{DateTime, Utc};
use studykit_core::calendar::ActivityDay;
use studykit_core::error::{CoreError, Result};
use studykit_core::progression::{ExperienceStats, XpUpdate};
use studykit_core::storage::{ActivityStore, Database};
use studykit_core::timer::{
    CompletionReporter, ManualClock, Phase, PomodoroSession, PomodoroSettings, ReminderNotice,
    SessionLogEntry, TracingObserver,
};
use studykit_core::{Event, XpTracker};

fn t0() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2024-05-01T09:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

fn settings() -> PomodoroSettings {
    PomodoroSettings {
        work_minutes: 25,
        short_break_minutes: 5,
        long_break_minutes: 15,
        sessions_before_long_break: 4,
    }
}

fn run_phase(session: &mut PomodoroSession<ManualClock>, clock: &ManualClock) -> Event {
    session.start();
    clock.advance_secs(session.time_left_secs() as i64);
    session.tick().expect("phase should complete")
}

#[test]
fn four_work_phases_end_in_long_break() {
    let clock = ManualClock::starting_at(t0());
    let mut session = PomodoroSession::with_clock(settings(), clock.clone());

    let mut pending = Vec::new();
    let mut counts = Vec::new();
    for _ in 0..4 {
        assert_eq!(session.phase(), Phase::Work);
        run_phase(&mut session, &clock);
        pending.push(session.pending_next_phase().unwrap());
        counts.push(session.session_count());

        // Take the break, then come back to work.
        session.start_next_phase();
        let break_event = {
            clock.advance_secs(session.time_left_secs() as i64);
            session.tick().unwrap()
        };
        assert!(matches!(break_event, Event::PhaseCompleted { next_phase: Phase::Work, .. }));
        session.dismiss_phase_prompt();
    }

    assert_eq!(
        pending,
        vec![Phase::ShortBreak, Phase::ShortBreak, Phase::ShortBreak, Phase::LongBreak]
    );
    assert_eq!(counts, vec![1, 2, 3, 4]);
}

#[test]
fn repeated_start_decrements_once_per_second() {
    let clock = ManualClock::starting_at(t0());
    let mut session = PomodoroSession::with_clock(settings(), clock.clone());
    session.start();
    session.start();
    session.start();
    for expected in (1490..1500).rev() {
        clock.advance_secs(1);
        session.tick();
        session.tick();
        assert_eq!(session.time_left_secs(), expected);
    }
}

#[test]
fn catch_up_after_long_gap_completes_once() {
    let clock = ManualClock::starting_at(t0());
    let mut session = PomodoroSession::with_clock(settings(), clock.clone());
    session.start();
    clock.advance_secs(3 * 3600);
    let event = session.tick();
    assert!(matches!(event, Some(Event::PhaseCompleted { .. })));
    assert!(session.tick().is_none());
    assert_eq!(session.time_left_secs(), 0);
    assert_eq!(session.session_count(), 1);
}

#[test]
fn completed_work_lands_in_local_store() {
    let db = Database::open_memory().unwrap();
    let clock = ManualClock::starting_at(Utc::now());
    let mut session = PomodoroSession::with_clock(settings(), clock.clone());
    let mut tracker = XpTracker::new();

    let event = run_phase(&mut session, &clock);
    let update = CompletionReporter::new(&db, &TracingObserver)
        .handle(&event, &mut tracker)
        .unwrap();

    assert_eq!(update.stats.total_xp, 15);
    assert_eq!(db.fetch_xp_stats().unwrap().total_xp, 15);
    let activity = db.fetch_activity().unwrap();
    assert_eq!(activity.len(), 1);
    assert_eq!(activity[0].minutes_studied, 25);
    assert_eq!(activity[0].intensity(), 1);
}

struct DownStore;

impl ActivityStore for DownStore {
    fn fetch_xp_stats(&self) -> Result<ExperienceStats> {
        Err(CoreError::remote_fetch("fetch_xp_stats", "connection refused"))
    }
    fn add_xp(&self, _amount: u64, _reason: &str) -> Result<XpUpdate> {
        Err(CoreError::remote_log("add_xp", "connection refused"))
    }
    fn log_session(&self, _entry: &SessionLogEntry) -> Result<()> {
        Err(CoreError::remote_log("log_session", "connection refused"))
    }
    fn fetch_activity(&self) -> Result<Vec<ActivityDay>> {
        Err(CoreError::remote_fetch("fetch_activity", "connection refused"))
    }
    fn record_study_minutes(&self, _date: chrono::NaiveDate, _minutes: i64) -> Result<()> {
        Err(CoreError::remote_log("record_study_minutes", "connection refused"))
    }
}

#[test]
fn unreachable_store_never_blocks_the_session() {
    let clock = ManualClock::starting_at(t0());
    let mut session = PomodoroSession::with_clock(settings(), clock.clone());
    let mut tracker = XpTracker::new();
    let failures = RefCell::new(Vec::new());
    let observer = |e: &CoreError| failures.borrow_mut().push(e.is_remote());

    let event = run_phase(&mut session, &clock);
    assert!(session.pending_phase_prompt());

    let update = CompletionReporter::new(&DownStore, &observer).handle(&event, &mut tracker);
    assert!(update.is_none());
    assert_eq!(*failures.borrow(), vec![true, true]);

    assert_eq!(session.session_count(), 1);
    assert_eq!(session.pending_next_phase(), Some(Phase::ShortBreak));
    assert!(session.start_next_phase().is_some());
    assert!(session.is_running());

    assert_eq!(tracker.refresh(&DownStore), ExperienceStats::from_total(0));
    assert!(tracker.last_error().is_some());
}

#[test]
fn reminders_fire_through_session() {
    let clock = ManualClock::starting_at(t0());
    let mut session = PomodoroSession::with_clock(settings(), clock.clone());
    let id = match session.add_task("review deck") {
        Event::TaskAdded { task_id, .. } => task_id,
        other => panic!("unexpected {other:?}"),
    };
    session
        .set_reminder(id, Some(t0() + chrono::Duration::minutes(10)))
        .unwrap();

    let mut sink: Vec<ReminderNotice> = Vec::new();
    assert!(session.poll_reminders(&mut sink).is_empty());
    clock.advance_secs(600);
    assert_eq!(session.poll_reminders(&mut sink).len(), 1);
    assert!(session.poll_reminders(&mut sink).is_empty());
    assert_eq!(sink.len(), 1);
    assert!(!session.mark_notified(id));
}
