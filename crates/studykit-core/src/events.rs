use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::timer::{Phase, PomodoroSettings, SessionLogEntry};

/// Every session state change produces an Event.
/// The CLI prints them; the completion reporter consumes them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        phase: Phase,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        phase: Phase,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerReset {
        phase: Phase,
        at: DateTime<Utc>,
    },
    PhaseSwitched {
        from: Phase,
        to: Phase,
        at: DateTime<Utc>,
    },
    /// Countdown reached zero. Local state is already final when this is
    /// emitted; `started_at` is absent when no start was recorded.
    PhaseCompleted {
        phase: Phase,
        duration_min: u32,
        started_at: Option<DateTime<Utc>>,
        completed_at: DateTime<Utc>,
        next_phase: Phase,
        session_count: u32,
        xp_award: u64,
    },
    /// The pending-phase prompt was answered.
    PhaseAdvanced {
        from: Phase,
        to: Phase,
        auto_started: bool,
        at: DateTime<Utc>,
    },
    SettingsUpdated {
        settings: PomodoroSettings,
        at: DateTime<Utc>,
    },
    TaskAdded {
        task_id: Uuid,
        text: String,
        at: DateTime<Utc>,
    },
    TaskToggled {
        task_id: Uuid,
        completed: bool,
        at: DateTime<Utc>,
    },
    TaskRemoved {
        task_id: Uuid,
        at: DateTime<Utc>,
    },
    ReminderSet {
        task_id: Uuid,
        remind_at: Option<DateTime<Utc>>,
        at: DateTime<Utc>,
    },
    ReminderDue {
        task_id: Uuid,
        task_text: String,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        phase: Phase,
        remaining_secs: u64,
        total_secs: u64,
        is_running: bool,
        session_count: u32,
        pending_next_phase: Option<Phase>,
        pending_phase_prompt: bool,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// The session log entry for a completed phase that had a recorded start.
    pub fn session_log_entry(&self) -> Option<SessionLogEntry> {
        match self {
            Event::PhaseCompleted {
                phase,
                duration_min,
                started_at: Some(started_at),
                completed_at,
                ..
            } => Some(SessionLogEntry {
                phase: *phase,
                duration_minutes: *duration_min,
                started_at: *started_at,
                completed_at: *completed_at,
            }),
            _ => None,
        }
    }
}
