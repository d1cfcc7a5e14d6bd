//! Pomodoro session state machine.
//!
//! The session owns its countdown: there is no background thread, the
//! caller drives progress with `tick()` and the injected [`Clock`] decides
//! how many whole seconds have elapsed. At most one countdown exists, and
//! every stop path (pause, reset, phase switch, completion) drops it.
//!
//! ## Phase flow
//!
//! ```text
//! Work -> ShortBreak (or LongBreak every n-th work phase) -> Work
//! ```
//!
//! Completion never advances on its own. It raises a pending-phase prompt
//! that `start_next_phase()` or `dismiss_phase_prompt()` resolves.
//!
//! ```ignore
//! let mut session = PomodoroSession::new(PomodoroSettings::default());
//! session.start();
//! // In a loop:
//! if let Some(event) = session.tick() { /* PhaseCompleted */ }
//! ```

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::clock::{Clock, SystemClock};
use super::phase::{Phase, PomodoroSettings};
use super::tasks::{NotificationSink, TaskList};
use crate::error::ValidationError;
use crate::events::Event;
use crate::progression::POMODORO_WORK;

/// The running one-second interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
struct Countdown {
    next_tick_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(serialize = "", deserialize = "C: Default"))]
pub struct PomodoroSession<C: Clock = SystemClock> {
    settings: PomodoroSettings,
    phase: Phase,
    time_left_secs: u64,
    session_count: u32,
    /// Set by the first `start()` after a reset or phase switch.
    #[serde(default)]
    session_started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    countdown: Option<Countdown>,
    #[serde(default)]
    pending_next_phase: Option<Phase>,
    #[serde(default)]
    tasks: TaskList,
    #[serde(skip)]
    clock: C,
}

impl PomodoroSession<SystemClock> {
    pub fn new(settings: PomodoroSettings) -> Self {
        Self::with_clock(settings, SystemClock)
    }
}

impl Default for PomodoroSession<SystemClock> {
    fn default() -> Self {
        Self::new(PomodoroSettings::default())
    }
}

impl<C: Clock> PomodoroSession<C> {
    /// Starts paused in the `Work` phase with a full countdown.
    pub fn with_clock(settings: PomodoroSettings, clock: C) -> Self {
        Self {
            time_left_secs: settings.secs_for(Phase::Work),
            settings,
            phase: Phase::Work,
            session_count: 0,
            session_started_at: None,
            countdown: None,
            pending_next_phase: None,
            tasks: TaskList::new(),
            clock,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn time_left_secs(&self) -> u64 {
        self.time_left_secs
    }

    pub fn is_running(&self) -> bool {
        self.countdown.is_some()
    }

    pub fn session_count(&self) -> u32 {
        self.session_count
    }

    pub fn settings(&self) -> &PomodoroSettings {
        &self.settings
    }

    pub fn session_started_at(&self) -> Option<DateTime<Utc>> {
        self.session_started_at
    }

    pub fn pending_next_phase(&self) -> Option<Phase> {
        self.pending_next_phase
    }

    pub fn pending_phase_prompt(&self) -> bool {
        self.pending_next_phase.is_some()
    }

    pub fn tasks(&self) -> &TaskList {
        &self.tasks
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn total_secs(&self) -> u64 {
        self.settings.secs_for(self.phase)
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            phase: self.phase,
            remaining_secs: self.time_left_secs,
            total_secs: self.total_secs(),
            is_running: self.is_running(),
            session_count: self.session_count,
            pending_next_phase: self.pending_next_phase,
            pending_phase_prompt: self.pending_phase_prompt(),
            at: self.clock.now(),
        }
    }

    // ── Timer commands ───────────────────────────────────────────────

    /// Begin counting down. No-op while already running or while a
    /// completed phase is waiting on its prompt.
    pub fn start(&mut self) -> Option<Event> {
        if self.is_running() || self.pending_phase_prompt() {
            return None;
        }
        let now = self.clock.now();
        if self.time_left_secs == 0 {
            self.time_left_secs = self.total_secs();
        }
        if self.session_started_at.is_none() {
            self.session_started_at = Some(now);
        }
        self.countdown = Some(Countdown {
            next_tick_at: now + Duration::seconds(1),
        });
        tracing::debug!(phase = %self.phase, remaining = self.time_left_secs, "timer started");
        Some(Event::TimerStarted {
            phase: self.phase,
            remaining_secs: self.time_left_secs,
            at: now,
        })
    }

    /// Stop counting down, keeping the remaining time and session start.
    pub fn pause(&mut self) -> Option<Event> {
        self.countdown.take()?;
        Some(Event::TimerPaused {
            phase: self.phase,
            remaining_secs: self.time_left_secs,
            at: self.clock.now(),
        })
    }

    /// Restore the current phase's full duration and clear the session
    /// count. Tasks are kept.
    pub fn reset(&mut self) -> Event {
        self.countdown = None;
        self.time_left_secs = self.total_secs();
        self.session_count = 0;
        self.session_started_at = None;
        self.pending_next_phase = None;
        Event::TimerReset {
            phase: self.phase,
            at: self.clock.now(),
        }
    }

    /// Manual phase override, available in any state. Leaves the timer
    /// paused at the new phase's full duration.
    pub fn switch_phase(&mut self, phase: Phase) -> Event {
        let from = self.phase;
        self.enter_phase(phase);
        Event::PhaseSwitched {
            from,
            to: phase,
            at: self.clock.now(),
        }
    }

    /// Consume every whole second elapsed since the last tick.
    ///
    /// Returns `PhaseCompleted` when the countdown reaches zero.
    pub fn tick(&mut self) -> Option<Event> {
        let now = self.clock.now();
        while let Some(countdown) = self.countdown {
            if now < countdown.next_tick_at {
                break;
            }
            self.time_left_secs = self.time_left_secs.saturating_sub(1);
            if self.time_left_secs == 0 {
                return Some(self.complete(countdown.next_tick_at));
            }
            self.countdown = Some(Countdown {
                next_tick_at: countdown.next_tick_at + Duration::seconds(1),
            });
        }
        None
    }

    /// Answer the prompt by moving to the pending phase and starting it.
    pub fn start_next_phase(&mut self) -> Option<Event> {
        let next = self.pending_next_phase?;
        let from = self.phase;
        self.enter_phase(next);
        self.start();
        Some(Event::PhaseAdvanced {
            from,
            to: next,
            auto_started: true,
            at: self.clock.now(),
        })
    }

    /// Answer the prompt by moving to the pending phase, paused.
    pub fn dismiss_phase_prompt(&mut self) -> Option<Event> {
        let next = self.pending_next_phase?;
        let from = self.phase;
        self.enter_phase(next);
        Some(Event::PhaseAdvanced {
            from,
            to: next,
            auto_started: false,
            at: self.clock.now(),
        })
    }

    /// Replace durations. The remaining time follows the new duration only
    /// when the current phase's minutes changed and it has not been started;
    /// running and paused phases keep their countdown.
    pub fn update_settings(&mut self, settings: PomodoroSettings) -> Result<Event, ValidationError> {
        settings.validate()?;
        let phase_changed =
            settings.minutes_for(self.phase) != self.settings.minutes_for(self.phase);
        self.settings = settings;
        if phase_changed && !self.is_running() && self.session_started_at.is_none() {
            self.time_left_secs = self.total_secs();
        }
        Ok(Event::SettingsUpdated {
            settings,
            at: self.clock.now(),
        })
    }

    // ── Tasks ────────────────────────────────────────────────────────

    pub fn add_task(&mut self, text: impl Into<String>) -> Event {
        let now = self.clock.now();
        let task = self.tasks.add(text, now);
        Event::TaskAdded {
            task_id: task.id,
            text: task.text.clone(),
            at: now,
        }
    }

    pub fn toggle_task(&mut self, id: Uuid) -> Result<Event, ValidationError> {
        let completed = self.tasks.toggle(id)?;
        Ok(Event::TaskToggled {
            task_id: id,
            completed,
            at: self.clock.now(),
        })
    }

    pub fn remove_task(&mut self, id: Uuid) -> Result<Event, ValidationError> {
        self.tasks.remove(id)?;
        Ok(Event::TaskRemoved {
            task_id: id,
            at: self.clock.now(),
        })
    }

    /// Set a reminder, or clear it with `None`.
    pub fn set_reminder(
        &mut self,
        id: Uuid,
        remind_at: Option<DateTime<Utc>>,
    ) -> Result<Event, ValidationError> {
        match remind_at {
            Some(time) => self.tasks.set_reminder(id, time)?,
            None => self.tasks.clear_reminder(id)?,
        }
        Ok(Event::ReminderSet {
            task_id: id,
            remind_at,
            at: self.clock.now(),
        })
    }

    pub fn mark_notified(&mut self, id: Uuid) -> bool {
        self.tasks.mark_notified(id)
    }

    /// Deliver due reminders to `sink`, each exactly once.
    pub fn poll_reminders(&mut self, sink: &mut dyn NotificationSink) -> Vec<Event> {
        let now = self.clock.now();
        self.tasks
            .poll_reminders(now, sink)
            .into_iter()
            .map(|notice| Event::ReminderDue {
                task_id: notice.task_id,
                task_text: notice.task_text,
                at: now,
            })
            .collect()
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn enter_phase(&mut self, phase: Phase) {
        self.countdown = None;
        self.phase = phase;
        self.time_left_secs = self.settings.secs_for(phase);
        self.session_started_at = None;
        self.pending_next_phase = None;
    }

    fn next_phase_after(&self, finished: Phase) -> Phase {
        match finished {
            Phase::Work => {
                let every = self.settings.sessions_before_long_break.max(1);
                if self.session_count % every == 0 {
                    Phase::LongBreak
                } else {
                    Phase::ShortBreak
                }
            }
            Phase::ShortBreak | Phase::LongBreak => Phase::Work,
        }
    }

    fn complete(&mut self, completed_at: DateTime<Utc>) -> Event {
        self.countdown = None;
        let finished = self.phase;
        if finished == Phase::Work {
            self.session_count = self.session_count.saturating_add(1);
        }
        let next = self.next_phase_after(finished);
        let started_at = self.session_started_at.take();
        let xp_award = if finished == Phase::Work && started_at.is_some() {
            POMODORO_WORK
        } else {
            0
        };
        self.pending_next_phase = Some(next);
        tracing::debug!(
            phase = %finished,
            next = %next,
            sessions = self.session_count,
            "phase completed"
        );
        Event::PhaseCompleted {
            phase: finished,
            duration_min: self.settings.minutes_for(finished),
            started_at,
            completed_at,
            next_phase: next,
            session_count: self.session_count,
            xp_award,
        }
    }
}
