use std::io::Write;
use std::time::Duration;

use clap::Subcommand;
use studykit_core::format::format_countdown;
use studykit_core::timer::{Phase, ReminderNotice};
use studykit_core::Event;

use super::{print_json, CliResult, Workspace};

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start (or resume) the countdown
    Start,
    /// Pause the countdown
    Pause,
    /// Reset the current phase and the session count
    Reset,
    /// Print current timer state as JSON
    Status,
    /// Switch to a phase (work, short-break, long-break), paused
    Switch {
        phase: Phase,
    },
    /// Accept the pending phase and start it
    Next,
    /// Accept the pending phase without starting it
    Dismiss,
    /// Run the countdown in the foreground until the phase completes
    Watch,
}

pub fn run(action: TimerAction) -> CliResult {
    let ws = Workspace::open()?;
    let mut session = ws.load_session();

    // Catch up on whole seconds elapsed since the last invocation.
    let mut events: Vec<Event> = session.tick().into_iter().collect();

    let output = match action {
        TimerAction::Watch => {
            ws.save_session(&session)?;
            ws.report(&events)?;
            return watch(&ws);
        }
        TimerAction::Start => session.start(),
        TimerAction::Pause => session.pause(),
        TimerAction::Reset => Some(session.reset()),
        TimerAction::Status => None,
        TimerAction::Switch { phase } => Some(session.switch_phase(phase)),
        TimerAction::Next => session.start_next_phase(),
        TimerAction::Dismiss => session.dismiss_phase_prompt(),
    };
    ws.save_session(&session)?;
    ws.report(&events)?;

    events.extend(output);
    events.push(session.snapshot());
    print_json(&events)
}

struct StderrSink;

impl studykit_core::timer::NotificationSink for StderrSink {
    fn notify(&mut self, notice: &ReminderNotice) {
        eprintln!("\nreminder: {}", notice.task_text);
    }
}

fn watch(ws: &Workspace) -> CliResult {
    let interval = Duration::from_secs(ws.config.reminders.poll_interval_secs.max(1));
    let mut sink = StderrSink;

    loop {
        let mut session = ws.load_session();
        let completed = session.tick();
        let mut events: Vec<Event> = Vec::new();
        if ws.config.reminders.enabled {
            events.extend(session.poll_reminders(&mut sink));
        }
        ws.save_session(&session)?;

        if let Some(event) = completed {
            ws.report(std::slice::from_ref(&event))?;
            eprintln!();
            return print_json(&event);
        }
        if !session.is_running() {
            eprintln!();
            return print_json(&session.snapshot());
        }

        eprint!(
            "\r{:<12} {}",
            session.phase().as_str(),
            format_countdown(session.time_left_secs())
        );
        std::io::stderr().flush()?;
        std::thread::sleep(interval);
    }
}
