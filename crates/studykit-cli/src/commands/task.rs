use chrono::{DateTime, Duration, Utc};
use clap::Subcommand;
use studykit_core::timer::ReminderNotice;
use studykit_core::ValidationError;

use super::{print_json, CliResult, Workspace};

#[derive(Subcommand)]
pub enum TaskAction {
    /// Add a task to the current session
    Add {
        /// Task text
        #[arg(num_args = 1.., trailing_var_arg = true)]
        text: Vec<String>,
    },
    /// List tasks
    List,
    /// Toggle a task's completion
    Toggle {
        /// Task id or unique prefix
        id: String,
    },
    /// Remove a task
    Remove {
        /// Task id or unique prefix
        id: String,
    },
    /// Set a reminder (RFC 3339 timestamp, or relative like +10m / +2h)
    Remind {
        /// Task id or unique prefix
        id: String,
        /// When to remind
        at: String,
    },
    /// Clear a reminder
    Unremind {
        /// Task id or unique prefix
        id: String,
    },
    /// Deliver reminders that are due now
    Due,
}

pub fn run(action: TaskAction) -> CliResult {
    let ws = Workspace::open()?;
    let mut session = ws.load_session();

    let output = match action {
        TaskAction::Add { text } => session.add_task(text.join(" ")),
        TaskAction::List => {
            let tasks: Vec<_> = session.tasks().iter().cloned().collect();
            return print_json(&tasks);
        }
        TaskAction::Toggle { id } => {
            let id = session.tasks().resolve(&id)?;
            session.toggle_task(id)?
        }
        TaskAction::Remove { id } => {
            let id = session.tasks().resolve(&id)?;
            session.remove_task(id)?
        }
        TaskAction::Remind { id, at } => {
            let id = session.tasks().resolve(&id)?;
            let at = parse_reminder_time(&at, Utc::now())?;
            session.set_reminder(id, Some(at))?
        }
        TaskAction::Unremind { id } => {
            let id = session.tasks().resolve(&id)?;
            session.set_reminder(id, None)?
        }
        TaskAction::Due => {
            let mut delivered: Vec<ReminderNotice> = Vec::new();
            session.poll_reminders(&mut delivered);
            ws.save_session(&session)?;
            return print_json(&delivered);
        }
    };
    ws.save_session(&session)?;
    print_json(&output)
}

/// Accepts RFC 3339 or `+<n>[smh]` relative to `now`.
fn parse_reminder_time(input: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>, ValidationError> {
    let invalid = || ValidationError::InvalidValue {
        field: "reminder time".into(),
        message: format!("cannot parse '{input}'"),
    };
    let input = input.trim();
    if let Some(relative) = input.strip_prefix('+') {
        let Some((split, _)) = relative.char_indices().last() else {
            return Err(invalid());
        };
        let (digits, unit) = relative.split_at(split);
        let n: i64 = digits.parse().map_err(|_| invalid())?;
        let offset = match unit {
            "s" => Duration::try_seconds(n),
            "m" => Duration::try_minutes(n),
            "h" => Duration::try_hours(n),
            _ => return Err(invalid()),
        }
        .ok_or_else(invalid)?;
        return now.checked_add_signed(offset).ok_or_else(invalid);
    }
    DateTime::parse_from_rfc3339(input)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| invalid())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-05-01T09:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn relative_times() {
        assert_eq!(parse_reminder_time("+10m", now()).unwrap(), now() + Duration::minutes(10));
        assert_eq!(parse_reminder_time("+2h", now()).unwrap(), now() + Duration::hours(2));
        assert!(parse_reminder_time("+10d", now()).is_err());
        assert!(parse_reminder_time("+m", now()).is_err());
    }

    #[test]
    fn out_of_range_offsets_are_rejected() {
        assert!(parse_reminder_time("+9999999999999h", now()).is_err());
        assert!(parse_reminder_time("+9999999999999999s", now()).is_err());
        assert!(parse_reminder_time("+99999999999999999999m", now()).is_err());
    }

    #[test]
    fn absolute_times() {
        let at = parse_reminder_time("2024-05-01T10:30:00+02:00", now()).unwrap();
        assert_eq!(at.to_rfc3339(), "2024-05-01T08:30:00+00:00");
        assert!(parse_reminder_time("tomorrow", now()).is_err());
    }
}
